//! Tests for layering user configuration onto defaults.

use kiln_config::{
    ConfigValue, MergeConflictError, Merger, Schema, Toggle, Validator, create_default_config,
    load_config, merge, validate,
};
use serde_json::json;

fn user(value: serde_json::Value) -> kiln_config::ValidatedConfig {
    validate(&ConfigValue::from(value)).expect("valid user config")
}

#[test]
fn arrays_are_replaced_not_concatenated() {
    let schema = Schema::object([("a", Schema::array(Schema::number()))]);
    let defaults = ConfigValue::from(json!({ "a": [1, 2] }));
    let user = Validator::new(&schema)
        .validate(&ConfigValue::from(json!({ "a": [3] })))
        .unwrap();

    let merged = Merger::new().merge(&defaults, &user).unwrap();
    assert_eq!(merged.to_data(), json!({ "a": [3] }));
}

#[test]
fn objects_merge_key_by_key() {
    let defaults = create_default_config().unwrap();
    let merged = merge(&defaults, &user(json!({ "output": { "distPath": { "root": "build" } } }))).unwrap();

    assert_eq!(merged.get("output.distPath.root").and_then(ConfigValue::as_str), Some("build"));
    assert_eq!(merged.get("output.distPath.js").and_then(ConfigValue::as_str), Some("static/js"));
}

#[test]
fn false_disables_object_default() {
    let resolved = load_config(&ConfigValue::from(json!({ "tools": { "htmlPlugin": false } }))).unwrap();
    assert_eq!(resolved.config().tools.html_plugin, Toggle::Off);
    assert_eq!(resolved.raw().get("tools.htmlPlugin"), Some(&ConfigValue::Bool(false)));
}

#[test]
fn pre_entry_is_additive() {
    let schema = Schema::object([(
        "source",
        Schema::object([("preEntry", Schema::array(Schema::string()))]),
    )]);
    let defaults = ConfigValue::from(json!({ "source": { "preEntry": ["./reset.css"] } }));
    let user = Validator::new(&schema)
        .validate(&ConfigValue::from(json!({ "source": { "preEntry": ["./polyfill.js"] } })))
        .unwrap();

    let merged = merge(&defaults, &user).unwrap();
    assert_eq!(
        merged.to_data(),
        json!({ "source": { "preEntry": ["./reset.css", "./polyfill.js"] } })
    );
}

#[test]
fn additive_field_with_non_array_default_conflicts() {
    let schema = Schema::object([(
        "source",
        Schema::object([("preEntry", Schema::array(Schema::string()))]),
    )]);
    let defaults = ConfigValue::from(json!({ "source": { "preEntry": "./reset.css" } }));
    let user = Validator::new(&schema)
        .validate(&ConfigValue::from(json!({ "source": { "preEntry": ["./a.js"] } })))
        .unwrap();

    let err = merge(&defaults, &user).unwrap_err();
    assert_eq!(
        err,
        MergeConflictError {
            path: "source.preEntry".to_string(),
            default_shape: "string",
            user_shape: "array",
        }
    );
}

#[test]
fn merge_does_not_touch_defaults() {
    let defaults = create_default_config().unwrap();
    let snapshot = defaults.clone();
    merge(&defaults, &user(json!({ "output": { "minify": false } }))).unwrap();
    assert_eq!(defaults, snapshot);
}
