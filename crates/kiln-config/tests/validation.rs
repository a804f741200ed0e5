//! Tests for schema validation of user configuration.

use std::time::Instant;

use kiln_config::{
    ConfigFn, ConfigMap, ConfigValue, IssueKind, create_default_config, validate, validate_strict,
};
use proptest::prelude::*;
use serde_json::json;

fn raw(value: serde_json::Value) -> ConfigValue {
    ConfigValue::from(value)
}

#[test]
fn accepts_empty_object() {
    let validated = validate(&raw(json!({}))).expect("valid");
    assert_eq!(validated.as_value().to_data(), json!({}));
}

#[test]
fn removes_unknown_properties() {
    let validated = validate(&raw(json!({ "foo": 123 }))).expect("valid");
    assert_eq!(validated.as_value().to_data(), json!({}));
}

#[test]
fn removes_nested_unknown_properties() {
    let validated = validate(&raw(json!({
        "output": { "minify": false, "shiny": true },
        "html": { "title": "x", "extra": { "deep": 1 } }
    })))
    .expect("valid");
    assert_eq!(
        validated.as_value().to_data(),
        json!({ "output": { "minify": false }, "html": { "title": "x" } })
    );
}

#[test]
fn rejects_polyfill_outside_enum() {
    let err = validate(&raw(json!({ "output": { "polyfill": "usage" } }))).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Config validation error:\n* Invalid enum value. Expected 'entry' | 'ua' | 'off', received 'usage' at \"output.polyfill\""
    );
}

#[test]
fn rejects_array_where_object_expected() {
    let err = validate(&raw(json!({
        "dev": { "hmr": false },
        "html": { "faviconByEntries": [] }
    })))
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Config validation error:\n* Expected object, received array at \"html.faviconByEntries\""
    );
}

#[test]
fn accepts_chained_config_with_functions() {
    let engine_fn = ConfigFn::engine(|_, _| Ok(()));
    let mut tools = ConfigMap::new();
    tools.insert("htmlPlugin".into(), false.into());
    tools.insert("rspack".into(), engine_fn.clone().into());
    let mut root = ConfigMap::new();
    root.insert("tools".into(), tools.into());
    let input = ConfigValue::Object(root);

    let validated = validate(&input).expect("valid");
    assert_eq!(validated.as_value(), &input);
    assert_eq!(
        validated.as_value().get("tools.rspack").and_then(ConfigValue::as_function),
        Some(&engine_fn)
    );
    assert_eq!(
        serde_json::to_value(validated.as_value()).unwrap(),
        json!({ "tools": { "htmlPlugin": false, "rspack": "[Function engine]" } })
    );
}

#[test]
fn rejects_function_of_the_wrong_kind() {
    let mut tools = ConfigMap::new();
    tools.insert(
        "bundlerChain".into(),
        ConfigFn::engine(|_, _| Ok(())).into(),
    );
    let mut root = ConfigMap::new();
    root.insert("tools".into(), tools.into());

    let err = validate(&ConfigValue::Object(root)).unwrap_err();
    assert_eq!(err.len(), 1);
    assert_eq!(err.issues()[0].path_string(), "tools.bundlerChain");
    assert!(matches!(err.issues()[0].kind, IssueKind::InvalidUnion { .. }));
}

#[test]
fn collects_issues_from_disjoint_subtrees_in_schema_order() {
    let err = validate(&raw(json!({
        "html": { "inject": "footer" },
        "output": { "charset": "latin1", "minify": "yes" }
    })))
    .unwrap_err();

    let paths: Vec<_> = err.issues().iter().map(|issue| issue.path_string()).collect();
    assert_eq!(paths, ["output.charset", "output.minify", "html.inject"]);
}

#[test]
fn html_plugin_true_is_not_a_literal_false() {
    let err = validate(&raw(json!({ "tools": { "htmlPlugin": true } }))).unwrap_err();
    assert_eq!(
        err.issues()[0].message(),
        "Expected false | object, received boolean at \"tools.htmlPlugin\""
    );
}

#[test]
fn strict_mode_reports_unknown_keys() {
    let err = validate_strict(&raw(json!({ "foo": 1, "output": { "bar": 2 } }))).unwrap_err();
    let messages: Vec<_> = err.issues().iter().map(|issue| issue.message()).collect();
    assert_eq!(
        messages,
        [
            "Unrecognized key(s) in object: 'foo'",
            "Unrecognized key(s) in object: 'bar' at \"output\"",
        ]
    );
}

#[test]
fn strict_mode_keeps_module_federation_passthrough() {
    let validated = validate_strict(&raw(json!({
        "moduleFederation": { "options": { "name": "host", "runtimePlugins": ["./x"] } }
    })))
    .expect("valid");
    assert_eq!(
        validated.as_value().get("moduleFederation.options.runtimePlugins").map(ConfigValue::to_data),
        Some(json!(["./x"]))
    );
}

#[test]
fn validates_default_config_under_100ms() {
    let config = create_default_config().unwrap();
    let started = Instant::now();
    validate(&config).expect("defaults are valid");
    let cost = started.elapsed();
    assert!(cost.as_millis() < 100, "config validator cost: {cost:?}");
}

const ENUM_FIELDS: &[&str] = &[
    "output.polyfill",
    "output.charset",
    "html.inject",
    "performance.chunkSplit.strategy",
];

fn nest(path: &str, leaf: serde_json::Value) -> serde_json::Value {
    path.rsplit('.')
        .fold(leaf, |inner, segment| json!({ segment: inner }))
}

proptest! {
    #[test]
    fn validation_is_idempotent(
        minify in any::<bool>(),
        title in "[a-zA-Z ]{0,12}",
        pre in proptest::collection::vec("[a-z./]{1,8}", 0..4),
    ) {
        let input = raw(json!({
            "output": { "minify": minify },
            "html": { "title": title },
            "source": { "preEntry": pre },
        }));
        let once = validate(&input).unwrap();
        let twice = validate(once.as_value()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn unknown_keys_are_erased_at_any_depth(
        key in "zz[a-z]{1,6}",
        depth in 0usize..3,
        value in any::<i64>(),
    ) {
        let base = json!({ "output": { "distPath": { "root": "out" } } });
        let mut injected = base.clone();
        let target = match depth {
            0 => &mut injected,
            1 => &mut injected["output"],
            _ => &mut injected["output"]["distPath"],
        };
        target[key.as_str()] = json!(value);

        prop_assert_eq!(validate(&raw(injected)).unwrap(), validate(&raw(base)).unwrap());
    }

    #[test]
    fn enum_violations_yield_exactly_one_issue(
        field in proptest::sample::select(ENUM_FIELDS),
        bogus in "[A-Z]{3,8}",
    ) {
        let err = validate(&raw(nest(field, json!(bogus)))).unwrap_err();
        prop_assert_eq!(err.len(), 1);
        prop_assert_eq!(err.issues()[0].path_string(), field);
    }
}
