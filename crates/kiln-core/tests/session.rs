//! Build session behavior: ordering, failure handling and user hooks.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kiln_chain::{BundlerChain, ChainValue};
use kiln_config::{ConfigError, ConfigFn, ConfigMap, ConfigValue, Mode, Target};
use kiln_core::{
    BuildSession, KilnError, PluginContext, PluginDescriptor, PluginRegistry, Setup, Teardown,
};
use serde_json::json;

type Log = Arc<Mutex<Vec<String>>>;

#[derive(Clone)]
struct Recorder {
    name: &'static str,
    log: Log,
    fail: bool,
}

#[async_trait]
impl Setup for Recorder {
    async fn setup(&self, chain: &mut BundlerChain, _ctx: &PluginContext) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(format!("setup {}", self.name));
        if self.fail {
            anyhow::bail!("{} refused", self.name);
        }
        chain.set(format!("seen.{}", self.name).as_str(), true)?;
        Ok(())
    }
}

#[async_trait]
impl Teardown for Recorder {
    async fn teardown(&self, _ctx: &PluginContext) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(format!("teardown {}", self.name));
        Ok(())
    }
}

fn recorder(name: &'static str, log: &Log, fail: bool) -> PluginDescriptor {
    let recorder = Recorder {
        name,
        log: Arc::clone(log),
        fail,
    };
    PluginDescriptor::with_teardown(name, recorder.clone(), recorder)
}

fn plugin_names(engine: &kiln_chain::EngineConfig) -> Vec<String> {
    engine
        .get("plugins")
        .and_then(ChainValue::as_array)
        .map(|plugins| {
            plugins
                .iter()
                .filter_map(|plugin| plugin.as_object()?.get("name")?.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn plugins_observe_earlier_mutations() {
    let mut registry = PluginRegistry::new();
    registry
        .register(PluginDescriptor::from_fn("first", |chain, _| {
            chain.set("banner", "a")?;
            Ok(())
        }))
        .unwrap();
    registry
        .register(PluginDescriptor::from_fn("second", |chain, _| {
            let prev = chain
                .get("banner")
                .and_then(ChainValue::as_str)
                .unwrap_or_default()
                .to_string();
            chain.set("banner", format!("{prev}b"))?;
            Ok(())
        }))
        .unwrap();

    let session = BuildSession::with_registry(registry, Target::Web, Mode::Production);
    let output = session.run(&ConfigValue::from(json!({}))).await.unwrap();

    assert_eq!(output.engine.get("banner").and_then(ChainValue::as_str), Some("ab"));
    assert_eq!(output.summary.executed, vec!["first", "second"]);
}

#[tokio::test]
async fn identical_inputs_produce_identical_configs() {
    let raw = ConfigValue::from(json!({
        "source": { "entry": { "main": "./src/main.tsx", "admin": ["./src/admin.tsx"] } },
        "output": { "polyfill": "entry" },
        "performance": { "chunkSplit": { "forceSplitting": { "axios": "node_modules[\\\\/]axios" } } },
        "moduleFederation": { "options": { "name": "shell", "remotes": { "app": "app@/remote.js" } } }
    }));

    let session = BuildSession::new(Target::Web, Mode::Production);
    let first = session.run(&raw).await.unwrap();
    let second = session.run(&raw).await.unwrap();

    assert_eq!(first.engine.to_json_string(), second.engine.to_json_string());
}

#[tokio::test]
async fn failing_setup_tears_down_completed_plugins_in_reverse() {
    let log = Log::default();
    let mut registry = PluginRegistry::new();
    for (name, fail) in [("p1", false), ("p2", false), ("p3", true), ("p4", false), ("p5", false)] {
        registry.register(recorder(name, &log, fail)).unwrap();
    }

    let session = BuildSession::with_registry(registry, Target::Web, Mode::Production);
    let err = session.run(&ConfigValue::from(json!({}))).await.unwrap_err();

    assert!(matches!(&err, KilnError::PluginSetup { name, .. } if name == "p3"));
    assert_eq!(err.plugin_name(), Some("p3"));
    assert_eq!(
        *log.lock().unwrap(),
        vec!["setup p1", "setup p2", "setup p3", "teardown p2", "teardown p1"]
    );
}

#[tokio::test]
async fn successful_run_tears_down_every_plugin() {
    let log = Log::default();
    let mut registry = PluginRegistry::new();
    registry.register(recorder("a", &log, false)).unwrap();
    registry.register(recorder("b", &log, false)).unwrap();

    let session = BuildSession::with_registry(registry, Target::Web, Mode::Development);
    let output = session.run(&ConfigValue::from(json!({}))).await.unwrap();

    assert_eq!(output.engine.get("seen.a"), Some(&ChainValue::Bool(true)));
    assert_eq!(
        *log.lock().unwrap(),
        vec!["setup a", "setup b", "teardown b", "teardown a"]
    );
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let mut session = BuildSession::new(Target::Web, Mode::Production);
    session
        .register(PluginDescriptor::from_fn("app:alias", |_, _| Ok(())))
        .unwrap();

    let err = session
        .register(PluginDescriptor::from_fn("app:alias", |_, _| Ok(())))
        .unwrap_err();
    assert!(matches!(err, KilnError::DuplicatePluginName { ref name } if name == "app:alias"));

    let err = session
        .register(PluginDescriptor::from_fn("kiln:entry", |_, _| Ok(())))
        .unwrap_err();
    assert_eq!(err.plugin_name(), Some("kiln:entry"));
}

#[tokio::test]
async fn registry_assigns_positions_in_order() {
    let mut registry = PluginRegistry::with_builtins();
    let builtins = registry.len();
    let position = registry
        .register(PluginDescriptor::from_fn("app:last", |_, _| Ok(())))
        .unwrap();

    assert_eq!(position, builtins);
    assert_eq!(registry.names().next(), Some("kiln:entry"));
    assert_eq!(registry.iter().last().and_then(PluginDescriptor::position), Some(builtins));
}

#[tokio::test]
async fn invalid_config_fails_before_any_plugin_runs() {
    let log = Log::default();
    let mut registry = PluginRegistry::new();
    registry.register(recorder("p1", &log, false)).unwrap();

    let session = BuildSession::with_registry(registry, Target::Web, Mode::Production);
    let err = session
        .run(&ConfigValue::from(json!({ "output": { "polyfill": "sometimes" } })))
        .await
        .unwrap_err();

    let KilnError::Config(ConfigError::Validation(errors)) = &err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(errors.len(), 1);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn strict_sessions_reject_unknown_keys() {
    let session = BuildSession::new(Target::Web, Mode::Production).strict(true);
    let err = session
        .run(&ConfigValue::from(json!({ "output": { "minfy": true } })))
        .await
        .unwrap_err();
    assert!(matches!(err, KilnError::Config(ConfigError::Validation(_))));

    let lenient = BuildSession::new(Target::Web, Mode::Production);
    assert!(
        lenient
            .run(&ConfigValue::from(json!({ "output": { "minfy": true } })))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn tools_hooks_run_after_builtins() {
    let mut tools = ConfigMap::new();
    tools.insert(
        "bundlerChain".into(),
        ConfigFn::bundler_chain(|chain, utils| {
            assert!(utils.is_prod());
            chain.set("resolve.alias.app", "./src/app")?;
            Ok(())
        })
        .into(),
    );
    tools.insert(
        "rspack".into(),
        ConfigValue::Array(vec![
            ConfigValue::from(json!({ "resolve": { "extensions": [".ts", ".tsx"] } })),
            ConfigFn::engine(|engine, _| {
                engine.as_map_mut().insert("profile".into(), ChainValue::Bool(true));
                Ok(())
            })
            .into(),
        ]),
    );
    let mut root = ConfigMap::new();
    root.insert("tools".into(), tools.into());

    let session = BuildSession::new(Target::Web, Mode::Production);
    let output = session.run(&ConfigValue::Object(root)).await.unwrap();

    assert_eq!(
        output.engine.get("resolve.alias.app").and_then(ChainValue::as_str),
        Some("./src/app")
    );
    assert_eq!(
        output.engine.get("resolve.extensions").map(ChainValue::to_json),
        Some(json!([".ts", ".tsx"]))
    );
    assert_eq!(output.engine.get("profile"), Some(&ChainValue::Bool(true)));
    assert_eq!(output.summary.executed.last().map(String::as_str), Some("kiln:tools"));
}

#[tokio::test]
async fn failing_engine_hook_reports_its_index() {
    let mut tools = ConfigMap::new();
    tools.insert(
        "rspack".into(),
        ConfigValue::Array(vec![
            ConfigValue::from(json!({ "devtool": false })),
            ConfigFn::engine(|_, _| Err(anyhow::anyhow!("no"))).into(),
        ]),
    );
    let mut root = ConfigMap::new();
    root.insert("tools".into(), tools.into());

    let session = BuildSession::new(Target::Web, Mode::Production);
    let err = session.run(&ConfigValue::Object(root)).await.unwrap_err();
    assert!(matches!(err, KilnError::EngineHook { index: 1, .. }));
}

#[tokio::test]
async fn builtins_translate_typed_options() {
    let raw = ConfigValue::from(json!({
        "source": {
            "entry": { "main": "./src/main.tsx" },
            "preEntry": ["./src/reset.css"],
            "define": { "__VERSION__": "\"1.0.0\"" }
        },
        "output": { "polyfill": "entry", "distPath": { "root": "build" } },
        "html": { "title": "Shop", "mountId": "app" }
    }));

    let session = BuildSession::new(Target::Web, Mode::Production);
    let engine = session.run(&raw).await.unwrap().engine;

    assert_eq!(
        engine.get("entry.main").map(ChainValue::to_json),
        Some(json!(["core-js", "./src/reset.css", "./src/main.tsx"]))
    );
    assert_eq!(engine.get("output.path").and_then(ChainValue::as_str), Some("build"));
    assert_eq!(
        engine.get("output.filename").and_then(ChainValue::as_str),
        Some("static/js/[name].[contenthash:8].js")
    );
    assert_eq!(engine.get("mode").and_then(ChainValue::as_str), Some("production"));
    assert_eq!(engine.get("devtool"), Some(&ChainValue::Bool(false)));
    assert_eq!(plugin_names(&engine), vec!["define", "html-main"]);

    let json = engine.to_json();
    let html = &json["plugins"][1]["args"][0];
    assert_eq!(html["title"], json!("Shop"));
    assert_eq!(html["filename"], json!("main.html"));
    assert_eq!(html["templateParameters"]["mountId"], json!("app"));
}

#[tokio::test]
async fn non_web_targets_skip_browser_plugins() {
    let raw = ConfigValue::from(json!({
        "moduleFederation": { "options": { "name": "remote" } },
        "performance": { "chunkSplit": { "strategy": "split-by-module" } }
    }));

    let session = BuildSession::new(Target::Node, Mode::Production);
    let engine = session.run(&raw).await.unwrap().engine;

    assert_eq!(plugin_names(&engine), vec!["define"]);
    assert!(engine.get("optimization.splitChunks").is_none());
    assert_eq!(engine.get("target").and_then(ChainValue::as_str), Some("node"));
    assert_eq!(engine.get("output.publicPath").and_then(ChainValue::as_str), Some("/"));
}

#[tokio::test]
async fn async_plugins_are_awaited_in_order() {
    let mut registry = PluginRegistry::new();
    registry
        .register(PluginDescriptor::from_async_fn("slow", |chain, _| {
            Box::pin(async move {
                tokio::task::yield_now().await;
                chain.set("order", vec!["slow"])?;
                Ok::<(), anyhow::Error>(())
            })
        }))
        .unwrap();
    registry
        .register(PluginDescriptor::from_fn("fast", |chain, _| {
            let mut order = chain
                .get("order")
                .and_then(ChainValue::as_array)
                .cloned()
                .unwrap_or_default();
            order.push("fast".into());
            chain.set("order", ChainValue::Array(order))?;
            Ok(())
        }))
        .unwrap();

    let session = BuildSession::with_registry(registry, Target::Web, Mode::Production);
    let engine = session.run(&ConfigValue::from(json!({}))).await.unwrap().engine;
    assert_eq!(engine.get("order").map(ChainValue::to_json), Some(json!(["slow", "fast"])));
}

#[test]
fn every_builtin_is_registered_under_its_own_name() {
    let builtins = kiln_core::plugins::builtin_plugins();
    let registry = PluginRegistry::with_builtins();

    assert_eq!(registry.len(), builtins.len());
    assert!(
        registry
            .names()
            .zip(builtins.iter().map(PluginDescriptor::name))
            .all(|(registered, builtin)| registered == builtin)
    );
}
