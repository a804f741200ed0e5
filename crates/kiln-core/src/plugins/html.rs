use async_trait::async_trait;
use kiln_chain::{BundlerChain, ChainMap, ChainValue, chain_id};
use kiln_config::{HtmlInject, Target, Toggle};

use crate::context::PluginContext;
use crate::plugin::Setup;

/// One HTML plugin registration per entry, on web targets.
///
/// `tools.htmlPlugin: false` turns this off; an object is merged over the
/// options derived from `html`.
pub struct HtmlPlugin;

#[async_trait]
impl Setup for HtmlPlugin {
    async fn setup(&self, chain: &mut BundlerChain, ctx: &PluginContext) -> anyhow::Result<()> {
        let config = ctx.config();
        let Toggle::On(overrides) = &config.tools.html_plugin else {
            return Ok(());
        };
        if ctx.target() != Target::Web {
            return Ok(());
        }

        let entry_names: Vec<String> = match chain.get(chain_id::path::ENTRY).and_then(ChainValue::as_object) {
            Some(entries) => entries.keys().cloned().collect(),
            None => Vec::new(),
        };
        let html = &config.html;

        for name in entry_names {
            let mut options = ChainMap::new();
            options.insert("title".into(), html.title.as_str().into());
            options.insert(
                "filename".into(),
                format!("{}{name}.html", html_dir(&config.output.dist_path.html)).into(),
            );
            options.insert("chunks".into(), vec![name.as_str()].into());
            options.insert(
                "inject".into(),
                match html.inject {
                    HtmlInject::Head => "head",
                    HtmlInject::Body => "body",
                }
                .into(),
            );
            if let Some(template) = &html.template {
                options.insert("template".into(), template.as_str().into());
            }
            if let Some(favicon) = html.favicon_by_entries.get(&name).or(html.favicon.as_ref()) {
                options.insert("favicon".into(), favicon.as_str().into());
            }
            let mut parameters = ChainMap::new();
            parameters.insert("mountId".into(), html.mount_id.as_str().into());
            options.insert("templateParameters".into(), parameters.into());

            let mut options = ChainValue::Object(options);
            for (key, value) in overrides {
                let mut patch = ChainMap::new();
                patch.insert(key.clone(), ChainValue::from(value.clone()));
                options.deep_merge(ChainValue::Object(patch));
            }

            chain
                .plugin(format!("{}-{name}", chain_id::plugin::HTML))
                .use_plugin("HtmlPlugin", [options])?;
        }
        Ok(())
    }
}

fn html_dir(dir: &str) -> String {
    let dir = dir.trim_start_matches("./");
    if dir.is_empty() || dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}
