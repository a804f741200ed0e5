//! Integration tests for the chain registry API.

use kiln_chain::{
    chain_id, exclude_chunk, BundlerChain, ChainError, ChainValue, ChunkFilter, ChunkPolicy, ChunkUnit,
};
use serde_json::json;

#[test]
fn later_mutation_can_adjust_an_earlier_registration() {
    let mut chain = BundlerChain::new();
    chain
        .plugin(chain_id::plugin::DEFINE)
        .use_plugin("DefinePlugin", [ChainValue::from(json!({ "A": "1" }))])
        .unwrap();

    chain
        .plugin(chain_id::plugin::DEFINE)
        .tap(|args| {
            if let Some(ChainValue::Object(defs)) = args.first_mut() {
                defs.insert("B".to_string(), "2".into());
            }
        })
        .unwrap();

    let config = chain.finalize().unwrap();
    assert_eq!(
        config.to_json()["plugins"][0]["args"][0],
        json!({ "A": "1", "B": "2" })
    );
}

#[test]
fn deferred_patch_sees_groups_added_after_it_was_queued() {
    let mut chain = BundlerChain::new();
    chain.set(chain_id::path::SPLIT_CHUNKS, json!({ "chunks": "all" })).unwrap();

    chain
        .defer(chain_id::deferred::MF_PATCH_SPLIT_CHUNKS, |chain| {
            if let Some(ChainValue::Object(groups)) = chain.get_mut(chain_id::path::CACHE_GROUPS)? {
                for group in groups.values_mut() {
                    if let Some(map) = group.as_object_mut() {
                        let prev = map.get("chunks").and_then(ChainValue::as_chunk_filter);
                        map.insert("chunks".into(), exclude_chunk(prev.as_ref(), "remote").into());
                    }
                }
            }
            Ok(())
        })
        .unwrap();

    chain
        .set(
            "optimization.splitChunks.cacheGroups.vendor",
            json!({ "chunks": "initial", "test": "node_modules" }),
        )
        .unwrap();

    let config = chain.finalize().unwrap();
    let filter = config
        .get("optimization.splitChunks.cacheGroups.vendor.chunks")
        .and_then(ChainValue::as_chunk_filter)
        .unwrap();
    assert!(!filter.test(&ChunkUnit::initial("remote")));
    assert!(filter.test(&ChunkUnit::initial("main")));
    assert_eq!(filter.base(), Some(&ChunkFilter::Policy(ChunkPolicy::Initial)));
}

#[test]
fn failing_deferred_mutation_reports_its_id() {
    let mut chain = BundlerChain::new();
    chain
        .defer("broken", |_| Err(anyhow::anyhow!("boom")))
        .unwrap();

    let err = chain.finalize().unwrap_err();
    assert!(matches!(err, ChainError::DeferredFailed { ref id, .. } if id == "broken"));
    assert!(!chain.is_finalized());
}

#[test]
fn identical_mutation_sequences_render_identically() {
    fn build() -> String {
        let mut chain = BundlerChain::new();
        chain.set("output.path", "dist").unwrap();
        chain.set("output.publicPath", "/").unwrap();
        chain.merge("resolve", json!({ "extensions": [".ts", ".js"] })).unwrap();
        chain.plugin("progress").use_plugin("ProgressPlugin", Vec::new()).unwrap();
        chain.finalize().unwrap().to_json_string()
    }

    assert_eq!(build(), build());
}
