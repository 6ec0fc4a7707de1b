//! End-to-end import flow: parameter discovery, checksum caching, and the
//! shapes the spec of the upload surface promises.

use std::sync::Arc;

use flowgate::graph::ParamType;
use flowgate::store::MemoryStore;
use flowgate::workflow::{WorkflowRepository, WORKFLOWS_COLLECTION};
use flowgate::FlowError;
use serde_json::json;

fn repository() -> (Arc<MemoryStore>, WorkflowRepository) {
    let store = Arc::new(MemoryStore::new().with_unique_index(WORKFLOWS_COLLECTION, "checksum"));
    (store.clone(), WorkflowRepository::new(store))
}

#[tokio::test]
async fn import_discovers_example_parameter() {
    let (_, workflows) = repository();
    let bytes = serde_json::to_vec(&json!({
        "nodes": [{"id": 1, "type": "LoadImage", "title": "Input",
                   "inputs": {"image": "photo.png"}}]
    }))
    .unwrap();

    let outcome = workflows.import("example", &bytes).await.unwrap();
    assert!(!outcome.cached);
    assert_eq!(outcome.nodes_count, 1);

    let def = &outcome.parameters["loadimage_1_image"];
    assert_eq!(def.param_type, ParamType::Image);
    assert_eq!(def.node_id, "1");

    assert_eq!(outcome.output_nodes.len(), 1);
    let outputs = &outcome.output_nodes[0].outputs;
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].port, "IMAGE");
    assert_eq!(outputs[0].param_type, ParamType::Image);
}

#[tokio::test]
async fn import_is_idempotent_for_identical_bytes() {
    let (store, workflows) = repository();
    let bytes = serde_json::to_vec(&json!({
        "nodes": [
            {"id": 1, "type": "LoadImage", "inputs": {"image": "a.png"}},
            {"id": 2, "type": "KSampler", "inputs": {"seed": 7, "model": [4, "MODEL"]}}
        ]
    }))
    .unwrap();

    let first = workflows.import("one", &bytes).await.unwrap();
    let second = workflows.import("two", &bytes).await.unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.workflow_id, second.workflow_id);
    assert_eq!(store.count(WORKFLOWS_COLLECTION), 1);

    // Cached parse is identical, connections stayed excluded.
    assert_eq!(first.parameters.len(), second.parameters.len());
    assert!(second.parameters.contains_key("ksampler_1_seed"));
    assert!(!second.parameters.keys().any(|k| k.contains("model")));
}

#[tokio::test]
async fn import_keys_are_deterministic_and_unique() {
    let (_, workflows) = repository();
    let bytes = serde_json::to_vec(&json!({
        "nodes": [
            {"id": "a", "type": "CLIPTextEncode", "inputs": {"text": "positive"}},
            {"id": "b", "type": "CLIPTextEncode", "inputs": {"text": "negative"}},
            {"id": "c", "type": "Custom Node!", "inputs": {"strength": 0.5}}
        ]
    }))
    .unwrap();

    let outcome = workflows.import("wf", &bytes).await.unwrap();
    let mut keys: Vec<_> = outcome.parameters.keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "cliptextencode_1_text",
            "cliptextencode_2_text",
            "custom_node_1_strength"
        ]
    );
    assert_eq!(outcome.mappable_inputs.len(), keys.len());
}

#[tokio::test]
async fn import_rejects_malformed_uploads() {
    let (store, workflows) = repository();

    assert!(matches!(
        workflows.import("bad", b"\x00\x01").await.unwrap_err(),
        FlowError::ParseFailure(_)
    ));
    assert!(matches!(
        workflows.import("bad", br#"{"edges": []}"#).await.unwrap_err(),
        FlowError::GraphFormat(_)
    ));
    assert_eq!(store.count(WORKFLOWS_COLLECTION), 0);
}
