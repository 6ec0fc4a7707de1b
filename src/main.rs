use std::collections::HashMap;
use std::sync::Arc;

use flowgate::store::MemoryStore;
use flowgate::workflow::{WorkflowRepository, WORKFLOWS_COLLECTION};
use flowgate::execution::apply_bindings;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Flowgate parameter discovery demo ===\n");

    let graph = br#"{
        "nodes": [
            {"id": 1, "type": "LoadImage", "title": "Source", "inputs": {"image": "photo.png"}},
            {"id": 2, "type": "CLIPTextEncode", "title": "Prompt", "inputs": {"text": "a cat in the rain"}},
            {"id": 3, "type": "KSampler", "inputs": {"seed": 42, "steps": 20, "model": [4, "MODEL"]}},
            {"id": 4, "type": "CheckpointLoaderSimple", "inputs": {"ckpt_name": "sd15.safetensors"}},
            {"id": 5, "type": "SaveImage", "inputs": {"images": [3, "LATENT"]}}
        ]
    }"#;

    let store = Arc::new(MemoryStore::new().with_unique_index(WORKFLOWS_COLLECTION, "checksum"));
    let workflows = WorkflowRepository::new(store);

    let imported = match workflows.import("demo", graph).await {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("import failed: {err}");
            std::process::exit(1);
        }
    };

    println!(
        "workflow {} (v{}), {} nodes, cached: {}\n",
        imported.workflow_id, imported.version, imported.nodes_count, imported.cached
    );

    println!("discovered parameters:");
    let mut keys: Vec<_> = imported.parameters.keys().collect();
    keys.sort();
    for key in keys {
        let def = &imported.parameters[key];
        println!(
            "  {:<32} node {:<3} port {:<12} type {:<7} default {}",
            def.param_key, def.node_id, def.port, def.param_type, def.default_value
        );
    }

    println!("\nmappable outputs:");
    for output in &imported.mappable_outputs {
        println!(
            "  {:<32} node {:<3} port {:<12} type {}",
            output.output_key, output.node_id, output.port, output.param_type
        );
    }

    // Re-import the same bytes: checksum hit, nothing re-parsed.
    match workflows.import("demo again", graph).await {
        Ok(again) => println!("\nsecond import cached: {}", again.cached),
        Err(err) => eprintln!("re-import failed: {err}"),
    }

    let payload = serde_json::json!({
        "prompt": {
            "1": {"class_type": "LoadImage", "inputs": {"image": "photo.png"}},
            "2": {"class_type": "CLIPTextEncode", "inputs": {"text": "a cat in the rain"}}
        }
    });
    let values = HashMap::from([
        ("loadimage_1_image".to_string(), serde_json::json!("upload_7f3.png")),
        ("cliptextencode_1_text".to_string(), serde_json::json!("a fox at dawn")),
    ]);
    let bound = apply_bindings(&payload, &values, &imported.parameters);
    println!("\nbound prompt:");
    match serde_json::to_string_pretty(&bound["prompt"]) {
        Ok(pretty) => println!("{pretty}"),
        Err(err) => eprintln!("encode failed: {err}"),
    }
}
