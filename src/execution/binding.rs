//! Parameter binding: rewrite a raw execution payload's `prompt` graph with
//! user-chosen parameter values.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::graph::ParameterDefinition;

/// Pure, non-mutating transform: deep-copies `payload` and, for each supplied
/// value whose key resolves to a known parameter, overwrites
/// `prompt[node_id].inputs[port]`. Unknown keys are ignored so a partial or
/// newer parameter schema still applies cleanly.
pub fn apply_bindings(
    payload: &Value,
    values: &HashMap<String, Value>,
    parameters: &HashMap<String, ParameterDefinition>,
) -> Value {
    let mut bound = payload.clone();
    let Some(prompt) = bound.get_mut("prompt") else {
        return bound;
    };
    for (param_key, value) in values {
        let Some(definition) = parameters.get(param_key) else {
            continue;
        };
        let Some(node) = prompt.get_mut(&definition.node_id).and_then(Value::as_object_mut)
        else {
            continue;
        };
        let inputs = node
            .entry("inputs")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(inputs) = inputs.as_object_mut() {
            inputs.insert(definition.port.clone(), value.clone());
        }
    }
    bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{parse_graph, parse_upload};
    use serde_json::json;

    fn load_image_parameters() -> HashMap<String, ParameterDefinition> {
        let bytes = serde_json::to_vec(&json!({
            "nodes": [{"id": 1, "type": "LoadImage", "inputs": {"image": "photo.png"}}]
        }))
        .unwrap();
        parse_graph(&parse_upload(&bytes).unwrap()).parameters
    }

    #[test]
    fn test_binding_rewrites_prompt_input() {
        let payload = json!({
            "prompt": {"1": {"class_type": "LoadImage", "inputs": {"image": "photo.png"}}},
            "client_id": "c1"
        });
        let values = HashMap::from([("loadimage_1_image".to_string(), json!("new.png"))]);
        let bound = apply_bindings(&payload, &values, &load_image_parameters());
        assert_eq!(bound["prompt"]["1"]["inputs"]["image"], "new.png");
        // Untouched fields survive the copy.
        assert_eq!(bound["client_id"], "c1");
        // The original payload is not mutated.
        assert_eq!(payload["prompt"]["1"]["inputs"]["image"], "photo.png");
    }

    #[test]
    fn test_unknown_param_keys_ignored() {
        let payload = json!({"prompt": {"1": {"inputs": {"image": "photo.png"}}}});
        let values = HashMap::from([("mystery_9_knob".to_string(), json!(42))]);
        let bound = apply_bindings(&payload, &values, &load_image_parameters());
        assert_eq!(bound, payload);
    }

    #[test]
    fn test_known_key_missing_node_is_ignored() {
        let payload = json!({"prompt": {"2": {"inputs": {}}}});
        let values = HashMap::from([("loadimage_1_image".to_string(), json!("new.png"))]);
        let bound = apply_bindings(&payload, &values, &load_image_parameters());
        assert_eq!(bound, payload);
    }

    #[test]
    fn test_missing_inputs_map_is_created() {
        let payload = json!({"prompt": {"1": {"class_type": "LoadImage"}}});
        let values = HashMap::from([("loadimage_1_image".to_string(), json!("new.png"))]);
        let bound = apply_bindings(&payload, &values, &load_image_parameters());
        assert_eq!(bound["prompt"]["1"]["inputs"]["image"], "new.png");
    }

    #[test]
    fn test_payload_without_prompt_passes_through() {
        let payload = json!({"other": true});
        let values = HashMap::from([("loadimage_1_image".to_string(), json!("new.png"))]);
        let bound = apply_bindings(&payload, &values, &load_image_parameters());
        assert_eq!(bound, payload);
    }
}
