//! Graph parser: walks an uploaded workflow and discovers exposable
//! parameters and output ports.
//!
//! The walk is pure and synchronous. Nodes are visited in order; each literal
//! input becomes a [`ParameterDefinition`] keyed by the deterministic slug
//! from [`param_key`](super::param_key), connection pointers are skipped, and
//! output ports come from the static table in [`outputs`](super::outputs).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::heuristics::{infer_param_type, ParamType};
use super::outputs::{is_known_output_type, output_ports};
use super::param_key::{param_key, KeyAllocator};
use super::schema::{is_connection, WorkflowGraph};
use crate::error::FlowError;

/// A user-exposable input discovered on one (node, port) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    pub param_key: String,
    pub node_id: String,
    pub node_type: String,
    pub port: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
    pub default_value: Value,
    pub friendly_name: String,
    pub description: String,
}

/// Flat mappable-input entry sharing its parameter's key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappableInput {
    pub param_key: String,
    pub node_id: String,
    pub port: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
}

/// A mappable output port of a known node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappableOutput {
    pub output_key: String,
    pub node_id: String,
    pub node_type: String,
    pub port: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
}

/// One resolved output port on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputPort {
    pub port: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
}

/// A node together with its resolved output ports. Every node appears here,
/// known type or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputNode {
    pub node_id: String,
    pub node_type: String,
    #[serde(default)]
    pub title: Option<String>,
    pub outputs: Vec<OutputPort>,
}

/// Result of one parse pass. Produced once per distinct content and
/// immutable thereafter; the repository caches it by checksum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedWorkflow {
    pub mappable_inputs: Vec<MappableInput>,
    pub mappable_outputs: Vec<MappableOutput>,
    pub parameters: HashMap<String, ParameterDefinition>,
    pub output_nodes: Vec<OutputNode>,
}

/// Decode uploaded bytes into a [`WorkflowGraph`].
///
/// Bytes that are not JSON at all fail with [`FlowError::ParseFailure`];
/// JSON without a `nodes` array fails with [`FlowError::GraphFormat`].
pub fn parse_upload(bytes: &[u8]) -> Result<WorkflowGraph, FlowError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| FlowError::ParseFailure(e.to_string()))?;
    if !value
        .as_object()
        .is_some_and(|obj| obj.get("nodes").is_some_and(Value::is_array))
    {
        return Err(FlowError::GraphFormat(
            "workflow must be an object with a `nodes` array".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| FlowError::GraphFormat(e.to_string()))
}

/// Walk the graph and produce its [`ParsedWorkflow`].
pub fn parse_graph(graph: &WorkflowGraph) -> ParsedWorkflow {
    let mut allocator = KeyAllocator::new();
    let mut parsed = ParsedWorkflow::default();

    for node in &graph.nodes {
        let (type_slug, occurrence) = allocator.next_occurrence(&node.node_type);

        if let Some(inputs) = node.inputs.as_object() {
            for (port, value) in inputs {
                if is_connection(value) {
                    continue;
                }
                let key = param_key(&type_slug, occurrence, port);
                let param_type = infer_param_type(port, value);
                parsed.mappable_inputs.push(MappableInput {
                    param_key: key.clone(),
                    node_id: node.id.clone(),
                    port: port.clone(),
                    param_type,
                });
                parsed.parameters.insert(
                    key.clone(),
                    ParameterDefinition {
                        param_key: key,
                        node_id: node.id.clone(),
                        node_type: node.node_type.clone(),
                        port: port.clone(),
                        param_type,
                        required: false,
                        default_value: value.clone(),
                        friendly_name: friendly_name(node.title.as_deref(), &node.node_type, port),
                        description: format!(
                            "Input '{}' of {} node {}",
                            port, node.node_type, node.id
                        ),
                    },
                );
            }
        }

        let ports = output_ports(&node.node_type);
        if is_known_output_type(&node.node_type) {
            for (port, param_type) in ports {
                parsed.mappable_outputs.push(MappableOutput {
                    output_key: param_key(&type_slug, occurrence, port),
                    node_id: node.id.clone(),
                    node_type: node.node_type.clone(),
                    port: (*port).to_string(),
                    param_type: *param_type,
                });
            }
        }
        parsed.output_nodes.push(OutputNode {
            node_id: node.id.clone(),
            node_type: node.node_type.clone(),
            title: node.title.clone(),
            outputs: ports
                .iter()
                .map(|(port, param_type)| OutputPort {
                    port: (*port).to_string(),
                    param_type: *param_type,
                })
                .collect(),
        });
    }

    parsed
}

fn friendly_name(title: Option<&str>, node_type: &str, port: &str) -> String {
    let label = title.filter(|t| !t.is_empty()).unwrap_or(node_type);
    format!("{} · {}", label, port)
}
