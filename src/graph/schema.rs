//! Serde types for uploaded workflow graphs.
//!
//! Graphs arrive as arbitrary editor exports: only the `nodes` array is
//! required, node ids may be numbers or strings, and every field the editor
//! emits beyond what we understand is carried through untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// An uploaded node-graph workflow.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowGraph {
    pub nodes: Vec<GraphNode>,
    /// Everything else the editor emitted (links, groups, viewport, ...).
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// One node in the uploaded graph.
///
/// `inputs` is kept untyped: each entry is either a literal value or a
/// 2-element `[node_id, port]` connection pointer. A non-object `inputs`
/// simply yields no discoverable parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphNode {
    #[serde(deserialize_with = "node_id_from_value")]
    pub id: String,
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub inputs: Value,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn default_node_type() -> String {
    "node".to_string()
}

/// Accept both `"5"` and `5` as node ids, normalizing to a string.
fn node_id_from_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "node id must be a string or number, got {other}"
        ))),
    }
}

/// Whether an input value is a connection pointer rather than a literal.
///
/// A connection is a 2-element array whose elements are both numeric or
/// string (`[node_id, port]`). Anything else is a literal, including longer
/// arrays and objects.
pub fn is_connection(value: &Value) -> bool {
    match value {
        Value::Array(items) if items.len() == 2 => items
            .iter()
            .all(|item| matches!(item, Value::Number(_) | Value::String(_))),
        _ => false,
    }
}
