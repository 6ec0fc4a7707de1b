//! Persisted workflow file records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::graph::ParsedWorkflow;

/// Durable wrapper around one distinct uploaded workflow, keyed by the
/// sha-256 checksum of its raw bytes. The parse result is stored alongside
/// the content so a checksum hit never re-parses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowFileRecord {
    pub workflow_id: String,
    pub version: u32,
    pub name: String,
    pub checksum: String,
    pub nodes_count: usize,
    /// Raw uploaded graph, kept verbatim for execution payload templates.
    pub content: Value,
    pub parsed: ParsedWorkflow,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowFileRecord {
    pub fn new(
        name: &str,
        checksum: String,
        nodes_count: usize,
        content: Value,
        parsed: ParsedWorkflow,
    ) -> Self {
        let now = Utc::now();
        Self {
            workflow_id: Uuid::new_v4().to_string(),
            version: 1,
            name: name.to_string(),
            checksum,
            nodes_count,
            content,
            parsed,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_roundtrip() {
        let record = WorkflowFileRecord::new(
            "demo",
            "abc123".into(),
            1,
            json!({"nodes": []}),
            ParsedWorkflow::default(),
        );
        assert_eq!(record.version, 1);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["checksum"], "abc123");
        assert_eq!(value["nodesCount"], 1);
        let back: WorkflowFileRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back.workflow_id, record.workflow_id);
    }

    #[test]
    fn test_new_records_get_distinct_ids() {
        let a = WorkflowFileRecord::new("a", "c1".into(), 0, json!({}), ParsedWorkflow::default());
        let b = WorkflowFileRecord::new("b", "c2".into(), 0, json!({}), ParsedWorkflow::default());
        assert_ne!(a.workflow_id, b.workflow_id);
    }
}
