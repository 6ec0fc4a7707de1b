//! Execution request records and their state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Request lifecycle: `pending → processing → {success | failed}`.
///
/// The synchronous path creates requests directly in `processing`; `pending`
/// exists for callers that enqueue before admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Processing,
    Success,
    Failed,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Success | ExecutionStatus::Failed)
    }
}

/// One tracked execution. Terminal status is set exactly once and never
/// reverted; late transition attempts are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub request_id: String,
    pub app_id: String,
    pub status: ExecutionStatus,
    pub inputs: HashMap<String, Value>,
    #[serde(default)]
    pub outputs: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl ExecutionRequest {
    /// New request admitted straight into `processing`.
    pub fn admitted(app_id: &str, inputs: HashMap<String, Value>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            app_id: app_id.to_string(),
            status: ExecutionStatus::Processing,
            inputs,
            outputs: None,
            error: None,
            duration_ms: 0,
            created_at: Utc::now(),
        }
    }

    pub fn complete(&mut self, outputs: Value, duration_ms: u64) {
        if self.status.is_terminal() {
            return;
        }
        self.status = ExecutionStatus::Success;
        self.outputs = Some(outputs);
        self.duration_ms = duration_ms;
    }

    pub fn fail(&mut self, error: String, duration_ms: u64) {
        if self.status.is_terminal() {
            return;
        }
        self.status = ExecutionStatus::Failed;
        self.error = Some(error);
        self.duration_ms = duration_ms;
    }
}
