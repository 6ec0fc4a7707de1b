//! Execution lifecycle: validate → admit → run → record.
//!
//! Both surfaces share one pipeline. The synchronous surface returns the
//! final status; the streaming surface emits `log*` then exactly one of
//! `complete`/`error` before closing. Admission order is fixed: required
//! parameters first, then the rate window, then the concurrency slot, so a
//! rejected request never consumes anything. The concurrency slot is held as
//! a guard inside the pipeline, which releases it on every exit path,
//! including caller disconnect on the streaming surface.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use super::backend::GenerationBackend;
use super::binding::apply_bindings;
use super::events::{event_channel, Broadcaster, EventReceiver, EventSender, ExecutionEvent};
use super::request::{ExecutionRequest, ExecutionStatus};
use crate::admission::AdmissionController;
use crate::app::{App, AppRepository};
use crate::error::FlowError;
use crate::graph::ParameterDefinition;
use crate::store::{DocumentStore, Filter};
use crate::workflow::WorkflowRepository;

pub const EXECUTIONS_COLLECTION: &str = "executions";

/// Final result returned by the synchronous surface.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub request_id: String,
    pub status: ExecutionStatus,
    pub outputs: Option<Value>,
    pub error: Option<String>,
    pub error_code: Option<String>,
    pub duration_ms: u64,
}

pub struct ExecutionManager {
    store: Arc<dyn DocumentStore>,
    workflows: WorkflowRepository,
    apps: AppRepository,
    admission: Arc<AdmissionController>,
    backend: Arc<dyn GenerationBackend>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl ExecutionManager {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        admission: Arc<AdmissionController>,
        backend: Arc<dyn GenerationBackend>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            workflows: WorkflowRepository::new(store.clone()),
            apps: AppRepository::new(store.clone()),
            store,
            admission,
            backend,
            broadcaster,
        }
    }

    /// Submit an execution and wait for its final status.
    ///
    /// Validation and admission failures return `Err`; a downstream failure
    /// is an expected outcome and comes back as a `failed`-status result.
    pub async fn execute(
        &self,
        app_id: &str,
        inputs: HashMap<String, Value>,
    ) -> Result<ExecutionOutcome, FlowError> {
        self.execute_inner(app_id, inputs, None).await
    }

    /// Submit an execution and stream its progress.
    ///
    /// The receiver yields zero or more `log` events followed by exactly one
    /// `complete` or `error`, then closes. Dropping the receiver does not
    /// leak the concurrency slot: the pipeline finishes and the slot guard
    /// releases on its way out.
    pub fn execute_streaming(
        self: &Arc<Self>,
        app_id: &str,
        inputs: HashMap<String, Value>,
    ) -> EventReceiver {
        let (sender, receiver) = event_channel();
        let manager = Arc::clone(self);
        let app_id = app_id.to_string();
        tokio::spawn(async move {
            let terminal = match manager.execute_inner(&app_id, inputs, Some(&sender)).await {
                Ok(outcome) => match outcome.status {
                    ExecutionStatus::Success => ExecutionEvent::Complete {
                        result: outcome.outputs.unwrap_or(Value::Null),
                    },
                    _ => ExecutionEvent::Error {
                        code: outcome
                            .error_code
                            .unwrap_or_else(|| "execution_failed".to_string()),
                        message: outcome.error.unwrap_or_default(),
                    },
                },
                Err(err) => ExecutionEvent::Error {
                    code: err.code().to_string(),
                    message: err.to_string(),
                },
            };
            let _ = sender.send(terminal);
        });
        receiver
    }

    async fn execute_inner(
        &self,
        app_id: &str,
        inputs: HashMap<String, Value>,
        events: Option<&EventSender>,
    ) -> Result<ExecutionOutcome, FlowError> {
        let app = self
            .apps
            .find_by_app_id(app_id)
            .await?
            .ok_or_else(|| FlowError::NotFound(format!("app {app_id}")))?;

        // Rate is checked before the slot so over-rate callers never consume
        // concurrency, and validation precedes both.
        validate_required(&app, &inputs)?;
        self.admission.check_rate(&app.app_id, app.rate_limit)?;
        let slot = self.admission.acquire(&app.app_id, app.concurrency_limit)?;

        let record = self
            .workflows
            .find_by_workflow_id(&app.workflow_id)
            .await?
            .ok_or_else(|| FlowError::NotFound(format!("workflow {}", app.workflow_id)))?;

        let outcome = self.run(&app, &record.parsed.parameters, inputs, events).await;
        drop(slot);
        outcome
    }

    async fn run(
        &self,
        app: &App,
        parameters: &HashMap<String, ParameterDefinition>,
        inputs: HashMap<String, Value>,
        events: Option<&EventSender>,
    ) -> Result<ExecutionOutcome, FlowError> {
        let mut request = ExecutionRequest::admitted(&app.app_id, inputs.clone());
        self.persist_admitted(&request).await?;
        tracing::info!(request_id = %request.request_id, app_id = %app.app_id, "execution admitted");
        emit_log(events, format!("request {} admitted", request.request_id));

        let payload = apply_bindings(&app.payload, &inputs, parameters);
        emit_log(events, "submitting payload to generation service".to_string());

        let started = Instant::now();
        let result = self.backend.generate(&payload).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let mut error_code = None;
        match result {
            Ok(outputs) => request.complete(outputs, duration_ms),
            Err(err) => {
                tracing::warn!(request_id = %request.request_id, error = %err, "generation failed");
                error_code = Some(err.code().to_string());
                request.fail(err.to_string(), duration_ms);
            }
        }
        self.persist_terminal(&request).await?;

        let outcome = ExecutionOutcome {
            request_id: request.request_id.clone(),
            status: request.status,
            outputs: request.outputs.clone(),
            error: request.error.clone(),
            error_code,
            duration_ms,
        };
        self.broadcaster.broadcast(
            &app.app_id,
            &request.request_id,
            &match request.status {
                ExecutionStatus::Success => ExecutionEvent::Complete {
                    result: outcome.outputs.clone().unwrap_or(Value::Null),
                },
                _ => ExecutionEvent::Error {
                    code: outcome
                        .error_code
                        .clone()
                        .unwrap_or_else(|| "execution_failed".to_string()),
                    message: outcome.error.clone().unwrap_or_default(),
                },
            },
        );
        Ok(outcome)
    }

    async fn persist_admitted(&self, request: &ExecutionRequest) -> Result<(), FlowError> {
        let mut doc = serde_json::to_value(request)
            .map_err(|e| FlowError::Internal(format!("request encode: {e}")))?;
        doc["_id"] = Value::String(request.request_id.clone());
        self.store.create(EXECUTIONS_COLLECTION, doc).await?;
        Ok(())
    }

    async fn persist_terminal(&self, request: &ExecutionRequest) -> Result<(), FlowError> {
        let changes = serde_json::json!({
            "status": request.status,
            "outputs": request.outputs,
            "error": request.error,
            "durationMs": request.duration_ms,
        });
        self.store
            .update_one(
                EXECUTIONS_COLLECTION,
                &Filter::new().eq("requestId", request.request_id.as_str()),
                changes,
            )
            .await?;
        Ok(())
    }

    /// Look up one persisted request.
    pub async fn find_request(
        &self,
        request_id: &str,
    ) -> Result<Option<ExecutionRequest>, FlowError> {
        let doc = self
            .store
            .find_one(
                EXECUTIONS_COLLECTION,
                &Filter::new().eq("requestId", request_id),
            )
            .await?;
        doc.map(decode_request).transpose()
    }

    /// All persisted requests for one app, in admission order.
    pub async fn history(&self, app_id: &str) -> Result<Vec<ExecutionRequest>, FlowError> {
        let docs = self
            .store
            .find(EXECUTIONS_COLLECTION, &Filter::new().eq("appId", app_id))
            .await?;
        docs.into_iter().map(decode_request).collect()
    }

    pub fn admission(&self) -> &Arc<AdmissionController> {
        &self.admission
    }
}

fn decode_request(doc: Value) -> Result<ExecutionRequest, FlowError> {
    serde_json::from_value(doc).map_err(|e| FlowError::Storage(format!("request decode: {e}")))
}

/// Required-parameter gate: each flagged key must be present, non-null, and
/// non-empty.
fn validate_required(app: &App, inputs: &HashMap<String, Value>) -> Result<(), FlowError> {
    for key in &app.required_params {
        let missing = match inputs.get(key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        };
        if missing {
            return Err(FlowError::MissingRequiredParam(key.clone()));
        }
    }
    Ok(())
}

fn emit_log(events: Option<&EventSender>, message: String) {
    if let Some(sender) = events {
        // A closed receiver just means the caller went away.
        let _ = sender.send(ExecutionEvent::Log { message });
    }
}
