//! Streaming execution events and the fire-and-forget broadcast seam.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

/// Event emitted by the streaming execution surface.
///
/// One stream is zero or more `log` events followed by exactly one of
/// `complete` or `error`, after which the channel closes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ExecutionEvent {
    Log { message: String },
    Complete { result: Value },
    Error { code: String, message: String },
}

impl ExecutionEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionEvent::Log { .. })
    }
}

pub type EventSender = mpsc::UnboundedSender<ExecutionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ExecutionEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Fire-and-forget notification transport. Implementations must not block
/// or fail the execution path.
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, app_id: &str, request_id: &str, event: &ExecutionEvent);
}

/// Default broadcaster: structured log only.
#[derive(Debug, Default)]
pub struct LogBroadcaster;

impl Broadcaster for LogBroadcaster {
    fn broadcast(&self, app_id: &str, request_id: &str, event: &ExecutionEvent) {
        tracing::debug!(app_id, request_id, ?event, "broadcast");
    }
}
