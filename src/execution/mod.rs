//! Execution subsystem: request records, parameter binding, event streaming,
//! the downstream backend seam, and the lifecycle manager tying them to
//! admission control.

pub mod backend;
pub mod binding;
pub mod events;
pub mod lifecycle;
pub mod request;

pub use backend::{GenerationBackend, HttpBackendConfig, HttpGenerationBackend};
pub use binding::apply_bindings;
pub use events::{
    event_channel, Broadcaster, EventReceiver, EventSender, ExecutionEvent, LogBroadcaster,
};
pub use lifecycle::{ExecutionManager, ExecutionOutcome, EXECUTIONS_COLLECTION};
pub use request::{ExecutionRequest, ExecutionStatus};
