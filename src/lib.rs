//! # Flowgate — workflow graph parameterization and execution admission
//!
//! `flowgate` turns arbitrary uploaded node-graph workflows into
//! user-parameterizable apps and gates their execution against a downstream
//! generation service:
//!
//! - **Parameter discovery**: a pure parse pass over an untyped node graph,
//!   classifying literal input ports with ordered heuristics and assigning
//!   deterministic, collision-free parameter keys.
//! - **Content-addressed caching**: parsed workflows are stored once per
//!   sha-256 checksum; importing identical bytes twice is a cache hit.
//! - **Admission control**: per-app sliding-window rate limits and
//!   counting-semaphore concurrency limits, with RAII slot release.
//! - **Execution lifecycle**: validate → admit → run → record, with a
//!   synchronous surface and a streaming surface emitting ordered
//!   `log* (complete | error)` event sequences.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use flowgate::admission::AdmissionController;
//! use flowgate::execution::{ExecutionManager, HttpBackendConfig, HttpGenerationBackend, LogBroadcaster};
//! use flowgate::store::MemoryStore;
//! use flowgate::workflow::{WorkflowRepository, WORKFLOWS_COLLECTION};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), flowgate::error::FlowError> {
//!     let store = Arc::new(MemoryStore::new().with_unique_index(WORKFLOWS_COLLECTION, "checksum"));
//!     let workflows = WorkflowRepository::new(store.clone());
//!     let imported = workflows.import("demo", br#"{"nodes": []}"#).await?;
//!
//!     let manager = ExecutionManager::new(
//!         store,
//!         Arc::new(AdmissionController::new()),
//!         Arc::new(HttpGenerationBackend::new(HttpBackendConfig::default())?),
//!         Arc::new(LogBroadcaster),
//!     );
//!     let _ = (imported, manager);
//!     Ok(())
//! }
//! ```

pub mod admission;
pub mod app;
pub mod error;
pub mod execution;
pub mod graph;
pub mod store;
pub mod workflow;

pub use admission::{AdmissionController, SlotGuard};
pub use app::{App, AppRepository};
pub use error::FlowError;
pub use execution::{ExecutionManager, ExecutionOutcome, ExecutionRequest, ExecutionStatus};
pub use graph::{parse_graph, parse_upload, ParamType, ParameterDefinition, ParsedWorkflow};
pub use store::{DocumentStore, Filter, MemoryStore};
pub use workflow::{checksum, ImportOutcome, WorkflowFileRecord, WorkflowRepository};
