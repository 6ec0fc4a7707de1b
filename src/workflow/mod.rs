//! Workflow persistence: checksum-keyed records and the idempotent import
//! flow.

pub mod record;
pub mod repository;

pub use record::WorkflowFileRecord;
pub use repository::{checksum, ImportOutcome, WorkflowRepository, WORKFLOWS_COLLECTION};
