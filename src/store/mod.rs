//! Document-store boundary.
//!
//! Repositories talk to [`DocumentStore`] and never probe which backend is
//! live; the implementation is chosen once at construction. Only the
//! process-local in-memory backend ships here, a durable backend implements
//! the same contract externally.

pub mod filter;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FlowError;

pub use filter::{Condition, Filter};
pub use memory::MemoryStore;

/// Generic JSON document store with conditional-match queries.
///
/// `create` assigns an `_id` when the document has none and returns the
/// stored document. `update_one`/`update_many` merge the top-level fields of
/// `changes` into matching documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, FlowError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Value>, FlowError>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, FlowError>;

    async fn create(&self, collection: &str, doc: Value) -> Result<Value, FlowError>;

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Value,
    ) -> Result<bool, FlowError>;

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Value,
    ) -> Result<u64, FlowError>;

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, FlowError>;
}
