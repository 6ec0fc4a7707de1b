//! Content-hash-keyed workflow repository and the import flow.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

use super::record::WorkflowFileRecord;
use crate::error::FlowError;
use crate::graph::{
    parse_graph, parse_upload, MappableInput, MappableOutput, OutputNode, ParameterDefinition,
};
use crate::store::{DocumentStore, Filter};

pub const WORKFLOWS_COLLECTION: &str = "workflow_files";

/// Sha-256 of the raw uploaded bytes, hex-encoded.
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Result of an import: the record's public fields plus whether the content
/// was already known.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub workflow_id: String,
    pub version: u32,
    pub name: String,
    pub nodes_count: usize,
    pub mappable_inputs: Vec<MappableInput>,
    pub mappable_outputs: Vec<MappableOutput>,
    pub parameters: HashMap<String, ParameterDefinition>,
    pub output_nodes: Vec<OutputNode>,
    pub cached: bool,
}

impl ImportOutcome {
    fn from_record(record: WorkflowFileRecord, cached: bool) -> Self {
        Self {
            workflow_id: record.workflow_id,
            version: record.version,
            name: record.name,
            nodes_count: record.nodes_count,
            mappable_inputs: record.parsed.mappable_inputs,
            mappable_outputs: record.parsed.mappable_outputs,
            parameters: record.parsed.parameters,
            output_nodes: record.parsed.output_nodes,
            cached,
        }
    }
}

/// Repository over the document store. The backend is injected once at
/// construction and never probed per call.
#[derive(Clone)]
pub struct WorkflowRepository {
    store: Arc<dyn DocumentStore>,
}

impl WorkflowRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_checksum(
        &self,
        checksum: &str,
    ) -> Result<Option<WorkflowFileRecord>, FlowError> {
        let doc = self
            .store
            .find_one(WORKFLOWS_COLLECTION, &Filter::new().eq("checksum", checksum))
            .await?;
        doc.map(decode_record).transpose()
    }

    pub async fn find_by_workflow_id(
        &self,
        workflow_id: &str,
    ) -> Result<Option<WorkflowFileRecord>, FlowError> {
        let doc = self
            .store
            .find_one(
                WORKFLOWS_COLLECTION,
                &Filter::new().eq("workflowId", workflow_id),
            )
            .await?;
        doc.map(decode_record).transpose()
    }

    pub async fn create(&self, record: &WorkflowFileRecord) -> Result<(), FlowError> {
        let doc = serde_json::to_value(record)
            .map_err(|e| FlowError::Internal(format!("record encode: {e}")))?;
        self.store.create(WORKFLOWS_COLLECTION, doc).await?;
        Ok(())
    }

    pub async fn update(&self, workflow_id: &str, changes: Value) -> Result<bool, FlowError> {
        self.store
            .update_one(
                WORKFLOWS_COLLECTION,
                &Filter::new().eq("workflowId", workflow_id),
                changes,
            )
            .await
    }

    /// Import raw uploaded bytes.
    ///
    /// Idempotent under identical byte content: a checksum hit returns the
    /// cached fields without re-parsing or re-persisting. On a miss the graph
    /// is parsed, assigned a fresh workflow id, and persisted. Losing a
    /// simultaneous-import race surfaces as a storage conflict, which is
    /// resolved by re-querying the winner's record.
    pub async fn import(&self, name: &str, bytes: &[u8]) -> Result<ImportOutcome, FlowError> {
        let checksum = checksum(bytes);
        if let Some(existing) = self.find_by_checksum(&checksum).await? {
            tracing::debug!(checksum = %checksum, workflow_id = %existing.workflow_id, "import cache hit");
            return Ok(ImportOutcome::from_record(existing, true));
        }

        let graph = parse_upload(bytes)?;
        let parsed = parse_graph(&graph);
        let content = serde_json::to_value(&graph)
            .map_err(|e| FlowError::Internal(format!("graph encode: {e}")))?;
        let record =
            WorkflowFileRecord::new(name, checksum.clone(), graph.nodes.len(), content, parsed);

        match self.create(&record).await {
            Ok(()) => {
                tracing::info!(workflow_id = %record.workflow_id, nodes = record.nodes_count, "workflow imported");
                Ok(ImportOutcome::from_record(record, false))
            }
            Err(FlowError::StorageConflict(_)) => match self.find_by_checksum(&checksum).await? {
                Some(winner) => Ok(ImportOutcome::from_record(winner, true)),
                None => Err(FlowError::StorageConflict(format!(
                    "conflicting import for checksum {checksum} left no record"
                ))),
            },
            Err(other) => Err(other),
        }
    }
}

fn decode_record(doc: Value) -> Result<WorkflowFileRecord, FlowError> {
    serde_json::from_value(doc).map_err(|e| FlowError::Storage(format!("record decode: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn repository() -> WorkflowRepository {
        let store = MemoryStore::new().with_unique_index(WORKFLOWS_COLLECTION, "checksum");
        WorkflowRepository::new(Arc::new(store))
    }

    fn sample_bytes() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "nodes": [
                {"id": 1, "type": "LoadImage", "title": "Input", "inputs": {"image": "photo.png"}},
                {"id": 2, "type": "CLIPTextEncode", "inputs": {"text": "a cat"}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_checksum_is_sha256_hex() {
        let sum = checksum(b"hello");
        assert_eq!(sum.len(), 64);
        assert_eq!(
            sum,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn test_import_then_lookup() {
        let repo = repository();
        let outcome = repo.import("demo", &sample_bytes()).await.unwrap();
        assert!(!outcome.cached);
        assert_eq!(outcome.version, 1);
        assert_eq!(outcome.nodes_count, 2);
        assert!(outcome.parameters.contains_key("loadimage_1_image"));
        assert!(outcome.parameters.contains_key("cliptextencode_1_text"));

        let record = repo
            .find_by_workflow_id(&outcome.workflow_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.name, "demo");
        assert_eq!(record.nodes_count, 2);
    }

    #[tokio::test]
    async fn test_import_is_idempotent_by_content() {
        let repo = repository();
        let first = repo.import("demo", &sample_bytes()).await.unwrap();
        // Different name and time, same bytes: cache hit, no new record.
        let second = repo.import("renamed", &sample_bytes()).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.workflow_id, first.workflow_id);
        assert_eq!(second.name, "demo");

        let sum = checksum(&sample_bytes());
        let by_checksum = repo.find_by_checksum(&sum).await.unwrap();
        assert!(by_checksum.is_some());
    }

    #[tokio::test]
    async fn test_different_content_gets_new_record() {
        let repo = repository();
        let first = repo.import("a", &sample_bytes()).await.unwrap();
        let other = serde_json::to_vec(&json!({"nodes": []})).unwrap();
        let second = repo.import("b", &other).await.unwrap();
        assert!(!second.cached);
        assert_ne!(second.workflow_id, first.workflow_id);
    }

    #[tokio::test]
    async fn test_import_rejects_bad_bytes() {
        let repo = repository();
        assert!(matches!(
            repo.import("x", b"garbage").await.unwrap_err(),
            FlowError::ParseFailure(_)
        ));
        assert!(matches!(
            repo.import("x", br#"{"name": "no nodes"}"#).await.unwrap_err(),
            FlowError::GraphFormat(_)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_checksum_create_is_conflict() {
        let repo = repository();
        let bytes = sample_bytes();
        let sum = checksum(&bytes);
        let first = WorkflowFileRecord::new(
            "first",
            sum.clone(),
            2,
            json!({"nodes": []}),
            crate::graph::ParsedWorkflow::default(),
        );
        let second = WorkflowFileRecord::new(
            "second",
            sum,
            2,
            json!({"nodes": []}),
            crate::graph::ParsedWorkflow::default(),
        );
        repo.create(&first).await.unwrap();
        assert!(matches!(
            repo.create(&second).await.unwrap_err(),
            FlowError::StorageConflict(_)
        ));
    }

    #[tokio::test]
    async fn test_existing_record_short_circuits_import() {
        // A record persisted by another importer is returned as cached,
        // whatever name this importer supplies.
        let store = Arc::new(MemoryStore::new().with_unique_index(WORKFLOWS_COLLECTION, "checksum"));
        let repo = WorkflowRepository::new(store.clone());
        let bytes = sample_bytes();

        let winner = WorkflowFileRecord::new(
            "winner",
            checksum(&bytes),
            2,
            json!({"nodes": []}),
            crate::graph::ParsedWorkflow::default(),
        );
        repo.create(&winner).await.unwrap();

        let outcome = repo.import("loser", &bytes).await.unwrap();
        assert!(outcome.cached);
        assert_eq!(outcome.workflow_id, winner.workflow_id);
        assert_eq!(store.count(WORKFLOWS_COLLECTION), 1);
    }

    #[tokio::test]
    async fn test_update_record() {
        let repo = repository();
        let outcome = repo.import("demo", &sample_bytes()).await.unwrap();
        let updated = repo
            .update(&outcome.workflow_id, json!({"name": "renamed"}))
            .await
            .unwrap();
        assert!(updated);
        let record = repo
            .find_by_workflow_id(&outcome.workflow_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.name, "renamed");
    }
}
