//! App model: a user-facing product built on one imported workflow, carrying
//! its admission limits and required-parameter flags.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::FlowError;
use crate::store::{DocumentStore, Filter};

pub const APPS_COLLECTION: &str = "apps";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub app_id: String,
    pub name: String,
    pub workflow_id: String,
    /// Max in-flight executions. Zero or negative disables the check.
    #[serde(default)]
    pub concurrency_limit: i64,
    /// Max admissions per rolling 60s window. Zero or negative disables.
    #[serde(default)]
    pub rate_limit: i64,
    /// Param keys that must be present and non-empty at execution time.
    #[serde(default)]
    pub required_params: Vec<String>,
    /// Raw downstream payload template; its `prompt` field is the graph the
    /// binding applier rewrites.
    pub payload: Value,
}

#[derive(Clone)]
pub struct AppRepository {
    store: Arc<dyn DocumentStore>,
}

impl AppRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, app: &App) -> Result<(), FlowError> {
        let doc = serde_json::to_value(app)
            .map_err(|e| FlowError::Internal(format!("app encode: {e}")))?;
        self.store.create(APPS_COLLECTION, doc).await?;
        Ok(())
    }

    pub async fn find_by_app_id(&self, app_id: &str) -> Result<Option<App>, FlowError> {
        let doc = self
            .store
            .find_one(APPS_COLLECTION, &Filter::new().eq("appId", app_id))
            .await?;
        doc.map(|value| {
            serde_json::from_value(value)
                .map_err(|e| FlowError::Storage(format!("app decode: {e}")))
        })
        .transpose()
    }

    pub async fn update(&self, app_id: &str, changes: Value) -> Result<bool, FlowError> {
        self.store
            .update_one(APPS_COLLECTION, &Filter::new().eq("appId", app_id), changes)
            .await
    }
}
