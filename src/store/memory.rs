//! Process-local in-memory document store.
//!
//! Fallback backend with the same conditional-match semantics as a durable
//! store. Documents keep insertion order within a collection, so `find_one`
//! is deterministic. Unique indexes declared at construction turn duplicate
//! inserts into [`FlowError::StorageConflict`], which is what converts the
//! import check-then-act race into a benign, re-queryable conflict.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use super::filter::Filter;
use super::DocumentStore;
use crate::error::FlowError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Value>>,
    unique_indexes: Vec<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a unique index on `field` of `collection`.
    pub fn with_unique_index(mut self, collection: &str, field: &str) -> Self {
        self.unique_indexes
            .push((collection.to_string(), field.to_string()));
        self
    }

    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    fn check_unique(
        &self,
        collection: &str,
        docs: &[Value],
        doc: &Value,
    ) -> Result<(), FlowError> {
        for (indexed_collection, field) in &self.unique_indexes {
            if indexed_collection != collection {
                continue;
            }
            let Some(candidate) = doc.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            if docs.iter().any(|existing| existing.get(field) == Some(candidate)) {
                return Err(FlowError::StorageConflict(format!(
                    "duplicate value for unique field `{field}` in `{collection}`"
                )));
            }
        }
        Ok(())
    }
}

fn merge_top_level(doc: &mut Value, changes: &Value) {
    let (Some(target), Some(source)) = (doc.as_object_mut(), changes.as_object()) else {
        return;
    };
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, FlowError> {
        let Some(docs) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut matched = Vec::new();
        for doc in docs.iter() {
            if filter.matches(doc)? {
                matched.push(doc.clone());
            }
        }
        Ok(matched)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Value>, FlowError> {
        let Some(docs) = self.collections.get(collection) else {
            return Ok(None);
        };
        for doc in docs.iter() {
            if filter.matches(doc)? {
                return Ok(Some(doc.clone()));
            }
        }
        Ok(None)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, FlowError> {
        self.find_one(collection, &Filter::new().eq("_id", id)).await
    }

    async fn create(&self, collection: &str, mut doc: Value) -> Result<Value, FlowError> {
        if !doc.is_object() {
            return Err(FlowError::Storage("document must be an object".to_string()));
        }
        if doc.get("_id").is_none_or(Value::is_null) {
            doc["_id"] = Value::String(Uuid::new_v4().to_string());
        }
        // Uniqueness is checked under the collection's shard lock so two
        // simultaneous inserts of the same key cannot both pass.
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        self.check_unique(collection, &docs, &doc)?;
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Value,
    ) -> Result<bool, FlowError> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(false);
        };
        for doc in docs.iter_mut() {
            if filter.matches(doc)? {
                merge_top_level(doc, &changes);
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Value,
    ) -> Result<u64, FlowError> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(0);
        };
        let mut updated = 0;
        for doc in docs.iter_mut() {
            if filter.matches(doc)? {
                merge_top_level(doc, &changes);
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, FlowError> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(false);
        };
        let mut position = None;
        for (index, doc) in docs.iter().enumerate() {
            if filter.matches(doc)? {
                position = Some(index);
                break;
            }
        }
        match position {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
