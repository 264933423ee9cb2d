use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::db::document_store::DocumentStore;

/// In-memory store used by tests and local development. Keeps per-collection
/// insertion order the way the Postgres implementation orders by
/// `created_at`.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<String, Vec<(Uuid, Value)>>>,
    pub should_fail: bool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&self) -> Result<(), sqlx::Error> {
        if self.should_fail {
            return Err(sqlx::Error::Protocol("memory store failure".to_string()));
        }
        Ok(())
    }
}

fn matches_filter(doc: &Value, filter: Option<&Value>) -> bool {
    match filter.and_then(|f| f.as_object()) {
        Some(fields) => fields.iter().all(|(key, value)| doc.get(key) == Some(value)),
        None => true,
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, sqlx::Error> {
        self.fail()?;
        let documents = self.documents.lock().unwrap();
        Ok(documents.get(collection).and_then(|docs| {
            docs.iter()
                .find(|(doc_id, _)| *doc_id == id)
                .map(|(_, doc)| doc.clone())
        }))
    }

    async fn list(
        &self,
        collection: &str,
        filter: Option<&Value>,
    ) -> Result<Vec<Value>, sqlx::Error> {
        self.fail()?;
        let documents = self.documents.lock().unwrap();
        Ok(documents
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| matches_filter(doc, filter))
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn put(
        &self,
        collection: &str,
        id: Option<Uuid>,
        data: Value,
    ) -> Result<Uuid, sqlx::Error> {
        self.fail()?;
        let id = id.unwrap_or_else(Uuid::new_v4);
        let mut documents = self.documents.lock().unwrap();
        let docs = documents.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|(doc_id, _)| *doc_id == id) {
            Some((_, existing)) => *existing = data,
            None => docs.push((id, data)),
        }
        Ok(id)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, sqlx::Error> {
        self.fail()?;
        let mut documents = self.documents.lock().unwrap();
        let docs = match documents.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(false),
        };
        let before = docs.len();
        docs.retain(|(doc_id, _)| *doc_id != id);
        Ok(docs.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::document_store::collections;
    use serde_json::json;

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let store = MemoryDocumentStore::new();
        let id = Uuid::new_v4();
        store
            .put(collections::TEMPLATES, Some(id), json!({ "name": "Intro" }))
            .await
            .unwrap();

        let doc = store.get(collections::TEMPLATES, id).await.unwrap();
        assert_eq!(doc, Some(json!({ "name": "Intro" })));

        assert!(store.delete(collections::TEMPLATES, id).await.unwrap());
        assert!(!store.delete(collections::TEMPLATES, id).await.unwrap());
        assert_eq!(store.get(collections::TEMPLATES, id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_preserves_insertion_order_and_filters() {
        let store = MemoryDocumentStore::new();
        for n in 0..3 {
            store
                .put(
                    collections::SEND_LOGS,
                    None,
                    json!({ "n": n, "campaignId": if n < 2 { "a" } else { "b" } }),
                )
                .await
                .unwrap();
        }

        let all = store.list(collections::SEND_LOGS, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0]["n"], 0);
        assert_eq!(all[2]["n"], 2);

        let filtered = store
            .list(collections::SEND_LOGS, Some(&json!({ "campaignId": "a" })))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[tokio::test]
    async fn should_fail_surfaces_store_errors() {
        let store = MemoryDocumentStore {
            should_fail: true,
            ..Default::default()
        };
        assert!(store.get(collections::CONTACTS, Uuid::new_v4()).await.is_err());
        assert!(store.list(collections::CONTACTS, None).await.is_err());
    }
}
