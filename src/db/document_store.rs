use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

/// Collection names used by this service.
pub mod collections {
    pub const TEMPLATES: &str = "templates";
    pub const CONTACTS: &str = "contacts";
    pub const CAMPAIGNS: &str = "campaigns";
    pub const SEND_LOGS: &str = "send_logs";
}

/// Opaque JSON document persistence. Documents carry their own identity in
/// the stored value; the store never interprets them beyond the optional
/// equality filter on `list`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, sqlx::Error>;

    /// Lists a collection in insertion order. When `filter` is a JSON
    /// object, only documents whose top-level fields contain all of its
    /// entries are returned.
    async fn list(&self, collection: &str, filter: Option<&Value>)
        -> Result<Vec<Value>, sqlx::Error>;

    /// Inserts or replaces a document, allocating an id when none is given.
    async fn put(
        &self,
        collection: &str,
        id: Option<Uuid>,
        data: Value,
    ) -> Result<Uuid, sqlx::Error>;

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, sqlx::Error>;
}
