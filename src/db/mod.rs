pub mod document_store;
pub mod memory_store;
pub mod postgres_document_store;
