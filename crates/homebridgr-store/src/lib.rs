//! Record persistence for HomeBridgr.
//!
//! Post records are schema-less JSON documents keyed by `(collection, id)`.
//! Route handlers only ever fetch a record by id, merge fields onto it, or
//! list a collection. The `RecordStore` trait captures exactly that surface
//! so tests can substitute their own implementations.

pub mod sqlite;

use serde_json::{Map, Value};

use homebridgr_core::Result;

pub use sqlite::SqliteStore;

/// Storage surface consumed by the route handlers.
pub trait RecordStore: Send + Sync {
    /// Insert a new document. An `id` and `created_at` are generated and
    /// merged into the stored document, which is returned.
    fn insert(&self, collection: &str, fields: Map<String, Value>) -> Result<Value>;

    /// Fetch a document by id. `Ok(None)` when no such record exists.
    fn fetch(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Merge `fields` onto an existing document (last-write-wins, no
    /// read-modify-write transaction spanning callers) and return the
    /// updated document. Errors with `NotFound` if the record is gone.
    fn update(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<Value>;

    /// List a collection, newest first.
    fn list(&self, collection: &str) -> Result<Vec<Value>>;
}
