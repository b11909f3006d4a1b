pub mod memory;

use crate::core::error::Result;
use crate::core::types::{Document, RecordId};
use crate::query::filter::Filter;

/// Uniform interface over the schemaless patient collection. The sole
/// component that touches the underlying store; everything else receives
/// it as an injected capability.
///
/// Implementations report an unreachable backing store as
/// `ErrorKind::StoreUnavailable` on every operation, distinct from
/// `NotFound`, so callers can degrade instead of crash. Per-document
/// writes are atomic; nothing here provides multi-document transactions,
/// and two concurrent updates to the same identity race last-write-wins.
pub trait RecordStore: Send + Sync {
    /// Insert a document. The store assigns the identity; any id on the
    /// incoming document is replaced, and the assigned id is returned.
    fn insert(&self, doc: Document) -> Result<RecordId>;

    fn find_one(&self, id: &RecordId) -> Result<Option<Document>>;

    /// Filtered scan in store iteration order, windowed by skip/limit.
    fn find(&self, filter: &Filter, skip: usize, limit: usize) -> Result<Vec<Document>>;

    fn count(&self, filter: &Filter) -> Result<u64>;

    /// Full-document replace. `NotFound` if the identity is absent.
    fn update(&self, id: &RecordId, doc: Document) -> Result<()>;

    /// Immediate, unrecoverable delete. `NotFound` if the identity is absent.
    fn delete(&self, id: &RecordId) -> Result<()>;

    /// Drop every document, returning how many were removed.
    fn delete_all(&self) -> Result<u64>;
}
