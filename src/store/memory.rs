use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use parking_lot::RwLock;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Document, RecordId};
use crate::query::filter::Filter;
use crate::store::RecordStore;

/// Insertion-ordered document collection. The order vector is the store
/// iteration order observed by pagination and by top-N tie-breaks.
struct Collection {
    docs: HashMap<RecordId, Document>,
    order: Vec<RecordId>,
}

impl Collection {
    fn empty() -> Self {
        Collection {
            docs: HashMap::new(),
            order: Vec::new(),
        }
    }
}

/// In-memory record store with optional JSON snapshot persistence.
///
/// Reads and writes are guarded by one collection-wide RwLock; each
/// operation is atomic with respect to every other, which is all the
/// concurrency the registry asks of its store.
pub struct MemoryStore {
    inner: RwLock<Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            inner: RwLock::new(Collection::empty()),
        }
    }

    /// Open a store, loading the snapshot at `path` if one exists.
    /// A missing file is a fresh store, not an error.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(MemoryStore::new());
        }
        let file = File::open(path)?;
        let docs: Vec<Document> = serde_json::from_reader(file)?;

        let mut collection = Collection::empty();
        for doc in docs {
            collection.order.push(doc.id);
            collection.docs.insert(doc.id, doc);
        }
        tracing::debug!(count = collection.order.len(), "loaded store snapshot");
        Ok(MemoryStore {
            inner: RwLock::new(collection),
        })
    }

    /// Persist the whole collection, in iteration order, as one JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let inner = self.inner.read();
        let docs: Vec<&Document> = inner
            .order
            .iter()
            .filter_map(|id| inner.docs.get(id))
            .collect();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &docs)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl RecordStore for MemoryStore {
    fn insert(&self, mut doc: Document) -> Result<RecordId> {
        let id = RecordId::new();
        doc.id = id;
        let mut inner = self.inner.write();
        inner.order.push(id);
        inner.docs.insert(id, doc);
        Ok(id)
    }

    fn find_one(&self, id: &RecordId) -> Result<Option<Document>> {
        Ok(self.inner.read().docs.get(id).cloned())
    }

    fn find(&self, filter: &Filter, skip: usize, limit: usize) -> Result<Vec<Document>> {
        let inner = self.inner.read();
        let docs = inner
            .order
            .iter()
            .filter_map(|id| inner.docs.get(id))
            .filter(|doc| filter.matches(doc))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect();
        Ok(docs)
    }

    fn count(&self, filter: &Filter) -> Result<u64> {
        let inner = self.inner.read();
        let count = inner
            .order
            .iter()
            .filter_map(|id| inner.docs.get(id))
            .filter(|doc| filter.matches(doc))
            .count();
        Ok(count as u64)
    }

    fn update(&self, id: &RecordId, mut doc: Document) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner.docs.contains_key(id) {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("record {} not found", id),
            ));
        }
        doc.id = *id;
        inner.docs.insert(*id, doc);
        Ok(())
    }

    fn delete(&self, id: &RecordId) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.docs.remove(id).is_none() {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("record {} not found", id),
            ));
        }
        inner.order.retain(|existing| existing != id);
        Ok(())
    }

    fn delete_all(&self) -> Result<u64> {
        let mut inner = self.inner.write();
        let removed = inner.order.len() as u64;
        inner.docs.clear();
        inner.order.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FieldValue;

    fn doc(patient_id: f64) -> Document {
        let mut d = Document::new();
        d.set("patient_id", FieldValue::Number(patient_id));
        d.set("gender", FieldValue::Text("Male".to_string()));
        d
    }

    #[test]
    fn insert_assigns_a_fresh_identity() {
        let store = MemoryStore::new();
        let incoming = doc(1.0);
        let incoming_id = incoming.id;
        let assigned = store.insert(incoming).unwrap();
        assert_ne!(assigned, incoming_id);
        assert_eq!(store.find_one(&assigned).unwrap().unwrap().id, assigned);
    }

    #[test]
    fn find_preserves_insertion_order_across_delete() {
        let store = MemoryStore::new();
        let a = store.insert(doc(1.0)).unwrap();
        let b = store.insert(doc(2.0)).unwrap();
        let c = store.insert(doc(3.0)).unwrap();
        store.delete(&b).unwrap();

        let found = store.find(&Filter::All, 0, 10).unwrap();
        let ids: Vec<RecordId> = found.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn update_missing_record_is_not_found() {
        let store = MemoryStore::new();
        let err = store.update(&RecordId::new(), doc(1.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn delete_all_reports_removed_count() {
        let store = MemoryStore::new();
        store.insert(doc(1.0)).unwrap();
        store.insert(doc(2.0)).unwrap();
        assert_eq!(store.delete_all().unwrap(), 2);
        assert_eq!(store.count(&Filter::All).unwrap(), 0);
    }
}
