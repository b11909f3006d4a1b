use std::io::Read;
use std::sync::Arc;
use serde::Serialize;
use crate::auth::guard::{self, Decision, OperationClass, Principal};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::record::{PatientRecord, StoredRecord};
use crate::core::types::RecordId;
use crate::import::pipeline::{self, ImportReport};
use crate::query::filter::Filter;
use crate::query::page::{self, Page};
use crate::query::search::build_filter;
use crate::stats::engine::{self, StatsSnapshot};
use crate::store::RecordStore;

/// Where a listing page came from. `Placeholder` marks the advisory
/// dataset; it never stands in for an empty search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageSource {
    Live,
    Placeholder,
}

/// One listing page as handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub items: Vec<StoredRecord>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
    pub source: PageSource,
    pub notice: Option<String>,
}

/// The patient administration operations, each gated by the role guard.
/// Holds the store as an injected capability; construction wires the
/// dependencies once, at the process entry point.
pub struct Registry {
    store: Arc<dyn RecordStore>,
    config: Config,
}

impl Registry {
    pub fn new(store: Arc<dyn RecordStore>, config: Config) -> Self {
        Registry { store, config }
    }

    fn guard(&self, who: &Principal, operation: OperationClass) -> Result<()> {
        match guard::authorize(who, operation) {
            Decision::Allow => Ok(()),
            Decision::RequireLogin => Err(Error::new(
                ErrorKind::Unauthenticated,
                "login required".to_string(),
            )),
            Decision::Deny { notice } | Decision::NoOp { notice } => {
                Err(Error::new(ErrorKind::Forbidden, notice))
            }
        }
    }

    /// Search and page through the collection.
    ///
    /// Store unreachability degrades to the placeholder page with a
    /// warning notice instead of failing the listing. The placeholder
    /// also stands in when the collection is truly empty and the query
    /// was unfiltered, so a fresh deployment shows something; an empty
    /// search result passes through untouched.
    pub fn search(&self, who: &Principal, q: &str, page_number: i64) -> Result<PageView> {
        self.guard(who, OperationClass::Read)?;
        let filter = build_filter(q)?;

        let fetched = match page::fetch_page(self.store.as_ref(), &filter, page_number) {
            Ok(fetched) => fetched,
            Err(e) if e.kind == ErrorKind::StoreUnavailable => {
                tracing::warn!(error = %e, "store unreachable, serving placeholder page");
                return Ok(placeholder_view(
                    "Could not reach the record store. Showing placeholder data instead.",
                ));
            }
            Err(e) => return Err(e),
        };

        if fetched.total == 0 && matches!(filter, Filter::All) && self.config.placeholder_on_empty {
            return Ok(placeholder_view(
                "The record store is connected but no patients are stored yet.",
            ));
        }

        Ok(PageView {
            items: typed_items(&fetched),
            total: fetched.total,
            page: fetched.page,
            total_pages: fetched.total_pages,
            source: PageSource::Live,
            notice: None,
        })
    }

    pub fn get(&self, who: &Principal, id: &RecordId) -> Result<StoredRecord> {
        self.guard(who, OperationClass::Read)?;
        match self.store.find_one(id)? {
            Some(doc) => Ok(StoredRecord {
                id: doc.id,
                record: PatientRecord::from_document(&doc)?,
            }),
            None => Err(Error::new(
                ErrorKind::NotFound,
                format!("record {} not found", id),
            )),
        }
    }

    pub fn create(&self, who: &Principal, record: PatientRecord) -> Result<RecordId> {
        self.guard(who, OperationClass::Mutate)?;
        record.validate()?;
        self.store.insert(record.to_document())
    }

    /// Full-document replace of one record.
    pub fn update(&self, who: &Principal, id: &RecordId, record: PatientRecord) -> Result<()> {
        self.guard(who, OperationClass::Mutate)?;
        record.validate()?;
        self.store.update(id, record.to_document())
    }

    pub fn delete(&self, who: &Principal, id: &RecordId) -> Result<()> {
        self.guard(who, OperationClass::Mutate)?;
        self.store.delete(id)
    }

    /// The dashboard snapshot. An unreachable store yields the zeroed
    /// snapshot rather than an error; the dashboard renders empty and
    /// the degradation is logged.
    pub fn stats(&self, who: &Principal) -> Result<StatsSnapshot> {
        self.guard(who, OperationClass::Read)?;
        match engine::compute(self.store.as_ref()) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) if e.kind == ErrorKind::StoreUnavailable => {
                tracing::warn!(error = %e, "store unreachable, serving empty stats snapshot");
                Ok(StatsSnapshot::empty())
            }
            Err(e) => Err(e),
        }
    }

    /// Replace-all import from a delimited source. Not transactional;
    /// see the pipeline documentation for the partial-failure contract.
    pub fn import_csv<R: Read>(&self, who: &Principal, source: R) -> Result<ImportReport> {
        self.guard(who, OperationClass::Mutate)?;
        pipeline::import_replace_all(self.store.as_ref(), source)
    }

    /// Decide a promotion/demotion request against the role policy.
    /// The account mutation itself belongs to the authentication
    /// collaborator; this registry only rules on it.
    pub fn authorize_role_change(&self, who: &Principal, target_id: i64) -> Decision {
        guard::authorize_demotion(who, target_id)
    }
}

fn placeholder_view(notice: &str) -> PageView {
    let fetched = page::placeholder_page();
    PageView {
        items: typed_items(&fetched),
        total: fetched.total,
        page: fetched.page,
        total_pages: fetched.total_pages,
        source: PageSource::Placeholder,
        notice: Some(notice.to_string()),
    }
}

/// Convert raw page documents into typed items, dropping (and logging)
/// any document that no longer parses so one bad record cannot take the
/// listing down.
fn typed_items(fetched: &Page) -> Vec<StoredRecord> {
    fetched
        .items
        .iter()
        .filter_map(|doc| match PatientRecord::from_document(doc) {
            Ok(record) => Some(StoredRecord { id: doc.id, record }),
            Err(e) => {
                tracing::warn!(id = %doc.id, error = %e, "skipping malformed record in listing");
                None
            }
        })
        .collect()
}
