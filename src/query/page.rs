use serde::Serialize;
use crate::core::error::Result;
use crate::core::record::{EverMarried, Gender, PatientRecord, Residence};
use crate::core::types::{Document, RecordId};
use crate::query::filter::Filter;
use crate::store::RecordStore;
use uuid::Uuid;

/// Records per listing page. Fixed by the presentation contract.
pub const PAGE_SIZE: usize = 50;

/// One bounded result window plus its count metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub items: Vec<Document>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

/// Fetch one page of a filtered listing.
///
/// `page` below 1 clamps to 1. Requesting a page past the end yields an
/// empty, well-formed page rather than an error. `total_pages` is always
/// at least 1 so the presentation layer can render a pager over an empty
/// collection.
pub fn fetch_page(store: &dyn RecordStore, filter: &Filter, page: i64) -> Result<Page> {
    let page = if page < 1 { 1 } else { page as u64 };
    let skip = (page - 1) as usize * PAGE_SIZE;

    let total = store.count(filter)?;
    let items = store.find(filter, skip, PAGE_SIZE)?;
    let total_pages = total.div_ceil(PAGE_SIZE as u64).max(1);

    Ok(Page {
        items,
        total,
        page,
        total_pages,
    })
}

/// The fixed advisory dataset shown when the collection is empty and the
/// listing was unfiltered, or when the store is unreachable. This is the
/// only code path that fabricates records; an empty search result is
/// always returned as-is.
pub fn placeholder_page() -> Page {
    let records = [
        (
            Uuid::from_u128(1),
            PatientRecord {
                patient_id: 1001,
                gender: Gender::Male,
                age: 45.0,
                hypertension: 0,
                heart_disease: 0,
                ever_married: EverMarried::Yes,
                work_type: "Private".to_string(),
                residence_type: Residence::Urban,
                avg_glucose_level: 98.2,
                bmi: Some(26.1),
                smoking_status: Some("never smoked".to_string()),
                stroke: 0,
            },
        ),
        (
            Uuid::from_u128(2),
            PatientRecord {
                patient_id: 1002,
                gender: Gender::Female,
                age: 60.0,
                hypertension: 1,
                heart_disease: 0,
                ever_married: EverMarried::Yes,
                work_type: "Self-employed".to_string(),
                residence_type: Residence::Rural,
                avg_glucose_level: 171.5,
                bmi: None,
                smoking_status: Some("formerly smoked".to_string()),
                stroke: 1,
            },
        ),
    ];

    let items: Vec<Document> = records
        .iter()
        .map(|(uuid, record)| {
            let mut doc = record.to_document();
            doc.id = RecordId(*uuid);
            doc
        })
        .collect();

    let total = items.len() as u64;
    Page {
        items,
        total,
        page: 1,
        total_pages: 1,
    }
}
