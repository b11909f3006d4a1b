//! Dashboard snapshot tests: counts, rate rounding, age banding edges,
//! bmi-aware averages, the high-risk ranking and degraded snapshots.

use std::sync::Arc;
use caredex::auth::guard::Principal;
use caredex::core::config::Config;
use caredex::core::error::{Error, ErrorKind, Result};
use caredex::core::record::{EverMarried, Gender, PatientRecord, Residence};
use caredex::core::types::{Document, FieldValue, RecordId};
use caredex::query::filter::Filter;
use caredex::service::registry::Registry;
use caredex::stats::engine;
use caredex::store::RecordStore;
use caredex::store::memory::MemoryStore;

struct StatsFixture {
    store: Arc<MemoryStore>,
}

impl StatsFixture {
    fn new() -> Self {
        StatsFixture {
            store: Arc::new(MemoryStore::new()),
        }
    }

    fn add(&self, gender: Gender, age: f64, glucose: f64, bmi: Option<f64>, stroke: u8) {
        let record = PatientRecord {
            patient_id: 1,
            gender,
            age,
            hypertension: 0,
            heart_disease: 0,
            ever_married: EverMarried::No,
            work_type: "Private".to_string(),
            residence_type: Residence::Rural,
            avg_glucose_level: glucose,
            bmi,
            smoking_status: None,
            stroke,
        };
        self.store.insert(record.to_document()).unwrap();
    }
}

#[test]
fn empty_collection_yields_the_zero_snapshot() {
    let fx = StatsFixture::new();
    let snapshot = engine::compute(fx.store.as_ref()).unwrap();

    assert_eq!(snapshot.total, 0);
    assert_eq!(snapshot.stroke_rate, 0.0);
    assert_eq!(snapshot.gender_counts, [0, 0, 0]);
    assert_eq!(snapshot.age_band_counts, [0; 5]);
    assert_eq!(snapshot.avg_age, None);
    assert_eq!(snapshot.avg_glucose, None);
    assert_eq!(snapshot.avg_bmi, None);
    assert!(snapshot.high_risk.is_empty());
}

#[test]
fn stroke_rate_is_rounded_to_one_decimal() {
    let fx = StatsFixture::new();
    fx.add(Gender::Male, 50.0, 100.0, None, 1);
    fx.add(Gender::Male, 50.0, 100.0, None, 0);
    fx.add(Gender::Male, 50.0, 100.0, None, 0);

    let snapshot = engine::compute(fx.store.as_ref()).unwrap();
    assert_eq!(snapshot.total, 3);
    assert_eq!(snapshot.stroke_yes, 1);
    assert_eq!(snapshot.stroke_no, 2);
    assert_eq!(snapshot.stroke_rate, 33.3);
}

#[test]
fn gender_counts_come_in_fixed_order() {
    let fx = StatsFixture::new();
    fx.add(Gender::Female, 30.0, 90.0, None, 0);
    fx.add(Gender::Female, 35.0, 90.0, None, 0);
    fx.add(Gender::Male, 40.0, 90.0, None, 0);
    fx.add(Gender::Other, 45.0, 90.0, None, 0);

    let snapshot = engine::compute(fx.store.as_ref()).unwrap();
    assert_eq!(snapshot.gender_counts, [1, 2, 1]); // Male, Female, Other
}

#[test]
fn age_band_boundaries_land_exactly_as_documented() {
    let fx = StatsFixture::new();
    for age in [0.0, 20.0, 21.0, 40.0, 41.0, 60.0, 61.0, 80.0, 81.0, 99.0] {
        fx.add(Gender::Male, age, 90.0, None, 0);
    }

    let snapshot = engine::compute(fx.store.as_ref()).unwrap();
    // [0,20]: 0, 20 | (20,40]: 21, 40 | (40,60]: 41, 60
    // (60,80]: 61, 80 | (80,inf): 81, 99
    assert_eq!(snapshot.age_band_counts, [2, 2, 2, 2, 2]);
}

#[test]
fn bmi_average_ignores_absent_values_instead_of_zeroing_them() {
    let fx = StatsFixture::new();
    fx.add(Gender::Male, 50.0, 100.0, Some(20.0), 0);
    fx.add(Gender::Male, 50.0, 100.0, None, 0);
    fx.add(Gender::Male, 50.0, 100.0, Some(30.0), 0);

    let snapshot = engine::compute(fx.store.as_ref()).unwrap();
    assert_eq!(snapshot.avg_bmi, Some(25.0));
}

#[test]
fn all_bmi_absent_means_no_average_at_all() {
    let fx = StatsFixture::new();
    fx.add(Gender::Male, 50.0, 100.0, None, 0);
    fx.add(Gender::Male, 60.0, 110.0, None, 0);

    let snapshot = engine::compute(fx.store.as_ref()).unwrap();
    assert_eq!(snapshot.avg_bmi, None);
    assert_eq!(snapshot.avg_age, Some(55.0));
    assert_eq!(snapshot.avg_glucose, Some(105.0));
}

#[test]
fn averages_are_rounded_to_one_decimal() {
    let fx = StatsFixture::new();
    fx.add(Gender::Male, 33.0, 100.0, None, 0);
    fx.add(Gender::Male, 34.0, 101.0, None, 0);
    fx.add(Gender::Male, 34.0, 101.0, None, 0);

    let snapshot = engine::compute(fx.store.as_ref()).unwrap();
    assert_eq!(snapshot.avg_age, Some(33.7)); // 101/3 = 33.666...
}

#[test]
fn high_risk_is_the_top_ten_stroke_positive_by_glucose_descending() {
    let fx = StatsFixture::new();
    for i in 0..12 {
        fx.add(Gender::Male, 70.0, 100.0 + i as f64 * 10.0, None, 1);
    }
    // high glucose but no stroke: must not appear
    fx.add(Gender::Female, 70.0, 999.0, None, 0);

    let snapshot = engine::compute(fx.store.as_ref()).unwrap();
    assert_eq!(snapshot.high_risk.len(), 10);

    let glucose: Vec<f64> = snapshot
        .high_risk
        .iter()
        .map(|s| s.record.avg_glucose_level)
        .collect();
    assert_eq!(glucose[0], 210.0);
    assert_eq!(glucose[9], 120.0);
    assert!(glucose.windows(2).all(|w| w[0] >= w[1]));
    assert!(snapshot.high_risk.iter().all(|s| s.record.stroke == 1));
}

#[test]
fn malformed_document_drops_from_high_risk_but_not_from_counts() {
    let fx = StatsFixture::new();
    fx.add(Gender::Male, 70.0, 150.0, None, 1);

    // a document written around the typed layer: stroke-positive but with
    // a gender the typed view rejects
    let mut rogue = Document::new();
    rogue.set("patient_id", FieldValue::Number(99.0));
    rogue.set("gender", FieldValue::Text("Unknown".to_string()));
    rogue.set("age", FieldValue::Number(70.0));
    rogue.set("stroke", FieldValue::Number(1.0));
    rogue.set("avg_glucose_level", FieldValue::Number(300.0));
    fx.store.insert(rogue).unwrap();

    let snapshot = engine::compute(fx.store.as_ref()).unwrap();
    assert_eq!(snapshot.total, 2);
    assert_eq!(snapshot.stroke_yes, 2);
    assert_eq!(snapshot.high_risk.len(), 1);
    assert_eq!(snapshot.high_risk[0].record.avg_glucose_level, 150.0);
}

// ---- degradation ----

struct UnreachableStore;

impl RecordStore for UnreachableStore {
    fn insert(&self, _doc: Document) -> Result<RecordId> {
        Err(Error::new(ErrorKind::StoreUnavailable, "down".to_string()))
    }
    fn find_one(&self, _id: &RecordId) -> Result<Option<Document>> {
        Err(Error::new(ErrorKind::StoreUnavailable, "down".to_string()))
    }
    fn find(&self, _filter: &Filter, _skip: usize, _limit: usize) -> Result<Vec<Document>> {
        Err(Error::new(ErrorKind::StoreUnavailable, "down".to_string()))
    }
    fn count(&self, _filter: &Filter) -> Result<u64> {
        Err(Error::new(ErrorKind::StoreUnavailable, "down".to_string()))
    }
    fn update(&self, _id: &RecordId, _doc: Document) -> Result<()> {
        Err(Error::new(ErrorKind::StoreUnavailable, "down".to_string()))
    }
    fn delete(&self, _id: &RecordId) -> Result<()> {
        Err(Error::new(ErrorKind::StoreUnavailable, "down".to_string()))
    }
    fn delete_all(&self) -> Result<u64> {
        Err(Error::new(ErrorKind::StoreUnavailable, "down".to_string()))
    }
}

#[test]
fn unreachable_store_degrades_stats_to_the_empty_snapshot() {
    let registry = Registry::new(Arc::new(UnreachableStore), Config::default());
    let snapshot = registry.stats(&Principal::admin(1)).unwrap();
    assert_eq!(snapshot.total, 0);
    assert_eq!(snapshot.stroke_rate, 0.0);
    assert!(snapshot.high_risk.is_empty());
}
