use serde::Serialize;
use crate::core::error::Result;
use crate::core::record::{Gender, PatientRecord, StoredRecord};
use crate::query::filter::{AgeBand, Filter};
use crate::stats::collector::RiskCollector;
use crate::store::RecordStore;

/// How many stroke-positive records the dashboard highlights.
pub const HIGH_RISK_LIMIT: usize = 10;

/// Dashboard labels for the fixed age partition.
pub const AGE_BAND_LABELS: [&str; 5] = ["0-20", "21-40", "41-60", "61-80", "81+"];

/// The age partition: [0,20], then half-open (20,40], (40,60], (60,80],
/// and (80, inf). Age exactly 20 falls in the first band, exactly 40 in
/// the second, exactly 80 in the fourth.
const AGE_BANDS: [AgeBand; 5] = [
    AgeBand { gt: None, gte: Some(0.0), lte: Some(20.0) },
    AgeBand { gt: Some(20.0), gte: None, lte: Some(40.0) },
    AgeBand { gt: Some(40.0), gte: None, lte: Some(60.0) },
    AgeBand { gt: Some(60.0), gte: None, lte: Some(80.0) },
    AgeBand { gt: Some(80.0), gte: None, lte: None },
];

/// The full analytics snapshot from one aggregation pass.
///
/// Averages are None over an empty set: `avg_bmi` covers only records
/// that carry a bmi at all, so absent values never drag the mean toward
/// zero. `high_risk` orders equal glucose levels by store iteration
/// order, which is not guaranteed stable across stores.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub stroke_yes: u64,
    pub stroke_no: u64,
    /// Percentage, one decimal. 0.0 over an empty collection.
    pub stroke_rate: f64,
    /// Counts in Gender::ALL order: Male, Female, Other.
    pub gender_counts: [u64; 3],
    pub avg_age: Option<f64>,
    pub avg_glucose: Option<f64>,
    pub avg_bmi: Option<f64>,
    /// Counts per AGE_BAND_LABELS band.
    pub age_band_counts: [u64; 5],
    pub high_risk: Vec<StoredRecord>,
}

impl StatsSnapshot {
    /// The degraded all-zero snapshot used when the store is unreachable.
    pub fn empty() -> Self {
        StatsSnapshot {
            total: 0,
            stroke_yes: 0,
            stroke_no: 0,
            stroke_rate: 0.0,
            gender_counts: [0; 3],
            avg_age: None,
            avg_glucose: None,
            avg_bmi: None,
            age_band_counts: [0; 5],
            high_risk: Vec::new(),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Running sums for the three averages, fed by one collection scan.
#[derive(Default)]
struct Averages {
    age_sum: f64,
    age_n: u64,
    glucose_sum: f64,
    glucose_n: u64,
    bmi_sum: f64,
    bmi_n: u64,
}

impl Averages {
    fn mean(sum: f64, n: u64) -> Option<f64> {
        if n == 0 {
            None
        } else {
            Some(round1(sum / n as f64))
        }
    }
}

/// Compute the whole snapshot. Fails with the store's error if it cannot
/// count at all; within one successful pass each statistic is computed
/// independently, so a record that defeats the typed conversion only
/// drops out of the high-risk list, never out of the counts.
pub fn compute(store: &dyn RecordStore) -> Result<StatsSnapshot> {
    let total = store.count(&Filter::All)?;
    let stroke_yes = store.count(&Filter::Stroke(1))?;
    let stroke_no = store.count(&Filter::Stroke(0))?;

    let stroke_rate = if total > 0 {
        round1(stroke_yes as f64 / total as f64 * 100.0)
    } else {
        0.0
    };

    let mut gender_counts = [0u64; 3];
    for (slot, gender) in gender_counts.iter_mut().zip(Gender::ALL) {
        *slot = store.count(&Filter::Gender(gender))?;
    }

    let mut age_band_counts = [0u64; 5];
    for (slot, band) in age_band_counts.iter_mut().zip(AGE_BANDS) {
        *slot = store.count(&Filter::AgeBand(band))?;
    }

    let mut averages = Averages::default();
    let mut collector = RiskCollector::new(HIGH_RISK_LIMIT);

    for doc in store.find(&Filter::All, 0, usize::MAX)? {
        if let Some(age) = doc.number("age") {
            averages.age_sum += age;
            averages.age_n += 1;
        }
        if let Some(glucose) = doc.number("avg_glucose_level") {
            averages.glucose_sum += glucose;
            averages.glucose_n += 1;
        }
        // absent bmi is excluded from the mean, not treated as zero
        if let Some(bmi) = doc.number("bmi") {
            averages.bmi_sum += bmi;
            averages.bmi_n += 1;
        }

        if doc.number("stroke") == Some(1.0) {
            match PatientRecord::from_document(&doc) {
                Ok(record) => {
                    let glucose = record.avg_glucose_level;
                    collector.offer(glucose, StoredRecord { id: doc.id, record });
                }
                Err(e) => {
                    tracing::warn!(id = %doc.id, error = %e, "skipping malformed record in high-risk ranking");
                }
            }
        }
    }

    Ok(StatsSnapshot {
        total,
        stroke_yes,
        stroke_no,
        stroke_rate,
        gender_counts,
        avg_age: Averages::mean(averages.age_sum, averages.age_n),
        avg_glucose: Averages::mean(averages.glucose_sum, averages.glucose_n),
        avg_bmi: Averages::mean(averages.bmi_sum, averages.bmi_n),
        age_band_counts,
        high_risk: collector.into_sorted(),
    })
}
