use std::collections::BinaryHeap;
use std::cmp::Ordering;
use crate::core::record::StoredRecord;

/// Entry keyed by glucose level for the bounded heap.
struct Entry {
    glucose: f64,
    item: StoredRecord,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.glucose == other.glucose
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // Reverse order so the heap evicts the lowest glucose first
        other.glucose.partial_cmp(&self.glucose)
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Bounded collector keeping the k highest-glucose records offered so far.
/// Records with equal glucose rank in whatever order the heap settles on;
/// the caller treats ties as unordered.
pub struct RiskCollector {
    heap: BinaryHeap<Entry>,
    k: usize,
}

impl RiskCollector {
    pub fn new(k: usize) -> Self {
        RiskCollector {
            heap: BinaryHeap::with_capacity(k + 1),
            k,
        }
    }

    pub fn offer(&mut self, glucose: f64, item: StoredRecord) {
        self.heap.push(Entry { glucose, item });
        if self.heap.len() > self.k {
            self.heap.pop();
        }
    }

    /// Drain into a list sorted by glucose, highest first.
    pub fn into_sorted(self) -> Vec<StoredRecord> {
        let mut entries: Vec<Entry> = self.heap.into_iter().collect();
        entries.sort_by(|a, b| {
            b.glucose
                .partial_cmp(&a.glucose)
                .unwrap_or(Ordering::Equal)
        });
        entries.into_iter().map(|e| e.item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{EverMarried, Gender, PatientRecord, Residence};
    use crate::core::types::RecordId;

    fn stored(patient_id: i64, glucose: f64) -> StoredRecord {
        StoredRecord {
            id: RecordId::new(),
            record: PatientRecord {
                patient_id,
                gender: Gender::Female,
                age: 70.0,
                hypertension: 0,
                heart_disease: 0,
                ever_married: EverMarried::Yes,
                work_type: "Private".to_string(),
                residence_type: Residence::Urban,
                avg_glucose_level: glucose,
                bmi: None,
                smoking_status: None,
                stroke: 1,
            },
        }
    }

    #[test]
    fn keeps_only_the_k_highest() {
        let mut collector = RiskCollector::new(3);
        for (id, glucose) in [(1, 90.0), (2, 250.0), (3, 120.0), (4, 200.0), (5, 110.0)] {
            collector.offer(glucose, stored(id, glucose));
        }
        let top = collector.into_sorted();
        let ids: Vec<i64> = top.iter().map(|s| s.record.patient_id).collect();
        assert_eq!(ids, vec![2, 4, 3]);
    }

    #[test]
    fn fewer_offers_than_k_returns_everything_sorted() {
        let mut collector = RiskCollector::new(10);
        collector.offer(100.0, stored(1, 100.0));
        collector.offer(180.0, stored(2, 180.0));
        let top = collector.into_sorted();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].record.patient_id, 2);
    }
}
