use std::io::Read;
use chrono::{DateTime, Utc};
use csv::StringRecord;
use serde::Serialize;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::record::{EverMarried, Gender, PatientRecord, Residence};
use crate::store::RecordStore;

/// The source spells the residence column differently from the stored
/// field name.
const RESIDENCE_HEADER: &str = "Residence_type";

/// One skipped row: where it was, what it looked like, why it failed.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    pub line: u64,
    pub row: String,
    pub reason: String,
}

/// Outcome of one import run. `imported` counts rows actually inserted;
/// `failures` retains a diagnostic per skipped row.
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub imported: u64,
    pub failures: Vec<RowFailure>,
    pub started_at: DateTime<Utc>,
}

/// Column positions resolved once from the header row.
#[derive(Debug)]
struct HeaderMap {
    id: usize,
    gender: usize,
    age: usize,
    hypertension: usize,
    heart_disease: usize,
    ever_married: usize,
    work_type: usize,
    residence_type: usize,
    avg_glucose_level: usize,
    bmi: usize,
    smoking_status: usize,
    stroke: usize,
}

impl HeaderMap {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let position = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| {
                    Error::new(
                        ErrorKind::Parse,
                        format!("import source is missing column '{}'", name),
                    )
                })
        };
        Ok(HeaderMap {
            id: position("id")?,
            gender: position("gender")?,
            age: position("age")?,
            hypertension: position("hypertension")?,
            heart_disease: position("heart_disease")?,
            ever_married: position("ever_married")?,
            work_type: position("work_type")?,
            residence_type: position(RESIDENCE_HEADER)?,
            avg_glucose_level: position("avg_glucose_level")?,
            bmi: position("bmi")?,
            smoking_status: position("smoking_status")?,
            stroke: position("stroke")?,
        })
    }
}

fn cell<'a>(row: &'a StringRecord, index: usize, name: &str) -> Result<&'a str> {
    row.get(index).ok_or_else(|| {
        Error::new(ErrorKind::RowImport, format!("row is missing field '{}'", name))
    })
}

fn parse_i64(value: &str, name: &str) -> Result<i64> {
    value.trim().parse::<i64>().map_err(|_| {
        Error::new(
            ErrorKind::RowImport,
            format!("{}: invalid integer '{}'", name, value),
        )
    })
}

fn parse_f64(value: &str, name: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| {
        Error::new(
            ErrorKind::RowImport,
            format!("{}: invalid number '{}'", name, value),
        )
    })
}

fn parse_flag(value: &str, name: &str) -> Result<u8> {
    match value.trim() {
        "0" => Ok(0),
        "1" => Ok(1),
        other => Err(Error::new(
            ErrorKind::RowImport,
            format!("{}: expected 0 or 1, got '{}'", name, other),
        )),
    }
}

/// `""` and `"N/A"` mark a bmi that was never measured, distinct from 0.
fn parse_bmi(value: &str) -> Result<Option<f64>> {
    match value.trim() {
        "" | "N/A" => Ok(None),
        other => parse_f64(other, "bmi").map(Some),
    }
}

fn coerce_row(headers: &HeaderMap, row: &StringRecord) -> Result<PatientRecord> {
    let smoking = cell(row, headers.smoking_status, "smoking_status")?.trim();
    let record = PatientRecord {
        patient_id: parse_i64(cell(row, headers.id, "id")?, "id")?,
        gender: Gender::parse(cell(row, headers.gender, "gender")?.trim())?,
        age: parse_f64(cell(row, headers.age, "age")?, "age")?,
        hypertension: parse_flag(cell(row, headers.hypertension, "hypertension")?, "hypertension")?,
        heart_disease: parse_flag(
            cell(row, headers.heart_disease, "heart_disease")?,
            "heart_disease",
        )?,
        ever_married: EverMarried::parse(cell(row, headers.ever_married, "ever_married")?.trim())?,
        work_type: cell(row, headers.work_type, "work_type")?.trim().to_string(),
        residence_type: Residence::parse(cell(row, headers.residence_type, RESIDENCE_HEADER)?.trim())?,
        avg_glucose_level: parse_f64(
            cell(row, headers.avg_glucose_level, "avg_glucose_level")?,
            "avg_glucose_level",
        )?,
        bmi: parse_bmi(cell(row, headers.bmi, "bmi")?)?,
        smoking_status: if smoking.is_empty() {
            None
        } else {
            Some(smoking.to_string())
        },
        stroke: parse_flag(cell(row, headers.stroke, "stroke")?, "stroke")?,
    };
    record.validate()?;
    Ok(record)
}

/// Replace-all import from a delimited source with a header row.
///
/// The run is not transactional: the clear happens first, then rows are
/// inserted one at a time, so a failure partway through leaves the
/// collection with whatever prefix was already inserted. A row that
/// fails coercion, validation or insert is skipped and diagnosed without
/// aborting the stream. Run this as a maintenance operation with no
/// concurrent writers.
pub fn import_replace_all<R: Read>(store: &dyn RecordStore, source: R) -> Result<ImportReport> {
    let started_at = Utc::now();
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(source);

    // header resolution precedes the clear, so a source with the wrong
    // shape never destroys the existing collection
    let headers = HeaderMap::resolve(reader.headers()?)?;

    let cleared = store.delete_all()?;
    tracing::debug!(cleared, "cleared collection for import");

    let mut imported = 0u64;
    let mut failures = Vec::new();

    for (index, row) in reader.records().enumerate() {
        let line = (index + 2) as u64; // header occupies line 1

        let row = match row {
            Ok(row) => row,
            Err(e) => {
                let failure = RowFailure {
                    line,
                    row: String::new(),
                    reason: format!("unreadable row: {}", e),
                };
                tracing::warn!(line, reason = %failure.reason, "skipping import row");
                failures.push(failure);
                continue;
            }
        };

        let outcome = coerce_row(&headers, &row)
            .and_then(|record| store.insert(record.to_document()));

        match outcome {
            Ok(_) => imported += 1,
            Err(e) => {
                let failure = RowFailure {
                    line,
                    row: row.iter().collect::<Vec<_>>().join(","),
                    reason: e.to_string(),
                };
                tracing::warn!(line, reason = %failure.reason, "skipping import row");
                failures.push(failure);
            }
        }
    }

    Ok(ImportReport {
        imported,
        failures,
        started_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_sentinels_map_to_absent() {
        assert_eq!(parse_bmi("").unwrap(), None);
        assert_eq!(parse_bmi("N/A").unwrap(), None);
        assert_eq!(parse_bmi("27.4").unwrap(), Some(27.4));
        assert!(parse_bmi("high").is_err());
    }

    #[test]
    fn flags_reject_values_outside_zero_one() {
        assert_eq!(parse_flag("0", "stroke").unwrap(), 0);
        assert_eq!(parse_flag("1", "stroke").unwrap(), 1);
        assert!(parse_flag("2", "stroke").is_err());
        assert!(parse_flag("yes", "stroke").is_err());
    }

    #[test]
    fn header_resolution_reports_the_missing_column() {
        let headers = StringRecord::from(vec!["id", "gender", "age"]);
        let err = HeaderMap::resolve(&headers).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(err.context.contains("hypertension"));
    }
}
