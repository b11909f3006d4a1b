use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Document, FieldValue, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Dashboard ordering: Male, Female, Other.
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            other => Err(Error::new(
                ErrorKind::Validation,
                format!("gender must be Male, Female or Other, got '{}'", other),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EverMarried {
    Yes,
    No,
}

impl EverMarried {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Yes" => Ok(EverMarried::Yes),
            "No" => Ok(EverMarried::No),
            other => Err(Error::new(
                ErrorKind::Validation,
                format!("ever_married must be Yes or No, got '{}'", other),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EverMarried::Yes => "Yes",
            EverMarried::No => "No",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Residence {
    Urban,
    Rural,
}

impl Residence {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Urban" => Ok(Residence::Urban),
            "Rural" => Ok(Residence::Rural),
            other => Err(Error::new(
                ErrorKind::Validation,
                format!("residence_type must be Urban or Rural, got '{}'", other),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Residence::Urban => "Urban",
            Residence::Rural => "Rural",
        }
    }
}

/// Typed view of one patient risk document.
///
/// The store itself is schemaless; this is the validated shape the
/// administration operations work with. `bmi` is optional and its absence
/// is distinct from 0.0 everywhere (storage, search, averages). The
/// hypertension / heart_disease / stroke flags keep their 0/1 source
/// encoding; anything outside {0, 1} is rejected at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: i64,
    pub gender: Gender,
    pub age: f64,
    pub hypertension: u8,
    pub heart_disease: u8,
    pub ever_married: EverMarried,
    pub work_type: String,
    pub residence_type: Residence,
    pub avg_glucose_level: f64,
    pub bmi: Option<f64>,
    pub smoking_status: Option<String>,
    pub stroke: u8,
}

/// A record together with the identity the store assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub record: PatientRecord,
}

fn check_flag(name: &str, value: u8) -> Result<()> {
    if value > 1 {
        return Err(Error::new(
            ErrorKind::Validation,
            format!("{} must be 0 or 1, got {}", name, value),
        ));
    }
    Ok(())
}

impl PatientRecord {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=130.0).contains(&self.age) {
            return Err(Error::new(
                ErrorKind::Validation,
                format!("age must be within 0-130, got {}", self.age),
            ));
        }
        if self.avg_glucose_level < 0.0 {
            return Err(Error::new(
                ErrorKind::Validation,
                format!("avg_glucose_level must be >= 0, got {}", self.avg_glucose_level),
            ));
        }
        if let Some(bmi) = self.bmi {
            if bmi <= 0.0 {
                return Err(Error::new(
                    ErrorKind::Validation,
                    format!("bmi must be positive when present, got {}", bmi),
                ));
            }
        }
        if self.work_type.is_empty() {
            return Err(Error::new(
                ErrorKind::Validation,
                "work_type must not be empty".to_string(),
            ));
        }
        if self.work_type.len() > 50 {
            return Err(Error::new(
                ErrorKind::Validation,
                format!("work_type exceeds 50 characters: '{}'", self.work_type),
            ));
        }
        if let Some(status) = &self.smoking_status {
            if status.len() > 50 {
                return Err(Error::new(
                    ErrorKind::Validation,
                    format!("smoking_status exceeds 50 characters: '{}'", status),
                ));
            }
        }
        check_flag("hypertension", self.hypertension)?;
        check_flag("heart_disease", self.heart_disease)?;
        check_flag("stroke", self.stroke)?;
        Ok(())
    }

    /// Flatten into the schemaless document shape the store keeps.
    /// An absent `bmi` or `smoking_status` produces no field at all.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.set("patient_id", FieldValue::Number(self.patient_id as f64));
        doc.set("gender", FieldValue::Text(self.gender.as_str().to_string()));
        doc.set("age", FieldValue::Number(self.age));
        doc.set("hypertension", FieldValue::Number(self.hypertension as f64));
        doc.set("heart_disease", FieldValue::Number(self.heart_disease as f64));
        doc.set("ever_married", FieldValue::Text(self.ever_married.as_str().to_string()));
        doc.set("work_type", FieldValue::Text(self.work_type.clone()));
        doc.set("residence_type", FieldValue::Text(self.residence_type.as_str().to_string()));
        doc.set("avg_glucose_level", FieldValue::Number(self.avg_glucose_level));
        if let Some(bmi) = self.bmi {
            doc.set("bmi", FieldValue::Number(bmi));
        }
        if let Some(status) = &self.smoking_status {
            doc.set("smoking_status", FieldValue::Text(status.clone()));
        }
        doc.set("stroke", FieldValue::Number(self.stroke as f64));
        doc
    }

    /// Rebuild the typed view from a stored document.
    pub fn from_document(doc: &Document) -> Result<Self> {
        let record = PatientRecord {
            patient_id: required_number(doc, "patient_id")? as i64,
            gender: Gender::parse(required_text(doc, "gender")?)?,
            age: required_number(doc, "age")?,
            hypertension: flag_from_number(doc, "hypertension")?,
            heart_disease: flag_from_number(doc, "heart_disease")?,
            ever_married: EverMarried::parse(required_text(doc, "ever_married")?)?,
            work_type: required_text(doc, "work_type")?.to_string(),
            residence_type: Residence::parse(required_text(doc, "residence_type")?)?,
            avg_glucose_level: required_number(doc, "avg_glucose_level")?,
            bmi: doc.number("bmi"),
            smoking_status: doc.text("smoking_status").map(String::from),
            stroke: flag_from_number(doc, "stroke")?,
        };
        Ok(record)
    }
}

fn required_text<'a>(doc: &'a Document, name: &str) -> Result<&'a str> {
    doc.text(name).ok_or_else(|| {
        Error::new(
            ErrorKind::Validation,
            format!("document {} is missing text field '{}'", doc.id, name),
        )
    })
}

fn required_number(doc: &Document, name: &str) -> Result<f64> {
    doc.number(name).ok_or_else(|| {
        Error::new(
            ErrorKind::Validation,
            format!("document {} is missing numeric field '{}'", doc.id, name),
        )
    })
}

fn flag_from_number(doc: &Document, name: &str) -> Result<u8> {
    let n = required_number(doc, name)?;
    if n == 0.0 {
        Ok(0)
    } else if n == 1.0 {
        Ok(1)
    } else {
        Err(Error::new(
            ErrorKind::Validation,
            format!("{} must be 0 or 1, got {}", name, n),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PatientRecord {
        PatientRecord {
            patient_id: 1001,
            gender: Gender::Male,
            age: 45.0,
            hypertension: 0,
            heart_disease: 1,
            ever_married: EverMarried::Yes,
            work_type: "Private".to_string(),
            residence_type: Residence::Urban,
            avg_glucose_level: 105.4,
            bmi: Some(27.3),
            smoking_status: Some("never smoked".to_string()),
            stroke: 0,
        }
    }

    #[test]
    fn document_round_trip_preserves_all_fields() {
        let record = sample();
        let doc = record.to_document();
        let back = PatientRecord::from_document(&doc).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn absent_bmi_stays_absent_through_round_trip() {
        let mut record = sample();
        record.bmi = None;
        let doc = record.to_document();
        assert!(doc.get("bmi").is_none());
        let back = PatientRecord::from_document(&doc).unwrap();
        assert_eq!(back.bmi, None);
    }

    #[test]
    fn flag_outside_zero_one_is_rejected() {
        let mut record = sample();
        record.stroke = 2;
        let err = record.validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn age_outside_range_is_rejected() {
        let mut record = sample();
        record.age = 131.0;
        assert!(record.validate().is_err());
        record.age = -1.0;
        assert!(record.validate().is_err());
    }

    #[test]
    fn unknown_gender_text_fails_parse() {
        let mut doc = sample().to_document();
        doc.set("gender", FieldValue::Text("Unknown".to_string()));
        assert!(PatientRecord::from_document(&doc).is_err());
    }
}
