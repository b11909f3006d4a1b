use regex::{Regex, RegexBuilder};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::record::Gender;
use crate::core::types::Document;

/// Fields a free-text token is matched against, in match order.
const TEXT_SEARCH_FIELDS: [&str; 3] = ["gender", "smoking_status", "work_type"];

/// Structured predicate restricting which documents a store operation
/// considers. The fixed set of shapes the registry needs; not a general
/// query language.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Exact match on the caller-supplied patient_id.
    PatientId(i64),
    /// Case-insensitive substring match against gender, smoking_status
    /// and work_type, OR-combined.
    TextAny(TextFilter),
    /// Exact match on the 0/1 stroke label.
    Stroke(u8),
    /// Exact match on gender.
    Gender(Gender),
    /// Numeric window over age. Bounds are optional; gt is strict,
    /// gte and lte are inclusive.
    AgeBand(AgeBand),
}

#[derive(Debug, Clone)]
pub struct TextFilter {
    pub token: String,
    pattern: Regex,
}

impl TextFilter {
    pub fn new(token: &str) -> Result<Self> {
        let pattern = RegexBuilder::new(&regex::escape(token))
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                Error::new(
                    ErrorKind::Internal,
                    format!("failed to compile text filter for '{}': {}", token, e),
                )
            })?;
        Ok(TextFilter {
            token: token.to_string(),
            pattern,
        })
    }

    fn matches(&self, doc: &Document) -> bool {
        TEXT_SEARCH_FIELDS
            .into_iter()
            .any(|field| doc.text(field).is_some_and(|s| self.pattern.is_match(s)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AgeBand {
    pub gt: Option<f64>,
    pub gte: Option<f64>,
    pub lte: Option<f64>,
}

impl AgeBand {
    pub fn contains(&self, age: f64) -> bool {
        if let Some(gt) = self.gt {
            if age <= gt {
                return false;
            }
        }
        if let Some(gte) = self.gte {
            if age < gte {
                return false;
            }
        }
        if let Some(lte) = self.lte {
            if age > lte {
                return false;
            }
        }
        true
    }
}

impl Filter {
    /// Check one document against the predicate.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::PatientId(id) => doc.number("patient_id") == Some(*id as f64),
            Filter::TextAny(text) => text.matches(doc),
            Filter::Stroke(flag) => doc.number("stroke") == Some(*flag as f64),
            Filter::Gender(gender) => doc.text("gender") == Some(gender.as_str()),
            Filter::AgeBand(band) => doc.number("age").is_some_and(|age| band.contains(age)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FieldValue;

    fn doc(gender: &str, smoking: &str, work: &str, age: f64) -> Document {
        let mut d = Document::new();
        d.set("patient_id", FieldValue::Number(1001.0));
        d.set("gender", FieldValue::Text(gender.to_string()));
        d.set("smoking_status", FieldValue::Text(smoking.to_string()));
        d.set("work_type", FieldValue::Text(work.to_string()));
        d.set("age", FieldValue::Number(age));
        d.set("stroke", FieldValue::Number(1.0));
        d
    }

    #[test]
    fn text_filter_is_case_insensitive_substring() {
        let d = doc("Female", "never smoked", "Self-employed", 50.0);
        assert!(Filter::TextAny(TextFilter::new("FEMA").unwrap()).matches(&d));
        assert!(Filter::TextAny(TextFilter::new("smoke").unwrap()).matches(&d));
        assert!(Filter::TextAny(TextFilter::new("EMPLOY").unwrap()).matches(&d));
        assert!(!Filter::TextAny(TextFilter::new("urban").unwrap()).matches(&d));
    }

    #[test]
    fn text_filter_treats_token_literally() {
        let d = doc("Male", "never smoked", "Self-employed", 50.0);
        // '.' must not act as a regex wildcard
        assert!(!Filter::TextAny(TextFilter::new("M.le").unwrap()).matches(&d));
    }

    #[test]
    fn patient_id_filter_is_exact() {
        let d = doc("Male", "smokes", "Private", 30.0);
        assert!(Filter::PatientId(1001).matches(&d));
        assert!(!Filter::PatientId(100).matches(&d));
        assert!(!Filter::PatientId(10011).matches(&d));
    }

    #[test]
    fn age_band_bounds_are_half_open() {
        let band = AgeBand { gt: Some(20.0), gte: None, lte: Some(40.0) };
        assert!(!band.contains(20.0));
        assert!(band.contains(20.5));
        assert!(band.contains(40.0));
        assert!(!band.contains(40.1));
    }

    #[test]
    fn missing_text_field_never_matches() {
        let mut d = doc("Male", "smokes", "Private", 30.0);
        d.fields.remove("smoking_status");
        assert!(!Filter::TextAny(TextFilter::new("smokes").unwrap()).matches(&d));
    }
}
