use crate::core::error::Result;
use crate::query::filter::{Filter, TextFilter};

/// Turn one free-text search token into a filter predicate.
///
/// Empty token matches everything. An integer-parseable token is an exact
/// patient_id lookup; anything else is a case-insensitive substring search
/// over the human-readable text fields. The dispatch is disjoint: a numeric
/// token never falls through to substring matching. Any string is accepted.
pub fn build_filter(q: &str) -> Result<Filter> {
    let q = q.trim();
    if q.is_empty() {
        return Ok(Filter::All);
    }
    if let Ok(id) = q.parse::<i64>() {
        return Ok(Filter::PatientId(id));
    }
    Ok(Filter::TextAny(TextFilter::new(q)?))
}
