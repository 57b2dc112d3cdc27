use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Document-level fields the model is asked for. Anything it returns with
/// the wrong type is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub title: Option<String>,
    pub document_type: Option<String>,
    pub effective_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedClause {
    pub clause_number: Option<String>,
    pub heading: Option<String>,
    pub clause_type: Option<String>,
    pub start_page: Option<i32>,
    pub end_page: Option<i32>,
}

/// The guaranteed shape every LLM response is reduced to before anything
/// downstream touches it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub document: ExtractedDocument,
    pub clauses: Vec<ExtractedClause>,
}

/// Reduces an arbitrary JSON value (untrusted shape, straight from model
/// generation) to an `ExtractionRecord`. Missing or malformed fields become
/// None, non-object clause entries are dropped silently, and page numbers go
/// through `safe_int`. This never fails.
pub fn normalize(raw: &Value) -> ExtractionRecord {
    let document = raw
        .get("document")
        .map(|doc| ExtractedDocument {
            title: string_field(doc, "title"),
            document_type: string_field(doc, "document_type"),
            effective_date: string_field(doc, "effective_date"),
        })
        .unwrap_or_default();

    let clauses = raw
        .get("clauses")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter(|entry| entry.is_object())
                .map(|entry| ExtractedClause {
                    clause_number: string_field(entry, "clause_number"),
                    heading: string_field(entry, "heading"),
                    clause_type: string_field(entry, "clause_type"),
                    start_page: safe_int(entry.get("start_page")),
                    end_page: safe_int(entry.get("end_page")),
                })
                .collect()
        })
        .unwrap_or_default();

    ExtractionRecord { document, clauses }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Coerces a JSON value to an integer: integers pass through, floats
/// truncate toward zero, integer-formatted strings parse. Anything else
/// (null, bools, non-numeric strings, arrays, out-of-range values) becomes
/// None. Never errors.
pub fn safe_int(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => {
            let whole = match n.as_i64() {
                Some(i) => i,
                None => n.as_f64()?.trunc() as i64,
            };
            i32::try_from(whole).ok()
        }
        Value::String(s) => s.trim().parse::<i64>().ok().and_then(|i| i32::try_from(i).ok()),
        _ => None,
    }
}

/// Parses an ISO `YYYY-MM-DD` string to a date. The format gate is exact:
/// anything that does not match the 4-2-2 digit pattern, or names an
/// impossible date, yields None rather than an error.
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?;
    if !ISO_DATE_RE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn safe_int_coercions() {
        assert_eq!(safe_int(Some(&json!("3"))), Some(3));
        assert_eq!(safe_int(Some(&json!(" 12 "))), Some(12));
        assert_eq!(safe_int(Some(&json!(3.9))), Some(3));
        assert_eq!(safe_int(Some(&json!(-3.9))), Some(-3));
        assert_eq!(safe_int(Some(&json!(7))), Some(7));

        assert_eq!(safe_int(Some(&json!("abc"))), None);
        assert_eq!(safe_int(Some(&json!("3.9"))), None);
        assert_eq!(safe_int(Some(&json!(null))), None);
        assert_eq!(safe_int(Some(&json!(true))), None);
        assert_eq!(safe_int(Some(&json!([1, 2]))), None);
        assert_eq!(safe_int(None), None);
    }

    #[test]
    fn parse_date_round_trip() {
        assert_eq!(
            parse_date(Some("2025-01-01")),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert_eq!(parse_date(Some("not-a-date")), None);
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(None), None);
        // Exact 4-2-2 digit pattern only.
        assert_eq!(parse_date(Some("2025-1-1")), None);
        // Pattern match but impossible date.
        assert_eq!(parse_date(Some("2025-13-45")), None);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let record = normalize(&json!({}));

        assert_eq!(record.document, ExtractedDocument::default());
        assert!(record.clauses.is_empty());
    }

    #[test]
    fn non_list_clauses_default_to_empty() {
        let record = normalize(&json!({ "clauses": "none found" }));
        assert!(record.clauses.is_empty());
    }

    #[test]
    fn non_object_clause_entries_are_dropped() {
        let record = normalize(&json!({
            "clauses": [
                { "clause_number": "1", "heading": "Definitions" },
                "free-floating string",
                42,
                null,
                { "clause_number": "2" }
            ]
        }));

        assert_eq!(record.clauses.len(), 2);
        assert_eq!(record.clauses[0].clause_number.as_deref(), Some("1"));
        assert_eq!(record.clauses[1].clause_number.as_deref(), Some("2"));
    }

    #[test]
    fn clause_pages_are_coerced() {
        let record = normalize(&json!({
            "clauses": [{
                "clause_number": "2.1",
                "heading": "Payment Terms",
                "clause_type": "payment",
                "start_page": "2",
                "end_page": "last"
            }]
        }));

        assert_eq!(record.clauses[0].start_page, Some(2));
        assert_eq!(record.clauses[0].end_page, None);
    }

    #[test]
    fn document_fields_with_wrong_types_become_none() {
        let record = normalize(&json!({
            "document": { "title": 42, "document_type": ["Contract"], "effective_date": "2025-01-01" }
        }));

        assert_eq!(record.document.title, None);
        assert_eq!(record.document.document_type, None);
        assert_eq!(record.document.effective_date.as_deref(), Some("2025-01-01"));
    }

    #[test]
    fn title_only_document_keeps_other_fields_null() {
        let record = normalize(&json!({ "document": { "title": "X" }, "clauses": [] }));

        assert_eq!(record.document.title.as_deref(), Some("X"));
        assert_eq!(record.document.document_type, None);
        assert_eq!(record.document.effective_date, None);
        assert!(record.clauses.is_empty());
    }

    #[test]
    fn normalization_is_idempotent() {
        let record = normalize(&json!({
            "document": { "title": "MSA", "document_type": "Contract", "effective_date": "2024-06-30" },
            "clauses": [
                { "clause_number": "1", "heading": "Definitions", "clause_type": "definitions",
                  "start_page": 1, "end_page": "2" },
                "dropped"
            ]
        }));

        let reserialized = serde_json::to_value(&record).expect("serialize record");
        assert_eq!(normalize(&reserialized), record);
    }
}
