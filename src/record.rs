// 🧾 Record Normalizer - raw registry rows → identity key + parsed period/amount
//
// Upstream rows are untyped JSON. Every field is optional and a single
// malformed row must never fail the batch, so fields are read leniently:
// strings are kept, numbers become their decimal text, anything else is absent.

use crate::money::parse_amount;
use crate::period::parse_period_end;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// RAW DISCLOSURE RECORD
// ============================================================================

/// One row of the transparency registry, as returned upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDisclosureRecord {
    #[serde(rename = "nombre", default, deserialize_with = "lenient_string")]
    pub name: Option<String>,

    #[serde(rename = "sujetoobligado", default, deserialize_with = "lenient_string")]
    pub obligated_entity: Option<String>,

    #[serde(rename = "entidadfederativa", default, deserialize_with = "lenient_string")]
    pub federative_entity: Option<String>,

    #[serde(rename = "id", default, deserialize_with = "lenient_string")]
    pub record_id: Option<String>,

    #[serde(rename = "periodoreporta", default, deserialize_with = "lenient_string")]
    pub period_label: Option<String>,

    #[serde(rename = "montoneto", default, deserialize_with = "lenient_string")]
    pub amount_label: Option<String>,
}

impl RawDisclosureRecord {
    /// Read a record from arbitrary JSON. Non-object values yield an empty record.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Builder used by tests and callers assembling records by hand
    pub fn new(name: &str, obligated_entity: &str) -> Self {
        RawDisclosureRecord {
            name: Some(name.to_string()),
            obligated_entity: Some(obligated_entity.to_string()),
            ..Default::default()
        }
    }

    pub fn with_period(mut self, period_label: &str, amount_label: &str) -> Self {
        self.period_label = Some(period_label.to_string());
        self.amount_label = Some(amount_label.to_string());
        self
    }

    pub fn with_federative_entity(mut self, federative_entity: &str) -> Self {
        self.federative_entity = Some(federative_entity.to_string());
        self
    }

    pub fn with_record_id(mut self, record_id: &str) -> Self {
        self.record_id = Some(record_id.to_string());
        self
    }
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

// ============================================================================
// IDENTITY KEY
// ============================================================================

/// `UPPERCASE(trim(name)) | obligated entity` - same key means same person at same entity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Build the key, or `None` when the record cannot be grouped safely
    pub fn from_parts(name: &str, obligated_entity: &str) -> Option<Self> {
        let normalized = name.trim().to_uppercase();
        if normalized.is_empty() || obligated_entity.is_empty() {
            return None;
        }
        Some(IdentityKey(format!("{}|{}", normalized, obligated_entity)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// PERIOD AMOUNT
// ============================================================================

/// A reported (period, amount) pair with its parsed values.
///
/// Raw labels are always kept for display; the parsed values are `None` when
/// the label did not parse. Only the labels are serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAmount {
    #[serde(rename = "periodo")]
    pub period_label: String,

    #[serde(rename = "monto")]
    pub amount_label: String,

    #[serde(skip)]
    pub parsed_end_date: Option<NaiveDate>,

    #[serde(skip)]
    pub parsed_amount: Option<f64>,
}

impl PeriodAmount {
    pub fn new(period_label: &str, amount_label: &str) -> Self {
        PeriodAmount {
            period_label: period_label.to_string(),
            amount_label: amount_label.to_string(),
            parsed_end_date: parse_period_end(period_label),
            parsed_amount: parse_amount(amount_label),
        }
    }

    /// Both the end date and the amount parsed
    pub fn is_resolved(&self) -> bool {
        self.parsed_end_date.is_some() && self.parsed_amount.is_some()
    }

    /// Exact-string duplicate check, independent of parse success
    pub fn same_labels(&self, other: &PeriodAmount) -> bool {
        self.period_label == other.period_label && self.amount_label == other.amount_label
    }
}

// ============================================================================
// NORMALIZED RECORD
// ============================================================================

/// A raw record that passed identity checks
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub key: IdentityKey,
    /// Original-cased name, untouched
    pub display_name: String,
    pub obligated_entity: String,
    pub federative_entity: Option<String>,
    pub record_id: Option<String>,
    /// `None` when the record carries no period or amount label
    pub period_amount: Option<PeriodAmount>,
}

/// Normalize one raw record.
///
/// Returns `None` (record dropped) when the trimmed name is empty or the
/// obligated entity is missing.
pub fn normalize(record: &RawDisclosureRecord) -> Option<NormalizedRecord> {
    let name = record.name.as_deref()?;
    let obligated_entity = record.obligated_entity.as_deref()?;
    let key = IdentityKey::from_parts(name, obligated_entity)?;

    let period_amount = match (record.period_label.as_deref(), record.amount_label.as_deref()) {
        (Some(period), Some(amount)) if !period.is_empty() && !amount.is_empty() => {
            Some(PeriodAmount::new(period, amount))
        }
        _ => None,
    };

    Some(NormalizedRecord {
        key,
        display_name: name.to_string(),
        obligated_entity: obligated_entity.to_string(),
        federative_entity: record.federative_entity.clone(),
        record_id: record.record_id.clone(),
        period_amount,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_key_case_and_whitespace() {
        let a = IdentityKey::from_parts("Juan Pérez", "UNAM").unwrap();
        let b = IdentityKey::from_parts("JUAN PÉREZ ", "UNAM").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "JUAN PÉREZ|UNAM");
    }

    #[test]
    fn test_identity_key_entity_is_case_sensitive() {
        let a = IdentityKey::from_parts("Ana", "UNAM").unwrap();
        let b = IdentityKey::from_parts("Ana", "unam").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_identity_key_rejects_blank() {
        assert!(IdentityKey::from_parts("   ", "UNAM").is_none());
        assert!(IdentityKey::from_parts("Ana", "").is_none());
    }

    #[test]
    fn test_deserialize_upstream_row() {
        let record = RawDisclosureRecord::from_value(json!({
            "nombre": "María López",
            "sujetoobligado": "Universidad Autónoma",
            "entidadfederativa": "Jalisco",
            "id": 4821,
            "periodoreporta": "01/01/2024 - 31/01/2024",
            "montoneto": "$12,300.00",
            "otrocampo": [1, 2, 3]
        }));

        assert_eq!(record.name.as_deref(), Some("María López"));
        assert_eq!(record.record_id.as_deref(), Some("4821"));
        assert_eq!(record.federative_entity.as_deref(), Some("Jalisco"));
        assert_eq!(record.amount_label.as_deref(), Some("$12,300.00"));
    }

    #[test]
    fn test_deserialize_tolerates_nulls_and_garbage() {
        let record = RawDisclosureRecord::from_value(json!({
            "nombre": null,
            "sujetoobligado": {"nested": true},
            "montoneto": false
        }));
        assert_eq!(record, RawDisclosureRecord::default());

        let not_an_object = RawDisclosureRecord::from_value(json!("just a string"));
        assert_eq!(not_an_object, RawDisclosureRecord::default());
    }

    #[test]
    fn test_normalize_keeps_original_name() {
        let raw = RawDisclosureRecord::new("  Juan Pérez ", "UNAM")
            .with_period("01/01/2024 - 31/01/2024", "$1,000.00");
        let normalized = normalize(&raw).unwrap();

        assert_eq!(normalized.display_name, "  Juan Pérez ");
        assert_eq!(normalized.key.as_str(), "JUAN PÉREZ|UNAM");
        let pa = normalized.period_amount.unwrap();
        assert!(pa.is_resolved());
        assert_eq!(pa.parsed_amount, Some(1000.0));
    }

    #[test]
    fn test_normalize_drops_unidentifiable() {
        let empty_name = RawDisclosureRecord::new("", "UNAM")
            .with_period("01/01/2024 - 31/01/2024", "$1,000.00")
            .with_federative_entity("CDMX")
            .with_record_id("7");
        assert!(normalize(&empty_name).is_none());

        let blank_name = RawDisclosureRecord::new("   ", "UNAM");
        assert!(normalize(&blank_name).is_none());

        let mut no_entity = RawDisclosureRecord::new("Ana", "UNAM");
        no_entity.obligated_entity = None;
        assert!(normalize(&no_entity).is_none());
    }

    #[test]
    fn test_normalize_keeps_unparsable_labels() {
        let raw = RawDisclosureRecord::new("Ana", "UNAM").with_period("sin periodo", "N/A");
        let pa = normalize(&raw).unwrap().period_amount.unwrap();

        assert_eq!(pa.period_label, "sin periodo");
        assert_eq!(pa.amount_label, "N/A");
        assert!(pa.parsed_end_date.is_none());
        assert!(pa.parsed_amount.is_none());
        assert!(!pa.is_resolved());
    }

    #[test]
    fn test_normalize_without_labels() {
        let raw = RawDisclosureRecord::new("Ana", "UNAM");
        let normalized = normalize(&raw).unwrap();
        assert!(normalized.period_amount.is_none());
    }

    #[test]
    fn test_period_amount_serializes_labels_only() {
        let pa = PeriodAmount::new("01/01/2024 - 31/01/2024", "$1,000.00");
        let value = serde_json::to_value(&pa).unwrap();
        assert_eq!(
            value,
            json!({"periodo": "01/01/2024 - 31/01/2024", "monto": "$1,000.00"})
        );
    }
}
