use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Shown wherever the backend left a value unknown.
pub const UNKNOWN_MARKER: &str = "N/A";

/// 2^53. Whole numbers at or above this are not printed through `i64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Opaque appliance identifier.
///
/// Kept as the JSON value the backend sent so an integer id goes back out
/// in the compare payload as an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplianceId(Value);

impl From<i64> for ApplianceId {
    fn from(id: i64) -> Self {
        Self(Value::from(id))
    }
}

impl From<&str> for ApplianceId {
    fn from(id: &str) -> Self {
        Self(Value::from(id))
    }
}

impl fmt::Display for ApplianceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

/// One saved appliance as returned by the list endpoint.
///
/// Only `id` is required. Every other field is read leniently: null or a
/// value of the wrong type leaves it unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appliance {
    pub id: ApplianceId,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "number_or_unknown")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "number_or_unknown")]
    pub energy_kwh: Option<f64>,
    #[serde(default, deserialize_with = "number_or_unknown")]
    pub energy_rate: Option<f64>,
    #[serde(default, deserialize_with = "text_or_unknown")]
    pub created_at: Option<String>,
}

impl Appliance {
    /// One-line summary used by text views.
    pub fn summary(&self) -> String {
        format!(
            "{} | {} kWh/yr | price {}",
            self.name,
            format_number(self.energy_kwh),
            format_number(self.price)
        )
    }
}

/// Output of the label reader. Both fields may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub estimated_kwh_per_year: Option<f64>,
    pub raw_text: Option<String>,
}

impl ExtractionResult {
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Text for the "detected AEC" field.
    pub fn detected_display(&self) -> String {
        format_number(self.estimated_kwh_per_year)
    }

    pub fn raw_text_display(&self) -> &str {
        match self.raw_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => UNKNOWN_MARKER,
        }
    }
}

/// What the user typed into the save form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplianceForm {
    pub name: String,
    pub price: String,
    pub energy_rate: String,
    /// Manually entered AEC; wins over the detected value when non-empty.
    pub manual_aec: String,
}

/// Health endpoint payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub time: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// A JSON number, or a string holding one. Anything else is unknown.
pub fn number_from_json(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn number_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(number_from_json(&Value::deserialize(deserializer)?))
}

fn text_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_str().map(str::to_string))
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(text_or_unknown(deserializer)?.unwrap_or_default())
}

/// Format an optional number without a trailing `.0` for whole values.
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < MAX_EXACT_INTEGER => {
            format!("{}", v as i64)
        }
        Some(v) if v.is_finite() => format!("{}", v),
        _ => UNKNOWN_MARKER.to_string(),
    }
}
