//! Appliance registry: save one record, read back the full list.

use serde_json::Value;
use tracing::{info, warn};

use super::transport::{FormField, Request, Transport};
use super::types::{format_number, Appliance, ApplianceForm};
use crate::error::{Result, WattCompareError};

pub const ADD_PATH: &str = "/api/add_appliance";
pub const LIST_PATH: &str = "/api/list_appliances";

pub const MISSING_AEC_MESSAGE: &str = "Please provide AEC (detected or manual)";

/// Pick the AEC to submit. A non-empty manual entry always wins.
pub fn resolve_aec(manual: &str, detected: Option<f64>) -> Option<String> {
    let manual = manual.trim();
    if !manual.is_empty() {
        return Some(manual.to_string());
    }
    detected
        .filter(|v| v.is_finite())
        .map(|v| format_number(Some(v)))
}

/// Save a new appliance. Returns the backend's `message`, if any.
///
/// Rejected before any request when no AEC can be resolved.
pub async fn add<T: Transport>(
    transport: &T,
    form: &ApplianceForm,
    detected_aec: Option<f64>,
) -> Result<Option<String>> {
    let aec = resolve_aec(&form.manual_aec, detected_aec)
        .ok_or_else(|| WattCompareError::Validation(MISSING_AEC_MESSAGE.to_string()))?;

    info!("Saving appliance '{}' with AEC {}", form.name, aec);
    let fields = vec![
        ("name".to_string(), FormField::Text(form.name.clone())),
        ("price".to_string(), FormField::Text(form.price.clone())),
        ("energy_rate".to_string(), FormField::Text(form.energy_rate.clone())),
        ("aec".to_string(), FormField::Text(aec)),
    ];

    let response = transport
        .send(Request::post_multipart(ADD_PATH, fields))
        .await?
        .require_success("Save appliance")?;

    let message = response
        .json()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string));
    Ok(message)
}

/// Fetch every saved appliance, in backend order.
pub async fn list<T: Transport>(transport: &T) -> Result<Vec<Appliance>> {
    let response = transport
        .send(Request::get(LIST_PATH))
        .await?
        .require_success("Load appliances")?;

    let body = response
        .json()
        .ok_or_else(|| WattCompareError::malformed("Load appliances", "body is not JSON"))?;
    let appliances = parse_list(body)?;
    info!("Loaded {} appliances", appliances.len());
    Ok(appliances)
}

/// Parse a list body. Entries the backend sent without a usable `id` are
/// dropped; any other field that is missing or mistyped is left unknown.
pub fn parse_list(body: Value) -> Result<Vec<Appliance>> {
    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(WattCompareError::malformed(
                "Load appliances",
                format!("expected an array, got {}", json_kind(&other)),
            ))
        }
    };

    let mut appliances = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item.get("id") {
            None | Some(Value::Null) => {
                warn!("Skipping appliance at index {} without an id", index);
                continue;
            }
            Some(_) => {}
        }
        match serde_json::from_value::<Appliance>(item) {
            Ok(appliance) => appliances.push(appliance),
            Err(e) => warn!("Skipping malformed appliance at index {}: {}", index, e),
        }
    }
    Ok(appliances)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
