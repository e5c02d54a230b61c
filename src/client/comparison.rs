use serde_json::{json, Value};
use tracing::info;

use super::transport::{Request, Transport};
use super::types::ApplianceId;
use crate::error::{Result, WattCompareError};

pub const COMPARE_PATH: &str = "/api/compare";

/// Ask the backend to compare two appliances, in order.
///
/// The payload is returned untouched; cost projections and payback are the
/// backend's business.
pub async fn compare<T: Transport>(transport: &T, a: &ApplianceId, b: &ApplianceId) -> Result<Value> {
    info!("Comparing appliances {} and {}", a, b);
    let request = Request::post_json(COMPARE_PATH, json!({ "ids": [a, b] }));

    let response = transport.send(request).await?.require_success("Compare")?;
    response
        .json()
        .ok_or_else(|| WattCompareError::malformed("Compare", "body is not JSON"))
}

/// Pretty-printed form of a comparison payload for text views.
pub fn render(payload: &Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}
