use tracing::info;

use super::transport::{Request, Transport};
use super::types::HealthStatus;
use crate::error::{Result, WattCompareError};

pub const HEALTH_PATH: &str = "/health";

/// Check that the backend is up.
pub async fn check<T: Transport>(transport: &T) -> Result<HealthStatus> {
    let response = transport
        .send(Request::get(HEALTH_PATH))
        .await?
        .require_success("Health check")?;

    let body = response
        .json()
        .ok_or_else(|| WattCompareError::malformed("Health check", "body is not JSON"))?;
    let status: HealthStatus = serde_json::from_value(body)
        .map_err(|e| WattCompareError::malformed("Health check", e))?;
    info!("Backend health: {} at {:?}", status.status, status.time);
    Ok(status)
}
