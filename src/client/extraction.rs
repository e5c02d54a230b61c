//! Submit a label photo to the backend reader.

use serde_json::Value;
use tracing::{info, warn};

use super::transport::{FormField, Request, Transport};
use super::types::{number_from_json, ExtractionResult};
use crate::error::Result;
use crate::media::ImageData;

pub const EXTRACT_PATH: &str = "/api/ocr";
const ACTION: &str = "Label extraction";

/// Send one image and read back whatever the backend could extract.
///
/// Missing or mistyped fields come back as `None`; only transport failures
/// and non-2xx statuses are errors.
pub async fn extract<T: Transport>(transport: &T, image: &ImageData) -> Result<ExtractionResult> {
    info!(
        "Submitting {} ({} bytes) for extraction",
        image.filename,
        image.bytes.len()
    );
    let request = Request::post_multipart(
        EXTRACT_PATH,
        vec![(
            "image".to_string(),
            FormField::File {
                bytes: image.bytes.clone(),
                filename: image.filename.clone(),
                mime: image.mime.clone(),
            },
        )],
    );

    let response = transport.send(request).await?.require_success(ACTION)?;

    let result = match response.json() {
        Some(body) => parse_extraction(&body),
        None => {
            warn!("Extraction response was not JSON, treating result as unknown");
            ExtractionResult::unknown()
        }
    };
    info!(
        "Extraction result: kWh/yr = {}, raw text {} chars",
        result.detected_display(),
        result.raw_text.as_ref().map_or(0, |t| t.len())
    );
    Ok(result)
}

/// Lenient field pick: anything that is not the expected shape is unknown.
pub fn parse_extraction(body: &Value) -> ExtractionResult {
    let estimated_kwh_per_year = body
        .get("estimated_kwh_per_year")
        .and_then(number_from_json);

    let raw_text = body
        .get("raw_text")
        .and_then(Value::as_str)
        .map(str::to_string);

    ExtractionResult {
        estimated_kwh_per_year,
        raw_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_result() {
        let result = parse_extraction(&json!({
            "estimated_kwh_per_year": 350,
            "raw_text": "350 kWh/yr"
        }));
        assert_eq!(result.estimated_kwh_per_year, Some(350.0));
        assert_eq!(result.raw_text.as_deref(), Some("350 kWh/yr"));
        assert_eq!(result.detected_display(), "350");
    }

    #[test]
    fn test_parse_null_estimate() {
        let result = parse_extraction(&json!({
            "estimated_kwh_per_year": null,
            "raw_text": "blurry"
        }));
        assert!(result.estimated_kwh_per_year.is_none());
        assert_eq!(result.raw_text.as_deref(), Some("blurry"));
    }

    #[test]
    fn test_parse_wrong_shapes_are_unknown() {
        let result = parse_extraction(&json!({
            "estimated_kwh_per_year": {"value": 1},
            "raw_text": 42
        }));
        assert_eq!(result, ExtractionResult::unknown());

        assert_eq!(parse_extraction(&json!([1, 2])), ExtractionResult::unknown());
    }

    #[test]
    fn test_parse_numeric_string() {
        let result = parse_extraction(&json!({"estimated_kwh_per_year": " 219.5 "}));
        assert_eq!(result.estimated_kwh_per_year, Some(219.5));
        assert!(result.raw_text.is_none());
    }
}
