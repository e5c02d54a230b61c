//! Report export and local delivery.

use anyhow::Result as AnyResult;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

use super::transport::{Request, Transport};
use crate::error::{Result, WattCompareError};

pub const EXPORT_PATH: &str = "/api/export_pdf";
pub const REPORT_FILENAME: &str = "WattCompare_Report.pdf";

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Report {
    /// Write the report into `dir` atomically and return its path.
    ///
    /// A temp file in the same directory is renamed over the target, so an
    /// interrupted write never leaves a partial PDF behind.
    pub fn save_into(&self, dir: &Path) -> AnyResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let target = dir.join(&self.filename);

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(&self.bytes)?;
        temp.flush()?;
        temp.persist(&target)?;

        info!("Saved report to {:?} ({} bytes)", target, self.bytes.len());
        Ok(target)
    }
}

/// Fetch the generated report. Any non-2xx status is a failure and yields
/// no report.
pub async fn export<T: Transport>(transport: &T) -> Result<Report> {
    let response = transport
        .send(Request::get(EXPORT_PATH))
        .await?
        .require_success("Export")?;

    if response.body.is_empty() {
        return Err(WattCompareError::malformed("Export", "empty report body"));
    }
    info!("Received report ({} bytes)", response.body.len());
    Ok(Report {
        filename: REPORT_FILENAME.to_string(),
        bytes: response.body,
    })
}
