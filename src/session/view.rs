use anyhow::Result as AnyResult;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{error, info};

use crate::client::comparison;
use crate::client::types::{Appliance, ExtractionResult};
use crate::client::Report;
use crate::selection::Selection;

/// Everything the session shows to the user goes through here.
pub trait View {
    fn set_capture_enabled(&mut self, enabled: bool);

    /// Draw the full list. Items whose id is in `selection` are marked.
    fn render_appliances(&mut self, appliances: &[Appliance], selection: &Selection);

    fn show_extraction(&mut self, result: &ExtractionResult);

    fn clear_extraction(&mut self);

    /// Show a comparison payload exactly as the backend sent it.
    fn show_comparison(&mut self, payload: &Value);

    fn notify(&mut self, message: &str);

    fn alert(&mut self, message: &str);

    /// Hand the report to the user as a file. Returns where it went.
    fn deliver_file(&mut self, report: &Report) -> AnyResult<PathBuf>;
}

/// Headless view: logs everything and saves reports into a directory.
pub struct TracingView {
    download_dir: PathBuf,
}

impl TracingView {
    pub fn new(download_dir: PathBuf) -> Self {
        Self { download_dir }
    }
}

impl View for TracingView {
    fn set_capture_enabled(&mut self, enabled: bool) {
        info!("Camera capture {}", if enabled { "enabled" } else { "disabled" });
    }

    fn render_appliances(&mut self, appliances: &[Appliance], selection: &Selection) {
        info!("{} saved appliances", appliances.len());
        for appliance in appliances {
            let slots = selection.slots_of(&appliance.id);
            let mark = if slots.is_empty() {
                String::new()
            } else {
                format!(
                    " [{}]",
                    slots.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(",")
                )
            };
            info!("  #{} {}{}", appliance.id, appliance.summary(), mark);
        }
    }

    fn show_extraction(&mut self, result: &ExtractionResult) {
        info!(
            "Detected AEC: {} kWh/yr (text: {})",
            result.detected_display(),
            result.raw_text_display()
        );
    }

    fn clear_extraction(&mut self) {
        info!("Extraction cleared");
    }

    fn show_comparison(&mut self, payload: &Value) {
        info!("Comparison:\n{}", comparison::render(payload));
    }

    fn notify(&mut self, message: &str) {
        info!("{}", message);
    }

    fn alert(&mut self, message: &str) {
        error!("{}", message);
    }

    fn deliver_file(&mut self, report: &Report) -> AnyResult<PathBuf> {
        report.save_into(&self.download_dir)
    }
}
