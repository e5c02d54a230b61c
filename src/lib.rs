pub mod client;
pub mod config;
pub mod error;
pub mod generation;
pub mod media;
pub mod selection;
pub mod session;

pub use client::types::{Appliance, ApplianceForm, ApplianceId, ExtractionResult};
pub use config::Config;
pub use error::{Result, WattCompareError};
pub use media::{ImageData, MediaSource};
pub use selection::{Selection, Slot};
pub use session::{Session, TracingView, View};

/// Install the fmt subscriber, filtered by `RUST_LOG` (default `info`).
/// Later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// Build a session against the configured backend with the headless view.
pub fn connect(config: &Config) -> Result<Session<client::HttpTransport, TracingView>> {
    let transport = client::HttpTransport::new(&config.base_url)?;
    let view = TracingView::new(config.resolved_download_dir());
    Ok(Session::new(transport, view, config))
}
