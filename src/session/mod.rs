//! The workflow controller.
//!
//! One method per user event. Each awaits its backend exchanges in order and
//! reports every failure through the [`View`]; nothing here returns an error
//! to the host, and a failed step leaves the previous state in place.
//!
//! Handlers take `&self`. Shared state sits behind short-lived locks that are
//! never held across an exchange, so a stalled request only blocks the
//! handler that issued it.

pub mod view;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

pub use view::{TracingView, View};

use crate::client::types::{Appliance, ApplianceForm, ApplianceId, ExtractionResult, HealthStatus};
use crate::client::{comparison, extraction, health, registry, report, Transport};
use crate::config::Config;
use crate::error::Result;
use crate::generation::{Generation, GenerationCounter};
use crate::media::{DeviceProvider, ImageData, MediaSource};
use crate::selection::{Selection, Slot};

pub const COMPARE_NEEDS_TWO_MESSAGE: &str = "Please select two appliances to compare";

/// Issued by [`Session::begin_refresh`]; redeemed by [`Session::finish_refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(Generation);

/// Issued by [`Session::begin_compare`] with the pair it was taken for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareTicket {
    generation: Generation,
    a: ApplianceId,
    b: ApplianceId,
}

impl CompareTicket {
    pub fn ids(&self) -> (&ApplianceId, &ApplianceId) {
        (&self.a, &self.b)
    }
}

#[derive(Default)]
struct State {
    appliances: Vec<Appliance>,
    selection: Selection,
    extraction: Option<ExtractionResult>,
    comparison: Option<Value>,
}

pub struct Session<T: Transport, V: View> {
    transport: T,
    view: Mutex<V>,
    media: Mutex<MediaSource>,
    state: Mutex<State>,
    list_generations: GenerationCounter,
    compare_generations: GenerationCounter,
}

/// Lock, recovering the guard if a panicking handler poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<T: Transport, V: View> Session<T, V> {
    pub fn new(transport: T, view: V, config: &Config) -> Self {
        Self {
            transport,
            view: Mutex::new(view),
            media: Mutex::new(MediaSource::new(config)),
            state: Mutex::new(State::default()),
            list_generations: GenerationCounter::new(),
            compare_generations: GenerationCounter::new(),
        }
    }

    fn alert(&self, message: &str) {
        lock(&self.view).alert(message);
    }

    fn notify(&self, message: &str) {
        lock(&self.view).notify(message);
    }

    /// Startup: ask for the camera once, then load the list.
    pub async fn start(&self, provider: &dyn DeviceProvider) {
        let enabled = lock(&self.media).acquire(provider);
        lock(&self.view).set_capture_enabled(enabled);
        self.refresh().await;
    }

    /// Capture a frame from the camera and submit it.
    pub async fn capture(&self) {
        let captured = lock(&self.media).capture();
        match captured {
            Ok(image) => self.submit_image(image).await,
            Err(e) => {
                warn!("Capture failed: {}", e);
                self.alert(&e.to_string());
            }
        }
    }

    /// Submit a user-chosen file as-is.
    pub async fn upload(&self, path: &Path) {
        match MediaSource::from_file(path).await {
            Ok(image) => self.submit_image(image).await,
            Err(e) => {
                warn!("Could not read {:?}: {}", path, e);
                self.alert(&format!("Could not read {}: {}", path.display(), e));
            }
        }
    }

    /// Send one image for extraction. A failure still leaves an "unknown"
    /// result on screen so the user can type the AEC by hand.
    pub async fn submit_image(&self, image: ImageData) {
        let result = match extraction::extract(&self.transport, &image).await {
            Ok(result) => result,
            Err(e) => {
                self.alert(&e.to_string());
                ExtractionResult::unknown()
            }
        };
        let mut state = lock(&self.state);
        lock(&self.view).show_extraction(&result);
        state.extraction = Some(result);
    }

    pub fn discard_extraction(&self) {
        if lock(&self.state).extraction.take().is_some() {
            debug!("Discarded pending extraction");
        }
        lock(&self.view).clear_extraction();
    }

    /// Save the form, then reload the full list.
    pub async fn save(&self, form: &ApplianceForm) {
        let detected = lock(&self.state)
            .extraction
            .as_ref()
            .and_then(|r| r.estimated_kwh_per_year);

        match registry::add(&self.transport, form, detected).await {
            Ok(message) => {
                self.notify(message.as_deref().unwrap_or("Appliance saved"));
                lock(&self.state).extraction = None;
                lock(&self.view).clear_extraction();
                self.refresh().await;
            }
            Err(e) => {
                if !e.is_local() {
                    warn!("Saving '{}' failed: {}", form.name, e);
                }
                self.alert(&e.to_string());
            }
        }
    }

    /// Reload the full list and re-render. Returns whether the list was
    /// replaced.
    pub async fn refresh(&self) -> bool {
        let ticket = self.begin_refresh();
        let result = registry::list(&self.transport).await;
        self.finish_refresh(ticket, result)
    }

    /// Start a list reload, superseding any reload still in flight.
    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket(self.list_generations.next())
    }

    /// Apply a reload result unless a newer reload was started since.
    pub fn finish_refresh(&self, ticket: RefreshTicket, result: Result<Vec<Appliance>>) -> bool {
        if !self.list_generations.is_current(ticket.0) {
            debug!(
                "Dropping stale appliance list (generation {})",
                ticket.0.value()
            );
            return false;
        }
        match result {
            Ok(appliances) => {
                let mut state = lock(&self.state);
                state.appliances = appliances;
                lock(&self.view).render_appliances(&state.appliances, &state.selection);
                true
            }
            Err(e) => {
                self.alert(&e.to_string());
                false
            }
        }
    }

    /// Toggle one slot, then reload and re-render so marks follow.
    pub async fn toggle(&self, slot: Slot, id: ApplianceId) {
        let now = lock(&self.state).selection.toggle(slot, id).cloned();
        match now {
            Some(id) => info!("Slot {} -> {}", slot, id),
            None => info!("Slot {} cleared", slot),
        }
        if !self.refresh().await {
            let state = lock(&self.state);
            lock(&self.view).render_appliances(&state.appliances, &state.selection);
        }
    }

    /// Compare the two selected appliances. Both slots must be filled.
    pub async fn compare(&self) {
        let Some(ticket) = self.begin_compare() else {
            return;
        };
        let (a, b) = ticket.ids();
        let result = comparison::compare(&self.transport, a, b).await;
        self.finish_compare(ticket, result);
    }

    /// Take the current pair and a fresh compare generation. Alerts and
    /// returns `None` when a slot is empty.
    pub fn begin_compare(&self) -> Option<CompareTicket> {
        let pair = lock(&self.state)
            .selection
            .pair()
            .map(|(a, b)| (a.clone(), b.clone()));
        match pair {
            Some((a, b)) => Some(CompareTicket {
                generation: self.compare_generations.next(),
                a,
                b,
            }),
            None => {
                self.alert(COMPARE_NEEDS_TWO_MESSAGE);
                None
            }
        }
    }

    /// Apply a compare result unless a newer compare was started since.
    /// Returns whether the shown comparison was replaced.
    pub fn finish_compare(&self, ticket: CompareTicket, result: Result<Value>) -> bool {
        if !self.compare_generations.is_current(ticket.generation) {
            debug!(
                "Dropping stale comparison of {} and {} (generation {})",
                ticket.a,
                ticket.b,
                ticket.generation.value()
            );
            return false;
        }
        match result {
            Ok(payload) => {
                let mut state = lock(&self.state);
                lock(&self.view).show_comparison(&payload);
                state.comparison = Some(payload);
                true
            }
            Err(e) => {
                self.alert(&e.to_string());
                false
            }
        }
    }

    /// Download the report and hand it to the user.
    pub async fn export(&self) {
        let report = match report::export(&self.transport).await {
            Ok(report) => report,
            Err(e) => {
                self.alert(&e.to_string());
                return;
            }
        };
        let mut view = lock(&self.view);
        match view.deliver_file(&report) {
            Ok(path) => view.notify(&format!("Report saved to {}", path.display())),
            Err(e) => {
                warn!("Report delivery failed: {}", e);
                view.alert(&format!("Could not save report: {}", e));
            }
        }
    }

    pub async fn health(&self) -> Option<HealthStatus> {
        match health::check(&self.transport).await {
            Ok(status) => {
                self.notify(&format!("Backend status: {}", status.status));
                Some(status)
            }
            Err(e) => {
                self.alert(&e.to_string());
                None
            }
        }
    }

    pub fn appliances(&self) -> Vec<Appliance> {
        lock(&self.state).appliances.clone()
    }

    pub fn selection(&self) -> Selection {
        lock(&self.state).selection.clone()
    }

    pub fn extraction(&self) -> Option<ExtractionResult> {
        lock(&self.state).extraction.clone()
    }

    pub fn comparison(&self) -> Option<Value> {
        lock(&self.state).comparison.clone()
    }

    pub fn capture_enabled(&self) -> bool {
        lock(&self.media).capture_enabled()
    }

    pub fn media(&self) -> MutexGuard<'_, MediaSource> {
        lock(&self.media)
    }

    pub fn view(&self) -> MutexGuard<'_, V> {
        lock(&self.view)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
