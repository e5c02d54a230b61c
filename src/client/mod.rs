//! Clients for the WattCompare backend contract.
//!
//! Each submodule owns one call (or a pair of calls for the registry) and is
//! written as free functions over any [`Transport`], so the same code runs
//! against the real backend and the in-memory one used in tests.

pub mod comparison;
pub mod extraction;
pub mod health;
pub mod registry;
pub mod report;
pub mod transport;
pub mod types;

pub use report::Report;
pub use transport::{HttpTransport, Transport};
pub use types::{Appliance, ApplianceForm, ApplianceId, ExtractionResult, HealthStatus};
