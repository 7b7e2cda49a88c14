//! Best-effort usage telemetry.
//!
//! The invoker reports through a [`TelemetrySink`]. Sink failures are
//! logged and dropped; they never change the outcome of a call.

use std::collections::BTreeMap;

use hubcall_core::pii;
use tracing::info;

use crate::errors::ApiError;

/// Telemetry target used by [`TracingTelemetry`].
pub const TELEMETRY_TARGET: &str = "hubcall::telemetry";

/// A telemetry sink failed to accept a record.
#[derive(Debug, thiserror::Error)]
#[error("telemetry sink failed: {0}")]
pub struct TelemetryError(pub String);

/// A usage event.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryEvent {
    /// Event name chosen by the caller.
    pub name: String,
    /// Scrubbed properties.
    pub properties: BTreeMap<String, String>,
    /// Numeric measurements such as `duration_ms`.
    pub metrics: BTreeMap<String, f64>,
}

/// Destination for telemetry records.
#[cfg_attr(test, mockall::automock)]
pub trait TelemetrySink: Send + Sync + std::fmt::Debug {
    /// Record a usage event.
    fn track_event(&self, event: &TelemetryEvent) -> Result<(), TelemetryError>;

    /// Record a failed call under `bucket`.
    fn track_exception(
        &self,
        error: &ApiError,
        bucket: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<(), TelemetryError>;
}

/// Sink that writes records as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn track_event(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        info!(
            target: TELEMETRY_TARGET,
            event = %event.name,
            properties = ?event.properties,
            metrics = ?event.metrics,
            "Telemetry event"
        );
        Ok(())
    }

    fn track_exception(
        &self,
        error: &ApiError,
        bucket: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<(), TelemetryError> {
        info!(
            target: TELEMETRY_TARGET,
            bucket,
            category = %error.category(),
            request_id = error.request_id().unwrap_or_default(),
            properties = ?properties,
            "Telemetry exception"
        );
        Ok(())
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn track_event(&self, _event: &TelemetryEvent) -> Result<(), TelemetryError> {
        Ok(())
    }

    fn track_exception(
        &self,
        _error: &ApiError,
        _bucket: &str,
        _properties: &BTreeMap<String, String>,
    ) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Hash every property value unless protection is disabled.
pub fn scrub_properties(
    properties: &BTreeMap<String, String>,
    protection_disabled: bool,
) -> BTreeMap<String, String> {
    properties
        .iter()
        .map(|(k, v)| (k.clone(), pii::scrub(v, protection_disabled)))
        .collect()
}
