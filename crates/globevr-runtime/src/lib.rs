//! `globevr-runtime` – host integration for GlobeVR.
//!
//! # Modules
//!
//! - [`bridge`] – [`HmdBridge`][bridge::HmdBridge]: issues the one-shot
//!   device request, integrates discovery, and exposes the per-frame
//!   operations a renderer needs (rotation polling, eye frustum offsets,
//!   reconciliation, leveling, stereo eye cameras).
//! - [`config`] – [`BridgeConfig`][config::BridgeConfig]: TOML settings
//!   stored in `~/.globevr/config.toml` with `GLOBEVR_*` overrides.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]:
//!   initialises the global `tracing` subscriber with an optional OTLP span
//!   exporter.  Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable live trace
//!   export.

pub mod bridge;
pub mod config;
pub mod telemetry;

pub use bridge::{DiscoveryStatus, HmdBridge, HmdBridgeBuilder};
pub use config::{BridgeConfig, LogFormat};
pub use telemetry::{TracerProviderGuard, init_tracing};
