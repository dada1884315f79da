//! `globevr-hal` – VR device binding.
//!
//! Finds the head-mounted display and its tracking sensor among the devices
//! the host platform enumerates, and exposes per-frame orientation polling
//! plus the static per-eye offsets.
//!
//! # Modules
//!
//! - [`device`] – [`HmdDevice`][device::HmdDevice] and
//!   [`PositionSensor`][device::PositionSensor] traits, and the
//!   [`VrDevice`][device::VrDevice] classification enum.
//! - [`platform`] – [`VrPlatform`][platform::VrPlatform]: the one-shot,
//!   non-blocking discovery request.
//! - [`binding`] – [`DeviceBinding`][binding::DeviceBinding]: HMD/sensor
//!   selection, rotation polling and eye frustum offsets.
//! - [`report`] – [`ErrorHandler`][report::ErrorHandler]: the pluggable error
//!   sink.
//! - [`sim`] – simulated devices and platform for tests and headless runs.

pub mod binding;
pub mod device;
pub mod platform;
pub mod report;
pub mod sim;

pub use binding::{DeviceBinding, to_rotation};
pub use device::{DeviceCapability, DeviceInfo, HmdDevice, PositionSensor, VrDevice};
pub use platform::{DeviceRequest, VrPlatform};
pub use report::{AlertHandler, ErrorHandler};
