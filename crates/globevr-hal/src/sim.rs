//! In-process simulated VR devices for tests and headless runs.
//!
//! [`SimPlatform`] answers discovery requests with a fixed device list built
//! from stub devices.  Each stub records what it was told and returns
//! plausible state, so the full bridge can run without a headset attached.
//!
//! # Example
//!
//! ```rust
//! use globevr_hal::sim::SimPlatform;
//! use globevr_hal::platform::VrPlatform;
//!
//! let platform = SimPlatform::builder().with_rift("unit-1", 0.032).build();
//! let mut request = platform.request_devices();
//! let devices = request.try_recv().expect("sim platform answers immediately");
//! assert_eq!(devices.len(), 2);
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use glam::{DQuat, DVec3};
use globevr_types::{Eye, SensorState};
use tokio::sync::oneshot;
use tracing::debug;

use crate::device::{DeviceInfo, HmdDevice, PositionSensor, VrDevice};
use crate::platform::{DeviceRequest, VrPlatform};
use crate::report::ErrorHandler;

// ────────────────────────────────────────────────────────────────────────────
// Stub HMD
// ────────────────────────────────────────────────────────────────────────────

/// A simulated HMD with symmetric eye translations of `±half_ipd` metres.
pub struct SimHmd {
    name: String,
    unit: String,
    half_ipd: f64,
}

impl SimHmd {
    /// Create a simulated HMD, ready to put in a device list.
    pub fn new(name: impl Into<String>, unit: impl Into<String>, half_ipd: f64) -> VrDevice {
        VrDevice::Hmd(Arc::new(Self {
            name: name.into(),
            unit: unit.into(),
            half_ipd,
        }))
    }
}

impl DeviceInfo for SimHmd {
    fn device_name(&self) -> &str {
        &self.name
    }

    fn hardware_unit_id(&self) -> &str {
        &self.unit
    }
}

impl HmdDevice for SimHmd {
    fn eye_translation(&self, eye: Eye) -> DVec3 {
        match eye {
            Eye::Left => DVec3::new(-self.half_ipd, 0.0, 0.0),
            Eye::Right => DVec3::new(self.half_ipd, 0.0, 0.0),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub sensor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated orientation sensor whose state is set by the test.
///
/// Starts tracking at the identity orientation.
pub struct SimPositionSensor {
    name: String,
    unit: String,
    state: Mutex<SensorState>,
}

impl SimPositionSensor {
    /// Create a simulated sensor, ready to put in a device list.
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> VrDevice {
        VrDevice::PositionSensor(Arc::new(Self::tracking(name, unit)))
    }

    /// Create a simulated sensor the caller keeps a handle to.
    pub fn tracking(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            state: Mutex::new(SensorState::with_orientation(DQuat::IDENTITY)),
        }
    }

    fn update(&self, f: impl FnOnce(&mut SensorState)) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
        state.timestamp = chrono::Utc::now();
    }

    /// Report `orientation` on the next polls.
    pub fn set_orientation(&self, orientation: DQuat) {
        self.update(|s| s.orientation = Some(orientation));
    }

    pub fn set_position(&self, position: DVec3) {
        self.update(|s| s.position = Some(position));
    }

    /// Simulate a tracking gap: no orientation until the next
    /// [`set_orientation`][Self::set_orientation].
    pub fn lose_tracking(&self) {
        self.update(|s| s.orientation = None);
    }
}

impl DeviceInfo for SimPositionSensor {
    fn device_name(&self) -> &str {
        &self.name
    }

    fn hardware_unit_id(&self) -> &str {
        &self.unit
    }
}

impl PositionSensor for SimPositionSensor {
    fn state(&self) -> SensorState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub non-VR device
// ────────────────────────────────────────────────────────────────────────────

/// A simulated device with no HMD or sensor capability (e.g. a gamepad).
pub struct SimDevice {
    name: String,
    unit: String,
}

impl SimDevice {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> VrDevice {
        VrDevice::Other(Arc::new(Self {
            name: name.into(),
            unit: unit.into(),
        }))
    }
}

impl DeviceInfo for SimDevice {
    fn device_name(&self) -> &str {
        &self.name
    }

    fn hardware_unit_id(&self) -> &str {
        &self.unit
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Collecting error handler
// ────────────────────────────────────────────────────────────────────────────

/// An [`ErrorHandler`] that keeps every reported message.
#[derive(Debug, Default)]
pub struct ErrorLog {
    messages: Mutex<Vec<String>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages reported so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ErrorHandler for ErrorLog {
    fn report(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimPlatform
// ────────────────────────────────────────────────────────────────────────────

/// How a [`SimPlatform`] answers discovery requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimResolution {
    /// Answer as soon as the request is made.
    #[default]
    Immediate,
    /// Hold the request until [`SimPlatform::resolve`] is called.
    Deferred,
    /// Never answer.
    Never,
    /// Drop the request without answering.
    Abandoned,
}

/// A simulated VR subsystem serving a fixed device list.
pub struct SimPlatform {
    devices: Vec<VrDevice>,
    resolution: SimResolution,
    pending: Mutex<Vec<oneshot::Sender<Vec<VrDevice>>>>,
}

impl SimPlatform {
    /// Create an empty builder.
    pub fn builder() -> SimPlatformBuilder {
        SimPlatformBuilder::default()
    }

    /// The device list of a single headset: an HMD and its sensor on `unit`.
    pub fn rift(unit: &str, half_ipd: f64) -> Vec<VrDevice> {
        vec![
            SimHmd::new("Oculus Rift", unit, half_ipd),
            SimPositionSensor::new("Oculus Rift tracker", unit),
        ]
    }

    /// Answer every held request.  Returns how many were answered.
    pub fn resolve(&self) -> usize {
        if self.resolution == SimResolution::Never {
            return 0;
        }
        let senders: Vec<_> = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        let count = senders.len();
        for tx in senders {
            // The requester may already have gone away.
            let _ = tx.send(self.devices.clone());
        }
        debug!(count, "sim platform resolved pending device requests");
        count
    }
}

impl VrPlatform for SimPlatform {
    fn request_devices(&self) -> DeviceRequest {
        let (tx, rx) = oneshot::channel();
        match self.resolution {
            SimResolution::Immediate => {
                let _ = tx.send(self.devices.clone());
            }
            SimResolution::Deferred | SimResolution::Never => self
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(tx),
            SimResolution::Abandoned => drop(tx),
        }
        rx
    }
}

/// Builder for [`SimPlatform`].
#[derive(Default)]
pub struct SimPlatformBuilder {
    devices: Vec<VrDevice>,
    resolution: SimResolution,
}

impl SimPlatformBuilder {
    /// Add an HMD and its matching sensor on `unit`.
    pub fn with_rift(mut self, unit: &str, half_ipd: f64) -> Self {
        self.devices.extend(SimPlatform::rift(unit, half_ipd));
        self
    }

    /// Add an arbitrary device.
    pub fn with_device(mut self, device: VrDevice) -> Self {
        self.devices.push(device);
        self
    }

    pub fn resolution(mut self, resolution: SimResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn build(self) -> SimPlatform {
        SimPlatform {
            devices: self.devices,
            resolution: self.resolution,
            pending: Mutex::new(Vec::new()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
