//! Device traits and the [`VrDevice`] classification enum.
//!
//! The host platform enumerates every VR-capable device it knows about.  Each
//! entry is classified by capability: head-mounted displays expose per-eye
//! translations, position sensors expose a pollable [`SensorState`], and
//! anything else is carried through untouched so the full list can still be
//! inspected.

use std::fmt;
use std::sync::Arc;

use glam::DVec3;
use globevr_types::{Eye, SensorState};

/// Identity shared by every enumerated device.
pub trait DeviceInfo: Send + Sync {
    /// Human-readable device name, e.g. `"Oculus Rift DK2"`.
    fn device_name(&self) -> &str;

    /// Identifier of the physical unit this device belongs to.  An HMD and
    /// its tracking sensor report the same value.
    fn hardware_unit_id(&self) -> &str;
}

/// A head-mounted display.
pub trait HmdDevice: DeviceInfo {
    /// Translation of `eye` relative to the centre of the head, in metres.
    fn eye_translation(&self, eye: Eye) -> DVec3;
}

/// A position/orientation sensor.
pub trait PositionSensor: DeviceInfo {
    /// Read the sensor's current state.
    ///
    /// A missing orientation is a transient tracking gap, not an error.
    fn state(&self) -> SensorState;
}

/// Capability tag of an enumerated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCapability {
    Hmd,
    PositionSensor,
    Other,
}

/// One entry of the platform's device list.
#[derive(Clone)]
pub enum VrDevice {
    Hmd(Arc<dyn HmdDevice>),
    PositionSensor(Arc<dyn PositionSensor>),
    /// A device with no capability this crate uses (gamepads, trackers, …).
    Other(Arc<dyn DeviceInfo>),
}

impl VrDevice {
    pub fn capability(&self) -> DeviceCapability {
        match self {
            VrDevice::Hmd(_) => DeviceCapability::Hmd,
            VrDevice::PositionSensor(_) => DeviceCapability::PositionSensor,
            VrDevice::Other(_) => DeviceCapability::Other,
        }
    }

    fn info(&self) -> &dyn DeviceInfo {
        match self {
            VrDevice::Hmd(d) => d.as_ref(),
            VrDevice::PositionSensor(d) => d.as_ref(),
            VrDevice::Other(d) => d.as_ref(),
        }
    }

    pub fn device_name(&self) -> &str {
        self.info().device_name()
    }

    pub fn hardware_unit_id(&self) -> &str {
        self.info().hardware_unit_id()
    }

    pub fn as_hmd(&self) -> Option<&Arc<dyn HmdDevice>> {
        match self {
            VrDevice::Hmd(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_position_sensor(&self) -> Option<&Arc<dyn PositionSensor>> {
        match self {
            VrDevice::PositionSensor(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Debug for VrDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VrDevice")
            .field("capability", &self.capability())
            .field("device_name", &self.device_name())
            .field("hardware_unit_id", &self.hardware_unit_id())
            .finish()
    }
}
