//! [`DeviceBinding`] – selects the active HMD and its tracking sensor.
//!
//! Given the platform's device list, the binding picks the first HMD and the
//! first position sensor on the same hardware unit, captures the HMD's
//! per-eye offsets, and from then on answers two questions every frame:
//! "which way is the head facing?" ([`DeviceBinding::poll_rotation`]) and
//! "where does this eye's frustum sit?"
//! ([`DeviceBinding::apply_eye_frustum_offset`]).
//!
//! Failures are reported through the injected [`ErrorHandler`] and leave the
//! binding partially functional; nothing here panics.

use std::sync::Arc;

use glam::DQuat;
use globevr_types::{Camera, Eye, EyeOffsets, VrError};
use tracing::{debug, info, instrument, warn};

use crate::device::{HmdDevice, PositionSensor, VrDevice};
use crate::report::ErrorHandler;

/// Map a raw device quaternion to a rotation.
///
/// Sensors signal "no data" with an all-zero quaternion, which becomes the
/// identity rotation.  Anything else is normalised: drivers do not
/// guarantee unit length.
pub fn to_rotation(raw: DQuat) -> DQuat {
    if raw.x == 0.0 && raw.y == 0.0 && raw.z == 0.0 && raw.w == 0.0 {
        DQuat::IDENTITY
    } else {
        raw.normalize()
    }
}

/// The active HMD/sensor pair chosen from a platform device list.
pub struct DeviceBinding {
    devices: Option<Vec<VrDevice>>,
    hmd: Option<Arc<dyn HmdDevice>>,
    sensor: Option<Arc<dyn PositionSensor>>,
    eye_offsets: Option<EyeOffsets>,
    ipd_scale: f64,
    error_handler: Arc<dyn ErrorHandler>,
}

impl DeviceBinding {
    /// Create an undiscovered binding that reports through `error_handler`.
    pub fn new(error_handler: Arc<dyn ErrorHandler>) -> Self {
        Self {
            devices: None,
            hmd: None,
            sensor: None,
            eye_offsets: None,
            ipd_scale: 1.0,
            error_handler,
        }
    }

    /// Multiply applied frustum offsets by `scale`.  Stored offsets are not
    /// affected.
    pub fn with_ipd_scale(mut self, scale: f64) -> Self {
        self.ipd_scale = scale;
        self
    }

    pub fn ipd_scale(&self) -> f64 {
        self.ipd_scale
    }

    /// Select the active HMD and sensor from `devices`.
    ///
    /// Reports `"No HMD detected"` and/or `"No HMD sensor detected"` through
    /// the error handler when either is missing, but always records the
    /// device list and marks discovery complete.
    #[instrument(skip_all, fields(device_count = devices.len()))]
    pub fn discover(&mut self, devices: Vec<VrDevice>) {
        self.hmd = devices.iter().find_map(|d| d.as_hmd().cloned());
        if self.hmd.is_none() {
            warn!("no HMD among enumerated devices");
            self.error_handler.report(&VrError::NoHmd.to_string());
        }

        let hmd_unit = self.hmd.as_ref().map(|h| h.hardware_unit_id().to_string());
        self.sensor = devices.iter().find_map(|d| {
            let sensor = d.as_position_sensor()?;
            match &hmd_unit {
                Some(unit) if sensor.hardware_unit_id() != unit.as_str() => None,
                _ => Some(Arc::clone(sensor)),
            }
        });
        if self.sensor.is_none() {
            warn!(hmd_unit = ?hmd_unit, "no position sensor matches the HMD");
            self.error_handler.report(&VrError::NoSensor.to_string());
        }

        self.eye_offsets = self.hmd.as_ref().map(|hmd| EyeOffsets {
            left: hmd.eye_translation(Eye::Left).x,
            right: hmd.eye_translation(Eye::Right).x,
        });

        info!(
            hmd = self.hmd.as_ref().map(|h| h.device_name()),
            sensor = self.sensor.as_ref().map(|s| s.device_name()),
            eye_offsets = ?self.eye_offsets,
            "VR device discovery complete"
        );
        self.devices = Some(devices);
    }

    /// `true` once [`discover`][Self::discover] has run, whatever it found.
    pub fn is_discovered(&self) -> bool {
        self.devices.is_some()
    }

    /// The full device list seen at discovery.
    pub fn devices(&self) -> Option<&[VrDevice]> {
        self.devices.as_deref()
    }

    /// The active HMD, if one was found.
    pub fn hmd(&self) -> Option<&Arc<dyn HmdDevice>> {
        self.hmd.as_ref()
    }

    /// The active sensor, if one was found.
    pub fn sensor(&self) -> Option<&Arc<dyn PositionSensor>> {
        self.sensor.as_ref()
    }

    /// Per-eye offsets read from the HMD; `None` without an HMD.
    pub fn eye_offsets(&self) -> Option<EyeOffsets> {
        self.eye_offsets
    }

    /// Current head orientation as a unit quaternion.
    ///
    /// A sensor that momentarily reports no orientation yields the identity
    /// rotation.
    ///
    /// # Errors
    ///
    /// [`VrError::DiscoveryPending`] before discovery has completed and
    /// [`VrError::NoSensor`] when discovery found no sensor.
    pub fn poll_rotation(&self) -> Result<DQuat, VrError> {
        if !self.is_discovered() {
            return Err(VrError::DiscoveryPending);
        }
        let sensor = self.sensor.as_ref().ok_or(VrError::NoSensor)?;
        let rotation = match sensor.state().orientation {
            Some(raw) => to_rotation(raw),
            None => DQuat::IDENTITY,
        };
        Ok(rotation)
    }

    /// Apply `eye`'s horizontal offset to the camera frustum.
    ///
    /// # Errors
    ///
    /// [`VrError::EyeOffsetsUnavailable`] when no HMD was discovered; the
    /// frustum is left untouched.
    pub fn apply_eye_offset(&self, camera: &mut Camera, eye: Eye) -> Result<(), VrError> {
        let offsets = self.eye_offsets.ok_or(VrError::EyeOffsetsUnavailable)?;
        let x_offset = offsets.get(eye) * self.ipd_scale;
        debug!(%eye, x_offset, "applying eye frustum offset");
        camera.frustum.set_offset(x_offset, 0.0);
        Ok(())
    }

    /// Apply the offset for the eye named `eye` (`"left"` or `"right"`).
    ///
    /// Unknown eye names and missing offsets are reported through the error
    /// handler and leave the frustum untouched.
    pub fn apply_eye_frustum_offset(&self, camera: &mut Camera, eye: &str) {
        let result = eye
            .parse::<Eye>()
            .and_then(|eye| self.apply_eye_offset(camera, eye));
        if let Err(e) = result {
            self.error_handler.report(&e.to_string());
        }
    }
}
