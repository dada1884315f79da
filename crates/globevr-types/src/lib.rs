//! `globevr-types` – shared vocabulary for the GlobeVR workspace.
//!
//! Everything that more than one crate needs to agree on lives here: which
//! eye is being rendered, the per-eye offsets read from an HMD, a single
//! sensor poll result, the host scene [`Camera`][camera::Camera], and the
//! global [`VrError`] type.

pub mod camera;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use camera::{Camera, PerspectiveFrustum};

/// One of the two stereo eyes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    /// Both eyes, left first.
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Eye::Left => "left",
            Eye::Right => "right",
        }
    }
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Eye {
    type Err = VrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Eye::Left),
            "right" => Ok(Eye::Right),
            other => Err(VrError::InvalidEye(other.to_string())),
        }
    }
}

/// Horizontal translation of each eye relative to the head centre, read from
/// the HMD once at discovery time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeOffsets {
    pub left: f64,
    pub right: f64,
}

impl EyeOffsets {
    pub fn get(&self, eye: Eye) -> f64 {
        match eye {
            Eye::Left => self.left,
            Eye::Right => self.right,
        }
    }
}

/// A single poll of a position/orientation sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    pub timestamp: DateTime<Utc>,
    /// Absolute orientation in device space. `None` when the sensor has
    /// momentarily lost tracking.
    pub orientation: Option<DQuat>,
    pub position: Option<DVec3>,
}

impl SensorState {
    /// A state carrying only an orientation, stamped now.
    pub fn with_orientation(orientation: DQuat) -> Self {
        Self {
            timestamp: Utc::now(),
            orientation: Some(orientation),
            position: None,
        }
    }

    /// A state with no tracking data, stamped now.
    pub fn untracked() -> Self {
        Self {
            timestamp: Utc::now(),
            orientation: None,
            position: None,
        }
    }
}

/// Global error type for device discovery, stereo setup and configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VrError {
    #[error("No HMD detected")]
    NoHmd,

    #[error("No HMD sensor detected")]
    NoSensor,

    #[error("developer error, incorrect eye '{0}'")]
    InvalidEye(String),

    #[error("Eye offsets unavailable: no HMD was discovered")]
    EyeOffsetsUnavailable,

    #[error("VR device discovery has not completed")]
    DiscoveryPending,

    #[error("VR platform abandoned the device request")]
    DiscoveryAbandoned,

    #[error("Config Error: {0}")]
    Config(String),
}
