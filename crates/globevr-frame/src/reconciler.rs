//! Reference-frame reconciliation between an HMD and a scene camera.
//!
//! The HMD reports an absolute orientation in its own device space.  The
//! scene camera has an orientation of its own that other code (navigation,
//! keyboard input, fly-to animations) may change between frames.  The
//! [`Reconciler`] keeps a *reference matrix* that maps device space into
//! camera space, so that each frame's head rotation is applied relative to
//! wherever the camera was already facing:
//!
//! ```text
//! O = R(q⁻¹)                          head rotation, device → world
//! S = [right; up; −direction]         camera rotation this frame
//!
//! first frame:   ref = O⁻¹ · S
//! later frames:  ref = ref · (prev⁻¹ · S)     fold in external camera motion
//!
//! camera = prev = O · ref
//! ```
//!
//! `prev` is the [`CameraMatrixSlot`] the caller threads through every call.
//! Any difference between `prev` and the camera's current matrix is motion
//! that did not come from the head, and is preserved.
//!
//! # Example
//!
//! ```rust
//! use glam::{DQuat, DVec3};
//! use globevr_frame::reconciler::{CameraMatrixSlot, Reconciler};
//! use globevr_types::Camera;
//!
//! let mut camera = Camera::default();
//! let mut slot = CameraMatrixSlot::default();
//! let mut reconciler = Reconciler::new();
//!
//! reconciler.reconcile(&mut camera, &mut slot, DQuat::IDENTITY);
//! // Turn the head 90° to the left.
//! reconciler.reconcile(&mut camera, &mut slot, DQuat::from_rotation_y(std::f64::consts::FRAC_PI_2));
//! assert!(camera.direction.abs_diff_eq(DVec3::NEG_X, 1e-9));
//! ```

use glam::{DMat3, DQuat};
use globevr_types::Camera;
use tracing::{debug, instrument, trace, warn};

use crate::camera_matrix::{camera_rotation_matrix, set_camera_rotation_matrix};

/// Caller-owned record of the camera matrix the reconciler last wrote.
///
/// Keep one slot per camera and pass the same slot, untouched, to every
/// [`Reconciler::reconcile`] call for that camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrixSlot {
    matrix: DMat3,
}

impl CameraMatrixSlot {
    /// The matrix written by the most recent reconciliation.
    pub fn matrix(&self) -> DMat3 {
        self.matrix
    }
}

impl Default for CameraMatrixSlot {
    fn default() -> Self {
        Self {
            matrix: DMat3::IDENTITY,
        }
    }
}

/// Whether the reference matrix is valid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ReconcilerState {
    /// The next reconciliation bootstraps the reference from the camera pose.
    #[default]
    Uninitialized,
    Tracking {
        /// Device space → camera space at the last reconciliation.
        reference: DMat3,
    },
}

/// Applies head rotation to a scene camera, relative to the camera's own
/// motion.
#[derive(Debug, Default)]
pub struct Reconciler {
    state: ReconcilerState,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ReconcilerState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, ReconcilerState::Tracking { .. })
    }

    /// The current reference matrix, if tracking.
    pub fn reference(&self) -> Option<DMat3> {
        match self.state {
            ReconcilerState::Tracking { reference } => Some(reference),
            ReconcilerState::Uninitialized => None,
        }
    }

    /// Compose `rotation` with the camera's current orientation and write the
    /// result back into `camera` and `slot`.
    ///
    /// Call at most once per frame, after any other code has moved the
    /// camera for that frame.
    #[instrument(level = "trace", skip_all)]
    pub fn reconcile(&mut self, camera: &mut Camera, slot: &mut CameraMatrixSlot, rotation: DQuat) {
        let hmd_rotation = DMat3::from_quat(rotation.inverse());
        let scene_camera = camera_rotation_matrix(camera);

        let reference = match self.state {
            ReconcilerState::Uninitialized => {
                debug!("bootstrapping HMD reference from camera pose");
                hmd_rotation.inverse() * scene_camera
            }
            ReconcilerState::Tracking { reference } => {
                let camera_motion = slot.matrix.inverse() * scene_camera;
                trace!(?camera_motion, "folding external camera motion into reference");
                reference * camera_motion
            }
        };
        self.state = ReconcilerState::Tracking { reference };

        slot.matrix = hmd_rotation * reference;
        set_camera_rotation_matrix(&slot.matrix, camera);
    }

    /// Forget the reference; the next [`reconcile`][Self::reconcile]
    /// re-bootstraps from the camera pose.
    pub fn reset(&mut self) {
        self.state = ReconcilerState::Uninitialized;
    }

    /// Snap `camera` upright over the globe and re-bootstrap.
    ///
    /// See [`level_camera`].
    pub fn level(&mut self, camera: &mut Camera) {
        self.reset();
        level_camera(camera);
    }
}

/// Point `camera.up` away from the globe centre and rebuild `right`.
///
/// Assumes a geocentric camera: `up` becomes the normalised position.  A
/// camera at the globe centre has no radial direction and keeps its
/// orientation.
pub fn level_camera(camera: &mut Camera) {
    let Some(up) = camera.position.try_normalize() else {
        warn!("camera at the globe centre; leaving orientation unchanged");
        return;
    };
    camera.up = up;
    camera.right = camera.direction.cross(up);
}
