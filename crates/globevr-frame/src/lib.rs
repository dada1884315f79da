//! `globevr-frame` – reference-frame reconciliation.
//!
//! Turns absolute HMD orientation into a scene camera orientation that moves
//! with the head while respecting whatever else moved the camera.
//!
//! # Modules
//!
//! - [`camera_matrix`] – camera orientation vectors ⇄ 3×3 rotation matrix.
//! - [`reconciler`] – [`Reconciler`][reconciler::Reconciler]: composes head
//!   rotation with independent camera motion through an accumulated
//!   reference matrix, plus camera leveling.
//! - [`stereo`] – per-eye slave cameras for side-by-side rendering.

pub mod camera_matrix;
pub mod reconciler;
pub mod stereo;

pub use camera_matrix::{camera_rotation_matrix, set_camera_rotation_matrix};
pub use reconciler::{CameraMatrixSlot, Reconciler, ReconcilerState, level_camera};
pub use stereo::{slave_camera_update, stereo_pair};
