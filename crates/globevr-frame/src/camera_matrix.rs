//! Conversions between a [`Camera`]'s orientation vectors and its 3×3
//! rotation matrix.
//!
//! The matrix rows are `right`, `up` and `-direction`: the camera looks down
//! its local −Z axis.

use glam::DMat3;
use globevr_types::Camera;

/// Build the rotation matrix of `camera`.
pub fn camera_rotation_matrix(camera: &Camera) -> DMat3 {
    DMat3::from_cols(camera.right, camera.up, -camera.direction).transpose()
}

/// Overwrite `camera`'s orientation vectors with the rows of `rotation`.
pub fn set_camera_rotation_matrix(rotation: &DMat3, camera: &mut Camera) {
    camera.right = rotation.row(0);
    camera.up = rotation.row(1);
    camera.direction = -rotation.row(2);
}
