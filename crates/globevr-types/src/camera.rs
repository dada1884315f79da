//! Host scene camera model.
//!
//! The rendering engine owns the camera; GlobeVR only reads and overwrites
//! its orientation vectors and the horizontal frustum offset.

use glam::{DMat4, DVec3};

/// Perspective frustum with an optional off-centre projection offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveFrustum {
    /// Vertical field of view (radians).
    pub fov_y: f64,
    pub aspect_ratio: f64,
    pub near: f64,
    pub far: f64,
    /// Horizontal offset of the projection centre.
    pub x_offset: f64,
    /// Vertical offset of the projection centre.
    pub y_offset: f64,
}

impl PerspectiveFrustum {
    pub fn set_offset(&mut self, x_offset: f64, y_offset: f64) {
        self.x_offset = x_offset;
        self.y_offset = y_offset;
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.x_offset, self.y_offset)
    }
}

impl Default for PerspectiveFrustum {
    fn default() -> Self {
        Self {
            fov_y: 60f64.to_radians(),
            aspect_ratio: 1.0,
            near: 1.0,
            far: 500_000_000.0,
            x_offset: 0.0,
            y_offset: 0.0,
        }
    }
}

/// A scene camera in world coordinates.
///
/// `right`, `up` and `direction` are expected to stay mutually orthogonal
/// unit vectors with `right = direction × up`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: DVec3,
    pub direction: DVec3,
    pub up: DVec3,
    pub right: DVec3,
    pub transform: DMat4,
    pub frustum: PerspectiveFrustum,
}

impl Camera {
    /// Create a camera at `position` looking along `direction`.
    ///
    /// `up` is re-orthogonalised against `direction`.
    pub fn new(position: DVec3, direction: DVec3, up: DVec3) -> Self {
        let mut camera = Self {
            position,
            direction: DVec3::NEG_Z,
            up: DVec3::Y,
            right: DVec3::X,
            transform: DMat4::IDENTITY,
            frustum: PerspectiveFrustum::default(),
        };
        camera.look_at(position, position + direction, up);
        camera
    }

    /// Place the camera at `eye` looking towards `target`.
    pub fn look_at(&mut self, eye: DVec3, target: DVec3, up: DVec3) {
        self.position = eye;
        self.direction = (target - eye).normalize();
        self.right = self.direction.cross(up).normalize();
        self.up = self.right.cross(self.direction);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DVec3::ZERO, DVec3::NEG_Z, DVec3::Y)
    }
}
