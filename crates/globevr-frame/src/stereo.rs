//! Per-eye slave cameras for side-by-side stereo rendering.
//!
//! Each eye gets a copy of the master camera shifted sideways along the
//! master's right axis.  Lines of sight stay parallel (no convergence), so
//! the asymmetric frustum offset alone supplies the stereo disparity.

use glam::DVec3;
use globevr_types::{Camera, Eye, EyeOffsets};

/// Distance along the view direction of the focal point handed to
/// [`Camera::look_at`].
pub const FOCAL_DISTANCE: f64 = 10_000.0;

/// Move `slave` to `master`'s pose shifted `eye_offset` along
/// `direction × up`, looking parallel to `master`.
pub fn slave_camera_update(master: &Camera, eye_offset: f64, slave: &mut Camera) {
    let right: DVec3 = master.direction.cross(master.up) * eye_offset;
    let eye = master.position + right;
    let target = eye + master.direction * FOCAL_DISTANCE;
    slave.look_at(eye, target, master.up);
}

/// Build both eye cameras from `master`.
///
/// Each eye camera starts as a clone of `master` (keeping its frustum and
/// transform) and is then repositioned with [`slave_camera_update`].
pub fn stereo_pair(master: &Camera, offsets: EyeOffsets) -> [Camera; 2] {
    Eye::BOTH.map(|eye| {
        let mut slave = master.clone();
        slave_camera_update(master, offsets.get(eye), &mut slave);
        slave
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn slave_is_shifted_along_right_axis() {
        let master = Camera::new(DVec3::new(0.0, 0.0, 10.0), DVec3::NEG_Z, DVec3::Y);
        let mut slave = Camera::default();

        slave_camera_update(&master, -0.032, &mut slave);

        assert!(slave.position.abs_diff_eq(DVec3::new(-0.032, 0.0, 10.0), EPS));
        assert!(slave.direction.abs_diff_eq(master.direction, EPS));
        assert!(slave.up.abs_diff_eq(master.up, EPS));
        assert!(slave.right.abs_diff_eq(master.right, EPS));
    }

    #[test]
    fn zero_offset_matches_master() {
        let master = Camera::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(1.0, 0.0, -1.0), DVec3::Y);
        let mut slave = Camera::default();

        slave_camera_update(&master, 0.0, &mut slave);

        assert!(slave.position.abs_diff_eq(master.position, EPS));
        assert!(slave.direction.abs_diff_eq(master.direction, EPS));
    }

    #[test]
    fn stereo_pair_is_left_then_right() {
        let mut master = Camera::default();
        master.frustum.set_offset(0.5, 0.0);
        let [left, right] = stereo_pair(
            &master,
            EyeOffsets {
                left: -0.03,
                right: 0.03,
            },
        );

        assert!(left.position.abs_diff_eq(DVec3::new(-0.03, 0.0, 0.0), EPS));
        assert!(right.position.abs_diff_eq(DVec3::new(0.03, 0.0, 0.0), EPS));
        assert_eq!(left.frustum, master.frustum);
        assert!(((right.position - left.position).length() - 0.06).abs() < EPS);
    }
}
