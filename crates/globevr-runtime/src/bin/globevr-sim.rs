//! `globevr-sim` – drives an [`HmdBridge`] against a simulated headset.
//!
//! Loads `~/.globevr/config.toml` (with `GLOBEVR_*` overrides), initialises
//! tracing, then runs a short frame loop in which the simulated head sweeps
//! left and right while the camera orbits the globe.  Useful for checking a
//! collector setup (`OTEL_EXPORTER_OTLP_ENDPOINT`) or eyeballing the
//! reconciled camera with `RUST_LOG=globevr_frame=trace`.
//!
//! Usage: `globevr-sim [FRAMES]` (default 90).

use std::sync::Arc;

use glam::{DQuat, DVec3};
use globevr_frame::CameraMatrixSlot;
use globevr_hal::VrDevice;
use globevr_hal::sim::{SimHmd, SimPlatform, SimPositionSensor};
use globevr_runtime::{BridgeConfig, HmdBridge, config, init_tracing};
use globevr_types::Camera;
use tracing::{error, info, warn};

const EARTH_RADIUS: f64 = 6_378_137.0;

fn main() {
    let cfg = match config::load() {
        Ok(Some(cfg)) => cfg,
        Ok(None) => BridgeConfig::default(),
        Err(e) => {
            eprintln!("[globevr] {e}; using defaults");
            BridgeConfig::default()
        }
    };
    let _guard = init_tracing("globevr-sim", cfg.log_format);

    let frames: u32 = match std::env::args().nth(1).map(|a| a.parse()) {
        None => 90,
        Some(Ok(n)) => n,
        Some(Err(e)) => {
            error!(error = %e, "FRAMES must be a non-negative integer");
            std::process::exit(2);
        }
    };

    let sensor = Arc::new(SimPositionSensor::tracking("Sim tracker", "sim-0"));
    let platform = SimPlatform::builder()
        .with_device(SimHmd::new("Sim HMD", "sim-0", 0.032))
        .with_device(VrDevice::PositionSensor(sensor.clone()))
        .build();

    let mut bridge = HmdBridge::builder()
        .with_config(cfg)
        .on_discovered(|binding| {
            info!(eye_offsets = ?binding.eye_offsets(), "headset ready");
        })
        .connect(&platform);

    // Two earth radii out, looking at the globe centre.
    let mut camera = Camera::new(
        DVec3::new(0.0, 0.0, EARTH_RADIUS * 2.0),
        DVec3::NEG_Z,
        DVec3::Y,
    );
    let mut slot = CameraMatrixSlot::default();
    let orbit = DQuat::from_rotation_y(0.25_f64.to_radians());

    for frame in 0..frames {
        let t = f64::from(frame) / 30.0;
        sensor.set_orientation(DQuat::from_rotation_y(0.6 * t.sin()));

        // Navigation moves the camera independently of the head.
        camera.position = orbit * camera.position;
        camera.direction = orbit * camera.direction;
        camera.up = orbit * camera.up;
        camera.right = orbit * camera.right;

        match bridge.update_frame(&mut camera, &mut slot) {
            Ok(rotation) => info!(
                frame,
                yaw = rotation.to_euler(glam::EulerRot::YXZ).0,
                direction = ?camera.direction,
                "frame"
            ),
            Err(e) => warn!(frame, error = %e, "head tracking unavailable"),
        }
    }

    match bridge.stereo_cameras(&camera) {
        Ok([left, right]) => info!(
            left = ?left.position,
            right = ?right.position,
            separation = left.position.distance(right.position),
            "final eye cameras"
        ),
        Err(e) => warn!(error = %e, "no stereo cameras"),
    }
}
