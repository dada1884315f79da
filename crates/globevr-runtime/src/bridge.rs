//! [`HmdBridge`] – the host-facing HMD ⇄ globe camera bridge.
//!
//! The bridge issues one device request to the platform when it is built and
//! integrates the answer whenever the host next polls it.  Until then every
//! rotation query fails with [`VrError::DiscoveryPending`], which a render
//! loop can treat as "draw without head tracking this frame".
//! If the platform drops the request instead, queries fail with
//! [`VrError::DiscoveryAbandoned`] for the rest of the bridge's life.
//!
//! # Example
//!
//! ```rust
//! use globevr_frame::CameraMatrixSlot;
//! use globevr_hal::sim::SimPlatform;
//! use globevr_runtime::HmdBridge;
//! use globevr_types::Camera;
//!
//! let platform = SimPlatform::builder().with_rift("unit-1", 0.032).build();
//! let mut bridge = HmdBridge::builder().connect(&platform);
//!
//! let mut camera = Camera::default();
//! let mut slot = CameraMatrixSlot::default();
//!
//! // Once per frame:
//! bridge.update_frame(&mut camera, &mut slot).expect("sim headset is tracking");
//! bridge.set_scene_params(&mut camera, "left");
//! ```

use std::sync::Arc;

use glam::DQuat;
use globevr_frame::{CameraMatrixSlot, Reconciler, stereo_pair};
use globevr_hal::{AlertHandler, DeviceBinding, DeviceRequest, ErrorHandler, HmdDevice, VrDevice, VrPlatform};
use globevr_types::{Camera, Eye, EyeOffsets, VrError};
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{info, warn};

use crate::config::BridgeConfig;

/// Progress of the one-shot device discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStatus {
    /// The platform has not answered yet.  It may never answer.
    Pending,
    /// Discovery ran, whatever it found.
    Complete,
    /// The platform dropped the request without answering.
    Abandoned,
}

type DiscoveryCallback = Box<dyn FnOnce(&DeviceBinding) + Send>;

/// Builder for [`HmdBridge`].
pub struct HmdBridgeBuilder {
    config: BridgeConfig,
    error_handler: Arc<dyn ErrorHandler>,
    on_discovered: Option<DiscoveryCallback>,
}

impl Default for HmdBridgeBuilder {
    fn default() -> Self {
        Self {
            config: BridgeConfig::default(),
            error_handler: Arc::new(AlertHandler),
            on_discovered: None,
        }
    }
}

impl HmdBridgeBuilder {
    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default [`AlertHandler`].
    pub fn with_error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = handler;
        self
    }

    /// Run `callback` once discovery completes, even if it found nothing.
    pub fn on_discovered(mut self, callback: impl FnOnce(&DeviceBinding) + Send + 'static) -> Self {
        self.on_discovered = Some(Box::new(callback));
        self
    }

    /// Build the bridge and send the device request to `platform`.
    pub fn connect(self, platform: &dyn VrPlatform) -> HmdBridge {
        info!(ipd_scale = self.config.ipd_scale, "requesting VR devices");
        let request = platform.request_devices();
        HmdBridge {
            binding: DeviceBinding::new(self.error_handler).with_ipd_scale(self.config.ipd_scale),
            reconciler: Reconciler::new(),
            request: Some(request),
            status: DiscoveryStatus::Pending,
            on_discovered: self.on_discovered,
            config: self.config,
        }
    }
}

/// Binds an HMD to a scene camera.
pub struct HmdBridge {
    binding: DeviceBinding,
    reconciler: Reconciler,
    request: Option<DeviceRequest>,
    status: DiscoveryStatus,
    on_discovered: Option<DiscoveryCallback>,
    config: BridgeConfig,
}

impl HmdBridge {
    pub fn builder() -> HmdBridgeBuilder {
        HmdBridgeBuilder::default()
    }

    pub fn status(&self) -> DiscoveryStatus {
        self.status
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn binding(&self) -> &DeviceBinding {
        &self.binding
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Integrate the platform's answer if it has arrived.  Never blocks.
    pub fn poll_discovery(&mut self) -> DiscoveryStatus {
        if let Some(request) = self.request.as_mut() {
            match request.try_recv() {
                Ok(devices) => self.complete_discovery(devices),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => self.abandon_discovery(),
            }
        }
        self.status
    }

    /// Wait for the platform's answer.  There is no timeout.
    pub async fn discovered(&mut self) -> DiscoveryStatus {
        if let Some(request) = self.request.as_mut() {
            match request.await {
                Ok(devices) => self.complete_discovery(devices),
                Err(_) => self.abandon_discovery(),
            }
        }
        self.status
    }

    fn complete_discovery(&mut self, devices: Vec<VrDevice>) {
        self.request = None;
        self.binding.discover(devices);
        self.status = DiscoveryStatus::Complete;
        if self.config.reset_on_discovery {
            self.reconciler.reset();
        }
        if let Some(callback) = self.on_discovered.take() {
            callback(&self.binding);
        }
    }

    fn abandon_discovery(&mut self) {
        warn!("VR platform dropped the device request; head tracking stays unavailable");
        self.request = None;
        self.status = DiscoveryStatus::Abandoned;
    }

    /// Current head orientation.
    ///
    /// # Errors
    ///
    /// [`VrError::DiscoveryAbandoned`] once the platform has dropped the
    /// request; otherwise see [`DeviceBinding::poll_rotation`].
    pub fn get_rotation(&mut self) -> Result<DQuat, VrError> {
        if self.poll_discovery() == DiscoveryStatus::Abandoned {
            return Err(VrError::DiscoveryAbandoned);
        }
        self.binding.poll_rotation()
    }

    /// The active HMD, once discovered.
    pub fn get_device(&self) -> Option<&Arc<dyn HmdDevice>> {
        self.binding.hmd()
    }

    /// Apply the frustum offset of the eye named `eye` to `camera`.
    pub fn set_scene_params(&self, camera: &mut Camera, eye: &str) {
        self.binding.apply_eye_frustum_offset(camera, eye);
    }

    /// Apply `rotation` to `camera` relative to its own motion.
    pub fn apply_hmd_rotation(
        &mut self,
        camera: &mut Camera,
        slot: &mut CameraMatrixSlot,
        rotation: DQuat,
    ) {
        self.reconciler.reconcile(camera, slot, rotation);
    }

    /// Snap `camera` upright and re-bootstrap head tracking.
    pub fn level_camera(&mut self, camera: &mut Camera) {
        self.reconciler.level(camera);
    }

    /// Poll the head orientation and apply it to `camera`.
    ///
    /// Returns the rotation that was applied.  On error the camera and slot
    /// are left untouched.
    pub fn update_frame(
        &mut self,
        camera: &mut Camera,
        slot: &mut CameraMatrixSlot,
    ) -> Result<DQuat, VrError> {
        let rotation = self.get_rotation()?;
        self.apply_hmd_rotation(camera, slot, rotation);
        Ok(rotation)
    }

    /// Left and right eye cameras derived from `master`, each positioned by
    /// its scaled eye offset and carrying its own frustum offset.
    ///
    /// # Errors
    ///
    /// [`VrError::EyeOffsetsUnavailable`] when no HMD was discovered.
    pub fn stereo_cameras(&self, master: &Camera) -> Result<[Camera; 2], VrError> {
        let offsets = self
            .binding
            .eye_offsets()
            .ok_or(VrError::EyeOffsetsUnavailable)?;
        let scale = self.binding.ipd_scale();
        let scaled = EyeOffsets {
            left: offsets.left * scale,
            right: offsets.right * scale,
        };
        let mut eyes = stereo_pair(master, scaled);
        for (camera, eye) in eyes.iter_mut().zip(Eye::BOTH) {
            self.binding.apply_eye_offset(camera, eye)?;
        }
        Ok(eyes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use globevr_hal::sim::{ErrorLog, SimHmd, SimPlatform, SimPositionSensor, SimResolution};
    use std::f64::consts::FRAC_PI_2;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce(&DeviceBinding) + Send + 'static) {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        (calls, move |_: &DeviceBinding| {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn immediate_discovery_completes_on_first_poll() {
        let platform = SimPlatform::builder().with_rift("unit-1", 0.03).build();
        let log = Arc::new(ErrorLog::new());
        let (calls, callback) = counter();
        let mut bridge = HmdBridge::builder()
            .with_error_handler(log.clone())
            .on_discovered(callback)
            .connect(&platform);

        assert_eq!(bridge.status(), DiscoveryStatus::Pending);
        assert_eq!(bridge.get_rotation(), Ok(DQuat::IDENTITY));
        assert_eq!(bridge.status(), DiscoveryStatus::Complete);
        assert_eq!(bridge.get_device().unwrap().hardware_unit_id(), "unit-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(log.messages().is_empty());

        bridge.poll_discovery();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_sensor_reports_once_and_still_calls_back() {
        let platform = SimPlatform::builder()
            .with_device(SimHmd::new("Rift", "unit-1", 0.03))
            .with_device(SimPositionSensor::new("Other tracker", "unit-2"))
            .build();
        let log = Arc::new(ErrorLog::new());
        let (calls, callback) = counter();
        let mut bridge = HmdBridge::builder()
            .with_error_handler(log.clone())
            .on_discovered(callback)
            .connect(&platform);

        assert_eq!(bridge.poll_discovery(), DiscoveryStatus::Complete);
        assert_eq!(log.messages(), vec!["No HMD sensor detected".to_string()]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bridge.get_rotation(), Err(VrError::NoSensor));
    }

    #[test]
    fn rotation_before_discovery_fails_fast() {
        let platform = SimPlatform::builder()
            .with_rift("unit-1", 0.03)
            .resolution(SimResolution::Deferred)
            .build();
        let (calls, callback) = counter();
        let mut bridge = HmdBridge::builder().on_discovered(callback).connect(&platform);

        assert_eq!(bridge.get_rotation(), Err(VrError::DiscoveryPending));
        assert!(bridge.get_device().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        platform.resolve();
        assert_eq!(bridge.get_rotation(), Ok(DQuat::IDENTITY));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn never_resolving_platform_keeps_camera_untouched() {
        let platform = SimPlatform::builder()
            .with_rift("unit-1", 0.03)
            .resolution(SimResolution::Never)
            .build();
        let mut bridge = HmdBridge::builder().connect(&platform);
        let mut camera = Camera::default();
        let mut slot = CameraMatrixSlot::default();
        let before = camera.clone();

        for _ in 0..5 {
            assert_eq!(
                bridge.update_frame(&mut camera, &mut slot),
                Err(VrError::DiscoveryPending)
            );
        }
        assert_eq!(bridge.status(), DiscoveryStatus::Pending);
        assert_eq!(camera, before);
        assert!(!bridge.reconciler().is_tracking());
    }

    #[test]
    fn abandoned_request_is_terminal() {
        let platform = SimPlatform::builder()
            .resolution(SimResolution::Abandoned)
            .build();
        let (calls, callback) = counter();
        let mut bridge = HmdBridge::builder().on_discovered(callback).connect(&platform);

        assert_eq!(bridge.poll_discovery(), DiscoveryStatus::Abandoned);
        assert_eq!(bridge.get_rotation(), Err(VrError::DiscoveryAbandoned));
        assert_eq!(bridge.get_rotation(), Err(VrError::DiscoveryAbandoned));
        assert_eq!(bridge.status(), DiscoveryStatus::Abandoned);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn discovered_waits_for_late_platform() {
        let platform = Arc::new(
            SimPlatform::builder()
                .with_rift("unit-1", 0.03)
                .resolution(SimResolution::Deferred)
                .build(),
        );
        let mut bridge = HmdBridge::builder().connect(platform.as_ref());

        let resolver = Arc::clone(&platform);
        let handle = tokio::spawn(async move {
            tokio::task::yield_now().await;
            resolver.resolve()
        });

        assert_eq!(bridge.discovered().await, DiscoveryStatus::Complete);
        assert_eq!(handle.await.unwrap(), 1);
        assert!(bridge.binding().is_discovered());
    }

    #[test]
    fn scene_params_follow_eye_offsets() {
        let platform = SimPlatform::builder().with_rift("unit-1", 0.03).build();
        let log = Arc::new(ErrorLog::new());
        let mut bridge = HmdBridge::builder()
            .with_error_handler(log.clone())
            .connect(&platform);
        bridge.poll_discovery();

        let mut camera = Camera::default();
        bridge.set_scene_params(&mut camera, "left");
        assert_eq!(camera.frustum.offset(), (-0.03, 0.0));

        bridge.set_scene_params(&mut camera, "top");
        assert_eq!(camera.frustum.offset(), (-0.03, 0.0));
        let messages = log.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("developer error"));
    }

    #[test]
    fn update_frame_applies_head_rotation() {
        let sensor = Arc::new(SimPositionSensor::tracking("Rift tracker", "unit-1"));
        let platform = SimPlatform::builder()
            .with_device(SimHmd::new("Rift", "unit-1", 0.03))
            .with_device(VrDevice::PositionSensor(sensor.clone()))
            .build();
        let mut bridge = HmdBridge::builder().connect(&platform);
        let mut camera = Camera::default();
        let mut slot = CameraMatrixSlot::default();

        bridge.update_frame(&mut camera, &mut slot).unwrap();
        assert!(camera.direction.abs_diff_eq(DVec3::NEG_Z, 1e-9));

        sensor.set_orientation(DQuat::from_rotation_y(FRAC_PI_2));
        bridge.update_frame(&mut camera, &mut slot).unwrap();
        assert!(camera.direction.abs_diff_eq(DVec3::NEG_X, 1e-9));

        // A tracking gap snaps back to the bootstrap pose.
        sensor.lose_tracking();
        bridge.update_frame(&mut camera, &mut slot).unwrap();
        assert!(camera.direction.abs_diff_eq(DVec3::NEG_Z, 1e-9));
    }

    #[test]
    fn level_camera_rebootstraps_tracking() {
        let sensor = Arc::new(SimPositionSensor::tracking("Rift tracker", "unit-1"));
        let platform = SimPlatform::builder()
            .with_device(SimHmd::new("Rift", "unit-1", 0.03))
            .with_device(VrDevice::PositionSensor(sensor.clone()))
            .build();
        let mut bridge = HmdBridge::builder().connect(&platform);
        let mut camera = Camera::new(
            DVec3::new(6_400_000.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::X,
        );
        let mut slot = CameraMatrixSlot::default();

        sensor.set_orientation(DQuat::from_rotation_z(0.4));
        bridge.update_frame(&mut camera, &mut slot).unwrap();
        assert!(bridge.reconciler().is_tracking());

        bridge.level_camera(&mut camera);
        assert!(!bridge.reconciler().is_tracking());
        assert!(camera.up.abs_diff_eq(DVec3::X, 1e-12));

        let leveled = camera.clone();
        sensor.set_orientation(DQuat::from_rotation_z(-0.7));
        bridge.update_frame(&mut camera, &mut slot).unwrap();
        assert!(camera.up.abs_diff_eq(leveled.up, 1e-9));
        assert!(camera.direction.abs_diff_eq(leveled.direction, 1e-9));
    }

    #[test]
    fn reset_on_discovery_resets_reconciler() {
        let platform = SimPlatform::builder()
            .with_rift("unit-1", 0.03)
            .resolution(SimResolution::Deferred)
            .build();
        let config = BridgeConfig {
            reset_on_discovery: true,
            ..BridgeConfig::default()
        };
        let mut bridge = HmdBridge::builder().with_config(config).connect(&platform);
        let mut camera = Camera::default();
        let mut slot = CameraMatrixSlot::default();

        bridge.apply_hmd_rotation(&mut camera, &mut slot, DQuat::IDENTITY);
        assert!(bridge.reconciler().is_tracking());

        platform.resolve();
        bridge.poll_discovery();
        assert!(!bridge.reconciler().is_tracking());
    }

    #[test]
    fn stereo_cameras_carry_scaled_offsets() {
        let platform = SimPlatform::builder().with_rift("unit-1", 0.03).build();
        let config = BridgeConfig {
            ipd_scale: 2.0,
            ..BridgeConfig::default()
        };
        let mut bridge = HmdBridge::builder().with_config(config).connect(&platform);
        bridge.poll_discovery();

        let [left, right] = bridge.stereo_cameras(&Camera::default()).unwrap();
        assert!(left.position.abs_diff_eq(DVec3::new(-0.06, 0.0, 0.0), 1e-12));
        assert!(right.position.abs_diff_eq(DVec3::new(0.06, 0.0, 0.0), 1e-12));
        assert!((left.frustum.x_offset + 0.06).abs() < 1e-12);
        assert!((right.frustum.x_offset - 0.06).abs() < 1e-12);
    }

    #[test]
    fn stereo_cameras_need_an_hmd() {
        let platform = SimPlatform::builder()
            .with_device(SimPositionSensor::new("Tracker", "unit-1"))
            .build();
        let log = Arc::new(ErrorLog::new());
        let mut bridge = HmdBridge::builder()
            .with_error_handler(log.clone())
            .connect(&platform);
        bridge.poll_discovery();

        assert_eq!(log.messages(), vec!["No HMD detected".to_string()]);
        assert_eq!(
            bridge.stereo_cameras(&Camera::default()).unwrap_err(),
            VrError::EyeOffsetsUnavailable
        );
    }

    #[test]
    fn scaled_sensor_quaternion_keeps_camera_orthonormal() {
        let sensor = Arc::new(SimPositionSensor::tracking("Rift tracker", "unit-1"));
        let platform = SimPlatform::builder()
            .with_device(SimHmd::new("Rift", "unit-1", 0.03))
            .with_device(VrDevice::PositionSensor(sensor.clone()))
            .build();
        let mut bridge = HmdBridge::builder().connect(&platform);
        let mut camera = Camera::default();
        let mut slot = CameraMatrixSlot::default();
        bridge.update_frame(&mut camera, &mut slot).unwrap();

        sensor.set_orientation(DQuat::from_rotation_y(0.3) * 1.05);
        let rotation = bridge.update_frame(&mut camera, &mut slot).unwrap();

        assert!(rotation.is_normalized());
        assert!((camera.right.length() - 1.0).abs() < 1e-12);
        assert!((camera.up.length() - 1.0).abs() < 1e-12);
        assert!((camera.direction.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn leveling_at_origin_does_not_poison_the_camera() {
        let sensor = Arc::new(SimPositionSensor::tracking("Rift tracker", "unit-1"));
        let platform = SimPlatform::builder()
            .with_device(SimHmd::new("Rift", "unit-1", 0.03))
            .with_device(VrDevice::PositionSensor(sensor.clone()))
            .build();
        let mut bridge = HmdBridge::builder().connect(&platform);
        let mut camera = Camera::default();
        let mut slot = CameraMatrixSlot::default();

        bridge.level_camera(&mut camera);
        sensor.set_orientation(DQuat::from_rotation_y(0.2));
        bridge.update_frame(&mut camera, &mut slot).unwrap();

        assert!(camera.up.is_finite());
        assert!(camera.direction.abs_diff_eq(DVec3::NEG_Z, 1e-9));
        assert!(slot.matrix().is_finite());
    }
}
