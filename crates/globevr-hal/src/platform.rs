//! Host VR subsystem seam.
//!
//! Discovery is a single non-blocking request made once at start-up.  The
//! answer arrives on a [`DeviceRequest`] at some later point, or never: there
//! is no timeout, no cancellation and no retry.  A platform that drops its
//! sender has abandoned the request.

use tokio::sync::oneshot;

use crate::device::VrDevice;

/// Pending answer to a device enumeration request.
pub type DeviceRequest = oneshot::Receiver<Vec<VrDevice>>;

/// The host platform's VR subsystem.
pub trait VrPlatform {
    /// Start enumerating VR devices.  Must not block.
    fn request_devices(&self) -> DeviceRequest;
}
