//! Platform driver boundary.
//!
//! The platform camera driver is an external collaborator: device enumeration
//! order, capture timing, and error delivery are dictated by the platform,
//! not by this crate. [`PlatformDriver`] and [`DeviceHandle`] capture the
//! surface the session relies on. Completion and fault callbacks arrive on
//! driver-owned threads, never on the caller's thread.

use crate::errors::DeviceError;
use crate::types::{DeviceDescriptor, TextureSurface, WindowSurface};
use std::sync::Arc;

/// Invoked exactly once, on a driver thread, with the encoded still image
/// bytes. Dropping the callback without invoking it abandons the capture.
pub type CaptureCallback = Box<dyn FnOnce(Vec<u8>) + Send + 'static>;

/// Receives asynchronous hardware fault codes, off the caller's thread.
pub type FaultSink = Arc<dyn Fn(i32) + Send + Sync + 'static>;

/// Enumeration and exclusive acquisition of physical camera devices.
pub trait PlatformDriver: Send {
    /// Ordered list of attached devices.
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, DeviceError>;

    /// Claim the device at `index` exclusively. Fails with
    /// [`DeviceError::OpenFailed`] if the device is absent or already claimed.
    fn acquire(&mut self, index: u32) -> Result<Box<dyn DeviceHandle>, DeviceError>;
}

/// Operations against one claimed device.
pub trait DeviceHandle: Send {
    fn descriptor(&self) -> &DeviceDescriptor;

    /// Register the channel for asynchronous hardware error notifications.
    fn set_fault_sink(&mut self, sink: FaultSink);

    fn bind_texture(&mut self, surface: &TextureSurface) -> Result<(), DeviceError>;

    fn bind_window(&mut self, surface: &WindowSurface) -> Result<(), DeviceError>;

    fn start_preview(&mut self) -> Result<(), DeviceError>;

    fn stop_preview(&mut self) -> Result<(), DeviceError>;

    /// Apply a display rotation. `degrees` must already be a right angle in
    /// `[0, 360)`.
    fn set_rotation(&mut self, degrees: i32) -> Result<(), DeviceError>;

    /// Request a single still capture. `on_complete` fires once on a driver
    /// thread with the encoded image bytes.
    fn take_picture(&mut self, on_complete: CaptureCallback) -> Result<(), DeviceError>;

    /// Release the underlying device. Treated as infallible.
    fn release(&mut self);
}
