//! Native camera driver backed by nokhwa.
//!
//! Desktop capture backends expose no facing metadata and no display
//! compositor, so facing is inferred from device names and surface binds are
//! recorded but have no preview path to feed. Hardware fault callbacks are
//! likewise not surfaced by these backends; the registered sink is held but
//! never fires.

use crate::driver::{CaptureCallback, DeviceHandle, FaultSink, PlatformDriver};
use crate::errors::DeviceError;
use crate::types::{DeviceDescriptor, Facing, TextureSurface, WindowSurface};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::CallbackCamera;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::thread;

/// Heuristic facing classification from the device's human name. Built-in
/// laptop and front-of-phone devices tend to advertise themselves; everything
/// else is treated as back-facing.
fn facing_for_name(name: &str) -> Facing {
    let name = name.to_lowercase();
    if name.contains("front") || name.contains("facetime") || name.contains("integrated") {
        Facing::Front
    } else {
        Facing::Back
    }
}

/// [`PlatformDriver`] over the host's real capture devices.
pub struct NativeDriver;

impl NativeDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NativeDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformDriver for NativeDriver {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, DeviceError> {
        let cameras = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| DeviceError::OpenFailed(format!("failed to query cameras: {}", e)))?;

        Ok(cameras
            .iter()
            .map(|info| {
                let index = match info.index() {
                    CameraIndex::Index(i) => *i,
                    CameraIndex::String(_) => 0,
                };
                DeviceDescriptor::new(index, facing_for_name(&info.human_name()), info.human_name())
            })
            .collect())
    }

    fn acquire(&mut self, index: u32) -> Result<Box<dyn DeviceHandle>, DeviceError> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::None);

        let camera = CallbackCamera::new(CameraIndex::Index(index), requested, |_| {})
            .map_err(|e| DeviceError::OpenFailed(format!("failed to claim device {}: {}", index, e)))?;

        let name = camera.info().human_name();
        let descriptor = DeviceDescriptor::new(index, facing_for_name(&name), name);

        log::info!("claimed native device {} ({})", index, descriptor.name);

        Ok(Box::new(NativeHandle {
            descriptor,
            camera: Arc::new(Mutex::new(camera)),
            fault_sink: None,
        }))
    }
}

struct NativeHandle {
    descriptor: DeviceDescriptor,
    camera: Arc<Mutex<CallbackCamera>>,
    fault_sink: Option<FaultSink>,
}

impl DeviceHandle for NativeHandle {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn set_fault_sink(&mut self, sink: FaultSink) {
        // Held for interface parity; nokhwa backends report errors only on
        // the calls that triggered them.
        self.fault_sink = Some(sink);
    }

    fn bind_texture(&mut self, surface: &TextureSurface) -> Result<(), DeviceError> {
        log::debug!(
            "device {}: texture surface {} recorded (no native compositor path)",
            self.descriptor.index,
            surface.texture_id
        );
        Ok(())
    }

    fn bind_window(&mut self, surface: &WindowSurface) -> Result<(), DeviceError> {
        log::debug!(
            "device {}: window surface {} recorded (no native compositor path)",
            self.descriptor.index,
            surface.window_id
        );
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), DeviceError> {
        let mut camera = self.camera.lock().expect("lock poisoned");
        camera
            .open_stream()
            .map_err(|e| DeviceError::OpenFailed(format!("failed to start stream: {}", e)))
    }

    fn stop_preview(&mut self) -> Result<(), DeviceError> {
        let mut camera = self.camera.lock().expect("lock poisoned");
        camera
            .stop_stream()
            .map_err(|e| DeviceError::OpenFailed(format!("failed to stop stream: {}", e)))
    }

    fn set_rotation(&mut self, degrees: i32) -> Result<(), DeviceError> {
        // Desktop backends have no display rotation; accept and record.
        log::debug!("device {}: rotation {} recorded", self.descriptor.index, degrees);
        Ok(())
    }

    fn take_picture(&mut self, on_complete: CaptureCallback) -> Result<(), DeviceError> {
        let camera = Arc::clone(&self.camera);
        let index = self.descriptor.index;

        thread::spawn(move || {
            let frame = {
                let mut camera = camera.lock().expect("lock poisoned");
                camera.poll_frame()
            };

            match frame.and_then(|f| f.decode_image::<RgbFormat>()) {
                Ok(decoded) => {
                    // nokhwa carries its own image version; rebuild the
                    // buffer from raw bytes before encoding.
                    let (width, height) = decoded.dimensions();
                    let img = match image::RgbImage::from_vec(width, height, decoded.into_raw()) {
                        Some(img) => image::DynamicImage::ImageRgb8(img),
                        None => {
                            log::error!("device {}: frame buffer size mismatch", index);
                            return;
                        }
                    };

                    let mut bytes = Vec::new();
                    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                        Cursor::new(&mut bytes),
                        90,
                    );
                    if img.write_with_encoder(encoder).is_ok() {
                        on_complete(bytes);
                    } else {
                        // Dropping the callback abandons the capture; the
                        // session reports it as a failed capture.
                        log::error!("device {}: failed to encode still frame", index);
                    }
                }
                Err(e) => {
                    log::error!("device {}: still capture failed: {}", index, e);
                }
            }
        });

        Ok(())
    }

    fn release(&mut self) {
        let mut camera = self.camera.lock().expect("lock poisoned");
        if let Err(e) = camera.stop_stream() {
            log::debug!("device {}: stream already stopped: {}", self.descriptor.index, e);
        }
        log::info!("released native device {}", self.descriptor.index);
    }
}
