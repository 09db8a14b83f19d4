//! Synthetic driver for offline testing
//!
//! Implements the [`PlatformDriver`] boundary entirely in memory: a
//! scriptable device table, deterministic capture bytes, and injectable
//! hardware faults delivered from a spawned thread, the way a real driver
//! delivers them off the caller's thread.

use crate::driver::{CaptureCallback, DeviceHandle, FaultSink, PlatformDriver};
use crate::errors::DeviceError;
use crate::types::{DeviceDescriptor, Facing, TextureSurface, WindowSurface};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How a synthetic device answers a still-capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Deliver synthetic bytes from a driver thread.
    Complete,
    /// Deliver synthetic bytes after the given delay in milliseconds.
    Delayed(u64),
    /// Drop the completion callback without invoking it, abandoning the
    /// capture the way a cancelled platform request does.
    Cancel,
}

/// Inspectable record of every driver call a session made.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    pub enumerations: u32,
    pub acquired: Vec<u32>,
    pub rotations: Vec<i32>,
    pub preview_starts: u32,
    pub preview_stops: u32,
    pub releases: u32,
    pub bound_textures: Vec<u64>,
    pub bound_windows: Vec<u64>,
}

struct Shared {
    log: Mutex<CallLog>,
    fault_sink: Mutex<Option<FaultSink>>,
}

/// Test-side handle to a [`SyntheticDriver`] that has been handed to a
/// session. Lets tests inspect driver calls and inject hardware faults after
/// the session has taken ownership of the driver.
#[derive(Clone)]
pub struct SyntheticController {
    shared: Arc<Shared>,
}

impl SyntheticController {
    /// Snapshot of the call log.
    pub fn log(&self) -> CallLog {
        self.shared.log.lock().expect("lock poisoned").clone()
    }

    /// Fire the registered fault sink with `code` from a driver thread. The
    /// thread is joined before returning so tests observe the fault
    /// deterministically.
    pub fn inject_fault(&self, code: i32) {
        let sink = self
            .shared
            .fault_sink
            .lock()
            .expect("lock poisoned")
            .clone();

        if let Some(sink) = sink {
            thread::spawn(move || (sink)(code))
                .join()
                .expect("fault delivery thread panicked");
        }
    }

    /// Whether a session registered a fault sink with the acquired device.
    pub fn has_fault_sink(&self) -> bool {
        self.shared
            .fault_sink
            .lock()
            .expect("lock poisoned")
            .is_some()
    }
}

/// In-memory [`PlatformDriver`] with a scriptable device table.
pub struct SyntheticDriver {
    devices: Vec<DeviceDescriptor>,
    deny_acquire: bool,
    capture_mode: CaptureMode,
    shared: Arc<Shared>,
}

impl SyntheticDriver {
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        Self {
            devices,
            deny_acquire: false,
            capture_mode: CaptureMode::Complete,
            shared: Arc::new(Shared {
                log: Mutex::new(CallLog::default()),
                fault_sink: Mutex::new(None),
            }),
        }
    }

    /// Convenience table: a back camera at index 0 and a front camera at
    /// index 1, mirroring the common phone layout.
    pub fn with_back_and_front() -> Self {
        Self::new(vec![
            DeviceDescriptor::new(0, Facing::Back, "synthetic back"),
            DeviceDescriptor::new(1, Facing::Front, "synthetic front"),
        ])
    }

    /// Make every acquisition fail, simulating a device claimed elsewhere.
    pub fn deny_acquire(mut self) -> Self {
        self.deny_acquire = true;
        self
    }

    pub fn capture_mode(mut self, mode: CaptureMode) -> Self {
        self.capture_mode = mode;
        self
    }

    /// Controller for inspecting calls and injecting faults after the driver
    /// has been boxed into a session.
    pub fn controller(&self) -> SyntheticController {
        SyntheticController {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl PlatformDriver for SyntheticDriver {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, DeviceError> {
        self.shared.log.lock().expect("lock poisoned").enumerations += 1;
        Ok(self.devices.clone())
    }

    fn acquire(&mut self, index: u32) -> Result<Box<dyn DeviceHandle>, DeviceError> {
        if self.deny_acquire {
            return Err(DeviceError::OpenFailed(format!(
                "device {} claim denied",
                index
            )));
        }

        let descriptor = self
            .devices
            .iter()
            .find(|device| device.index == index)
            .cloned()
            .ok_or_else(|| DeviceError::OpenFailed(format!("no device at index {}", index)))?;

        self.shared
            .log
            .lock()
            .expect("lock poisoned")
            .acquired
            .push(index);

        Ok(Box::new(SyntheticHandle {
            descriptor,
            capture_mode: self.capture_mode,
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct SyntheticHandle {
    descriptor: DeviceDescriptor,
    capture_mode: CaptureMode,
    shared: Arc<Shared>,
}

impl DeviceHandle for SyntheticHandle {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn set_fault_sink(&mut self, sink: FaultSink) {
        *self.shared.fault_sink.lock().expect("lock poisoned") = Some(sink);
    }

    fn bind_texture(&mut self, surface: &TextureSurface) -> Result<(), DeviceError> {
        self.shared
            .log
            .lock()
            .expect("lock poisoned")
            .bound_textures
            .push(surface.texture_id);
        Ok(())
    }

    fn bind_window(&mut self, surface: &WindowSurface) -> Result<(), DeviceError> {
        self.shared
            .log
            .lock()
            .expect("lock poisoned")
            .bound_windows
            .push(surface.window_id);
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), DeviceError> {
        self.shared.log.lock().expect("lock poisoned").preview_starts += 1;
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), DeviceError> {
        self.shared.log.lock().expect("lock poisoned").preview_stops += 1;
        Ok(())
    }

    fn set_rotation(&mut self, degrees: i32) -> Result<(), DeviceError> {
        // The platform rejects anything that is not a right angle.
        if degrees % 90 != 0 || !(0..360).contains(&degrees) {
            return Err(DeviceError::Unsupported(format!(
                "rotation {} is not a right angle",
                degrees
            )));
        }
        self.shared
            .log
            .lock()
            .expect("lock poisoned")
            .rotations
            .push(degrees);
        Ok(())
    }

    fn take_picture(&mut self, on_complete: CaptureCallback) -> Result<(), DeviceError> {
        let mode = self.capture_mode;
        let index = self.descriptor.index;

        thread::spawn(move || match mode {
            CaptureMode::Complete => {
                on_complete(synthetic_photo_bytes(64, 48, index as u64));
            }
            CaptureMode::Delayed(delay_ms) => {
                thread::sleep(Duration::from_millis(delay_ms));
                on_complete(synthetic_photo_bytes(64, 48, index as u64));
            }
            CaptureMode::Cancel => {
                drop(on_complete);
            }
        });

        Ok(())
    }

    fn release(&mut self) {
        self.shared.log.lock().expect("lock poisoned").releases += 1;
    }
}

/// JPEG-encoded gradient frame with content varying by `seed`.
pub fn synthetic_photo_bytes(width: u32, height: u32, seed: u64) -> Vec<u8> {
    let mut data = vec![0u8; (width * height * 3) as usize];

    let base = (seed % 256) as u8;
    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 3) as usize;
            data[idx] = base.wrapping_add((x % 256) as u8);
            data[idx + 1] = base.wrapping_add((y % 256) as u8);
            data[idx + 2] = base.wrapping_add(((x + y) % 256) as u8);
        }
    }

    let img = image::RgbImage::from_vec(width, height, data).expect("buffer sized to dimensions");
    let mut bytes = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut bytes), 90);
    image::DynamicImage::ImageRgb8(img)
        .write_with_encoder(encoder)
        .expect("in-memory jpeg encode");
    bytes
}
