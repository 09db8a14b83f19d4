//! Core types shared across the session and driver layers.

use crate::errors::DeviceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::fs::File;
use std::path::Path;
use uuid::Uuid;

/// Lens position requested by the caller when opening a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LensPosition {
    Front,
    Back,
    /// Externally attached camera. No platform facing equivalent exists, so
    /// opening with this position fails with
    /// [`DeviceError::UnsupportedLensPosition`].
    External,
}

impl LensPosition {
    /// Platform facing for this lens position, if one exists.
    pub fn facing(&self) -> Option<Facing> {
        match self {
            LensPosition::Front => Some(Facing::Front),
            LensPosition::Back => Some(Facing::Back),
            LensPosition::External => None,
        }
    }
}

/// Physical direction a camera device points, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Front,
    Back,
}

/// One entry of the platform's ordered device enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub index: u32,
    pub facing: Facing,
    pub name: String,
}

impl DeviceDescriptor {
    pub fn new(index: u32, facing: Facing, name: impl Into<String>) -> Self {
        Self {
            index,
            facing,
            name: name.into(),
        }
    }
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open,
    Previewing,
}

/// Records which operation most recently transitioned session state.
///
/// Attached to [`DeviceError::HardwareFault`] so an asynchronous fault can be
/// traced back to the call that put the session in its current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticContext {
    pub session_id: Uuid,
    pub operation: String,
    pub at: DateTime<Utc>,
}

impl DiagnosticContext {
    pub fn new(session_id: Uuid, operation: &str) -> Self {
        Self {
            session_id,
            operation: operation.to_string(),
            at: Utc::now(),
        }
    }
}

impl fmt::Display for DiagnosticContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (session {}, {})",
            self.operation,
            self.session_id,
            self.at.to_rfc3339()
        )
    }
}

/// Which kind of display target a session currently directs preview to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceKind {
    Texture,
    Window,
}

/// A display target able to receive preview frames.
///
/// Only [`TextureSurface`] and [`WindowSurface`] are accepted by the device;
/// the session rejects any other implementor with
/// [`DeviceError::UnsupportedSurface`].
pub trait DisplaySurface: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// Short human-readable description, used in error messages.
    fn describe(&self) -> String;
}

/// Texture-backed display target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSurface {
    pub texture_id: u64,
}

impl TextureSurface {
    pub fn new(texture_id: u64) -> Self {
        Self { texture_id }
    }
}

impl DisplaySurface for TextureSurface {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn describe(&self) -> String {
        format!("texture:{}", self.texture_id)
    }
}

/// Window-backed display target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSurface {
    pub window_id: u64,
}

impl WindowSurface {
    pub fn new(window_id: u64) -> Self {
        Self { window_id }
    }
}

impl DisplaySurface for WindowSurface {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn describe(&self) -> String {
        format!("window:{}", self.window_id)
    }
}

/// A captured still image.
///
/// `data` holds the encoded image bytes exactly as delivered by the driver's
/// completion callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub data: Vec<u8>,
    /// Display rotation in effect when the capture was requested.
    pub rotation_degrees: i32,
    pub device_index: u32,
    pub captured_at: DateTime<Utc>,
}

impl Photo {
    pub fn new(data: Vec<u8>, device_index: u32) -> Self {
        Self {
            data,
            rotation_degrees: 0,
            device_index,
            captured_at: Utc::now(),
        }
    }

    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decode the encoded bytes into a pixel image.
    pub fn decode(&self) -> Result<image::DynamicImage, DeviceError> {
        image::load_from_memory(&self.data)
            .map_err(|e| DeviceError::CaptureFailed(format!("failed to decode photo: {}", e)))
    }

    /// Write the encoded bytes to disk unchanged.
    pub fn save_to_disk(&self, path: &Path) -> Result<(), DeviceError> {
        std::fs::write(path, &self.data)
            .map_err(|e| DeviceError::CaptureFailed(format!("failed to save photo: {}", e)))?;
        log::info!("photo saved to {}", path.display());
        Ok(())
    }

    /// Re-encode as JPEG at the given quality and write to disk.
    pub fn save_compressed(&self, path: &Path, quality: u8) -> Result<(), DeviceError> {
        let decoded = self.decode()?;
        let mut file = File::create(path)
            .map_err(|e| DeviceError::CaptureFailed(format!("failed to create {}: {}", path.display(), e)))?;
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut file, quality);
        decoded
            .write_with_encoder(encoder)
            .map_err(|e| DeviceError::CaptureFailed(format!("failed to encode photo: {}", e)))?;
        log::info!("compressed photo saved to {}", path.display());
        Ok(())
    }
}

/// Device parameter set. Parameter application is not implemented yet;
/// [`crate::session::CameraSession::update_parameters`] returns
/// [`DeviceError::Unsupported`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub preview_fps: Option<f32>,
    pub picture_resolution: Option<[u32; 2]>,
}

/// Device capability report. Capability queries are not implemented yet;
/// [`crate::session::CameraSession::capabilities`] returns
/// [`DeviceError::Unsupported`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    pub picture_resolutions: Vec<[u32; 2]>,
    pub preview_fps_ranges: Vec<[f32; 2]>,
}
