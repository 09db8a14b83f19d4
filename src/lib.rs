//! camsession: camera device session management
//!
//! This crate owns the lifecycle of one opened camera device and serializes
//! the operations a caller may issue against it: open by lens position, bind
//! a display surface, start/stop preview, set display orientation, capture a
//! still image, close.
//!
//! # Features
//! - Typed session state machine (closed / open / previewing)
//! - Facing-based device selection with the documented index-0 fallback
//! - Blocking still capture fed by the driver's completion callback
//! - Asynchronous hardware faults surfaced as typed errors with the
//!   diagnostic context of the last state transition
//! - Pluggable platform boundary with a synthetic driver for offline tests
//!
//! # Usage
//! ```rust
//! use camsession::testing::SyntheticDriver;
//! use camsession::{CameraSession, LensPosition, SessionConfig};
//!
//! let driver = SyntheticDriver::with_back_and_front();
//! let mut session = CameraSession::new(Box::new(driver), SessionConfig::default());
//!
//! session.open(LensPosition::Back).unwrap();
//! session.start_preview().unwrap();
//! let photo = session.capture().unwrap();
//! assert!(!photo.is_empty());
//! session.close();
//! ```
pub mod config;
pub mod driver;
pub mod errors;
pub mod orientation;
pub mod platform;
pub mod session;
pub mod testing;
pub mod types;

// Re-exports for convenience
pub use config::SessionConfig;
pub use driver::{CaptureCallback, DeviceHandle, FaultSink, PlatformDriver};
pub use errors::DeviceError;
pub use session::CameraSession;
pub use types::{
    Capabilities, DeviceDescriptor, DiagnosticContext, DisplaySurface, Facing, LensPosition,
    Parameters, Photo, SessionState, SurfaceKind, TextureSurface, WindowSurface,
};

#[cfg(feature = "native")]
pub use platform::NativeDriver;

/// Initialize logging for the session layer
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "camsession=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
