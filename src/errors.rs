use crate::types::DiagnosticContext;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    OpenFailed(String),
    UnsupportedLensPosition(String),
    UnsupportedSurface(String),
    Unsupported(String),
    SessionClosed(String),
    InvalidState(String),
    CaptureFailed(String),
    CaptureTimeout(String),
    ConfigError(String),
    HardwareFault {
        code: i32,
        context: DiagnosticContext,
    },
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeviceError::OpenFailed(msg) => write!(f, "Device open error: {}", msg),
            DeviceError::UnsupportedLensPosition(msg) => {
                write!(f, "Unsupported lens position: {}", msg)
            }
            DeviceError::UnsupportedSurface(msg) => {
                write!(f, "Unsupported display surface: {}", msg)
            }
            DeviceError::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
            DeviceError::SessionClosed(msg) => write!(f, "Session closed: {}", msg),
            DeviceError::InvalidState(msg) => write!(f, "Invalid session state: {}", msg),
            DeviceError::CaptureFailed(msg) => write!(f, "Capture error: {}", msg),
            DeviceError::CaptureTimeout(msg) => write!(f, "Capture timeout: {}", msg),
            DeviceError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            DeviceError::HardwareFault { code, context } => {
                write!(f, "Hardware fault (code {}) after {}", code, context)
            }
        }
    }
}

impl std::error::Error for DeviceError {}

impl DeviceError {
    /// Whether the error ends the session. Hardware faults release the device
    /// and force the session to `Closed`.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DeviceError::HardwareFault { .. })
    }
}
