//! Testing utilities for camsession
//!
//! Provides a synthetic, hardware-free driver implementation so sessions can
//! be exercised offline, plus deterministic image data for capture tests.

pub mod synthetic;

pub use synthetic::{synthetic_photo_bytes, CaptureMode, SyntheticController, SyntheticDriver};
