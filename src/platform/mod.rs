//! Platform driver implementations.
//!
//! The synthetic driver in [`crate::testing`] covers offline use. The
//! `native` feature adds a nokhwa-backed driver for real hardware.

#[cfg(feature = "native")]
pub mod native;

#[cfg(feature = "native")]
pub use native::NativeDriver;
