//! Camera session lifecycle.
//!
//! [`CameraSession`] owns one claimed camera device and serializes the
//! operations a caller may issue against it: open, bind a display surface,
//! start/stop preview, set display orientation, single-shot still capture,
//! close. The session is single-threaded from the caller's point of view;
//! the driver delivers capture completion and hardware faults on its own
//! threads, and the session bridges those back through channels. Concurrent
//! calls against one session from multiple caller threads are not supported.

use crate::config::SessionConfig;
use crate::driver::{DeviceHandle, FaultSink, PlatformDriver};
use crate::errors::DeviceError;
use crate::orientation::closest_right_angle;
use crate::types::{
    Capabilities, DiagnosticContext, DisplaySurface, LensPosition, Parameters, Photo,
    SessionState, SurfaceKind, TextureSurface, WindowSurface,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Fault notifications shared between the session and the driver's callback
/// thread.
struct FaultState {
    pending: Mutex<VecDeque<DeviceError>>,
    tripped: AtomicBool,
    capacity: usize,
}

impl FaultState {
    fn new(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            tripped: AtomicBool::new(false),
            capacity: capacity.max(1),
        }
    }

    fn push(&self, fault: DeviceError) {
        let mut pending = self.pending.lock().expect("lock poisoned");
        if pending.len() >= self.capacity {
            pending.pop_front();
        }
        pending.push_back(fault);
        self.tripped.store(true, Ordering::Release);
    }

    fn pop(&self) -> Option<DeviceError> {
        self.pending.lock().expect("lock poisoned").pop_front()
    }

    /// Consume the tripped flag. Returns true at most once per fault burst,
    /// so a later re-open is not torn down by an already-serviced fault.
    fn take_tripped(&self) -> bool {
        self.tripped.swap(false, Ordering::AcqRel)
    }
}

/// Owns the lifecycle of one opened camera device.
pub struct CameraSession {
    id: Uuid,
    config: SessionConfig,
    driver: Box<dyn PlatformDriver>,
    handle: Option<Box<dyn DeviceHandle>>,
    lens_position: Option<LensPosition>,
    bound_surface: Option<SurfaceKind>,
    rotation_degrees: i32,
    state: SessionState,
    last_transition: Arc<Mutex<Option<DiagnosticContext>>>,
    faults: Arc<FaultState>,
}

impl CameraSession {
    pub fn new(driver: Box<dyn PlatformDriver>, config: SessionConfig) -> Self {
        let fault_capacity = config.faults.queue_capacity;
        Self {
            id: Uuid::new_v4(),
            config,
            driver,
            handle: None,
            lens_position: None,
            bound_surface: None,
            rotation_degrees: 0,
            state: SessionState::Closed,
            last_transition: Arc::new(Mutex::new(None)),
            faults: Arc::new(FaultState::new(fault_capacity)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Lens position selected at open time. Retained across close.
    pub fn lens_position(&self) -> Option<LensPosition> {
        self.lens_position
    }

    /// Kind of the currently bound display surface, if any.
    pub fn bound_surface(&self) -> Option<SurfaceKind> {
        self.bound_surface
    }

    /// Enumerate devices, select the first whose facing matches
    /// `lens_position`, and claim it.
    ///
    /// When no device reports the requested facing, device index 0 is claimed
    /// instead. The fallback is a long-standing compatibility quirk, not
    /// device preference logic.
    pub fn open(&mut self, lens_position: LensPosition) -> Result<(), DeviceError> {
        self.service_faults();

        let facing = lens_position.facing().ok_or_else(|| {
            DeviceError::UnsupportedLensPosition(format!(
                "{:?} cannot be mapped to a platform facing",
                lens_position
            ))
        })?;

        if self.handle.is_some() {
            return Err(DeviceError::OpenFailed(
                "session already holds an open device; close it first".to_string(),
            ));
        }

        let devices = self.driver.enumerate()?;
        let index = devices
            .iter()
            .find(|device| device.facing == facing)
            .map(|device| device.index)
            .unwrap_or(0);

        let mut handle = self.driver.acquire(index)?;
        self.record_transition("open");
        handle.set_fault_sink(self.fault_sink());

        log::info!(
            "session {}: opened device {} ({:?})",
            self.id,
            index,
            lens_position
        );

        self.handle = Some(handle);
        self.lens_position = Some(lens_position);
        self.state = SessionState::Open;
        Ok(())
    }

    /// Direct preview frames to `surface` once previewing starts.
    ///
    /// Only texture-backed and window-backed targets are accepted; anything
    /// else fails with [`DeviceError::UnsupportedSurface`] and leaves session
    /// state unchanged.
    pub fn bind_surface(&mut self, surface: &dyn DisplaySurface) -> Result<(), DeviceError> {
        self.service_faults();

        // Kind check comes before the handle check so a foreign surface is
        // reported as unsupported even on a closed session.
        let any = surface.as_any();
        if let Some(texture) = any.downcast_ref::<TextureSurface>() {
            let handle = self.ensure_handle("bind_surface")?;
            handle.bind_texture(texture)?;
            self.bound_surface = Some(SurfaceKind::Texture);
        } else if let Some(window) = any.downcast_ref::<WindowSurface>() {
            let handle = self.ensure_handle("bind_surface")?;
            handle.bind_window(window)?;
            self.bound_surface = Some(SurfaceKind::Window);
        } else {
            return Err(DeviceError::UnsupportedSurface(surface.describe()));
        }

        log::debug!(
            "session {}: bound display surface {}",
            self.id,
            surface.describe()
        );
        Ok(())
    }

    /// Begin streaming preview frames to the bound surface.
    ///
    /// Permissive by default: a redundant start while already previewing is
    /// forwarded to the driver unchanged. Enable
    /// `preview.strict_state_guards` to reject it instead.
    pub fn start_preview(&mut self) -> Result<(), DeviceError> {
        self.service_faults();

        if self.config.preview.strict_state_guards && self.state == SessionState::Previewing {
            return Err(DeviceError::InvalidState(
                "preview already started".to_string(),
            ));
        }

        let handle = self.ensure_handle("start_preview")?;
        handle.start_preview()?;
        self.record_transition("start_preview");
        self.state = SessionState::Previewing;
        log::debug!("session {}: preview started", self.id);
        Ok(())
    }

    /// Stop streaming preview frames.
    ///
    /// Permissive by default, like [`CameraSession::start_preview`].
    pub fn stop_preview(&mut self) -> Result<(), DeviceError> {
        self.service_faults();

        if self.config.preview.strict_state_guards && self.state != SessionState::Previewing {
            return Err(DeviceError::InvalidState("preview not started".to_string()));
        }

        let handle = self.ensure_handle("stop_preview")?;
        handle.stop_preview()?;
        self.record_transition("stop_preview");
        self.state = SessionState::Open;
        log::debug!("session {}: preview stopped", self.id);
        Ok(())
    }

    /// Apply a display rotation, rounding `degrees` to the closest right
    /// angle first. The platform accepts only right-angle values.
    pub fn set_orientation(&mut self, degrees: i32) -> Result<(), DeviceError> {
        self.service_faults();

        let right_angle = closest_right_angle(degrees);
        let handle = self.ensure_handle("set_orientation")?;
        handle.set_rotation(right_angle)?;
        self.rotation_degrees = right_angle;
        log::debug!(
            "session {}: display rotation {} rounded to {}",
            self.id,
            degrees,
            right_angle
        );
        Ok(())
    }

    /// Parameter application is not implemented. Callers get a typed error
    /// instead of a silent no-op.
    pub fn update_parameters(&mut self, _parameters: &Parameters) -> Result<(), DeviceError> {
        self.service_faults();
        Err(DeviceError::Unsupported(
            "parameter update is not implemented".to_string(),
        ))
    }

    /// Capability queries are not implemented. Callers get a typed error
    /// instead of a null report.
    pub fn capabilities(&mut self) -> Result<Capabilities, DeviceError> {
        self.service_faults();
        Err(DeviceError::Unsupported(
            "capability query is not implemented".to_string(),
        ))
    }

    /// Request a single still capture and block until the driver's completion
    /// callback delivers the encoded bytes.
    ///
    /// With no `capture.timeout_ms` configured the wait is unbounded and an
    /// unresponsive device hangs the caller. A dropped completion callback
    /// (cancelled capture) surfaces as [`DeviceError::CaptureFailed`] rather
    /// than an empty success.
    pub fn capture(&mut self) -> Result<Photo, DeviceError> {
        self.service_faults();

        let timeout = self.config.capture_timeout();
        let rotation_degrees = self.rotation_degrees;
        let handle = self.ensure_handle("capture")?;
        let device_index = handle.descriptor().index;

        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        handle.take_picture(Box::new(move |bytes| {
            // The receiver may have given up on a bounded wait; nothing to
            // do in that case.
            let _ = tx.send(bytes);
        }))?;

        let bytes = match timeout {
            None => rx.recv().map_err(|_| {
                DeviceError::CaptureFailed(
                    "capture abandoned: completion callback dropped without a result".to_string(),
                )
            })?,
            Some(limit) => match rx.recv_timeout(limit) {
                Ok(bytes) => bytes,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(DeviceError::CaptureTimeout(format!(
                        "no completion within {}ms",
                        limit.as_millis()
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(DeviceError::CaptureFailed(
                        "capture abandoned: completion callback dropped without a result"
                            .to_string(),
                    ));
                }
            },
        };

        log::info!(
            "session {}: captured {} bytes from device {}",
            self.id,
            bytes.len(),
            device_index
        );
        Ok(Photo::new(bytes, device_index).with_rotation(rotation_degrees))
    }

    /// Drain the next undelivered hardware fault, if any. Servicing a fault
    /// also forces the session to `Closed`.
    pub fn take_fault(&mut self) -> Option<DeviceError> {
        self.service_faults();
        self.faults.pop()
    }

    /// Release the device if one is held. Idempotent; never fails.
    pub fn close(&mut self) {
        self.service_faults();
        self.record_transition("close");

        if let Some(mut handle) = self.handle.take() {
            handle.release();
            log::info!("session {}: device released", self.id);
        }

        self.bound_surface = None;
        self.state = SessionState::Closed;
    }

    /// Tear the session down if the driver reported a hardware fault since
    /// the last call. The fault itself stays queued for [`take_fault`].
    ///
    /// [`take_fault`]: CameraSession::take_fault
    fn service_faults(&mut self) {
        if !self.faults.take_tripped() || self.state == SessionState::Closed {
            return;
        }

        log::warn!(
            "session {}: hardware fault reported, forcing session closed",
            self.id
        );

        if let Some(mut handle) = self.handle.take() {
            handle.release();
        }
        self.bound_surface = None;
        self.state = SessionState::Closed;
    }

    fn ensure_handle(&mut self, operation: &str) -> Result<&mut Box<dyn DeviceHandle>, DeviceError> {
        match self.handle.as_mut() {
            Some(handle) => Ok(handle),
            None => Err(DeviceError::SessionClosed(format!(
                "{} requires an open device",
                operation
            ))),
        }
    }

    fn record_transition(&self, operation: &str) {
        let context = DiagnosticContext::new(self.id, operation);
        *self.last_transition.lock().expect("lock poisoned") = Some(context);
    }

    /// Build the sink handed to the driver. Runs on the driver's callback
    /// thread, so it only touches the shared fault state and the transition
    /// slot.
    fn fault_sink(&self) -> FaultSink {
        let faults = Arc::clone(&self.faults);
        let last_transition = Arc::clone(&self.last_transition);
        let session_id = self.id;

        Arc::new(move |code: i32| {
            let context = last_transition
                .lock()
                .expect("lock poisoned")
                .clone()
                .unwrap_or_else(|| DiagnosticContext::new(session_id, "unknown"));

            log::error!(
                "session {}: hardware fault code {} after {}",
                session_id,
                code,
                context
            );
            faults.push(DeviceError::HardwareFault { code, context });
        })
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.close();
        // Diagnostic context is only meaningful while the session exists.
        *self.last_transition.lock().expect("lock poisoned") = None;
    }
}
