#[cfg(test)]
mod capture_tests {
    use camsession::testing::{CaptureMode, SyntheticDriver};
    use camsession::{CameraSession, DeviceError, LensPosition, SessionConfig};

    #[test]
    fn test_capture_returns_encoded_bytes() {
        let driver = SyntheticDriver::with_back_and_front();
        let mut session = CameraSession::new(Box::new(driver), SessionConfig::default());

        session.open(LensPosition::Back).unwrap();
        let photo = session.capture().unwrap();

        assert!(!photo.is_empty());
        assert_eq!(photo.device_index, 0);

        let decoded = session.capture().unwrap().decode().unwrap();
        assert_eq!(decoded.width(), 64);
        assert_eq!(decoded.height(), 48);
    }

    #[test]
    fn test_capture_stamps_current_rotation() {
        let driver = SyntheticDriver::with_back_and_front();
        let mut session = CameraSession::new(Box::new(driver), SessionConfig::default());

        session.open(LensPosition::Back).unwrap();
        session.set_orientation(93).unwrap();
        let photo = session.capture().unwrap();

        assert_eq!(photo.rotation_degrees, 90);
    }

    #[test]
    fn test_capture_waits_for_delayed_completion() {
        let driver =
            SyntheticDriver::with_back_and_front().capture_mode(CaptureMode::Delayed(50));
        let mut session = CameraSession::new(Box::new(driver), SessionConfig::default());

        session.open(LensPosition::Back).unwrap();
        let photo = session.capture().unwrap();

        assert!(!photo.is_empty());
    }

    #[test]
    fn test_cancelled_capture_is_an_error_not_empty_success() {
        // An abandoned completion callback must surface as a typed error,
        // never as success-shaped empty data.
        let driver = SyntheticDriver::with_back_and_front().capture_mode(CaptureMode::Cancel);
        let mut session = CameraSession::new(Box::new(driver), SessionConfig::default());

        session.open(LensPosition::Back).unwrap();
        let result = session.capture();

        assert!(matches!(result, Err(DeviceError::CaptureFailed(_))));
    }

    #[test]
    fn test_capture_times_out_when_bounded() {
        let driver =
            SyntheticDriver::with_back_and_front().capture_mode(CaptureMode::Delayed(500));
        let mut config = SessionConfig::default();
        config.capture.timeout_ms = Some(50);
        let mut session = CameraSession::new(Box::new(driver), config);

        session.open(LensPosition::Back).unwrap();
        let result = session.capture();

        assert!(matches!(result, Err(DeviceError::CaptureTimeout(_))));
    }

    #[test]
    fn test_bounded_capture_completes_within_timeout() {
        let driver = SyntheticDriver::with_back_and_front().capture_mode(CaptureMode::Delayed(10));
        let mut config = SessionConfig::default();
        config.capture.timeout_ms = Some(5_000);
        let mut session = CameraSession::new(Box::new(driver), config);

        session.open(LensPosition::Back).unwrap();
        let photo = session.capture().unwrap();

        assert!(!photo.is_empty());
    }

    #[test]
    fn test_capture_requires_open_session() {
        let driver = SyntheticDriver::with_back_and_front();
        let mut session = CameraSession::new(Box::new(driver), SessionConfig::default());

        let result = session.capture();

        assert!(matches!(result, Err(DeviceError::SessionClosed(_))));
    }
}
