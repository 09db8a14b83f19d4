#[cfg(test)]
mod fault_tests {
    use camsession::testing::SyntheticDriver;
    use camsession::{CameraSession, DeviceError, LensPosition, SessionConfig, SessionState};

    #[test]
    fn test_fault_sink_registered_on_open() {
        let driver = SyntheticDriver::with_back_and_front();
        let controller = driver.controller();
        let mut session = CameraSession::new(Box::new(driver), SessionConfig::default());

        assert!(!controller.has_fault_sink());
        session.open(LensPosition::Back).unwrap();
        assert!(controller.has_fault_sink());
    }

    #[test]
    fn test_fault_forces_session_closed() {
        let driver = SyntheticDriver::with_back_and_front();
        let controller = driver.controller();
        let mut session = CameraSession::new(Box::new(driver), SessionConfig::default());

        session.open(LensPosition::Back).unwrap();
        session.start_preview().unwrap();
        controller.inject_fault(100);

        // The next operation observes the fault instead of running against a
        // released handle.
        let result = session.start_preview();
        assert!(matches!(result, Err(DeviceError::SessionClosed(_))));
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(controller.log().releases, 1);
    }

    #[test]
    fn test_fault_carries_last_transition_context() {
        let driver = SyntheticDriver::with_back_and_front();
        let controller = driver.controller();
        let mut session = CameraSession::new(Box::new(driver), SessionConfig::default());

        session.open(LensPosition::Back).unwrap();
        session.start_preview().unwrap();
        controller.inject_fault(3);

        match session.take_fault() {
            Some(DeviceError::HardwareFault { code, context }) => {
                assert_eq!(code, 3);
                assert_eq!(context.operation, "start_preview");
                assert_eq!(context.session_id, session.id());
            }
            other => panic!("expected a hardware fault, got {:?}", other),
        }
    }

    #[test]
    fn test_fault_right_after_open_names_open() {
        let driver = SyntheticDriver::with_back_and_front();
        let controller = driver.controller();
        let mut session = CameraSession::new(Box::new(driver), SessionConfig::default());

        session.open(LensPosition::Back).unwrap();
        controller.inject_fault(1);

        match session.take_fault() {
            Some(DeviceError::HardwareFault { context, .. }) => {
                assert_eq!(context.operation, "open");
            }
            other => panic!("expected a hardware fault, got {:?}", other),
        }
    }

    #[test]
    fn test_fault_queue_drops_oldest_when_full() {
        let driver = SyntheticDriver::with_back_and_front();
        let controller = driver.controller();
        let mut config = SessionConfig::default();
        config.faults.queue_capacity = 2;
        let mut session = CameraSession::new(Box::new(driver), config);

        session.open(LensPosition::Back).unwrap();
        controller.inject_fault(1);
        controller.inject_fault(2);
        controller.inject_fault(3);

        let codes: Vec<i32> = std::iter::from_fn(|| session.take_fault())
            .map(|fault| match fault {
                DeviceError::HardwareFault { code, .. } => code,
                other => panic!("expected a hardware fault, got {:?}", other),
            })
            .collect();
        assert_eq!(codes, vec![2, 3]);
    }

    #[test]
    fn test_take_fault_is_empty_without_faults() {
        let driver = SyntheticDriver::with_back_and_front();
        let mut session = CameraSession::new(Box::new(driver), SessionConfig::default());

        session.open(LensPosition::Back).unwrap();
        assert!(session.take_fault().is_none());
    }

    #[test]
    fn test_session_can_reopen_after_fault() {
        let driver = SyntheticDriver::with_back_and_front();
        let controller = driver.controller();
        let mut session = CameraSession::new(Box::new(driver), SessionConfig::default());

        session.open(LensPosition::Back).unwrap();
        controller.inject_fault(7);
        assert!(session.take_fault().is_some());
        assert_eq!(session.state(), SessionState::Closed);

        session.open(LensPosition::Front).unwrap();
        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(controller.log().acquired, vec![0, 1]);
    }

    #[test]
    fn test_fault_is_fatal() {
        let driver = SyntheticDriver::with_back_and_front();
        let controller = driver.controller();
        let mut session = CameraSession::new(Box::new(driver), SessionConfig::default());

        session.open(LensPosition::Back).unwrap();
        controller.inject_fault(42);

        let fault = session.take_fault().expect("fault queued");
        assert!(fault.is_fatal());
    }
}
