//! Configuration management for camsession
//!
//! Provides configuration loading, saving, and management for capture wait
//! behavior, preview state handling, and fault delivery.

use crate::errors::DeviceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub capture: CaptureConfig,
    pub preview: PreviewConfig,
    pub faults: FaultConfig,
}

/// Still-capture configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Bounded wait for the capture completion callback, in milliseconds.
    /// `None` waits indefinitely, matching the platform's historical behavior
    /// of hanging on an unresponsive device.
    pub timeout_ms: Option<u64>,
}

/// Preview transition configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Reject preview transitions that repeat the current state instead of
    /// forwarding them to the driver. Off by default: redundant start/stop
    /// calls pass straight through.
    pub strict_state_guards: bool,
}

/// Hardware fault delivery configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultConfig {
    /// Maximum undelivered fault notifications retained per session. The
    /// oldest is dropped when the queue is full.
    pub queue_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig { timeout_ms: None },
            preview: PreviewConfig {
                strict_state_guards: false,
            },
            faults: FaultConfig { queue_capacity: 8 },
        }
    }
}

impl SessionConfig {
    /// Capture wait bound as a `Duration`, if one is configured.
    pub fn capture_timeout(&self) -> Option<Duration> {
        self.capture.timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, DeviceError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            DeviceError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: SessionConfig = toml::from_str(&contents).map_err(|e| {
            DeviceError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DeviceError> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DeviceError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            DeviceError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            DeviceError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("camsession.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if let Some(timeout_ms) = self.capture.timeout_ms {
            if timeout_ms == 0 {
                return Err("Capture timeout must be at least 1ms when set".to_string());
            }
        }

        if self.faults.queue_capacity == 0 || self.faults.queue_capacity > 1024 {
            return Err("Fault queue capacity must be between 1 and 1024".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.capture.timeout_ms, None);
        assert!(!config.preview.strict_state_guards);
        assert_eq!(config.faults.queue_capacity, 8);
    }

    #[test]
    fn test_config_validation() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());

        let mut bad_timeout = config.clone();
        bad_timeout.capture.timeout_ms = Some(0);
        assert!(bad_timeout.validate().is_err());

        let mut bad_capacity = SessionConfig::default();
        bad_capacity.faults.queue_capacity = 0;
        assert!(bad_capacity.validate().is_err());
    }

    #[test]
    fn test_config_toml_format() {
        let config = SessionConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[capture]"));
        assert!(toml_string.contains("[preview]"));
        assert!(toml_string.contains("[faults]"));
        assert!(toml_string.contains("strict_state_guards"));
        assert!(toml_string.contains("queue_capacity"));
    }

    #[test]
    fn test_capture_timeout_conversion() {
        let mut config = SessionConfig::default();
        assert_eq!(config.capture_timeout(), None);

        config.capture.timeout_ms = Some(250);
        assert_eq!(config.capture_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SessionConfig::load_from_file("nonexistent_file.toml");
        assert!(result.is_ok()); // Should return default
        assert_eq!(result.unwrap().faults.queue_capacity, 8);
    }
}
