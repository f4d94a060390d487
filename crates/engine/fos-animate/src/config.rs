//! Animation subsystem configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AnimateError;

/// Built-in drivers, tried in the configured order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Registered script animations
    Script,
    /// Native transitions / keyframes through class and style toggling
    Css,
}

/// Animation configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimateConfig {
    /// Master switch; disabled queues resolve every request immediately
    pub enabled: bool,

    /// Prefix of generated classes (`<prefix>-enter`, `<prefix>-animate`, ...)
    pub class_prefix: String,

    /// Frame interval used when the host has no frame callback primitive
    pub fallback_frame_interval_ms: u64,

    /// Driver order for dispatch
    pub drivers: Vec<DriverKind>,
}

impl Default for AnimateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            class_prefix: "fos".to_string(),
            fallback_frame_interval_ms: 16,
            drivers: vec![DriverKind::Script, DriverKind::Css],
        }
    }
}

impl AnimateConfig {
    pub fn validate(&self) -> Result<(), AnimateError> {
        if self.fallback_frame_interval_ms == 0 {
            return Err(AnimateError::InvalidConfig(
                "fallback_frame_interval_ms must be positive".to_string(),
            ));
        }
        if self.class_prefix.is_empty() || self.class_prefix.contains(char::is_whitespace) {
            return Err(AnimateError::InvalidConfig(format!(
                "class_prefix '{}' is not a class token",
                self.class_prefix
            )));
        }
        Ok(())
    }

    pub fn fallback_frame_interval(&self) -> Duration {
        Duration::from_millis(self.fallback_frame_interval_ms)
    }

    /// `<prefix>-<suffix>`
    pub fn class_name(&self, suffix: &str) -> String {
        format!("{}-{}", self.class_prefix, suffix)
    }

    /// Attribute marking shared-element anchors
    pub fn anchor_ref_attribute(&self) -> String {
        self.class_name("animate-ref")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AnimateConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.class_name("enter"), "fos-enter");
        assert_eq!(config.fallback_frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let config = AnimateConfig { fallback_frame_interval_ms: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(AnimateError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_prefix() {
        let config = AnimateConfig { class_prefix: "my app".to_string(), ..Default::default() };
        assert!(config.validate().is_err());
    }
}
