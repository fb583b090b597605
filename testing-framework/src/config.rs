// File: testing-framework/src/config.rs
//
// Fast-forward configuration, built in code or loaded from YAML.
//
// ```yaml
// submitter: "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
// enactment:
//   after: 1
// verify_events: true
// ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use gov_common::{
    crypto::{AccountId, Hash},
    scheduler::DispatchTime,
};

/// Account submitting proposals and placing decision deposits
pub const DEFAULT_SUBMITTER: AccountId = Hash::new([0xAA; 32]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FastForwardConfig {
    /// Signer of the submission and the decision deposit
    pub submitter: AccountId,
    /// Requested enactment moment of the proposal
    pub enactment: DispatchTime,
    /// Cross-check the approval and enactment through emitted events
    pub verify_events: bool,
}

impl Default for FastForwardConfig {
    fn default() -> Self {
        Self {
            submitter: DEFAULT_SUBMITTER,
            enactment: DispatchTime::After(1),
            verify_events: true,
        }
    }
}

impl FastForwardConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("parsing fast-forward configuration")
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml(&content)
    }

    pub fn with_submitter(mut self, submitter: AccountId) -> Self {
        self.submitter = submitter;
        self
    }

    pub fn with_enactment(mut self, enactment: DispatchTime) -> Self {
        self.enactment = enactment;
        self
    }

    pub fn with_event_checks(mut self, verify_events: bool) -> Self {
        self.verify_events = verify_events;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = FastForwardConfig::from_yaml("verify_events: false\n").unwrap();
        assert!(!config.verify_events);
        assert_eq!(config.submitter, DEFAULT_SUBMITTER);
        assert_eq!(config.enactment, DispatchTime::After(1));
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
submitter: "0x0101010101010101010101010101010101010101010101010101010101010101"
enactment:
  at: 500
verify_events: false
"#;
        let config = FastForwardConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.submitter, Hash::new([1; 32]));
        assert_eq!(config.enactment, DispatchTime::At(500));
        assert!(!config.verify_events);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(FastForwardConfig::from_yaml("enactment: soon").is_err());
    }

    #[test]
    fn test_from_missing_file() {
        let err = FastForwardConfig::from_file("/nonexistent/fast-forward.yaml").unwrap_err();
        assert!(err.to_string().contains("reading"));
    }
}
