use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{RetryPolicy, DEFAULT_INTERVAL, DEFAULT_TIMEOUT};
use crate::error::PolicyError;

/// Serialized form of a [`RetryPolicy`]'s timing fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub timeout_ms: u64,
    pub interval_ms: u64,
    pub max_attempts: Option<u32>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            max_attempts: None,
        }
    }
}

impl TryFrom<PolicyConfig> for RetryPolicy {
    type Error = PolicyError;

    fn try_from(config: PolicyConfig) -> Result<Self, Self::Error> {
        let mut builder = RetryPolicy::builder()
            .timeout_ms(config.timeout_ms)
            .interval_ms(config.interval_ms);
        if let Some(max) = config.max_attempts {
            builder = builder.max_attempts(max);
        }
        builder.build()
    }
}

/// Named policy profiles shared by call sites, e.g. `click` or `visible`.
///
/// ```json
/// {
///   "default": { "timeout_ms": 5000, "interval_ms": 100 },
///   "profiles": {
///     "click": { "timeout_ms": 2000, "interval_ms": 250, "max_attempts": 3 }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollerConfig {
    pub default: PolicyConfig,
    pub profiles: HashMap<String, PolicyConfig>,
}

impl PollerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, PolicyError> {
        let config: PollerConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Resolves a profile to a policy; `None` selects the default profile.
    pub fn policy(&self, profile: Option<&str>) -> Result<RetryPolicy, PolicyError> {
        let config = match profile {
            None => &self.default,
            Some(name) => self
                .profiles
                .get(name)
                .ok_or_else(|| PolicyError::UnknownProfile(name.to_string()))?,
        };
        RetryPolicy::try_from(config.clone())
    }

    fn validate(&self) -> Result<(), PolicyError> {
        RetryPolicy::try_from(self.default.clone())?;
        for config in self.profiles.values() {
            RetryPolicy::try_from(config.clone())?;
        }
        Ok(())
    }
}
