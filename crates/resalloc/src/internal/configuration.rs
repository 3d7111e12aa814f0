use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::internal::graph::Timestamp;

/// Order in which the matcher visits children of a vertex.
///
/// Every policy is deterministic and packs the request onto the first
/// feasible vertices in its visiting order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum MatchPolicy {
    /// Children in the order of the graph description
    #[default]
    First,
    /// Children with lower vertex ids first
    Low,
    /// Children with higher vertex ids first
    High,
}

#[derive(Serialize, Deserialize, Debug, Clone, Builder)]
#[builder(default, build_fn(validate = "Self::validate"))]
pub struct MatcherConfiguration {
    pub policy: MatchPolicy,
    /// Duration assigned to jobs whose jobspec does not specify one.
    pub default_duration: Duration,
    /// End of the planning timeline; nothing is planned to end after it.
    pub horizon: Duration,
}

pub const DEFAULT_JOB_DURATION: Duration = Duration::from_secs(3600);
pub const DEFAULT_HORIZON: Duration = Duration::from_secs(365 * 24 * 3600);

impl Default for MatcherConfiguration {
    fn default() -> Self {
        MatcherConfiguration {
            policy: MatchPolicy::default(),
            default_duration: DEFAULT_JOB_DURATION,
            horizon: DEFAULT_HORIZON,
        }
    }
}

impl MatcherConfigurationBuilder {
    fn validate(&self) -> Result<(), String> {
        let duration = self.default_duration.unwrap_or(DEFAULT_JOB_DURATION);
        let horizon = self.horizon.unwrap_or(DEFAULT_HORIZON);
        if duration.as_secs() == 0 {
            return Err("Default job duration has to be at least one second".to_string());
        }
        if horizon < duration {
            return Err("Planning horizon is shorter than the default job duration".to_string());
        }
        Ok(())
    }
}

impl MatcherConfiguration {
    /// Default duration in whole seconds, never zero.
    pub fn default_duration_secs(&self) -> Timestamp {
        self.default_duration.as_secs().clamp(1, Timestamp::MAX as u64) as Timestamp
    }

    pub fn horizon_secs(&self) -> Timestamp {
        self.horizon.as_secs().min(Timestamp::MAX as u64) as Timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = MatcherConfigurationBuilder::default().build().unwrap();
        assert_eq!(config.policy, MatchPolicy::First);
        assert_eq!(config.default_duration_secs(), 3600);
        assert_eq!(config.horizon_secs(), 365 * 24 * 3600);
    }

    #[test]
    fn test_builder_rejects_invalid_durations() {
        assert!(
            MatcherConfigurationBuilder::default()
                .default_duration(Duration::ZERO)
                .build()
                .is_err()
        );
        assert!(
            MatcherConfigurationBuilder::default()
                .default_duration(Duration::from_secs(100))
                .horizon(Duration::from_secs(10))
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_configuration_from_json() {
        let config: MatcherConfiguration = serde_json::from_str(
            r#"{"policy": "High", "default_duration": {"secs": 60, "nanos": 0},
                "horizon": {"secs": 600, "nanos": 0}}"#,
        )
        .unwrap();
        assert_eq!(config.policy, MatchPolicy::High);
        assert_eq!(config.default_duration_secs(), 60);
        assert_eq!(config.horizon_secs(), 600);
    }
}
