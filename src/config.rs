use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use manta_outcome_utils::OutcomeSpace;

/// Rules of a single negotiation. Immutable for the whole run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegotiationConfig {
    /// Rounds after which negotiation times out.
    #[serde(default)]
    pub max_steps: Option<u32>,
    #[serde(default, with = "humantime_serde")]
    pub time_limit: Option<Duration>,
    pub outcome_space: OutcomeSpace,
    /// Break negotiations if proposer offers outcome outside of the outcome space.
    #[serde(default)]
    pub validate_proposals: bool,
}

impl NegotiationConfig {
    pub fn new(outcome_space: OutcomeSpace) -> NegotiationConfig {
        NegotiationConfig {
            max_steps: None,
            time_limit: None,
            outcome_space,
            validate_proposals: false,
        }
    }

    pub fn max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn validate_proposals(mut self, validate: bool) -> Self {
        self.validate_proposals = validate;
        self
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<NegotiationConfig> {
        serde_yaml::from_str(yaml).context("Failed to parse negotiation config.")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<NegotiationConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Can't read negotiation config {}.", path.display()))?;
        Self::from_yaml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
max_steps: 20
time_limit: 1s 500ms
outcome_space:
  issues:
    - name: price
      type: continuous
      min_value: 50
      max_value: 200
    - name: service
      type: discrete
      values: [standard, premium]
"#;

    #[test]
    fn test_config_from_yaml() {
        let config = NegotiationConfig::from_yaml(CONFIG).unwrap();

        assert_eq!(config.max_steps, Some(20));
        assert_eq!(config.time_limit, Some(Duration::from_millis(1500)));
        assert_eq!(config.outcome_space.len(), 2);
        assert!(!config.validate_proposals);

        let serialized = serde_yaml::to_string(&config).unwrap();
        assert_eq!(NegotiationConfig::from_yaml(&serialized).unwrap(), config);
    }

    #[test]
    fn test_config_without_deadlines() {
        let config = NegotiationConfig::from_yaml("outcome_space:\n  issues: []").unwrap();
        assert_eq!(config.max_steps, None);
        assert_eq!(config.time_limit, None);
    }

    #[test]
    fn test_invalid_outcome_space() {
        let duplicated = r#"
outcome_space:
  issues:
    - name: price
      type: continuous
      min_value: 1
      max_value: 2
    - name: price
      type: discrete
      values: [1]
"#;
        assert!(NegotiationConfig::from_yaml(duplicated).is_err());
    }
}
