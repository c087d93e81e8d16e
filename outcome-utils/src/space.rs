use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::convert::TryFrom;

use crate::error::ConfigError;
use crate::issue::{Issue, IssueKind};
use crate::outcome::Outcome;

/// Rules of the game: ordered set of issues, unique by name.
/// Shared read-only by all agents taking part in negotiation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpaceDefinition", into = "SpaceDefinition")]
pub struct OutcomeSpace {
    issues: Vec<Issue>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpaceDefinition {
    pub issues: Vec<Issue>,
}

impl OutcomeSpace {
    pub fn new(issues: Vec<Issue>) -> Result<OutcomeSpace, ConfigError> {
        let mut names = HashSet::new();
        for issue in &issues {
            if !names.insert(issue.name()) {
                return Err(ConfigError::DuplicateIssue(issue.name().to_string()));
            }
        }
        Ok(OutcomeSpace { issues })
    }

    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn get_issue(&self, name: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.name() == name)
    }

    pub fn continuous_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.kind() == IssueKind::Continuous)
    }

    pub fn discrete_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.kind() == IssueKind::Discrete)
    }

    /// Checks if bid is valid within the rules. Unknown issue name invalidates
    /// whole outcome. Issues missing in outcome are not checked here.
    pub fn is_valid(&self, outcome: &Outcome) -> bool {
        outcome.iter().all(|(name, value)| {
            self.get_issue(name)
                .map(|issue| issue.contains(value))
                .unwrap_or(false)
        })
    }

    /// Valid outcome assigning value to every declared issue.
    pub fn is_complete(&self, outcome: &Outcome) -> bool {
        self.is_valid(outcome)
            && self
                .issues
                .iter()
                .all(|issue| outcome.contains_key(issue.name()))
    }
}

impl TryFrom<SpaceDefinition> for OutcomeSpace {
    type Error = ConfigError;

    fn try_from(definition: SpaceDefinition) -> Result<Self, Self::Error> {
        OutcomeSpace::new(definition.issues)
    }
}

impl From<OutcomeSpace> for SpaceDefinition {
    fn from(space: OutcomeSpace) -> Self {
        SpaceDefinition {
            issues: space.issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome;
    use test_case::test_case;

    fn example_space() -> OutcomeSpace {
        OutcomeSpace::new(vec![
            Issue::continuous("price", 50.0, 200.0).unwrap(),
            Issue::discrete("service", ["standard", "premium", "enterprise"]).unwrap(),
            Issue::discrete("duration", ["1_year", "3_years"]).unwrap(),
        ])
        .unwrap()
    }

    #[test_case(outcome! {"price" => 100, "service" => "premium"}, true; "valid partial outcome")]
    #[test_case(outcome! {}, true; "empty outcome")]
    #[test_case(outcome! {"price" => 100, "color" => "red"}, false; "unknown issue")]
    #[test_case(outcome! {"price" => 300}, false; "price out of range")]
    #[test_case(outcome! {"service" => "gold"}, false; "value outside discrete set")]
    #[test_case(outcome! {"service" => 1}, false; "number in text set")]
    fn test_is_valid(outcome: Outcome, expected: bool) {
        assert_eq!(example_space().is_valid(&outcome), expected);
    }

    #[test]
    fn test_is_complete() {
        let space = example_space();
        assert!(!space.is_complete(&outcome! {"price" => 100, "service" => "premium"}));
        assert!(space.is_complete(
            &outcome! {"price" => 100, "service" => "premium", "duration" => "1_year"}
        ));
    }

    #[test]
    fn test_duplicate_issue() {
        let result = OutcomeSpace::new(vec![
            Issue::continuous("price", 0.0, 1.0).unwrap(),
            Issue::discrete("price", [1, 2]).unwrap(),
        ]);
        assert_eq!(
            result.unwrap_err(),
            ConfigError::DuplicateIssue("price".to_string())
        );
    }

    #[test]
    fn test_space_from_yaml() -> anyhow::Result<()> {
        let yaml = r#"
issues:
  - name: price
    type: continuous
    min_value: 50
    max_value: 200
  - name: service
    type: discrete
    values: [standard, premium]
"#;
        let space: OutcomeSpace = serde_yaml::from_str(yaml)?;
        assert_eq!(space.len(), 2);
        assert_eq!(space.get_issue("price").unwrap().bounds(), Some((50.0, 200.0)));
        assert_eq!(space.continuous_issues().count(), 1);
        assert_eq!(space.discrete_issues().count(), 1);
        assert!(space.get_issue("payment").is_none());

        let serialized = serde_yaml::to_string(&space)?;
        assert_eq!(serde_yaml::from_str::<OutcomeSpace>(&serialized)?, space);
        Ok(())
    }
}
