use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::error::ConfigError;
use crate::outcome::IssueValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Discrete,
    Continuous,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Domain {
    /// Inclusive numeric range.
    Continuous { min: f64, max: f64 },
    /// Non-empty set of allowed values.
    Discrete(Vec<IssueValue>),
}

/// Single negotiable dimension. Can be constructed only with a consistent
/// domain, so the rest of the code doesn't have to check it again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IssueDefinition", into = "IssueDefinition")]
pub struct Issue {
    name: String,
    domain: Domain,
}

/// Raw shape of an `Issue` in configuration files:
///
/// ```yaml
/// - name: price
///   type: continuous
///   min_value: 50.0
///   max_value: 200.0
/// - name: service
///   type: discrete
///   values: [standard, premium]
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssueDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<IssueValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

impl Issue {
    pub fn continuous(name: impl ToString, min: f64, max: f64) -> Result<Issue, ConfigError> {
        let name = name.to_string();
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ConfigError::InvalidBounds { name, min, max });
        }
        Ok(Issue {
            name,
            domain: Domain::Continuous { min, max },
        })
    }

    pub fn discrete<V: Into<IssueValue>>(
        name: impl ToString,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Issue, ConfigError> {
        let name = name.to_string();
        let values: Vec<IssueValue> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(ConfigError::EmptyDomain(name));
        }
        if let Some(duplicate) = values
            .iter()
            .enumerate()
            .find(|(idx, value)| values[..*idx].contains(*value))
            .map(|(_, value)| value.to_string())
        {
            return Err(ConfigError::DuplicateValue {
                issue: name,
                value: duplicate,
            });
        }
        Ok(Issue {
            name,
            domain: Domain::Discrete(values),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn kind(&self) -> IssueKind {
        match self.domain {
            Domain::Continuous { .. } => IssueKind::Continuous,
            Domain::Discrete(_) => IssueKind::Discrete,
        }
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self.domain {
            Domain::Continuous { min, max } => Some((min, max)),
            Domain::Discrete(_) => None,
        }
    }

    pub fn values(&self) -> Option<&[IssueValue]> {
        match &self.domain {
            Domain::Discrete(values) => Some(values.as_slice()),
            Domain::Continuous { .. } => None,
        }
    }

    /// Checks if value belongs to issue domain. Text never belongs to numeric range.
    pub fn contains(&self, value: &IssueValue) -> bool {
        match &self.domain {
            Domain::Continuous { min, max } => value
                .as_f64()
                .map(|value| *min <= value && value <= *max)
                .unwrap_or(false),
            Domain::Discrete(values) => values.contains(value),
        }
    }
}

impl TryFrom<IssueDefinition> for Issue {
    type Error = ConfigError;

    fn try_from(definition: IssueDefinition) -> Result<Self, Self::Error> {
        match definition.kind {
            IssueKind::Discrete => {
                Issue::discrete(definition.name, definition.values.unwrap_or_default())
            }
            IssueKind::Continuous => match (definition.min_value, definition.max_value) {
                (Some(min), Some(max)) => Issue::continuous(definition.name, min, max),
                _ => Err(ConfigError::MissingBounds(definition.name)),
            },
        }
    }
}

impl From<Issue> for IssueDefinition {
    fn from(issue: Issue) -> Self {
        match issue.domain {
            Domain::Continuous { min, max } => IssueDefinition {
                name: issue.name,
                kind: IssueKind::Continuous,
                values: None,
                min_value: Some(min),
                max_value: Some(max),
            },
            Domain::Discrete(values) => IssueDefinition {
                name: issue.name,
                kind: IssueKind::Discrete,
                values: Some(values),
                min_value: None,
                max_value: None,
            },
        }
    }
}
