use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value assigned to a single issue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueValue {
    Number(f64),
    Text(String),
}

/// Assignment of values to issues: `{"price": 100, "service": "premium"}`.
/// Ordered by issue name, so iteration and printing are deterministic.
pub type Outcome = BTreeMap<String, IssueValue>;

/// Builds an `Outcome` from `"issue" => value` pairs.
#[macro_export]
macro_rules! outcome {
    ($($issue:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut outcome = $crate::Outcome::new();
        $(outcome.insert($issue.to_string(), $crate::IssueValue::from($value));)*
        outcome
    }};
}

impl IssueValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            IssueValue::Number(value) => Some(*value),
            IssueValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            IssueValue::Text(value) => Some(value.as_str()),
            IssueValue::Number(_) => None,
        }
    }

    /// Interprets configuration label. Labels parsable as numbers become `Number`,
    /// everything else is `Text`.
    pub fn from_label(label: &str) -> IssueValue {
        label
            .parse::<f64>()
            .map(IssueValue::Number)
            .unwrap_or_else(|_| IssueValue::Text(label.to_string()))
    }
}

impl fmt::Display for IssueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueValue::Number(value) => write!(f, "{}", value),
            IssueValue::Text(value) => write!(f, "{}", value),
        }
    }
}

impl From<f64> for IssueValue {
    fn from(value: f64) -> Self {
        IssueValue::Number(value)
    }
}

impl From<i32> for IssueValue {
    fn from(value: i32) -> Self {
        IssueValue::Number(value as f64)
    }
}

impl From<&str> for IssueValue {
    fn from(value: &str) -> Self {
        IssueValue::Text(value.to_string())
    }
}

impl From<String> for IssueValue {
    fn from(value: String) -> Self {
        IssueValue::Text(value)
    }
}

/// Offer put on the table during single round. Either one `Outcome`, or several
/// outcomes of equivalent value for the proposer (MESO bundle), from which
/// the other party can choose.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proposal {
    Single(Outcome),
    Bundle(Vec<Outcome>),
}

impl Proposal {
    /// Packs generated offers. Returns `None` if there is nothing to offer.
    pub fn from_offers(mut offers: Vec<Outcome>) -> Option<Proposal> {
        match offers.len() {
            0 => None,
            1 => offers.pop().map(Proposal::Single),
            _ => Some(Proposal::Bundle(offers)),
        }
    }

    pub fn outcomes(&self) -> std::slice::Iter<'_, Outcome> {
        match self {
            Proposal::Single(outcome) => std::slice::from_ref(outcome).iter(),
            Proposal::Bundle(outcomes) => outcomes.iter(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Proposal::Single(_) => 1,
            Proposal::Bundle(outcomes) => outcomes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Outcome> for Proposal {
    fn from(outcome: Outcome) -> Self {
        Proposal::Single(outcome)
    }
}

impl fmt::Display for Proposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let describe = |outcome: &Outcome| {
            outcome
                .iter()
                .map(|(issue, value)| format!("{}={}", issue, value))
                .collect::<Vec<_>>()
                .join(", ")
        };

        match self {
            Proposal::Single(outcome) => write!(f, "{{{}}}", describe(outcome)),
            Proposal::Bundle(outcomes) => write!(
                f,
                "[{}]",
                outcomes
                    .iter()
                    .map(|outcome| format!("{{{}}}", describe(outcome)))
                    .collect::<Vec<_>>()
                    .join(" | ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_value_untagged_serialization() {
        let outcome = outcome! {"price" => 100.5, "service" => "premium"};
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"price": 100.5, "service": "premium"})
        );
        let parsed: Outcome = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, outcome);
    }

    #[test]
    fn test_from_label() {
        assert_eq!(IssueValue::from_label("3"), IssueValue::Number(3.0));
        assert_eq!(
            IssueValue::from_label("net30"),
            IssueValue::Text("net30".to_string())
        );
    }

    #[test]
    fn test_proposal_from_offers() {
        assert_eq!(Proposal::from_offers(vec![]), None);

        let single = Proposal::from_offers(vec![outcome! {"price" => 10}]).unwrap();
        assert_eq!(single, Proposal::Single(outcome! {"price" => 10}));
        assert_eq!(single.len(), 1);

        let bundle =
            Proposal::from_offers(vec![outcome! {"price" => 10}, outcome! {"price" => 20}])
                .unwrap();
        assert!(matches!(bundle, Proposal::Bundle(_)));
        assert_eq!(bundle.outcomes().count(), 2);
    }

    #[test]
    fn test_proposal_display() {
        let bundle = Proposal::Bundle(vec![
            outcome! {"price" => 10, "service" => "standard"},
            outcome! {"price" => 20},
        ]);
        assert_eq!(
            bundle.to_string(),
            "[{price=10, service=standard} | {price=20}]"
        );
    }
}
