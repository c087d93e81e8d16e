use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use manta_outcome_utils::{ConfigError, IssueValue, Outcome, OutcomeSpace};

/// Scoring function over outcomes.
///
/// Implemented for `LinearAdditiveUtility` and for any `Fn(&Outcome) -> f64`.
/// Offer generators can use the linear-additive structure to solve for
/// outcomes analytically, instead of searching for them.
pub trait UtilityFunction {
    fn utility(&self, outcome: &Outcome) -> f64;

    fn as_linear_additive(&self) -> Option<&LinearAdditiveUtility> {
        None
    }
}

impl<F> UtilityFunction for F
where
    F: Fn(&Outcome) -> f64,
{
    fn utility(&self, outcome: &Outcome) -> f64 {
        self(outcome)
    }
}

/// Maps single issue value to normalized score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ValueFunction {
    /// Linear normalization of numeric value into `[0, 1]`.
    Continuous { min: f64, max: f64, invert: bool },
    /// Explicit lookup. Values without entry score 0.
    Discrete { scores: Vec<(IssueValue, f64)> },
}

impl ValueFunction {
    pub fn evaluate(&self, value: &IssueValue) -> f64 {
        match self {
            ValueFunction::Continuous { min, max, invert } => value
                .as_f64()
                .map(|value| normalize(value, *min, *max, *invert))
                .unwrap_or(0.0),
            ValueFunction::Discrete { scores } => scores
                .iter()
                .find(|(key, _)| key == value)
                .map(|(_, score)| *score)
                .unwrap_or(0.0),
        }
    }

    /// Raw value for which continuous curve yields `norm`. `None` for discrete
    /// curves and zero-width ranges, where every value scores the same.
    pub fn denormalize(&self, norm: f64) -> Option<f64> {
        match self {
            ValueFunction::Continuous { min, max, invert } if max > min => {
                let norm = if *invert { 1.0 - norm } else { norm };
                Some(min + norm * (max - min))
            }
            _ => None,
        }
    }
}

fn normalize(value: f64, min: f64, max: f64, invert: bool) -> f64 {
    let range = max - min;
    let norm = if range == 0.0 {
        1.0
    } else {
        ((value - min) / range).clamp(0.0, 1.0)
    };

    match invert {
        true => 1.0 - norm,
        false => norm,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IssueCurve {
    pub weight: f64,
    pub function: ValueFunction,
}

/// Linear Additive Utility: `U(outcome) = bias + sum(w_i * V_i(outcome_i))`.
///
/// Only issues with registered curve are scored. Issues without curve
/// are excluded from the sum, so every issue that should matter needs a curve.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearAdditiveUtility {
    curves: BTreeMap<String, IssueCurve>,
    #[serde(default)]
    bias: f64,
}

impl LinearAdditiveUtility {
    pub fn new() -> LinearAdditiveUtility {
        LinearAdditiveUtility::default()
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    pub fn add_curve(
        &mut self,
        issue: &str,
        weight: f64,
        min: f64,
        max: f64,
        invert: bool,
    ) -> &mut Self {
        self.curves.insert(
            issue.to_string(),
            IssueCurve {
                weight,
                function: ValueFunction::Continuous { min, max, invert },
            },
        );
        self
    }

    /// Registers continuous curve spanning bounds of the issue declared in `space`.
    pub fn add_curve_from_space(
        &mut self,
        space: &OutcomeSpace,
        issue: &str,
        weight: f64,
        invert: bool,
    ) -> Result<&mut Self, ConfigError> {
        let (min, max) = space
            .get_issue(issue)
            .ok_or_else(|| ConfigError::UnknownIssue(issue.to_string()))?
            .bounds()
            .ok_or_else(|| ConfigError::NotContinuous(issue.to_string()))?;
        Ok(self.add_curve(issue, weight, min, max, invert))
    }

    pub fn add_discrete<V: Into<IssueValue>>(
        &mut self,
        issue: &str,
        weight: f64,
        mapping: impl IntoIterator<Item = (V, f64)>,
    ) -> &mut Self {
        let scores = mapping
            .into_iter()
            .map(|(value, score)| (value.into(), score))
            .collect();
        self.curves.insert(
            issue.to_string(),
            IssueCurve {
                weight,
                function: ValueFunction::Discrete { scores },
            },
        );
        self
    }

    pub fn curve(&self, issue: &str) -> Option<&IssueCurve> {
        self.curves.get(issue)
    }

    pub fn curves(&self) -> impl Iterator<Item = (&str, &IssueCurve)> {
        self.curves
            .iter()
            .map(|(issue, curve)| (issue.as_str(), curve))
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn calculate(&self, outcome: &Outcome) -> f64 {
        outcome
            .iter()
            .filter_map(|(issue, value)| {
                self.curves
                    .get(issue)
                    .map(|curve| curve.weight * curve.function.evaluate(value))
            })
            .fold(self.bias, |total, score| total + score)
    }
}

impl UtilityFunction for LinearAdditiveUtility {
    fn utility(&self, outcome: &Outcome) -> f64 {
        self.calculate(outcome)
    }

    fn as_linear_additive(&self) -> Option<&LinearAdditiveUtility> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manta_outcome_utils::{outcome, Issue};
    use test_case::test_case;

    fn assert_close(value: f64, expected: f64) {
        assert!(
            (value - expected).abs() < 1e-9,
            "{} != {}",
            value,
            expected
        );
    }

    fn example_utility(scale: f64) -> LinearAdditiveUtility {
        let mut utility = LinearAdditiveUtility::new();
        utility
            .add_discrete("price", 0.6 * scale, [(100, 1.0), (200, 0.0)])
            .add_discrete("quantity", 0.4 * scale, [(10, 0.0), (20, 1.0)]);
        utility
    }

    #[test_case(outcome! {"price" => 100, "quantity" => 20}, 1.1; "best outcome")]
    #[test_case(outcome! {"price" => 200, "quantity" => 10}, 0.1; "worst outcome")]
    #[test_case(outcome! {"price" => 100, "quantity" => 10}, 0.7; "mixed outcome")]
    #[test_case(outcome! {"price" => 150, "quantity" => 10}, 0.1; "unmapped value")]
    #[test_case(outcome! {"price" => 100, "color" => "red"}, 0.7; "issue without curve")]
    fn test_linear_additive_utility(outcome: Outcome, expected: f64) {
        let utility = example_utility(1.0).with_bias(0.1);
        assert_close(utility.calculate(&outcome), expected);
    }

    #[test]
    fn test_weights_scaling() {
        let outcome = outcome! {"price" => 100, "quantity" => 20};
        let base = example_utility(1.0).calculate(&outcome);
        let scaled = example_utility(2.5).calculate(&outcome);
        assert_close(scaled, 2.5 * base);
    }

    #[test_case(50.0, false, 0.0; "lower bound")]
    #[test_case(200.0, false, 1.0; "upper bound")]
    #[test_case(125.0, false, 0.5; "middle")]
    #[test_case(125.0, true, 0.5; "middle inverted")]
    #[test_case(80.0, true, 0.8; "inverted")]
    #[test_case(10.0, false, 0.0; "clamped below")]
    #[test_case(500.0, false, 1.0; "clamped above")]
    fn test_continuous_curve(price: f64, invert: bool, expected: f64) {
        let mut utility = LinearAdditiveUtility::new();
        utility.add_curve("price", 1.0, 50.0, 200.0, invert);
        assert_close(utility.calculate(&outcome! {"price" => price}), expected);
    }

    #[test]
    fn test_zero_width_curve() {
        let mut utility = LinearAdditiveUtility::new();
        utility.add_curve("price", 0.5, 100.0, 100.0, false);
        assert_close(utility.calculate(&outcome! {"price" => 100}), 0.5);

        let mut inverted = LinearAdditiveUtility::new();
        inverted.add_curve("price", 0.5, 100.0, 100.0, true);
        assert_close(inverted.calculate(&outcome! {"price" => 100}), 0.0);
    }

    #[test]
    fn test_text_value_on_continuous_curve() {
        let mut utility = LinearAdditiveUtility::new();
        utility.add_curve("price", 1.0, 0.0, 10.0, false);
        assert_close(utility.calculate(&outcome! {"price" => "cheap"}), 0.0);
    }

    #[test]
    fn test_curve_from_space() {
        let space = OutcomeSpace::new(vec![
            Issue::continuous("price", 50.0, 200.0).unwrap(),
            Issue::discrete("service", ["standard", "premium"]).unwrap(),
        ])
        .unwrap();

        let mut utility = LinearAdditiveUtility::new();
        utility
            .add_curve_from_space(&space, "price", 0.6, true)
            .unwrap();
        assert_eq!(
            utility.curve("price").unwrap().function,
            ValueFunction::Continuous {
                min: 50.0,
                max: 200.0,
                invert: true
            }
        );

        assert_eq!(
            utility
                .add_curve_from_space(&space, "service", 0.3, false)
                .unwrap_err(),
            ConfigError::NotContinuous("service".to_string())
        );
        assert_eq!(
            utility
                .add_curve_from_space(&space, "payment", 0.3, false)
                .unwrap_err(),
            ConfigError::UnknownIssue("payment".to_string())
        );
    }

    #[test]
    fn test_denormalize() {
        let curve = ValueFunction::Continuous {
            min: 50.0,
            max: 200.0,
            invert: true,
        };
        assert_close(curve.denormalize(1.0).unwrap(), 50.0);
        assert_close(curve.denormalize(0.0).unwrap(), 200.0);
        assert_close(curve.evaluate(&IssueValue::from(curve.denormalize(0.3).unwrap())), 0.3);

        let flat = ValueFunction::Continuous {
            min: 1.0,
            max: 1.0,
            invert: false,
        };
        assert_eq!(flat.denormalize(0.5), None);
    }

    #[test]
    fn test_closure_as_utility_function() {
        let scorer = |outcome: &Outcome| outcome.len() as f64;
        let function: &dyn UtilityFunction = &scorer;
        assert_close(function.utility(&outcome! {"a" => 1, "b" => 2}), 2.0);
        assert!(function.as_linear_additive().is_none());

        let linear = example_utility(1.0);
        let function: &dyn UtilityFunction = &linear;
        assert!(function.as_linear_additive().is_some());
    }
}
