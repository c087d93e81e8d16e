use manta_outcome_utils::{Issue, IssueValue, Outcome, OutcomeSpace};

use crate::utility::LinearAdditiveUtility;

/// Slack for floating point error when solving for normalized price.
const NORM_EPSILON: f64 = 1e-9;

/// Solves linear-additive utility for the price issue.
///
/// For every combination of discrete issue values, the price is chosen so that
/// the whole outcome lands exactly on `target`. Combinations which would
/// require price outside of the curve range are skipped.
///
/// Returns `None` if utility doesn't have this shape: price must be the only
/// continuous issue in the space, with continuous curve of non-zero weight and width.
pub fn solve_linear(
    utility: &LinearAdditiveUtility,
    space: &OutcomeSpace,
    price_issue: &str,
    target: f64,
    tolerance: f64,
    max_offers: usize,
) -> Option<Vec<Outcome>> {
    space.get_issue(price_issue)?.bounds()?;
    if space
        .continuous_issues()
        .any(|issue| issue.name() != price_issue)
    {
        return None;
    }

    let curve = utility.curve(price_issue)?;
    if curve.weight == 0.0 || curve.function.denormalize(0.0).is_none() {
        return None;
    }

    let discrete: Vec<&Issue> = space.discrete_issues().collect();
    let domains: Vec<&[IssueValue]> = discrete
        .iter()
        .filter_map(|issue| issue.values())
        .collect();

    let mut offers = vec![];
    let mut indices = vec![0usize; domains.len()];

    while offers.len() < max_offers {
        let mut outcome: Outcome = discrete
            .iter()
            .zip(domains.iter().zip(&indices))
            .map(|(issue, (values, &idx))| (issue.name().to_string(), values[idx].clone()))
            .collect();

        let fixed_score = utility.calculate(&outcome);
        let required_norm = (target - fixed_score) / curve.weight;

        if (-NORM_EPSILON..=1.0 + NORM_EPSILON).contains(&required_norm) {
            if let Some(price) = curve.function.denormalize(required_norm.clamp(0.0, 1.0)) {
                outcome.insert(price_issue.to_string(), IssueValue::Number(price));

                let score = utility.calculate(&outcome);
                if space.is_valid(&outcome) && (score - target).abs() <= tolerance {
                    offers.push(outcome);
                }
            }
        }

        if !next_combination(&mut indices, &domains) {
            break;
        }
    }
    Some(offers)
}

/// Advances odometer over Cartesian product. Last issue changes fastest.
fn next_combination(indices: &mut [usize], domains: &[&[IssueValue]]) -> bool {
    for pos in (0..indices.len()).rev() {
        indices[pos] += 1;
        if indices[pos] < domains[pos].len() {
            return true;
        }
        indices[pos] = 0;
    }
    false
}
