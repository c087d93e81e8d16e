use rand::seq::SliceRandom;
use rand::Rng;

use manta_outcome_utils::{Domain, IssueValue, Outcome, OutcomeSpace};

use crate::utility::UtilityFunction;

/// Draws random complete outcome. Every issue is sampled independently:
/// uniformly from continuous range or uniformly from the discrete set.
pub fn draw_outcome<R: Rng>(space: &OutcomeSpace, rng: &mut R) -> Outcome {
    space
        .issues()
        .filter_map(|issue| {
            let value = match issue.domain() {
                Domain::Continuous { min, max } if min < max => {
                    IssueValue::Number(rng.gen_range(*min..=*max))
                }
                Domain::Continuous { min, .. } => IssueValue::Number(*min),
                Domain::Discrete(values) => values.choose(&mut *rng)?.clone(),
            };
            Some((issue.name().to_string(), value))
        })
        .collect()
}

/// Monte Carlo search for offers within `tolerance` of `target`.
///
/// Stops after collecting `max_offers` or after `max_attempts` draws, whichever
/// comes first. Duplicates are detected by exact equality.
pub fn sample_offers<R: Rng>(
    utility: &dyn UtilityFunction,
    space: &OutcomeSpace,
    target: f64,
    tolerance: f64,
    max_offers: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Vec<Outcome> {
    let mut offers: Vec<Outcome> = vec![];

    for _ in 0..max_attempts {
        if offers.len() >= max_offers {
            break;
        }

        let candidate = draw_outcome(space, rng);
        let score = utility.utility(&candidate);
        if (score - target).abs() <= tolerance && !offers.contains(&candidate) {
            offers.push(candidate);
        }
    }
    offers
}
