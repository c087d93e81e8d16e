//! Pareto frontier over utility vectors (one utility per party).

use std::cmp::Ordering;

use manta_outcome_utils::Outcome;

use crate::utility::UtilityFunction;

/// `a` dominates `b` if it is at least as good for every party
/// and strictly better for at least one.
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(a, b)| a >= b)
        && a.iter().zip(b).any(|(a, b)| a > b)
}

/// Indices (ascending) of non-dominated points.
///
/// Candidates are processed by descending social welfare (sum of utilities), with
/// descending lexicographic order for equal sums. A dominating point always
/// precedes the points it dominates in this order, so each candidate needs to be
/// checked only against points already accepted to the frontier.
pub fn pareto_frontier<U: AsRef<[f64]>>(utilities: &[U]) -> Vec<usize> {
    // `+ 0.0` folds -0.0 into 0.0, so `total_cmp` agrees with numeric comparison.
    let keys: Vec<(f64, Vec<f64>)> = utilities
        .iter()
        .map(|point| {
            let point: Vec<f64> = point.as_ref().iter().map(|u| u + 0.0).collect();
            (point.iter().sum::<f64>() + 0.0, point)
        })
        .collect();

    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| {
        let (welfare_a, point_a) = &keys[a];
        let (welfare_b, point_b) = &keys[b];
        welfare_b
            .total_cmp(welfare_a)
            .then_with(|| lexicographic(point_b, point_a))
    });

    let mut frontier: Vec<usize> = vec![];
    for candidate in order {
        let point = utilities[candidate].as_ref();
        if !frontier
            .iter()
            .any(|&accepted| dominates(utilities[accepted].as_ref(), point))
        {
            frontier.push(candidate);
        }
    }

    frontier.sort_unstable();
    frontier
}

fn lexicographic(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(a, b)| a.total_cmp(b))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Scores outcomes with utility function of every party and returns
/// outcomes from Pareto frontier, in original order.
pub fn frontier_outcomes<'a>(
    outcomes: &'a [Outcome],
    parties: &[&dyn UtilityFunction],
) -> Vec<&'a Outcome> {
    let utilities: Vec<Vec<f64>> = outcomes
        .iter()
        .map(|outcome| parties.iter().map(|party| party.utility(outcome)).collect())
        .collect();

    pareto_frontier(&utilities)
        .into_iter()
        .map(|idx| &outcomes[idx])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use manta_outcome_utils::outcome;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn exhaustive_frontier(utilities: &[Vec<f64>]) -> Vec<usize> {
        (0..utilities.len())
            .filter(|&i| {
                !utilities
                    .iter()
                    .any(|other| dominates(other, &utilities[i]))
            })
            .collect()
    }

    #[test]
    fn test_pareto_frontier() {
        let utilities = [
            [10.0, 10.0],
            [5.0, 5.0],
            [12.0, 8.0],
            [8.0, 12.0],
            [9.0, 9.0],
        ];
        assert_eq!(pareto_frontier(&utilities), vec![0, 2, 3]);
    }

    #[test]
    fn test_dominates() {
        assert!(dominates(&[1.0, 1.0], &[1.0, 0.5]));
        assert!(!dominates(&[1.0, 1.0], &[1.0, 1.0]));
        assert!(!dominates(&[1.0, 0.0], &[0.0, 1.0]));
        assert!(!dominates(&[1.0, 1.0], &[0.0]));
    }

    #[test]
    fn test_equal_points_stay_on_frontier() {
        let utilities = [[1.0, 2.0], [1.0, 2.0], [0.5, 0.5]];
        assert_eq!(pareto_frontier(&utilities), vec![0, 1]);
    }

    #[test]
    fn test_welfare_tie_from_rounding() {
        // Both sums round to 1e20, although the second point dominates the first.
        let utilities = [[1e20, 0.0], [1e20, 1.0]];
        assert_eq!(pareto_frontier(&utilities), vec![1]);
    }

    #[test]
    fn test_empty_input() {
        let utilities: Vec<Vec<f64>> = vec![];
        assert!(pareto_frontier(&utilities).is_empty());
    }

    #[test]
    fn test_matches_exhaustive_check() {
        let mut rng = StdRng::seed_from_u64(2024);

        for _ in 0..200 {
            let parties = rng.gen_range(1..=4);
            let points = rng.gen_range(0..30);
            // Small integer grid produces many ties in welfare.
            let utilities: Vec<Vec<f64>> = (0..points)
                .map(|_| (0..parties).map(|_| rng.gen_range(0..4) as f64).collect())
                .collect();

            assert_eq!(
                pareto_frontier(&utilities),
                exhaustive_frontier(&utilities),
                "{:?}",
                utilities
            );
        }
    }

    #[test]
    fn test_frontier_outcomes() {
        let outcomes = vec![
            outcome! {"price" => 100},
            outcome! {"price" => 150},
            outcome! {"price" => 120},
        ];
        let buyer = |outcome: &Outcome| 200.0 - outcome["price"].as_f64().unwrap_or(0.0);
        let seller = |outcome: &Outcome| outcome["price"].as_f64().unwrap_or(0.0);
        // Penalizes middle price for both parties.
        let both = |outcome: &Outcome| match outcome["price"].as_f64() {
            Some(price) if price == 120.0 => 0.0,
            _ => 1.0,
        };

        let parties: [&dyn UtilityFunction; 2] = [&buyer, &seller];
        assert_eq!(frontier_outcomes(&outcomes, &parties).len(), 3);

        let parties: [&dyn UtilityFunction; 1] = [&both];
        let frontier = frontier_outcomes(&outcomes, &parties);
        assert_eq!(frontier, vec![&outcomes[0], &outcomes[1]]);
    }
}
