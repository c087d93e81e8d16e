//! Multiple Equivalent Simultaneous Offers.
//!
//! Generates several outcomes with approximately the same utility for the proposer,
//! so the other party can choose the one it prefers.

mod analytical;
mod randomized;

use derive_more::Display;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use manta_outcome_utils::{Outcome, OutcomeSpace};

use crate::utility::UtilityFunction;

pub use analytical::solve_linear;
pub use randomized::{draw_outcome, sample_offers};

pub const DEFAULT_MAX_ATTEMPTS: usize = 5000;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MesoMethod {
    /// Analytical solver when utility function allows it, random search otherwise.
    #[display(fmt = "auto")]
    Auto,
    #[display(fmt = "analytical")]
    Analytical,
    #[display(fmt = "randomized")]
    Randomized,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MesoConfig {
    pub method: MesoMethod,
    /// Accepted deviation from target utility.
    pub tolerance: f64,
    pub max_offers: usize,
    /// Number of draws in randomized search.
    pub max_attempts: usize,
    /// Continuous issue solved for by analytical method.
    pub price_issue: String,
    /// Makes randomized search reproducible.
    pub seed: Option<u64>,
}

impl Default for MesoConfig {
    fn default() -> Self {
        MesoConfig {
            method: MesoMethod::Auto,
            tolerance: 0.05,
            max_offers: 3,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            price_issue: "price".to_string(),
            seed: None,
        }
    }
}

pub struct MesoGenerator<'a> {
    space: &'a OutcomeSpace,
    config: MesoConfig,
}

impl<'a> MesoGenerator<'a> {
    pub fn new(space: &'a OutcomeSpace, config: MesoConfig) -> MesoGenerator<'a> {
        MesoGenerator { space, config }
    }

    pub fn config(&self) -> &MesoConfig {
        &self.config
    }

    /// Returns at most `max_offers` distinct valid outcomes with utility within
    /// tolerance of `target`. Empty result means that nothing was found, which is
    /// a normal outcome and the caller decides what to do then.
    pub fn generate(&self, utility: &dyn UtilityFunction, target: f64) -> Vec<Outcome> {
        match self.config.seed {
            Some(seed) => {
                self.generate_with_rng(utility, target, &mut StdRng::seed_from_u64(seed))
            }
            None => self.generate_with_rng(utility, target, &mut rand::thread_rng()),
        }
    }

    pub fn generate_with_rng<R: Rng>(
        &self,
        utility: &dyn UtilityFunction,
        target: f64,
        rng: &mut R,
    ) -> Vec<Outcome> {
        let offers = match self.config.method {
            MesoMethod::Auto => match self.analytical(utility, target) {
                Some(offers) => offers,
                None => {
                    log::debug!(
                        "MESO: analytical solver not applicable, falling back to random search."
                    );
                    self.randomized(utility, target, rng)
                }
            },
            MesoMethod::Analytical => self.analytical(utility, target).unwrap_or_else(|| {
                log::warn!(
                    "MESO: utility function can't be solved analytically for issue '{}'.",
                    self.config.price_issue
                );
                vec![]
            }),
            MesoMethod::Randomized => self.randomized(utility, target, rng),
        };

        log::debug!(
            "MESO ({}): generated {} offer(s) for target utility {:.3}.",
            self.config.method,
            offers.len(),
            target
        );
        offers
    }

    fn analytical(&self, utility: &dyn UtilityFunction, target: f64) -> Option<Vec<Outcome>> {
        solve_linear(
            utility.as_linear_additive()?,
            self.space,
            &self.config.price_issue,
            target,
            self.config.tolerance,
            self.config.max_offers,
        )
    }

    fn randomized<R: Rng>(
        &self,
        utility: &dyn UtilityFunction,
        target: f64,
        rng: &mut R,
    ) -> Vec<Outcome> {
        sample_offers(
            utility,
            self.space,
            target,
            self.config.tolerance,
            self.config.max_offers,
            self.config.max_attempts,
            rng,
        )
    }
}
