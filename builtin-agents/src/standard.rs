use anyhow::{anyhow, bail, Context};
use derive_more::Display;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use manta_agent_component::{AgentMut, AgentResult, AgentState};
use manta_decision::{
    ConcessionStrategy, ConcessionStyle, LinearAdditiveUtility, MesoConfig, MesoGenerator,
};
use manta_outcome_utils::{ConfigError, Domain, IssueValue, OutcomeSpace, Proposal};

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Prefers low price.
    #[display(fmt = "buyer")]
    Buyer,
    #[display(fmt = "seller")]
    Seller,
}

impl Default for Role {
    fn default() -> Self {
        Role::Buyer
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub role: Role,
    /// Issue name to its weight. Issues without weight don't influence utility.
    pub weights: BTreeMap<String, f64>,
    /// Score of every value label of discrete issues. Discrete issues missing here
    /// are scored by position in the declared domain, from 0 for the first value
    /// to 1 for the last one.
    #[serde(default)]
    pub discrete_scores: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub personality: ConcessionStyle,
    #[serde(default = "default_aspiration_start")]
    pub aspiration_start: f64,
    #[serde(default = "default_reservation_value")]
    pub reservation_value: f64,
    #[serde(default = "default_meso")]
    pub meso: MesoConfig,
}

fn default_aspiration_start() -> f64 {
    0.95
}

fn default_reservation_value() -> f64 {
    0.5
}

fn default_meso() -> MesoConfig {
    MesoConfig {
        tolerance: 0.06,
        max_offers: 3,
        ..MesoConfig::default()
    }
}

/// Universal negotiator configured entirely by `Config`.
///
/// Proposes MESO bundles around the target utility of its concession strategy
/// and accepts offers scoring at least the current target.
pub struct StandardAgent {
    name: String,
    config: Config,
    state: Option<StandardAgentState>,
}

/// State derived from the outcome space, built by `StandardAgent::initialize`.
pub struct StandardAgentState {
    pub utility: LinearAdditiveUtility,
    pub strategy: ConcessionStrategy,
    rng: StdRng,
}

impl StandardAgent {
    pub fn new(name: &str, config: serde_yaml::Value) -> anyhow::Result<StandardAgent> {
        let config: Config = serde_yaml::from_value(config)
            .with_context(|| format!("Invalid StandardAgent [{}] config.", name))?;
        Self::from_config(name, config)
    }

    pub fn from_config(name: &str, config: Config) -> anyhow::Result<StandardAgent> {
        if config.weights.is_empty() {
            bail!("StandardAgent [{}] needs at least one issue weight.", name);
        }
        if config.aspiration_start < config.reservation_value {
            bail!(
                "StandardAgent [{}]: aspiration_start ({}) lower than reservation_value ({}).",
                name,
                config.aspiration_start,
                config.reservation_value
            );
        }

        Ok(StandardAgent {
            name: name.to_string(),
            config,
            state: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `None` until the agent is initialized.
    pub fn state(&self) -> Option<&StandardAgentState> {
        self.state.as_ref()
    }

    /// Builds utility model, concession strategy and random generator for
    /// negotiation over `space`. Called from `on_negotiation_start`. Calling it
    /// again discards the previous state.
    ///
    /// Continuous issues get curves spanning their bounds in the space. Price
    /// curve is inverted for buyers.
    pub fn initialize(&mut self, space: &OutcomeSpace) -> anyhow::Result<()> {
        let utility = self.build_utility(space)?;
        let strategy = ConcessionStrategy::new(
            self.config.personality,
            self.config.aspiration_start,
            self.config.reservation_value,
        );
        let rng = match self.config.meso.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        log::info!(
            "[{}] Initialized as {} ({}).",
            self.name,
            self.config.role,
            self.config.personality
        );

        self.state = Some(StandardAgentState {
            utility,
            strategy,
            rng,
        });
        Ok(())
    }

    fn build_utility(&self, space: &OutcomeSpace) -> anyhow::Result<LinearAdditiveUtility> {
        for issue in self.config.discrete_scores.keys() {
            match space.get_issue(issue) {
                None => return Err(ConfigError::UnknownIssue(issue.clone()).into()),
                Some(declared) if declared.values().is_none() => {
                    bail!("Scores defined for continuous issue '{}'.", issue)
                }
                Some(_) if !self.config.weights.contains_key(issue) => {
                    log::warn!("[{}] Issue '{}' has scores, but no weight.", self.name, issue)
                }
                Some(_) => (),
            }
        }

        let mut utility = LinearAdditiveUtility::new();
        for (name, &weight) in &self.config.weights {
            let issue = space
                .get_issue(name)
                .ok_or_else(|| ConfigError::UnknownIssue(name.clone()))?;

            match issue.domain() {
                Domain::Continuous { .. } => {
                    let invert =
                        *name == self.config.meso.price_issue && self.config.role == Role::Buyer;
                    utility.add_curve_from_space(space, name, weight, invert)?;
                }
                Domain::Discrete(values) => match self.config.discrete_scores.get(name) {
                    Some(scores) => {
                        let scores = scores
                            .iter()
                            .map(|(label, &score)| {
                                Ok((declared_value(name, values, label)?, score))
                            })
                            .collect::<anyhow::Result<Vec<_>>>()?;
                        utility.add_discrete(name, weight, scores);
                    }
                    None => {
                        utility.add_discrete(name, weight, positional_scores(values));
                    }
                },
            }
        }
        Ok(utility)
    }
}

/// Finds value declared for the issue, that config label refers to.
/// Labels are always strings in YAML maps, so they are compared by their text form.
fn declared_value(issue: &str, values: &[IssueValue], label: &str) -> anyhow::Result<IssueValue> {
    let parsed = IssueValue::from_label(label);
    values
        .iter()
        .find(|value| value.to_string() == label)
        .or_else(|| values.iter().find(|value| **value == parsed))
        .cloned()
        .ok_or_else(|| {
            anyhow!(
                "Score defined for '{}', which isn't a value of issue '{}'.",
                label,
                issue
            )
        })
}

fn positional_scores(values: &[IssueValue]) -> Vec<(IssueValue, f64)> {
    let last = values.len().saturating_sub(1);
    values
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let score = match last {
                0 => 1.0,
                _ => idx as f64 / last as f64,
            };
            (value.clone(), score)
        })
        .collect()
}

impl AgentMut for StandardAgent {
    fn propose(&mut self, state: &AgentState) -> anyhow::Result<AgentResult> {
        let agent = self
            .state
            .as_mut()
            .ok_or_else(|| anyhow!("StandardAgent [{}] not initialized.", self.name))?;

        let target = agent.strategy.target_utility(state.progress());
        let generator = MesoGenerator::new(&state.outcome_space, self.config.meso.clone());
        let offers = generator.generate_with_rng(&agent.utility, target, &mut agent.rng);
        let num_offers = offers.len();

        Ok(match Proposal::from_offers(offers) {
            Some(proposal) => {
                log::debug!(
                    "[{}] Step {}: proposing {} (target utility {:.3}).",
                    self.name,
                    state.step,
                    proposal,
                    target
                );
                AgentResult::offer(proposal)
                    .entry("target", target)
                    .entry("offers", num_offers)
            }
            None => {
                log::info!(
                    "[{}] No offer found for target utility {:.3}. Ending negotiations.",
                    self.name,
                    target
                );
                AgentResult::end().entry("target", target)
            }
        })
    }

    fn respond(&mut self, state: &AgentState) -> anyhow::Result<AgentResult> {
        let agent = self
            .state
            .as_ref()
            .ok_or_else(|| anyhow!("StandardAgent [{}] not initialized.", self.name))?;
        let offer = state
            .current_offer
            .as_ref()
            .ok_or_else(|| anyhow!("StandardAgent [{}]: no offer to respond to.", self.name))?;

        // Best member of the bundle counts, since we can pick any of them.
        let score = offer
            .outcomes()
            .map(|outcome| agent.utility.calculate(outcome))
            .fold(f64::NEG_INFINITY, f64::max);
        let target = agent.strategy.target_utility(state.progress());

        log::debug!(
            "[{}] Step {}: offer {} scored {:.3} (target {:.3}).",
            self.name,
            state.step,
            offer,
            score,
            target
        );

        let result = if score >= target {
            AgentResult::accept()
        } else {
            AgentResult::reject()
        };
        Ok(result.entry("score", score).entry("target", target))
    }

    fn on_negotiation_start(&mut self, state: &AgentState) -> anyhow::Result<()> {
        self.initialize(&state.outcome_space)
    }

    fn on_negotiation_end(&mut self, state: &AgentState) -> anyhow::Result<()> {
        log::info!(
            "[{}] Negotiations finished at step {}.",
            self.name,
            state.step
        );
        Ok(())
    }
}
