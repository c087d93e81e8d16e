use anyhow::anyhow;
use chrono::Utc;
use derive_more::Display;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::time::Instant;

use manta_agent_component::{Agent, AgentState, Response, RoundRecord};
use manta_outcome_utils::{OutcomeSpace, Proposal};

use crate::config::NegotiationConfig;
use crate::roster::Roster;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegotiationStatus {
    #[display(fmt = "ongoing")]
    Ongoing,
    #[display(fmt = "success")]
    Success,
    #[display(fmt = "timedout")]
    Timedout,
    #[display(fmt = "broken")]
    Broken,
}

impl NegotiationStatus {
    pub fn is_terminal(&self) -> bool {
        *self != NegotiationStatus::Ongoing
    }
}

/// Progress of negotiations. Returned by `Runner::run` in terminal state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegotiationState {
    pub status: NegotiationStatus,
    /// Number of completed rounds, that didn't end negotiations.
    pub step: u32,
    /// Position of next proposer in the agents list.
    pub proposer_id: usize,
    /// Last proposal made. Agreement if negotiations succeeded.
    pub current_offer: Option<Proposal>,
    pub history: Vec<RoundRecord>,
    /// Reason of breaking negotiations.
    pub failure: Option<String>,
}

impl Default for NegotiationState {
    fn default() -> Self {
        NegotiationState {
            status: NegotiationStatus::Ongoing,
            step: 0,
            proposer_id: 0,
            current_offer: None,
            history: vec![],
            failure: None,
        }
    }
}

/// Drives single negotiation between agents in round-robin order.
///
/// In each round the proposer makes an offer and the next agent responds.
/// Runner owns negotiation state and agents see only snapshots of it.
pub struct Runner {
    config: NegotiationConfig,
    space: Arc<OutcomeSpace>,
    roster: Roster,
    state: NegotiationState,
}

/// Failure to carry on negotiations.
enum Interrupt {
    /// Agent walked away or made invalid move. Not an agent error.
    Broken(String),
    Failure(String),
}

impl Runner {
    pub fn new(config: NegotiationConfig) -> Runner {
        Runner {
            space: Arc::new(config.outcome_space.clone()),
            config,
            roster: Roster::new(),
            state: NegotiationState::default(),
        }
    }

    /// Adds agent at the end of turn order. Duplicate names get `#n` postfix.
    pub fn add_agent(mut self, name: &str, agent: Box<dyn Agent>) -> Runner {
        self.roster.add_agent(name.to_string(), agent);
        self
    }

    pub fn agents(&self) -> Vec<String> {
        self.roster.names()
    }

    pub fn config(&self) -> &NegotiationConfig {
        &self.config
    }

    /// Runs negotiations until success, deadline or failure.
    /// Agent errors never escape from here. They end up as `broken` status.
    pub async fn run(mut self) -> NegotiationState {
        if self.roster.len() < 2 {
            let error = format!(
                "At least 2 agents needed to negotiate, got {}.",
                self.roster.len()
            );
            log::error!("{}", error);

            self.state.status = NegotiationStatus::Broken;
            self.state.failure = Some(error);
            return self.state;
        }

        log::info!(
            "Starting negotiations between [{}]. Max steps: {:?}, time limit: {:?}.",
            self.roster.names().join(", "),
            self.config.max_steps,
            self.config.time_limit
        );

        let started = Instant::now();
        match self.start(started).await {
            Ok(()) => self.negotiate(started).await,
            Err(interrupt) => self.interrupt(interrupt).await,
        }
        self.finish(started).await;

        match self.state.status {
            NegotiationStatus::Success => log::info!(
                "Negotiations succeeded after {} step(s). Agreement: {}.",
                self.state.step,
                self.state
                    .current_offer
                    .as_ref()
                    .map(|proposal| proposal.to_string())
                    .unwrap_or_default()
            ),
            status => log::info!(
                "Negotiations finished with status '{}' at step {}.",
                status,
                self.state.step
            ),
        }
        self.state
    }

    async fn start(&mut self, started: Instant) -> Result<(), Interrupt> {
        let state = self.agent_state(started);
        for (name, agent) in self.roster.iter() {
            guarded(agent.on_negotiation_start(&state))
                .await
                .map_err(|e| Interrupt::Failure(format!("Agent [{name}] failed to start: {e}")))?;
        }
        Ok(())
    }

    async fn negotiate(&mut self, started: Instant) {
        while !self.state.status.is_terminal() {
            if let Some(deadline) = self.deadline_reached(started) {
                log::info!("Negotiations timed out: {}.", deadline);
                self.state.status = NegotiationStatus::Timedout;
                break;
            }

            if let Err(interrupt) = self.round(started).await {
                self.interrupt(interrupt).await;
                break;
            }
            tokio::task::yield_now().await;
        }
    }

    async fn round(&mut self, started: Instant) -> Result<(), Interrupt> {
        let proposer_id = self.state.proposer_id % self.roster.len();
        let responder_id = (proposer_id + 1) % self.roster.len();
        let (proposer_name, proposer) = self
            .roster
            .get(proposer_id)
            .ok_or_else(|| Interrupt::Failure("No proposer.".to_string()))?;
        let (responder_name, responder) = self
            .roster
            .get(responder_id)
            .ok_or_else(|| Interrupt::Failure("No responder.".to_string()))?;
        let (proposer_name, responder_name) =
            (proposer_name.to_string(), responder_name.to_string());

        let state = self.agent_state(started);
        let result = guarded(proposer.propose(&state)).await.map_err(|e| {
            Interrupt::Failure(format!("Agent [{proposer_name}] failed to propose: {e}"))
        })?;

        let proposal = match (result.response, result.proposal) {
            (Response::End, _) => {
                return Err(Interrupt::Broken(format!(
                    "Agent [{proposer_name}] ended negotiations."
                )))
            }
            (_, None) => {
                return Err(Interrupt::Broken(format!(
                    "Agent [{proposer_name}] didn't propose anything."
                )))
            }
            (_, Some(proposal)) if proposal.is_empty() => {
                return Err(Interrupt::Broken(format!(
                    "Agent [{proposer_name}] proposed empty bundle."
                )))
            }
            (_, Some(proposal)) => proposal,
        };

        if self.config.validate_proposals
            && !proposal
                .outcomes()
                .all(|outcome| self.space.is_valid(outcome))
        {
            return Err(Interrupt::Failure(format!(
                "Agent [{proposer_name}] proposed outcome outside of the outcome space: {proposal}."
            )));
        }

        let state = AgentState {
            current_offer: Some(proposal.clone()),
            ..state
        };
        let response = guarded(responder.respond(&state))
            .await
            .map_err(|e| {
                Interrupt::Failure(format!("Agent [{responder_name}] failed to respond: {e}"))
            })?
            .response;

        log::debug!(
            "Step {}: [{}] proposed {}, [{}] responded '{}'.",
            self.state.step,
            proposer_name,
            proposal,
            responder_name,
            response
        );

        if response == Response::End {
            return Err(Interrupt::Broken(format!(
                "Agent [{responder_name}] ended negotiations."
            )));
        }

        self.state.current_offer = Some(proposal.clone());
        self.state.history.push(RoundRecord {
            step: self.state.step,
            proposer: proposer_name,
            responder: responder_name,
            proposal,
            response,
        });

        match response {
            Response::Accept => self.state.status = NegotiationStatus::Success,
            // Counter offer is made by the responder in the next round.
            _ => {
                self.state.step += 1;
                self.state.proposer_id = responder_id;
            }
        }
        Ok(())
    }

    async fn interrupt(&mut self, interrupt: Interrupt) {
        self.state.status = NegotiationStatus::Broken;

        let details = match interrupt {
            Interrupt::Broken(reason) => {
                log::info!("Negotiations broken: {}", reason);
                reason
            }
            Interrupt::Failure(error) => {
                log::warn!("Negotiations failed: {}", error);
                for (name, agent) in self.roster.iter() {
                    if AssertUnwindSafe(agent.on_error(&error))
                        .catch_unwind()
                        .await
                        .is_err()
                    {
                        log::warn!("Agent [{}] panicked while handling error.", name);
                    }
                }
                error
            }
        };
        self.state.failure = Some(details);
    }

    async fn finish(&mut self, started: Instant) {
        let state = self.agent_state(started);
        for (name, agent) in self.roster.iter() {
            guarded(agent.on_negotiation_end(&state))
                .await
                .map_err(|e| log::warn!("Agent [{}] failed to finish negotiations: {}", name, e))
                .ok();
        }
    }

    fn deadline_reached(&self, started: Instant) -> Option<String> {
        if let Some(max_steps) = self.config.max_steps {
            if self.state.step >= max_steps {
                return Some(format!("reached {} steps", max_steps));
            }
        }
        if let Some(time_limit) = self.config.time_limit {
            if started.elapsed() >= time_limit {
                return Some(format!("exceeded time limit {:?}", time_limit));
            }
        }
        None
    }

    /// Fresh snapshot for agent call.
    fn agent_state(&self, started: Instant) -> AgentState {
        let relative_time = match self.config.time_limit {
            Some(limit) if !limit.is_zero() => {
                (started.elapsed().as_secs_f64() / limit.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        };

        AgentState {
            step: self.state.step,
            max_steps: self.config.max_steps,
            wall_time: Utc::now(),
            relative_time,
            current_offer: self.state.current_offer.clone(),
            history: self.state.history.clone(),
            outcome_space: self.space.clone(),
        }
    }
}

/// Awaits agent call, converting panic into error.
async fn guarded<T>(call: impl Future<Output = anyhow::Result<T>>) -> anyhow::Result<T> {
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(anyhow!("agent panicked: {}", panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown reason".to_string()
    }
}
