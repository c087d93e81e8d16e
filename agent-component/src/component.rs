use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use manta_outcome_utils::{OutcomeSpace, Proposal};

/// Response given by an agent when asked to propose or respond.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    #[display(fmt = "offer")]
    Offer,
    #[display(fmt = "accept")]
    Accept,
    #[display(fmt = "reject")]
    Reject,
    /// Agent walks away from negotiations.
    #[display(fmt = "end")]
    End,
    #[display(fmt = "wait")]
    Wait,
}

/// Single completed round of negotiations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub step: u32,
    pub proposer: String,
    pub responder: String,
    pub proposal: Proposal,
    pub response: Response,
}

/// Read-only snapshot of negotiation passed to the agent.
/// Built from scratch for each call, so agents can't influence each other through it.
#[derive(Clone, Debug)]
pub struct AgentState {
    pub step: u32,
    pub max_steps: Option<u32>,
    pub wall_time: DateTime<Utc>,
    /// Elapsed fraction of time limit. Always 0 if negotiation has no time limit.
    pub relative_time: f64,
    /// Offer on the table. When responding, this is the offer to respond to.
    pub current_offer: Option<Proposal>,
    pub history: Vec<RoundRecord>,
    pub outcome_space: Arc<OutcomeSpace>,
}

impl AgentState {
    /// Negotiation progress in `[0, 1]`, whichever deadline is closer:
    /// elapsed time or used steps.
    pub fn progress(&self) -> f64 {
        let steps = match self.max_steps {
            Some(max_steps) if max_steps > 0 => self.step as f64 / max_steps as f64,
            _ => 0.0,
        };
        steps.max(self.relative_time).clamp(0.0, 1.0)
    }
}

/// Result returned by agent action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub response: Response,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<Proposal>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl AgentResult {
    pub fn new(response: Response, proposal: Option<Proposal>) -> AgentResult {
        AgentResult {
            response,
            proposal,
            metadata: serde_json::json!({}),
        }
    }

    pub fn offer(proposal: impl Into<Proposal>) -> AgentResult {
        Self::new(Response::Offer, Some(proposal.into()))
    }

    pub fn accept() -> AgentResult {
        Self::new(Response::Accept, None)
    }

    pub fn reject() -> AgentResult {
        Self::new(Response::Reject, None)
    }

    pub fn end() -> AgentResult {
        Self::new(Response::End, None)
    }

    pub fn wait() -> AgentResult {
        Self::new(Response::Wait, None)
    }

    /// Attaches additional information to the result.
    pub fn entry<T: Into<serde_json::Value>>(mut self, key: impl ToString, value: T) -> Self {
        if !self.metadata.is_object() {
            self.metadata = serde_json::json!({});
        }
        if let Some(metadata) = self.metadata.as_object_mut() {
            metadata.insert(key.to_string(), value.into());
        }
        self
    }
}

/// Capability contract of negotiation participant.
///
/// `propose` and `respond` are required. Lifecycle hooks are no-ops by default.
/// Returning error from any function breaks negotiations.
///
/// Agents are called sequentially by the runner, so implementation doesn't
/// need to expect concurrent calls within single negotiation. Use `AgentMut`
/// if you need `&mut self` access instead of managing synchronization yourself.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Called when it is agent's turn to make an offer.
    async fn propose(&self, state: &AgentState) -> anyhow::Result<AgentResult>;

    /// Called when the agent must respond to `state.current_offer`.
    async fn respond(&self, state: &AgentState) -> anyhow::Result<AgentResult>;

    /// Called once before the first round. Agent should build here
    /// all state derived from the outcome space.
    async fn on_negotiation_start(&self, _state: &AgentState) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called after negotiations ended, independent of the result.
    async fn on_negotiation_end(&self, _state: &AgentState) -> anyhow::Result<()> {
        Ok(())
    }

    /// Notification about failure, that broke negotiations.
    async fn on_error(&self, _details: &str) {}
}
