use anyhow::bail;

use manta_agent_component::{AgentMut, AgentResult, AgentState};
use manta_outcome_utils::Proposal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    Start,
    Propose,
    Respond,
    End,
}

/// Agent failing or panicking in chosen hooks. Otherwise it offers
/// the same proposal and rejects everything.
pub struct EmitErrors {
    offer: Proposal,
    fail_on: Vec<Hook>,
    panic_on: Vec<Hook>,
    /// Hooks called so far.
    pub calls: Vec<Hook>,
    /// Details passed to `on_error`.
    pub errors: Vec<String>,
}

impl EmitErrors {
    pub fn new(offer: impl Into<Proposal>) -> EmitErrors {
        EmitErrors {
            offer: offer.into(),
            fail_on: vec![],
            panic_on: vec![],
            calls: vec![],
            errors: vec![],
        }
    }

    pub fn fail_on(mut self, hook: Hook) -> Self {
        self.fail_on.push(hook);
        self
    }

    pub fn panic_on(mut self, hook: Hook) -> Self {
        self.panic_on.push(hook);
        self
    }

    fn enter(&mut self, hook: Hook) -> anyhow::Result<()> {
        self.calls.push(hook);

        if self.panic_on.contains(&hook) {
            panic!("EmitErrors: panic in {:?} hook", hook);
        }
        if self.fail_on.contains(&hook) {
            bail!("EmitErrors: error in {:?} hook", hook)
        }

        log::info!("EmitErrors: Returning Ok from {:?}, since no error configured.", hook);
        Ok(())
    }
}

impl AgentMut for EmitErrors {
    fn propose(&mut self, _state: &AgentState) -> anyhow::Result<AgentResult> {
        self.enter(Hook::Propose)?;
        Ok(AgentResult::offer(self.offer.clone()))
    }

    fn respond(&mut self, _state: &AgentState) -> anyhow::Result<AgentResult> {
        self.enter(Hook::Respond)?;
        Ok(AgentResult::reject())
    }

    fn on_negotiation_start(&mut self, _state: &AgentState) -> anyhow::Result<()> {
        self.enter(Hook::Start)
    }

    fn on_negotiation_end(&mut self, _state: &AgentState) -> anyhow::Result<()> {
        self.enter(Hook::End)
    }

    fn on_error(&mut self, details: &str) {
        self.errors.push(details.to_string());
    }
}
