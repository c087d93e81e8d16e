use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use manta_agent_component::{Agent, AgentResult, AgentState, Response};
use manta_outcome_utils::Proposal;

/// How `ScriptedAgent` responds to offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behavior {
    AcceptImmediately,
    RejectAlways,
    /// Rejects until `state.step` reaches the value.
    AcceptFromStep(u32),
    /// Responds with own offer instead of rejecting.
    CounterOffer,
    /// Walks away, both when proposing and responding.
    EndImmediately,
}

/// Calls observed by `ScriptedAgent`. Shared, so it can be checked after
/// `Runner` consumed the agent.
#[derive(Debug, Default)]
pub struct CallCounter {
    pub propose: AtomicU32,
    pub respond: AtomicU32,
    pub start: AtomicU32,
    pub end: AtomicU32,
    errors: Mutex<Vec<String>>,
    steps: Mutex<Vec<u32>>,
}

impl CallCounter {
    pub fn proposed(&self) -> u32 {
        self.propose.load(Ordering::SeqCst)
    }

    pub fn responded(&self) -> u32 {
        self.respond.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> u32 {
        self.start.load(Ordering::SeqCst)
    }

    pub fn ended(&self) -> u32 {
        self.end.load(Ordering::SeqCst)
    }

    /// Details passed to `on_error`.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    /// Steps from states seen by `propose` and `respond`, in order of calls.
    pub fn steps(&self) -> Vec<u32> {
        self.steps.lock().unwrap().clone()
    }
}

/// Agent with predefined behavior. Always proposes the same offer
/// or ends negotiations, if it has nothing to offer.
pub struct ScriptedAgent {
    offer: Option<Proposal>,
    behavior: Behavior,
    delay: Option<Duration>,
    calls: Arc<CallCounter>,
}

impl ScriptedAgent {
    pub fn new(behavior: Behavior) -> ScriptedAgent {
        ScriptedAgent {
            offer: None,
            behavior,
            delay: None,
            calls: Arc::new(CallCounter::default()),
        }
    }

    pub fn offering(mut self, offer: impl Into<Proposal>) -> Self {
        self.offer = Some(offer.into());
        self
    }

    /// Sleeps before every `propose` and `respond`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Arc<CallCounter> {
        self.calls.clone()
    }

    pub fn boxed(self) -> Box<dyn Agent> {
        Box::new(self)
    }

    async fn enter(&self, counter: &AtomicU32, state: &AgentState) {
        counter.fetch_add(1, Ordering::SeqCst);
        self.calls.steps.lock().unwrap().push(state.step);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn propose(&self, state: &AgentState) -> anyhow::Result<AgentResult> {
        self.enter(&self.calls.propose, state).await;

        Ok(match (&self.offer, self.behavior) {
            (_, Behavior::EndImmediately) | (None, _) => AgentResult::end(),
            (Some(offer), _) => AgentResult::offer(offer.clone()),
        })
    }

    async fn respond(&self, state: &AgentState) -> anyhow::Result<AgentResult> {
        self.enter(&self.calls.respond, state).await;

        Ok(match self.behavior {
            Behavior::AcceptImmediately => AgentResult::accept(),
            Behavior::RejectAlways => AgentResult::reject(),
            Behavior::AcceptFromStep(step) if state.step >= step => AgentResult::accept(),
            Behavior::AcceptFromStep(_) => AgentResult::reject(),
            Behavior::CounterOffer => AgentResult::new(Response::Offer, self.offer.clone()),
            Behavior::EndImmediately => AgentResult::end(),
        })
    }

    async fn on_negotiation_start(&self, _state: &AgentState) -> anyhow::Result<()> {
        self.calls.start.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn on_negotiation_end(&self, _state: &AgentState) -> anyhow::Result<()> {
        self.calls.end.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn on_error(&self, details: &str) {
        self.calls.errors.lock().unwrap().push(details.to_string());
    }
}
