use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::component::{Agent, AgentResult, AgentState};

/// Adapter implementing `Agent` for `AgentMut`.
pub struct AgentMutWrapper<N: AgentMut + Sized> {
    inner: Arc<Mutex<N>>,
}

/// Mutable version of agent. It simplifies implementation in case someone
/// doesn't need asynchronous execution, but requires access to `&mut self`.
/// By using this trait you can avoid necessary synchronization, which is handled externally.
///
/// Remember that agents are ran in asynchronous environment, so you are not allowed
/// to do any heavy computational work here, that could block executor.
pub trait AgentMut: Send {
    /// Check documentation for `Agent::propose`.
    fn propose(&mut self, state: &AgentState) -> anyhow::Result<AgentResult>;

    /// Check documentation for `Agent::respond`.
    fn respond(&mut self, state: &AgentState) -> anyhow::Result<AgentResult>;

    /// Check documentation for `Agent::on_negotiation_start`.
    fn on_negotiation_start(&mut self, _state: &AgentState) -> anyhow::Result<()> {
        Ok(())
    }

    /// Check documentation for `Agent::on_negotiation_end`.
    fn on_negotiation_end(&mut self, _state: &AgentState) -> anyhow::Result<()> {
        Ok(())
    }

    /// Check documentation for `Agent::on_error`.
    fn on_error(&mut self, _details: &str) {}
}

#[async_trait]
impl<N> Agent for AgentMutWrapper<N>
where
    N: AgentMut + Sized,
{
    async fn propose(&self, state: &AgentState) -> anyhow::Result<AgentResult> {
        self.inner.lock().await.propose(state)
    }

    async fn respond(&self, state: &AgentState) -> anyhow::Result<AgentResult> {
        self.inner.lock().await.respond(state)
    }

    async fn on_negotiation_start(&self, state: &AgentState) -> anyhow::Result<()> {
        self.inner.lock().await.on_negotiation_start(state)
    }

    async fn on_negotiation_end(&self, state: &AgentState) -> anyhow::Result<()> {
        self.inner.lock().await.on_negotiation_end(state)
    }

    async fn on_error(&self, details: &str) {
        self.inner.lock().await.on_error(details)
    }
}

impl<N> AgentMutWrapper<N>
where
    N: AgentMut + Sized,
{
    pub fn new(agent: N) -> Self {
        AgentMutWrapper {
            inner: Arc::new(Mutex::new(agent)),
        }
    }

    /// Shared handle to wrapped agent, useful to inspect it after negotiations.
    pub fn handle(&self) -> Arc<Mutex<N>> {
        self.inner.clone()
    }
}

impl<N> AgentMutWrapper<N>
where
    N: AgentMut + Sized + 'static,
{
    pub fn boxed(agent: N) -> Box<dyn Agent> {
        Box::new(Self::new(agent))
    }
}
