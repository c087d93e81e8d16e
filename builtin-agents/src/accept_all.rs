use async_trait::async_trait;

use manta_agent_component::{Agent, AgentResult, AgentState};

/// Agent that accepts every incoming offer and never proposes anything.
pub struct AcceptAll {}

impl AcceptAll {
    pub fn new(_config: serde_yaml::Value) -> anyhow::Result<AcceptAll> {
        Ok(AcceptAll {})
    }
}

#[async_trait]
impl Agent for AcceptAll {
    async fn propose(&self, _state: &AgentState) -> anyhow::Result<AgentResult> {
        Ok(AgentResult::end())
    }

    async fn respond(&self, _state: &AgentState) -> anyhow::Result<AgentResult> {
        Ok(AgentResult::accept())
    }
}
