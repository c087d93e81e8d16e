use anyhow::anyhow;
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;

use manta_agent_component::{Agent, AgentMut, AgentMutWrapper};
use manta_negotiators::{NegotiationConfig, NegotiationState, NegotiationStatus, Runner};

#[derive(thiserror::Error)]
#[error("{error}\nNegotiation traceback:\n\n{negotiation_traceback}")]
pub struct FrameworkError {
    error: anyhow::Error,
    negotiation_traceback: String,
}

/// Runs negotiations between test agents with a safety timeout.
pub struct Framework {
    pub config: NegotiationConfig,
    pub agents: Vec<(String, Box<dyn Agent>)>,
    pub test_timeout: Duration,
}

impl Framework {
    pub fn new(config: NegotiationConfig) -> Framework {
        let _ = env_logger::builder().is_test(true).try_init();

        Framework {
            config,
            agents: vec![],
            test_timeout: Duration::from_secs(10),
        }
    }

    pub fn test_timeout(mut self, timeout: Duration) -> Self {
        self.test_timeout = timeout;
        self
    }

    pub fn add_agent(mut self, name: &str, agent: Box<dyn Agent>) -> Self {
        self.agents.push((name.to_string(), agent));
        self
    }

    pub fn add_agent_mut<N: AgentMut + 'static>(self, name: &str, agent: N) -> Self {
        self.add_agent(name, AgentMutWrapper::boxed(agent))
    }

    pub async fn run(self) -> Result<NegotiationState, FrameworkError> {
        let Framework {
            config,
            agents,
            test_timeout,
        } = self;

        let runner = agents
            .into_iter()
            .fold(Runner::new(config), |runner, (name, agent)| {
                runner.add_agent(&name, agent)
            });

        timeout(test_timeout, runner.run()).await.map_err(|_| FrameworkError {
            error: anyhow!("Negotiations didn't finish in {:?}.", test_timeout),
            negotiation_traceback: "<no state available>".to_string(),
        })
    }

    /// Runs negotiations and fails with full traceback, if they didn't end with `status`.
    pub async fn run_expecting(
        self,
        status: NegotiationStatus,
    ) -> Result<NegotiationState, FrameworkError> {
        let state = self.run().await?;
        if state.status != status {
            return Err(FrameworkError::from(
                anyhow!("Expected status '{}', got '{}'.", status, state.status),
                &state,
            ));
        }
        Ok(state)
    }
}

impl FrameworkError {
    pub fn from(error: impl Into<anyhow::Error>, state: &NegotiationState) -> FrameworkError {
        FrameworkError {
            error: error.into(),
            negotiation_traceback: traceback(state),
        }
    }
}

fn traceback(state: &NegotiationState) -> String {
    let mut lines = vec![format!(
        "status: {}, step: {}, failure: {}",
        state.status,
        state.step,
        state.failure.as_deref().unwrap_or("none")
    )];
    lines.extend(state.history.iter().map(|round| {
        format!(
            "[{}] {} -> {}: {} => {}",
            round.step, round.proposer, round.responder, round.proposal, round.response
        )
    }));
    lines.join("\n")
}

impl fmt::Debug for FrameworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
