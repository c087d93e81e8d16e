use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

use manta_agent_component::{Agent, AgentMutWrapper};

use crate::builtin::{AcceptAll, StandardAgent};
use crate::config::NegotiationConfig;
use crate::runner::Runner;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    /// Builtin agent type: `StandardAgent` or `AcceptAll`.
    pub kind: String,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

/// Complete description of negotiation: rules and participants in turn order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NegotiationSetup {
    pub negotiation: NegotiationConfig,
    pub agents: Vec<AgentConfig>,
}

impl NegotiationSetup {
    pub fn from_yaml(yaml: &str) -> anyhow::Result<NegotiationSetup> {
        serde_yaml::from_str(yaml).context("Failed to parse negotiation setup.")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<NegotiationSetup> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Can't read negotiation setup {}.", path.display()))?;
        Self::from_yaml(&content)
    }
}

pub fn create_runner(setup: NegotiationSetup) -> anyhow::Result<Runner> {
    let mut runner = Runner::new(setup.negotiation);
    for config in setup.agents.into_iter() {
        let name = config.name.clone();
        let agent = create_agent(config)
            .with_context(|| format!("Failed to create agent [{}].", name))?;
        runner = runner.add_agent(&name, agent);
    }
    Ok(runner)
}

pub fn create_agent(config: AgentConfig) -> anyhow::Result<Box<dyn Agent>> {
    let agent = match &config.kind[..] {
        "StandardAgent" => AgentMutWrapper::boxed(StandardAgent::new(&config.name, config.params)?),
        "AcceptAll" => Box::new(AcceptAll::new(config.params)?) as Box<dyn Agent>,
        _ => bail!("BuiltIn agent {} doesn't exists.", &config.kind),
    };
    Ok(agent)
}

/// Creates builtin agent named after its kind.
pub fn create_builtin(kind: &str, params: serde_yaml::Value) -> anyhow::Result<Box<dyn Agent>> {
    create_agent(AgentConfig {
        name: kind.to_string(),
        kind: kind.to_string(),
        params,
    })
}
