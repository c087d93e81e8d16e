pub mod config;
pub mod factory;
mod roster;
mod runner;

pub use config::NegotiationConfig;
pub use roster::Roster;
pub use runner::{NegotiationState, NegotiationStatus, Runner};

pub use manta_agent_component::{
    Agent, AgentMut, AgentMutWrapper, AgentResult, AgentState, Response, RoundRecord,
};
pub use manta_outcome_utils::{
    outcome, ConfigError, Issue, IssueValue, Outcome, OutcomeSpace, Proposal,
};

pub mod builtin {
    pub use manta_builtin_agents::{AcceptAll, Role, StandardAgent};
}

pub mod decision {
    pub use manta_decision::{
        dominates, frontier_outcomes, pareto_frontier, ConcessionStrategy, ConcessionStyle,
        LinearAdditiveUtility, MesoConfig, MesoGenerator, MesoMethod, UtilityFunction,
    };
}
