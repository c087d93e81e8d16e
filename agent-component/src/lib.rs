pub mod component;
mod component_mut;

pub use component::{Agent, AgentResult, AgentState, Response, RoundRecord};
pub use component_mut::{AgentMut, AgentMutWrapper};

pub use manta_outcome_utils::{IssueValue, Outcome, OutcomeSpace, Proposal};
