pub mod accept_all;
pub mod standard;

pub use accept_all::AcceptAll;
pub use standard::{Role, StandardAgent, StandardAgentState};
