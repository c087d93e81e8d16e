mod error;
pub mod issue;
pub mod outcome;
pub mod space;

pub use error::ConfigError;
pub use issue::{Domain, Issue, IssueDefinition, IssueKind};
pub use outcome::{IssueValue, Outcome, Proposal};
pub use space::OutcomeSpace;
