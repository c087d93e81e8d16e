/// Errors raised while building issues, outcome spaces or curves on top of them.
/// These are detected before any negotiation starts.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Discrete issue '{0}' must have a non-empty list of 'values'.")]
    EmptyDomain(String),
    #[error("Discrete issue '{issue}' declares value '{value}' more than once.")]
    DuplicateValue { issue: String, value: String },
    #[error("Continuous issue '{0}' must have min_value and max_value.")]
    MissingBounds(String),
    #[error("Continuous issue '{name}' has invalid bounds [{min}, {max}].")]
    InvalidBounds { name: String, min: f64, max: f64 },
    #[error("Issue '{0}' declared more than once.")]
    DuplicateIssue(String),
    #[error("Issue '{0}' not found in outcome space.")]
    UnknownIssue(String),
    #[error("Issue '{0}' is not continuous.")]
    NotContinuous(String),
}
