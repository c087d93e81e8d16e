mod emit_errors;
mod framework;
mod scripted;

pub use emit_errors::{EmitErrors, Hook};
pub use framework::{Framework, FrameworkError};
pub use scripted::{Behavior, CallCounter, ScriptedAgent};
