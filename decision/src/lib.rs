pub mod concession;
pub mod meso;
pub mod pareto;
pub mod utility;

pub use concession::{ConcessionStrategy, ConcessionStyle};
pub use meso::{MesoConfig, MesoGenerator, MesoMethod};
pub use pareto::{dominates, frontier_outcomes, pareto_frontier};
pub use utility::{IssueCurve, LinearAdditiveUtility, UtilityFunction, ValueFunction};
