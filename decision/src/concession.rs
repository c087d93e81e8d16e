use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Personality of the negotiator. Determines how fast it gives up its utility.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcessionStyle {
    /// Tough. Stays near start utility and concedes steeply close to the deadline.
    #[display(fmt = "boulware")]
    Boulware,
    #[display(fmt = "linear")]
    Linear,
    /// Soft. Drops most of the way early.
    #[display(fmt = "conceder")]
    Conceder,
}

impl ConcessionStyle {
    pub fn beta(self) -> f64 {
        match self {
            ConcessionStyle::Boulware => 5.0,
            ConcessionStyle::Linear => 1.0,
            ConcessionStyle::Conceder => 0.2,
        }
    }
}

impl Default for ConcessionStyle {
    fn default() -> Self {
        ConcessionStyle::Linear
    }
}

/// Time-dependent aspiration curve:
/// `target = start + (reservation - start) * progress^beta`, never below reservation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConcessionStrategy {
    style: ConcessionStyle,
    start_utility: f64,
    reservation_value: f64,
}

impl ConcessionStrategy {
    pub fn new(
        style: ConcessionStyle,
        start_utility: f64,
        reservation_value: f64,
    ) -> ConcessionStrategy {
        ConcessionStrategy {
            style,
            start_utility,
            reservation_value,
        }
    }

    pub fn style(&self) -> ConcessionStyle {
        self.style
    }

    pub fn start_utility(&self) -> f64 {
        self.start_utility
    }

    pub fn reservation_value(&self) -> f64 {
        self.reservation_value
    }

    /// Aspiration level for `progress` in `[0, 1]`. Values outside are clamped.
    pub fn target_utility(&self, progress: f64) -> f64 {
        let t = progress.clamp(0.0, 1.0);
        let target = self.start_utility
            + (self.reservation_value - self.start_utility) * t.powf(self.style.beta());
        target.max(self.reservation_value)
    }
}
