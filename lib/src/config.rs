use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    bodies::CatalogOptions,
    error::{LayoutError, Result},
};

/// Simulated days per second of wall time.
pub const DEFAULT_DAYS_PER_SECOND: f64 = 1.0;
pub const DEFAULT_TRANSITION_SECONDS: f64 = 2.0;
const MAX_TRANSITION_SECONDS: f64 = 10.0;
/// A century per second.
pub const MAX_DAYS_PER_SECOND: f64 = 36_525.0;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub days_per_second: f64,
    /// How long a renderer should take to animate a scale toggle.
    pub transition_seconds: f64,
    pub include_pluto: bool,
    pub use_ephemeris: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            days_per_second: DEFAULT_DAYS_PER_SECOND,
            transition_seconds: DEFAULT_TRANSITION_SECONDS,
            include_pluto: false,
            use_ephemeris: true,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=MAX_DAYS_PER_SECOND).contains(&self.days_per_second) {
            return Err(LayoutError::InvalidConfig(
                "days_per_second must be in [0, 36525]",
            ));
        }
        if !self.transition_seconds.is_finite()
            || self.transition_seconds <= 0.0
            || self.transition_seconds > MAX_TRANSITION_SECONDS
        {
            return Err(LayoutError::InvalidConfig(
                "transition_seconds must be in (0, 10]",
            ));
        }
        Ok(())
    }

    pub fn transition(&self) -> Duration {
        Duration::seconds_f64(self.transition_seconds)
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            include_pluto: self.include_pluto,
            use_ephemeris: self.use_ephemeris,
        }
    }
}
