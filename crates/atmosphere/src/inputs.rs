//! Analysis result consumed by the backdrop.

use crate::mode::{select_mode, ModeSelection};
use serde::{Deserialize, Serialize};

/// Analysis fields handed to the visualizer by the upstream collaborator.
/// Field names follow the analysis payload (`rainProbability`, `hourlyData`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisInputs {
    /// Chance of rain in percent. `None` keeps the backdrop blank.
    pub rain_probability: Option<f64>,
    /// Expected temperature in °C.
    pub temperature: Option<f64>,
    /// Expected precipitation in mm. Accepted, not used for mode selection.
    pub precipitation: Option<f64>,
    /// Free-text season label, e.g. "Deep Winter" or "Monsoon".
    pub season: Option<String>,
    /// Hour-by-hour breakdown. Accepted, not used for mode selection.
    pub hourly_data: Option<Vec<HourlyPoint>>,
}

/// One entry of the hour-by-hour breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyPoint {
    pub hour: Option<u32>,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub humidity: Option<f64>,
}

impl AnalysisInputs {
    /// The subset of fields whose change rebuilds the world.
    pub fn driving(&self) -> DrivingInputs {
        DrivingInputs {
            season: self.season.clone(),
            temperature: self.temperature,
            rain_probability: self.rain_probability,
        }
    }
}

/// Season, temperature and rain probability: the inputs a world is built from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrivingInputs {
    pub season: Option<String>,
    pub temperature: Option<f64>,
    pub rain_probability: Option<f64>,
}

impl DrivingInputs {
    /// A world only exists once a rain probability is known.
    pub fn is_active(&self) -> bool {
        self.rain_probability.is_some()
    }

    pub fn selection(&self) -> ModeSelection {
        select_mode(self.season.as_deref(), self.temperature, self.rain_probability)
    }
}

/// Bitwise comparison so a NaN reading does not count as a change every frame.
impl PartialEq for DrivingInputs {
    fn eq(&self, other: &Self) -> bool {
        fn same(a: Option<f64>, b: Option<f64>) -> bool {
            a.map(f64::to_bits) == b.map(f64::to_bits)
        }
        self.season == other.season
            && same(self.temperature, other.temperature)
            && same(self.rain_probability, other.rain_probability)
    }
}

impl From<&AnalysisInputs> for DrivingInputs {
    fn from(inputs: &AnalysisInputs) -> Self {
        inputs.driving()
    }
}
