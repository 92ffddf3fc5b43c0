//! Mode selection: maps an analysis result onto a rendering mode.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete rendering mode of the backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherMode {
    Clear,
    Windy,
    Rain,
    /// Rain plus lightning. [`select_mode`] never produces it; it is only
    /// reachable through a preview override.
    Storm,
    Snow,
    Leaves,
    Fog,
}

impl WeatherMode {
    pub const ALL: [WeatherMode; 7] = [
        WeatherMode::Clear,
        WeatherMode::Windy,
        WeatherMode::Rain,
        WeatherMode::Storm,
        WeatherMode::Snow,
        WeatherMode::Leaves,
        WeatherMode::Fog,
    ];

    /// Wind streak layer.
    pub fn draws_wind(self) -> bool {
        matches!(self, WeatherMode::Windy | WeatherMode::Storm | WeatherMode::Clear)
    }

    /// Ambient fog bank layer.
    pub fn draws_fog(self) -> bool {
        matches!(self, WeatherMode::Fog | WeatherMode::Rain)
    }

    /// Sun rays and sun glow.
    pub fn draws_sun_rays(self) -> bool {
        self == WeatherMode::Clear
    }

    /// Lightning, both spontaneous and click-triggered.
    pub fn has_lightning(self) -> bool {
        self == WeatherMode::Storm
    }

    pub fn name(self) -> &'static str {
        match self {
            WeatherMode::Clear => "clear",
            WeatherMode::Windy => "windy",
            WeatherMode::Rain => "rain",
            WeatherMode::Storm => "storm",
            WeatherMode::Snow => "snow",
            WeatherMode::Leaves => "leaves",
            WeatherMode::Fog => "fog",
        }
    }
}

impl fmt::Display for WeatherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A mode together with the intensity that scales its particle count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSelection {
    pub mode: WeatherMode,
    pub intensity: u32,
}

impl ModeSelection {
    pub const fn new(mode: WeatherMode, intensity: u32) -> Self {
        Self { mode, intensity }
    }

    /// Size of the mode-specific particle pool, `floor(intensity * 4)`.
    pub fn particle_count(&self) -> usize {
        particle_count(self.intensity)
    }
}

impl Default for ModeSelection {
    fn default() -> Self {
        FALLBACK
    }
}

/// Below this temperature (°C) a winter season snows instead of fogging.
pub const FREEZING_THRESHOLD_C: f64 = 5.0;
/// Above this rain probability (%) a spring season rains.
pub const SPRING_RAIN_THRESHOLD: f64 = 50.0;

const FALLBACK: ModeSelection = ModeSelection::new(WeatherMode::Windy, 30);

/// Pool size for an intensity.
pub fn particle_count(intensity: u32) -> usize {
    (f64::from(intensity) * 4.0).floor() as usize
}

/// Pick the rendering mode for an analysis result.
///
/// `season` is matched case-insensitively by substring and the first matching
/// row wins, so "Post-Monsoon" is caught by the monsoon row before the dry
/// one. Unknown or missing text falls through to windy. A missing rain
/// probability counts as "not above the spring threshold".
pub fn select_mode(
    season: Option<&str>,
    temperature: Option<f64>,
    rain_probability: Option<f64>,
) -> ModeSelection {
    let season = season.map(str::to_lowercase).unwrap_or_default();
    let mentions = |keys: &[&str]| keys.iter().any(|k| season.contains(k));

    if mentions(&["winter", "polar"]) {
        return match temperature {
            Some(t) if t < FREEZING_THRESHOLD_C => ModeSelection::new(WeatherMode::Snow, 45),
            _ => ModeSelection::new(WeatherMode::Fog, 35),
        };
    }
    if mentions(&["summer", "midnight"]) {
        return ModeSelection::new(WeatherMode::Clear, 25);
    }
    if mentions(&["autumn", "fall"]) {
        return ModeSelection::new(WeatherMode::Leaves, 40);
    }
    if mentions(&["spring"]) {
        return match rain_probability {
            Some(p) if p > SPRING_RAIN_THRESHOLD => ModeSelection::new(WeatherMode::Rain, 40),
            _ => ModeSelection::new(WeatherMode::Windy, 30),
        };
    }
    if mentions(&["monsoon", "wet"]) {
        return ModeSelection::new(WeatherMode::Rain, 45);
    }
    if mentions(&["dry", "post-monsoon", "hot"]) {
        return ModeSelection::new(WeatherMode::Windy, 30);
    }
    FALLBACK
}
