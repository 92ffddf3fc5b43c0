//! Backdrop configuration (window, pacing, preview). Loaded from backdrop.ron at startup.

use atmosphere::{AnalysisInputs, ModeSelection, WeatherMode};
use engine_core::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent backdrop settings. Loaded from `backdrop.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackdropConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_true")]
    pub vsync: bool,
    #[serde(default)]
    pub fullscreen: bool,
    /// Frame rate cap in Hz. Zero or negative removes the cap.
    #[serde(default = "default_fps_limit")]
    pub fps_limit: f64,
    /// Opacity of the whole backdrop layer.
    #[serde(default = "default_layer_opacity")]
    pub layer_opacity: f32,
    /// Clear color behind the layer, RGBA in 0..1.
    #[serde(default = "default_background")]
    pub background: [f32; 4],
    /// Fixed seed for reproducible worlds.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Preview a mode and intensity regardless of the inputs.
    #[serde(default)]
    pub force_mode: Option<(WeatherMode, u32)>,
    /// Analysis shown at startup.
    #[serde(default = "default_inputs")]
    pub inputs: AnalysisInputs,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_fps_limit() -> f64 {
    60.0
}
fn default_layer_opacity() -> f32 {
    0.75
}
fn default_background() -> [f32; 4] {
    [0.04, 0.06, 0.1, 1.0]
}
fn default_inputs() -> AnalysisInputs {
    AnalysisInputs {
        rain_probability: Some(70.0),
        temperature: Some(2.0),
        season: Some("Deep Winter".to_string()),
        ..Default::default()
    }
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync: default_true(),
            fullscreen: false,
            fps_limit: default_fps_limit(),
            layer_opacity: default_layer_opacity(),
            background: default_background(),
            seed: None,
            force_mode: None,
            inputs: default_inputs(),
        }
    }
}

impl BackdropConfig {
    /// Load config from `backdrop.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => Self::parse(&data).unwrap_or_else(|e| {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("No config at {:?} ({}), using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    pub fn preview(&self) -> Option<ModeSelection> {
        self.force_mode
            .map(|(mode, intensity)| ModeSelection::new(mode, intensity))
    }

    pub fn background_color(&self) -> Color {
        let [r, g, b, a] = self.background;
        Color::new(r, g, b, a)
    }

    /// Frame cap for [`engine_core::Time::set_frame_limit`].
    pub fn frame_limit(&self) -> Option<f64> {
        (self.fps_limit > 0.0).then_some(self.fps_limit)
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("backdrop.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_background_layer() {
        let c = BackdropConfig::default();
        assert_eq!(c.fps_limit, 60.0);
        assert_eq!(c.layer_opacity, 0.75);
        assert_eq!(c.frame_limit(), Some(60.0));
        assert_eq!(c.preview(), None);
        assert_eq!(c.inputs.driving().selection(), ModeSelection::new(WeatherMode::Snow, 45));
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(BackdropConfig::parse("()").expect("empty struct"), BackdropConfig::default());
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let c = BackdropConfig::parse(
            r#"(
                fps_limit: 0.0,
                seed: Some(7),
                force_mode: Some((Storm, 45)),
                inputs: (season: Some("Monsoon"), rainProbability: Some(80.0)),
            )"#,
        )
        .expect("valid config");
        assert_eq!(c.window_width, 1280);
        assert_eq!(c.frame_limit(), None);
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.preview(), Some(ModeSelection::new(WeatherMode::Storm, 45)));
        assert_eq!(c.inputs.season.as_deref(), Some("Monsoon"));
        assert_eq!(c.inputs.temperature, None);
    }

    #[test]
    fn invalid_or_missing_file_falls_back() {
        assert!(BackdropConfig::parse("(fps_limit: \"fast\")").is_err());
        let missing = std::env::temp_dir().join("backdrop-config-that-does-not-exist.ron");
        assert_eq!(BackdropConfig::load_from(&missing), BackdropConfig::default());
    }
}
