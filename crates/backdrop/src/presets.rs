//! Built-in analyses bound to the number keys.

use atmosphere::AnalysisInputs;

/// (label, season, temperature °C, rain probability %)
const PRESETS: [(&str, &str, f64, Option<f64>); 7] = [
    ("winter", "Deep Winter", 2.0, Some(70.0)),
    ("summer", "Summer", 31.0, Some(10.0)),
    ("autumn", "Autumn", 12.0, Some(35.0)),
    ("wet spring", "Spring", 14.0, Some(70.0)),
    ("dry spring", "Spring", 18.0, Some(20.0)),
    ("monsoon", "Monsoon", 28.0, Some(90.0)),
    ("no data", "Summer", 25.0, None),
];

pub fn count() -> usize {
    PRESETS.len()
}

/// Preset `index` (0-based) as a label and the analysis it feeds.
pub fn preset(index: usize) -> Option<(&'static str, AnalysisInputs)> {
    let (label, season, temperature, rain_probability) = *PRESETS.get(index)?;
    Some((
        label,
        AnalysisInputs {
            rain_probability,
            temperature: Some(temperature),
            season: Some(season.to_string()),
            ..Default::default()
        },
    ))
}
