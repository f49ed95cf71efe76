use std::fmt;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dam::DamConfig;
use crate::terrain::{ShapeParameters, TerrainConfig};
use crate::water::WaterConfig;

pub const DEFAULT_SCENE_PATH: &str = "assets/scene.json";

/// Largest per-side grid resolution; keeps vertex indices inside `u32`.
pub const MAX_SEGMENTS: u32 = 4096;

/// Errors raised while loading or validating the scene configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A grid needs at least one segment per side.
    ZeroSegments,
    /// More segments per side than [`MAX_SEGMENTS`].
    TooManySegments(u32),
    /// Edge fade distance must lie in (0, 0.5].
    EdgeFadeOutOfRange(f32),
    /// A length, height or transition width that must be strictly positive.
    NonPositive { field: &'static str, value: f32 },
    /// The parallel wave arrays have different lengths.
    WaveArrayMismatch {
        amplitudes: usize,
        frequencies: usize,
        phase_speeds: usize,
        directions: usize,
    },
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroSegments => write!(f, "segment count must be at least 1"),
            ConfigError::TooManySegments(n) => {
                write!(f, "segment count {n} exceeds the maximum of {MAX_SEGMENTS}")
            }
            ConfigError::EdgeFadeOutOfRange(d) => {
                write!(f, "edge fade distance {d} is outside (0, 0.5]")
            }
            ConfigError::NonPositive { field, value } => {
                write!(f, "{field} must be greater than zero (got {value})")
            }
            ConfigError::WaveArrayMismatch {
                amplitudes,
                frequencies,
                phase_speeds,
                directions,
            } => write!(
                f,
                "wave arrays differ in length: {amplitudes} amplitudes, {frequencies} frequencies, \
                 {phase_speeds} phase speeds, {directions} directions"
            ),
            ConfigError::Io(e) => write!(f, "I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Fails with [`ConfigError::NonPositive`] unless `value > 0`.
pub fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Accepts `1..=MAX_SEGMENTS` segments per side.
pub fn ensure_segments(segments: u32) -> Result<(), ConfigError> {
    match segments {
        0 => Err(ConfigError::ZeroSegments),
        n if n > MAX_SEGMENTS => Err(ConfigError::TooManySegments(n)),
        _ => Ok(()),
    }
}

/// Everything the app reads at startup. Omitted keys keep their defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub terrain: TerrainConfig,
    pub valley: ShapeParameters,
    pub water: WaterConfig,
    pub dam: DamConfig,
}

impl SceneConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    /// Any other failure is returned.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Scene config {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.terrain.validate()?;
        self.valley.validate()?;
        self.water.validate()?;
        self.dam.profile.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainSource;

    #[test]
    fn defaults_are_valid() {
        SceneConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SceneConfig::from_json(
            r#"{ "terrain": { "segments": 64, "source": "raster" }, "water": { "height": 2.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.terrain.segments, 64);
        assert_eq!(config.terrain.source, TerrainSource::Raster);
        assert_eq!(config.terrain.max_height, TerrainConfig::default().max_height);
        assert_eq!(config.water.height, 2.0);
        assert_eq!(config.water.size_x, WaterConfig::default().size_x);
        assert_eq!(config.valley.river_depth, ShapeParameters::default().river_depth);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = SceneConfig::from_json(r#"{ "camera": { "fov": 55 }, "terrain": {} }"#).unwrap();
        assert_eq!(config.terrain.segments, TerrainConfig::default().segments);
    }

    #[test]
    fn zero_segments_fail_fast() {
        let err = SceneConfig::from_json(r#"{ "terrain": { "segments": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroSegments));
    }

    #[test]
    fn oversized_grids_are_rejected() {
        let err = SceneConfig::from_json(r#"{ "terrain": { "segments": 65536 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::TooManySegments(65536)));

        let err = SceneConfig::from_json(r#"{ "valley": { "segments": 70000 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::TooManySegments(70000)));

        let err = SceneConfig::from_json(r#"{ "water": { "segments_x": 5000 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::TooManySegments(5000)));

        assert!(ensure_segments(MAX_SEGMENTS).is_ok());
    }

    #[test]
    fn edge_fade_outside_range_is_rejected() {
        let err =
            SceneConfig::from_json(r#"{ "terrain": { "edge_fade_distance": 0.75 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::EdgeFadeOutOfRange(d) if d == 0.75));
    }

    #[test]
    fn zero_transition_length_is_rejected() {
        let err = SceneConfig::from_json(r#"{ "valley": { "basin_transition_factor": 0.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "basin_transition_factor", .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SceneConfig::from_json("{ terrain: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn shipped_scene_file_is_valid() {
        let config = SceneConfig::from_json(include_str!("../assets/scene.json")).unwrap();
        assert_eq!(config.water.waves().len(), 3);
        assert_eq!(config.dam.profile, crate::dam::profile::DamProfile::default());
    }

    #[test]
    fn bad_dam_profile_is_rejected() {
        let err = SceneConfig::from_json(r#"{ "dam": { "profile": { "length": -2.0 } } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "dam length", .. }));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = SceneConfig::load_or_default("does/not/exist/scene.json").unwrap();
        assert_eq!(config.terrain.segments, TerrainConfig::default().segments);
    }
}
