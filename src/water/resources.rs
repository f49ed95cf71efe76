use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{ensure_positive, ensure_segments, ConfigError};
use crate::water::surface::Wave;

/// Reservoir surface settings. Wave parameters are parallel arrays, one
/// entry per traveling wave.
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    pub enabled: bool,
    pub animate: bool,
    pub size_x: f32,
    pub size_z: f32,
    /// Rest level of the surface in world units.
    pub height: f32,
    pub center_x: f32,
    pub center_z: f32,
    pub segments_x: u32,
    pub segments_z: u32,
    pub wave_amplitudes: Vec<f32>,
    pub wave_frequencies: Vec<f32>,
    pub wave_phase_speeds: Vec<f32>,
    /// Not normalized: `(1, 1)` advances along the diagonal with frequency
    /// applied to `x + z`.
    pub wave_directions: Vec<[f32; 2]>,
    /// sRGB with alpha.
    pub color: [f32; 4],
    /// Outline traced just above the rest level.
    pub show_border: bool,
    pub show_level_sensor: bool,
    /// Z of the level sensor buoy; X sits 2.5 upstream of the downstream edge.
    pub level_sensor_z: f32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            animate: true,
            size_x: 22.0,
            size_z: 11.0,
            height: 1.5,
            // Downstream edge sits against the dam's upstream face.
            center_x: 2.15 - 11.0,
            center_z: 0.0,
            segments_x: 80,
            segments_z: 56,
            wave_amplitudes: vec![0.04, 0.025, 0.015],
            wave_frequencies: vec![0.4, 0.25, 0.18],
            wave_phase_speeds: vec![0.25, 0.3, 0.18],
            wave_directions: vec![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
            color: [0.118, 0.353, 0.62, 0.75],
            show_border: true,
            show_level_sensor: true,
            // A quarter of the default dam length.
            level_sensor_z: 2.0,
        }
    }
}

impl WaterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_segments(self.segments_x)?;
        ensure_segments(self.segments_z)?;
        ensure_positive("water size_x", self.size_x)?;
        ensure_positive("water size_z", self.size_z)?;

        let n = self.wave_amplitudes.len();
        if self.wave_frequencies.len() != n
            || self.wave_phase_speeds.len() != n
            || self.wave_directions.len() != n
        {
            return Err(ConfigError::WaveArrayMismatch {
                amplitudes: n,
                frequencies: self.wave_frequencies.len(),
                phase_speeds: self.wave_phase_speeds.len(),
                directions: self.wave_directions.len(),
            });
        }
        Ok(())
    }

    pub fn waves(&self) -> Vec<Wave> {
        self.wave_amplitudes
            .iter()
            .zip(&self.wave_frequencies)
            .zip(&self.wave_phase_speeds)
            .zip(&self.wave_directions)
            .map(|(((&amplitude, &frequency), &phase_speed), &[dx, dz])| Wave {
                amplitude,
                frequency,
                phase_speed,
                direction: Vec2::new(dx, dz),
            })
            .collect()
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.size_x, self.size_z)
    }

    pub fn segments(&self) -> UVec2 {
        UVec2::new(self.segments_x, self.segments_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_waves_are_subtle() {
        let waves = WaterConfig::default().waves();
        assert_eq!(waves.len(), 3);
        assert!(waves.iter().all(|w| (0.01..=0.04).contains(&w.amplitude)));
    }

    #[test]
    fn mismatched_wave_arrays_are_rejected() {
        let config = WaterConfig {
            wave_frequencies: vec![0.4],
            ..WaterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WaveArrayMismatch { amplitudes: 3, frequencies: 1, .. })
        ));
    }

    #[test]
    fn zero_water_segments_are_rejected() {
        let config = WaterConfig {
            segments_z: 0,
            ..WaterConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroSegments)));
    }
}
