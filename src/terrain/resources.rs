use std::path::PathBuf;

use bevy::prelude::*;
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};

use crate::config::{ensure_positive, ensure_segments, ConfigError};
use crate::terrain::coloring::HeightPalette;
use crate::terrain::error::TerrainError;
use crate::terrain::noise::DEFAULT_OCTAVES;
use crate::terrain::raster::ElevationRaster;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainSource {
    Raster,
    #[default]
    Procedural,
}

/// Grid and post-processing settings shared by both elevation sources.
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub source: TerrainSource,
    pub raster_path: PathBuf,
    /// Extent along X of the raster terrain; Z follows the raster aspect ratio.
    pub world_size: f32,
    /// Quads per side of the raster terrain grid.
    pub segments: u32,
    pub max_height: f32,
    pub vertical_exaggeration: f32,
    /// Normalized border width that fades to zero height, `None` disables it.
    pub edge_fade_distance: Option<f32>,
    pub smoothing_kernel_radius: u32,
    pub palette: HeightPalette,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            source: TerrainSource::Procedural,
            raster_path: PathBuf::from("assets/dem/potrerillos-heightmap.png"),
            world_size: 80.0,
            segments: 256,
            max_height: 12.0,
            vertical_exaggeration: 1.0,
            edge_fade_distance: Some(0.05),
            smoothing_kernel_radius: 1,
            palette: HeightPalette::default(),
        }
    }
}

impl TerrainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_segments(self.segments)?;
        if let Some(d) = self.edge_fade_distance {
            if !(d > 0.0 && d <= 0.5) {
                return Err(ConfigError::EdgeFadeOutOfRange(d));
            }
        }
        ensure_positive("world_size", self.world_size)?;
        ensure_positive("max_height", self.max_height)?;
        ensure_positive("vertical_exaggeration", self.vertical_exaggeration)?;
        Ok(())
    }

    /// Highest height a raster sample can reach; colors normalize against it.
    pub fn peak_height(&self) -> f32 {
        self.max_height * self.vertical_exaggeration
    }
}

/// Closed-form valley shape. Absolute values are world units; `*_factor`
/// fields scale the valley's width or length.
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParameters {
    pub valley_length: f32,
    pub valley_width: f32,
    pub segments: u32,

    pub river_width: f32,
    pub river_depth: f32,

    pub wall_height: f32,
    pub slope_start: f32,
    /// Wall rise ends at `valley_width * valley_half_width_factor` from the axis.
    pub valley_half_width_factor: f32,

    pub roughness_scale: f32,
    pub roughness_offset: [f32; 2],
    /// Divisors applied to `(x, z)` before sampling the fBm.
    pub roughness_frequency: [f32; 2],
    pub roughness_inner_radius: f32,
    pub roughness_outer_radius: f32,
    pub roughness_octaves: usize,

    pub strata_amplitude: f32,
    pub strata_wavenumber: f32,
    pub strata_start: f32,
    pub strata_end: f32,

    pub basin_depth: f32,
    pub basin_transition_factor: f32,
    pub downstream_flatten_factor: f32,
}

impl Default for ShapeParameters {
    fn default() -> Self {
        Self {
            valley_length: 200.0,
            valley_width: 14.0,
            segments: 140,
            river_width: 1.2,
            river_depth: 0.3,
            wall_height: 3.2,
            slope_start: 1.5,
            valley_half_width_factor: 0.42,
            roughness_scale: 0.35,
            roughness_offset: [60.0, 40.0],
            roughness_frequency: [8.0, 6.0],
            roughness_inner_radius: 0.5,
            roughness_outer_radius: 2.5,
            roughness_octaves: DEFAULT_OCTAVES,
            strata_amplitude: 0.15,
            strata_wavenumber: 3.2,
            strata_start: 2.0,
            strata_end: 4.0,
            basin_depth: 1.85,
            basin_transition_factor: 0.22,
            downstream_flatten_factor: 0.18,
        }
    }
}

impl ShapeParameters {
    pub fn valley_half_width(&self) -> f32 {
        self.valley_width * self.valley_half_width_factor
    }

    pub fn basin_transition_length(&self) -> f32 {
        self.valley_length * self.basin_transition_factor
    }

    pub fn downstream_flatten_length(&self) -> f32 {
        self.valley_length * self.downstream_flatten_factor
    }

    /// Upper bound of the shaped height before exaggeration.
    pub fn peak_height(&self) -> f32 {
        self.wall_height + self.roughness_scale + self.strata_amplitude
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_segments(self.segments)?;
        ensure_positive("valley_length", self.valley_length)?;
        ensure_positive("valley_width", self.valley_width)?;
        ensure_positive("river_width", self.river_width)?;
        ensure_positive("roughness_frequency[0]", self.roughness_frequency[0])?;
        ensure_positive("roughness_frequency[1]", self.roughness_frequency[1])?;
        ensure_positive("basin_transition_factor", self.basin_transition_factor)?;
        ensure_positive("downstream_flatten_factor", self.downstream_flatten_factor)?;
        ensure_positive(
            "valley wall transition",
            self.valley_half_width() - self.slope_start,
        )?;
        ensure_positive(
            "roughness fade transition",
            self.roughness_outer_radius - self.roughness_inner_radius,
        )?;
        ensure_positive("strata fade transition", self.strata_end - self.strata_start)?;
        ensure_positive("peak height", self.peak_height())?;
        Ok(())
    }
}

/// Marks the spawned terrain mesh entity.
#[derive(Component)]
pub struct Terrain;

/// Result of a raster load running off the main thread.
pub type RasterLoadResult = Result<ElevationRaster, TerrainError>;

#[derive(Resource)]
pub struct PendingRasterLoad {
    pub rx: Receiver<RasterLoadResult>,
}

/// What the panel shows about the last terrain build.
#[derive(Resource, Default)]
pub struct TerrainStatus {
    pub loading: bool,
    pub active_source: Option<TerrainSource>,
    pub last_error: Option<String>,
    pub vertex_count: usize,
}

/// Asks the terrain systems to (re)build from the current configuration.
#[derive(Event)]
pub struct RebuildTerrainEvent;
