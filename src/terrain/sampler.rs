use bevy::math::Vec2;
use noise::NoiseFn;

use crate::terrain::heightfield::HeightGrid;
use crate::terrain::noise::{smooth_step, ValueFbm};
use crate::terrain::raster::ElevationRaster;
use crate::terrain::resources::{ShapeParameters, TerrainConfig};

/// A source of raw heights for every vertex of a square terrain grid.
pub trait ElevationSampler {
    /// Quads per side.
    fn segments(&self) -> u32;

    /// World extent of the grid along X and Z.
    fn extent(&self) -> Vec2;

    /// Height in world units at grid vertex `(col, row)`.
    fn sample(&self, col: u32, row: u32) -> f32;

    /// Largest height the sampler is meant to produce; colors normalize by it.
    fn peak_height(&self) -> f32;

    /// World `(x, z)` of a grid vertex, centered on the origin.
    fn world_position(&self, col: u32, row: u32) -> Vec2 {
        let extent = self.extent();
        let segments = self.segments() as f32;
        Vec2::new(
            (col as f32 / segments - 0.5) * extent.x,
            (row as f32 / segments - 0.5) * extent.y,
        )
    }

    fn sample_grid(&self) -> HeightGrid {
        HeightGrid::from_fn(self.segments(), |col, row| self.sample(col, row))
    }
}

/// Nearest-pixel lookup into a normalized raster.
pub struct RasterSampler<'a> {
    raster: &'a ElevationRaster,
    segments: u32,
    world_size: f32,
    height_scale: f32,
}

impl<'a> RasterSampler<'a> {
    pub fn new(raster: &'a ElevationRaster, config: &TerrainConfig) -> Self {
        Self {
            raster,
            segments: config.segments,
            world_size: config.world_size,
            height_scale: config.peak_height(),
        }
    }
}

impl ElevationSampler for RasterSampler<'_> {
    fn segments(&self) -> u32 {
        self.segments
    }

    fn extent(&self) -> Vec2 {
        Vec2::new(self.world_size, self.world_size * self.raster.aspect_ratio())
    }

    fn sample(&self, col: u32, row: u32) -> f32 {
        let ix = (col as u64 * self.raster.width() as u64 / self.segments as u64) as u32;
        let iy = (row as u64 * self.raster.height() as u64 / self.segments as u64) as u32;
        self.raster.normalized(ix, iy) * self.height_scale
    }

    fn peak_height(&self) -> f32 {
        self.height_scale
    }
}

/// Closed-form valley: V channel, smoothstep walls, fBm roughness, strata
/// ripples, an upstream basin (x < 0) and a flattened floor downstream (x > 0).
pub struct ProceduralValley<'a> {
    params: &'a ShapeParameters,
    roughness: ValueFbm,
    exaggeration: f32,
}

impl<'a> ProceduralValley<'a> {
    pub fn new(params: &'a ShapeParameters, exaggeration: f32) -> Self {
        Self {
            params,
            roughness: ValueFbm {
                octaves: params.roughness_octaves,
            },
            exaggeration,
        }
    }

    /// Shaped height at world `(x, z)` before exaggeration.
    pub fn shape_height(&self, x: f32, z: f32) -> f32 {
        let p = self.params;
        let dist = z.abs();

        let channel_cut = p.river_depth * (1.0 - dist / p.river_width).max(0.0);
        let wall_rise = p.wall_height * smooth_step(p.slope_start, p.valley_half_width(), dist);

        let [off_x, off_z] = p.roughness_offset;
        let [scale_x, scale_z] = p.roughness_frequency;
        let roughness = p.roughness_scale
            * self.roughness.get([
                ((x + off_x) / scale_x) as f64,
                ((z + off_z) / scale_z) as f64,
            ]) as f32
            * smooth_step(p.roughness_inner_radius, p.roughness_outer_radius, dist);

        let strata = p.strata_amplitude
            * (dist * p.strata_wavenumber).sin()
            * smooth_step(p.strata_start, p.strata_end, dist);

        let mut h = wall_rise + roughness + strata - channel_cut;

        h -= p.basin_depth * smooth_step(0.0, p.basin_transition_length(), -x);
        h -= (wall_rise + roughness - channel_cut * 0.5)
            * smooth_step(0.0, p.downstream_flatten_length(), x);

        h
    }
}

impl ElevationSampler for ProceduralValley<'_> {
    fn segments(&self) -> u32 {
        self.params.segments
    }

    fn extent(&self) -> Vec2 {
        Vec2::new(self.params.valley_length, self.params.valley_width)
    }

    fn sample(&self, col: u32, row: u32) -> f32 {
        let pos = self.world_position(col, row);
        self.shape_height(pos.x, pos.y) * self.exaggeration
    }

    fn peak_height(&self) -> f32 {
        self.params.peak_height() * self.exaggeration
    }
}
