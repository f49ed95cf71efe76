use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::mesh::{Indices, PrimitiveTopology},
};

use crate::terrain::mesh::{compute_vertex_normals, grid_indices};

/// One traveling sinusoid: `amplitude * sin(frequency * (direction · p) + phase_speed * t)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wave {
    pub amplitude: f32,
    pub frequency: f32,
    pub phase_speed: f32,
    pub direction: Vec2,
}

impl Wave {
    /// The phase is evaluated in `f64` so long sessions keep sub-frame resolution.
    pub fn height(&self, x: f32, z: f32, time: f64) -> f32 {
        let along = self.direction.dot(Vec2::new(x, z)) as f64;
        let phase = self.frequency as f64 * along + self.phase_speed as f64 * time;
        self.amplitude * phase.sin() as f32
    }
}

/// Surface offset at local `(x, z)` after `time` seconds.
pub fn wave_height(waves: &[Wave], x: f32, z: f32, time: f64) -> f32 {
    waves.iter().map(|w| w.height(x, z, time)).sum()
}

/// Animated reservoir grid. Owns its vertex buffers; the mesh asset is a
/// copy refreshed after every tick.
#[derive(Component, Debug)]
pub struct WaterSurface {
    waves: Vec<Wave>,
    elapsed: f64,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

impl WaterSurface {
    /// Grid of `(segments.x + 1) × (segments.y + 1)` vertices centered on the origin.
    pub fn new(size: Vec2, segments: UVec2, waves: Vec<Wave>) -> Self {
        let columns = segments.x + 1;
        let rows = segments.y + 1;

        let vertices = columns as usize * rows as usize;
        let mut positions = Vec::with_capacity(vertices);
        let mut uvs = Vec::with_capacity(vertices);
        for row in 0..rows {
            for col in 0..columns {
                let u = col as f32 / segments.x as f32;
                let v = row as f32 / segments.y as f32;
                positions.push([(u - 0.5) * size.x, 0.0, (v - 0.5) * size.y]);
                uvs.push([u, v]);
            }
        }

        let mut surface = Self {
            waves,
            elapsed: 0.0,
            positions,
            normals: Vec::new(),
            uvs,
            indices: grid_indices(columns, rows),
        };
        surface.update_vertices();
        surface
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    /// Advances the clock by `dt` seconds and reshapes the surface.
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt as f64;
        self.update_vertices();
    }

    /// Restarts the animation from `t = 0`.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.update_vertices();
    }

    pub fn set_waves(&mut self, waves: Vec<Wave>) {
        self.waves = waves;
        self.update_vertices();
    }

    // All heights first, then normals from the finished positions.
    fn update_vertices(&mut self) {
        let time = self.elapsed;
        for p in &mut self.positions {
            p[1] = wave_height(&self.waves, p[0], p[2], time);
        }
        self.normals = compute_vertex_normals(&self.positions, &self.indices);
    }

    pub fn build_mesh(&self) -> Mesh {
        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
        );
        mesh.insert_indices(Indices::U32(self.indices.clone()));
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs.clone());
        self.write_to_mesh(&mut mesh);
        mesh
    }

    pub fn write_to_mesh(&self, mesh: &mut Mesh) {
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions.clone());
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::water::WaterConfig;

    fn surface() -> WaterSurface {
        let config = WaterConfig::default();
        WaterSurface::new(Vec2::new(22.0, 11.0), UVec2::new(16, 8), config.waves())
    }

    #[test]
    fn wave_height_is_deterministic() {
        let waves = WaterConfig::default().waves();
        let a = wave_height(&waves, 3.25, -1.5, 12.0);
        let b = wave_height(&waves, 3.25, -1.5, 12.0);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn independent_surfaces_agree_at_the_same_time() {
        let mut stepped = surface();
        for _ in 0..10 {
            stepped.tick(0.5);
        }
        let mut jumped = surface();
        jumped.tick(5.0);

        assert!((stepped.elapsed() - jumped.elapsed()).abs() < 1e-6);
        for (a, b) in stepped.positions().iter().zip(jumped.positions()) {
            assert!((a[1] - b[1]).abs() < 1e-5);
        }
    }

    #[test]
    fn heights_match_the_closed_form() {
        let mut s = surface();
        s.tick(2.0);
        for p in s.positions() {
            assert_eq!(p[1], wave_height(s.waves(), p[0], p[2], 2.0));
        }
    }

    #[test]
    fn amplitude_bounds_the_surface() {
        let mut s = surface();
        let bound: f32 = s.waves().iter().map(|w| w.amplitude.abs()).sum();
        for _ in 0..20 {
            s.tick(0.37);
            assert!(s.positions().iter().all(|p| p[1].abs() <= bound + 1e-6));
        }
    }

    #[test]
    fn reset_restarts_the_animation() {
        let fresh = surface();
        let mut s = surface();
        s.tick(3.0);
        s.reset();
        assert_eq!(s.elapsed(), 0.0);
        assert_eq!(s.positions(), fresh.positions());
    }

    #[test]
    fn normals_are_recomputed_each_tick() {
        let mut s = surface();
        s.tick(1.0);
        let expected = compute_vertex_normals(s.positions(), &s.indices);
        assert_eq!(s.normals(), expected.as_slice());
        assert!(s.normals().iter().all(|n| n[1] > 0.9));
    }

    #[test]
    fn still_water_is_flat() {
        let mut s = WaterSurface::new(Vec2::splat(4.0), UVec2::splat(4), Vec::new());
        s.tick(10.0);
        assert!(s.positions().iter().all(|p| p[1] == 0.0));
        assert!(s.normals().iter().all(|n| *n == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn clock_keeps_frame_resolution_after_hours() {
        let mut s = surface();
        s.tick(36_000.0);
        let before = s.elapsed();
        let frame = 1.0f32 / 60.0;
        s.tick(frame);
        assert!((s.elapsed() - before - frame as f64).abs() < 1e-9);

        let waves = s.waves().to_vec();
        let a = wave_height(&waves, 1.0, 2.0, 36_000.0);
        let b = wave_height(&waves, 1.0, 2.0, 36_000.0 + 1.0 / 60.0);
        assert_ne!(a, b, "one frame must still move the surface");
    }

    #[test]
    fn mesh_matches_the_grid() {
        let s = surface();
        let mesh = s.build_mesh();
        assert_eq!(mesh.count_vertices(), 17 * 9);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(16 * 8 * 6));
    }
}
