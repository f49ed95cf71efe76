use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::mesh::{Indices, PrimitiveTopology},
};

use crate::terrain::coloring::HeightPalette;
use crate::terrain::heightfield::HeightGrid;
use crate::terrain::sampler::ElevationSampler;

/// Post-processing applied between sampling and meshing.
#[derive(Clone, Copy, Debug)]
pub struct PostProcess {
    pub smoothing_kernel_radius: u32,
    pub edge_fade_distance: Option<f32>,
}

/// Vertex buffers for a regular grid surface, ready to become a [`Mesh`].
#[derive(Clone, Debug, Default)]
pub struct TerrainMeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl TerrainMeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn into_mesh(self) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
        mesh.insert_indices(Indices::U32(self.indices));
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs);
        if !self.colors.is_empty() {
            mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, self.colors);
        }
        mesh
    }
}

/// Two counter-clockwise (seen from +Y) triangles per quad of a
/// `columns × rows` vertex grid.
pub fn grid_indices(columns: u32, rows: u32) -> Vec<u32> {
    let mut indices = Vec::with_capacity((columns as usize - 1) * (rows as usize - 1) * 6);
    for z in 0..rows - 1 {
        for x in 0..columns - 1 {
            let top_left = z * columns + x;
            let top_right = top_left + 1;
            let bottom_left = (z + 1) * columns + x;
            let bottom_right = bottom_left + 1;

            indices.extend_from_slice(&[top_left, bottom_left, top_right]);
            indices.extend_from_slice(&[top_right, bottom_left, bottom_right]);
        }
    }
    indices
}

/// Area-weighted average of adjacent face normals; vertices with no
/// usable face face up.
pub fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normal_sums = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let a = tri[0] as usize;
        let b = tri[1] as usize;
        let c = tri[2] as usize;

        let u = Vec3::from_array(positions[a]);
        let v = Vec3::from_array(positions[b]);
        let w = Vec3::from_array(positions[c]);

        let face_normal = (v - u).cross(w - u);

        normal_sums[a] += face_normal;
        normal_sums[b] += face_normal;
        normal_sums[c] += face_normal;
    }

    normal_sums
        .into_iter()
        .map(|sum| sum.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

/// Samples, smooths, fades, then meshes. Normals and colors come from the
/// final heights.
pub fn build_terrain_mesh(
    sampler: &dyn ElevationSampler,
    post: PostProcess,
    palette: &HeightPalette,
) -> TerrainMeshData {
    let mut grid = sampler.sample_grid();
    grid.smooth(post.smoothing_kernel_radius);
    if let Some(distance) = post.edge_fade_distance {
        grid.apply_edge_fade(distance);
    }
    mesh_from_grid(&grid, sampler, palette)
}

pub fn mesh_from_grid(
    grid: &HeightGrid,
    sampler: &dyn ElevationSampler,
    palette: &HeightPalette,
) -> TerrainMeshData {
    let side = grid.side() as u32;
    let segments = grid.segments() as f32;
    let peak = sampler.peak_height();
    let vertices = grid.heights().len();

    let mut data = TerrainMeshData {
        positions: Vec::with_capacity(vertices),
        colors: Vec::with_capacity(vertices),
        uvs: Vec::with_capacity(vertices),
        ..default()
    };

    for row in 0..side {
        for col in 0..side {
            let height = grid.get(col as usize, row as usize);
            let world = sampler.world_position(col, row);

            data.positions.push([world.x, height, world.y]);
            data.colors.push(palette.vertex_color(height, peak));
            data.uvs.push([col as f32 / segments, row as f32 / segments]);
        }
    }

    data.indices = grid_indices(side, side);
    data.normals = compute_vertex_normals(&data.positions, &data.indices);
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::raster::ElevationRaster;
    use crate::terrain::resources::{ShapeParameters, TerrainConfig};
    use crate::terrain::sampler::{ProceduralValley, RasterSampler};

    const NO_POST: PostProcess = PostProcess {
        smoothing_kernel_radius: 0,
        edge_fade_distance: None,
    };

    #[test]
    fn grid_indices_cover_every_quad() {
        let indices = grid_indices(3, 3);
        assert_eq!(indices.len(), 2 * 2 * 6);
        assert_eq!(&indices[..6], &[0, 3, 1, 1, 3, 4]);
        assert!(indices.iter().all(|&i| i < 9));
    }

    #[test]
    fn flat_raster_builds_flat_low_terrain() {
        let raster = ElevationRaster::new(3, 3, vec![128; 9]).unwrap();
        let config = TerrainConfig {
            segments: 2,
            ..TerrainConfig::default()
        };
        let sampler = RasterSampler::new(&raster, &config);
        let palette = HeightPalette::default();
        let data = build_terrain_mesh(&sampler, NO_POST, &palette);

        assert_eq!(data.vertex_count(), 9);
        for p in &data.positions {
            assert_eq!(p[1], 0.0);
        }
        let low = [palette.low[0], palette.low[1], palette.low[2], 1.0];
        assert!(data.colors.iter().all(|c| *c == low));
        for n in &data.normals {
            assert!((Vec3::from_array(*n) - Vec3::Y).length() < 1e-6, "normal {n:?}");
        }
    }

    #[test]
    fn normals_follow_the_final_heights() {
        // A slope rising along +X should tilt normals toward -X.
        let grid = HeightGrid::from_fn(4, |col, _| col as f32);
        let params = ShapeParameters {
            segments: 4,
            valley_length: 4.0,
            valley_width: 4.0,
            ..ShapeParameters::default()
        };
        let sampler = ProceduralValley::new(&params, 1.0);
        let data = mesh_from_grid(&grid, &sampler, &HeightPalette::default());
        let expected = Vec3::new(-1.0, 1.0, 0.0).normalize();
        for n in &data.normals {
            assert!((Vec3::from_array(*n) - expected).length() < 1e-5, "normal {n:?}");
        }
    }

    #[test]
    fn edge_fade_runs_before_normals_and_colors() {
        let raster = ElevationRaster::new(2, 1, vec![0, 255]).unwrap();
        let config = TerrainConfig {
            segments: 8,
            ..TerrainConfig::default()
        };
        let sampler = RasterSampler::new(&raster, &config);
        let post = PostProcess {
            smoothing_kernel_radius: 1,
            edge_fade_distance: Some(0.25),
        };
        let data = build_terrain_mesh(&sampler, post, &HeightPalette::default());
        let side = 9;
        for row in 0..side {
            for col in 0..side {
                let p = data.positions[row * side + col];
                if row == 0 || col == 0 || row == side - 1 || col == side - 1 {
                    assert_eq!(p[1], 0.0);
                }
            }
        }
        assert!(data.normals.iter().all(|n| n[1] > 0.0));
    }

    #[test]
    fn into_mesh_carries_all_attributes() {
        let raster = ElevationRaster::new(2, 2, vec![0, 50, 100, 200]).unwrap();
        let config = TerrainConfig {
            segments: 3,
            ..TerrainConfig::default()
        };
        let sampler = RasterSampler::new(&raster, &config);
        let mesh = build_terrain_mesh(&sampler, NO_POST, &HeightPalette::default()).into_mesh();
        assert_eq!(mesh.count_vertices(), 16);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
        assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_some());
        assert_eq!(mesh.indices().map(|i| i.len()), Some(3 * 3 * 6));
    }
}
