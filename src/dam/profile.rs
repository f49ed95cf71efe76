use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::mesh::{Indices, PrimitiveTopology},
};
use serde::{Deserialize, Serialize};

use crate::config::{ensure_positive, ConfigError};

/// Cross-section of an embankment dam, extruded along Z.
///
/// The profile runs upstream toe `(0, 0)`, upstream crest edge
/// `(run_up, H)`, downstream crest edge `(run_up + crest, H)`, downstream
/// toe `(run_up + crest + run_down, 0)`. Slopes are horizontal run per unit
/// of height.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamProfile {
    pub height: f32,
    pub crest_width: f32,
    pub upstream_slope: f32,
    pub downstream_slope: f32,
    pub length: f32,
}

impl Default for DamProfile {
    fn default() -> Self {
        Self {
            height: 2.0,
            crest_width: 0.55,
            upstream_slope: 1.45,
            downstream_slope: 1.7,
            length: 8.0,
        }
    }
}

/// Dam placement and decoration switches.
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DamConfig {
    pub profile: DamProfile,
    /// World X of the upstream toe.
    pub offset_x: f32,
    pub show_piezometers: bool,
}

impl Default for DamConfig {
    fn default() -> Self {
        Self {
            profile: DamProfile::default(),
            offset_x: 0.0,
            show_piezometers: true,
        }
    }
}

impl DamProfile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("dam height", self.height)?;
        ensure_positive("dam crest_width", self.crest_width)?;
        ensure_positive("dam upstream_slope", self.upstream_slope)?;
        ensure_positive("dam downstream_slope", self.downstream_slope)?;
        ensure_positive("dam length", self.length)
    }

    pub fn run_up(&self) -> f32 {
        self.upstream_slope * self.height
    }

    pub fn run_down(&self) -> f32 {
        self.downstream_slope * self.height
    }

    pub fn base_width(&self) -> f32 {
        self.run_up() + self.crest_width + self.run_down()
    }

    /// The four profile corners in the XY plane.
    pub fn outline(&self) -> [Vec2; 4] {
        let run_up = self.run_up();
        [
            Vec2::ZERO,
            Vec2::new(run_up, self.height),
            Vec2::new(run_up + self.crest_width, self.height),
            Vec2::new(self.base_width(), 0.0),
        ]
    }

    /// Flat-shaded prism: each face has its own vertices and an outward normal.
    pub fn build_mesh(&self) -> Mesh {
        let [toe_up, crest_up, crest_down, toe_down] = self.outline();
        let half = self.length * 0.5;
        let at = |p: Vec2, z: f32| Vec3::new(p.x, p.y, z);

        let mut builder = FlatMeshBuilder::default();

        // Caps.
        for (z, normal) in [(half, Vec3::Z), (-half, Vec3::NEG_Z)] {
            builder.push_quad(
                [at(toe_up, z), at(toe_down, z), at(crest_down, z), at(crest_up, z)],
                normal,
            );
        }

        let sides = [
            (toe_up, crest_up),
            (crest_up, crest_down),
            (crest_down, toe_down),
            (toe_down, toe_up),
        ];
        for (a, b) in sides {
            let edge = b - a;
            // The outline is clockwise in XY, so the left-hand perpendicular points out.
            let normal = Vec3::new(-edge.y, edge.x, 0.0).normalize();
            builder.push_quad([at(a, half), at(a, -half), at(b, -half), at(b, half)], normal);
        }

        builder.build()
    }
}

#[derive(Default)]
struct FlatMeshBuilder {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl FlatMeshBuilder {
    /// Adds a planar quad, flipping the winding when needed so the front
    /// face agrees with `normal`.
    fn push_quad(&mut self, mut corners: [Vec3; 4], normal: Vec3) {
        let winding = (corners[1] - corners[0]).cross(corners[2] - corners[0]);
        if winding.dot(normal) < 0.0 {
            corners.reverse();
        }

        let base = self.positions.len() as u32;
        for corner in corners {
            self.positions.push(corner.to_array());
            self.normals.push(normal.to_array());
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    fn build(self) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals);
        mesh.insert_indices(Indices::U32(self.indices));
        mesh
    }
}

/// Size and local placement of the concrete slab lying on the upstream face.
pub fn face_slab(profile: &DamProfile, thickness: f32) -> (Vec3, Transform) {
    let run_up = profile.run_up();
    let h = profile.height;
    let slope_len = (run_up * run_up + h * h).sqrt();
    let outward = Vec3::new(-h, run_up, 0.0) / slope_len;

    let center = Vec3::new(run_up * 0.5, h * 0.5, 0.0) + outward * (thickness * 0.5);
    let rotation = Quat::from_rotation_z(-run_up.atan2(h));
    (
        Vec3::new(thickness, slope_len, profile.length),
        Transform::from_translation(center).with_rotation(rotation),
    )
}

/// Size and local placement of the crest road.
pub fn crest_road(profile: &DamProfile) -> (Vec3, Transform) {
    let x = profile.run_up() + profile.crest_width * 0.5;
    (
        Vec3::new(profile.crest_width, 0.08, profile.length),
        Transform::from_xyz(x, profile.height + 0.06, 0.0),
    )
}

pub const HUT_SIZE: Vec3 = Vec3::new(0.45, 0.35, 0.45);
pub const HUT_ROOF_RADIUS: f32 = 0.32;
pub const HUT_ROOF_HEIGHT: f32 = 0.15;

/// Placement of the control hut body and its pyramid roof, just past the
/// downstream toe.
pub fn control_hut(profile: &DamProfile) -> (Transform, Transform) {
    let x = profile.base_width() + 0.6;
    let roof_base = HUT_SIZE.y;
    (
        Transform::from_xyz(x, HUT_SIZE.y * 0.5, 0.0),
        Transform::from_xyz(x, roof_base + HUT_ROOF_HEIGHT * 0.5, 0.0)
            .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_4)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;

    fn positions(mesh: &Mesh) -> Vec<Vec3> {
        match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
            Some(VertexAttributeValues::Float32x3(v)) => v.iter().map(|p| Vec3::from_array(*p)).collect(),
            other => panic!("unexpected positions {other:?}"),
        }
    }

    fn normals(mesh: &Mesh) -> Vec<Vec3> {
        match mesh.attribute(Mesh::ATTRIBUTE_NORMAL) {
            Some(VertexAttributeValues::Float32x3(v)) => v.iter().map(|p| Vec3::from_array(*p)).collect(),
            other => panic!("unexpected normals {other:?}"),
        }
    }

    #[test]
    fn default_profile_matches_the_embankment() {
        let p = DamProfile::default();
        assert!((p.run_up() - 2.9).abs() < 1e-6);
        assert!((p.run_down() - 3.4).abs() < 1e-6);
        assert!((p.base_width() - 6.85).abs() < 1e-5);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn nonpositive_dimensions_are_rejected() {
        let p = DamProfile {
            crest_width: 0.0,
            ..DamProfile::default()
        };
        assert!(matches!(
            p.validate(),
            Err(ConfigError::NonPositive { field: "dam crest_width", .. })
        ));
    }

    #[test]
    fn mesh_has_six_flat_faces() {
        let mesh = DamProfile::default().build_mesh();
        assert_eq!(mesh.count_vertices(), 24);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(36));
    }

    #[test]
    fn triangle_winding_agrees_with_normals() {
        let mesh = DamProfile::default().build_mesh();
        let pos = positions(&mesh);
        let nor = normals(&mesh);
        let indices: Vec<usize> = mesh.indices().unwrap().iter().collect();
        for tri in indices.chunks_exact(3) {
            let face = (pos[tri[1]] - pos[tri[0]]).cross(pos[tri[2]] - pos[tri[0]]);
            assert!(face.dot(nor[tri[0]]) > 0.0, "triangle {tri:?}");
        }
    }

    #[test]
    fn normals_point_away_from_the_centroid() {
        let profile = DamProfile::default();
        let mesh = profile.build_mesh();
        let pos = positions(&mesh);
        let nor = normals(&mesh);
        let centroid = pos.iter().copied().sum::<Vec3>() / pos.len() as f32;
        for face in 0..6 {
            let corners = &pos[face * 4..face * 4 + 4];
            let face_center = corners.iter().copied().sum::<Vec3>() / 4.0;
            assert!((face_center - centroid).dot(nor[face * 4]) > 0.0, "face {face}");
        }
        let up = nor.iter().filter(|n| (**n - Vec3::Y).length() < 1e-6).count();
        assert_eq!(up, 4, "crest is the only upward face");
    }

    #[test]
    fn slab_lies_along_the_upstream_face() {
        let p = DamProfile::default();
        let (size, transform) = face_slab(&p, 0.0);
        assert!((size.y - (2.9f32 * 2.9 + 4.0).sqrt()).abs() < 1e-5);
        let along = transform.rotation * Vec3::Y;
        let expected = Vec3::new(p.run_up(), p.height, 0.0).normalize();
        assert!((along - expected).length() < 1e-5);
        assert!((transform.translation - Vec3::new(1.45, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn hut_stands_past_the_downstream_toe() {
        let p = DamProfile::default();
        let (hut, roof) = control_hut(&p);
        assert!((hut.translation.x - 7.45).abs() < 1e-5);
        assert!((hut.translation.y - 0.175).abs() < 1e-6);
        assert!((roof.translation.y - 0.425).abs() < 1e-6);
        assert_eq!(roof.translation.x, hut.translation.x);
        // Roof base rests on the hut's top face.
        assert!((roof.translation.y - HUT_ROOF_HEIGHT * 0.5 - HUT_SIZE.y).abs() < 1e-6);
    }

    #[test]
    fn road_sits_on_the_crest() {
        let (size, transform) = crest_road(&DamProfile::default());
        assert_eq!(size, Vec3::new(0.55, 0.08, 8.0));
        assert!((transform.translation.x - 3.175).abs() < 1e-5);
        assert!((transform.translation.y - 2.06).abs() < 1e-6);
    }
}
