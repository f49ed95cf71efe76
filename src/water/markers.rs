use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::mesh::PrimitiveTopology,
};

use crate::water::resources::WaterConfig;

/// Gap between the border line and the rest level.
pub const BORDER_LIFT: f32 = 0.05;
const BORDER_POINTS_PER_SIDE: usize = 16;
const SENSOR_SETBACK: f32 = 2.5;

/// Floating level gauge on the reservoir.
#[derive(Component, Debug)]
pub struct LevelSensor;

#[derive(Component, Debug)]
pub struct WaterBorder;

/// Sensor position relative to the water surface's center.
pub fn level_sensor_offset(config: &WaterConfig) -> Vec3 {
    Vec3::new(config.size_x * 0.5 - SENSOR_SETBACK, 0.0, config.level_sensor_z)
}

/// Closed rectangle around a `size` surface, walked counter-clockwise from
/// `(-x, -z)`. The first point is repeated at the end.
pub fn border_outline(size: Vec2) -> Vec<Vec3> {
    let half = size * 0.5;
    let corners = [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ];

    let mut points = Vec::with_capacity(corners.len() * BORDER_POINTS_PER_SIDE + 1);
    for (i, &from) in corners.iter().enumerate() {
        let to = corners[(i + 1) % corners.len()];
        for step in 0..BORDER_POINTS_PER_SIDE {
            let p = from.lerp(to, step as f32 / BORDER_POINTS_PER_SIDE as f32);
            points.push(Vec3::new(p.x, BORDER_LIFT, p.y));
        }
    }
    points.push(points[0]);
    points
}

pub fn border_mesh(size: Vec2) -> Mesh {
    let positions: Vec<[f32; 3]> = border_outline(size).iter().map(|p| p.to_array()).collect();
    Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
}

/// Spawns the border and the sensor as children of the water entity.
pub fn spawn_water_markers(
    parent: &mut ChildSpawnerCommands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    config: &WaterConfig,
) {
    if config.show_border {
        parent.spawn((
            Mesh3d(meshes.add(border_mesh(config.size()))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgba_u8(0x0e, 0x3a, 0x66, 102),
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                ..default()
            })),
            Transform::IDENTITY,
            WaterBorder,
            Name::new("Water border"),
        ));
    }

    if !config.show_level_sensor {
        return;
    }
    let at = level_sensor_offset(config);
    parent.spawn((
        Mesh3d(meshes.add(Sphere::new(0.08).mesh().uv(16, 16))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgba(0.0, 1.0, 1.0, 0.9),
            emissive: LinearRgba::rgb(0.0, 0.4, 0.4),
            alpha_mode: AlphaMode::Blend,
            metallic: 0.3,
            perceptual_roughness: 0.2,
            ..default()
        })),
        Transform::from_translation(at),
        LevelSensor,
        Name::new(format!("Nivel Embalse: {:.2}m", config.height)),
    ));
    parent.spawn((
        Mesh3d(meshes.add(Cylinder::new(0.12, 0.15).mesh().resolution(8))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0xff, 0x88, 0x00),
            perceptual_roughness: 0.4,
            metallic: 0.2,
            ..default()
        })),
        Transform::from_translation(at - Vec3::Y * 0.1),
        Name::new("Level sensor buoy"),
    ));
    parent.spawn((
        Mesh3d(meshes.add(Cylinder::new(0.02, 0.6).mesh().resolution(8))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0x33, 0x33, 0x33),
            metallic: 0.6,
            ..default()
        })),
        Transform::from_translation(at + Vec3::Y * 0.3),
        Name::new("Level sensor pole"),
    ));
}
