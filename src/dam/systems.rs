use bevy::prelude::*;

use crate::dam::piezometers::{piezometer_layout, pulse_scale, Piezometer};
use crate::dam::profile::{
    control_hut, crest_road, face_slab, DamConfig, HUT_ROOF_HEIGHT, HUT_ROOF_RADIUS, HUT_SIZE,
};

/// Root of the dam hierarchy; positioned at the upstream toe.
#[derive(Component)]
pub struct Dam;

const SLAB_THICKNESS: f32 = 0.03;
const MARKER_RADIUS: f32 = 0.06;

pub fn spawn_dam(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<DamConfig>,
) {
    let profile = &config.profile;
    if let Err(e) = profile.validate() {
        error!("Dam not spawned: {e}");
        return;
    }

    let body = meshes.add(profile.build_mesh());
    let body_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x6b, 0x72, 0x80),
        perceptual_roughness: 0.88,
        metallic: 0.08,
        ..default()
    });

    let (slab_size, slab_transform) = face_slab(profile, SLAB_THICKNESS);
    let slab = meshes.add(Cuboid::from_size(slab_size));
    let slab_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xdc, 0xe3, 0xea),
        perceptual_roughness: 0.4,
        metallic: 0.2,
        ..default()
    });

    let (road_size, road_transform) = crest_road(profile);
    let road = meshes.add(Cuboid::from_size(road_size));
    let road_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x3a, 0x3e, 0x45),
        perceptual_roughness: 0.6,
        metallic: 0.3,
        ..default()
    });

    let (hut_transform, roof_transform) = control_hut(profile);
    let hut = meshes.add(Cuboid::from_size(HUT_SIZE));
    let hut_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xf5, 0xd8, 0x4a),
        emissive: Color::srgb_u8(0x3a, 0x2f, 0x0a).to_linear() * 0.1,
        perceptual_roughness: 0.45,
        metallic: 0.15,
        ..default()
    });
    let roof = meshes.add(
        Cone {
            radius: HUT_ROOF_RADIUS,
            height: HUT_ROOF_HEIGHT,
        }
        .mesh()
        .resolution(4),
    );
    let roof_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x8b, 0x45, 0x13),
        perceptual_roughness: 0.7,
        ..default()
    });

    let marker_mesh = meshes.add(Sphere::new(MARKER_RADIUS).mesh().uv(14, 14));
    let marker_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x2d, 0xff, 0xbb),
        unlit: true,
        ..default()
    });
    let marker_visibility = if config.show_piezometers {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    let layout = piezometer_layout(profile);

    info!(
        "Dam H={} crest={} base={:.2} length={} at x={} with {} piezometers",
        profile.height,
        profile.crest_width,
        profile.base_width(),
        profile.length,
        config.offset_x,
        layout.len()
    );

    commands
        .spawn((
            Transform::from_xyz(config.offset_x, 0.02, 0.0),
            Visibility::default(),
            Dam,
            Name::new("Dam"),
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(body),
                MeshMaterial3d(body_material),
                Transform::IDENTITY,
                Name::new("Embankment"),
            ));
            parent.spawn((
                Mesh3d(slab),
                MeshMaterial3d(slab_material),
                slab_transform,
                Name::new("Face slab"),
            ));
            parent.spawn((
                Mesh3d(road),
                MeshMaterial3d(road_material),
                road_transform,
                Name::new("Crest road"),
            ));
            parent.spawn((
                Mesh3d(hut),
                MeshMaterial3d(hut_material),
                hut_transform,
                Name::new("Caseta N°3"),
            ));
            parent.spawn((
                Mesh3d(roof),
                MeshMaterial3d(roof_material),
                roof_transform,
                Name::new("Caseta N°3 roof"),
            ));
            for placement in layout {
                parent.spawn((
                    Mesh3d(marker_mesh.clone()),
                    MeshMaterial3d(marker_material.clone()),
                    Transform::from_translation(placement.position),
                    marker_visibility,
                    Name::new(placement.marker.name.clone()),
                    placement.marker,
                ));
            }
        });
}

pub fn sync_piezometer_visibility(
    config: Res<DamConfig>,
    mut markers: Query<&mut Visibility, With<Piezometer>>,
) {
    if !config.is_changed() {
        return;
    }
    let visibility = if config.show_piezometers {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut v in &mut markers {
        v.set_if_neq(visibility);
    }
}

/// Breathes every marker's scale around 1. Hidden markers keep pulsing so
/// they reappear in phase.
pub fn pulse_piezometers(time: Res<Time>, mut markers: Query<(&Piezometer, &mut Transform)>) {
    let t = time.elapsed_secs_f64();
    for (marker, mut transform) in &mut markers {
        transform.scale = Vec3::splat(pulse_scale(t, marker.index));
    }
}
