use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;
use bevy_blendy_cameras::OrbitCameraController;

pub const BACKGROUND: Color = Color::srgb_u8(0x0b, 0x12, 0x20);

pub const CAMERA_HOME: Vec3 = Vec3::new(9.0, 4.2, 9.0);

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: 55f32.to_radians(),
            near: 0.1,
            far: 250.0,
            ..default()
        }),
        Transform::from_translation(CAMERA_HOME).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitCameraController::default(),
        DistanceFog {
            color: BACKGROUND,
            falloff: FogFalloff::Linear {
                start: 10.0,
                end: 50.0,
            },
            ..default()
        },
        Name::new("Viewer camera"),
    ));
}

pub fn spawn_lights(mut commands: Commands) {
    // Sky-tinted ambient stands in for a hemisphere light.
    commands.insert_resource(AmbientLight {
        color: Color::srgb_u8(0xae, 0xd8, 0xff),
        brightness: 350.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            color: Color::srgb_u8(0xff, 0xf5, 0xe6),
            illuminance: 9_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(5.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("Key light"),
    ));

    commands.spawn((
        DirectionalLight {
            color: Color::srgb_u8(0x55, 0x80, 0xaa),
            illuminance: 3_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(-3.0, 3.0, -4.0).looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("Fill light"),
    ));
}

/// Ground reference grid on the XZ plane.
pub fn draw_ground_grid(mut gizmos: Gizmos, settings: Res<super::ui::ViewerSettings>) {
    if !settings.show_grid {
        return;
    }
    gizmos.grid(
        Isometry3d::new(
            Vec3::new(0.0, -0.001, 0.0),
            Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
        ),
        UVec2::splat(70),
        Vec2::ONE,
        Color::srgb_u8(0x1d, 0x2e, 0x42),
    );
}
