use bevy::prelude::*;

use crate::water::markers::spawn_water_markers;
use crate::water::resources::WaterConfig;
use crate::water::surface::WaterSurface;

#[derive(Event)]
pub struct ResetWaterEvent;

/// Wave parameters were edited; push them into every surface.
#[derive(Event)]
pub struct WavesChangedEvent;

pub fn spawn_water(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<WaterConfig>,
) {
    if !config.enabled {
        info!("Water disabled");
        return;
    }
    if let Err(e) = config.validate() {
        error!("Water not spawned: {e}");
        return;
    }

    let surface = WaterSurface::new(config.size(), config.segments(), config.waves());
    let mesh = meshes.add(surface.build_mesh());

    let [r, g, b, a] = config.color;
    let material = materials.add(StandardMaterial {
        base_color: Color::srgba(r, g, b, a),
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 0.25,
        metallic: 0.2,
        reflectance: 0.6,
        double_sided: true,
        cull_mode: None,
        ..default()
    });

    info!(
        "Water {}x{} at level {} ({} waves)",
        config.size_x,
        config.size_z,
        config.height,
        surface.waves().len()
    );

    commands
        .spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_xyz(config.center_x, config.height, config.center_z),
            surface,
            Name::new("Water"),
        ))
        .with_children(|parent| {
            spawn_water_markers(parent, &mut meshes, &mut materials, &config);
        });
}

pub fn animate_water(
    time: Res<Time>,
    config: Res<WaterConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut surfaces: Query<(&mut WaterSurface, &Mesh3d)>,
) {
    if !config.animate {
        return;
    }
    let dt = time.delta_secs();
    for (mut surface, mesh3d) in &mut surfaces {
        surface.tick(dt);
        if let Some(mesh) = meshes.get_mut(&mesh3d.0) {
            surface.write_to_mesh(mesh);
        }
    }
}

pub fn handle_water_events(
    mut resets: EventReader<ResetWaterEvent>,
    mut changes: EventReader<WavesChangedEvent>,
    config: Res<WaterConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut surfaces: Query<(&mut WaterSurface, &Mesh3d)>,
) {
    let reset = resets.read().count() > 0;
    let changed = changes.read().count() > 0;
    if !reset && !changed {
        return;
    }

    if changed {
        if let Err(e) = config.validate() {
            warn!("Ignoring wave edit: {e}");
            return;
        }
    }

    for (mut surface, mesh3d) in &mut surfaces {
        if changed {
            surface.set_waves(config.waves());
        }
        if reset {
            surface.reset();
        }
        if let Some(mesh) = meshes.get_mut(&mesh3d.0) {
            surface.write_to_mesh(mesh);
        }
    }
}
