use bevy::prelude::*;
use bevy::tasks::AsyncComputeTaskPool;
use crossbeam_channel::{bounded, TryRecvError};

use crate::terrain::error::TerrainError;
use crate::terrain::mesh::{build_terrain_mesh, PostProcess, TerrainMeshData};
use crate::terrain::raster::ElevationRaster;
use crate::terrain::resources::*;
use crate::terrain::sampler::{ElevationSampler, ProceduralValley, RasterSampler};

#[derive(Resource)]
pub struct TerrainMaterial(pub Handle<StandardMaterial>);

pub fn setup_terrain_material(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Vertex colors carry the height bands; the base color stays white.
    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 0.92,
        metallic: 0.05,
        ..default()
    });
    commands.insert_resource(TerrainMaterial(material));
}

pub fn request_initial_terrain(mut rebuild: EventWriter<RebuildTerrainEvent>) {
    rebuild.write(RebuildTerrainEvent);
}

fn post_process(config: &TerrainConfig) -> PostProcess {
    PostProcess {
        smoothing_kernel_radius: config.smoothing_kernel_radius,
        edge_fade_distance: config.edge_fade_distance,
    }
}

/// Validates the configuration, then meshes the raster.
pub fn build_raster_terrain(
    raster: &ElevationRaster,
    config: &TerrainConfig,
) -> Result<TerrainMeshData, TerrainError> {
    config.validate()?;
    let sampler = RasterSampler::new(raster, config);
    Ok(build_terrain_mesh(&sampler, post_process(config), &config.palette))
}

/// Validates both configurations, then meshes the closed-form valley.
pub fn build_procedural_terrain(
    params: &ShapeParameters,
    config: &TerrainConfig,
) -> Result<TerrainMeshData, TerrainError> {
    config.validate()?;
    params.validate()?;
    let sampler = ProceduralValley::new(params, config.vertical_exaggeration);
    debug!(
        "Procedural valley {}x{} with {} segments, peak {:.2}",
        params.valley_length,
        params.valley_width,
        params.segments,
        sampler.peak_height()
    );
    Ok(build_terrain_mesh(&sampler, post_process(config), &config.palette))
}

pub fn handle_rebuild_requests(
    mut commands: Commands,
    mut events: EventReader<RebuildTerrainEvent>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut status: ResMut<TerrainStatus>,
    material: Res<TerrainMaterial>,
    config: Res<TerrainConfig>,
    params: Res<ShapeParameters>,
    existing: Query<Entity, With<Terrain>>,
) {
    if events.read().count() == 0 {
        return;
    }

    match config.source {
        TerrainSource::Procedural => {
            // A raster decode still in flight must not land on top of this build.
            commands.remove_resource::<PendingRasterLoad>();
            status.loading = false;
            let result = build_procedural_terrain(&params, &config);
            apply_build_result(
                &mut commands,
                &mut meshes,
                &mut status,
                &material,
                &existing,
                TerrainSource::Procedural,
                result,
            );
        }
        TerrainSource::Raster => {
            let path = config.raster_path.clone();
            info!("Loading elevation raster {}", path.display());

            let (tx, rx) = bounded::<RasterLoadResult>(1);
            AsyncComputeTaskPool::get()
                .spawn(async move {
                    let result = ElevationRaster::load(&path);
                    // The receiver is gone only if a newer load replaced it.
                    let _ = tx.send(result);
                })
                .detach();

            commands.insert_resource(PendingRasterLoad { rx });
            status.loading = true;
        }
    }
}

/// Builds the raster terrain once decoding finishes. A failed load is
/// reported and the closed-form valley is built instead.
pub fn poll_raster_load(
    mut commands: Commands,
    pending: Option<Res<PendingRasterLoad>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut status: ResMut<TerrainStatus>,
    material: Res<TerrainMaterial>,
    config: Res<TerrainConfig>,
    params: Res<ShapeParameters>,
    existing: Query<Entity, With<Terrain>>,
) {
    let Some(pending) = pending else {
        return;
    };

    let loaded = match pending.rx.try_recv() {
        Ok(loaded) => loaded,
        Err(TryRecvError::Empty) => return,
        Err(TryRecvError::Disconnected) => Err(TerrainError::RasterLoadAborted),
    };
    commands.remove_resource::<PendingRasterLoad>();
    status.loading = false;

    if config.source != TerrainSource::Raster {
        debug!("Discarding raster load; source switched to {:?}", config.source);
        return;
    }

    match loaded.and_then(|raster| {
        info!(
            "Raster {}x{} decoded, samples {}..={}",
            raster.width(),
            raster.height(),
            raster.min_val(),
            raster.max_val()
        );
        build_raster_terrain(&raster, &config)
    }) {
        Ok(data) => apply_build_result(
            &mut commands,
            &mut meshes,
            &mut status,
            &material,
            &existing,
            TerrainSource::Raster,
            Ok(data),
        ),
        Err(e) => {
            error!("Raster terrain failed: {e}");
            warn!("Falling back to the procedural valley");
            let fallback = build_procedural_terrain(&params, &config);
            apply_build_result(
                &mut commands,
                &mut meshes,
                &mut status,
                &material,
                &existing,
                TerrainSource::Procedural,
                fallback,
            );
            status.last_error = Some(e.to_string());
        }
    }
}

fn apply_build_result(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    status: &mut TerrainStatus,
    material: &TerrainMaterial,
    existing: &Query<Entity, With<Terrain>>,
    source: TerrainSource,
    result: Result<TerrainMeshData, TerrainError>,
) {
    match result {
        Ok(data) => {
            for entity in existing.iter() {
                commands.entity(entity).despawn();
            }

            status.vertex_count = data.vertex_count();
            status.active_source = Some(source);
            status.last_error = None;
            info!("Terrain built from {:?} with {} vertices", source, data.vertex_count());

            commands.spawn((
                Mesh3d(meshes.add(data.into_mesh())),
                MeshMaterial3d(material.0.clone()),
                Transform::IDENTITY,
                Terrain,
                Name::new("Terrain"),
            ));
        }
        Err(e) => {
            // Keep whatever terrain is already on screen.
            error!("Terrain build failed: {e}");
            status.last_error = Some(e.to_string());
        }
    }
}
