pub mod coloring;
pub mod error;
pub mod heightfield;
pub mod mesh;
pub mod noise;
pub mod raster;
pub mod resources;
pub mod sampler;
pub mod systems;

use bevy::prelude::*;
use systems::*;

pub use resources::{
    RebuildTerrainEvent, ShapeParameters, Terrain, TerrainConfig, TerrainSource, TerrainStatus,
};

pub struct TerrainPlugin;

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        // Config resources come from the scene file; fall back to defaults.
        app.init_resource::<TerrainConfig>()
            .init_resource::<ShapeParameters>()
            .init_resource::<TerrainStatus>()
            .add_event::<RebuildTerrainEvent>()
            .add_systems(Startup, (setup_terrain_material, request_initial_terrain).chain())
            .add_systems(Update, (handle_rebuild_requests, poll_raster_load).chain());
    }
}
