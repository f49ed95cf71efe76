mod config;
mod dam;
mod scene;
mod terrain;
mod water;

use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::pbr::wireframe::WireframePlugin;
use bevy::prelude::*;
use bevy::render::settings::{RenderCreation, WgpuFeatures, WgpuSettings};
use bevy::render::RenderPlugin;
use bevy_blendy_cameras::BlendyCamerasPlugin;
use bevy_inspector_egui::bevy_egui::EguiPlugin;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use config::{SceneConfig, DEFAULT_SCENE_PATH};
use dam::DamPlugin;
use scene::ScenePlugin;
use terrain::TerrainPlugin;
use water::WaterPlugin;

fn main() {
    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(RenderPlugin {
        // Line polygon mode for the terrain wireframe overlay.
        render_creation: RenderCreation::Automatic(WgpuSettings {
            features: WgpuFeatures::POLYGON_MODE_LINE,
            ..default()
        }),
        ..default()
    }));

    // Loaded after DefaultPlugins so the log subscriber is up.
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SCENE_PATH.to_string());
    let scene = match SceneConfig::load_or_default(&path) {
        Ok(scene) => {
            info!("Scene config from {path}");
            scene
        }
        Err(e) => {
            error!("Scene config {path} rejected: {e}. Using defaults");
            SceneConfig::default()
        }
    };

    app.insert_resource(scene.terrain)
        .insert_resource(scene.valley)
        .insert_resource(scene.water)
        .insert_resource(scene.dam)
        .add_plugins(WireframePlugin::default())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(EguiPlugin::default())
        .add_plugins(WorldInspectorPlugin::new())
        .add_plugins(BlendyCamerasPlugin)
        .add_plugins(TerrainPlugin)
        .add_plugins(WaterPlugin)
        .add_plugins(DamPlugin)
        .add_plugins(ScenePlugin)
        .run();
}
