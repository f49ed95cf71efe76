pub mod setup;
pub mod ui;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use setup::*;
use ui::*;

pub use ui::ViewerSettings;

/// Camera, lights, fog and the control panel around the valley scene.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(BACKGROUND))
            .init_resource::<ViewerSettings>()
            .add_systems(Startup, (spawn_camera, spawn_lights))
            .add_systems(Update, (sync_terrain_wireframe, draw_ground_grid))
            .add_systems(EguiPrimaryContextPass, viewer_panel);
    }
}
