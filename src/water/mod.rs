pub mod markers;
pub mod resources;
pub mod surface;
pub mod systems;

use bevy::prelude::*;

pub use resources::WaterConfig;
pub use systems::{ResetWaterEvent, WavesChangedEvent};

use systems::*;

pub struct WaterPlugin;

impl Plugin for WaterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WaterConfig>()
            .add_event::<ResetWaterEvent>()
            .add_event::<WavesChangedEvent>()
            .add_systems(Startup, spawn_water)
            .add_systems(Update, (animate_water, handle_water_events).chain());
    }
}
