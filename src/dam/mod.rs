pub mod piezometers;
pub mod profile;
pub mod systems;

use bevy::prelude::*;

pub use profile::DamConfig;

use systems::*;

pub struct DamPlugin;

impl Plugin for DamPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DamConfig>()
            .add_systems(Startup, spawn_dam)
            .add_systems(Update, (sync_piezometer_visibility, pulse_piezometers));
    }
}
