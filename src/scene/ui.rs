use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::pbr::wireframe::Wireframe;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use rand::Rng;

use crate::dam::DamConfig;
use crate::terrain::{RebuildTerrainEvent, ShapeParameters, Terrain, TerrainConfig, TerrainSource, TerrainStatus};
use crate::water::{ResetWaterEvent, WaterConfig, WavesChangedEvent};

/// Viewer toggles that are not part of the scene file.
#[derive(Resource, Debug)]
pub struct ViewerSettings {
    pub terrain_wireframe: bool,
    pub show_grid: bool,
    /// Procedural edits rebuild immediately; raster edits wait for the button.
    pub auto_rebuild: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            terrain_wireframe: false,
            show_grid: true,
            auto_rebuild: true,
        }
    }
}

/// Picks fresh roughness offsets so the same valley gets new rock detail.
pub fn randomize_roughness_offsets(params: &mut ShapeParameters, rng: &mut impl Rng) {
    params.roughness_offset = [rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)];
}

pub fn viewer_panel(
    mut contexts: EguiContexts,
    mut settings: ResMut<ViewerSettings>,
    mut terrain: ResMut<TerrainConfig>,
    mut valley: ResMut<ShapeParameters>,
    mut water: ResMut<WaterConfig>,
    mut dam: ResMut<DamConfig>,
    status: Res<TerrainStatus>,
    diagnostics: Res<DiagnosticsStore>,
    mut rebuild: EventWriter<RebuildTerrainEvent>,
    mut reset_water: EventWriter<ResetWaterEvent>,
    mut waves_changed: EventWriter<WavesChangedEvent>,
) -> Result {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed());

    let mut terrain_changed = false;
    let mut rebuild_clicked = false;
    let mut waves_edited = false;

    egui::Window::new("Valley Viewer")
        .default_width(320.0)
        .show(contexts.ctx_mut()?, |ui| {
            match fps {
                Some(fps) => ui.label(format!("FPS: {fps:.0}")),
                None => ui.label("FPS: --"),
            };
            match status.active_source {
                Some(source) => ui.label(format!("Terrain: {source:?}, {} vertices", status.vertex_count)),
                None => ui.label("Terrain: none"),
            };
            if status.loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("Loading {}", terrain.raster_path.display()));
                });
            }
            if let Some(err) = &status.last_error {
                ui.colored_label(egui::Color32::from_rgb(255, 110, 110), err);
            }

            ui.separator();
            ui.heading("Terrain");
            ui.horizontal(|ui| {
                terrain_changed |= ui
                    .radio_value(&mut terrain.source, TerrainSource::Procedural, "Procedural")
                    .changed();
                terrain_changed |= ui
                    .radio_value(&mut terrain.source, TerrainSource::Raster, "Raster")
                    .changed();
            });
            terrain_changed |= ui
                .add(egui::Slider::new(&mut terrain.vertical_exaggeration, 0.1..=5.0).text("Vertical exaggeration"))
                .changed();
            terrain_changed |= ui
                .add(egui::Slider::new(&mut terrain.smoothing_kernel_radius, 0..=4).text("Smoothing radius"))
                .changed();

            let mut fade_on = terrain.edge_fade_distance.is_some();
            if ui.checkbox(&mut fade_on, "Edge fade").changed() {
                terrain.edge_fade_distance = fade_on.then_some(0.05);
                terrain_changed = true;
            }
            if let Some(distance) = terrain.edge_fade_distance.as_mut() {
                terrain_changed |= ui
                    .add(egui::Slider::new(distance, 0.01..=0.5).text("Fade distance"))
                    .changed();
            }

            ui.collapsing("Valley shape", |ui| {
                terrain_changed |= ui
                    .add(egui::Slider::new(&mut valley.wall_height, 0.5..=8.0).text("Wall height"))
                    .changed();
                terrain_changed |= ui
                    .add(egui::Slider::new(&mut valley.roughness_scale, 0.0..=1.5).text("Roughness"))
                    .changed();
                terrain_changed |= ui
                    .add(egui::Slider::new(&mut valley.strata_amplitude, 0.0..=0.6).text("Strata"))
                    .changed();
                terrain_changed |= ui
                    .add(egui::Slider::new(&mut valley.basin_depth, 0.0..=4.0).text("Basin depth"))
                    .changed();
                terrain_changed |= ui
                    .add(egui::Slider::new(&mut valley.segments, 16..=320).text("Segments"))
                    .changed();
                if ui.button("Randomize roughness").clicked() {
                    randomize_roughness_offsets(&mut valley, &mut rand::rng());
                    terrain_changed = true;
                }
            });

            ui.checkbox(&mut settings.auto_rebuild, "Rebuild on edit");
            ui.checkbox(&mut settings.terrain_wireframe, "Wireframe");
            ui.checkbox(&mut settings.show_grid, "Ground grid");
            rebuild_clicked = ui.button("Rebuild terrain").clicked();

            ui.separator();
            ui.heading("Reservoir");
            ui.checkbox(&mut water.animate, "Animate waves");
            let waves = water.wave_amplitudes.len();
            for i in 0..waves {
                ui.label(format!("Wave {}", i + 1));
                waves_edited |= ui
                    .add(egui::Slider::new(&mut water.wave_amplitudes[i], 0.0..=0.2).text("Amplitude"))
                    .changed();
                if let Some(frequency) = water.wave_frequencies.get_mut(i) {
                    waves_edited |= ui
                        .add(egui::Slider::new(frequency, 0.0..=2.0).text("Frequency"))
                        .changed();
                }
                if let Some(speed) = water.wave_phase_speeds.get_mut(i) {
                    waves_edited |= ui
                        .add(egui::Slider::new(speed, 0.0..=2.0).text("Phase speed"))
                        .changed();
                }
            }
            if ui.button("Reset waves").clicked() {
                reset_water.write(ResetWaterEvent);
            }

            ui.separator();
            ui.heading("Dam");
            ui.checkbox(&mut dam.show_piezometers, "Piezometers");
        });

    let procedural = terrain.source == TerrainSource::Procedural;
    if rebuild_clicked || (terrain_changed && settings.auto_rebuild && procedural) {
        rebuild.write(RebuildTerrainEvent);
    }
    if waves_edited {
        waves_changed.write(WavesChangedEvent);
    }
    Ok(())
}

/// Keeps the wireframe overlay on whichever terrain entity is current.
pub fn sync_terrain_wireframe(
    mut commands: Commands,
    settings: Res<ViewerSettings>,
    without: Query<Entity, (With<Terrain>, Without<Wireframe>)>,
    with: Query<Entity, (With<Terrain>, With<Wireframe>)>,
) {
    if settings.terrain_wireframe {
        for entity in &without {
            commands.entity(entity).insert(Wireframe);
        }
    } else {
        for entity in &with {
            commands.entity(entity).remove::<Wireframe>();
        }
    }
}
