use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::engine::binding::mode_controller::{EffectBinding, ModeState};
use crate::engine::buffers::resource_manager::ResourceManager;
use crate::engine::compute::reconstruction::ReconstructionStats;
use crate::engine::core::app_state::FpsText;
use crate::engine::quality::controller::QualityController;

/// Refreshes the native status overlay.
pub fn status_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    controller: Res<QualityController>,
    manager: Res<ResourceManager>,
    mode_state: Res<ModeState>,
    stats: Res<ReconstructionStats>,
    effects: Query<&EffectBinding>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .unwrap_or_default();

    let resolution = manager
        .buffers()
        .map(|buffers| format!("{}x{}", buffers.dimensions.x, buffers.dimensions.y))
        .unwrap_or_else(|| "none".to_string());

    let applications = effects.iter().filter_map(EffectBinding::application);
    let (mut bound, mut fell_back) = (0, 0);
    for application in applications {
        bound += 1;
        if application.fell_back() || application.exhausted {
            fell_back += 1;
        }
    }

    for mut text in &mut query {
        text.0 = format!(
            "FPS: {fps:.1}\nQuality: {} | Buffers: {resolution}\nMode: {} ({bound} effects, {fell_back} fallback)\nCompute plan: {:.3} ms | {} dispatched, {} skipped",
            controller.level(),
            mode_state.requested,
            stats.last_plan_ms,
            stats.frames_dispatched,
            stats.frames_skipped,
        );
    }
}
