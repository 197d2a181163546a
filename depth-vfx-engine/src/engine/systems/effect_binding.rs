use bevy::prelude::*;
use constants::binding_aliases::DEPTH_UPDATE_EVENT;

use crate::engine::binding::effect::{EffectInstance, VisualEffect};
use crate::engine::binding::frame_bindings::{
    AudioLevels, EffectParameters, FrameBindings, bind_frame,
};
use crate::engine::binding::mode_controller::{
    CaptureDemand, EffectBinding, ModeState, set_global_mode,
};
use crate::engine::binding::mode::Mode;
use crate::engine::binding::resolver::PropertyBindingResolver;
use crate::engine::buffers::resource_manager::ResourceManager;
use crate::engine::compute::reconstruction::ReconstructionStats;

/// Applies a changed global mode to every effect, and re-detects effects
/// that are new or whose schema changed since their plan was built.
pub fn apply_effect_modes(
    resolver: Res<PropertyBindingResolver>,
    mut mode_state: ResMut<ModeState>,
    mut effects: Query<(&VisualEffect, &mut EffectBinding)>,
) {
    let requested = mode_state.requested;

    if mode_state.is_changed() {
        let report = set_global_mode(
            &resolver,
            requested,
            effects
                .iter_mut()
                .map(|(effect, binding)| (effect, binding.into_inner())),
        );
        info!(
            "Mode {}: {} effect(s) applied as requested, {} fell back",
            requested,
            report.applied_as_requested,
            report.fallbacks.len()
        );
        for fallback in &report.fallbacks {
            log_fallback(&fallback.effect, requested, fallback.applied, fallback.exhausted, fallback.inert);
        }
        mode_state.bypass_change_detection().last_report = Some(report);
    }

    for (effect, mut binding) in &mut effects {
        if !binding.is_stale(effect, requested) {
            continue;
        }
        let application = binding.apply(&resolver, effect, requested);
        debug!(
            "Bound '{}' in {} mode ({} of {} signals)",
            effect.label(),
            application.applied,
            application.plan.bound_count(),
            application.plan.resolved_count()
        );
        if application.fell_back() || application.exhausted {
            log_fallback(
                effect.label(),
                application.requested,
                application.applied,
                application.exhausted,
                application.plan.is_inert(),
            );
        }
    }
}

fn log_fallback(label: &str, requested: Mode, applied: Mode, exhausted: bool, inert: bool) {
    if inert {
        warn!("'{label}' exposes no bindable inputs beyond camera values; keeping {requested}");
    } else if exhausted {
        warn!("'{label}' supports no mode; keeping {requested} with nothing to drive it");
    } else {
        warn!("'{label}' does not support {requested}; using {applied}");
    }
}

/// Recomputes which optional captures some effect's applied plan binds.
pub fn update_capture_demand(effects: Query<&EffectBinding>, mut demand: ResMut<CaptureDemand>) {
    let current =
        CaptureDemand::from_applications(effects.iter().filter_map(EffectBinding::application));
    if demand.set_if_neq(current) {
        debug!("Capture demand: {current:?}");
    }
}

/// Writes this frame's values into every bound effect. Effects bound to at
/// least one signal also receive the depth update event after a dispatch.
pub fn bind_effect_properties(
    manager: Res<ResourceManager>,
    audio: Res<AudioLevels>,
    stats: Res<ReconstructionStats>,
    mut effects: Query<(&mut VisualEffect, &EffectBinding, Option<&EffectParameters>)>,
) {
    let frame = FrameBindings::from_buffers(manager.buffers(), *audio);

    for (mut effect, binding, parameters) in &mut effects {
        let Some(application) = binding.application() else {
            continue;
        };
        let parameters = parameters.copied().unwrap_or_default();
        let effect = effect.as_mut();
        bind_frame(effect, &application.plan, &frame, &parameters);

        if stats.dispatched_this_frame && application.plan.bound_count() > 0 {
            effect.send_event(DEPTH_UPDATE_EVENT);
        }
    }
}

/// Clears events delivered during the previous frame.
pub fn clear_effect_events(mut effects: Query<&mut VisualEffect>) {
    for mut effect in &mut effects {
        if !effect.events().is_empty() {
            effect.drain_events();
        }
    }
}
