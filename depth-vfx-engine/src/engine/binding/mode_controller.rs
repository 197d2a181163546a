use bevy::prelude::*;

use crate::engine::binding::effect::{SchemaKey, VisualEffect};
use crate::engine::binding::mode::Mode;
use crate::engine::binding::resolver::{ModeApplication, PropertyBindingResolver};
use crate::engine::binding::signal::Signal;
use crate::engine::buffers::feature_flags::FeatureFlags;

/// Globally requested mode and the outcome of the last global change.
#[derive(Resource, Debug, Clone, Default)]
pub struct ModeState {
    pub requested: Mode,
    pub last_report: Option<ModeChangeReport>,
}

impl ModeState {
    pub fn new(requested: Mode) -> Self {
        Self {
            requested,
            last_report: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackRecord {
    pub effect: String,
    pub applied: Mode,
    pub exhausted: bool,
    /// Nothing beyond camera values resolved on the effect.
    pub inert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModeChangeReport {
    pub requested: Mode,
    pub applied_as_requested: usize,
    pub fallbacks: Vec<FallbackRecord>,
}

/// Binding state of one effect entity.
#[derive(Component, Debug, Clone, Default)]
pub struct EffectBinding {
    /// Pins the entity to a mode regardless of the global request.
    pub mode_override: Option<Mode>,
    schema: Option<SchemaKey>,
    application: Option<ModeApplication>,
}

impl EffectBinding {
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            mode_override: Some(mode),
            ..default()
        }
    }

    pub fn application(&self) -> Option<&ModeApplication> {
        self.application.as_ref()
    }

    pub fn requested_mode(&self, global: Mode) -> Mode {
        self.mode_override.unwrap_or(global)
    }

    /// True when the cached plan no longer describes `effect`.
    pub fn is_stale(&self, effect: &VisualEffect, global: Mode) -> bool {
        self.schema != Some(effect.schema_key())
            || self
                .application
                .as_ref()
                .is_none_or(|application| application.requested != self.requested_mode(global))
    }

    /// Re-detects and applies the effective mode. Returns the new application.
    pub fn apply(
        &mut self,
        resolver: &PropertyBindingResolver,
        effect: &VisualEffect,
        global: Mode,
    ) -> &ModeApplication {
        self.schema = Some(effect.schema_key());
        self.application
            .insert(resolver.apply_mode(effect, self.requested_mode(global)))
    }
}

/// Applies `mode` to every effect that follows the global request.
pub fn set_global_mode<'a>(
    resolver: &PropertyBindingResolver,
    mode: Mode,
    effects: impl IntoIterator<Item = (&'a VisualEffect, &'a mut EffectBinding)>,
) -> ModeChangeReport {
    let mut report = ModeChangeReport {
        requested: mode,
        ..default()
    };

    for (effect, binding) in effects {
        if binding.mode_override.is_some() {
            continue;
        }
        let application = binding.apply(resolver, effect, mode);
        if application.fell_back() || application.exhausted {
            report.fallbacks.push(FallbackRecord {
                effect: effect.label().to_string(),
                applied: application.applied,
                exhausted: application.exhausted,
                inert: application.plan.is_inert(),
            });
        } else {
            report.applied_as_requested += 1;
        }
    }

    report
}

/// Optional captures some applied plan actually binds.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureDemand {
    pub color: bool,
    pub velocity: bool,
    pub normals: bool,
}

impl CaptureDemand {
    pub fn from_applications<'a>(applications: impl IntoIterator<Item = &'a ModeApplication>) -> Self {
        applications
            .into_iter()
            .fold(Self::default(), |demand, application| Self {
                color: demand.color || application.plan.is_bound(Signal::ColorMap),
                velocity: demand.velocity || application.plan.is_bound(Signal::VelocityMap),
                normals: demand.normals || application.plan.is_bound(Signal::NormalMap),
            })
    }

    pub fn features(&self) -> FeatureFlags {
        let mut features = FeatureFlags::empty();
        features.set(FeatureFlags::COLOR, self.color);
        features.set(FeatureFlags::VELOCITY, self.velocity);
        features.set(FeatureFlags::NORMALS, self.normals);
        features
    }
}
