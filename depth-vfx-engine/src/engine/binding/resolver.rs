use bevy::prelude::*;

use crate::engine::binding::effect::EffectInstance;
use crate::engine::binding::mode::Mode;
use crate::engine::binding::plan::BindingPlan;
use crate::engine::binding::signal::{AliasTable, Signal};

/// Outcome of applying a mode to one effect instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeApplication {
    pub requested: Mode,
    pub applied: Mode,
    pub plan: BindingPlan,
    /// No mode in the fallback order was supported; `applied` is the request.
    pub exhausted: bool,
}

impl ModeApplication {
    pub fn fell_back(&self) -> bool {
        self.applied != self.requested
    }
}

/// Maps logical signals onto whatever property names an instance exposes.
#[derive(Resource, Debug, Clone, Default)]
pub struct PropertyBindingResolver {
    aliases: AliasTable,
}

impl PropertyBindingResolver {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Checks every signal's aliases in priority order. The first alias the
    /// instance exposes with the signal's property type wins.
    pub fn detect(&self, instance: &dyn EffectInstance) -> BindingPlan {
        let mut resolved = [None; Signal::COUNT];
        for signal in Signal::ALL {
            let kind = signal.kind();
            resolved[signal.index()] = self
                .aliases
                .aliases(signal)
                .iter()
                .copied()
                .find(|alias| instance.exposes(alias, kind));
        }
        BindingPlan::detected(resolved)
    }

    pub fn supports_mode(plan: &BindingPlan, mode: Mode) -> bool {
        mode.is_satisfied_by(plan)
    }

    /// Picks the mode to apply for an already detected plan.
    pub fn resolve_mode(&self, detected: &BindingPlan, requested: Mode) -> ModeApplication {
        let (applied, exhausted) = if Self::supports_mode(detected, requested) {
            (requested, false)
        } else {
            match Mode::FALLBACK_ORDER
                .into_iter()
                .find(|mode| Self::supports_mode(detected, *mode))
            {
                Some(mode) => (mode, false),
                None => (requested, true),
            }
        };

        ModeApplication {
            requested,
            applied,
            plan: detected.restricted_to(applied),
            exhausted,
        }
    }

    pub fn apply_mode(&self, instance: &dyn EffectInstance, requested: Mode) -> ModeApplication {
        self.resolve_mode(&self.detect(instance), requested)
    }
}
