use crate::engine::binding::mode::Mode;
use crate::engine::binding::signal::{Signal, SignalFamily};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalBinding {
    /// Alias the instance exposes for this signal, if any.
    pub alias: Option<&'static str>,
    /// Whether the signal is written each frame under the plan's mode.
    pub bound: bool,
}

/// Resolved aliases and bound flags for one effect instance under one mode.
///
/// Plans are rebuilt whole by the resolver and never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingPlan {
    entries: [SignalBinding; Signal::COUNT],
}

impl BindingPlan {
    /// Plan straight from detection: every resolved signal is bound.
    pub(crate) fn detected(aliases: [Option<&'static str>; Signal::COUNT]) -> Self {
        let mut plan = Self::default();
        for (entry, alias) in plan.entries.iter_mut().zip(aliases) {
            *entry = SignalBinding {
                alias,
                bound: alias.is_some(),
            };
        }
        plan
    }

    /// Same resolution with only the signals `mode` binds left bound.
    pub fn restricted_to(&self, mode: Mode) -> Self {
        let mut plan = self.clone();
        for (entry, signal) in plan.entries.iter_mut().zip(Signal::ALL) {
            entry.bound = entry.alias.is_some() && mode.binds(signal);
        }
        plan
    }

    pub fn entry(&self, signal: Signal) -> SignalBinding {
        self.entries[signal.index()]
    }

    pub fn resolved_alias(&self, signal: Signal) -> Option<&'static str> {
        self.entry(signal).alias
    }

    pub fn is_resolved(&self, signal: Signal) -> bool {
        self.entry(signal).alias.is_some()
    }

    pub fn is_bound(&self, signal: Signal) -> bool {
        self.entry(signal).bound
    }

    /// Bound signals with the alias to write, in signal order.
    pub fn bound_signals(&self) -> impl Iterator<Item = (Signal, &'static str)> + '_ {
        Signal::ALL.into_iter().filter_map(|signal| {
            let entry = self.entry(signal);
            entry.alias.filter(|_| entry.bound).map(|alias| (signal, alias))
        })
    }

    pub fn bound_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.bound).count()
    }

    pub fn resolved_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.alias.is_some()).count()
    }

    /// True when nothing beyond camera values resolved. No mode can drive such an instance.
    pub fn is_inert(&self) -> bool {
        Signal::ALL
            .into_iter()
            .all(|signal| signal.family() == SignalFamily::Camera || !self.is_resolved(signal))
    }
}
