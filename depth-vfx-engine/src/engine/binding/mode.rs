use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::binding::plan::BindingPlan;
use crate::engine::binding::signal::{Signal, SignalFamily};

/// Content focus requested for effect instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    People,
    Face,
    Hands,
    Environment,
    Audio,
    Hybrid,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::People,
        Mode::Face,
        Mode::Hands,
        Mode::Environment,
        Mode::Audio,
        Mode::Hybrid,
    ];

    /// Tried in order when a requested mode is unsupported.
    pub const FALLBACK_ORDER: [Mode; 4] = [Mode::Hybrid, Mode::People, Mode::Environment, Mode::Audio];

    /// Signal families written while this mode is applied.
    pub fn families(self) -> &'static [SignalFamily] {
        use SignalFamily::*;
        match self {
            Mode::People => &[Geometry, Mask, Colour, Motion, Camera, Parameter],
            Mode::Face => &[Geometry, Mask, Colour, Camera, Parameter],
            Mode::Hands => &[Geometry, Mask, Motion, Camera, Parameter],
            Mode::Environment => &[Geometry, Colour, Motion, Camera, Parameter],
            Mode::Audio => &[Audio, Colour, Camera, Parameter],
            Mode::Hybrid => &[Geometry, Mask, Colour, Motion, Camera, Audio, Parameter],
        }
    }

    pub fn binds(self, signal: Signal) -> bool {
        self.families().contains(&signal.family())
    }

    /// Whether the resolved signals of `plan` meet this mode's minimum requirement.
    pub fn is_satisfied_by(self, plan: &BindingPlan) -> bool {
        let has = |signal| plan.is_resolved(signal);
        let geometry = has(Signal::DepthMap) || has(Signal::PositionMap);
        let colour = has(Signal::ColorMap);
        let audio = has(Signal::AudioVolume) || has(Signal::AudioBands);

        match self {
            Mode::People => geometry || has(Signal::StencilMap),
            Mode::Face => geometry && colour,
            Mode::Hands => geometry && has(Signal::VelocityMap),
            Mode::Environment => geometry,
            Mode::Audio => audio || has(Signal::Throttle) || colour,
            Mode::Hybrid => [geometry, colour, audio].into_iter().filter(|present| *present).count() >= 2,
        }
    }

    /// Next mode in declaration order, wrapping around.
    pub fn next(self) -> Mode {
        let index = Mode::ALL.iter().position(|mode| *mode == self).unwrap_or(0);
        Mode::ALL[(index + 1) % Mode::ALL.len()]
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
