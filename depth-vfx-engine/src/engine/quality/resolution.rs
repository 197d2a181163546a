use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::quality::controller::QualityLevel;
use crate::engine::source::frame_source::Orientation;

/// How reconstruction buffer dimensions are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResolutionPolicy {
    /// Buffers match the oriented depth map texel for texel.
    Native,
    /// Buffers follow the quality level; depth is resampled to fit.
    #[default]
    Adaptive,
}

impl ResolutionPolicy {
    pub fn resolve(self, source_size: UVec2, orientation: Orientation, level: QualityLevel) -> UVec2 {
        match self {
            ResolutionPolicy::Native => orientation.oriented_size(source_size),
            ResolutionPolicy::Adaptive => orientation.oriented_size(level.resolution()),
        }
    }
}
