use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use constants::quality::{
    DEFAULT_QUALITY_COOLDOWN_SECS, DEFAULT_QUALITY_LEVEL, DEFAULT_TARGET_FPS, QUALITY_LEVEL_COUNT,
};

use crate::engine::binding::mode::Mode;
use crate::engine::buffers::feature_flags::FeatureFlags;
use crate::engine::error::ConfigError;
use crate::engine::quality::controller::{QualityController, QualityLevel, QualitySettings};
use crate::engine::quality::resolution::ResolutionPolicy;
use crate::engine::source::frame_source::Orientation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSourceKind {
    #[default]
    Synthetic,
    Host,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub policy: ResolutionPolicy,
    pub target_fps: f32,
    pub cooldown_secs: f32,
    pub min_level: u8,
    pub max_level: u8,
    pub initial_level: u8,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            policy: ResolutionPolicy::default(),
            target_fps: DEFAULT_TARGET_FPS,
            cooldown_secs: DEFAULT_QUALITY_COOLDOWN_SECS,
            min_level: 0,
            max_level: (QUALITY_LEVEL_COUNT - 1) as u8,
            initial_level: DEFAULT_QUALITY_LEVEL,
        }
    }
}

/// Optional captures. With `demand_driven` set, an enabled capture is only
/// allocated while some effect's applied plan binds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub velocity: bool,
    pub color: bool,
    pub normals: bool,
    pub demand_driven: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            velocity: true,
            color: true,
            normals: false,
            demand_driven: true,
        }
    }
}

/// Runtime pipeline tunables loaded from `assets/config/pipeline.json`.
/// Missing fields fall back to their defaults.
#[derive(Asset, TypePath, Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub frame_source: FrameSourceKind,
    /// Orientation of host-fed depth maps. The synthetic source is always native.
    pub orientation: Orientation,
    pub quality: QualityConfig,
    pub capture: CaptureConfig,
    pub default_mode: Mode,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let quality = &self.quality;
        if !quality.target_fps.is_finite() || quality.target_fps <= 0.0 {
            return Err(ConfigError::InvalidTargetFps(quality.target_fps));
        }
        if !quality.cooldown_secs.is_finite() || quality.cooldown_secs < 0.0 {
            return Err(ConfigError::InvalidCooldown(quality.cooldown_secs));
        }
        for level in [quality.min_level, quality.max_level, quality.initial_level] {
            if QualityLevel::new(level).is_none() {
                return Err(ConfigError::LevelOutOfRange(level));
            }
        }
        if quality.min_level > quality.max_level {
            return Err(ConfigError::InvertedLevelRange {
                min: quality.min_level,
                max: quality.max_level,
            });
        }
        if !(quality.min_level..=quality.max_level).contains(&quality.initial_level) {
            return Err(ConfigError::InitialLevelOutsideRange {
                initial: quality.initial_level,
                min: quality.min_level,
                max: quality.max_level,
            });
        }
        Ok(())
    }

    /// Builds the controller described by a validated config.
    pub fn quality_controller(&self) -> Result<QualityController, ConfigError> {
        self.validate()?;
        let level = |index| QualityLevel::new(index).ok_or(ConfigError::LevelOutOfRange(index));
        let settings = QualitySettings {
            target_fps: self.quality.target_fps,
            cooldown_secs: self.quality.cooldown_secs,
            min_level: level(self.quality.min_level)?,
            max_level: level(self.quality.max_level)?,
        };
        Ok(QualityController::new(settings, level(self.quality.initial_level)?))
    }

    /// Capture features for the current demand, before orientation flags.
    pub fn capture_features(&self, demanded: FeatureFlags) -> FeatureFlags {
        let capture = &self.capture;
        let wanted = |flag: FeatureFlags, enabled: bool| {
            enabled && (!capture.demand_driven || demanded.contains(flag))
        };
        let mut features = FeatureFlags::empty();
        features.set(FeatureFlags::VELOCITY, wanted(FeatureFlags::VELOCITY, capture.velocity));
        features.set(FeatureFlags::COLOR, wanted(FeatureFlags::COLOR, capture.color));
        features.set(FeatureFlags::NORMALS, wanted(FeatureFlags::NORMALS, capture.normals));
        features
    }
}
