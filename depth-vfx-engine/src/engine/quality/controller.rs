use std::fmt;

use bevy::prelude::*;
use constants::quality::{
    DEFAULT_QUALITY_COOLDOWN_SECS, DEFAULT_QUALITY_LEVEL, DEFAULT_TARGET_FPS, DOWNGRADE_FPS_RATIO,
    FRAME_TIME_SMOOTHING, QUALITY_LEVEL_COUNT, QUALITY_LEVEL_NAMES, QUALITY_RESOLUTIONS,
    SMOOTHING_WINDOW_SAMPLES, UPGRADE_FPS_RATIO,
};

/// Index into the fixed quality ladder, 0 (Low) to 3 (Ultra).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualityLevel(u8);

impl QualityLevel {
    pub const LOW: Self = Self(0);
    pub const MEDIUM: Self = Self(1);
    pub const HIGH: Self = Self(2);
    pub const ULTRA: Self = Self(3);

    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < QUALITY_LEVEL_COUNT).then_some(Self(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn resolution(self) -> UVec2 {
        QUALITY_RESOLUTIONS[self.0 as usize]
    }

    pub fn name(self) -> &'static str {
        QUALITY_LEVEL_NAMES[self.0 as usize]
    }

    fn lower(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    fn higher(self) -> Self {
        Self((self.0 + 1).min(QUALITY_LEVEL_COUNT as u8 - 1))
    }
}

impl Default for QualityLevel {
    fn default() -> Self {
        Self(DEFAULT_QUALITY_LEVEL)
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolution = self.resolution();
        write!(f, "{} ({}x{})", self.name(), resolution.x, resolution.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualitySettings {
    pub target_fps: f32,
    pub cooldown_secs: f32,
    pub min_level: QualityLevel,
    pub max_level: QualityLevel,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            cooldown_secs: DEFAULT_QUALITY_COOLDOWN_SECS,
            min_level: QualityLevel::LOW,
            max_level: QualityLevel::ULTRA,
        }
    }
}

/// Frame-time driven walk over the quality ladder.
///
/// Frame times are smoothed with an exponential moving average seeded by the
/// first sample. Nothing changes until a full smoothing window has been seen,
/// each change is a single step, and consecutive changes are separated by at
/// least the cooldown measured on the controller's own clock (the sum of all
/// accepted frame times).
#[derive(Resource, Debug, Clone)]
pub struct QualityController {
    settings: QualitySettings,
    level: QualityLevel,
    smoothed_frame_time: Option<f32>,
    samples: u32,
    clock: f32,
    last_adjustment: Option<f32>,
}

impl Default for QualityController {
    fn default() -> Self {
        Self::new(QualitySettings::default(), QualityLevel::default())
    }
}

impl QualityController {
    pub fn new(mut settings: QualitySettings, initial: QualityLevel) -> Self {
        if settings.min_level > settings.max_level {
            std::mem::swap(&mut settings.min_level, &mut settings.max_level);
        }
        Self {
            settings,
            level: initial.clamp(settings.min_level, settings.max_level),
            smoothed_frame_time: None,
            samples: 0,
            clock: 0.0,
            last_adjustment: None,
        }
    }

    /// Feeds one measured frame time in seconds. Returns the new level when it changed.
    pub fn tick(&mut self, frame_time: f32) -> Option<QualityLevel> {
        if !frame_time.is_finite() || frame_time <= 0.0 {
            return None;
        }

        self.clock += frame_time;
        self.samples = self.samples.saturating_add(1);
        let smoothed = match self.smoothed_frame_time {
            Some(previous) => {
                previous * (1.0 - FRAME_TIME_SMOOTHING) + frame_time * FRAME_TIME_SMOOTHING
            }
            None => frame_time,
        };
        self.smoothed_frame_time = Some(smoothed);

        if self.samples < SMOOTHING_WINDOW_SAMPLES {
            return None;
        }
        if let Some(last) = self.last_adjustment {
            if self.clock - last < self.settings.cooldown_secs {
                return None;
            }
        }

        let fps = 1.0 / smoothed;
        let target = self.settings.target_fps;
        let next = if fps < target * DOWNGRADE_FPS_RATIO && self.level > self.settings.min_level {
            self.level.lower()
        } else if fps > target * UPGRADE_FPS_RATIO && self.level < self.settings.max_level {
            self.level.higher()
        } else {
            return None;
        };

        self.level = next;
        self.last_adjustment = Some(self.clock);
        Some(next)
    }

    pub fn level(&self) -> QualityLevel {
        self.level
    }

    pub fn settings(&self) -> QualitySettings {
        self.settings
    }

    pub fn smoothed_fps(&self) -> Option<f32> {
        self.smoothed_frame_time.map(|frame_time| 1.0 / frame_time)
    }

    /// Seconds of accepted frame time seen so far.
    pub fn clock(&self) -> f32 {
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(level: QualityLevel) -> QualityController {
        QualityController::new(QualitySettings::default(), level)
    }

    #[test]
    fn waits_for_a_full_smoothing_window() {
        let mut quality = controller(QualityLevel::HIGH);
        for _ in 0..SMOOTHING_WINDOW_SAMPLES - 1 {
            assert_eq!(quality.tick(1.0 / 20.0), None);
        }
        assert_eq!(quality.tick(1.0 / 20.0), Some(QualityLevel::MEDIUM));
    }

    #[test]
    fn hysteresis_band_holds_the_level() {
        let mut quality = controller(QualityLevel::HIGH);
        // 54 FPS sits between 48 (0.8 × 60) and 57 (0.95 × 60).
        for _ in 0..200 {
            assert_eq!(quality.tick(1.0 / 54.0), None);
        }
        assert_eq!(quality.level(), QualityLevel::HIGH);
    }

    #[test]
    fn cooldown_separates_consecutive_steps() {
        let mut quality = controller(QualityLevel::ULTRA);
        let mut changes = Vec::new();
        for _ in 0..400 {
            if let Some(level) = quality.tick(1.0 / 30.0) {
                changes.push((quality.clock(), level));
            }
        }

        let levels: Vec<_> = changes.iter().map(|(_, level)| *level).collect();
        assert_eq!(
            levels,
            vec![QualityLevel::HIGH, QualityLevel::MEDIUM, QualityLevel::LOW]
        );
        for pair in changes.windows(2) {
            assert!(pair[1].0 - pair[0].0 >= DEFAULT_QUALITY_COOLDOWN_SECS - 1e-3);
        }
    }

    #[test]
    fn extremes_are_no_ops() {
        let mut slow = controller(QualityLevel::LOW);
        let mut fast = controller(QualityLevel::ULTRA);
        for _ in 0..100 {
            assert_eq!(slow.tick(1.0 / 10.0), None);
            assert_eq!(fast.tick(1.0 / 240.0), None);
        }
        assert_eq!(slow.level(), QualityLevel::LOW);
        assert_eq!(fast.level(), QualityLevel::ULTRA);
    }

    #[test]
    fn configured_bounds_clamp_the_walk() {
        let settings = QualitySettings {
            min_level: QualityLevel::MEDIUM,
            max_level: QualityLevel::HIGH,
            ..QualitySettings::default()
        };
        let mut quality = QualityController::new(settings, QualityLevel::ULTRA);
        assert_eq!(quality.level(), QualityLevel::HIGH);

        for _ in 0..1000 {
            quality.tick(1.0 / 5.0);
        }
        assert_eq!(quality.level(), QualityLevel::MEDIUM);
    }

    #[test]
    fn invalid_frame_times_are_ignored() {
        let mut quality = controller(QualityLevel::HIGH);
        assert_eq!(quality.tick(f32::NAN), None);
        assert_eq!(quality.tick(0.0), None);
        assert_eq!(quality.tick(-1.0), None);
        assert_eq!(quality.smoothed_fps(), None);
        assert_eq!(quality.clock(), 0.0);
    }

    #[test]
    fn level_display_includes_resolution() {
        assert_eq!(QualityLevel::MEDIUM.to_string(), "Medium (384x384)");
        assert_eq!(QualityLevel::new(4), None);
    }
}
