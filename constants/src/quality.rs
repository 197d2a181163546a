use bevy::math::UVec2;

pub const QUALITY_LEVEL_COUNT: usize = 4;

/// Square buffer resolution per quality level, lowest first.
pub const QUALITY_RESOLUTIONS: [UVec2; QUALITY_LEVEL_COUNT] = [
    UVec2::new(256, 256),
    UVec2::new(384, 384),
    UVec2::new(512, 512),
    UVec2::new(768, 768),
];

pub const QUALITY_LEVEL_NAMES: [&str; QUALITY_LEVEL_COUNT] = ["Low", "Medium", "High", "Ultra"];

/// Weight of the newest frame time in the exponential moving average.
pub const FRAME_TIME_SMOOTHING: f32 = 0.1;

/// Samples required before the first level adjustment is considered.
pub const SMOOTHING_WINDOW_SAMPLES: u32 = 10;

/// Step down when smoothed FPS falls below this fraction of the target.
pub const DOWNGRADE_FPS_RATIO: f32 = 0.8;

/// Step up when smoothed FPS rises above this fraction of the target.
pub const UPGRADE_FPS_RATIO: f32 = 0.95;

pub const DEFAULT_TARGET_FPS: f32 = 60.0;
pub const DEFAULT_QUALITY_COOLDOWN_SECS: f32 = 2.0;
pub const DEFAULT_QUALITY_LEVEL: u8 = 2;
