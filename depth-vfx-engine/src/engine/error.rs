//! Typed failures surfaced by the reconstruction pipeline.
//!
//! None of these abort a frame loop. Systems log them on transition and keep
//! serving the last valid state.

use thiserror::Error;

/// Resource Manager allocation failures. The previous buffers stay live.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceError {
    #[error("buffer extent {width}x{height} has a zero dimension")]
    ZeroExtent { width: u32, height: u32 },

    #[error("buffer extent {width}x{height} exceeds the device limit of {limit} texels")]
    ExceedsLimit { width: u32, height: u32, limit: u32 },
}

/// Reasons a frame's camera matrices cannot be used for unprojection.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame source supplied no projection matrix")]
    MissingProjection,

    #[error("frame source supplied no camera-to-world matrix")]
    MissingCameraToWorld,

    #[error("camera matrices contain non-finite values")]
    NonFinite,

    #[error("view-projection matrix is not invertible")]
    Singular,

    #[error("projection matrix has a zero focal term")]
    DegenerateProjection,
}

/// Rejected pipeline configuration values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("target FPS must be positive and finite, got {0}")]
    InvalidTargetFps(f32),

    #[error("quality cooldown must be non-negative and finite, got {0}")]
    InvalidCooldown(f32),

    #[error("minimum quality level {min} is above maximum {max}")]
    InvertedLevelRange { min: u8, max: u8 },

    #[error("quality level {0} is out of range (0..=3)")]
    LevelOutOfRange(u8),

    #[error("initial quality level {initial} lies outside {min}..={max}")]
    InitialLevelOutsideRange { initial: u8, min: u8, max: u8 },
}
