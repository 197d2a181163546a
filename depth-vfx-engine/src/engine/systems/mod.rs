//! Main-world systems driving the reconstruction pipeline each frame.

/// Reconstruction buffer sizing, device limits and shutdown release.
pub mod buffer_lifecycle;

/// Mode application, capture demand and per-frame property writes.
pub mod effect_binding;

/// Native status overlay with FPS, quality and binding counts.
pub mod fps_tracking;

/// Keyboard mode selection for native builds.
pub mod mode_switch;

pub mod quality;
