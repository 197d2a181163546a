//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration, state transitions,
//! and plugin initialisation for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Builds the pipeline plugin with its chained per-frame systems, the render
/// world compute plugin and the native status overlay.
pub mod app_setup;

/// Application state machine and the transition out of loading.
pub mod app_state;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
