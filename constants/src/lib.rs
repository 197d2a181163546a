//! Compile-time tables shared by the depth reconstruction engine.
//!
//! Everything here is fixed at build time. Runtime tunables live in the
//! engine's JSON pipeline configuration instead.

/// Ordered alias tables used to query effect instances for logical signals.
pub mod binding_aliases;

/// Compute kernel dispatch constants and depth defaults.
pub mod compute;

/// Asset paths for the pipeline configuration and compute shader.
pub mod path;

/// Adaptive quality levels, smoothing factor and hysteresis thresholds.
pub mod quality;

/// Status overlay styling.
pub mod render_settings;

/// Geometry of the deterministic synthetic frame source.
pub mod synthetic_source;
