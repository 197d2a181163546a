//! Scene content spawned at startup.

/// Effect instances bound to the reconstruction output.
pub mod demo_effects;
