//! Adaptive quality control.
//!
//! Walks a four-step resolution ladder from a smoothed frame time. The
//! controller only decides the level; resizing happens when the Resource
//! Manager next ensures the buffers at that level's resolution.

/// Quality ladder, hysteresis thresholds and cooldown-gated level changes.
pub mod controller;

/// Resolution policy mapping a level or the source extent to buffer dimensions.
pub mod resolution;
