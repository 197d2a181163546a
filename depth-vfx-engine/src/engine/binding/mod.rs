//! Property binding between reconstruction output and effect instances.
//!
//! Effects are inspected once per schema through ordered alias tables. The
//! resulting plan decides which signals are written each frame under the
//! effect's applied mode.

/// Effect instance trait and the `VisualEffect` component implementing it.
pub mod effect;

/// Per-frame values shared by all effects and the narrow writer using them.
pub mod frame_bindings;

/// Modes, their bound signal families and minimum requirements.
pub mod mode;

/// Global mode requests, per-entity binding state and capture demand.
pub mod mode_controller;

pub mod plan;

/// Alias detection and mode fallback.
pub mod resolver;

/// Logical signals, property kinds and alias tables.
pub mod signal;
