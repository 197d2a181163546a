//! Depth sensor frame sources.
//!
//! The pipeline never talks to a camera directly. It pulls one `FrameSample`
//! per tick from whichever `FrameSource` is installed as `ActiveFrameSource`.

/// Frame source trait, per-tick sample and sensor orientation.
pub mod frame_source;

/// Host-fed source with a cloneable sender for pushing frames.
pub mod host;

/// Deterministic analytic source for hardware-free runs and tests.
pub mod synthetic;
