//! Real-time depth to world-space reconstruction feeding GPU visual effects.
//!
//! A frame source supplies depth, mask, colour and camera matrices each tick.
//! Compute kernels turn them into position, velocity, colour and normal
//! buffers owned by the Resource Manager, the adaptive quality controller
//! picks their resolution, and the property binding resolver writes them into
//! effect instances under the active mode.

pub mod engine;

pub use engine::core::app_setup::{DepthPipelinePlugin, create_app};
