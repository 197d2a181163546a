//! Depth to world-space reconstruction.
//!
//! Converts each depth frame into GPU-resident position, velocity, colour and
//! normal buffers with a fixed number of compute dispatches per frame.
//!
//! ## Per-frame flow
//!
//! 1. `sample_frame_source` pulls a `FrameSample` and derives `FrameMatrices` once.
//! 2. `plan_reconstruction` turns it into a `DispatchPlan` (or a skip) against the
//!    live `ReconstructionBuffers` and publishes a `ReconstructionFrame`.
//! 3. The render world runs `run_reconstruction_compute` in `RenderSet::Queue`.
//!
//! ## WGSL entry points (`shaders/depth_reconstruction.wgsl`)
//!
//! ```wgsl
//! @binding(0)      uniforms: ReconstructionUniforms        // all entry points
//! prepare          source depth/stencil -> owned r32float copies (rotated, resampled)
//! resample_color   source colour -> rgba8unorm colour buffer
//! depth_to_world   owned depth/stencil -> rgba32float position (stencil in w)
//! calculate_velocity  position + previous -> rgba32float velocity
//! derive_normals   position + depth -> rgba16float normal/confidence
//! ```
//!
//! Between velocity and normals the position buffer is copied into the
//! previous-position buffer with a texture copy.

/// Per-texel math shared with the CPU reference executor.
pub mod kernel_math;

/// Inverse view-projection, inverse projection and ray parameters per frame.
pub mod matrices;

/// Frame planning, uniforms and the main-world reconstruction systems.
pub mod reconstruction;

/// Render-world pipelines and dispatch of the reconstruction kernels.
pub mod reconstruction_compute;

/// CPU execution of a dispatch plan for tests and shader validation.
pub mod reference;
