use bevy::platform::time::Instant;
use bevy::prelude::*;
use bevy::render::extract_resource::ExtractResource;
use bytemuck::{Pod, Zeroable};
use constants::compute::WORKGROUP_SIZE;
use thiserror::Error;

use crate::engine::buffers::feature_flags::FeatureFlags;
use crate::engine::buffers::reconstruction_buffers::ReconstructionBuffers;
use crate::engine::buffers::resource_manager::ResourceManager;
use crate::engine::compute::matrices::FrameMatrices;
use crate::engine::error::FrameError;
use crate::engine::source::frame_source::{ActiveFrameSource, FrameSample, Orientation};

const FLAG_HAS_STENCIL: u32 = 1 << 0;
const FLAG_ROTATE_90: u32 = 1 << 1;
const FLAG_HISTORY_VALID: u32 = 1 << 2;
const FLAG_SRGB_COLOR: u32 = 1 << 3;

/// Why a frame was not reconstructed. Buffers keep their last contents.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    #[error("no depth map this frame")]
    NoDepth,

    #[error("depth map is not resident yet")]
    DepthNotReady,

    #[error("unusable camera: {0}")]
    InvalidCamera(FrameError),

    #[error("reconstruction buffers are unavailable")]
    BuffersUnavailable,
}

/// Everything the planner needs to know about the current sample.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInput {
    pub matrices: FrameMatrices,
    pub source_size: UVec2,
    pub orientation: Orientation,
    pub has_stencil: bool,
    pub has_color: bool,
    /// The colour source is sRGB encoded; the owned copy is re-encoded to match.
    pub color_srgb: bool,
}

/// Uniform block shared by every reconstruction entry point.
///
/// Layout matches `ReconstructionUniforms` in the WGSL (112 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ReconstructionUniforms {
    pub inverse_view_projection: [[f32; 4]; 4],
    pub ray_params: [f32; 4],
    pub depth_params: [f32; 2],
    pub output_size: [u32; 2],
    pub delta_time: f32,
    pub flags: u32,
    pub _padding: [u32; 2],
}

impl ReconstructionUniforms {
    pub fn new(
        matrices: &FrameMatrices,
        output_size: UVec2,
        delta_time: f32,
        orientation: Orientation,
        has_stencil: bool,
        history_valid: bool,
    ) -> Self {
        let mut flags = 0;
        if has_stencil {
            flags |= FLAG_HAS_STENCIL;
        }
        if orientation.is_rotated() {
            flags |= FLAG_ROTATE_90;
        }
        if history_valid {
            flags |= FLAG_HISTORY_VALID;
        }

        Self {
            inverse_view_projection: matrices.inverse_view_projection.to_cols_array_2d(),
            ray_params: matrices.ray_params.to_array(),
            depth_params: matrices.depth_params.to_array(),
            output_size: output_size.to_array(),
            delta_time,
            flags,
            _padding: [0; 2],
        }
    }

    pub fn has_stencil(&self) -> bool {
        self.flags & FLAG_HAS_STENCIL != 0
    }

    /// Used when the stencil texture is not resident on the GPU yet.
    pub fn clear_stencil(&mut self) {
        self.flags &= !FLAG_HAS_STENCIL;
    }

    pub fn rotate_90(&self) -> bool {
        self.flags & FLAG_ROTATE_90 != 0
    }

    pub fn history_valid(&self) -> bool {
        self.flags & FLAG_HISTORY_VALID != 0
    }

    pub fn clear_history(&mut self) {
        self.flags &= !FLAG_HISTORY_VALID;
    }

    pub fn srgb_color(&self) -> bool {
        self.flags & FLAG_SRGB_COLOR != 0
    }

    pub fn set_srgb_color(&mut self, srgb: bool) {
        if srgb {
            self.flags |= FLAG_SRGB_COLOR;
        } else {
            self.flags &= !FLAG_SRGB_COLOR;
        }
    }
}

/// Optional kernel passes. Prepare and position always run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelPasses {
    pub color: bool,
    pub velocity: bool,
    pub normals: bool,
}

impl KernelPasses {
    /// Compute dispatches per frame. The history copy is a transfer, not a dispatch.
    pub fn dispatch_count(&self) -> u32 {
        2 + self.color as u32 + self.velocity as u32 + self.normals as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchPlan {
    pub frame_index: u64,
    /// Resource Manager generation of the targets this plan writes.
    pub generation: u64,
    pub output_size: UVec2,
    pub workgroups: UVec2,
    pub passes: KernelPasses,
    pub uniforms: ReconstructionUniforms,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FramePlan {
    Dispatch(DispatchPlan),
    Skip(SkipReason),
}

/// CPU side of the reconstruction kernel: decides whether and how to dispatch.
#[derive(Resource, Debug, Default)]
pub struct ReconstructionKernel {
    frame_index: u64,
    history_generation: Option<u64>,
    time_since_dispatch: f32,
    skipping: Option<SkipReason>,
}

impl ReconstructionKernel {
    /// Plans one frame. Skips leave every buffer untouched; the elapsed time
    /// accumulates so the next velocity spans the whole gap.
    pub fn plan_frame(
        &mut self,
        input: Result<&FrameInput, SkipReason>,
        buffers: Option<&ReconstructionBuffers>,
        delta_time: f32,
    ) -> FramePlan {
        if delta_time.is_finite() && delta_time > 0.0 {
            self.time_since_dispatch += delta_time;
        }

        let input = match input {
            Ok(input) => input,
            Err(reason) => return self.skip(reason),
        };
        let Some(buffers) = buffers else {
            return self.skip(SkipReason::BuffersUnavailable);
        };

        let velocity = buffers.features.contains(FeatureFlags::VELOCITY);
        let history_valid = velocity && self.history_generation == Some(buffers.generation);
        let passes = KernelPasses {
            color: buffers.features.contains(FeatureFlags::COLOR) && input.has_color,
            velocity,
            normals: buffers.features.contains(FeatureFlags::NORMALS),
        };
        let mut uniforms = ReconstructionUniforms::new(
            &input.matrices,
            buffers.dimensions,
            self.time_since_dispatch,
            input.orientation,
            input.has_stencil,
            history_valid,
        );
        uniforms.set_srgb_color(passes.color && input.color_srgb);

        if let Some(reason) = self.skipping.take() {
            info!("Reconstruction resumed after: {reason}");
        }
        self.frame_index += 1;
        self.time_since_dispatch = 0.0;
        self.history_generation = velocity.then_some(buffers.generation);

        FramePlan::Dispatch(DispatchPlan {
            frame_index: self.frame_index,
            generation: buffers.generation,
            output_size: buffers.dimensions,
            workgroups: workgroups_for(buffers.dimensions),
            passes,
            uniforms,
        })
    }

    pub fn frames_dispatched(&self) -> u64 {
        self.frame_index
    }

    fn skip(&mut self, reason: SkipReason) -> FramePlan {
        if self.skipping != Some(reason) {
            warn!("Reconstruction paused: {reason}");
            self.skipping = Some(reason);
        }
        FramePlan::Skip(reason)
    }
}

/// Executor-side view of which plans actually ran.
///
/// Planning assumes every dispatched plan executes. The executor can still
/// drop one (pipelines compiling, textures uploading), so before running a
/// plan it is corrected here: history only counts when an executed frame of
/// the same generation wrote it, and the time of dropped plans is carried
/// into the next one that runs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExecutionHistory {
    history_generation: Option<u64>,
    carried_time: f32,
    pending: Option<(u64, f32)>,
}

impl ExecutionHistory {
    /// Returns the plan as it must be executed. Call once per extracted plan
    /// before any early return; repeated calls with the same plan are harmless.
    pub fn prepare(&mut self, plan: &DispatchPlan) -> DispatchPlan {
        if let Some((index, delta_time)) = self.pending {
            if index < plan.frame_index {
                self.carried_time += delta_time;
            }
        }
        self.pending = Some((plan.frame_index, plan.uniforms.delta_time));

        let mut prepared = plan.clone();
        prepared.uniforms.delta_time += self.carried_time;
        if self.history_generation != Some(plan.generation) {
            prepared.uniforms.clear_history();
        }
        prepared
    }

    /// Records a plan that was submitted. `history_written` is true when its
    /// positions were copied into the previous-position target.
    pub fn executed(&mut self, plan: &DispatchPlan, history_written: bool) {
        self.pending = None;
        self.carried_time = 0.0;
        self.history_generation = history_written.then_some(plan.generation);
    }
}

pub fn workgroups_for(size: UVec2) -> UVec2 {
    (size + UVec2::splat(WORKGROUP_SIZE - 1)) / WORKGROUP_SIZE
}

/// This tick's sample and the planner input derived from it.
#[derive(Resource, Debug)]
pub struct CurrentFrame {
    pub sample: Option<FrameSample>,
    pub input: Result<FrameInput, SkipReason>,
}

impl Default for CurrentFrame {
    fn default() -> Self {
        Self {
            sample: None,
            input: Err(SkipReason::NoDepth),
        }
    }
}

/// Planning counters shown on the status overlay.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ReconstructionStats {
    pub frames_dispatched: u64,
    pub frames_skipped: u64,
    pub last_plan_ms: f32,
    pub dispatched_this_frame: bool,
}

/// Source textures the kernel reads this frame.
#[derive(Debug, Clone, Default)]
pub struct FrameTextures {
    pub depth: Handle<Image>,
    pub stencil: Option<Handle<Image>>,
    pub color: Option<Handle<Image>>,
}

/// Record handed to the render world. Only a plan with a newer frame index is dispatched.
#[derive(Resource, Debug, Clone, Default, ExtractResource)]
pub struct ReconstructionFrame {
    pub plan: Option<DispatchPlan>,
    pub sources: FrameTextures,
    pub targets: Option<ReconstructionBuffers>,
}

/// Pulls this tick's sample from the active source and derives the camera matrices once.
pub fn sample_frame_source(
    mut source: ResMut<ActiveFrameSource>,
    mut images: ResMut<Assets<Image>>,
    mut current: ResMut<CurrentFrame>,
) {
    source.0.begin_frame(&mut images);
    let sample = FrameSample::collect(source.0.as_ref());
    source.0.end_frame();

    current.input = match &sample {
        None => Err(SkipReason::NoDepth),
        Some(sample) => frame_input(sample, &images),
    };
    current.sample = sample;
}

fn frame_input(sample: &FrameSample, images: &Assets<Image>) -> Result<FrameInput, SkipReason> {
    let depth = images.get(&sample.depth).ok_or(SkipReason::DepthNotReady)?;
    let matrices = FrameMatrices::from_sample(sample).map_err(SkipReason::InvalidCamera)?;
    let color = sample.color.as_ref().and_then(|color| images.get(color));

    Ok(FrameInput {
        matrices,
        source_size: depth.size(),
        orientation: sample.orientation,
        has_stencil: sample
            .stencil
            .as_ref()
            .is_some_and(|stencil| images.contains(stencil)),
        has_color: color.is_some(),
        color_srgb: color.is_some_and(|color| color.texture_descriptor.format.is_srgb()),
    })
}

/// Plans the frame against the live buffers and publishes it for extraction.
pub fn plan_reconstruction(
    mut kernel: ResMut<ReconstructionKernel>,
    mut manager: ResMut<ResourceManager>,
    mut frame: ResMut<ReconstructionFrame>,
    mut stats: ResMut<ReconstructionStats>,
    current: Res<CurrentFrame>,
    time: Res<Time>,
) {
    let started = Instant::now();
    let plan = kernel.plan_frame(
        current.input.as_ref().map_err(|reason| *reason),
        manager.buffers(),
        time.delta_secs(),
    );

    match (plan, &current.sample, &current.input) {
        (FramePlan::Dispatch(plan), Some(sample), Ok(input)) => {
            manager.record_camera(input.matrices.camera_bindings());
            debug!(
                "Reconstruction frame {} at {} ({} dispatches)",
                plan.frame_index,
                plan.output_size,
                plan.passes.dispatch_count()
            );
            frame.plan = Some(plan);
            frame.sources = FrameTextures {
                depth: sample.depth.clone(),
                stencil: sample.stencil.clone(),
                color: sample.color.clone(),
            };
            frame.targets = manager.buffers().cloned();
            stats.frames_dispatched += 1;
            stats.dispatched_this_frame = true;
        }
        _ => {
            frame.plan = None;
            frame.targets = None;
            stats.frames_skipped += 1;
            stats.dispatched_this_frame = false;
        }
    }

    stats.last_plan_ms = started.elapsed().as_secs_f32() * 1000.0;
}
