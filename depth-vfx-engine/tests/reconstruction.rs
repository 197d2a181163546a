use bevy::prelude::*;

use depth_vfx_engine::engine::buffers::feature_flags::FeatureFlags;
use depth_vfx_engine::engine::buffers::resource_manager::ResourceManager;
use depth_vfx_engine::engine::compute::matrices::FrameMatrices;
use depth_vfx_engine::engine::compute::reconstruction::{
    DispatchPlan, ExecutionHistory, FrameInput, FramePlan, ReconstructionKernel, SkipReason,
};
use depth_vfx_engine::engine::compute::reference::{
    CpuImage, ReferenceInputs, ReferenceTargets, execute_plan,
};
use depth_vfx_engine::engine::quality::controller::QualityLevel;
use depth_vfx_engine::engine::quality::resolution::ResolutionPolicy;
use depth_vfx_engine::engine::source::frame_source::{FrameSample, FrameSource, Orientation};
use depth_vfx_engine::engine::source::synthetic::SyntheticFrameSource;

const FRAME_TIME: f32 = 1.0 / 60.0;

struct Harness {
    images: Assets<Image>,
    manager: ResourceManager,
    kernel: ReconstructionKernel,
    input: FrameInput,
    depth: CpuImage,
    stencil: CpuImage,
}

impl Harness {
    fn synthetic(orientation: Orientation, features: FeatureFlags) -> Self {
        let mut images = Assets::<Image>::default();
        let mut source = SyntheticFrameSource::default();
        source.begin_frame(&mut images);
        let sample = FrameSample::collect(&source).expect("synthetic source always has depth");
        let source_size = images
            .get(&sample.depth)
            .expect("depth image registered")
            .size();

        let input = FrameInput {
            matrices: FrameMatrices::from_sample(&sample).expect("synthetic camera is valid"),
            source_size,
            orientation,
            has_stencil: true,
            has_color: false,
            color_srgb: false,
        };

        let mut manager = ResourceManager::default();
        let dimensions =
            ResolutionPolicy::Native.resolve(source_size, orientation, QualityLevel::default());
        let mut features = features;
        features.set(FeatureFlags::ROTATE_90, orientation.is_rotated());
        manager
            .ensure(&mut images, dimensions, features)
            .expect("synthetic extent fits the device");

        Self {
            images,
            manager,
            kernel: ReconstructionKernel::default(),
            input,
            depth: CpuImage::from_scalar(source_size, &SyntheticFrameSource::depth_values()),
            stencil: CpuImage::from_scalar(source_size, &SyntheticFrameSource::stencil_values()),
        }
    }

    fn plan(&mut self) -> DispatchPlan {
        match self
            .kernel
            .plan_frame(Ok(&self.input), self.manager.buffers(), FRAME_TIME)
        {
            FramePlan::Dispatch(plan) => plan,
            FramePlan::Skip(reason) => panic!("synthetic frame skipped: {reason}"),
        }
    }

    fn targets(&self) -> ReferenceTargets {
        let buffers = self.manager.buffers().expect("buffers allocated");
        ReferenceTargets::allocate(buffers.dimensions, buffers.features)
    }

    fn run(&mut self, targets: &mut ReferenceTargets) -> DispatchPlan {
        let plan = self.plan();
        self.execute(&plan, targets);
        plan
    }

    fn execute(&self, plan: &DispatchPlan, targets: &mut ReferenceTargets) {
        let inputs = ReferenceInputs {
            depth: &self.depth,
            stencil: Some(&self.stencil),
            color: None,
        };
        execute_plan(plan, inputs, targets);
    }
}

#[test]
fn constant_synthetic_depth_produces_zero_velocity() {
    let mut harness = Harness::synthetic(Orientation::Native, FeatureFlags::VELOCITY);
    let mut targets = harness.targets();

    let first = harness.run(&mut targets);
    let second = harness.run(&mut targets);

    assert!(!first.uniforms.history_valid());
    assert!(second.uniforms.history_valid());

    let velocity = targets.velocity.as_ref().expect("velocity target allocated");
    let max_speed = velocity
        .texels
        .iter()
        .map(|texel| texel.truncate().abs().max_element().max(texel.w))
        .fold(0.0_f32, f32::max);
    assert_eq!(max_speed, 0.0);
}

#[test]
fn position_buffer_matches_depth_extent() {
    let harness = Harness::synthetic(Orientation::Native, FeatureFlags::VELOCITY);
    let buffers = harness.manager.buffers().expect("buffers allocated");

    assert_eq!(buffers.dimensions, UVec2::new(256, 192));
    for handle in buffers.history_targets() {
        let image = harness.images.get(handle).expect("target registered");
        assert_eq!(image.size(), UVec2::new(256, 192));
    }
}

#[test]
fn rotated_sources_swap_buffer_extent() {
    let mut harness = Harness::synthetic(Orientation::Rotate90, FeatureFlags::VELOCITY);
    let buffers = harness.manager.buffers().expect("buffers allocated");

    assert_eq!(buffers.dimensions, UVec2::new(192, 256));
    assert!(buffers.features.contains(FeatureFlags::ROTATE_90));
    let position = harness
        .images
        .get(&buffers.position)
        .expect("position target registered");
    assert_eq!(position.size(), UVec2::new(192, 256));

    let mut targets = harness.targets();
    let plan = harness.run(&mut targets);
    assert!(plan.uniforms.rotate_90());
    assert_eq!(targets.position.size, UVec2::new(192, 256));
}

#[test]
fn centre_texel_unprojects_in_front_of_the_camera() {
    let mut harness = Harness::synthetic(Orientation::Native, FeatureFlags::empty());
    let mut targets = harness.targets();
    harness.run(&mut targets);

    let centre = UVec2::new(128, 96);
    let depth = harness.depth.get(centre).x;
    let position = targets.position.get(centre);

    assert!((position.z + depth).abs() < 1.0e-2, "{position:?} at depth {depth}");
    assert!((position.y - 1.5).abs() < 1.0e-2, "{position:?}");
    assert!(position.x.abs() < 1.0e-2, "{position:?}");
    assert_eq!(position.w, 1.0);

    // Outside the mask the stencil is carried as zero.
    assert_eq!(targets.position.get(UVec2::ZERO).w, 0.0);
}

#[test]
fn dropout_serves_previous_buffers_and_spans_the_gap() {
    let mut harness = Harness::synthetic(Orientation::Native, FeatureFlags::VELOCITY);
    let mut targets = harness.targets();
    harness.run(&mut targets);
    let before = targets.position.clone();

    for _ in 0..3 {
        let plan = harness
            .kernel
            .plan_frame(Err(SkipReason::NoDepth), harness.manager.buffers(), FRAME_TIME);
        assert_eq!(plan, FramePlan::Skip(SkipReason::NoDepth));
    }
    assert_eq!(targets.position, before);

    let resumed = harness.run(&mut targets);
    assert!((resumed.uniforms.delta_time - 4.0 * FRAME_TIME).abs() < 1.0e-6);
    assert!(resumed.uniforms.history_valid());
}

#[test]
fn steady_state_never_reallocates() {
    let mut harness = Harness::synthetic(Orientation::Native, FeatureFlags::VELOCITY);
    let dimensions = harness.manager.buffers().expect("buffers allocated").dimensions;
    let features = harness.manager.buffers().expect("buffers allocated").features;
    let allocations = harness.manager.stats().allocations;

    for _ in 0..100 {
        harness
            .manager
            .ensure(&mut harness.images, dimensions, features)
            .expect("same extent");
        harness.plan();
    }

    assert_eq!(harness.manager.stats().allocations, allocations);
    assert_eq!(harness.kernel.frames_dispatched(), 100);
}

#[test]
fn first_executed_frame_has_zero_velocity_when_earlier_plans_were_dropped() {
    let mut harness = Harness::synthetic(Orientation::Native, FeatureFlags::VELOCITY);
    let mut targets = harness.targets();
    let mut history = ExecutionHistory::default();

    // Planned but never executed, as while pipelines compile.
    let dropped = harness.plan();
    history.prepare(&dropped);

    let planned = harness.plan();
    assert!(planned.uniforms.history_valid());
    let executed = history.prepare(&planned);
    harness.execute(&executed, &mut targets);
    history.executed(&executed, true);

    assert!(!executed.uniforms.history_valid());
    assert!((executed.uniforms.delta_time - 2.0 * FRAME_TIME).abs() < 1.0e-6);
    let velocity = targets.velocity.as_ref().expect("velocity target allocated");
    assert!(velocity.texels.iter().all(|texel| *texel == Vec4::ZERO));

    let next = history.prepare(&harness.plan());
    assert!(next.uniforms.history_valid());
}
