use bevy::prelude::*;
use bevy::render::extract_resource::ExtractResourcePlugin;
use bevy::render::{
    Render, RenderApp, RenderSet,
    render_asset::RenderAssets,
    render_resource::{
        BindGroup, BindGroupEntry, BindGroupLayout, BindGroupLayoutEntry, BindingResource,
        BindingType, Buffer, BufferBindingType, BufferInitDescriptor, BufferUsages,
        CachedComputePipelineId, CommandEncoder, ComputePassDescriptor, ComputePipeline,
        ComputePipelineDescriptor, Extent3d, PipelineCache, ShaderStages, StorageTextureAccess,
        TextureFormat, TextureSampleType, TextureViewDimension,
    },
    renderer::{RenderDevice, RenderQueue},
    texture::GpuImage,
};
use constants::path::RECONSTRUCTION_SHADER_PATH;

use crate::engine::buffers::reconstruction_buffers::{
    COLOR_FORMAT, DEPTH_FORMAT, NORMAL_FORMAT, POSITION_FORMAT, STENCIL_FORMAT, VELOCITY_FORMAT,
};
use crate::engine::compute::reconstruction::{
    DispatchPlan, ExecutionHistory, ReconstructionFrame,
};
use crate::engine::core::app_state::AppState;

pub struct ReconstructionComputePlugin;

impl Plugin for ReconstructionComputePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ExtractResourcePlugin::<ReconstructionFrame>::default());

        if let Some(render_app) = app.get_sub_app_mut(RenderApp) {
            render_app
                .init_resource::<ReconstructionRenderState>()
                .add_systems(
                    Render,
                    run_reconstruction_compute
                        .in_set(RenderSet::Queue)
                        .run_if(in_state(AppState::Running)),
                );
        }
    }
}

/// One entry point of the reconstruction shader with its bind group layout.
struct KernelPipeline {
    layout: BindGroupLayout,
    pipeline: CachedComputePipelineId,
}

struct ReconstructionKernels {
    prepare: KernelPipeline,
    color: KernelPipeline,
    position: KernelPipeline,
    velocity: KernelPipeline,
    normals: KernelPipeline,
}

/// Render-world pipeline cache, the last frame index that was dispatched and
/// what the executed frames left in the history target.
#[derive(Resource, Default)]
pub struct ReconstructionRenderState {
    kernels: Option<ReconstructionKernels>,
    last_dispatched_frame: u64,
    history: ExecutionHistory,
}

/// GPU textures resolved for one dispatch.
struct FrameImages<'a> {
    source_depth: &'a GpuImage,
    source_stencil: Option<&'a GpuImage>,
    source_color: Option<&'a GpuImage>,
    depth: &'a GpuImage,
    stencil: &'a GpuImage,
    position: &'a GpuImage,
    previous_position: Option<&'a GpuImage>,
    velocity: Option<&'a GpuImage>,
    color: Option<&'a GpuImage>,
    normals: Option<&'a GpuImage>,
}

/// Records and submits the reconstruction passes for the newest extracted plan.
///
/// Skips silently while pipelines compile or textures are still uploading;
/// the main world keeps planning and the next plan is picked up once ready.
pub fn run_reconstruction_compute(
    mut state: ResMut<ReconstructionRenderState>,
    frame: Res<ReconstructionFrame>,
    render_device: Res<RenderDevice>,
    render_queue: Res<RenderQueue>,
    pipeline_cache: Res<PipelineCache>,
    gpu_images: Res<RenderAssets<GpuImage>>,
    asset_server: Res<AssetServer>,
) {
    let Some(plan) = &frame.plan else {
        return;
    };
    if plan.frame_index <= state.last_dispatched_frame {
        return;
    }
    let plan = state.history.prepare(plan);
    let Some(targets) = &frame.targets else {
        return;
    };

    if state.kernels.is_none() {
        state.kernels = Some(initialise_reconstruction_pipelines(
            &render_device,
            &pipeline_cache,
            &asset_server,
        ));
    }
    let Some(kernels) = &state.kernels else {
        return;
    };

    let Some(source_depth) = gpu_images.get(&frame.sources.depth) else {
        return;
    };
    let (Some(depth), Some(stencil), Some(position)) = (
        gpu_images.get(&targets.depth),
        gpu_images.get(&targets.stencil),
        gpu_images.get(&targets.position),
    ) else {
        return;
    };
    let optional = |handle: &Option<Handle<Image>>| handle.as_ref().and_then(|h| gpu_images.get(h));

    let images = FrameImages {
        source_depth,
        source_stencil: optional(&frame.sources.stencil),
        source_color: optional(&frame.sources.color),
        depth,
        stencil,
        position,
        previous_position: optional(&targets.previous_position),
        velocity: optional(&targets.velocity),
        color: optional(&targets.color),
        normals: optional(&targets.normals),
    };

    if let Some(history_written) = execute_reconstruction(
        &render_device,
        &render_queue,
        &pipeline_cache,
        kernels,
        &plan,
        &images,
    ) {
        state.history.executed(&plan, history_written);
        state.last_dispatched_frame = plan.frame_index;
    }
}

fn initialise_reconstruction_pipelines(
    render_device: &RenderDevice,
    pipeline_cache: &PipelineCache,
    asset_server: &AssetServer,
) -> ReconstructionKernels {
    let shader: Handle<Shader> = asset_server.load(RECONSTRUCTION_SHADER_PATH);
    let kernel = |name: &'static str, entries: &[BindGroupLayoutEntry]| {
        let layout = render_device.create_bind_group_layout(name, entries);
        let pipeline = pipeline_cache.queue_compute_pipeline(ComputePipelineDescriptor {
            label: Some(name.into()),
            layout: vec![layout.clone()],
            push_constant_ranges: Vec::new(),
            shader: shader.clone(),
            shader_defs: vec![],
            entry_point: name.into(),
            zero_initialize_workgroup_memory: true,
        });
        KernelPipeline { layout, pipeline }
    };

    info!("Queued depth reconstruction pipelines");
    ReconstructionKernels {
        prepare: kernel(
            "prepare",
            &[
                uniform_entry(),
                sampled_entry(1),
                sampled_entry(2),
                storage_entry(3, DEPTH_FORMAT),
                storage_entry(4, STENCIL_FORMAT),
            ],
        ),
        color: kernel(
            "resample_color",
            &[uniform_entry(), sampled_entry(5), storage_entry(6, COLOR_FORMAT)],
        ),
        position: kernel(
            "depth_to_world",
            &[
                uniform_entry(),
                sampled_entry(7),
                sampled_entry(8),
                storage_entry(9, POSITION_FORMAT),
            ],
        ),
        velocity: kernel(
            "calculate_velocity",
            &[
                uniform_entry(),
                sampled_entry(10),
                sampled_entry(11),
                storage_entry(12, VELOCITY_FORMAT),
            ],
        ),
        normals: kernel(
            "derive_normals",
            &[
                uniform_entry(),
                sampled_entry(13),
                sampled_entry(14),
                storage_entry(15, NORMAL_FORMAT),
            ],
        ),
    }
}

fn uniform_entry() -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding: 0,
        visibility: ShaderStages::COMPUTE,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn sampled_entry(binding: u32) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: ShaderStages::COMPUTE,
        ty: BindingType::Texture {
            sample_type: TextureSampleType::Float { filterable: false },
            view_dimension: TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn storage_entry(binding: u32, format: TextureFormat) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: ShaderStages::COMPUTE,
        ty: BindingType::StorageTexture {
            access: StorageTextureAccess::WriteOnly,
            format,
            view_dimension: TextureViewDimension::D2,
        },
        count: None,
    }
}

fn texture_group(
    render_device: &RenderDevice,
    label: &'static str,
    kernel: &KernelPipeline,
    uniforms: &Buffer,
    textures: &[(u32, &GpuImage)],
) -> BindGroup {
    let mut entries = vec![BindGroupEntry {
        binding: 0,
        resource: uniforms.as_entire_binding(),
    }];
    entries.extend(textures.iter().map(|(binding, image)| BindGroupEntry {
        binding: *binding,
        resource: BindingResource::TextureView(&image.texture_view),
    }));
    render_device.create_bind_group(label, &kernel.layout, &entries)
}

/// Returns `None` when a required pipeline is still compiling, otherwise
/// whether the history target was refreshed.
fn execute_reconstruction(
    render_device: &RenderDevice,
    render_queue: &RenderQueue,
    pipeline_cache: &PipelineCache,
    kernels: &ReconstructionKernels,
    plan: &DispatchPlan,
    images: &FrameImages,
) -> Option<bool> {
    let pipeline = |kernel: &KernelPipeline| pipeline_cache.get_compute_pipeline(kernel.pipeline);
    let (Some(prepare), Some(position)) = (pipeline(&kernels.prepare), pipeline(&kernels.position))
    else {
        return None;
    };

    let mut uniforms = plan.uniforms;
    if images.source_stencil.is_none() {
        uniforms.clear_stencil();
    }
    let uniform_buffer = render_device.create_buffer_with_data(&BufferInitDescriptor {
        label: Some("reconstruction_uniforms"),
        contents: bytemuck::cast_slice(&[uniforms]),
        usage: BufferUsages::UNIFORM,
    });

    // Without a stencil the depth source fills the stencil slot; the kernel ignores it.
    let stencil_source = images.source_stencil.unwrap_or(images.source_depth);
    let prepare_group = texture_group(
        render_device,
        "reconstruction_prepare_bind_group",
        &kernels.prepare,
        &uniform_buffer,
        &[
            (1, images.source_depth),
            (2, stencil_source),
            (3, images.depth),
            (4, images.stencil),
        ],
    );
    let position_group = texture_group(
        render_device,
        "reconstruction_position_bind_group",
        &kernels.position,
        &uniform_buffer,
        &[(7, images.depth), (8, images.stencil), (9, images.position)],
    );

    let color_pass = match (plan.passes.color, images.source_color, images.color) {
        (true, Some(source), Some(target)) => pipeline(&kernels.color).map(|pipeline| {
            let group = texture_group(
                render_device,
                "reconstruction_color_bind_group",
                &kernels.color,
                &uniform_buffer,
                &[(5, source), (6, target)],
            );
            (pipeline, group)
        }),
        _ => None,
    };

    let velocity_pass = match (plan.passes.velocity, images.previous_position, images.velocity) {
        (true, Some(previous), Some(target)) => pipeline(&kernels.velocity).map(|pipeline| {
            let group = texture_group(
                render_device,
                "reconstruction_velocity_bind_group",
                &kernels.velocity,
                &uniform_buffer,
                &[(10, images.position), (11, previous), (12, target)],
            );
            (pipeline, group, previous)
        }),
        _ => None,
    };

    let normals_pass = match (plan.passes.normals, images.normals) {
        (true, Some(target)) => pipeline(&kernels.normals).map(|pipeline| {
            let group = texture_group(
                render_device,
                "reconstruction_normals_bind_group",
                &kernels.normals,
                &uniform_buffer,
                &[(13, images.position), (14, images.depth), (15, target)],
            );
            (pipeline, group)
        }),
        _ => None,
    };

    let workgroups = plan.workgroups;
    let mut encoder = render_device.create_command_encoder(&Default::default());
    {
        let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
            label: Some("depth_reconstruction"),
            timestamp_writes: None,
        });
        dispatch(&mut pass, prepare, &prepare_group, workgroups);
        if let Some((pipeline, group)) = &color_pass {
            dispatch(&mut pass, pipeline, group, workgroups);
        }
        dispatch(&mut pass, position, &position_group, workgroups);
        if let Some((pipeline, group, _)) = &velocity_pass {
            dispatch(&mut pass, pipeline, group, workgroups);
        }
    }

    if let Some((_, _, previous)) = &velocity_pass {
        copy_history(&mut encoder, images.position, previous, plan.output_size);
    }

    if let Some((pipeline, group)) = &normals_pass {
        let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
            label: Some("depth_reconstruction_normals"),
            timestamp_writes: None,
        });
        dispatch(&mut pass, pipeline, group, workgroups);
    }

    render_queue.submit([encoder.finish()]);
    Some(velocity_pass.is_some())
}

fn dispatch(
    pass: &mut bevy::render::render_resource::ComputePass,
    pipeline: &ComputePipeline,
    bind_group: &BindGroup,
    workgroups: UVec2,
) {
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.dispatch_workgroups(workgroups.x, workgroups.y, 1);
}

/// Copies, never swaps: the previous-position target is not a storage binding.
fn copy_history(
    encoder: &mut CommandEncoder,
    position: &GpuImage,
    previous: &GpuImage,
    size: UVec2,
) {
    encoder.copy_texture_to_texture(
        position.texture.as_image_copy(),
        previous.texture.as_image_copy(),
        Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        },
    );
}
