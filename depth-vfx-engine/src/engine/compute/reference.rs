//! CPU execution of a [`DispatchPlan`].
//!
//! Runs the same passes as the GPU kernels, in the same order, over plain
//! texel vectors. Used to validate shader math and in headless tests.

use bevy::prelude::*;

use crate::engine::buffers::feature_flags::FeatureFlags;
use crate::engine::compute::kernel_math::{
    linear_to_srgb, normal_confidence, source_texel, velocity, world_position,
};
use crate::engine::compute::reconstruction::DispatchPlan;

/// Row-major RGBA32F raster.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuImage {
    pub size: UVec2,
    pub texels: Vec<Vec4>,
}

impl CpuImage {
    pub fn new(size: UVec2) -> Self {
        Self {
            size,
            texels: vec![Vec4::ZERO; (size.x * size.y) as usize],
        }
    }

    /// Single-channel raster stored in the red channel.
    pub fn from_scalar(size: UVec2, values: &[f32]) -> Self {
        Self {
            size,
            texels: values.iter().map(|value| Vec4::new(*value, 0.0, 0.0, 1.0)).collect(),
        }
    }

    pub fn get(&self, texel: UVec2) -> Vec4 {
        self.texels[(texel.y * self.size.x + texel.x) as usize]
    }

    pub fn set(&mut self, texel: UVec2, value: Vec4) {
        let index = (texel.y * self.size.x + texel.x) as usize;
        self.texels[index] = value;
    }
}

/// Host-side mirror of the reconstruction buffers.
#[derive(Debug, Clone)]
pub struct ReferenceTargets {
    pub depth: CpuImage,
    pub stencil: CpuImage,
    pub position: CpuImage,
    pub previous_position: Option<CpuImage>,
    pub velocity: Option<CpuImage>,
    pub color: Option<CpuImage>,
    pub normals: Option<CpuImage>,
}

impl ReferenceTargets {
    pub fn allocate(size: UVec2, features: FeatureFlags) -> Self {
        let optional = |flag| features.contains(flag).then(|| CpuImage::new(size));
        Self {
            depth: CpuImage::new(size),
            stencil: CpuImage::new(size),
            position: CpuImage::new(size),
            previous_position: optional(FeatureFlags::VELOCITY),
            velocity: optional(FeatureFlags::VELOCITY),
            color: optional(FeatureFlags::COLOR),
            normals: optional(FeatureFlags::NORMALS),
        }
    }
}

/// Source rasters for one frame.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceInputs<'a> {
    pub depth: &'a CpuImage,
    pub stencil: Option<&'a CpuImage>,
    pub color: Option<&'a CpuImage>,
}

pub fn execute_plan(plan: &DispatchPlan, inputs: ReferenceInputs, targets: &mut ReferenceTargets) {
    let uniforms = &plan.uniforms;
    let size = plan.output_size;
    let rotate = uniforms.rotate_90();
    let inverse_view_projection = Mat4::from_cols_array_2d(&uniforms.inverse_view_projection);
    let depth_params = Vec2::from_array(uniforms.depth_params);

    // Prepare: owned depth and stencil copies in the oriented frame.
    for texel in raster(size) {
        let from = source_texel(texel, size, inputs.depth.size, rotate);
        let depth = inputs.depth.get(from).x;
        let stencil = match inputs.stencil.filter(|_| uniforms.has_stencil()) {
            Some(stencil) => stencil.get(source_texel(texel, size, stencil.size, rotate)).x,
            None => 1.0,
        };
        targets.depth.set(texel, Vec4::new(depth, 0.0, 0.0, 1.0));
        targets.stencil.set(texel, Vec4::new(stencil, 0.0, 0.0, 1.0));
    }

    if plan.passes.color {
        if let (Some(source), Some(color)) = (inputs.color, targets.color.as_mut()) {
            for texel in raster(size) {
                let sampled = source.get(source_texel(texel, size, source.size, rotate));
                let stored = if uniforms.srgb_color() {
                    linear_to_srgb(sampled)
                } else {
                    sampled
                };
                color.set(texel, stored);
            }
        }
    }

    for texel in raster(size) {
        let position = world_position(
            inverse_view_projection,
            depth_params,
            texel,
            size,
            targets.depth.get(texel).x,
            targets.stencil.get(texel).x,
        );
        targets.position.set(texel, position);
    }

    if plan.passes.velocity {
        if let (Some(previous), Some(velocity_target)) =
            (targets.previous_position.as_mut(), targets.velocity.as_mut())
        {
            for texel in raster(size) {
                velocity_target.set(
                    texel,
                    velocity(
                        targets.position.get(texel),
                        previous.get(texel),
                        uniforms.delta_time,
                        uniforms.history_valid(),
                    ),
                );
            }
            previous.texels.clone_from(&targets.position.texels);
        }
    }

    if plan.passes.normals {
        if let Some(normals) = targets.normals.as_mut() {
            let last = size - UVec2::ONE;
            for texel in raster(size) {
                let right = UVec2::new((texel.x + 1).min(last.x), texel.y);
                let below = UVec2::new(texel.x, (texel.y + 1).min(last.y));
                normals.set(
                    texel,
                    normal_confidence(
                        targets.position.get(texel).truncate(),
                        targets.position.get(right).truncate(),
                        targets.position.get(below).truncate(),
                        [
                            targets.depth.get(texel).x,
                            targets.depth.get(right).x,
                            targets.depth.get(below).x,
                        ],
                    ),
                );
            }
        }
    }
}

fn raster(size: UVec2) -> impl Iterator<Item = UVec2> {
    (0..size.y).flat_map(move |y| (0..size.x).map(move |x| UVec2::new(x, y)))
}
