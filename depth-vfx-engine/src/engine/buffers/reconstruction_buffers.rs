use bevy::asset::RenderAssetUsages;
use bevy::image::{ImageFilterMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat, TextureUsages};

use crate::engine::buffers::feature_flags::FeatureFlags;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::R32Float;
pub const STENCIL_FORMAT: TextureFormat = TextureFormat::R32Float;
pub const POSITION_FORMAT: TextureFormat = TextureFormat::Rgba32Float;
pub const VELOCITY_FORMAT: TextureFormat = TextureFormat::Rgba32Float;
pub const COLOR_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;
pub const NORMAL_FORMAT: TextureFormat = TextureFormat::Rgba16Float;

/// Camera values resolved from the last successfully reconstructed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBindings {
    pub ray_params: Vec4,
    pub inverse_view: Mat4,
    pub inverse_projection: Mat4,
    pub depth_range: Vec2,
}

/// GPU render targets written by the reconstruction kernel.
///
/// Every target shares `dimensions`. Optional targets exist only when the
/// matching feature flag was requested at allocation time.
#[derive(Debug, Clone)]
pub struct ReconstructionBuffers {
    pub dimensions: UVec2,
    pub features: FeatureFlags,
    pub generation: u64,
    pub depth: Handle<Image>,
    pub stencil: Handle<Image>,
    /// World xyz per texel, stencil in w.
    pub position: Handle<Image>,
    pub previous_position: Option<Handle<Image>>,
    /// World-space displacement per second, speed in w.
    pub velocity: Option<Handle<Image>>,
    pub color: Option<Handle<Image>>,
    /// View-facing normal in xyz, confidence in w.
    pub normals: Option<Handle<Image>>,
    pub camera: Option<CameraBindings>,
}

impl ReconstructionBuffers {
    pub(crate) fn allocate(
        images: &mut Assets<Image>,
        dimensions: UVec2,
        features: FeatureFlags,
        generation: u64,
    ) -> Self {
        let written = TextureUsages::TEXTURE_BINDING | TextureUsages::STORAGE_BINDING;
        let velocity = features.contains(FeatureFlags::VELOCITY);

        Self {
            dimensions,
            features,
            generation,
            depth: images.add(render_target(dimensions, DEPTH_FORMAT, written)),
            stencil: images.add(render_target(dimensions, STENCIL_FORMAT, written)),
            position: images.add(render_target(
                dimensions,
                POSITION_FORMAT,
                written | TextureUsages::COPY_SRC,
            )),
            // Only ever a copy destination and a sampled input.
            previous_position: velocity.then(|| {
                images.add(render_target(
                    dimensions,
                    POSITION_FORMAT,
                    TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
                ))
            }),
            velocity: velocity
                .then(|| images.add(render_target(dimensions, VELOCITY_FORMAT, written))),
            color: features
                .contains(FeatureFlags::COLOR)
                .then(|| images.add(render_target(dimensions, COLOR_FORMAT, written))),
            normals: features
                .contains(FeatureFlags::NORMALS)
                .then(|| images.add(render_target(dimensions, NORMAL_FORMAT, written))),
            camera: None,
        }
    }

    /// Targets that velocity differencing requires to share one extent.
    pub fn history_targets(&self) -> impl Iterator<Item = &Handle<Image>> {
        std::iter::once(&self.position)
            .chain(self.previous_position.as_ref())
            .chain(self.velocity.as_ref())
    }

    pub fn all_targets(&self) -> impl Iterator<Item = &Handle<Image>> {
        [&self.depth, &self.stencil]
            .into_iter()
            .chain(self.history_targets())
            .chain(self.color.as_ref())
            .chain(self.normals.as_ref())
    }
}

fn render_target(dimensions: UVec2, format: TextureFormat, usage: TextureUsages) -> Image {
    let mut image = Image::new_uninit(
        Extent3d {
            width: dimensions.x,
            height: dimensions.y,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        format,
        RenderAssetUsages::RENDER_WORLD,
    );
    image.texture_descriptor.usage = usage;
    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        mag_filter: ImageFilterMode::Nearest,
        min_filter: ImageFilterMode::Nearest,
        ..default()
    });
    image
}
