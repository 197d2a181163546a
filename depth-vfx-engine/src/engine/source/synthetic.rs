//! Deterministic stand-in for a depth sensor.
//!
//! Produces a static radial depth gradient centred in a 256×192 raster, a
//! fixed circular human mask, a colour ramp and a fixed camera. Every tick
//! yields identical data so downstream buffers are reproducible.

use bevy::asset::RenderAssetUsages;
use bevy::image::{ImageFilterMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use constants::compute::DEFAULT_DEPTH_RANGE;
use constants::synthetic_source::{
    SYNTHETIC_CAMERA_POSITION, SYNTHETIC_DEPTH_SIZE, SYNTHETIC_FAR_DEPTH, SYNTHETIC_MASK_CENTRE,
    SYNTHETIC_MASK_RADIUS, SYNTHETIC_NEAR_DEPTH, SYNTHETIC_VERTICAL_FOV_DEGREES,
};

use crate::engine::source::frame_source::FrameSource;

#[derive(Debug, Default)]
pub struct SyntheticFrameSource {
    depth: Option<Handle<Image>>,
    stencil: Option<Handle<Image>>,
    color: Option<Handle<Image>>,
}

impl SyntheticFrameSource {
    pub fn size() -> UVec2 {
        SYNTHETIC_DEPTH_SIZE
    }

    pub fn projection() -> Mat4 {
        let size = SYNTHETIC_DEPTH_SIZE.as_vec2();
        Mat4::perspective_rh(
            SYNTHETIC_VERTICAL_FOV_DEGREES.to_radians(),
            size.x / size.y,
            DEFAULT_DEPTH_RANGE.x,
            DEFAULT_DEPTH_RANGE.y,
        )
    }

    pub fn camera_to_world() -> Mat4 {
        Mat4::from_translation(SYNTHETIC_CAMERA_POSITION)
    }

    /// Row-major depth in metres, one value per texel.
    pub fn depth_values() -> Vec<f32> {
        texel_centres().map(|(x, y)| depth_at(x, y)).collect()
    }

    /// Row-major mask, 1.0 inside the circle and 0.0 outside.
    pub fn stencil_values() -> Vec<f32> {
        texel_centres().map(|(x, y)| mask_at(x, y)).collect()
    }

    fn ensure_images(&mut self, images: &mut Assets<Image>) {
        if self.depth.is_some() {
            return;
        }

        let depth: Vec<u8> = bytemuck::cast_slice(&Self::depth_values()).to_vec();
        let stencil: Vec<u8> = Self::stencil_values()
            .iter()
            .map(|value| (value * 255.0) as u8)
            .collect();
        let color: Vec<u8> = texel_centres()
            .flat_map(|(x, y)| {
                let size = SYNTHETIC_DEPTH_SIZE.as_vec2();
                [(x / size.x * 255.0) as u8, (y / size.y * 255.0) as u8, 128, 255]
            })
            .collect();

        self.depth = Some(images.add(source_image(depth, TextureFormat::R32Float)));
        self.stencil = Some(images.add(source_image(stencil, TextureFormat::R8Unorm)));
        self.color = Some(images.add(source_image(color, TextureFormat::Rgba8UnormSrgb)));
        info!(
            "Synthetic frame source ready ({}x{})",
            SYNTHETIC_DEPTH_SIZE.x, SYNTHETIC_DEPTH_SIZE.y
        );
    }
}

impl FrameSource for SyntheticFrameSource {
    fn begin_frame(&mut self, images: &mut Assets<Image>) {
        self.ensure_images(images);
    }

    fn depth_map(&self) -> Option<Handle<Image>> {
        self.depth.clone()
    }

    fn stencil_mask(&self) -> Option<Handle<Image>> {
        self.stencil.clone()
    }

    fn color_image(&self) -> Option<Handle<Image>> {
        self.color.clone()
    }

    fn projection_matrix(&self) -> Option<Mat4> {
        Some(Self::projection())
    }

    fn camera_to_world_matrix(&self) -> Option<Mat4> {
        Some(Self::camera_to_world())
    }
}

fn texel_centres() -> impl Iterator<Item = (f32, f32)> {
    (0..SYNTHETIC_DEPTH_SIZE.y).flat_map(|y| {
        (0..SYNTHETIC_DEPTH_SIZE.x).map(move |x| (x as f32 + 0.5, y as f32 + 0.5))
    })
}

fn depth_at(x: f32, y: f32) -> f32 {
    let max_distance = SYNTHETIC_MASK_CENTRE.length();
    let t = (Vec2::new(x, y).distance(SYNTHETIC_MASK_CENTRE) / max_distance).min(1.0);
    SYNTHETIC_NEAR_DEPTH + (SYNTHETIC_FAR_DEPTH - SYNTHETIC_NEAR_DEPTH) * t
}

fn mask_at(x: f32, y: f32) -> f32 {
    if Vec2::new(x, y).distance(SYNTHETIC_MASK_CENTRE) <= SYNTHETIC_MASK_RADIUS {
        1.0
    } else {
        0.0
    }
}

fn source_image(data: Vec<u8>, format: TextureFormat) -> Image {
    let mut image = Image::new(
        Extent3d {
            width: SYNTHETIC_DEPTH_SIZE.x,
            height: SYNTHETIC_DEPTH_SIZE.y,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        format,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );
    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        mag_filter: ImageFilterMode::Nearest,
        min_filter: ImageFilterMode::Nearest,
        ..default()
    });
    image
}
