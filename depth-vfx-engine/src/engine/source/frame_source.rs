use bevy::prelude::*;
use constants::compute::DEFAULT_DEPTH_RANGE;
use serde::{Deserialize, Serialize};

use crate::engine::source::synthetic::SyntheticFrameSource;

/// Fixed rotation between the sensor's native raster and the display frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Native,
    /// Sensor raster is rotated 90° clockwise into the display frame. Width and height swap.
    Rotate90,
}

impl Orientation {
    /// Extent of a raster of `size` after this orientation is applied.
    pub fn oriented_size(self, size: UVec2) -> UVec2 {
        match self {
            Orientation::Native => size,
            Orientation::Rotate90 => UVec2::new(size.y, size.x),
        }
    }

    pub fn is_rotated(self) -> bool {
        self == Orientation::Rotate90
    }
}

/// Supplier of per-frame depth, mask, colour and camera data.
///
/// Getters describe the current tick only. `begin_frame` runs before any getter
/// is read and `end_frame` after the sample has been collected, so a source
/// can latch and then drop host-provided data.
///
/// The projection matrix must describe the oriented (display) frame.
pub trait FrameSource: Send + Sync + 'static {
    fn begin_frame(&mut self, _images: &mut Assets<Image>) {}

    fn depth_map(&self) -> Option<Handle<Image>>;

    fn stencil_mask(&self) -> Option<Handle<Image>>;

    fn color_image(&self) -> Option<Handle<Image>>;

    fn projection_matrix(&self) -> Option<Mat4>;

    fn camera_to_world_matrix(&self) -> Option<Mat4>;

    fn depth_range(&self) -> Vec2 {
        DEFAULT_DEPTH_RANGE
    }

    fn orientation(&self) -> Orientation {
        Orientation::Native
    }

    fn end_frame(&mut self) {}
}

/// One tick's worth of sensor data. Never retained past the tick.
#[derive(Debug, Clone)]
pub struct FrameSample {
    pub depth: Handle<Image>,
    pub stencil: Option<Handle<Image>>,
    pub color: Option<Handle<Image>>,
    pub projection: Option<Mat4>,
    pub camera_to_world: Option<Mat4>,
    pub depth_range: Vec2,
    pub orientation: Orientation,
}

impl FrameSample {
    /// Reads the source's getters. `None` means a dropout: no depth this tick.
    pub fn collect(source: &dyn FrameSource) -> Option<Self> {
        let depth = source.depth_map()?;
        Some(Self {
            depth,
            stencil: source.stencil_mask(),
            color: source.color_image(),
            projection: source.projection_matrix(),
            camera_to_world: source.camera_to_world_matrix(),
            depth_range: source.depth_range(),
            orientation: source.orientation(),
        })
    }
}

/// The frame source driving the pipeline.
#[derive(Resource)]
pub struct ActiveFrameSource(pub Box<dyn FrameSource>);

impl ActiveFrameSource {
    pub fn new(source: impl FrameSource) -> Self {
        Self(Box::new(source))
    }
}

impl Default for ActiveFrameSource {
    fn default() -> Self {
        Self::new(SyntheticFrameSource::default())
    }
}
