use std::sync::{Arc, Mutex, PoisonError};

use bevy::prelude::*;
use constants::compute::DEFAULT_DEPTH_RANGE;

use crate::engine::source::frame_source::{FrameSource, Orientation};

/// Frame pushed by the host application for the next tick.
#[derive(Debug, Clone)]
pub struct HostFrame {
    pub depth: Handle<Image>,
    pub stencil: Option<Handle<Image>>,
    pub color: Option<Handle<Image>>,
    pub projection: Mat4,
    pub camera_to_world: Mat4,
}

/// Cloneable handle the host uses to feed a [`HostFrameSource`] from outside the ECS.
#[derive(Resource, Debug, Clone, Default)]
pub struct HostFrameSender {
    inbox: Arc<Mutex<Option<HostFrame>>>,
}

impl HostFrameSender {
    /// Replaces any frame not yet consumed. Only the latest frame matters.
    pub fn send(&self, frame: HostFrame) {
        *self.inbox.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
    }
}

/// Frame source fed by the host. A tick without a pushed frame is a dropout.
#[derive(Debug)]
pub struct HostFrameSource {
    inbox: Arc<Mutex<Option<HostFrame>>>,
    current: Option<HostFrame>,
    orientation: Orientation,
    depth_range: Vec2,
}

impl HostFrameSource {
    pub fn new(orientation: Orientation) -> (Self, HostFrameSender) {
        let sender = HostFrameSender::default();
        let source = Self {
            inbox: sender.inbox.clone(),
            current: None,
            orientation,
            depth_range: DEFAULT_DEPTH_RANGE,
        };
        (source, sender)
    }
}

impl FrameSource for HostFrameSource {
    fn begin_frame(&mut self, _images: &mut Assets<Image>) {
        self.current = self
            .inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn depth_map(&self) -> Option<Handle<Image>> {
        self.current.as_ref().map(|frame| frame.depth.clone())
    }

    fn stencil_mask(&self) -> Option<Handle<Image>> {
        self.current.as_ref().and_then(|frame| frame.stencil.clone())
    }

    fn color_image(&self) -> Option<Handle<Image>> {
        self.current.as_ref().and_then(|frame| frame.color.clone())
    }

    fn projection_matrix(&self) -> Option<Mat4> {
        self.current.as_ref().map(|frame| frame.projection)
    }

    fn camera_to_world_matrix(&self) -> Option<Mat4> {
        self.current.as_ref().map(|frame| frame.camera_to_world)
    }

    fn depth_range(&self) -> Vec2 {
        self.depth_range
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn end_frame(&mut self) {
        self.current = None;
    }
}
