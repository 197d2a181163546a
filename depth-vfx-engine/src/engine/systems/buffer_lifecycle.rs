use bevy::prelude::*;
use bevy::render::renderer::RenderDevice;

use crate::engine::assets::pipeline_config::PipelineConfig;
use crate::engine::binding::mode_controller::CaptureDemand;
use crate::engine::buffers::feature_flags::FeatureFlags;
use crate::engine::buffers::resource_manager::ResourceManager;
use crate::engine::compute::reconstruction::{CurrentFrame, FrameInput};
use crate::engine::quality::controller::QualityController;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuffersResized {
    pub dimensions: UVec2,
    pub features: FeatureFlags,
    pub generation: u64,
}

/// Buffer dimensions and features wanted for this frame's input.
pub fn requested_buffers(
    config: &PipelineConfig,
    controller: &QualityController,
    demand: &CaptureDemand,
    input: &FrameInput,
) -> (UVec2, FeatureFlags) {
    let dimensions = config
        .quality
        .policy
        .resolve(input.source_size, input.orientation, controller.level());
    let mut features = config.capture_features(demand.features());
    features.set(FeatureFlags::ROTATE_90, input.orientation.is_rotated());
    (dimensions, features)
}

/// Copies the device's 2D texture limit into the Resource Manager once it is known.
pub fn sync_device_limits(device: Option<Res<RenderDevice>>, mut manager: ResMut<ResourceManager>) {
    let Some(device) = device else {
        return;
    };
    let limit = device.limits().max_texture_dimension_2d;
    if manager.max_dimension() != limit {
        info!("Render device texture limit: {limit}");
        manager.set_max_dimension(limit);
    }
}

/// Resizes or reallocates the reconstruction buffers when resolution or features change.
/// Frames without usable input keep whatever buffers are live.
pub fn ensure_reconstruction_buffers(
    config: Res<PipelineConfig>,
    controller: Res<QualityController>,
    demand: Res<CaptureDemand>,
    current: Res<CurrentFrame>,
    mut manager: ResMut<ResourceManager>,
    mut images: ResMut<Assets<Image>>,
    mut resized: EventWriter<BuffersResized>,
) {
    manager.resync_dimensions(&mut images);

    let Ok(input) = &current.input else {
        return;
    };

    let (dimensions, features) = requested_buffers(&config, &controller, &demand, input);
    let generation = manager.generation();

    // Failures are logged by the manager and retried next frame.
    if let Ok(buffers) = manager.ensure(&mut images, dimensions, features) {
        if buffers.generation != generation {
            resized.write(BuffersResized {
                dimensions,
                features,
                generation: buffers.generation,
            });
        }
    }
}

/// Frees every target when the app exits.
pub fn release_buffers_on_exit(
    mut exit: EventReader<AppExit>,
    mut manager: ResMut<ResourceManager>,
    mut images: ResMut<Assets<Image>>,
) {
    if exit.read().last().is_some() {
        manager.release(&mut images);
    }
}
