use bevy::prelude::*;

use crate::engine::assets::pipeline_config::PipelineConfig;
use crate::engine::quality::controller::{QualityController, QualityLevel};
use crate::engine::quality::resolution::ResolutionPolicy;
use crate::engine::systems::buffer_lifecycle::BuffersResized;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityChanged {
    pub previous: QualityLevel,
    pub level: QualityLevel,
}

/// Feeds the frame time into the controller. Native resolution never adapts.
pub fn tick_quality_controller(
    time: Res<Time>,
    config: Res<PipelineConfig>,
    mut controller: ResMut<QualityController>,
    mut changed: EventWriter<QualityChanged>,
) {
    if config.quality.policy != ResolutionPolicy::Adaptive {
        return;
    }

    let previous = controller.level();
    if let Some(level) = controller.tick(time.delta_secs()) {
        changed.write(QualityChanged { previous, level });
    }
}

/// Logs quality steps together with the buffer resize they cause.
pub fn report_pipeline_changes(
    controller: Res<QualityController>,
    mut quality: EventReader<QualityChanged>,
    mut resized: EventReader<BuffersResized>,
) {
    for change in quality.read() {
        info!(
            "Quality {} -> {} (smoothed {:.1} FPS)",
            change.previous,
            change.level,
            controller.smoothed_fps().unwrap_or_default()
        );
    }
    for resize in resized.read() {
        debug!(
            "Effects now bound to {}x{} buffers (generation {})",
            resize.dimensions.x, resize.dimensions.y, resize.generation
        );
    }
}
