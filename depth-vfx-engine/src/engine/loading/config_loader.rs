use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::path::PIPELINE_CONFIG_PATH;

use crate::engine::assets::pipeline_config::{FrameSourceKind, PipelineConfig};
use crate::engine::binding::mode_controller::ModeState;
use crate::engine::quality::controller::QualityController;
use crate::engine::source::frame_source::ActiveFrameSource;
use crate::engine::source::host::HostFrameSource;
use crate::engine::source::synthetic::SyntheticFrameSource;

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<PipelineConfig>>,
    applied: bool,
}

impl ConfigLoader {
    pub fn is_applied(&self) -> bool {
        self.applied
    }
}

// Start the loading process
pub fn start_loading(mut loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    loader.handle = Some(asset_server.load(PIPELINE_CONFIG_PATH));
}

/// Applies the pipeline config once it loads. A missing or broken file
/// falls back to the defaults rather than stalling in `Loading`.
pub fn load_config_system(
    mut loader: ResMut<ConfigLoader>,
    configs: Res<Assets<PipelineConfig>>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
) {
    if loader.applied {
        return;
    }
    let Some(handle) = loader.handle.as_ref() else {
        return;
    };

    let config = if let Some(config) = configs.get(handle) {
        info!("✓ Pipeline config loaded");
        config.clone()
    } else if let Some(LoadState::Failed(error)) = asset_server.get_load_state(handle) {
        warn!("Pipeline config unavailable ({error}); using defaults");
        PipelineConfig::default()
    } else {
        return;
    };

    apply_pipeline_config(&mut commands, config);
    loader.applied = true;
}

/// Installs the resources a config describes. Invalid configs are replaced by the defaults.
pub fn apply_pipeline_config(commands: &mut Commands, config: PipelineConfig) {
    let (config, controller) = match config.quality_controller() {
        Ok(controller) => (config, controller),
        Err(error) => {
            warn!("Invalid pipeline config: {error}; using defaults");
            (PipelineConfig::default(), QualityController::default())
        }
    };

    match config.frame_source {
        FrameSourceKind::Synthetic => {
            commands.insert_resource(ActiveFrameSource::new(SyntheticFrameSource::default()));
        }
        FrameSourceKind::Host => {
            let (source, sender) = HostFrameSource::new(config.orientation);
            commands.insert_resource(ActiveFrameSource::new(source));
            commands.insert_resource(sender);
        }
    }

    info!(
        "Pipeline: {:?} source, {:?} resolution, starting at {} in {} mode",
        config.frame_source,
        config.quality.policy,
        controller.level(),
        config.default_mode
    );
    commands.insert_resource(controller);
    commands.insert_resource(ModeState::new(config.default_mode));
    commands.insert_resource(config);
}
