use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use constants::render_settings::{STATUS_FONT_SIZE, STATUS_MARGIN_PX, STATUS_TEXT_COLOUR};

use crate::engine::assets::pipeline_config::PipelineConfig;
use crate::engine::binding::frame_bindings::AudioLevels;
use crate::engine::binding::mode_controller::{CaptureDemand, ModeState};
use crate::engine::binding::resolver::PropertyBindingResolver;
use crate::engine::buffers::resource_manager::ResourceManager;
use crate::engine::compute::reconstruction::{
    CurrentFrame, ReconstructionFrame, ReconstructionKernel, ReconstructionStats,
    plan_reconstruction, sample_frame_source,
};
use crate::engine::compute::reconstruction_compute::ReconstructionComputePlugin;
use crate::engine::core::app_state::{AppState, FpsText, transition_to_running};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::config_loader::{ConfigLoader, load_config_system, start_loading};
use crate::engine::quality::controller::QualityController;
use crate::engine::render::extraction::app_state::extract_app_state;
use crate::engine::scene::demo_effects::spawn_demo_effects;
use crate::engine::source::frame_source::ActiveFrameSource;
use crate::engine::systems::buffer_lifecycle::{
    BuffersResized, ensure_reconstruction_buffers, release_buffers_on_exit, sync_device_limits,
};
use crate::engine::systems::effect_binding::{
    apply_effect_modes, bind_effect_properties, clear_effect_events, update_capture_demand,
};
use crate::engine::systems::fps_tracking::status_text_update_system;
use crate::engine::systems::mode_switch::mode_switch_system;
use crate::engine::systems::quality::{
    QualityChanged, report_pipeline_changes, tick_quality_controller,
};

/// Main-world half of the pipeline: resources, config loading and the
/// chained per-frame systems. Needs an asset server, `Assets<Image>` and
/// the state plugin; the GPU dispatch lives in [`ReconstructionComputePlugin`].
pub struct DepthPipelinePlugin;

impl Plugin for DepthPipelinePlugin {
    fn build(&self, app: &mut App) {
        // Registers PipelineConfig as a loadable asset type from JSON files.
        app.add_plugins(JsonAssetPlugin::<PipelineConfig>::new(&["json"]))
            .init_state::<AppState>();

        // Defaults stand in until the config asset has been applied.
        app.init_resource::<ConfigLoader>()
            .init_resource::<PipelineConfig>()
            .init_resource::<ActiveFrameSource>()
            .init_resource::<CurrentFrame>()
            .init_resource::<ResourceManager>()
            .init_resource::<ReconstructionKernel>()
            .init_resource::<ReconstructionStats>()
            .init_resource::<ReconstructionFrame>()
            .init_resource::<QualityController>()
            .init_resource::<PropertyBindingResolver>()
            .init_resource::<ModeState>()
            .init_resource::<CaptureDemand>()
            .init_resource::<AudioLevels>()
            .add_event::<QualityChanged>()
            .add_event::<BuffersResized>();

        app.add_systems(Startup, start_loading)
            .add_systems(
                Update,
                (load_config_system, transition_to_running)
                    .chain()
                    .run_if(in_state(AppState::Loading)),
            )
            .add_systems(First, clear_effect_events)
            .add_systems(
                Update,
                (
                    sync_device_limits,
                    sample_frame_source,
                    tick_quality_controller,
                    apply_effect_modes,
                    update_capture_demand,
                    ensure_reconstruction_buffers,
                    plan_reconstruction,
                    bind_effect_properties,
                    report_pipeline_changes,
                )
                    .chain()
                    .run_if(in_state(AppState::Running)),
            )
            .add_systems(Last, release_buffers_on_exit);
    }
}

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(DepthPipelinePlugin)
        .add_plugins(ReconstructionComputePlugin);

    // Configure render app with proper resource extraction
    if let Some(render_app) = app.get_sub_app_mut(bevy::render::RenderApp) {
        render_app
            .init_resource::<State<AppState>>()
            .add_systems(bevy::render::ExtractSchedule, extract_app_state);
    }

    app.add_systems(Startup, (setup, spawn_demo_effects))
        .add_systems(Update, mode_switch_system.run_if(in_state(AppState::Running)));

    // Add the status overlay only for native builds.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Update, status_text_update_system);
    }

    app
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: STATUS_FONT_SIZE,
                    ..default()
                },
                TextColor(STATUS_TEXT_COLOUR),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(STATUS_MARGIN_PX),
                    right: Val::Px(STATUS_MARGIN_PX),
                    ..default()
                },
                FpsText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
