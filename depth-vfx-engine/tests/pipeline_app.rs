use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::ecs::event::EventCursor;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use constants::binding_aliases::DEPTH_UPDATE_EVENT;
use depth_vfx_engine::DepthPipelinePlugin;
use depth_vfx_engine::engine::binding::effect::VisualEffect;
use depth_vfx_engine::engine::binding::mode::Mode;
use depth_vfx_engine::engine::binding::mode_controller::{CaptureDemand, EffectBinding, ModeState};
use depth_vfx_engine::engine::binding::signal::{PropertyKind, Signal};
use depth_vfx_engine::engine::buffers::feature_flags::FeatureFlags;
use depth_vfx_engine::engine::buffers::resource_manager::ResourceManager;
use depth_vfx_engine::engine::compute::reconstruction::ReconstructionFrame;
use depth_vfx_engine::engine::core::app_state::AppState;
use depth_vfx_engine::engine::quality::controller::QualityLevel;
use depth_vfx_engine::engine::source::frame_source::{ActiveFrameSource, Orientation};
use depth_vfx_engine::engine::source::host::HostFrameSource;
use depth_vfx_engine::engine::systems::buffer_lifecycle::BuffersResized;
use depth_vfx_engine::engine::systems::quality::QualityChanged;

/// Headless app running the main-world pipeline at a fixed frame time.
fn running_app(frame_time: f32) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, AssetPlugin::default(), StatesPlugin))
        .init_asset::<Image>()
        .add_plugins(DepthPipelinePlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            frame_time,
        )));
    app.finish();
    app.cleanup();
    app.world_mut()
        .resource_mut::<NextState<AppState>>()
        .set(AppState::Running);
    app
}

fn spawn_effect(app: &mut App, effect: VisualEffect) -> Entity {
    app.world_mut()
        .spawn((effect, EffectBinding::default()))
        .id()
}

/// Runs `frames` updates and returns every event of type `E` written meanwhile.
fn collect_events<E: Event + Clone>(app: &mut App, frames: usize) -> Vec<E> {
    let mut cursor: EventCursor<E> = app.world().resource::<Events<E>>().get_cursor();
    let mut seen = Vec::new();
    for _ in 0..frames {
        app.update();
        let events = app.world().resource::<Events<E>>();
        seen.extend(cursor.read(events).cloned());
    }
    seen
}

#[test]
fn sustained_low_frame_rate_reports_a_resize() {
    let mut app = running_app(1.0 / 40.0);

    let resizes = collect_events::<BuffersResized>(&mut app, 40);

    let dimensions: Vec<UVec2> = resizes.iter().map(|resize| resize.dimensions).collect();
    assert_eq!(dimensions, vec![UVec2::new(512, 512), UVec2::new(384, 384)]);
    assert!(resizes[1].generation > resizes[0].generation);

    let manager = app.world().resource::<ResourceManager>();
    let buffers = manager.buffers().expect("buffers allocated");
    assert_eq!(buffers.dimensions, UVec2::new(384, 384));
}

#[test]
fn quality_steps_are_published_once_per_change() {
    let mut app = running_app(1.0 / 40.0);

    let changes = collect_events::<QualityChanged>(&mut app, 40);

    assert_eq!(
        changes,
        vec![QualityChanged {
            previous: QualityLevel::HIGH,
            level: QualityLevel::MEDIUM,
        }]
    );
}

#[test]
fn declaring_a_property_rebinds_and_extends_capture() {
    let mut app = running_app(1.0 / 60.0);
    let entity = spawn_effect(
        &mut app,
        VisualEffect::new("mist").with_property("DepthMap", PropertyKind::Texture),
    );
    app.update();
    app.update();

    {
        let world = app.world();
        let binding = world.get::<EffectBinding>(entity).expect("binding component");
        let plan = &binding.application().expect("effect bound").plan;
        assert!(plan.is_bound(Signal::DepthMap));
        assert!(!plan.is_resolved(Signal::ColorMap));
        assert!(!world.resource::<CaptureDemand>().color);

        let effect = world.get::<VisualEffect>(entity).expect("effect component");
        let buffers = world
            .resource::<ResourceManager>()
            .buffers()
            .expect("buffers allocated");
        assert_eq!(effect.texture("DepthMap"), Some(&buffers.depth));
        assert!(effect.events().iter().any(|event| event == DEPTH_UPDATE_EVENT));
    }

    app.world_mut()
        .get_mut::<VisualEffect>(entity)
        .expect("effect component")
        .declare("ColorMap", PropertyKind::Texture);
    let resizes = collect_events::<BuffersResized>(&mut app, 2);

    let world = app.world();
    let binding = world.get::<EffectBinding>(entity).expect("binding component");
    let plan = &binding.application().expect("effect bound").plan;
    assert!(plan.is_bound(Signal::ColorMap));
    assert!(world.resource::<CaptureDemand>().color);
    assert_eq!(resizes.len(), 1);
    assert!(resizes[0].features.contains(FeatureFlags::COLOR));
}

#[test]
fn global_mode_change_produces_a_report() {
    let mut app = running_app(1.0 / 60.0);
    spawn_effect(
        &mut app,
        VisualEffect::new("mist").with_property("DepthMap", PropertyKind::Texture),
    );
    let pinned = app
        .world_mut()
        .spawn((
            VisualEffect::new("ribbons").with_property("AudioVolume", PropertyKind::Float),
            EffectBinding::with_mode(Mode::Audio),
        ))
        .id();
    app.update();

    app.world_mut().resource_mut::<ModeState>().requested = Mode::Face;
    app.update();

    let report = app
        .world()
        .resource::<ModeState>()
        .last_report
        .clone()
        .expect("mode change reported");
    assert_eq!(report.requested, Mode::Face);
    assert_eq!(report.applied_as_requested, 0);
    assert_eq!(report.fallbacks.len(), 1);
    assert_eq!(report.fallbacks[0].effect, "mist");
    assert_eq!(report.fallbacks[0].applied, Mode::People);

    let binding = app
        .world()
        .get::<EffectBinding>(pinned)
        .expect("binding component");
    assert_eq!(binding.application().expect("effect bound").applied, Mode::Audio);
}

#[test]
fn dropouts_stop_publishing_the_previous_targets() {
    let mut app = running_app(1.0 / 60.0);
    app.update();
    app.update();
    assert!(app.world().resource::<ReconstructionFrame>().targets.is_some());

    // A host source with nothing pushed is a dropout.
    let (source, _sender) = HostFrameSource::new(Orientation::Native);
    app.world_mut().insert_resource(ActiveFrameSource::new(source));
    app.update();

    let frame = app.world().resource::<ReconstructionFrame>();
    assert!(frame.plan.is_none());
    assert!(frame.targets.is_none());
    assert!(app.world().resource::<ResourceManager>().buffers().is_some());
}
