use bevy::prelude::*;

use crate::engine::binding::effect::VisualEffect;
use crate::engine::binding::frame_bindings::EffectParameters;
use crate::engine::binding::mode::Mode;
use crate::engine::binding::mode_controller::EffectBinding;
use crate::engine::binding::signal::PropertyKind;

/// Spawns effect instances authored with differing property names, so that
/// alias resolution and mode fallback are visible on the status overlay.
pub fn spawn_demo_effects(mut commands: Commands) {
    let silhouette = VisualEffect::new("Silhouette particles")
        .with_property("DepthMap", PropertyKind::Texture)
        .with_property("HumanStencil", PropertyKind::Texture)
        .with_property("ColorTexture", PropertyKind::Texture)
        .with_property("Velocity", PropertyKind::Texture)
        .with_property("RayParams", PropertyKind::Vec4)
        .with_property("InvView", PropertyKind::Mat4)
        .with_property("Spawn Rate", PropertyKind::Float)
        .with_property("MapWidth", PropertyKind::Float)
        .with_property("MapHeight", PropertyKind::Float);

    let point_swarm = VisualEffect::new("World point swarm")
        .with_property("Depth", PropertyKind::Texture)
        .with_property("WorldPos", PropertyKind::Texture)
        .with_property("ConfidenceMap", PropertyKind::Texture)
        .with_property("ClipRange", PropertyKind::Vec2)
        .with_property("Intensity", PropertyKind::Float)
        .with_property("Depth Offset", PropertyKind::Float);

    let audio_ribbons = VisualEffect::new("Audio ribbons")
        .with_property("Volume", PropertyKind::Float)
        .with_property("Bands", PropertyKind::Vec4)
        .with_property("_MainTex", PropertyKind::Texture)
        .with_property("Hue", PropertyKind::Float)
        .with_property("Opacity", PropertyKind::Float);

    commands.spawn((Name::new("Silhouette particles"), silhouette, EffectBinding::default()));
    commands.spawn((
        Name::new("World point swarm"),
        point_swarm,
        EffectBinding::default(),
        EffectParameters {
            throttle: 0.75,
            ..default()
        },
    ));
    commands.spawn((
        Name::new("Audio ribbons"),
        audio_ribbons,
        EffectBinding::with_mode(Mode::Audio),
        EffectParameters {
            alpha: 0.8,
            ..default()
        },
    ));
}
