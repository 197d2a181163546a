use bevy::prelude::*;

use crate::engine::binding::effect::EffectInstance;
use crate::engine::binding::plan::BindingPlan;
use crate::engine::binding::signal::Signal;
use crate::engine::buffers::reconstruction_buffers::{CameraBindings, ReconstructionBuffers};

/// Levels written by an external audio analyser.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioLevels {
    pub volume: f32,
    pub bands: Vec4,
}

/// Per-effect scalar parameters. Entities without this component use the defaults.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct EffectParameters {
    pub throttle: f32,
    pub hue_shift: f32,
    pub brightness: f32,
    pub alpha: f32,
    pub spawn_rate: f32,
    pub depth_offset: f32,
    /// Overrides the camera depth range written to `DepthRange`.
    pub depth_range: Option<Vec2>,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            throttle: 1.0,
            hue_shift: 0.0,
            brightness: 1.0,
            alpha: 1.0,
            spawn_rate: 1.0,
            depth_offset: 0.0,
            depth_range: None,
        }
    }
}

/// Everything shared by all effects for one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameBindings {
    pub depth: Option<Handle<Image>>,
    pub stencil: Option<Handle<Image>>,
    pub position: Option<Handle<Image>>,
    pub color: Option<Handle<Image>>,
    pub velocity: Option<Handle<Image>>,
    pub normals: Option<Handle<Image>>,
    pub camera: Option<CameraBindings>,
    pub map_size: UVec2,
    pub audio: AudioLevels,
}

impl FrameBindings {
    pub fn from_buffers(buffers: Option<&ReconstructionBuffers>, audio: AudioLevels) -> Self {
        let Some(buffers) = buffers else {
            return Self {
                audio,
                ..default()
            };
        };

        Self {
            depth: Some(buffers.depth.clone()),
            stencil: Some(buffers.stencil.clone()),
            position: Some(buffers.position.clone()),
            color: buffers.color.clone(),
            velocity: buffers.velocity.clone(),
            normals: buffers.normals.clone(),
            camera: buffers.camera,
            map_size: buffers.dimensions,
            audio,
        }
    }
}

/// Writes every bound signal once through its resolved alias. Signals whose
/// value is not available this frame are left untouched. Returns the number
/// of writes made.
pub fn bind_frame(
    instance: &mut dyn EffectInstance,
    plan: &BindingPlan,
    frame: &FrameBindings,
    parameters: &EffectParameters,
) -> usize {
    let mut writes = 0;

    for (signal, alias) in plan.bound_signals() {
        let written = match signal {
            Signal::DepthMap => write_texture(instance, alias, &frame.depth),
            Signal::StencilMap => write_texture(instance, alias, &frame.stencil),
            Signal::PositionMap => write_texture(instance, alias, &frame.position),
            Signal::ColorMap => write_texture(instance, alias, &frame.color),
            Signal::VelocityMap => write_texture(instance, alias, &frame.velocity),
            Signal::NormalMap => write_texture(instance, alias, &frame.normals),
            Signal::RayParams | Signal::InverseView | Signal::InverseProjection => {
                let Some(camera) = frame.camera else {
                    continue;
                };
                match signal {
                    Signal::RayParams => instance.set_vec4(alias, camera.ray_params),
                    Signal::InverseView => instance.set_mat4(alias, camera.inverse_view),
                    _ => instance.set_mat4(alias, camera.inverse_projection),
                }
                true
            }
            Signal::DepthRange => {
                let range = parameters.depth_range.or(frame.camera.map(|c| c.depth_range));
                if let Some(range) = range {
                    instance.set_vec2(alias, range);
                }
                range.is_some()
            }
            Signal::AudioBands => {
                instance.set_vec4(alias, frame.audio.bands);
                true
            }
            Signal::MapWidth | Signal::MapHeight => {
                let extent = if signal == Signal::MapWidth {
                    frame.map_size.x
                } else {
                    frame.map_size.y
                };
                if extent > 0 {
                    instance.set_float(alias, extent as f32);
                }
                extent > 0
            }
            Signal::Throttle
            | Signal::AudioVolume
            | Signal::HueShift
            | Signal::Brightness
            | Signal::Alpha
            | Signal::SpawnRate
            | Signal::DepthOffset => {
                instance.set_float(alias, scalar(signal, frame, parameters));
                true
            }
        };
        writes += usize::from(written);
    }

    writes
}

fn write_texture(
    instance: &mut dyn EffectInstance,
    alias: &str,
    handle: &Option<Handle<Image>>,
) -> bool {
    match handle {
        Some(handle) => {
            instance.set_texture(alias, handle.clone());
            true
        }
        None => false,
    }
}

fn scalar(signal: Signal, frame: &FrameBindings, parameters: &EffectParameters) -> f32 {
    match signal {
        Signal::AudioVolume => frame.audio.volume,
        Signal::HueShift => parameters.hue_shift,
        Signal::Brightness => parameters.brightness,
        Signal::Alpha => parameters.alpha,
        Signal::SpawnRate => parameters.spawn_rate,
        Signal::DepthOffset => parameters.depth_offset,
        _ => parameters.throttle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::binding::effect::{PropertyValue, VisualEffect};
    use crate::engine::binding::mode::Mode;
    use crate::engine::binding::resolver::PropertyBindingResolver;
    use crate::engine::binding::signal::PropertyKind;
    use crate::engine::buffers::feature_flags::FeatureFlags;
    use crate::engine::buffers::resource_manager::ResourceManager;

    fn frame(images: &mut Assets<Image>) -> FrameBindings {
        let mut manager = ResourceManager::default();
        manager
            .ensure(images, UVec2::new(256, 192), FeatureFlags::COLOR)
            .expect("valid extent");
        manager.record_camera(CameraBindings {
            ray_params: Vec4::new(0.0, 0.0, 1.0, 1.0),
            inverse_view: Mat4::IDENTITY,
            inverse_projection: Mat4::IDENTITY,
            depth_range: Vec2::new(0.5, 3.0),
        });
        FrameBindings::from_buffers(manager.buffers(), AudioLevels::default())
    }

    #[test]
    fn only_bound_signals_are_written() {
        let mut images = Assets::<Image>::default();
        let frame = frame(&mut images);
        let mut effect = VisualEffect::new("particles")
            .with_property("Depth", PropertyKind::Texture)
            .with_property("Volume", PropertyKind::Float)
            .with_property("MapWidth", PropertyKind::Float)
            .with_property("ClipRange", PropertyKind::Vec2);

        let application = PropertyBindingResolver::default().apply_mode(&effect, Mode::Environment);
        let writes = bind_frame(&mut effect, &application.plan, &frame, &EffectParameters::default());

        assert_eq!(writes, 3);
        assert_eq!(effect.texture("Depth"), frame.depth.as_ref());
        assert_eq!(effect.float("MapWidth"), Some(256.0));
        assert_eq!(effect.value("ClipRange"), Some(&PropertyValue::Vec2(Vec2::new(0.5, 3.0))));
        assert!(effect.value("Volume").is_none());
    }

    #[test]
    fn missing_optional_targets_are_skipped() {
        let mut images = Assets::<Image>::default();
        let frame = frame(&mut images);
        let mut effect = VisualEffect::new("trails")
            .with_property("Position", PropertyKind::Texture)
            .with_property("Velocity", PropertyKind::Texture);

        let application = PropertyBindingResolver::default().apply_mode(&effect, Mode::Hands);
        let writes = bind_frame(&mut effect, &application.plan, &frame, &EffectParameters::default());

        assert_eq!(writes, 1);
        assert!(effect.value("Velocity").is_none());
    }

    #[test]
    fn parameter_override_wins_over_camera_range() {
        let mut images = Assets::<Image>::default();
        let frame = frame(&mut images);
        let mut effect = VisualEffect::new("fog")
            .with_property("Depth", PropertyKind::Texture)
            .with_property("DepthRange", PropertyKind::Vec2);
        let parameters = EffectParameters {
            depth_range: Some(Vec2::new(1.0, 2.0)),
            ..default()
        };

        let application = PropertyBindingResolver::default().apply_mode(&effect, Mode::People);
        bind_frame(&mut effect, &application.plan, &frame, &parameters);

        assert_eq!(effect.value("DepthRange"), Some(&PropertyValue::Vec2(Vec2::new(1.0, 2.0))));
    }
}
