//! Property names looked up on effect instances, in priority order.
//!
//! The first alias an instance exposes with the matching property type wins.
//! Several names carry spaces because authoring tools emit them that way.

pub const DEPTH_MAP_ALIASES: &[&str] = &["DepthMap", "DepthTexture", "Depth", "_Depth"];
pub const STENCIL_MAP_ALIASES: &[&str] = &["StencilMap", "HumanStencil", "Stencil", "_Stencil"];
pub const POSITION_MAP_ALIASES: &[&str] = &["PositionMap", "Position", "WorldPosition", "WorldPos"];
pub const COLOR_MAP_ALIASES: &[&str] = &["ColorMap", "ColorTexture", "Color", "_MainTex"];
pub const VELOCITY_MAP_ALIASES: &[&str] = &["VelocityMap", "Velocity", "MotionVector"];
pub const NORMAL_MAP_ALIASES: &[&str] = &["NormalMap", "ConfidenceMap", "Normals"];

pub const RAY_PARAMS_ALIASES: &[&str] = &["RayParams", "CameraParams", "RayParamsMatrix"];
pub const INVERSE_VIEW_ALIASES: &[&str] = &["InverseView", "InvView", "InverseViewMatrix"];
pub const INVERSE_PROJECTION_ALIASES: &[&str] =
    &["InverseProjection", "InvProj", "InverseProjectionMatrix"];
pub const DEPTH_RANGE_ALIASES: &[&str] = &["DepthRange", "ClipRange"];

pub const THROTTLE_ALIASES: &[&str] = &["Throttle", "Intensity", "Scale"];
pub const AUDIO_VOLUME_ALIASES: &[&str] = &["AudioVolume", "Volume"];
pub const AUDIO_BANDS_ALIASES: &[&str] = &["AudioBands", "Bands"];

pub const HUE_SHIFT_ALIASES: &[&str] = &["HueShift", "Hue"];
pub const BRIGHTNESS_ALIASES: &[&str] = &["Brightness", "Exposure"];
pub const ALPHA_ALIASES: &[&str] = &["Alpha", "Opacity", "Alpha Scale"];
pub const SPAWN_RATE_ALIASES: &[&str] = &["SpawnRate", "Spawn Rate", "Spawn rate"];
pub const DEPTH_OFFSET_ALIASES: &[&str] = &["DepthOffset", "Depth Offset"];
pub const MAP_WIDTH_ALIASES: &[&str] = &["MapWidth"];
pub const MAP_HEIGHT_ALIASES: &[&str] = &["MapHeight"];

/// Event fired on bound instances after each successful reconstruction.
pub const DEPTH_UPDATE_EVENT: &str = "OnDepthUpdate";
