use bevy::math::{UVec2, Vec2, Vec3};

pub const SYNTHETIC_DEPTH_SIZE: UVec2 = UVec2::new(256, 192);

/// Depth at the frame centre and at the corners, in metres.
pub const SYNTHETIC_NEAR_DEPTH: f32 = 0.5;
pub const SYNTHETIC_FAR_DEPTH: f32 = 3.0;

/// Circular human mask centred in the frame, radius in texels.
pub const SYNTHETIC_MASK_CENTRE: Vec2 = Vec2::new(128.0, 96.0);
pub const SYNTHETIC_MASK_RADIUS: f32 = 72.0;

pub const SYNTHETIC_VERTICAL_FOV_DEGREES: f32 = 60.0;
pub const SYNTHETIC_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 1.5, 0.0);
