use bevy::math::Vec2;

/// Threads per workgroup along each axis. Must match `@workgroup_size` in the WGSL.
pub const WORKGROUP_SIZE: u32 = 8;

/// Near and far clip in metres when the frame source does not report one.
pub const DEFAULT_DEPTH_RANGE: Vec2 = Vec2::new(0.1, 10.0);

/// Used until the render device reports its own 2D texture limit.
pub const FALLBACK_MAX_TEXTURE_DIMENSION: u32 = 8192;

/// Relative depth jump between neighbours at which normal confidence reaches zero.
pub const NORMAL_DISCONTINUITY_RATIO: f32 = 0.1;

/// Matrices with a determinant below this magnitude are treated as singular.
pub const MIN_MATRIX_DETERMINANT: f32 = 1.0e-12;
