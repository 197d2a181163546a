//! Per-texel reconstruction math.
//!
//! Mirrors the functions of `shaders/depth_reconstruction.wgsl` one to one so
//! the CPU reference executor produces the same results as the GPU kernels.

use bevy::prelude::*;
use constants::compute::NORMAL_DISCONTINUITY_RATIO;

/// Source texel sampled for output texel `out` (nearest, with optional 90° clockwise rotation).
pub fn source_texel(out: UVec2, out_size: UVec2, source_size: UVec2, rotate_90: bool) -> UVec2 {
    let oriented = if rotate_90 {
        UVec2::new(source_size.y, source_size.x)
    } else {
        source_size
    };
    let scaled = (out.as_vec2() + 0.5) * oriented.as_vec2() / out_size.as_vec2();
    let texel = scaled.floor().as_uvec2().min(oriented - UVec2::ONE);

    if rotate_90 {
        UVec2::new(texel.y, source_size.y - 1 - texel.x)
    } else {
        texel
    }
}

/// Re-encodes a decoded colour for storage in a non-sRGB target. Alpha is untouched.
pub fn linear_to_srgb(colour: Vec4) -> Vec4 {
    let encode = |linear: f32| {
        if linear <= 0.003_130_8 {
            linear * 12.92
        } else {
            1.055 * linear.powf(1.0 / 2.4) - 0.055
        }
    };
    Vec4::new(encode(colour.x), encode(colour.y), encode(colour.z), colour.w)
}

pub fn is_valid_depth(depth: f32) -> bool {
    depth > 0.0 && depth.is_finite()
}

/// Unprojects the centre of output texel `texel` at linear view `depth` into world space.
pub fn unproject(
    inverse_view_projection: Mat4,
    depth_params: Vec2,
    texel: UVec2,
    size: UVec2,
    depth: f32,
) -> Vec3 {
    let uv = (texel.as_vec2() + 0.5) / size.as_vec2();
    let ndc = Vec3::new(
        uv.x * 2.0 - 1.0,
        1.0 - uv.y * 2.0,
        (depth_params.x * depth + depth_params.y) / depth,
    );
    inverse_view_projection.project_point3(ndc)
}

/// World position with the stencil passed through in w. Invalid depth yields all zeros.
pub fn world_position(
    inverse_view_projection: Mat4,
    depth_params: Vec2,
    texel: UVec2,
    size: UVec2,
    depth: f32,
    stencil: f32,
) -> Vec4 {
    if !is_valid_depth(depth) {
        return Vec4::ZERO;
    }
    unproject(inverse_view_projection, depth_params, texel, size, depth).extend(stencil)
}

/// World displacement per second in xyz, speed in w.
pub fn velocity(current: Vec4, previous: Vec4, delta_time: f32, history_valid: bool) -> Vec4 {
    if !history_valid || delta_time <= 0.0 {
        return Vec4::ZERO;
    }
    let displacement = (current.truncate() - previous.truncate()) / delta_time;
    displacement.extend(displacement.length())
}

/// View-facing normal from neighbouring positions, confidence from depth continuity.
pub fn normal_confidence(
    centre: Vec3,
    right: Vec3,
    below: Vec3,
    depths: [f32; 3],
) -> Vec4 {
    let [centre_depth, right_depth, below_depth] = depths;
    if !depths.iter().all(|depth| is_valid_depth(*depth)) {
        return Vec4::ZERO;
    }

    let normal = (below - centre).cross(right - centre).normalize_or_zero();
    if normal == Vec3::ZERO {
        return Vec4::ZERO;
    }

    let jump = (right_depth - centre_depth)
        .abs()
        .max((below_depth - centre_depth).abs());
    let confidence = 1.0 - (jump / (centre_depth * NORMAL_DISCONTINUITY_RATIO)).clamp(0.0, 1.0);
    normal.extend(confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_mapping_without_resample_or_rotation() {
        let size = UVec2::new(256, 192);
        for texel in [UVec2::ZERO, UVec2::new(17, 101), UVec2::new(255, 191)] {
            assert_eq!(source_texel(texel, size, size, false), texel);
        }
    }

    #[test]
    fn rotation_maps_corners_clockwise() {
        let source = UVec2::new(4, 2);
        let out = UVec2::new(2, 4);

        // Output top-left comes from the source's bottom-left.
        assert_eq!(source_texel(UVec2::new(0, 0), out, source, true), UVec2::new(0, 1));
        // Output top-right comes from the source's top-left.
        assert_eq!(source_texel(UVec2::new(1, 0), out, source, true), UVec2::new(0, 0));
        assert_eq!(source_texel(UVec2::new(1, 3), out, source, true), UVec2::new(3, 0));
    }

    #[test]
    fn resample_stays_in_bounds() {
        let source = UVec2::new(256, 192);
        let out = UVec2::new(768, 768);
        let last = source_texel(UVec2::new(767, 767), out, source, false);
        assert_eq!(last, UVec2::new(255, 191));
        let half = source_texel(UVec2::new(383, 383), out, source, false);
        assert_eq!(half, UVec2::new(127, 95));
    }

    #[test]
    fn srgb_encoding_brightens_midtones() {
        let encoded = linear_to_srgb(Vec4::new(0.0, 0.214, 1.0, 0.5));
        assert_eq!(encoded.x, 0.0);
        assert!((encoded.y - 0.5).abs() < 1.0e-3, "{encoded:?}");
        assert!((encoded.z - 1.0).abs() < 1.0e-6);
        assert_eq!(encoded.w, 0.5);
    }

    #[test]
    fn velocity_is_zero_without_history() {
        let current = Vec4::new(1.0, 2.0, 3.0, 1.0);
        assert_eq!(velocity(current, Vec4::ZERO, 0.016, false), Vec4::ZERO);
        assert_eq!(velocity(current, current, 0.016, true), Vec4::ZERO);

        let moved = velocity(current, Vec4::new(1.0, 2.0, 2.0, 1.0), 0.5, true);
        assert_eq!(moved, Vec4::new(0.0, 0.0, 2.0, 2.0));
    }

    #[test]
    fn flat_wall_faces_the_camera_with_full_confidence() {
        let centre = Vec3::new(0.0, 0.0, -2.0);
        let right = Vec3::new(0.01, 0.0, -2.0);
        let below = Vec3::new(0.0, -0.01, -2.0);

        let result = normal_confidence(centre, right, below, [2.0, 2.0, 2.0]);
        assert!((result.truncate() - Vec3::Z).length() < 1e-5);
        assert_eq!(result.w, 1.0);

        let edge = normal_confidence(centre, right, below, [2.0, 2.5, 2.0]);
        assert_eq!(edge.w, 0.0);
    }
}
