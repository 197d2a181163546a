use bevy::prelude::*;
use constants::compute::MIN_MATRIX_DETERMINANT;

use crate::engine::buffers::reconstruction_buffers::CameraBindings;
use crate::engine::error::FrameError;
use crate::engine::source::frame_source::FrameSample;

/// Camera matrices derived once per frame on the CPU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub projection: Mat4,
    pub camera_to_world: Mat4,
    pub inverse_view_projection: Mat4,
    pub inverse_projection: Mat4,
    /// Principal point offset in xy and tangent half-extents in zw.
    pub ray_params: Vec4,
    /// Maps linear view depth `d` to NDC depth as `(x * d + y) / d`.
    pub depth_params: Vec2,
    pub depth_range: Vec2,
}

impl FrameMatrices {
    pub fn from_sample(sample: &FrameSample) -> Result<Self, FrameError> {
        let projection = sample.projection.ok_or(FrameError::MissingProjection)?;
        let camera_to_world = sample
            .camera_to_world
            .ok_or(FrameError::MissingCameraToWorld)?;
        Self::from_camera(projection, camera_to_world, sample.depth_range)
    }

    pub fn from_camera(
        projection: Mat4,
        camera_to_world: Mat4,
        depth_range: Vec2,
    ) -> Result<Self, FrameError> {
        if !projection.is_finite() || !camera_to_world.is_finite() {
            return Err(FrameError::NonFinite);
        }

        let focal = Vec2::new(projection.x_axis.x, projection.y_axis.y);
        // Perspective projections carry ±1 in the w row of the z column.
        let view_sign = projection.z_axis.w;
        if focal.x == 0.0 || focal.y == 0.0 || view_sign == 0.0 {
            return Err(FrameError::DegenerateProjection);
        }

        if camera_to_world.determinant().abs() < MIN_MATRIX_DETERMINANT {
            return Err(FrameError::Singular);
        }
        let view_projection = projection * camera_to_world.inverse();
        let determinant = view_projection.determinant();
        if !determinant.is_finite() || determinant.abs() < MIN_MATRIX_DETERMINANT {
            return Err(FrameError::Singular);
        }

        let inverse_view_projection = view_projection.inverse();
        let inverse_projection = projection.inverse();
        if !inverse_view_projection.is_finite() || !inverse_projection.is_finite() {
            return Err(FrameError::Singular);
        }

        Ok(Self {
            projection,
            camera_to_world,
            inverse_view_projection,
            inverse_projection,
            ray_params: Vec4::new(
                projection.z_axis.x / focal.x,
                projection.z_axis.y / focal.y,
                1.0 / focal.x,
                1.0 / focal.y,
            ),
            depth_params: Vec2::new(projection.z_axis.z * view_sign.signum(), projection.w_axis.z),
            depth_range,
        })
    }

    pub fn camera_bindings(&self) -> CameraBindings {
        CameraBindings {
            ray_params: self.ray_params,
            inverse_view: self.camera_to_world,
            inverse_projection: self.inverse_projection,
            depth_range: self.depth_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> (Mat4, Mat4) {
        (
            Mat4::perspective_rh(60f32.to_radians(), 4.0 / 3.0, 0.1, 10.0),
            Mat4::from_translation(Vec3::new(0.0, 1.5, 0.0)),
        )
    }

    #[test]
    fn ray_params_match_field_of_view() {
        let (projection, camera_to_world) = camera();
        let matrices = FrameMatrices::from_camera(projection, camera_to_world, Vec2::new(0.1, 10.0))
            .expect("valid camera");

        let half_height = 30f32.to_radians().tan();
        assert!(matrices.ray_params.x.abs() < 1e-6);
        assert!(matrices.ray_params.y.abs() < 1e-6);
        assert!((matrices.ray_params.w - half_height).abs() < 1e-5);
        assert!((matrices.ray_params.z - half_height * 4.0 / 3.0).abs() < 1e-5);
        assert_eq!(matrices.camera_bindings().inverse_view, camera_to_world);
    }

    #[test]
    fn depth_params_reproduce_projected_ndc_depth() {
        let (projection, camera_to_world) = camera();
        let matrices = FrameMatrices::from_camera(projection, camera_to_world, Vec2::new(0.1, 10.0))
            .expect("valid camera");

        for depth in [0.2, 1.0, 4.5, 9.0] {
            let projected = projection.project_point3(Vec3::new(0.0, 0.0, -depth));
            let derived = (matrices.depth_params.x * depth + matrices.depth_params.y) / depth;
            assert!((projected.z - derived).abs() < 1e-5, "depth {depth}");
        }
    }

    #[test]
    fn invalid_cameras_are_rejected() {
        let (projection, camera_to_world) = camera();
        let range = Vec2::new(0.1, 10.0);

        let mut nan = projection;
        nan.x_axis.x = f32::NAN;
        assert_eq!(
            FrameMatrices::from_camera(nan, camera_to_world, range),
            Err(FrameError::NonFinite)
        );
        assert_eq!(
            FrameMatrices::from_camera(projection, Mat4::ZERO, range),
            Err(FrameError::Singular)
        );
        assert_eq!(
            FrameMatrices::from_camera(Mat4::IDENTITY, camera_to_world, range),
            Err(FrameError::DegenerateProjection)
        );
    }

    #[test]
    fn missing_matrices_are_reported() {
        let sample = FrameSample {
            depth: Handle::default(),
            stencil: None,
            color: None,
            projection: None,
            camera_to_world: Some(Mat4::IDENTITY),
            depth_range: Vec2::new(0.1, 10.0),
            orientation: Default::default(),
        };
        assert_eq!(
            FrameMatrices::from_sample(&sample),
            Err(FrameError::MissingProjection)
        );
    }
}
