use bevy::prelude::*;
use constants::compute::FALLBACK_MAX_TEXTURE_DIMENSION;

use crate::engine::buffers::feature_flags::FeatureFlags;
use crate::engine::buffers::reconstruction_buffers::{CameraBindings, ReconstructionBuffers};
use crate::engine::error::ResourceError;

/// Allocation counters for steady-state checks and the status overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub allocations: u64,
    pub failures: u64,
}

/// Sole owner of the reconstruction render targets.
///
/// Buffers are only created in [`ResourceManager::ensure`] when the requested
/// extent or feature set differs from what is live. Replaced buffers are
/// released by dropping their strong handles, which defers the GPU free until
/// the render world has stopped referencing them.
#[derive(Resource, Debug)]
pub struct ResourceManager {
    buffers: Option<ReconstructionBuffers>,
    max_dimension: u32,
    generation: u64,
    stats: ResourceStats,
    last_error: Option<ResourceError>,
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::with_max_dimension(FALLBACK_MAX_TEXTURE_DIMENSION)
    }
}

impl ResourceManager {
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            buffers: None,
            max_dimension,
            generation: 0,
            stats: ResourceStats::default(),
            last_error: None,
        }
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    pub fn set_max_dimension(&mut self, max_dimension: u32) {
        self.max_dimension = max_dimension;
    }

    /// Returns buffers of exactly `dimensions` and `features`, allocating only on change.
    ///
    /// On failure the previously live buffers are kept and stay reachable
    /// through [`ResourceManager::buffers`].
    pub fn ensure(
        &mut self,
        images: &mut Assets<Image>,
        dimensions: UVec2,
        features: FeatureFlags,
    ) -> Result<&ReconstructionBuffers, ResourceError> {
        let buffers = match self.buffers.take() {
            Some(current) if current.dimensions == dimensions && current.features == features => {
                current
            }
            previous => match self.allocate(images, dimensions, features) {
                Ok(mut fresh) => {
                    // Camera values stay meaningful across a resize.
                    fresh.camera = previous.and_then(|old| old.camera);
                    fresh
                }
                Err(error) => {
                    self.buffers = previous;
                    return Err(error);
                }
            },
        };

        Ok(self.buffers.insert(buffers))
    }

    pub fn buffers(&self) -> Option<&ReconstructionBuffers> {
        self.buffers.as_ref()
    }

    /// Stores the camera values of the frame being dispatched.
    pub fn record_camera(&mut self, camera: CameraBindings) {
        if let Some(buffers) = self.buffers.as_mut() {
            buffers.camera = Some(camera);
        }
    }

    /// Bumped on every successful allocation. Velocity history is only valid within one generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> ResourceStats {
        self.stats
    }

    pub fn last_error(&self) -> Option<ResourceError> {
        self.last_error
    }

    /// Drops every target and removes the images immediately. Used on shutdown.
    pub fn release(&mut self, images: &mut Assets<Image>) {
        if let Some(buffers) = self.buffers.take() {
            for handle in buffers.all_targets() {
                images.remove(handle);
            }
            info!("Reconstruction buffers released");
        }
    }

    /// Reallocates every target if the position, previous-position and velocity
    /// images no longer share the recorded extent. Returns true when it had to.
    pub fn resync_dimensions(&mut self, images: &mut Assets<Image>) -> bool {
        let Some(buffers) = self.buffers.as_ref() else {
            return false;
        };

        let consistent = buffers.history_targets().all(|handle| {
            images
                .get(handle)
                .is_some_and(|image| image.size() == buffers.dimensions)
        });
        if consistent {
            return false;
        }

        debug_assert!(
            consistent,
            "reconstruction history targets diverged from {:?}",
            buffers.dimensions
        );

        let (dimensions, features) = (buffers.dimensions, buffers.features);
        error!("History targets diverged from {dimensions}; reallocating");
        self.buffers = None;
        self.ensure(images, dimensions, features).is_ok()
    }

    fn allocate(
        &mut self,
        images: &mut Assets<Image>,
        dimensions: UVec2,
        features: FeatureFlags,
    ) -> Result<ReconstructionBuffers, ResourceError> {
        if let Err(error) = self.validate(dimensions) {
            self.stats.failures += 1;
            if self.last_error != Some(error) {
                warn!("Reconstruction buffer allocation failed: {error}");
            }
            self.last_error = Some(error);
            return Err(error);
        }

        self.generation += 1;
        self.stats.allocations += 1;
        self.last_error = None;
        info!(
            "Allocated reconstruction buffers {}x{} {:?} (generation {})",
            dimensions.x, dimensions.y, features, self.generation
        );

        Ok(ReconstructionBuffers::allocate(
            images,
            dimensions,
            features,
            self.generation,
        ))
    }

    fn validate(&self, dimensions: UVec2) -> Result<(), ResourceError> {
        if dimensions.x == 0 || dimensions.y == 0 {
            return Err(ResourceError::ZeroExtent {
                width: dimensions.x,
                height: dimensions.y,
            });
        }
        if dimensions.max_element() > self.max_dimension {
            return Err(ResourceError::ExceedsLimit {
                width: dimensions.x,
                height: dimensions.y,
                limit: self.max_dimension,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::render_resource::TextureUsages;

    fn flags() -> FeatureFlags {
        FeatureFlags::VELOCITY | FeatureFlags::COLOR
    }

    #[test]
    fn ensure_is_idempotent_for_unchanged_requests() {
        let mut images = Assets::<Image>::default();
        let mut manager = ResourceManager::default();

        let first = manager
            .ensure(&mut images, UVec2::new(256, 192), flags())
            .expect("valid extent")
            .position
            .clone();
        let image_count = images.len();

        for _ in 0..5 {
            let buffers = manager
                .ensure(&mut images, UVec2::new(256, 192), flags())
                .expect("valid extent");
            assert_eq!(buffers.position, first);
        }

        assert_eq!(manager.stats().allocations, 1);
        assert_eq!(manager.generation(), 1);
        assert_eq!(images.len(), image_count);
    }

    #[test]
    fn changed_flags_reallocate_with_matching_targets() {
        let mut images = Assets::<Image>::default();
        let mut manager = ResourceManager::default();
        manager
            .ensure(&mut images, UVec2::new(64, 64), FeatureFlags::empty())
            .expect("valid extent");

        let buffers = manager
            .ensure(&mut images, UVec2::new(64, 64), FeatureFlags::VELOCITY)
            .expect("valid extent");

        assert_eq!(buffers.generation, 2);
        assert!(buffers.velocity.is_some());
        assert!(buffers.previous_position.is_some());
        assert!(buffers.color.is_none());
        for handle in buffers.history_targets() {
            let image = images.get(handle).expect("target registered");
            assert_eq!(image.size(), UVec2::new(64, 64));
        }
    }

    #[test]
    fn previous_position_is_not_a_storage_target() {
        let mut images = Assets::<Image>::default();
        let mut manager = ResourceManager::default();
        let buffers = manager
            .ensure(&mut images, UVec2::new(32, 32), FeatureFlags::VELOCITY)
            .expect("valid extent");

        let usage = |handle: &Handle<Image>| {
            images
                .get(handle)
                .expect("target registered")
                .texture_descriptor
                .usage
        };
        let previous = buffers.previous_position.as_ref().expect("velocity enabled");
        let velocity = buffers.velocity.as_ref().expect("velocity enabled");

        assert!(!usage(previous).contains(TextureUsages::STORAGE_BINDING));
        assert!(usage(previous).contains(TextureUsages::COPY_DST));
        assert!(usage(velocity).contains(TextureUsages::STORAGE_BINDING));
        assert!(usage(&buffers.position).contains(TextureUsages::COPY_SRC));
    }

    #[test]
    fn failed_resize_keeps_last_known_good_buffers() {
        let mut images = Assets::<Image>::default();
        let mut manager = ResourceManager::with_max_dimension(512);
        manager
            .ensure(&mut images, UVec2::new(256, 256), flags())
            .expect("valid extent");

        let error = manager
            .ensure(&mut images, UVec2::new(768, 768), flags())
            .expect_err("over the device limit");
        assert_eq!(
            error,
            ResourceError::ExceedsLimit {
                width: 768,
                height: 768,
                limit: 512
            }
        );

        let zero = manager.ensure(&mut images, UVec2::new(0, 192), flags());
        assert!(matches!(zero, Err(ResourceError::ZeroExtent { .. })));

        let kept = manager.buffers().expect("previous buffers kept");
        assert_eq!(kept.dimensions, UVec2::new(256, 256));
        assert_eq!(manager.stats().failures, 2);
        assert_eq!(manager.generation(), 1);
    }

    #[test]
    fn camera_bindings_survive_a_resize() {
        let mut images = Assets::<Image>::default();
        let mut manager = ResourceManager::default();
        manager
            .ensure(&mut images, UVec2::new(64, 64), flags())
            .expect("valid extent");
        let camera = CameraBindings {
            ray_params: Vec4::new(0.0, 0.0, 0.77, 0.58),
            inverse_view: Mat4::IDENTITY,
            inverse_projection: Mat4::IDENTITY,
            depth_range: Vec2::new(0.1, 10.0),
        };
        manager.record_camera(camera);

        let resized = manager
            .ensure(&mut images, UVec2::new(128, 128), flags())
            .expect("valid extent");
        assert_eq!(resized.camera, Some(camera));
    }

    #[test]
    fn release_removes_every_target() {
        let mut images = Assets::<Image>::default();
        let mut manager = ResourceManager::default();
        manager
            .ensure(
                &mut images,
                UVec2::new(16, 16),
                flags() | FeatureFlags::NORMALS,
            )
            .expect("valid extent");
        assert_eq!(images.len(), 7);

        manager.release(&mut images);
        assert!(manager.buffers().is_none());
        assert_eq!(images.len(), 0);
    }

    #[test]
    fn consistent_targets_need_no_resync() {
        let mut images = Assets::<Image>::default();
        let mut manager = ResourceManager::default();
        manager
            .ensure(&mut images, UVec2::new(16, 16), flags())
            .expect("valid extent");

        assert!(!manager.resync_dimensions(&mut images));
        assert_eq!(manager.generation(), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "history targets diverged")]
    fn diverged_history_targets_assert_in_debug_builds() {
        let mut images = Assets::<Image>::default();
        let mut manager = ResourceManager::default();
        let velocity = manager
            .ensure(&mut images, UVec2::new(16, 16), flags())
            .expect("valid extent")
            .velocity
            .clone()
            .expect("velocity enabled");

        images
            .get_mut(&velocity)
            .expect("target registered")
            .texture_descriptor
            .size
            .width = 8;
        manager.resync_dimensions(&mut images);
    }
}
