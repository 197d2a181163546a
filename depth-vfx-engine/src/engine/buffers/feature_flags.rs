bitflags::bitflags! {
    /// Optional outputs and input transforms the reconstruction buffers are sized for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FeatureFlags: u8 {
        /// Velocity and previous-position buffers.
        const VELOCITY = 1 << 0;
        /// Colour buffer resampled to the reconstruction resolution.
        const COLOR = 1 << 1;
        /// Normal and confidence buffer derived from positions.
        const NORMALS = 1 << 2;
        /// Depth and stencil are rotated 90° before unprojection.
        const ROTATE_90 = 1 << 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear_individual_flags() {
        let mut flags = FeatureFlags::VELOCITY | FeatureFlags::COLOR;
        assert!(flags.contains(FeatureFlags::VELOCITY));
        assert!(!flags.contains(FeatureFlags::NORMALS));

        flags.set(FeatureFlags::COLOR, false);
        assert_eq!(flags, FeatureFlags::VELOCITY);
        assert_eq!(FeatureFlags::default(), FeatureFlags::empty());
    }
}
