//! GPU render target ownership for depth reconstruction.
//!
//! The Resource Manager is the only place render targets are created or
//! dropped. The kernel writes into them and the binding layer hands their
//! handles to effect instances.

/// Bitset of optional outputs the buffers are allocated for.
pub mod feature_flags;

/// Render target set and the texture formats and usages of each target.
pub mod reconstruction_buffers;

/// Allocation, resize and release of the reconstruction buffers.
pub mod resource_manager;
