//! Runtime configuration loaded as Bevy assets.

/// JSON pipeline tunables with validation and derived resources.
pub mod pipeline_config;
