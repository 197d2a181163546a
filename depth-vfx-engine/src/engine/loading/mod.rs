//! Startup loading of the runtime pipeline configuration.
//!
//! The app stays in `Loading` until the config asset has been applied (or
//! replaced by defaults when it fails to load).

/// Pipeline config loading and installation of the resources it describes.
pub mod config_loader;
