pub mod assets;
pub mod binding;
pub mod buffers;
pub mod compute;
pub mod core;
pub mod error;
pub mod loading;
pub mod quality;
pub mod render;
pub mod scene;
pub mod source;
pub mod systems;
