//! Main-to-render world extraction that is not covered by `ExtractResourcePlugin`.

/// Application state mirrored into the render world.
pub mod app_state;
