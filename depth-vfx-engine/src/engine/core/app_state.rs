use bevy::prelude::*;

use crate::engine::loading::config_loader::ConfigLoader;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States, Resource)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

#[derive(Component)]
pub struct FpsText;

// Final transition to running state
pub fn transition_to_running(
    loader: Res<ConfigLoader>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if loader.is_applied() {
        info!("→ Pipeline configured, transitioning to Running state");
        next_state.set(AppState::Running);
    }
}
