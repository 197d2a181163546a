use bevy::prelude::*;

use crate::engine::binding::mode::Mode;
use crate::engine::binding::mode_controller::ModeState;

/// Digit keys 1 to 6 select a mode directly; Tab cycles to the next one.
/// Mode changes re-bind every effect through `ModeState` change detection.
/// Keyboard input is compiled out for WASM builds, where the host page drives the mode.
pub fn mode_switch_system(
    mut mode_state: ResMut<ModeState>,
    #[cfg(not(target_arch = "wasm32"))] keyboard: Res<ButtonInput<KeyCode>>,
) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        const MODE_KEYS: [(KeyCode, Mode); 6] = [
            (KeyCode::Digit1, Mode::People),
            (KeyCode::Digit2, Mode::Face),
            (KeyCode::Digit3, Mode::Hands),
            (KeyCode::Digit4, Mode::Environment),
            (KeyCode::Digit5, Mode::Audio),
            (KeyCode::Digit6, Mode::Hybrid),
        ];

        let mut new_mode = MODE_KEYS
            .iter()
            .find(|(key, _)| keyboard.just_pressed(*key))
            .map(|(_, mode)| *mode);

        if keyboard.just_pressed(KeyCode::Tab) {
            new_mode = Some(mode_state.requested.next());
        }

        if let Some(mode) = new_mode.filter(|mode| *mode != mode_state.requested) {
            info!("Mode requested: {mode}");
            mode_state.requested = mode;
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        let _ = &mut mode_state;
    }
}
