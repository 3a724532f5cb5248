use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::robot::CompetitionMode;

/// Joystick slots exposed by the driver station.
pub const GAMEPAD_PORTS: usize = 6;

/// Raw input state for one gamepad port.
#[derive(Debug, Clone)]
pub struct GamepadState {
    /// Left X/Y, right X/Y, left trigger, right trigger. Range [-1, 1].
    pub axes: [f64; 6],
    /// Bitmask indexed by [`crate::gamepad::Button`].
    pub buttons: u32,
    /// POV hat angle in degrees clockwise from up, `None` when centered.
    pub pov: Option<u16>,
    pub connected: bool,
}

impl Default for GamepadState {
    fn default() -> Self {
        Self {
            axes: [0.0; 6],
            buttons: 0,
            pov: None,
            connected: false,
        }
    }
}

#[derive(Default)]
struct StationState {
    mode: Option<CompetitionMode>,
    gamepads: [GamepadState; GAMEPAD_PORTS],
}

/// Shared snapshot of match state: the competition mode and the input state
/// of every gamepad port. Written by the IO or simulation side, read by the
/// robot loop, the scheduler, and trigger conditions.
pub struct DriverStation {
    state: RwLock<StationState>,
}

impl DriverStation {
    pub fn instance() -> &'static DriverStation {
        static INSTANCE: OnceLock<DriverStation> = OnceLock::new();
        INSTANCE.get_or_init(|| DriverStation {
            state: RwLock::new(StationState::default()),
        })
    }

    /// Until the station reports anything, the robot is disabled.
    pub fn mode(&self) -> CompetitionMode {
        self.state.read().mode.unwrap_or(CompetitionMode::Disabled)
    }

    pub fn set_mode(&self, mode: CompetitionMode) {
        self.state.write().mode = Some(mode);
    }

    pub fn is_disabled(&self) -> bool {
        self.mode() == CompetitionMode::Disabled
    }

    pub fn is_enabled(&self) -> bool {
        !self.is_disabled()
    }

    /// A port past the station's slots reads as a disconnected gamepad.
    pub fn gamepad(&self, port: usize) -> GamepadState {
        self.state
            .read()
            .gamepads
            .get(port)
            .cloned()
            .unwrap_or_default()
    }

    pub fn update_gamepad(&self, port: usize, state: GamepadState) {
        if let Some(slot) = self.state.write().gamepads.get_mut(port) {
            *slot = state;
        } else {
            tracing::warn!(port, "ignoring update for a gamepad port past the station's slots");
        }
    }

    /// Back to power-on state. Test support.
    #[doc(hidden)]
    pub fn reset(&self) {
        *self.state.write() = StationState::default();
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn powers_on_disabled() {
        let station = DriverStation::instance();
        station.reset();

        assert_eq!(station.mode(), CompetitionMode::Disabled);
        assert!(station.is_disabled());
        assert!(!station.gamepad(0).connected);
    }

    #[test]
    #[serial]
    fn gamepad_state_round_trips() {
        let station = DriverStation::instance();
        station.reset();

        let mut state = GamepadState {
            connected: true,
            ..Default::default()
        };
        state.axes[1] = -0.5;
        state.buttons = 0b10;
        state.pov = Some(90);
        station.update_gamepad(1, state);

        let read_back = station.gamepad(1);
        assert!(read_back.connected);
        assert_eq!(read_back.axes[1], -0.5);
        assert_eq!(read_back.buttons, 0b10);
        assert_eq!(read_back.pov, Some(90));

        station.reset();
    }
}
