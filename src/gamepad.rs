use crate::{
    command::button::Trigger,
    station::{DriverStation, GamepadState},
};

/// Buttons on a standard gamepad, numbered into the station bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    A = 0,
    B = 1,
    X = 2,
    Y = 3,
    LeftBumper = 4,
    RightBumper = 5,
    Back = 6,
    Start = 7,
    LeftStick = 8,
    RightStick = 9,
}

impl Button {
    #[inline]
    fn mask(self) -> u32 {
        1 << (self as u32)
    }
}

/// POV hat angles, degrees clockwise from up.
const POV_UP: u16 = 0;
const POV_RIGHT: u16 = 90;
const POV_DOWN: u16 = 180;
const POV_LEFT: u16 = 270;

/// A gamepad on a driver-station port. Cheap to copy; every read goes to the
/// station's current snapshot, so handles can live inside `'static` trigger
/// conditions.
#[derive(Debug, Clone, Copy)]
pub struct Gamepad {
    port: usize,
}

impl Gamepad {
    pub fn new(port: usize) -> Self {
        Self { port }
    }

    pub fn port(&self) -> usize {
        self.port
    }

    fn state(&self) -> GamepadState {
        DriverStation::instance().gamepad(self.port)
    }

    pub fn is_connected(&self) -> bool {
        self.state().connected
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.state().buttons & button.mask() != 0
    }

    pub fn left_x(&self) -> f64 {
        self.state().axes[0]
    }

    pub fn left_y(&self) -> f64 {
        self.state().axes[1]
    }

    pub fn right_x(&self) -> f64 {
        self.state().axes[2]
    }

    pub fn right_y(&self) -> f64 {
        self.state().axes[3]
    }

    pub fn left_trigger(&self) -> f64 {
        self.state().axes[4]
    }

    pub fn right_trigger(&self) -> f64 {
        self.state().axes[5]
    }

    pub fn pov(&self) -> Option<u16> {
        self.state().pov
    }

    /// A trigger tracking one button on this gamepad.
    pub fn button(&self, button: Button) -> Trigger {
        let gamepad = *self;
        Trigger::new(move || gamepad.is_pressed(button))
    }

    pub fn a(&self) -> Trigger {
        self.button(Button::A)
    }

    pub fn b(&self) -> Trigger {
        self.button(Button::B)
    }

    pub fn x(&self) -> Trigger {
        self.button(Button::X)
    }

    pub fn y(&self) -> Trigger {
        self.button(Button::Y)
    }

    pub fn left_bumper(&self) -> Trigger {
        self.button(Button::LeftBumper)
    }

    pub fn right_bumper(&self) -> Trigger {
        self.button(Button::RightBumper)
    }

    pub fn back(&self) -> Trigger {
        self.button(Button::Back)
    }

    pub fn start(&self) -> Trigger {
        self.button(Button::Start)
    }

    fn pov_at(&self, angle: u16) -> Trigger {
        let gamepad = *self;
        Trigger::new(move || gamepad.pov() == Some(angle))
    }

    pub fn pov_up(&self) -> Trigger {
        self.pov_at(POV_UP)
    }

    pub fn pov_right(&self) -> Trigger {
        self.pov_at(POV_RIGHT)
    }

    pub fn pov_down(&self) -> Trigger {
        self.pov_at(POV_DOWN)
    }

    pub fn pov_left(&self) -> Trigger {
        self.pov_at(POV_LEFT)
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn press(port: usize, button: Button) {
        let mut state = GamepadState {
            connected: true,
            ..Default::default()
        };
        state.buttons = button.mask();
        DriverStation::instance().update_gamepad(port, state);
    }

    #[test]
    #[serial]
    fn button_triggers_track_the_station_snapshot() {
        let station = DriverStation::instance();
        station.reset();
        let gamepad = Gamepad::new(0);

        let a = gamepad.a();
        assert!(!a.is_active());

        press(0, Button::A);
        assert!(a.is_active());
        assert!(!gamepad.b().is_active());

        station.reset();
    }

    #[test]
    #[serial]
    fn pov_triggers_match_one_direction_only() {
        let station = DriverStation::instance();
        station.reset();
        let gamepad = Gamepad::new(1);

        let mut state = GamepadState::default();
        state.pov = Some(270);
        station.update_gamepad(1, state);

        assert!(gamepad.pov_left().is_active());
        assert!(!gamepad.pov_right().is_active());
        assert!(!gamepad.pov_up().is_active());

        station.reset();
    }

    #[test]
    #[serial]
    fn axes_read_back_in_order() {
        let station = DriverStation::instance();
        station.reset();
        let gamepad = Gamepad::new(2);

        let mut state = GamepadState::default();
        state.axes = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        station.update_gamepad(2, state);

        assert_eq!(gamepad.left_x(), 0.1);
        assert_eq!(gamepad.left_y(), 0.2);
        assert_eq!(gamepad.right_x(), 0.3);
        assert_eq!(gamepad.right_y(), 0.4);
        assert_eq!(gamepad.left_trigger(), 0.5);
        assert_eq!(gamepad.right_trigger(), 0.6);

        station.reset();
    }
}
