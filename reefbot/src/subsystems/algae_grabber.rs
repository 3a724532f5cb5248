use rio_command::{subsystem::Subsystem, Result};

use crate::constants::{can, dio};
use crate::hardware::{DigitalInput, Motor};

const INTAKE_OUTPUT: f64 = 0.7;
const OUTTAKE_OUTPUT: f64 = -0.8;

const SIM_ACQUIRE_TICKS: u32 = 20;
const SIM_RELEASE_TICKS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WristPosition {
    Stowed,
    Deployed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GrabberMode {
    Idle,
    Intake,
    Outtake,
}

/// Ground-pickup algae mechanism: a wrist that folds out and a roller pair
/// with a presence sensor.
#[derive(Debug)]
pub struct AlgaeGrabber {
    roller: Motor,
    sensor: DigitalInput,
    wrist: WristPosition,
    mode: GrabberMode,
    ticks_in_mode: u32,
}

impl AlgaeGrabber {
    pub fn new() -> Result<Self> {
        Ok(Self {
            roller: Motor::new(can::ALGAE_GRABBER)?,
            sensor: DigitalInput::new(dio::ALGAE_SENSOR),
            wrist: WristPosition::Stowed,
            mode: GrabberMode::Idle,
            ticks_in_mode: 0,
        })
    }

    pub fn intake(&mut self) {
        self.wrist = WristPosition::Deployed;
        self.set_mode(GrabberMode::Intake);
    }

    pub fn outtake(&mut self) {
        self.wrist = WristPosition::Deployed;
        self.set_mode(GrabberMode::Outtake);
    }

    /// Idle the rollers without moving the wrist.
    pub fn stop(&mut self) {
        self.set_mode(GrabberMode::Idle);
    }

    pub fn stop_and_stow(&mut self) {
        self.wrist = WristPosition::Stowed;
        self.set_mode(GrabberMode::Idle);
    }

    pub fn has_algae(&self) -> bool {
        self.sensor.get()
    }

    pub fn wrist(&self) -> WristPosition {
        self.wrist
    }

    pub fn disable(&mut self) {
        self.stop_and_stow();
        self.roller.stop();
    }

    pub fn set_sim_algae(&mut self, present: bool) {
        self.sensor.set_simulated(present);
    }

    fn set_mode(&mut self, mode: GrabberMode) {
        if self.mode != mode {
            self.mode = mode;
            self.ticks_in_mode = 0;
        }
    }
}

impl Subsystem for AlgaeGrabber {
    fn periodic(&mut self) {
        self.ticks_in_mode = self.ticks_in_mode.saturating_add(1);
        self.roller.set(match self.mode {
            GrabberMode::Idle => 0.0,
            GrabberMode::Intake => INTAKE_OUTPUT,
            GrabberMode::Outtake => OUTTAKE_OUTPUT,
        });
    }

    fn sim_periodic(&mut self) {
        match self.mode {
            GrabberMode::Intake if !self.has_algae() && self.ticks_in_mode >= SIM_ACQUIRE_TICKS => {
                self.sensor.set_simulated(true);
            }
            GrabberMode::Outtake if self.has_algae() && self.ticks_in_mode >= SIM_RELEASE_TICKS => {
                self.sensor.set_simulated(false);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intake_deploys_the_wrist() {
        let mut grabber = AlgaeGrabber::new().unwrap();
        assert_eq!(grabber.wrist(), WristPosition::Stowed);

        grabber.intake();
        grabber.periodic();
        assert_eq!(grabber.wrist(), WristPosition::Deployed);
        assert_eq!(grabber.roller.get(), INTAKE_OUTPUT);

        grabber.stop_and_stow();
        grabber.periodic();
        assert_eq!(grabber.wrist(), WristPosition::Stowed);
        assert_eq!(grabber.roller.get(), 0.0);
    }

    #[test]
    fn presence_sensor_drives_has_algae() {
        let mut grabber = AlgaeGrabber::new().unwrap();
        assert!(!grabber.has_algae());
        grabber.set_sim_algae(true);
        assert!(grabber.has_algae());
    }
}
