use rio_command::{subsystem::Subsystem, Result};

use crate::constants::{can, dio};
use crate::hardware::{DigitalInput, Motor};

const INTAKE_OUTPUT: f64 = 0.6;
const OUTTAKE_OUTPUT: f64 = -0.5;

/// Ticks of roller motion before the simulated beam break changes state.
const SIM_ACQUIRE_TICKS: u32 = 25;
const SIM_RELEASE_TICKS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RollerMode {
    Idle,
    Intake,
    Outtake,
}

/// End-effector rollers that pull coral in until the beam break sees it.
#[derive(Debug)]
pub struct CoralRoller {
    motor: Motor,
    beam_break: DigitalInput,
    mode: RollerMode,
    ticks_in_mode: u32,
}

impl CoralRoller {
    pub fn new() -> Result<Self> {
        Ok(Self {
            motor: Motor::new(can::CORAL_ROLLER)?,
            beam_break: DigitalInput::new(dio::CORAL_BEAM_BREAK),
            mode: RollerMode::Idle,
            ticks_in_mode: 0,
        })
    }

    pub fn intake(&mut self) {
        self.set_mode(RollerMode::Intake);
    }

    pub fn outtake(&mut self) {
        self.set_mode(RollerMode::Outtake);
    }

    pub fn stop(&mut self) {
        self.set_mode(RollerMode::Idle);
    }

    pub fn has_coral(&self) -> bool {
        self.beam_break.get()
    }

    pub fn disable(&mut self) {
        self.stop();
        self.motor.stop();
    }

    pub fn set_sim_coral(&mut self, present: bool) {
        self.beam_break.set_simulated(present);
    }

    fn set_mode(&mut self, mode: RollerMode) {
        if self.mode != mode {
            self.mode = mode;
            self.ticks_in_mode = 0;
        }
    }
}

impl Subsystem for CoralRoller {
    fn periodic(&mut self) {
        self.ticks_in_mode = self.ticks_in_mode.saturating_add(1);
        self.motor.set(match self.mode {
            RollerMode::Idle => 0.0,
            RollerMode::Intake => INTAKE_OUTPUT,
            RollerMode::Outtake => OUTTAKE_OUTPUT,
        });
    }

    fn sim_periodic(&mut self) {
        // Model the game piece travelling through the rollers.
        match self.mode {
            RollerMode::Intake if !self.has_coral() && self.ticks_in_mode >= SIM_ACQUIRE_TICKS => {
                self.beam_break.set_simulated(true);
            }
            RollerMode::Outtake if self.has_coral() && self.ticks_in_mode >= SIM_RELEASE_TICKS => {
                self.beam_break.set_simulated(false);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roller_output_follows_the_mode() {
        let mut roller = CoralRoller::new().unwrap();
        roller.intake();
        roller.periodic();
        assert_eq!(roller.motor.get(), INTAKE_OUTPUT);

        roller.outtake();
        roller.periodic();
        assert_eq!(roller.motor.get(), OUTTAKE_OUTPUT);

        roller.stop();
        roller.periodic();
        assert_eq!(roller.motor.get(), 0.0);
    }

    #[test]
    fn simulated_intake_eventually_acquires_coral() {
        let mut roller = CoralRoller::new().unwrap();
        roller.intake();
        for _ in 0..SIM_ACQUIRE_TICKS {
            roller.periodic();
            roller.sim_periodic();
        }
        assert!(roller.has_coral());

        roller.outtake();
        for _ in 0..SIM_RELEASE_TICKS {
            roller.periodic();
            roller.sim_periodic();
        }
        assert!(!roller.has_coral());
    }
}
