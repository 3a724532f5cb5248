use rio_command::{robot::ITERATION_PERIOD, subsystem::Subsystem, Result};

use crate::constants::{can, climber};
use crate::hardware::Motor;

/// Endgame cage climber. The winch only ever pulls in; travel is tracked so
/// the climb stops at the hard stop.
#[derive(Debug)]
pub struct Climber {
    winch: Motor,
    travel_m: f64,
    climbing: bool,
}

impl Climber {
    pub fn new() -> Result<Self> {
        Ok(Self {
            winch: Motor::new(can::CLIMBER)?,
            travel_m: 0.0,
            climbing: false,
        })
    }

    pub fn climb(&mut self) {
        self.climbing = true;
    }

    pub fn stop(&mut self) {
        self.climbing = false;
    }

    pub fn is_climbed(&self) -> bool {
        self.travel_m >= climber::CLIMB_TRAVEL_M
    }

    pub fn travel_meters(&self) -> f64 {
        self.travel_m
    }

    pub fn disable(&mut self) {
        self.stop();
        self.winch.stop();
    }
}

impl Subsystem for Climber {
    fn periodic(&mut self) {
        if self.climbing && !self.is_climbed() {
            self.winch.set(1.0);
            self.travel_m += climber::WINCH_RATE_MPS * ITERATION_PERIOD.as_secs_f64();
        } else {
            self.winch.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winch_runs_until_the_climb_completes() {
        let mut climber = Climber::new().unwrap();
        climber.climb();

        // 0.35 m at 0.1 m/s is 175 ticks.
        for _ in 0..180 {
            climber.periodic();
        }

        assert!(climber.is_climbed());
        climber.periodic();
        assert_eq!(climber.winch.get(), 0.0);
    }

    #[test]
    fn stop_releases_the_winch_output() {
        let mut climber = Climber::new().unwrap();
        climber.climb();
        climber.periodic();
        assert_eq!(climber.winch.get(), 1.0);

        climber.stop();
        climber.periodic();
        assert_eq!(climber.winch.get(), 0.0);
        assert!(!climber.is_climbed());
    }
}
