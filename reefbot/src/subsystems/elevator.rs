use rio_command::{
    preferences::Preferences,
    robot::ITERATION_PERIOD,
    subsystem::Subsystem,
    telemetry::{Tab, Telemetry},
    Result,
};

use crate::constants::{can, elevator};
use crate::hardware::Motor;

/// Carriage lift. Drives a velocity-limited profile toward the goal height.
#[derive(Debug)]
pub struct Elevator {
    motor: Motor,
    height_m: f64,
    goal_m: f64,
    tab: Option<Tab>,
}

impl Elevator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            motor: Motor::new(can::ELEVATOR)?,
            height_m: 0.0,
            goal_m: 0.0,
            tab: None,
        })
    }

    pub fn set_goal(&mut self, height_m: f64) {
        self.goal_m = height_m.clamp(0.0, elevator::MAX_HEIGHT_M);
        tracing::debug!(goal_m = self.goal_m, "elevator goal");
    }

    pub fn stow(&mut self) {
        self.set_goal(0.0);
    }

    pub fn height_meters(&self) -> f64 {
        self.height_m
    }

    pub fn goal_meters(&self) -> f64 {
        self.goal_m
    }

    pub fn at_goal(&self) -> bool {
        (self.height_m - self.goal_m).abs() <= elevator::GOAL_TOLERANCE_M
    }

    /// Hold position and cut output. The carriage stays where it is.
    pub fn disable(&mut self) {
        self.goal_m = self.height_m;
        self.motor.stop();
    }

    pub fn init_dashboard(&mut self) {
        self.tab = Some(Telemetry::tab("Elevator"));
    }
}

impl Subsystem for Elevator {
    fn periodic(&mut self) {
        let dt = ITERATION_PERIOD.as_secs_f64();
        let max_velocity = Preferences::double(
            "Elevator/maxVelocityMps",
            elevator::MAX_VELOCITY_MPS,
        );

        let max_step = max_velocity * dt;
        let step = (self.goal_m - self.height_m).clamp(-max_step, max_step);
        self.height_m += step;
        self.motor.set(step / max_step.max(f64::EPSILON));

        if let Some(tab) = &self.tab {
            tab.publish_double("Elevator/heightMeters", self.height_m);
            tab.publish_double("Elevator/goalMeters", self.goal_m);
            tab.publish_bool("Elevator/atGoal", self.at_goal());
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn profile_reaches_the_goal() {
        Preferences::reset();
        let mut elevator = Elevator::new().unwrap();
        elevator.set_goal(0.75);
        assert!(!elevator.at_goal());

        // 0.75 m at 1.5 m/s is 25 ticks; give it margin.
        for _ in 0..30 {
            elevator.periodic();
        }

        assert!(elevator.at_goal());
        assert!((elevator.height_meters() - 0.75).abs() < 1e-6);
        Preferences::reset();
    }

    #[test]
    #[serial]
    fn goal_is_clamped_to_travel() {
        Preferences::reset();
        let mut elevator = Elevator::new().unwrap();
        elevator.set_goal(5.0);
        assert_eq!(elevator.goal_meters(), elevator::MAX_HEIGHT_M);

        elevator.set_goal(-1.0);
        assert_eq!(elevator.goal_meters(), 0.0);
        Preferences::reset();
    }

    #[test]
    #[serial]
    fn disable_holds_the_current_height() {
        Preferences::reset();
        let mut elevator = Elevator::new().unwrap();
        elevator.set_goal(1.0);
        for _ in 0..10 {
            elevator.periodic();
        }
        let height = elevator.height_meters();

        elevator.disable();
        assert_eq!(elevator.goal_meters(), height);
        assert_eq!(elevator.motor.get(), 0.0);
        Preferences::reset();
    }
}
