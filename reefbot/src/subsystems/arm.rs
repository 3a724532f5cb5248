use rio_command::{robot::ITERATION_PERIOD, subsystem::Subsystem, Result};

use crate::constants::{arm, can};
use crate::hardware::Motor;

/// Coral manipulator arm. Angle is degrees from horizontal, stowed pointing
/// up along the elevator.
#[derive(Debug)]
pub struct Arm {
    motor: Motor,
    angle_deg: f64,
    goal_deg: f64,
}

impl Arm {
    pub fn new() -> Result<Self> {
        Ok(Self {
            motor: Motor::new(can::ARM)?,
            angle_deg: arm::STOW_ANGLE_DEG,
            goal_deg: arm::STOW_ANGLE_DEG,
        })
    }

    pub fn set_goal(&mut self, angle_deg: f64) {
        self.goal_deg = angle_deg.clamp(arm::MIN_ANGLE_DEG, arm::MAX_ANGLE_DEG);
        tracing::debug!(goal_deg = self.goal_deg, "arm goal");
    }

    pub fn stow(&mut self) {
        self.set_goal(arm::STOW_ANGLE_DEG);
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle_deg
    }

    pub fn goal_degrees(&self) -> f64 {
        self.goal_deg
    }

    pub fn at_goal(&self) -> bool {
        (self.angle_deg - self.goal_deg).abs() <= arm::GOAL_TOLERANCE_DEG
    }

    pub fn disable(&mut self) {
        self.goal_deg = self.angle_deg;
        self.motor.stop();
    }
}

impl Subsystem for Arm {
    fn periodic(&mut self) {
        let dt = ITERATION_PERIOD.as_secs_f64();
        let max_step = arm::MAX_VELOCITY_DPS * dt;
        let step = (self.goal_deg - self.angle_deg).clamp(-max_step, max_step);
        self.angle_deg += step;
        self.motor.set(step / max_step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_swings_to_goal_and_back_to_stow() {
        let mut arm = Arm::new().unwrap();
        arm.set_goal(-35.0);

        // 125 degrees at 180 deg/s is under 40 ticks.
        for _ in 0..40 {
            arm.periodic();
        }
        assert!(arm.at_goal());

        arm.stow();
        for _ in 0..40 {
            arm.periodic();
        }
        assert!(arm.at_goal());
        assert_eq!(arm.goal_degrees(), arm::STOW_ANGLE_DEG);
    }

    #[test]
    fn goal_is_clamped_to_the_mechanical_range() {
        let mut arm = Arm::new().unwrap();
        arm.set_goal(500.0);
        assert_eq!(arm.goal_degrees(), arm::MAX_ANGLE_DEG);
        arm.set_goal(-500.0);
        assert_eq!(arm.goal_degrees(), arm::MIN_ANGLE_DEG);
    }
}
