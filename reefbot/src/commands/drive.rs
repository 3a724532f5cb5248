use std::{cell::RefCell, f64::consts::TAU, rc::Rc};

use rio_command::{
    command::{Command, FunctionalCommand},
    gamepad::Gamepad,
    preferences::Preferences,
    subsystem::SubsystemRefExt,
    Result, SubsystemRef,
};

use crate::constants::drive;
use crate::subsystems::{Drivetrain, Subsystems};

const DEADBAND: f64 = 0.08;
const ALIGN_MAX_SPEED_MPS: f64 = 0.6;
const ALIGN_TOLERANCE_M: f64 = 0.02;

fn deadband(value: f64) -> f64 {
    if value.abs() < DEADBAND {
        0.0
    } else {
        value
    }
}

/// Default teleop command: field-relative drive from the driver gamepad.
pub struct DriveWithGamepad {
    drivetrain: Rc<RefCell<Drivetrain>>,
    gamepad: Gamepad,
    requirements: Vec<SubsystemRef>,
}

impl DriveWithGamepad {
    pub fn new(drivetrain: Rc<RefCell<Drivetrain>>, gamepad: Gamepad) -> Self {
        Self {
            requirements: vec![SubsystemRef(drivetrain.clone())],
            drivetrain,
            gamepad,
        }
    }
}

impl Command for DriveWithGamepad {
    fn requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn execute(&mut self) -> Result {
        let max_speed = Preferences::double("Drive/maxSpeedMps", drive::MAX_ATTAINABLE_SPEED_MPS);
        let max_rotation = Preferences::double("Drive/maxRotationRps", drive::MAX_ROTATION_RPS);

        // Stick up is negative Y; robot forward is +x, robot left is +y.
        let vx = -deadband(self.gamepad.left_y()) * max_speed;
        let vy = -deadband(self.gamepad.left_x()) * max_speed;
        let omega = -deadband(self.gamepad.right_x()) * max_rotation * TAU;

        self.drivetrain
            .borrow_mut()
            .drive_field_relative(vx, vy, omega);
        Ok(())
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        self.drivetrain.borrow_mut().stop();
        Ok(())
    }
}

/// Zero the field-relative heading at the robot's current direction.
pub fn reset_orientation(subsystems: &Subsystems) -> FunctionalCommand {
    let drivetrain = subsystems.drivetrain.clone();
    subsystems.drivetrain.run_once(move || {
        drivetrain.borrow_mut().reset_orientation();
        Ok(())
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSide {
    Left,
    Right,
}

impl BranchSide {
    /// Lateral setpoint in the robot frame, +y left.
    fn offset_meters(self) -> f64 {
        match self {
            BranchSide::Left => drive::BRANCH_OFFSET_M,
            BranchSide::Right => -drive::BRANCH_OFFSET_M,
        }
    }
}

/// Strafes the robot sideways until it is centered on the chosen reef
/// branch, measured from where the command started.
pub struct AlignToBranch {
    drivetrain: Rc<RefCell<Drivetrain>>,
    side: BranchSide,
    start: Option<(f64, f64, f64)>,
    last_error_m: f64,
    requirements: Vec<SubsystemRef>,
}

impl AlignToBranch {
    pub fn new(drivetrain: Rc<RefCell<Drivetrain>>, side: BranchSide) -> Self {
        Self {
            requirements: vec![SubsystemRef(drivetrain.clone())],
            drivetrain,
            side,
            start: None,
            last_error_m: f64::INFINITY,
        }
    }

    fn lateral_traveled(&self, x: f64, y: f64) -> f64 {
        let (x0, y0, heading) = self.start.unwrap_or((x, y, 0.0));
        // Project displacement onto the robot-left axis at the start heading.
        (x - x0) * -heading.sin() + (y - y0) * heading.cos()
    }
}

impl Command for AlignToBranch {
    fn requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        let drivetrain = self.drivetrain.borrow();
        let (x, y) = drivetrain.pose_meters();
        self.start = Some((x, y, drivetrain.heading_radians()));
        self.last_error_m = self.side.offset_meters();
        Ok(())
    }

    fn execute(&mut self) -> Result {
        let (x, y) = self.drivetrain.borrow().pose_meters();
        let error = self.side.offset_meters() - self.lateral_traveled(x, y);
        self.last_error_m = error;

        let kp = Preferences::double("Drive/alignKp", 3.0);
        let vy = (kp * error).clamp(-ALIGN_MAX_SPEED_MPS, ALIGN_MAX_SPEED_MPS);
        self.drivetrain.borrow_mut().drive_robot_relative(0.0, vy, 0.0);
        Ok(())
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        self.start = None;
        self.drivetrain.borrow_mut().stop();
        Ok(())
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(self.last_error_m.abs() <= ALIGN_TOLERANCE_M)
    }
}

pub fn align_to_left_branch(subsystems: &Subsystems) -> AlignToBranch {
    AlignToBranch::new(subsystems.drivetrain.clone(), BranchSide::Left)
}

pub fn align_to_right_branch(subsystems: &Subsystems) -> AlignToBranch {
    AlignToBranch::new(subsystems.drivetrain.clone(), BranchSide::Right)
}

/// Autonomous building block: drive straight ahead for a distance.
pub struct DriveForward {
    drivetrain: Rc<RefCell<Drivetrain>>,
    distance_m: f64,
    speed_mps: f64,
    start: Option<(f64, f64)>,
    requirements: Vec<SubsystemRef>,
}

impl DriveForward {
    pub fn new(drivetrain: Rc<RefCell<Drivetrain>>, distance_m: f64, speed_mps: f64) -> Self {
        Self {
            requirements: vec![SubsystemRef(drivetrain.clone())],
            drivetrain,
            distance_m,
            speed_mps,
            start: None,
        }
    }

    fn traveled(&self, x: f64, y: f64) -> f64 {
        let (x0, y0) = self.start.unwrap_or((x, y));
        ((x - x0).powi(2) + (y - y0).powi(2)).sqrt()
    }
}

impl Command for DriveForward {
    fn requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        self.start = Some(self.drivetrain.borrow().pose_meters());
        Ok(())
    }

    fn execute(&mut self) -> Result {
        self.drivetrain
            .borrow_mut()
            .drive_robot_relative(self.speed_mps, 0.0, 0.0);
        Ok(())
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        self.start = None;
        self.drivetrain.borrow_mut().stop();
        Ok(())
    }

    fn is_finished(&self) -> Result<bool> {
        let (x, y) = self.drivetrain.borrow().pose_meters();
        Ok(self.traveled(x, y) >= self.distance_m)
    }
}

pub fn drive_forward(subsystems: &Subsystems, distance_m: f64, speed_mps: f64) -> DriveForward {
    DriveForward::new(subsystems.drivetrain.clone(), distance_m, speed_mps)
}

#[cfg(test)]
mod tests {
    use rio_command::subsystem::Subsystem;
    use serial_test::serial;

    use super::*;

    fn drivetrain() -> Rc<RefCell<Drivetrain>> {
        Rc::new(RefCell::new(Drivetrain::new().unwrap()))
    }

    #[test]
    #[serial]
    fn align_strafes_toward_the_left_branch_and_finishes() {
        Preferences::reset();
        let drivetrain = drivetrain();
        let mut command = AlignToBranch::new(drivetrain.clone(), BranchSide::Left);

        command.initialize().unwrap();
        for _ in 0..200 {
            command.execute().unwrap();
            drivetrain.borrow_mut().periodic();
            if command.is_finished().unwrap() {
                break;
            }
        }

        assert!(command.is_finished().unwrap());
        let (_, y) = drivetrain.borrow().pose_meters();
        assert!((y - drive::BRANCH_OFFSET_M).abs() <= ALIGN_TOLERANCE_M + 1e-6);
        command.end(false).unwrap();
        Preferences::reset();
    }

    #[test]
    fn drive_forward_finishes_at_distance() {
        let drivetrain = drivetrain();
        let mut command = DriveForward::new(drivetrain.clone(), 1.0, 2.0);

        command.initialize().unwrap();
        let mut ticks = 0;
        while !command.is_finished().unwrap() {
            command.execute().unwrap();
            drivetrain.borrow_mut().periodic();
            ticks += 1;
            assert!(ticks < 100, "never reached the target distance");
        }
        command.end(false).unwrap();

        let (x, _) = drivetrain.borrow().pose_meters();
        assert!(x >= 1.0);
    }

    #[test]
    fn gamepad_deadband_suppresses_stick_noise() {
        assert_eq!(deadband(0.05), 0.0);
        assert_eq!(deadband(-0.05), 0.0);
        assert_eq!(deadband(0.5), 0.5);
    }
}
