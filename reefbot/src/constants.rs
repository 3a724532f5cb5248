//! Wiring and physical constants. Anything an operator may want to retune
//! at the field lives in preferences instead.

pub mod operator {
    pub const DRIVER_CONTROLLER_PORT: usize = 0;
    pub const MANIPULATOR_CONTROLLER_PORT: usize = 1;
}

pub mod can {
    pub const DRIVE_FRONT_LEFT: u8 = 1;
    pub const DRIVE_FRONT_RIGHT: u8 = 2;
    pub const DRIVE_BACK_LEFT: u8 = 3;
    pub const DRIVE_BACK_RIGHT: u8 = 4;
    pub const ELEVATOR: u8 = 10;
    pub const ARM: u8 = 11;
    pub const CORAL_ROLLER: u8 = 12;
    pub const ALGAE_GRABBER: u8 = 13;
    pub const CLIMBER: u8 = 14;
}

pub mod dio {
    pub const CORAL_BEAM_BREAK: u8 = 0;
    pub const ALGAE_SENSOR: u8 = 1;
}

pub mod drive {
    /// Highest speed the modules can actually reach, used to normalize
    /// motor outputs.
    pub const MAX_ATTAINABLE_SPEED_MPS: f64 = 4.5;
    pub const MAX_ROTATION_RPS: f64 = 1.5;
    /// Lateral distance from a reef face center to either branch.
    pub const BRANCH_OFFSET_M: f64 = 0.164;
}

pub mod elevator {
    pub const MAX_HEIGHT_M: f64 = 1.9;
    pub const MAX_VELOCITY_MPS: f64 = 1.5;
    pub const GOAL_TOLERANCE_M: f64 = 0.02;
}

pub mod arm {
    pub const STOW_ANGLE_DEG: f64 = 90.0;
    pub const MIN_ANGLE_DEG: f64 = -95.0;
    pub const MAX_ANGLE_DEG: f64 = 120.0;
    pub const MAX_VELOCITY_DPS: f64 = 180.0;
    pub const GOAL_TOLERANCE_DEG: f64 = 2.0;
}

pub mod climber {
    /// Winch travel that puts the robot on the cage.
    pub const CLIMB_TRAVEL_M: f64 = 0.35;
    pub const WINCH_RATE_MPS: f64 = 0.1;
}

pub mod leds {
    pub const STRIP_LENGTH: usize = 36;
}
