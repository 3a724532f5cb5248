use rio_command::{
    robot::ITERATION_PERIOD,
    subsystem::Subsystem,
    telemetry::{Tab, Telemetry},
    Result,
};

use crate::constants::{can, drive};
use crate::hardware::{GyroSim, Motor};

/// Effective lever arm converting rotation rate into wheel speed.
const EFFECTIVE_RADIUS_M: f64 = 0.4;

/// Holonomic drive base. Commands hand it chassis speeds; it mixes them
/// into wheel outputs and keeps a dead-reckoned pose estimate.
#[derive(Debug)]
pub struct Drivetrain {
    front_left: Motor,
    front_right: Motor,
    back_left: Motor,
    back_right: Motor,
    gyro: GyroSim,
    x_m: f64,
    y_m: f64,
    vx_mps: f64,
    vy_mps: f64,
    omega_rad_s: f64,
    tab: Option<Tab>,
}

impl Drivetrain {
    pub fn new() -> Result<Self> {
        Ok(Self {
            front_left: Motor::new(can::DRIVE_FRONT_LEFT)?,
            front_right: Motor::new(can::DRIVE_FRONT_RIGHT)?,
            back_left: Motor::new(can::DRIVE_BACK_LEFT)?,
            back_right: Motor::new(can::DRIVE_BACK_RIGHT)?,
            gyro: GyroSim::default(),
            x_m: 0.0,
            y_m: 0.0,
            vx_mps: 0.0,
            vy_mps: 0.0,
            omega_rad_s: 0.0,
            tab: None,
        })
    }

    /// Command chassis speeds in the robot frame: +x forward, +y left.
    pub fn drive_robot_relative(&mut self, vx_mps: f64, vy_mps: f64, omega_rad_s: f64) {
        self.vx_mps = vx_mps;
        self.vy_mps = vy_mps;
        self.omega_rad_s = omega_rad_s;
    }

    /// Command chassis speeds in the field frame; the translation is rotated
    /// into the robot frame using the current heading.
    pub fn drive_field_relative(&mut self, vx_mps: f64, vy_mps: f64, omega_rad_s: f64) {
        let (sin, cos) = self.gyro.heading_radians().sin_cos();
        self.drive_robot_relative(
            vx_mps * cos + vy_mps * sin,
            -vx_mps * sin + vy_mps * cos,
            omega_rad_s,
        );
    }

    pub fn stop(&mut self) {
        self.drive_robot_relative(0.0, 0.0, 0.0);
    }

    /// Re-declare the current direction as "away from the driver".
    pub fn reset_orientation(&mut self) {
        self.gyro.reset();
        tracing::info!("drive orientation reset");
    }

    pub fn heading_radians(&self) -> f64 {
        self.gyro.heading_radians()
    }

    pub fn pose_meters(&self) -> (f64, f64) {
        (self.x_m, self.y_m)
    }

    pub fn disable(&mut self) {
        self.stop();
        self.apply_outputs();
    }

    pub fn init_dashboard(&mut self) {
        self.tab = Some(Telemetry::tab("Drive"));
    }

    fn apply_outputs(&mut self) {
        let rotation = self.omega_rad_s * EFFECTIVE_RADIUS_M;
        let max = drive::MAX_ATTAINABLE_SPEED_MPS;

        let mut wheels = [
            self.vx_mps - self.vy_mps - rotation,
            self.vx_mps + self.vy_mps + rotation,
            self.vx_mps + self.vy_mps - rotation,
            self.vx_mps - self.vy_mps + rotation,
        ];

        // Preserve the mix when a wheel would exceed full output.
        let peak = wheels.iter().fold(max, |acc, w| acc.max(w.abs()));
        for wheel in &mut wheels {
            *wheel /= peak;
        }

        self.front_left.set(wheels[0]);
        self.front_right.set(wheels[1]);
        self.back_left.set(wheels[2]);
        self.back_right.set(wheels[3]);
    }
}

impl Subsystem for Drivetrain {
    fn periodic(&mut self) {
        let dt = ITERATION_PERIOD.as_secs_f64();

        let (sin, cos) = self.gyro.heading_radians().sin_cos();
        self.x_m += (self.vx_mps * cos - self.vy_mps * sin) * dt;
        self.y_m += (self.vx_mps * sin + self.vy_mps * cos) * dt;
        self.gyro.integrate(self.omega_rad_s, dt);

        self.apply_outputs();

        if let Some(tab) = &self.tab {
            tab.publish_double("Drive/headingDeg", self.gyro.heading_radians().to_degrees());
            tab.publish_double("Drive/xMeters", self.x_m);
            tab.publish_double("Drive/yMeters", self.y_m);
        }
    }
}
