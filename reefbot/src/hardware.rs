//! Device stand-ins for the subsystems. There is no bus IO behind these;
//! outputs are clamped and held so subsystems, commands, and tests observe
//! the same values a speed controller would receive.

use rio_command::{DeviceSnafu, Result};
use snafu::ensure;

const MAX_CAN_ID: u8 = 62;

/// A speed controller on a CAN channel. Output is the commanded duty cycle
/// in [-1, 1].
#[derive(Debug)]
pub struct Motor {
    channel: u8,
    output: f64,
}

impl Motor {
    pub fn new(channel: u8) -> Result<Self> {
        ensure!(
            channel <= MAX_CAN_ID,
            DeviceSnafu {
                device: format!("motor {channel}"),
                message: format!("CAN id out of range 0..={MAX_CAN_ID}"),
            }
        );
        Ok(Self {
            channel,
            output: 0.0,
        })
    }

    pub fn set(&mut self, output: f64) {
        self.output = output.clamp(-1.0, 1.0);
        tracing::trace!(channel = self.channel, output = self.output, "motor");
    }

    pub fn get(&self) -> f64 {
        self.output
    }

    pub fn stop(&mut self) {
        self.set(0.0);
    }
}

/// A digital sensor (beam break, limit switch). With no hardware behind it
/// the value is whatever the simulation side last wrote.
#[derive(Debug)]
pub struct DigitalInput {
    channel: u8,
    value: bool,
}

impl DigitalInput {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            value: false,
        }
    }

    pub fn get(&self) -> bool {
        self.value
    }

    pub fn set_simulated(&mut self, value: bool) {
        if self.value != value {
            tracing::trace!(channel = self.channel, value, "digital input");
        }
        self.value = value;
    }
}

/// Heading estimate integrated from commanded rotation. Radians,
/// counterclockwise positive.
#[derive(Debug, Default)]
pub struct GyroSim {
    heading: f64,
}

impl GyroSim {
    pub fn heading_radians(&self) -> f64 {
        self.heading
    }

    pub fn integrate(&mut self, rate_rad_per_s: f64, dt_s: f64) {
        self.heading += rate_rad_per_s * dt_s;
    }

    pub fn reset(&mut self) {
        self.heading = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_output_is_clamped() {
        let mut motor = Motor::new(1).unwrap();
        motor.set(2.5);
        assert_eq!(motor.get(), 1.0);
        motor.set(-7.0);
        assert_eq!(motor.get(), -1.0);
        motor.stop();
        assert_eq!(motor.get(), 0.0);
    }

    #[test]
    fn motor_rejects_out_of_range_channel() {
        assert!(Motor::new(63).is_err());
    }

    #[test]
    fn gyro_integrates_and_resets() {
        let mut gyro = GyroSim::default();
        gyro.integrate(1.0, 0.5);
        assert!((gyro.heading_radians() - 0.5).abs() < 1e-9);
        gyro.reset();
        assert_eq!(gyro.heading_radians(), 0.0);
    }
}
