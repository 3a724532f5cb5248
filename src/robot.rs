use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

use crate::{station::DriverStation, Result};

/// The match period reported by the driver station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompetitionMode {
    Disabled,
    Autonomous,
    Teleop,
}

static SIMULATION: AtomicBool = AtomicBool::new(false);
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Mark this process as running against simulated hardware. Set once at
/// startup, before the robot loop starts.
pub fn set_simulation(simulation: bool) {
    SIMULATION.store(simulation, Ordering::Relaxed);
}

/// Returns true if the code is running on a real robot and not in simulation.
pub fn is_real() -> bool {
    !is_sim()
}

/// Returns true if the code is running in simulation and not on a real robot.
pub fn is_sim() -> bool {
    SIMULATION.load(Ordering::Relaxed)
}

/// Ask the robot loop to return after the current iteration. Safe to call
/// from any thread, including a Ctrl-C handler.
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

fn take_shutdown_request() -> bool {
    SHUTDOWN.swap(false, Ordering::Relaxed)
}

/// Lifecycle hooks dispatched by [`start_robot`]. The `*_init` hooks fire on
/// the iteration where the driver station reports a mode change.
pub trait ScheduledRobot {
    fn periodic(&mut self) -> Result {
        Ok(())
    }
    fn sim_periodic(&mut self) -> Result {
        Ok(())
    }
    fn disabled_init(&mut self) -> Result {
        Ok(())
    }
    fn disabled_periodic(&mut self) -> Result {
        Ok(())
    }
    fn autonomous_init(&mut self) -> Result {
        Ok(())
    }
    fn autonomous_periodic(&mut self) -> Result {
        Ok(())
    }
    fn teleop_init(&mut self) -> Result {
        Ok(())
    }
    fn teleop_periodic(&mut self) -> Result {
        Ok(())
    }
}

pub const ITERATION_PERIOD: Duration = Duration::from_millis(20);

/// Fixed-cadence iteration timer. Deadlines advance by the period, so one
/// slow iteration does not shift every later tick.
struct Interval {
    sleeper: spin_sleep::SpinSleeper,
    deadline: Instant,
}

impl Interval {
    fn start(period: Duration) -> Self {
        Self {
            sleeper: spin_sleep::SpinSleeper::default(),
            deadline: Instant::now() + period,
        }
    }

    fn delay(&mut self, period: Duration) {
        let now = Instant::now();
        if let Some(remaining) = self.deadline.checked_duration_since(now) {
            self.sleeper.sleep(remaining);
        } else {
            tracing::warn!(
                overrun_us = (now - self.deadline).as_micros() as u64,
                "loop overrun"
            );
        }
        self.deadline += period;
    }
}

/// Run the robot until a shutdown is requested.
pub fn start_robot(mut robot: impl ScheduledRobot) -> Result {
    let mut previous_mode = None;
    let mut interval = Interval::start(ITERATION_PERIOD);

    while !take_shutdown_request() {
        let current_mode = DriverStation::instance().mode();
        match current_mode {
            CompetitionMode::Disabled => {
                if previous_mode != Some(CompetitionMode::Disabled) {
                    tracing::info!("robot disabled");
                    robot.disabled_init()?;
                }
                robot.disabled_periodic()?;
            }
            CompetitionMode::Autonomous => {
                if previous_mode != Some(CompetitionMode::Autonomous) {
                    tracing::info!("autonomous period started");
                    robot.autonomous_init()?;
                }
                robot.autonomous_periodic()?;
            }
            CompetitionMode::Teleop => {
                if previous_mode != Some(CompetitionMode::Teleop) {
                    tracing::info!("teleop period started");
                    robot.teleop_init()?;
                }
                robot.teleop_periodic()?;
            }
        }
        previous_mode = Some(current_mode);

        robot.periodic()?;
        if is_sim() {
            robot.sim_periodic()?;
        }

        interval.delay(ITERATION_PERIOD);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[derive(Default)]
    struct CountingRobot {
        disabled_inits: u32,
        teleop_inits: u32,
        periodics: u32,
    }

    impl ScheduledRobot for CountingRobot {
        fn disabled_init(&mut self) -> Result {
            self.disabled_inits += 1;
            Ok(())
        }

        fn teleop_init(&mut self) -> Result {
            self.teleop_inits += 1;
            Ok(())
        }

        fn periodic(&mut self) -> Result {
            self.periodics += 1;
            if self.periodics == 1 {
                DriverStation::instance().set_mode(CompetitionMode::Teleop);
            }
            if self.periodics >= 3 {
                request_shutdown();
            }
            Ok(())
        }
    }

    #[test]
    #[serial]
    fn init_hooks_fire_on_mode_edges_only() {
        DriverStation::instance().set_mode(CompetitionMode::Disabled);

        let mut robot = CountingRobot::default();
        start_robot(SplitRobot(&mut robot)).unwrap();

        assert_eq!(robot.disabled_inits, 1);
        assert_eq!(robot.teleop_inits, 1);
        assert_eq!(robot.periodics, 3);
    }

    /// Forwarding wrapper so the test keeps ownership of its robot.
    struct SplitRobot<'a>(&'a mut CountingRobot);

    impl ScheduledRobot for SplitRobot<'_> {
        fn disabled_init(&mut self) -> Result {
            self.0.disabled_init()
        }
        fn teleop_init(&mut self) -> Result {
            self.0.teleop_init()
        }
        fn periodic(&mut self) -> Result {
            self.0.periodic()
        }
    }
}
