use std::time::Duration;

use rio_command::{
    command::{
        group::{Sequence, Wait},
        FunctionalCommand,
    },
    telemetry::{Chooser, Tab},
    CommandRef,
};

use crate::commands;
use crate::parameters::ElevatorLevel;
use crate::subsystems::Subsystems;

const AUTO_DRIVE_SPEED_MPS: f64 = 1.5;
const LINE_CROSS_DISTANCE_M: f64 = 2.0;
const REEF_APPROACH_DISTANCE_M: f64 = 2.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Routine {
    Nothing,
    CrossTheLine,
    ScoreCoralL1,
    ScoreCoralL4,
}

/// Operator-selectable autonomous routines, published as a chooser on the
/// operator tab. The command itself is built fresh at autonomous init from
/// whatever is selected at that moment.
pub struct RobotAutonomous {
    chooser: Chooser<Routine>,
}

impl RobotAutonomous {
    pub fn new() -> Self {
        let mut chooser = Chooser::new();
        chooser.add_default("cross the line", Routine::CrossTheLine);
        chooser.add_option("score coral L1", Routine::ScoreCoralL1);
        chooser.add_option("score coral L4", Routine::ScoreCoralL4);
        chooser.add_option("nothing", Routine::Nothing);
        Self { chooser }
    }

    pub fn add_dashboard_layout(&self, tab: &Tab) {
        tab.add_chooser("Autonomous", &self.chooser);
    }

    /// Pick a routine by its chooser name.
    pub fn select_routine(&self, name: &str) -> bool {
        self.chooser.select(name)
    }

    pub fn autonomous_command(&self, subsystems: &Subsystems) -> CommandRef {
        let routine = self
            .chooser
            .selected()
            .copied()
            .unwrap_or(Routine::Nothing);
        tracing::info!(?routine, "building autonomous command");

        match routine {
            Routine::Nothing => FunctionalCommand::instant(|| Ok(()), vec![]).into(),
            Routine::CrossTheLine => Sequence::new(vec![Box::new(commands::drive::drive_forward(
                subsystems,
                LINE_CROSS_DISTANCE_M,
                AUTO_DRIVE_SPEED_MPS,
            ))])
            .into(),
            Routine::ScoreCoralL1 => score_preloaded_coral(subsystems, ElevatorLevel::L1),
            Routine::ScoreCoralL4 => score_preloaded_coral(subsystems, ElevatorLevel::L4),
        }
    }
}

impl Default for RobotAutonomous {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive to the reef, raise to the level, eject the preloaded coral, and
/// come back down to travel height.
fn score_preloaded_coral(subsystems: &Subsystems, level: ElevatorLevel) -> CommandRef {
    Sequence::new(vec![
        Box::new(commands::drive::drive_forward(
            subsystems,
            REEF_APPROACH_DISTANCE_M,
            AUTO_DRIVE_SPEED_MPS,
        )),
        Box::new(commands::elevator::go_to_level(subsystems, level)),
        Box::new(commands::coral::outtake_until_coral_not_detected(subsystems)),
        Box::new(Wait::new(Duration::from_millis(250))),
        Box::new(commands::elevator::stow_elevator_and_arm(subsystems)),
    ])
    .into()
}

#[cfg(test)]
mod tests {
    use rio_command::command::{Command, CommandRefExt};
    use rio_command::subsystem::Subsystem;
    use rio_command::CommandScheduler;

    use super::*;

    #[test]
    fn chooser_defaults_to_crossing_the_line() {
        let autonomous = RobotAutonomous::new();
        assert!(autonomous.select_routine("score coral L4"));
        assert!(!autonomous.select_routine("win the match"));
    }

    #[test]
    fn cross_the_line_routine_runs_to_completion() {
        CommandScheduler::reset();
        let subsystems = Subsystems::new().unwrap();
        let autonomous = RobotAutonomous::new();

        let command = autonomous.autonomous_command(&subsystems);
        let mut runner = command.0.borrow_mut();
        runner.initialize().unwrap();

        let mut ticks = 0;
        while !runner.is_finished().unwrap() {
            runner.execute().unwrap();
            subsystems.drivetrain.borrow_mut().periodic();
            ticks += 1;
            assert!(ticks < 200, "autonomous never crossed the line");
        }
        runner.end(false).unwrap();

        let (x, _) = subsystems.drivetrain.borrow().pose_meters();
        assert!(x >= LINE_CROSS_DISTANCE_M);
    }

    #[test]
    fn nothing_routine_is_immediately_finished() {
        CommandScheduler::reset();
        let subsystems = Subsystems::new().unwrap();
        let autonomous = RobotAutonomous::new();
        autonomous.select_routine("nothing");

        let command = autonomous.autonomous_command(&subsystems);
        assert!(!command.is_scheduled());
        let mut runner = command.0.borrow_mut();
        runner.initialize().unwrap();
        assert!(runner.is_finished().unwrap());
    }
}
