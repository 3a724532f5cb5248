use std::{cell::RefCell, rc::Rc};

use rio_command::{
    command::{button::Trigger, Command, CommandRefExt},
    gamepad::Gamepad,
    preferences::Preferences,
    robot::ScheduledRobot,
    telemetry::Telemetry,
    CommandScheduler, Result,
};

use crate::autonomous::RobotAutonomous;
use crate::commands;
use crate::commands::drive::DriveWithGamepad;
use crate::commands::leds::FlameCycle;
use crate::constants::operator;
use crate::parameters::ElevatorLevel;
use crate::subsystems::Subsystems;

/// The composition root. Command-based is a declarative paradigm, so the
/// structure of the robot lives here: subsystem construction, default
/// commands, and the trigger-to-command map. Behavior belongs to the
/// subsystems and command factories, not to this type.
pub struct Robot {
    subsystems: Subsystems,
    autonomous: RobotAutonomous,
    driver_controller: Gamepad,
    manipulator_controller: Gamepad,
    autonomous_command: Option<Rc<RefCell<dyn Command>>>,
}

impl Robot {
    pub fn new() -> Result<Self> {
        let subsystems = Subsystems::new()?;
        let robot = Self {
            autonomous: RobotAutonomous::new(),
            driver_controller: Gamepad::new(operator::DRIVER_CONTROLLER_PORT),
            manipulator_controller: Gamepad::new(operator::MANIPULATOR_CONTROLLER_PORT),
            autonomous_command: None,
            subsystems,
        };

        robot.init_dashboard();

        CommandScheduler::set_default_command(
            &robot.subsystems.drivetrain,
            DriveWithGamepad::new(robot.subsystems.drivetrain.clone(), robot.driver_controller),
        )
        .expect("drive default command requires the drivetrain");

        CommandScheduler::set_default_command(
            &robot.subsystems.status_leds,
            FlameCycle::new(robot.subsystems.status_leds.clone()),
        )
        .expect("flame cycle requires the LEDs");

        robot.configure_bindings();

        Ok(robot)
    }

    fn init_dashboard(&self) {
        Preferences::add_dashboard_tab();
        self.subsystems.init_dashboard();

        let operator_tab = Telemetry::tab("Operator");
        self.autonomous.add_dashboard_layout(&operator_tab);
    }

    /// The trigger-to-command map. One line per control.
    fn configure_bindings(&self) {
        let subsystems = &self.subsystems;
        let driver = &self.driver_controller;
        let manipulator = &self.manipulator_controller;

        driver.start().on_true(commands::drive::reset_orientation(subsystems));
        driver.x().while_true(commands::drive::align_to_left_branch(subsystems));
        driver.b().while_true(commands::drive::align_to_right_branch(subsystems));
        driver.right_bumper().while_true(commands::climber::climb(subsystems));

        manipulator
            .a()
            .on_true(commands::elevator::go_to_level(subsystems, ElevatorLevel::L1));
        manipulator
            .x()
            .on_true(commands::elevator::go_to_level(subsystems, ElevatorLevel::L2));
        manipulator
            .b()
            .on_true(commands::elevator::go_to_level(subsystems, ElevatorLevel::L3));
        manipulator
            .y()
            .on_true(commands::elevator::go_to_level(subsystems, ElevatorLevel::L4));
        manipulator
            .right_bumper()
            .while_true(commands::algae::intake_algae(subsystems))
            .on_false(commands::algae::stop_and_stow_intake(subsystems));
        manipulator
            .left_bumper()
            .while_true(commands::algae::outtake_algae(subsystems))
            .on_false(commands::algae::stop_and_stow_intake(subsystems));
        manipulator
            .pov_left()
            .while_true(commands::coral::intake_until_coral_detected(subsystems));
        manipulator
            .pov_right()
            .while_true(commands::coral::outtake_until_coral_not_detected(subsystems))
            .on_false(commands::elevator::stow_elevator_and_arm(subsystems));
        manipulator
            .start()
            .on_true(commands::elevator::stow_elevator_and_arm(subsystems));
        manipulator
            .back()
            .on_true(commands::manipulator::interrupt_all(subsystems));
        manipulator
            .pov_down()
            .while_true(commands::algae::remove_algae_at_level(subsystems, ElevatorLevel::L2))
            .on_false(commands::elevator::stow_elevator_and_arm(subsystems));
        manipulator
            .pov_up()
            .while_true(commands::algae::remove_algae_at_level(subsystems, ElevatorLevel::L3))
            .on_false(commands::elevator::stow_elevator_and_arm(subsystems));

        let coral_roller = subsystems.coral_roller.clone();
        Trigger::new(move || coral_roller.borrow().has_coral())
            .on_true(commands::leds::indicate_coral_acquired(subsystems));
        let algae_grabber = subsystems.algae_grabber.clone();
        Trigger::new(move || algae_grabber.borrow().has_algae())
            .on_true(commands::leds::indicate_algae_acquired(subsystems));
    }
}

impl ScheduledRobot for Robot {
    fn periodic(&mut self) -> Result {
        CommandScheduler::run()?;
        self.subsystems.periodic();
        Ok(())
    }

    fn disabled_init(&mut self) -> Result {
        self.subsystems.disable();
        Ok(())
    }

    fn autonomous_init(&mut self) -> Result {
        let command = self.autonomous.autonomous_command(&self.subsystems);
        command.schedule()?;
        self.autonomous_command = Some(command.0);
        Ok(())
    }

    fn teleop_init(&mut self) -> Result {
        if let Some(command) = self.autonomous_command.take() {
            command.cancel()?;
        }
        Ok(())
    }
}
