use rio_command::{command::FunctionalCommand, SubsystemRef};

use crate::parameters::ElevatorLevel;
use crate::subsystems::Subsystems;

/// Raise the elevator and swing the arm to score at `level`. Finishes when
/// both mechanisms report they are on their setpoints.
pub fn go_to_level(subsystems: &Subsystems, level: ElevatorLevel) -> FunctionalCommand {
    let elevator = subsystems.elevator.clone();
    let arm = subsystems.arm.clone();
    let at_goal_elevator = elevator.clone();
    let at_goal_arm = arm.clone();

    FunctionalCommand::new(
        move || {
            elevator.borrow_mut().set_goal(level.height_meters());
            arm.borrow_mut().set_goal(level.arm_angle_degrees());
            Ok(())
        },
        || Ok(()),
        |_| Ok(()),
        move || Ok(at_goal_elevator.borrow().at_goal() && at_goal_arm.borrow().at_goal()),
        vec![
            SubsystemRef(subsystems.elevator.clone()),
            SubsystemRef(subsystems.arm.clone()),
        ],
    )
}

/// Bring everything back to the travel position.
pub fn stow_elevator_and_arm(subsystems: &Subsystems) -> FunctionalCommand {
    let elevator = subsystems.elevator.clone();
    let arm = subsystems.arm.clone();
    let at_goal_elevator = elevator.clone();
    let at_goal_arm = arm.clone();

    FunctionalCommand::new(
        move || {
            elevator.borrow_mut().stow();
            arm.borrow_mut().stow();
            Ok(())
        },
        || Ok(()),
        |_| Ok(()),
        move || Ok(at_goal_elevator.borrow().at_goal() && at_goal_arm.borrow().at_goal()),
        vec![
            SubsystemRef(subsystems.elevator.clone()),
            SubsystemRef(subsystems.arm.clone()),
        ],
    )
}
