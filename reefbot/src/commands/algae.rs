use rio_command::{command::FunctionalCommand, SubsystemRef};

use crate::parameters::ElevatorLevel;
use crate::subsystems::Subsystems;

/// Arm angle that tucks the manipulator under a branch to pluck algae.
const REMOVAL_ANGLE_DEG: f64 = -20.0;

/// Deploy the grabber and pull algae in. Held commands stop their rollers
/// when interrupted; the stow is a separate binding on release.
pub fn intake_algae(subsystems: &Subsystems) -> FunctionalCommand {
    let grabber = subsystems.algae_grabber.clone();
    let stopper = grabber.clone();

    FunctionalCommand::new(
        move || {
            grabber.borrow_mut().intake();
            Ok(())
        },
        || Ok(()),
        move |_| {
            stopper.borrow_mut().stop();
            Ok(())
        },
        || Ok(false),
        vec![SubsystemRef(subsystems.algae_grabber.clone())],
    )
}

pub fn outtake_algae(subsystems: &Subsystems) -> FunctionalCommand {
    let grabber = subsystems.algae_grabber.clone();
    let stopper = grabber.clone();

    FunctionalCommand::new(
        move || {
            grabber.borrow_mut().outtake();
            Ok(())
        },
        || Ok(()),
        move |_| {
            stopper.borrow_mut().stop();
            Ok(())
        },
        || Ok(false),
        vec![SubsystemRef(subsystems.algae_grabber.clone())],
    )
}

/// Idle the rollers and fold the wrist back in.
pub fn stop_and_stow_intake(subsystems: &Subsystems) -> FunctionalCommand {
    let grabber = subsystems.algae_grabber.clone();
    FunctionalCommand::instant(
        move || {
            grabber.borrow_mut().stop_and_stow();
            Ok(())
        },
        vec![SubsystemRef(subsystems.algae_grabber.clone())],
    )
}

/// Hold the manipulator under the branch at `level` and spin the grabber to
/// pull the algae off the reef. Runs until released.
pub fn remove_algae_at_level(subsystems: &Subsystems, level: ElevatorLevel) -> FunctionalCommand {
    let elevator = subsystems.elevator.clone();
    let arm = subsystems.arm.clone();
    let grabber = subsystems.algae_grabber.clone();
    let stopper = grabber.clone();

    FunctionalCommand::new(
        move || {
            elevator
                .borrow_mut()
                .set_goal(level.algae_removal_height_meters());
            arm.borrow_mut().set_goal(REMOVAL_ANGLE_DEG);
            grabber.borrow_mut().intake();
            Ok(())
        },
        || Ok(()),
        move |_| {
            stopper.borrow_mut().stop();
            Ok(())
        },
        || Ok(false),
        vec![
            SubsystemRef(subsystems.elevator.clone()),
            SubsystemRef(subsystems.arm.clone()),
            SubsystemRef(subsystems.algae_grabber.clone()),
        ],
    )
}
