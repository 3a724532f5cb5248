use rio_command::{command::FunctionalCommand, SubsystemRef};

use crate::subsystems::Subsystems;

/// Run the rollers inward until the beam break sees a coral.
pub fn intake_until_coral_detected(subsystems: &Subsystems) -> FunctionalCommand {
    let roller = subsystems.coral_roller.clone();
    let stopper = roller.clone();
    let detector = roller.clone();

    FunctionalCommand::new(
        move || {
            roller.borrow_mut().intake();
            Ok(())
        },
        || Ok(()),
        move |_| {
            stopper.borrow_mut().stop();
            Ok(())
        },
        move || Ok(detector.borrow().has_coral()),
        vec![SubsystemRef(subsystems.coral_roller.clone())],
    )
}

/// Run the rollers outward until the coral has left the manipulator.
pub fn outtake_until_coral_not_detected(subsystems: &Subsystems) -> FunctionalCommand {
    let roller = subsystems.coral_roller.clone();
    let stopper = roller.clone();
    let detector = roller.clone();

    FunctionalCommand::new(
        move || {
            roller.borrow_mut().outtake();
            Ok(())
        },
        || Ok(()),
        move |_| {
            stopper.borrow_mut().stop();
            Ok(())
        },
        move || Ok(!detector.borrow().has_coral()),
        vec![SubsystemRef(subsystems.coral_roller.clone())],
    )
}
