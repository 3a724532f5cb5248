use rio_command::{command::FunctionalCommand, SubsystemRef};

use crate::subsystems::Subsystems;

/// Winch the robot onto the cage. Finishes at the hard stop; releasing the
/// button pauses the climb where it is.
pub fn climb(subsystems: &Subsystems) -> FunctionalCommand {
    let climber = subsystems.climber.clone();
    let stopper = climber.clone();
    let done = climber.clone();

    FunctionalCommand::new(
        move || {
            climber.borrow_mut().climb();
            Ok(())
        },
        || Ok(()),
        move |_| {
            stopper.borrow_mut().stop();
            Ok(())
        },
        move || Ok(done.borrow().is_climbed()),
        vec![SubsystemRef(subsystems.climber.clone())],
    )
}
