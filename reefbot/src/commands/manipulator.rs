use rio_command::{command::FunctionalCommand, SubsystemRef};

use crate::subsystems::Subsystems;

/// Panic button: claims every manipulator subsystem for one instant, which
/// interrupts whatever was running on them, then releases them to their
/// defaults.
pub fn interrupt_all(subsystems: &Subsystems) -> FunctionalCommand {
    FunctionalCommand::instant(
        || {
            tracing::info!("manipulator commands interrupted by operator");
            Ok(())
        },
        vec![
            SubsystemRef(subsystems.elevator.clone()),
            SubsystemRef(subsystems.arm.clone()),
            SubsystemRef(subsystems.coral_roller.clone()),
            SubsystemRef(subsystems.algae_grabber.clone()),
        ],
    )
}
