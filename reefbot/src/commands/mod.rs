//! Command factories, grouped by the mechanism they drive. Factories take
//! the subsystem aggregate the same way the container hands it out, so the
//! binding layer stays one call per control.

pub mod algae;
pub mod climber;
pub mod coral;
pub mod drive;
pub mod elevator;
pub mod leds;
pub mod manipulator;
