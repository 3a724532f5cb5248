use std::{cell::RefCell, rc::Rc};

use rio_command::{subsystem::Subsystem, telemetry::Telemetry, Result};

pub mod algae_grabber;
pub mod arm;
pub mod climber;
pub mod coral_roller;
pub mod drivetrain;
pub mod elevator;
pub mod status_leds;

pub use algae_grabber::AlgaeGrabber;
pub use arm::Arm;
pub use climber::Climber;
pub use coral_roller::CoralRoller;
pub use drivetrain::Drivetrain;
pub use elevator::Elevator;
pub use status_leds::StatusLeds;

/// Every hardware-facing subsystem on the robot, registered with the
/// scheduler and shared with the commands that drive them.
#[derive(Clone)]
pub struct Subsystems {
    pub drivetrain: Rc<RefCell<Drivetrain>>,
    pub elevator: Rc<RefCell<Elevator>>,
    pub arm: Rc<RefCell<Arm>>,
    pub coral_roller: Rc<RefCell<CoralRoller>>,
    pub algae_grabber: Rc<RefCell<AlgaeGrabber>>,
    pub climber: Rc<RefCell<Climber>>,
    pub status_leds: Rc<RefCell<StatusLeds>>,
}

impl Subsystems {
    pub fn new() -> Result<Self> {
        Ok(Self {
            drivetrain: Drivetrain::new()?.register(),
            elevator: Elevator::new()?.register(),
            arm: Arm::new()?.register(),
            coral_roller: CoralRoller::new()?.register(),
            algae_grabber: AlgaeGrabber::new()?.register(),
            climber: Climber::new()?.register(),
            status_leds: StatusLeds::new().register(),
        })
    }

    pub fn init_dashboard(&self) {
        self.drivetrain.borrow_mut().init_dashboard();
        self.elevator.borrow_mut().init_dashboard();
    }

    /// Cross-subsystem status published once per tick. Per-subsystem
    /// periodic work happens in the scheduler's pass, not here.
    pub fn periodic(&self) {
        let tab = Telemetry::tab("Status");
        tab.publish_bool("Coral/present", self.coral_roller.borrow().has_coral());
        tab.publish_bool("Algae/present", self.algae_grabber.borrow().has_algae());
        tab.publish_bool("Climber/climbed", self.climber.borrow().is_climbed());
        tab.publish_double(
            "Climber/travelMeters",
            self.climber.borrow().travel_meters(),
        );
        tab.publish_double(
            "Drive/headingDeg",
            self.drivetrain.borrow().heading_radians().to_degrees(),
        );
        tab.publish_double(
            "Elevator/heightMeters",
            self.elevator.borrow().height_meters(),
        );
    }

    pub fn disable(&self) {
        self.drivetrain.borrow_mut().disable();
        self.elevator.borrow_mut().disable();
        self.arm.borrow_mut().disable();
        self.coral_roller.borrow_mut().disable();
        self.algae_grabber.borrow_mut().disable();
        self.climber.borrow_mut().disable();
        self.status_leds.borrow_mut().disable();
    }
}
