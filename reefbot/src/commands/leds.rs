use std::{cell::RefCell, rc::Rc, time::Duration};

use rio_command::{
    command::{
        group::{Sequence, Wait},
        Command,
    },
    subsystem::SubsystemRefExt,
    Result, SubsystemRef,
};

use crate::subsystems::{status_leds::Color, StatusLeds, Subsystems};

const INDICATION_HOLD: Duration = Duration::from_secs(1);

/// Idle animation: a flame rolling up the strip. Default command for the
/// LEDs, and it keeps running while the robot is disabled.
pub struct FlameCycle {
    leds: Rc<RefCell<StatusLeds>>,
    tick: u32,
    requirements: Vec<SubsystemRef>,
}

impl FlameCycle {
    pub fn new(leds: Rc<RefCell<StatusLeds>>) -> Self {
        Self {
            requirements: vec![SubsystemRef(leds.clone())],
            leds,
            tick: 0,
        }
    }

    fn heat(&self, index: usize, length: usize) -> f64 {
        // Deterministic flicker; no randomness needed at 50 Hz.
        let phase = self
            .tick
            .wrapping_mul(2_654_435_761)
            .wrapping_add(index as u32 * 40_503);
        let flicker = (phase >> 24) as f64 / 255.0;
        let falloff = 1.0 - index as f64 / length as f64;
        falloff * (0.55 + 0.45 * flicker)
    }
}

impl Command for FlameCycle {
    fn requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn execute(&mut self) -> Result {
        self.tick = self.tick.wrapping_add(1);
        let mut leds = self.leds.borrow_mut();
        let length = leds.len();
        for index in 0..length {
            let heat = self.heat(index, length);
            leds.set_pixel(
                index,
                Color::new((255.0 * heat) as u8, (80.0 * heat) as u8, 0),
            );
        }
        Ok(())
    }

    fn runs_when_disabled(&self) -> bool {
        true
    }
}

fn indicate(subsystems: &Subsystems, color: Color) -> Sequence {
    let leds = subsystems.status_leds.clone();
    let paint = subsystems.status_leds.run_once(move || {
        leds.borrow_mut().set_solid(color);
        Ok(())
    });
    Sequence::new(vec![Box::new(paint), Box::new(Wait::new(INDICATION_HOLD))])
}

/// Flash the strip coral-white for a moment after a pickup.
pub fn indicate_coral_acquired(subsystems: &Subsystems) -> Sequence {
    indicate(subsystems, Color::CORAL_WHITE)
}

/// Flash the strip teal after an algae pickup.
pub fn indicate_algae_acquired(subsystems: &Subsystems) -> Sequence {
    indicate(subsystems, Color::ALGAE_TEAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flame_cycle_lights_the_strip() {
        let leds = Rc::new(RefCell::new(StatusLeds::new()));
        let mut flame = FlameCycle::new(leds.clone());

        flame.execute().unwrap();
        let colors = leds.borrow();
        let colors = colors.colors();
        assert!(colors.iter().any(|c| c.r > 0));
        // Heat falls off along the strip; the base burns hotter than the tip.
        assert!(colors[0].r >= colors[colors.len() - 1].r);
    }

    #[test]
    fn flame_cycle_runs_while_disabled() {
        let leds = Rc::new(RefCell::new(StatusLeds::new()));
        assert!(FlameCycle::new(leds).runs_when_disabled());
    }
}
