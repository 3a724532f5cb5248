use std::{cell::RefCell, rc::Rc};

use super::CommandRefExt;
use crate::{event::EventLoop, CommandRef, CommandScheduler};

/// An edge-evaluated boolean condition that starts and stops commands.
///
/// Conditions are sampled when the scheduler polls the button event loop,
/// once per iteration. A failure to schedule or cancel is logged and the
/// binding stays armed; a bad command must not take the robot loop down.
pub struct Trigger {
    event_loop: Rc<RefCell<EventLoop>>,
    condition: Rc<dyn Fn() -> bool>,
}

fn report(operation: &str, result: crate::Result) {
    if let Err(err) = result {
        tracing::error!(%err, "trigger binding failed to {operation} command");
    }
}

impl Trigger {
    pub fn new_with_loop(
        event_loop: Rc<RefCell<EventLoop>>,
        condition: impl Fn() -> bool + 'static,
    ) -> Self {
        Self {
            event_loop,
            condition: Rc::new(condition),
        }
    }

    pub fn new(condition: impl Fn() -> bool + 'static) -> Self {
        Self {
            event_loop: CommandScheduler::button_event_loop(),
            condition: Rc::new(condition),
        }
    }

    pub fn on_true(self, command: impl Into<CommandRef>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();
        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if !pressed_last && pressed {
                report("schedule", command.schedule());
            }
            pressed_last = pressed;
        });
        self
    }

    pub fn on_false(self, command: impl Into<CommandRef>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();
        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if pressed_last && !pressed {
                report("schedule", command.schedule());
            }
            pressed_last = pressed;
        });
        self
    }

    pub fn while_true(self, command: impl Into<CommandRef>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();

        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if !pressed_last && pressed {
                report("schedule", command.schedule());
            } else if pressed_last && !pressed {
                report("cancel", command.cancel());
            }
            pressed_last = pressed;
        });
        self
    }

    pub fn while_false(self, command: impl Into<CommandRef>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();

        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if pressed_last && !pressed {
                report("schedule", command.schedule());
            } else if !pressed_last && pressed {
                report("cancel", command.cancel());
            }
            pressed_last = pressed;
        });
        self
    }

    pub fn toggle_on_true(self, command: impl Into<CommandRef>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();

        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if !pressed_last && pressed {
                if command.is_scheduled() {
                    report("cancel", command.cancel());
                } else {
                    report("schedule", command.schedule());
                }
            }
            pressed_last = pressed;
        });
        self
    }

    pub fn toggle_on_false(self, command: impl Into<CommandRef>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();

        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if pressed_last && !pressed {
                if command.is_scheduled() {
                    report("cancel", command.cancel());
                } else {
                    report("schedule", command.schedule());
                }
            }
            pressed_last = pressed;
        });
        self
    }

    pub fn is_active(&self) -> bool {
        (self.condition)()
    }

    pub fn and(&self, other: &Self) -> Self {
        let condition = self.condition.clone();
        let other_condition = other.condition.clone();
        Self::new(move || condition() && other_condition())
    }

    pub fn or(&self, other: &Self) -> Self {
        let condition = self.condition.clone();
        let other_condition = other.condition.clone();
        Self::new(move || condition() || other_condition())
    }

    pub fn negate(&self) -> Self {
        let condition = self.condition.clone();
        Self::new(move || !condition())
    }
}
