use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::{Duration, Instant},
};

use crate::command::button::Trigger;

/// A list of callbacks polled once per scheduler iteration.
#[derive(Default)]
pub struct EventLoop {
    events: Vec<Box<dyn FnMut()>>,
}

impl EventLoop {
    /// Add an event to run when the loop is polled.
    pub fn bind(&mut self, action: impl FnMut() + 'static) {
        self.events.push(Box::new(action));
    }

    pub fn poll(&mut self) {
        for event in self.events.iter_mut() {
            event();
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// A boolean signal sampled into an event loop. Derived events share the
/// sampled state, so every consumer in one poll sees the same value.
pub struct BooleanEvent {
    event_loop: Rc<RefCell<EventLoop>>,
    state: Rc<Cell<bool>>,
}

impl BooleanEvent {
    pub fn new(
        event_loop: Rc<RefCell<EventLoop>>,
        mut signal: impl FnMut() -> bool + 'static,
    ) -> Self {
        let state = Rc::new(Cell::new(signal()));
        event_loop.borrow_mut().bind({
            let state = state.clone();
            move || {
                state.set(signal());
            }
        });
        Self { event_loop, state }
    }

    pub fn current_state(&self) -> bool {
        self.state.get()
    }

    pub fn if_high(&self, mut action: impl FnMut() + 'static) {
        let state = self.state.clone();
        self.event_loop.borrow_mut().bind(move || {
            if state.get() {
                action();
            }
        });
    }

    /// High for the single poll where the signal goes low to high.
    pub fn rising(&self) -> Self {
        let mut previous = self.state.get();
        let state = self.state.clone();

        Self::new(self.event_loop.clone(), move || {
            let present = state.get();
            let is_rising = !previous && present;
            previous = present;
            is_rising
        })
    }

    /// High for the single poll where the signal goes high to low.
    pub fn falling(&self) -> Self {
        let mut previous = self.state.get();
        let state = self.state.clone();

        Self::new(self.event_loop.clone(), move || {
            let present = state.get();
            let is_falling = previous && !present;
            previous = present;
            is_falling
        })
    }

    /// Follows the signal, but only reports a change after it has held
    /// steady for `duration`.
    pub fn debounce(&self, duration: Duration) -> Self {
        let state = self.state.clone();
        let mut reported = state.get();
        let mut pending_since: Option<Instant> = None;

        Self::new(self.event_loop.clone(), move || {
            let present = state.get();
            if present == reported {
                pending_since = None;
            } else {
                let since = *pending_since.get_or_insert_with(Instant::now);
                if since.elapsed() >= duration {
                    reported = present;
                    pending_since = None;
                }
            }
            reported
        })
    }

    pub fn negate(&self) -> Self {
        let state = self.state.clone();
        Self::new(self.event_loop.clone(), move || !state.get())
    }

    pub fn and(&self, other: &Self) -> Self {
        let state = self.state.clone();
        let other_state = other.state.clone();
        Self::new(self.event_loop.clone(), move || {
            state.get() && other_state.get()
        })
    }

    pub fn or(&self, other: &Self) -> Self {
        let state = self.state.clone();
        let other_state = other.state.clone();
        Self::new(self.event_loop.clone(), move || {
            state.get() || other_state.get()
        })
    }

    pub fn as_trigger(&self) -> Trigger {
        let state = self.state.clone();
        Trigger::new_with_loop(self.event_loop.clone(), move || state.get())
    }
}

impl From<BooleanEvent> for Trigger {
    fn from(event: BooleanEvent) -> Self {
        Self::new_with_loop(event.event_loop, move || event.state.get())
    }
}
