use std::{cell::RefCell, fmt::Debug, rc::Rc};

use crate::{
    command::FunctionalCommand, run, run_end, run_once, start_end, CommandScheduler, Result,
    SubsystemRef,
};

/// A collection of robot parts and other hardware that act together as a whole.
pub trait Subsystem: Debug {
    /// This method will be called once per scheduler run
    fn periodic(&mut self) {}
    /// This method will be called once per scheduler run, but only during simulation
    fn sim_periodic(&mut self) {}

    fn register(self) -> Rc<RefCell<Self>>
    where
        Self: Sized + 'static,
    {
        CommandScheduler::register(self)
    }
}

/// Closure-command factories that require the subsystem they are built from.
pub trait SubsystemRefExt {
    fn run_once(&self, action: impl FnMut() -> Result + 'static) -> FunctionalCommand;
    fn run(&self, action: impl FnMut() -> Result + 'static) -> FunctionalCommand;
    fn start_end(
        &self,
        start: impl FnMut() -> Result + 'static,
        end: impl FnMut() -> Result + 'static,
    ) -> FunctionalCommand;
    fn run_end(
        &self,
        run: impl FnMut() -> Result + 'static,
        end: impl FnMut() -> Result + 'static,
    ) -> FunctionalCommand;
}

impl<T> SubsystemRefExt for Rc<RefCell<T>>
where
    T: Subsystem + 'static,
{
    fn run_once(&self, mut action: impl FnMut() -> Result + 'static) -> FunctionalCommand {
        run_once!({ action() }, SubsystemRef(self.clone()))
    }
    fn run(&self, mut action: impl FnMut() -> Result + 'static) -> FunctionalCommand {
        run!({ action() }, SubsystemRef(self.clone()))
    }
    fn start_end(
        &self,
        mut start: impl FnMut() -> Result + 'static,
        mut end: impl FnMut() -> Result + 'static,
    ) -> FunctionalCommand {
        start_end!({ start() }, { end() }, SubsystemRef(self.clone()))
    }
    fn run_end(
        &self,
        mut run: impl FnMut() -> Result + 'static,
        mut end: impl FnMut() -> Result + 'static,
    ) -> FunctionalCommand {
        run_end!({ run() }, { end() }, SubsystemRef(self.clone()))
    }
}

impl SubsystemRefExt for SubsystemRef {
    fn run_once(&self, mut action: impl FnMut() -> Result + 'static) -> FunctionalCommand {
        run_once!({ action() }, self.clone())
    }
    fn run(&self, mut action: impl FnMut() -> Result + 'static) -> FunctionalCommand {
        run!({ action() }, self.clone())
    }
    fn start_end(
        &self,
        mut start: impl FnMut() -> Result + 'static,
        mut end: impl FnMut() -> Result + 'static,
    ) -> FunctionalCommand {
        start_end!({ start() }, { end() }, self.clone())
    }
    fn run_end(
        &self,
        mut run: impl FnMut() -> Result + 'static,
        mut end: impl FnMut() -> Result + 'static,
    ) -> FunctionalCommand {
        run_end!({ run() }, { end() }, self.clone())
    }
}
