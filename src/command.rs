use std::{cell::RefCell, rc::Rc};

use crate::{CommandScheduler, Result, SubsystemRef};

pub mod button;
pub mod group;

/// An action the robot can perform. Runs when scheduled, until it is interrupted or it finishes.
pub trait Command {
    fn requirements(&self) -> &[SubsystemRef];

    /// The initial subroutine of a command. Called once when the command is initially scheduled.
    fn initialize(&mut self) -> Result {
        Ok(())
    }
    fn execute(&mut self) -> Result {
        Ok(())
    }
    #[allow(unused_variables)]
    fn end(&mut self, interrupted: bool) -> Result {
        Ok(())
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(false)
    }

    fn runs_when_disabled(&self) -> bool {
        false
    }

    fn interruption_behavior(&self) -> InterruptionBehavior {
        InterruptionBehavior::default()
    }
}

pub trait CommandRefExt {
    fn schedule(&self) -> Result;
    fn cancel(&self) -> Result;
    fn is_scheduled(&self) -> bool;
}

impl CommandRefExt for Rc<RefCell<dyn Command>> {
    fn schedule(&self) -> Result {
        CommandScheduler::schedule(self.clone())
    }

    fn cancel(&self) -> Result {
        CommandScheduler::cancel(self.clone())
    }

    fn is_scheduled(&self) -> bool {
        CommandScheduler::is_scheduled(self)
    }
}

/// What happens to a running command when another command wants one of its
/// subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterruptionBehavior {
    #[default]
    CancelSelf,
    CancelIncoming,
}

pub struct FunctionalCommand {
    on_init: Box<dyn FnMut() -> Result>,
    on_execute: Box<dyn FnMut() -> Result>,
    on_end: Box<dyn FnMut(bool) -> Result>,
    is_finished: Box<dyn Fn() -> Result<bool>>,
    requirements: Vec<SubsystemRef>,
}

impl FunctionalCommand {
    pub fn new(
        on_init: impl FnMut() -> Result + 'static,
        on_execute: impl FnMut() -> Result + 'static,
        on_end: impl FnMut(bool) -> Result + 'static,
        is_finished: impl Fn() -> Result<bool> + 'static,
        requirements: Vec<SubsystemRef>,
    ) -> Self {
        Self {
            on_init: Box::new(on_init),
            on_execute: Box::new(on_execute),
            on_end: Box::new(on_end),
            is_finished: Box::new(is_finished),
            requirements,
        }
    }

    /// A command that runs its action once and immediately finishes.
    pub fn instant(
        action: impl FnMut() -> Result + 'static,
        requirements: Vec<SubsystemRef>,
    ) -> Self {
        Self::new(action, || Ok(()), |_| Ok(()), || Ok(true), requirements)
    }
}

impl Command for FunctionalCommand {
    fn requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        (self.on_init)()
    }

    fn execute(&mut self) -> Result {
        (self.on_execute)()
    }

    fn end(&mut self, interrupted: bool) -> Result {
        (self.on_end)(interrupted)
    }

    fn is_finished(&self) -> Result<bool> {
        (self.is_finished)()
    }
}

#[macro_export]
macro_rules! run_once {
    ($on_init:block) => {
        $crate::command::FunctionalCommand::instant(move || $on_init, ::std::vec![])
    };
    ($on_init:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::instant(move || $on_init, ::std::vec![$($requirement),+])
    };
}

#[macro_export]
macro_rules! run {
    ($on_execute:block) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $on_execute,
            |_| Ok(()),
            || Ok(false),
            ::std::vec![],
        )
    };
    ($on_execute:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $on_execute,
            |_| Ok(()),
            || Ok(false),
            ::std::vec![$($requirement),+],
        )
    };
}

#[macro_export]
macro_rules! start_end {
    ($start:block, $end:block) => {
        $crate::command::FunctionalCommand::new(
            move || $start,
            || Ok(()),
            move |_| $end,
            || Ok(false),
            ::std::vec![],
        )
    };
    ($start:block, $end:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            move || $start,
            || Ok(()),
            move |_| $end,
            || Ok(false),
            ::std::vec![$($requirement),+],
        )
    };
}

#[macro_export]
macro_rules! run_end {
    ($execute:block, $end:block) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $execute,
            move |_| $end,
            || Ok(false),
            ::std::vec![],
        )
    };
    ($execute:block, $end:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $execute,
            move |_| $end,
            || Ok(false),
            ::std::vec![$($requirement),+],
        )
    };
}
