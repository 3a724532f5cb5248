use std::{
    cell::{Cell, RefCell},
    hash::Hash,
    ops::Deref,
    rc::Rc,
};

use command::{Command, InterruptionBehavior};
use event::EventLoop;
use hashbrown::{HashMap, HashSet};
use snafu::Snafu;
use subsystem::Subsystem;

pub mod command;
pub mod event;
pub mod gamepad;
pub mod preferences;
pub mod robot;
pub mod station;
pub mod subsystem;
pub mod telemetry;

/// Errors surfaced by commands and the devices they drive.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("device fault on {device}: {message}"))]
    Device { device: String, message: String },
    #[snafu(display("no gamepad connected on port {port}"))]
    GamepadDisconnected { port: usize },
}

pub type Result<T = ()> = core::result::Result<T, Error>;

/// Shared handle to a registered subsystem. Identity is pointer identity, so
/// two handles compare equal only when they refer to the same subsystem.
#[derive(Clone)]
pub struct SubsystemRef(pub Rc<RefCell<dyn Subsystem>>);

impl PartialEq for SubsystemRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SubsystemRef {}

impl Hash for SubsystemRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as *const ()).hash(state);
    }
}

impl From<Rc<RefCell<dyn Subsystem>>> for SubsystemRef {
    fn from(subsystem: Rc<RefCell<dyn Subsystem>>) -> Self {
        Self(subsystem)
    }
}

impl<T: Subsystem + 'static> From<Rc<RefCell<T>>> for SubsystemRef {
    fn from(subsystem: Rc<RefCell<T>>) -> Self {
        Self(subsystem)
    }
}

impl Deref for SubsystemRef {
    type Target = Rc<RefCell<dyn Subsystem>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Shared handle to a schedulable command.
#[derive(Clone)]
pub struct CommandRef(pub Rc<RefCell<dyn Command>>);

impl PartialEq for CommandRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for CommandRef {}

impl Hash for CommandRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl From<Rc<RefCell<dyn Command>>> for CommandRef {
    fn from(command: Rc<RefCell<dyn Command>>) -> Self {
        Self(command)
    }
}

impl<T: Command + 'static> From<T> for CommandRef {
    fn from(command: T) -> Self {
        Self(Rc::new(RefCell::new(command)))
    }
}

impl Deref for CommandRef {
    type Target = Rc<RefCell<dyn Command>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Snafu)]
pub enum SetDefaultCommandError {
    #[snafu(display("Default commands must require their subsystem."))]
    MustRequireSubsystem,
    #[snafu(display("Cannot set the default command on a subsystem that is not registered."))]
    NotRegistered,
}

#[derive(Default)]
struct CommandSchedulerState {
    subsystems: RefCell<HashMap<SubsystemRef, Option<CommandRef>>>,
    in_run_loop: Cell<bool>,
    to_schedule: RefCell<Vec<CommandRef>>,
    to_cancel: RefCell<Vec<CommandRef>>,
    scheduled_commands: RefCell<HashSet<CommandRef>>,
    requirements: RefCell<HashMap<SubsystemRef, CommandRef>>,
    button_loop: Rc<RefCell<EventLoop>>,
    ending_commands: RefCell<HashSet<CommandRef>>,
}

impl CommandSchedulerState {
    #[inline]
    fn is_scheduled(&self, command: &CommandRef) -> bool {
        self.scheduled_commands.borrow().contains(command)
    }

    fn requiring(&self, subsystem: &SubsystemRef) -> Option<CommandRef> {
        self.requirements.borrow().get(subsystem).cloned()
    }

    fn init_command(&self, command: CommandRef, requirements: HashSet<SubsystemRef>) -> Result {
        self.requirements
            .borrow_mut()
            .extend(requirements.into_iter().map(|r| (r, command.clone())));

        self.scheduled_commands.borrow_mut().insert(command.clone());
        (*command.0).borrow_mut().initialize()?;
        Ok(())
    }

    fn cancel(&self, command: &CommandRef) -> Result {
        if self.ending_commands.borrow().contains(command) {
            return Ok(());
        }

        if self.in_run_loop.get() {
            self.to_cancel.borrow_mut().push(command.clone());
            return Ok(());
        }

        if !self.is_scheduled(command) {
            return Ok(());
        }

        self.ending_commands.borrow_mut().insert(command.clone());
        {
            let mut command = (*command.0).borrow_mut();
            command.end(true)?;
        }
        self.ending_commands.borrow_mut().remove(command);
        self.scheduled_commands.borrow_mut().remove(command);
        {
            let requirements = CommandScheduler::requirements_of(&*(*command.0).borrow());
            for requirement in requirements {
                self.requirements.borrow_mut().remove(&requirement);
            }
        }

        Ok(())
    }

    fn schedule_now(&self, command: CommandRef) -> Result {
        if self.is_scheduled(&command) {
            return Ok(());
        }

        let requirements = CommandScheduler::requirements_of(&*(*command.0).borrow());

        if requirements.is_disjoint(&self.requirements.borrow().keys().cloned().collect()) {
            self.init_command(command, requirements)
        } else {
            let requiring_commands = requirements
                .iter()
                .filter_map(|r| self.requiring(r))
                .collect::<Vec<_>>();

            for requiring in &requiring_commands {
                if (*requiring.0).borrow().interruption_behavior()
                    == InterruptionBehavior::CancelIncoming
                {
                    tracing::debug!("incoming command discarded by a CancelIncoming holder");
                    return Ok(());
                }
            }

            for requiring in &requiring_commands {
                self.cancel(requiring)?;
            }

            self.init_command(command, requirements)
        }
    }
}

thread_local! {
    static STATE: CommandSchedulerState = CommandSchedulerState::default();
}

/// The cooperative scheduler at the heart of the framework. State lives in a
/// thread local; all access goes through the associated functions.
pub struct CommandScheduler;

impl CommandScheduler {
    /// Register a subsystem with the scheduler.
    pub fn register<S: Subsystem + 'static>(subsystem: S) -> Rc<RefCell<S>> {
        let subsystem = Rc::new(RefCell::new(subsystem));
        STATE.with(|state| {
            state
                .subsystems
                .borrow_mut()
                .insert(SubsystemRef(subsystem.clone()), None);
        });
        subsystem
    }

    /// Schedule a command to run.
    pub fn schedule(command: Rc<RefCell<dyn Command>>) -> Result {
        STATE.with(|state| {
            let command = CommandRef(command);
            if state.in_run_loop.get() {
                state.to_schedule.borrow_mut().push(command);
                return Ok(());
            }

            state.schedule_now(command)
        })
    }

    pub fn cancel(command: Rc<RefCell<dyn Command>>) -> Result {
        STATE.with(|state| state.cancel(&CommandRef(command)))
    }

    pub fn set_default_command<S>(
        subsystem: &Rc<RefCell<S>>,
        command: impl Command + 'static,
    ) -> core::result::Result<(), SetDefaultCommandError>
    where
        S: Subsystem + 'static,
    {
        STATE.with(|state| {
            let requirements = CommandScheduler::requirements_of(&command);
            if !requirements.contains(&SubsystemRef(subsystem.clone())) {
                return Err(SetDefaultCommandError::MustRequireSubsystem);
            }

            let command = CommandRef(Rc::new(RefCell::new(command)));
            state
                .subsystems
                .borrow_mut()
                .get_mut(&SubsystemRef(subsystem.clone()))
                .ok_or(SetDefaultCommandError::NotRegistered)?
                .replace(command);

            Ok(())
        })
    }

    pub fn remove_default_command<S>(subsystem: &Rc<RefCell<S>>) -> Option<Rc<RefCell<dyn Command>>>
    where
        S: Subsystem + 'static,
    {
        STATE.with(|state| {
            let command = state
                .subsystems
                .borrow_mut()
                .get_mut(&SubsystemRef(subsystem.clone()))?
                .take();
            command.map(|c| c.0)
        })
    }

    /// One scheduler pass. Called once per iteration by the robot loop.
    pub fn run() -> Result {
        STATE.with(|state| {
            for subsystem in state.subsystems.borrow().keys() {
                let mut subsystem = (*subsystem.0).borrow_mut();
                subsystem.periodic();
                if robot::is_sim() {
                    subsystem.sim_periodic();
                }
            }

            let button_loop = state.button_loop.clone();
            (*button_loop).borrow_mut().poll();

            state.in_run_loop.set(true);
            let disabled = station::DriverStation::instance().is_disabled();

            let scheduled_commands = state
                .scheduled_commands
                .borrow()
                .iter()
                .cloned()
                .collect::<Vec<_>>();

            for command in scheduled_commands {
                let mut command_ref = (*command.0).borrow_mut();
                if disabled && !command_ref.runs_when_disabled() {
                    state.cancel(&command)?;
                    continue;
                }

                command_ref.execute()?;
                if command_ref.is_finished()? {
                    state.ending_commands.borrow_mut().insert(command.clone());
                    let res = command_ref.end(false);
                    state.ending_commands.borrow_mut().remove(&command);
                    res?;
                    state.scheduled_commands.borrow_mut().remove(&command);
                    let requirements = command_ref.requirements();
                    for requirement in requirements {
                        state.requirements.borrow_mut().remove(requirement);
                    }
                }
            }

            state.in_run_loop.set(false);

            let to_schedule = state.to_schedule.take();
            for command in to_schedule {
                state.schedule_now(command)?;
            }

            let to_cancel = state.to_cancel.take();
            for command in to_cancel {
                state.cancel(&command)?;
            }

            // Schedule default commands for subsystems nothing requires.
            for (subsystem, command) in state.subsystems.borrow().iter() {
                if let Some(default_command) = command {
                    if !state.requirements.borrow().contains_key(subsystem) {
                        state.schedule_now(default_command.clone())?;
                    }
                }
            }

            Ok(())
        })
    }

    fn requirements_of(command: &dyn Command) -> HashSet<SubsystemRef> {
        command.requirements().iter().cloned().collect()
    }

    pub fn cancel_all() -> Result {
        STATE.with(|state| {
            let scheduled_commands = state
                .scheduled_commands
                .borrow()
                .iter()
                .cloned()
                .collect::<Vec<_>>();

            for command in scheduled_commands {
                state.cancel(&command)?;
            }

            Ok(())
        })
    }

    pub fn button_event_loop() -> Rc<RefCell<EventLoop>> {
        STATE.with(|state| state.button_loop.clone())
    }

    pub fn is_scheduled(command: &Rc<RefCell<dyn Command>>) -> bool {
        STATE.with(|state| state.is_scheduled(&CommandRef(command.clone())))
    }

    /// Drop every registered subsystem, scheduled command, and button
    /// binding on the current thread. Test support.
    #[doc(hidden)]
    pub fn reset() {
        STATE.with(|state| {
            state.subsystems.borrow_mut().clear();
            state.to_schedule.borrow_mut().clear();
            state.to_cancel.borrow_mut().clear();
            state.scheduled_commands.borrow_mut().clear();
            state.requirements.borrow_mut().clear();
            state.ending_commands.borrow_mut().clear();
            state.button_loop.borrow_mut().clear();
            state.in_run_loop.set(false);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use serial_test::serial;

    use super::*;
    use crate::command::test_support::{RecordingCommand, TraceEvent};
    use crate::command::FunctionalCommand;
    use crate::robot::CompetitionMode;
    use crate::station::DriverStation;

    #[derive(Debug, Default)]
    struct TestSubsystem {
        ticks: u32,
    }

    impl Subsystem for TestSubsystem {
        fn periodic(&mut self) {
            self.ticks += 1;
        }
    }

    #[test]
    #[serial]
    fn scheduled_command_runs_until_finished() {
        CommandScheduler::reset();
        DriverStation::instance().set_mode(CompetitionMode::Teleop);
        let subsystem = CommandScheduler::register(TestSubsystem::default());

        let (command, trace) = RecordingCommand::finishing_after(2, vec![subsystem.into()]);
        let command: Rc<RefCell<dyn Command>> = Rc::new(RefCell::new(command));
        CommandScheduler::schedule(command.clone()).unwrap();
        assert!(CommandScheduler::is_scheduled(&command));

        CommandScheduler::run().unwrap();
        CommandScheduler::run().unwrap();

        assert!(!CommandScheduler::is_scheduled(&command));
        assert_eq!(
            trace.take(),
            vec![
                TraceEvent::Initialize,
                TraceEvent::Execute,
                TraceEvent::Execute,
                TraceEvent::End { interrupted: false },
            ]
        );
    }

    #[test]
    fn conflicting_command_interrupts_current_holder() {
        CommandScheduler::reset();
        let subsystem = CommandScheduler::register(TestSubsystem::default());
        let shared: SubsystemRef = subsystem.into();

        let (first, first_trace) = RecordingCommand::endless(vec![shared.clone()]);
        let (second, _) = RecordingCommand::endless(vec![shared]);
        let first: Rc<RefCell<dyn Command>> = Rc::new(RefCell::new(first));
        let second: Rc<RefCell<dyn Command>> = Rc::new(RefCell::new(second));

        CommandScheduler::schedule(first.clone()).unwrap();
        CommandScheduler::schedule(second.clone()).unwrap();

        assert!(!CommandScheduler::is_scheduled(&first));
        assert!(CommandScheduler::is_scheduled(&second));
        assert_eq!(
            first_trace.take(),
            vec![TraceEvent::Initialize, TraceEvent::End { interrupted: true }]
        );
    }

    #[test]
    fn cancel_incoming_holder_discards_newcomer() {
        CommandScheduler::reset();
        let subsystem = CommandScheduler::register(TestSubsystem::default());
        let shared: SubsystemRef = subsystem.into();

        let (holder, _) = RecordingCommand::endless_cancel_incoming(vec![shared.clone()]);
        let (incoming, incoming_trace) = RecordingCommand::endless(vec![shared]);
        let holder: Rc<RefCell<dyn Command>> = Rc::new(RefCell::new(holder));
        let incoming: Rc<RefCell<dyn Command>> = Rc::new(RefCell::new(incoming));

        CommandScheduler::schedule(holder.clone()).unwrap();
        CommandScheduler::schedule(incoming.clone()).unwrap();

        assert!(CommandScheduler::is_scheduled(&holder));
        assert!(!CommandScheduler::is_scheduled(&incoming));
        assert!(incoming_trace.take().is_empty());
    }

    #[test]
    #[serial]
    fn default_command_fills_idle_subsystem() {
        CommandScheduler::reset();
        DriverStation::instance().set_mode(CompetitionMode::Teleop);
        let subsystem = CommandScheduler::register(TestSubsystem::default());

        let shared: SubsystemRef = subsystem.clone().into();
        let (default, default_trace) = RecordingCommand::endless(vec![shared]);
        CommandScheduler::set_default_command(&subsystem, default).unwrap();

        CommandScheduler::run().unwrap();
        CommandScheduler::run().unwrap();

        let trace = default_trace.take();
        assert_eq!(trace[0], TraceEvent::Initialize);
        assert!(trace.contains(&TraceEvent::Execute));
    }

    #[test]
    fn default_command_must_require_its_subsystem() {
        CommandScheduler::reset();
        let subsystem = CommandScheduler::register(TestSubsystem::default());

        let unrelated = FunctionalCommand::instant(|| Ok(()), vec![]);
        let err = CommandScheduler::set_default_command(&subsystem, unrelated).unwrap_err();
        assert!(matches!(err, SetDefaultCommandError::MustRequireSubsystem));
    }

    #[test]
    fn scheduling_twice_is_a_no_op() {
        CommandScheduler::reset();
        let subsystem = CommandScheduler::register(TestSubsystem::default());

        let (command, trace) = RecordingCommand::endless(vec![subsystem.into()]);
        let command: Rc<RefCell<dyn Command>> = Rc::new(RefCell::new(command));
        CommandScheduler::schedule(command.clone()).unwrap();
        CommandScheduler::schedule(command.clone()).unwrap();

        assert_eq!(trace.take(), vec![TraceEvent::Initialize]);
    }

    #[test]
    fn cancel_all_interrupts_everything() {
        CommandScheduler::reset();
        let a = CommandScheduler::register(TestSubsystem::default());
        let b = CommandScheduler::register(TestSubsystem::default());

        let (first, first_trace) = RecordingCommand::endless(vec![a.into()]);
        let (second, second_trace) = RecordingCommand::endless(vec![b.into()]);
        let first: Rc<RefCell<dyn Command>> = Rc::new(RefCell::new(first));
        let second: Rc<RefCell<dyn Command>> = Rc::new(RefCell::new(second));
        CommandScheduler::schedule(first.clone()).unwrap();
        CommandScheduler::schedule(second.clone()).unwrap();

        CommandScheduler::cancel_all().unwrap();

        assert!(!CommandScheduler::is_scheduled(&first));
        assert!(!CommandScheduler::is_scheduled(&second));
        assert!(first_trace
            .take()
            .contains(&TraceEvent::End { interrupted: true }));
        assert!(second_trace
            .take()
            .contains(&TraceEvent::End { interrupted: true }));
    }
}
