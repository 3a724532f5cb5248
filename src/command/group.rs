use std::time::{Duration, Instant};

use super::Command;
use crate::{Result, SubsystemRef};

/// Runs commands one after another inside a single scheduled command.
///
/// The group requires the union of its members' subsystems for its whole
/// lifetime, so a conflict anywhere interrupts the group as one unit.
pub struct Sequence {
    steps: Vec<Box<dyn Command>>,
    requirements: Vec<SubsystemRef>,
    current: usize,
}

impl Sequence {
    pub fn new(steps: Vec<Box<dyn Command>>) -> Self {
        let mut requirements: Vec<SubsystemRef> = Vec::new();
        for step in &steps {
            for requirement in step.requirements() {
                if !requirements.contains(requirement) {
                    requirements.push(requirement.clone());
                }
            }
        }

        Self {
            steps,
            requirements,
            current: 0,
        }
    }
}

impl Command for Sequence {
    fn requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        self.current = 0;
        if let Some(first) = self.steps.first_mut() {
            first.initialize()?;
        }
        Ok(())
    }

    fn execute(&mut self) -> Result {
        let Some(step) = self.steps.get_mut(self.current) else {
            return Ok(());
        };

        step.execute()?;
        if step.is_finished()? {
            step.end(false)?;
            self.current += 1;
            if let Some(next) = self.steps.get_mut(self.current) {
                next.initialize()?;
            }
        }
        Ok(())
    }

    fn end(&mut self, interrupted: bool) -> Result {
        if interrupted {
            if let Some(step) = self.steps.get_mut(self.current) {
                step.end(true)?;
            }
        }
        Ok(())
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(self.current >= self.steps.len())
    }
}

/// Does nothing until the given time has passed. A pacing step for groups.
pub struct Wait {
    duration: Duration,
    deadline: Option<Instant>,
}

impl Wait {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: None,
        }
    }
}

impl Command for Wait {
    fn requirements(&self) -> &[SubsystemRef] {
        &[]
    }

    fn initialize(&mut self) -> Result {
        self.deadline = Some(Instant::now() + self.duration);
        Ok(())
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        self.deadline = None;
        Ok(())
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(self.deadline.is_some_and(|deadline| Instant::now() >= deadline))
    }
}
