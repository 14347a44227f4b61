use chrono::{DateTime, Utc};

use super::domain::{Process, ProcessStep, ProcessStepStatus, ProcessStepType};
use crate::error::PortalError;
use crate::ids::VersionToken;
use crate::store::{Change, UnitOfWork};

/// A verified manual step of a process, ready to be settled.
///
/// Obtained through [`ManualProcessContext::verify`], which guarantees the process
/// exists, is not locked and has the step queued. All writes go into the caller's
/// [`UnitOfWork`]; nothing is persisted until the caller saves it.
#[derive(Debug, Clone)]
pub struct ManualProcessContext {
    step_type: ProcessStepType,
    process: Process,
    steps: Vec<ProcessStep>,
    now: DateTime<Utc>,
}

impl ManualProcessContext {
    pub fn verify(
        step_type: ProcessStepType,
        process: Option<Process>,
        steps: Vec<ProcessStep>,
        now: DateTime<Utc>,
        subject: &str,
    ) -> Result<Self, PortalError> {
        let process = process.ok_or_else(|| {
            PortalError::Conflict(format!("{subject} is not associated with any process"))
        })?;

        if let Some(expiry) = process.lock_expiry_date.filter(|_| process.is_locked(now)) {
            return Err(PortalError::Conflict(format!(
                "process {} associated with {subject} is locked, lock expiry is set to {expiry}",
                process.id
            )));
        }

        let steps: Vec<ProcessStep> = steps
            .into_iter()
            .filter(|step| step.process_id == process.id)
            .collect();

        if !steps
            .iter()
            .any(|step| step.step_type == step_type && step.is_todo())
        {
            return Err(PortalError::Conflict(format!(
                "{subject}, process step {step_type} is not eligible to run"
            )));
        }

        Ok(Self {
            step_type,
            process,
            steps,
            now,
        })
    }

    pub fn process(&self) -> &Process {
        &self.process
    }

    pub fn step_type(&self) -> ProcessStepType {
        self.step_type
    }

    pub fn steps(&self) -> &[ProcessStep] {
        &self.steps
    }

    fn has_todo(&self, step_type: ProcessStepType) -> bool {
        self.steps
            .iter()
            .any(|step| step.step_type == step_type && step.is_todo())
    }

    /// Queues the given step types unless a `TODO` step of that type already exists.
    pub fn schedule_steps<I>(&mut self, unit: &mut UnitOfWork, step_types: I) -> Vec<ProcessStepType>
    where
        I: IntoIterator<Item = ProcessStepType>,
    {
        let mut created = Vec::new();
        for step_type in step_types {
            if self.has_todo(step_type) {
                continue;
            }
            let step = ProcessStep::new(step_type, ProcessStepStatus::Todo, self.process.id, self.now);
            self.steps.push(step.clone());
            created.push(step);
        }

        let scheduled = created.iter().map(|step| step.step_type).collect();
        if !created.is_empty() {
            unit.push(Change::CreateProcessSteps(created));
        }
        scheduled
    }

    /// Skips every open step other than the current one and `keep`.
    pub fn skip_steps_except(&mut self, unit: &mut UnitOfWork, keep: &[ProcessStepType]) {
        let current = self.step_type;
        let now = self.now;
        for step in self.steps.iter_mut().filter(|step| {
            step.is_todo() && step.step_type != current && !keep.contains(&step.step_type)
        }) {
            step.status = ProcessStepStatus::Skipped;
            step.date_last_changed = Some(now);
            unit.push(Change::ModifyProcessStep {
                step_id: step.id,
                status: ProcessStepStatus::Skipped,
                message: None,
                changed_at: now,
            });
        }
    }

    /// Settles the current step and rolls the process version.
    ///
    /// The first open step of the current type becomes `DONE`; duplicates are
    /// `SKIPPED`. Returns the version the process will carry after the save.
    pub fn finalize(mut self, unit: &mut UnitOfWork, message: Option<String>) -> VersionToken {
        let current = self.step_type;
        let now = self.now;
        let mut settled = false;
        for step in self
            .steps
            .iter_mut()
            .filter(|step| step.is_todo() && step.step_type == current)
        {
            let (status, message) = if settled {
                (ProcessStepStatus::Skipped, None)
            } else {
                settled = true;
                (ProcessStepStatus::Done, message.clone())
            };
            step.status = status;
            step.date_last_changed = Some(now);
            unit.push(Change::ModifyProcessStep {
                step_id: step.id,
                status,
                message,
                changed_at: now,
            });
        }

        let next = VersionToken::generate();
        unit.push(Change::UpdateProcessVersion {
            process_id: self.process.id,
            expected: self.process.version,
            next,
        });
        next
    }
}

/// Skips every open step of `process` and rolls its version.
pub fn close_process(
    process: &Process,
    steps: &[ProcessStep],
    now: DateTime<Utc>,
    unit: &mut UnitOfWork,
    subject: &str,
) -> Result<(), PortalError> {
    if let Some(expiry) = process.lock_expiry_date.filter(|_| process.is_locked(now)) {
        return Err(PortalError::Conflict(format!(
            "process {} associated with {subject} is locked, lock expiry is set to {expiry}",
            process.id
        )));
    }

    for step in steps
        .iter()
        .filter(|step| step.process_id == process.id && step.is_todo())
    {
        unit.push(Change::ModifyProcessStep {
            step_id: step.id,
            status: ProcessStepStatus::Skipped,
            message: None,
            changed_at: now,
        });
    }
    unit.push(Change::UpdateProcessVersion {
        process_id: process.id,
        expected: process.version,
        next: VersionToken::generate(),
    });
    Ok(())
}
