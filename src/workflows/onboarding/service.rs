//! Onboarding checklist orchestration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::directory::{EmployeeDirectory, EmployeeId};
use crate::notifications::{
    enqueue_best_effort, NotificationIntent, NotificationKind, NotificationOutbox,
};
use crate::workflows::error::{LifecycleError, RepositoryError};

use super::domain::{
    default_checklist, task_names, Onboarding, OnboardingId, OnboardingTask, TaskDepartment,
    TaskPatch, TaskStatus,
};
use super::repository::{DocumentStore, DocumentUpload, OnboardingRepository};

static ONBOARDING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_onboarding_id() -> OnboardingId {
    let id = ONBOARDING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OnboardingId(format!("onb-{id:06}"))
}

/// Days ahead of a deadline at which the sweep starts nudging.
const REMINDER_WINDOW_DAYS: i64 = 2;

/// Outcome of one reminder sweep run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReminderRunReport {
    /// Checklists that produced a reminder.
    pub reminded: usize,
    /// Checklists skipped because the employee profile is gone.
    pub skipped: usize,
}

/// Checklist lifecycle, task mutation, and the deadline reminder sweep.
pub struct OnboardingOrchestrator<R> {
    repository: Arc<R>,
    directory: Arc<dyn EmployeeDirectory>,
    documents: Arc<dyn DocumentStore>,
    outbox: Arc<dyn NotificationOutbox>,
}

impl<R> OnboardingOrchestrator<R>
where
    R: OnboardingRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        directory: Arc<dyn EmployeeDirectory>,
        documents: Arc<dyn DocumentStore>,
        outbox: Arc<dyn NotificationOutbox>,
    ) -> Self {
        Self {
            repository,
            directory,
            documents,
            outbox,
        }
    }

    /// Opens a checklist for an employee, at most one per employee.
    ///
    /// When no tasks are supplied the fixed default set is used, with
    /// deadlines derived from the employee's start date and contract-signing
    /// date.
    pub fn create_onboarding(
        &self,
        employee_id: &EmployeeId,
        tasks: Option<Vec<OnboardingTask>>,
        now: DateTime<Utc>,
    ) -> Result<Onboarding, LifecycleError> {
        let profile = self
            .directory
            .find_employee(employee_id)
            .map_err(|err| LifecycleError::validation(err.to_string()))?
            .ok_or_else(|| {
                LifecycleError::not_found(format!("employee '{}' not found", employee_id.0))
            })?;

        let tasks = match tasks {
            Some(supplied) if !supplied.is_empty() => supplied,
            _ => default_checklist(profile.start_date, profile.contract_signed_on),
        };

        let onboarding = Onboarding::new(next_onboarding_id(), employee_id.clone(), tasks, now);
        let stored = self.repository.insert(onboarding).map_err(|err| match err {
            RepositoryError::Conflict => LifecycleError::conflict(
                "an onboarding checklist already exists for this employee",
            ),
            other => LifecycleError::from(other),
        })?;

        enqueue_best_effort(
            self.outbox.as_ref(),
            NotificationIntent::new(NotificationKind::OnboardingWelcome, &profile.email, now)
                .with("onboarding_id", &stored.id.0)
                .with("employee", &profile.full_name)
                .with("start_date", profile.start_date.to_string()),
        );

        Ok(stored)
    }

    pub fn onboarding(&self, id: &OnboardingId) -> Result<Onboarding, LifecycleError> {
        self.load(id)
    }

    pub fn onboarding_for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Onboarding, LifecycleError> {
        self.repository.find_by_employee(employee_id)?.ok_or_else(|| {
            LifecycleError::not_found(format!(
                "no onboarding checklist for employee '{}'",
                employee_id.0
            ))
        })
    }

    /// Applies a partial update to one task, addressed by position.
    ///
    /// Moving a task to `completed` stamps its completion time; moving it
    /// back out clears the stamp. The checklist flag is re-derived after
    /// every change, so a regression reopens a finished checklist.
    pub fn update_task(
        &self,
        id: &OnboardingId,
        index: usize,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<Onboarding, LifecycleError> {
        self.mutate(id, |onboarding| {
            ensure_not_cancelled(onboarding)?;
            let task = task_at_mut(onboarding, index)?;

            if let Some(status) = patch.status {
                task.status = status;
                task.completed_at = if status == TaskStatus::Completed {
                    Some(now)
                } else {
                    None
                };
            }
            if let Some(deadline) = patch.deadline {
                task.deadline = deadline;
            }

            onboarding.recompute_completed();
            Ok(())
        })
    }

    /// Stores a document and attaches it to a task. A pending task completes
    /// on attachment; an in-progress or completed one keeps its status.
    pub fn upload_task_document(
        &self,
        id: &OnboardingId,
        index: usize,
        upload: DocumentUpload,
        now: DateTime<Utc>,
    ) -> Result<Onboarding, LifecycleError> {
        let document_id = self.documents.store(upload.clone())?;

        self.mutate(id, |onboarding| {
            ensure_not_cancelled(onboarding)?;
            let task = task_at_mut(onboarding, index)?;

            let replaced = task.document_id.replace(document_id.clone());
            if let Some(previous) = replaced {
                if previous != document_id {
                    self.documents.delete(&previous)?;
                }
            }
            if task.status == TaskStatus::Pending {
                task.status = TaskStatus::Completed;
                task.completed_at = Some(now);
            }
            let task_name = task.name.clone();

            onboarding.note(
                format!("document '{}' attached to '{task_name}'", upload.file_name),
                now,
            );
            onboarding.recompute_completed();
            Ok(())
        })
    }

    /// Marks SSO provisioning as done.
    pub fn provision_system_access(
        &self,
        id: &OnboardingId,
        now: DateTime<Utc>,
    ) -> Result<Onboarding, LifecycleError> {
        self.transition_named_task(
            id,
            TaskDepartment::It,
            task_names::SSO_ACCESS,
            TaskStatus::Completed,
            "system access provisioned",
            now,
        )
    }

    /// Puts the SSO task in progress ahead of the start date.
    pub fn schedule_access_provisioning(
        &self,
        id: &OnboardingId,
        now: DateTime<Utc>,
    ) -> Result<Onboarding, LifecycleError> {
        self.transition_named_task(
            id,
            TaskDepartment::It,
            task_names::SSO_ACCESS,
            TaskStatus::InProgress,
            "access provisioning scheduled",
            now,
        )
    }

    /// Flags hardware as reserved for the new hire.
    pub fn reserve_equipment(
        &self,
        id: &OnboardingId,
        now: DateTime<Utc>,
    ) -> Result<Onboarding, LifecycleError> {
        self.transition_named_task(
            id,
            TaskDepartment::It,
            task_names::HARDWARE,
            TaskStatus::InProgress,
            "equipment reserved",
            now,
        )
    }

    /// Kicks off payroll profile creation.
    pub fn trigger_payroll_initiation(
        &self,
        id: &OnboardingId,
        now: DateTime<Utc>,
    ) -> Result<Onboarding, LifecycleError> {
        self.transition_named_task(
            id,
            TaskDepartment::Hr,
            task_names::PAYROLL_PROFILE,
            TaskStatus::InProgress,
            "payroll initiation triggered",
            now,
        )
    }

    /// Records the signing bonus as paid out.
    pub fn process_signing_bonus(
        &self,
        id: &OnboardingId,
        now: DateTime<Utc>,
    ) -> Result<Onboarding, LifecycleError> {
        self.transition_named_task(
            id,
            TaskDepartment::Hr,
            task_names::SIGNING_BONUS,
            TaskStatus::Completed,
            "signing bonus processed",
            now,
        )
    }

    /// Abandons a checklist, for no-shows and rescinded offers. Every task
    /// that is not already completed is marked cancelled and the checklist
    /// freezes; a completed checklist cannot be cancelled.
    pub fn cancel_onboarding(
        &self,
        id: &OnboardingId,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Onboarding, LifecycleError> {
        let reason = reason.into();
        self.mutate(id, |onboarding| {
            if onboarding.completed {
                return Err(LifecycleError::state(
                    "a completed onboarding cannot be cancelled",
                ));
            }
            if onboarding.cancelled {
                return Ok(());
            }

            onboarding.cancelled = true;
            for task in &mut onboarding.tasks {
                if task.status != TaskStatus::Completed {
                    task.status = TaskStatus::Cancelled;
                }
            }
            onboarding.note(format!("onboarding cancelled: {reason}"), now);
            Ok(())
        })
    }

    /// Appends an audit note to the checklist belonging to an employee.
    pub fn annotate_for_employee(
        &self,
        employee_id: &EmployeeId,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        let onboarding = self.onboarding_for_employee(employee_id)?;
        let message = message.into();
        self.mutate(&onboarding.id, |onboarding| {
            onboarding.note(message.clone(), now);
            Ok(())
        })?;
        Ok(())
    }

    /// Scans every open checklist and nudges employees with overdue tasks or
    /// tasks due within the next two days. One aggregated reminder per
    /// employee per run; missing directory entries are skipped with a
    /// warning.
    pub fn send_reminders(&self, now: DateTime<Utc>) -> Result<ReminderRunReport, LifecycleError> {
        let today = now.date_naive();
        let mut report = ReminderRunReport::default();

        for onboarding in self.repository.incomplete()? {
            let overdue = onboarding.overdue_tasks(today).len();
            let due_soon = onboarding
                .tasks_due_within(today, REMINDER_WINDOW_DAYS)
                .len();
            if overdue == 0 && due_soon == 0 {
                continue;
            }

            let profile = match self.directory.find_employee(&onboarding.employee_id) {
                Ok(Some(profile)) => profile,
                Ok(None) => {
                    warn!(
                        employee_id = %onboarding.employee_id.0,
                        "skipping onboarding reminder, employee missing from directory"
                    );
                    report.skipped += 1;
                    continue;
                }
                Err(err) => {
                    warn!(error = %err, "directory lookup failed during reminder sweep");
                    report.skipped += 1;
                    continue;
                }
            };

            enqueue_best_effort(
                self.outbox.as_ref(),
                NotificationIntent::new(NotificationKind::OnboardingReminder, &profile.email, now)
                    .with("onboarding_id", &onboarding.id.0)
                    .with("overdue_tasks", overdue.to_string())
                    .with("due_soon_tasks", due_soon.to_string()),
            );

            self.mutate(&onboarding.id, |onboarding| {
                onboarding.reminders_sent += 1;
                onboarding.last_reminder_at = Some(now);
                Ok(())
            })?;
            report.reminded += 1;
        }

        Ok(report)
    }

    fn transition_named_task(
        &self,
        id: &OnboardingId,
        department: TaskDepartment,
        name: &str,
        status: TaskStatus,
        note: &str,
        now: DateTime<Utc>,
    ) -> Result<Onboarding, LifecycleError> {
        self.mutate(id, |onboarding| {
            ensure_not_cancelled(onboarding)?;
            if onboarding.completed {
                return Err(LifecycleError::state(
                    "onboarding checklist is already completed",
                ));
            }

            let task = onboarding
                .tasks
                .iter_mut()
                .find(|task| task.department == department && task.name == name)
                .ok_or_else(|| {
                    LifecycleError::not_found(format!("no '{name}' task on this checklist"))
                })?;

            task.status = status;
            task.completed_at = if status == TaskStatus::Completed {
                Some(now)
            } else {
                None
            };

            onboarding.note(note.to_string(), now);
            onboarding.recompute_completed();
            Ok(())
        })
    }

    /// Read-modify-write with one retry when the version check fails.
    fn mutate<F>(&self, id: &OnboardingId, apply: F) -> Result<Onboarding, LifecycleError>
    where
        F: Fn(&mut Onboarding) -> Result<(), LifecycleError>,
    {
        let mut onboarding = self.load(id)?;
        apply(&mut onboarding)?;
        match self.repository.update(onboarding) {
            Ok(stored) => Ok(stored),
            Err(RepositoryError::VersionConflict) => {
                let mut onboarding = self.load(id)?;
                apply(&mut onboarding)?;
                Ok(self.repository.update(onboarding)?)
            }
            Err(other) => Err(other.into()),
        }
    }

    fn load(&self, id: &OnboardingId) -> Result<Onboarding, LifecycleError> {
        self.repository.fetch(id)?.ok_or_else(|| {
            LifecycleError::not_found(format!("onboarding '{}' not found", id.0))
        })
    }
}

fn ensure_not_cancelled(onboarding: &Onboarding) -> Result<(), LifecycleError> {
    if onboarding.cancelled {
        return Err(LifecycleError::state(
            "onboarding checklist has been cancelled",
        ));
    }
    Ok(())
}

fn task_at_mut(
    onboarding: &mut Onboarding,
    index: usize,
) -> Result<&mut OnboardingTask, LifecycleError> {
    let count = onboarding.tasks.len();
    onboarding.tasks.get_mut(index).ok_or_else(|| {
        LifecycleError::validation(format!(
            "task index {index} is out of range for a checklist of {count} task(s)"
        ))
    })
}
