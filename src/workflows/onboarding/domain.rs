//! New-hire checklist domain model.
//!
//! A checklist is a flat, ordered list of department-owned tasks. The
//! checklist-level `completed` flag is always the conjunction of the task
//! statuses; nothing sets it directly.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::EmployeeId;

/// Identifier wrapper for onboarding checklists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OnboardingId(pub String);

/// Identifier wrapper for stored document references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

/// Department owning an onboarding task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskDepartment {
    It,
    Admin,
    Hr,
}

impl TaskDepartment {
    pub const fn label(self) -> &'static str {
        match self {
            TaskDepartment::It => "it",
            TaskDepartment::Admin => "admin",
            TaskDepartment::Hr => "hr",
        }
    }
}

/// Task progression state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

/// Well-known task names the convenience mutators locate tasks by.
pub mod task_names {
    pub const EMAIL_ACCOUNT: &str = "email_account";
    pub const HARDWARE: &str = "hardware";
    pub const SSO_ACCESS: &str = "sso_access";
    pub const DESK_ASSIGNMENT: &str = "desk_assignment";
    pub const ACCESS_BADGE: &str = "access_badge";
    pub const PAYROLL_PROFILE: &str = "payroll_profile";
    pub const SIGNING_BONUS: &str = "signing_bonus";
    pub const BENEFITS_ENROLLMENT: &str = "benefits_enrollment";
    pub const SIGNED_CONTRACT_UPLOAD: &str = "signed_contract_upload";
    pub const ID_UPLOAD: &str = "id_upload";
    pub const CERTIFICATION_UPLOAD: &str = "certification_upload";
}

/// One checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingTask {
    pub name: String,
    pub department: TaskDepartment,
    pub status: TaskStatus,
    pub deadline: NaiveDate,
    pub completed_at: Option<DateTime<Utc>>,
    pub document_id: Option<DocumentId>,
}

impl OnboardingTask {
    fn new(name: &str, department: TaskDepartment, deadline: NaiveDate) -> Self {
        Self {
            name: name.to_string(),
            department,
            status: TaskStatus::Pending,
            deadline,
            completed_at: None,
            document_id: None,
        }
    }
}

/// Caller-supplied partial update for one task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub status: Option<TaskStatus>,
    pub deadline: Option<NaiveDate>,
}

/// Free-form audit trail entry on a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditNote {
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

/// Days before the start date that default tasks fall due.
const DEFAULT_LEAD_DAYS: i64 = 7;

/// The fixed default checklist, spread across IT, Admin, and HR.
///
/// Payroll-related tasks are tied to the contract-signing date when one is
/// known; everything else falls due a week before the start date.
pub fn default_checklist(
    start_date: NaiveDate,
    contract_signed_on: Option<NaiveDate>,
) -> Vec<OnboardingTask> {
    let standard = start_date - Duration::days(DEFAULT_LEAD_DAYS);
    let payroll = contract_signed_on.unwrap_or(standard);

    vec![
        OnboardingTask::new(task_names::EMAIL_ACCOUNT, TaskDepartment::It, standard),
        OnboardingTask::new(task_names::HARDWARE, TaskDepartment::It, standard),
        OnboardingTask::new(task_names::SSO_ACCESS, TaskDepartment::It, standard),
        OnboardingTask::new(task_names::DESK_ASSIGNMENT, TaskDepartment::Admin, standard),
        OnboardingTask::new(task_names::ACCESS_BADGE, TaskDepartment::Admin, standard),
        OnboardingTask::new(task_names::PAYROLL_PROFILE, TaskDepartment::Hr, payroll),
        OnboardingTask::new(task_names::SIGNING_BONUS, TaskDepartment::Hr, payroll),
        OnboardingTask::new(task_names::BENEFITS_ENROLLMENT, TaskDepartment::Hr, standard),
        OnboardingTask::new(
            task_names::SIGNED_CONTRACT_UPLOAD,
            TaskDepartment::Hr,
            standard,
        ),
        OnboardingTask::new(task_names::ID_UPLOAD, TaskDepartment::Hr, standard),
        OnboardingTask::new(
            task_names::CERTIFICATION_UPLOAD,
            TaskDepartment::Hr,
            standard,
        ),
    ]
}

/// A new hire's checklist, singleton per employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Onboarding {
    pub id: OnboardingId,
    pub employee_id: EmployeeId,
    pub tasks: Vec<OnboardingTask>,
    pub completed: bool,
    pub cancelled: bool,
    pub notes: Vec<AuditNote>,
    pub reminders_sent: u32,
    pub last_reminder_at: Option<DateTime<Utc>>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl Onboarding {
    pub fn new(
        id: OnboardingId,
        employee_id: EmployeeId,
        tasks: Vec<OnboardingTask>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            employee_id,
            tasks,
            completed: false,
            cancelled: false,
            notes: Vec::new(),
            reminders_sent: 0,
            last_reminder_at: None,
            version: 0,
            created_at: now,
        }
    }

    /// Re-derives the checklist flag from the task statuses.
    pub fn recompute_completed(&mut self) {
        self.completed = self
            .tasks
            .iter()
            .all(|task| task.status == TaskStatus::Completed);
    }

    pub fn note(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.notes.push(AuditNote {
            message: message.into(),
            recorded_at: now,
        });
    }

    /// Tasks whose deadline has passed without completion.
    pub fn overdue_tasks(&self, today: NaiveDate) -> Vec<&OnboardingTask> {
        self.tasks
            .iter()
            .filter(|task| task.status != TaskStatus::Completed && task.deadline < today)
            .collect()
    }

    /// Incomplete tasks falling due within `window_days` of `today`.
    pub fn tasks_due_within(&self, today: NaiveDate, window_days: i64) -> Vec<&OnboardingTask> {
        let horizon = today + Duration::days(window_days);
        self.tasks
            .iter()
            .filter(|task| {
                task.status != TaskStatus::Completed
                    && task.deadline >= today
                    && task.deadline <= horizon
            })
            .collect()
    }
}
