//! Multi-department clearance sign-off with escalation reminders.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::directory::{Actor, EmployeeDirectory, EmployeeId, Role};
use crate::notifications::{
    enqueue_best_effort, NotificationIntent, NotificationKind, NotificationOutbox,
};
use crate::workflows::error::{LifecycleError, RepositoryError};
use crate::workflows::onboarding::repository::OnboardingRepository;
use crate::workflows::onboarding::service::OnboardingOrchestrator;

use super::domain::{
    ChecklistId, ClearanceChecklist, ClearanceDepartment, ClearanceItemStatus, FinalSettlement,
    RevocationRecord, SettlementComponent, SettlementId, TerminationStatus,
};
use super::repository::SeparationRepository;

static SETTLEMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_settlement_id() -> SettlementId {
    let id = SETTLEMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SettlementId(format!("fns-{id:06}"))
}

const REMINDER_INTERVAL_DAYS: i64 = 3;
const MAX_REMINDERS: u32 = 3;
const ESCALATION_AFTER_DAYS: i64 = 7;

/// Access revocation as seen from the clearance engine. The IT sign-off
/// triggers revocation without the direct-invocation role gate.
pub trait AccessRevoker: Send + Sync {
    fn revoke_for_clearance(
        &self,
        employee_id: &EmployeeId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<RevocationRecord, LifecycleError>;
}

/// Equipment-return annotations land on the employee's onboarding record.
pub trait OnboardingAnnotator: Send + Sync {
    fn annotate(
        &self,
        employee_id: &EmployeeId,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError>;
}

impl<R> OnboardingAnnotator for OnboardingOrchestrator<R>
where
    R: OnboardingRepository + 'static,
{
    fn annotate(
        &self,
        employee_id: &EmployeeId,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        self.annotate_for_employee(employee_id, message, now)
    }
}

/// Roles allowed to decide a department's clearance line.
const fn department_roles(department: ClearanceDepartment) -> &'static [Role] {
    match department {
        ClearanceDepartment::LineManager => &[Role::LineManager],
        ClearanceDepartment::Hr => &[Role::HrStaff, Role::HrManager],
        ClearanceDepartment::It => &[Role::ItAdmin],
        ClearanceDepartment::Finance => &[Role::FinanceOfficer],
        ClearanceDepartment::Facilities => &[Role::FacilitiesOfficer],
        ClearanceDepartment::Admin => &[Role::AdminOfficer],
    }
}

/// The role a department's routine reminders go to.
const fn reminder_role(department: ClearanceDepartment) -> Role {
    match department {
        ClearanceDepartment::LineManager => Role::LineManager,
        ClearanceDepartment::Hr => Role::HrStaff,
        ClearanceDepartment::It => Role::ItAdmin,
        ClearanceDepartment::Finance => Role::FinanceOfficer,
        ClearanceDepartment::Facilities => Role::FacilitiesOfficer,
        ClearanceDepartment::Admin => Role::AdminOfficer,
    }
}

/// Outcome of one clearance reminder sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClearanceSweepReport {
    pub reminders: usize,
    pub escalations: usize,
}

/// Per-department sign-off engine over one termination's checklist.
pub struct ClearanceApprovalEngine<R> {
    repository: Arc<R>,
    directory: Arc<dyn EmployeeDirectory>,
    outbox: Arc<dyn NotificationOutbox>,
    revoker: Arc<dyn AccessRevoker>,
    onboarding: Arc<dyn OnboardingAnnotator>,
}

impl<R> ClearanceApprovalEngine<R>
where
    R: SeparationRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        directory: Arc<dyn EmployeeDirectory>,
        outbox: Arc<dyn NotificationOutbox>,
        revoker: Arc<dyn AccessRevoker>,
        onboarding: Arc<dyn OnboardingAnnotator>,
    ) -> Self {
        Self {
            repository,
            directory,
            outbox,
            revoker,
            onboarding,
        }
    }

    pub fn checklist(&self, id: &ChecklistId) -> Result<ClearanceChecklist, LifecycleError> {
        self.load(id)
    }

    /// Decides one department's clearance line.
    ///
    /// The LINE_MANAGER -> FINANCE -> HR sequence is enforced for approvals;
    /// IT approval triggers access revocation; FACILITIES approval with an
    /// equipment payload marks the listed items returned; once every item is
    /// approved the checklist completes, the termination is force-approved,
    /// and the final settlement is queued.
    pub fn update_item_status(
        &self,
        checklist_id: &ChecklistId,
        department: ClearanceDepartment,
        status: ClearanceItemStatus,
        actor: &Actor,
        comments: Option<String>,
        equipment_returned: Option<Vec<String>>,
        now: DateTime<Utc>,
    ) -> Result<ClearanceChecklist, LifecycleError> {
        if status == ClearanceItemStatus::Pending {
            return Err(LifecycleError::validation(
                "a clearance decision must be 'approved' or 'rejected'",
            ));
        }

        let mut checklist = self.load(checklist_id)?;
        if checklist.completed {
            return Err(LifecycleError::state(
                "clearance checklist is already complete",
            ));
        }

        self.authorize(&checklist, department, status, actor)?;

        if status == ClearanceItemStatus::Approved {
            checklist.check_precedence(department)?;
        }

        {
            let item = checklist.item_mut(department);
            item.status = status;
            if comments.is_some() {
                item.comments = comments;
            }
        }

        let mut returned_names = Vec::new();
        if department == ClearanceDepartment::Facilities
            && status == ClearanceItemStatus::Approved
        {
            if let Some(names) = &equipment_returned {
                for entry in &mut checklist.equipment {
                    if names.contains(&entry.name) {
                        entry.returned = true;
                        returned_names.push(entry.name.clone());
                    }
                }
            }
        }

        let completed_now = checklist.all_approved();
        checklist.completed = completed_now;

        // Single-attempt write: a concurrent decision on the same checklist
        // surfaces as a conflict rather than silently overwriting it.
        let stored = self.repository.update_checklist(checklist)?;

        if department == ClearanceDepartment::It && status == ClearanceItemStatus::Approved {
            self.revoker.revoke_for_clearance(
                &stored.employee_id,
                "IT clearance approved",
                now,
            )?;
        }

        if !returned_names.is_empty() {
            let message = format!("equipment returned: {}", returned_names.join(", "));
            match self.onboarding.annotate(&stored.employee_id, &message, now) {
                Ok(()) | Err(LifecycleError::NotFound(_)) => {}
                Err(other) => return Err(other),
            }
        }

        if completed_now {
            self.finalize_termination(&stored, now)?;
        }

        Ok(stored)
    }

    /// Reminder sweep over every open checklist.
    ///
    /// Routine reminders go to the pending department's role holders (or the
    /// assigned LINE_MANAGER approver) at a 3-day interval, at most 3 times.
    /// A line pending 7 days after its first reminder escalates once to the
    /// HR managers and the employee's line manager. Bookkeeping is written
    /// back under the checklist version; a conflicting live mutation gets one
    /// re-read before giving up on the record.
    pub fn send_reminders(
        &self,
        now: DateTime<Utc>,
        force: bool,
    ) -> Result<ClearanceSweepReport, LifecycleError> {
        let mut report = ClearanceSweepReport::default();

        for mut checklist in self.repository.open_checklists()? {
            let pending = checklist.pending_departments();
            if pending.is_empty() {
                continue;
            }

            let mut reminded = Vec::new();
            let mut escalated = Vec::new();
            for department in pending {
                let (send_reminder, send_escalation) =
                    reminder_decision(&checklist, department, now, force);
                if send_reminder {
                    reminded.push(department);
                }
                if send_escalation {
                    escalated.push(department);
                }
            }
            if reminded.is_empty() && escalated.is_empty() {
                continue;
            }

            for department in &reminded {
                for recipient in self.reminder_recipients(&checklist, *department) {
                    enqueue_best_effort(
                        self.outbox.as_ref(),
                        NotificationIntent::new(NotificationKind::ClearanceReminder, recipient, now)
                            .with("checklist_id", &checklist.id.0)
                            .with("department", department.label())
                            .with("employee_id", &checklist.employee_id.0),
                    );
                }
                report.reminders += 1;
            }
            for department in &escalated {
                for recipient in self.escalation_recipients(&checklist) {
                    enqueue_best_effort(
                        self.outbox.as_ref(),
                        NotificationIntent::new(
                            NotificationKind::ClearanceEscalation,
                            recipient,
                            now,
                        )
                        .with("checklist_id", &checklist.id.0)
                        .with("department", department.label())
                        .with("employee_id", &checklist.employee_id.0),
                    );
                }
                report.escalations += 1;
            }

            apply_reminder_bookkeeping(&mut checklist, &reminded, &escalated, now);
            match self.repository.update_checklist(checklist.clone()) {
                Ok(_) => {}
                Err(RepositoryError::VersionConflict) => {
                    // A live decision landed mid-sweep; re-read and keep only
                    // the bookkeeping, the intents are already queued.
                    let Some(mut fresh) = self.repository.checklist(&checklist.id)? else {
                        continue;
                    };
                    apply_reminder_bookkeeping(&mut fresh, &reminded, &escalated, now);
                    self.repository.update_checklist(fresh)?;
                }
                Err(other) => return Err(other.into()),
            }
        }

        Ok(report)
    }

    fn authorize(
        &self,
        checklist: &ClearanceChecklist,
        department: ClearanceDepartment,
        status: ClearanceItemStatus,
        actor: &Actor,
    ) -> Result<(), LifecycleError> {
        let assigned_approver = department == ClearanceDepartment::LineManager
            && checklist
                .item(department)
                .assigned_to
                .as_ref()
                .is_some_and(|assigned| actor.is(assigned));
        let has_department_role = department_roles(department)
            .iter()
            .any(|role| actor.has_role(*role));

        if !assigned_approver && !has_department_role {
            return Err(LifecycleError::forbidden(format!(
                "actor lacks the role required for '{}' clearance",
                department.label()
            )));
        }

        if department == ClearanceDepartment::Hr
            && status == ClearanceItemStatus::Approved
            && !actor.has_role(Role::HrManager)
        {
            return Err(LifecycleError::forbidden(
                "HR clearance approval requires an HR manager",
            ));
        }

        Ok(())
    }

    /// Completion side effects: force-approve the owning termination and
    /// queue the settlement record exactly once.
    fn finalize_termination(
        &self,
        checklist: &ClearanceChecklist,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        let mut termination = self
            .repository
            .termination(&checklist.termination_id)?
            .ok_or_else(|| {
                LifecycleError::not_found(format!(
                    "termination request '{}' not found",
                    checklist.termination_id.0
                ))
            })?;

        if termination.status != TerminationStatus::Approved {
            termination.status = TerminationStatus::Approved;
            termination.note("clearance complete, termination force-approved", now);
            self.repository.update_termination(termination.clone())?;
        }

        if self
            .repository
            .settlement_for_termination(&checklist.termination_id)?
            .is_none()
        {
            let settlement = FinalSettlement {
                id: next_settlement_id(),
                termination_id: checklist.termination_id.clone(),
                employee_id: checklist.employee_id.clone(),
                components: SettlementComponent::ALL.to_vec(),
                queued_at: now,
            };
            let stored = match self.repository.insert_settlement(settlement) {
                Ok(stored) => stored,
                Err(RepositoryError::Conflict) => return Ok(()),
                Err(other) => return Err(other.into()),
            };

            if let Some(profile) = self
                .directory
                .find_employee(&checklist.employee_id)
                .map_err(|err| RepositoryError::Unavailable(err.to_string()))?
            {
                enqueue_best_effort(
                    self.outbox.as_ref(),
                    NotificationIntent::new(NotificationKind::FinalSettlement, profile.email, now)
                        .with("settlement_id", &stored.id.0)
                        .with("termination_id", &stored.termination_id.0),
                );
            }
        }

        Ok(())
    }

    fn reminder_recipients(
        &self,
        checklist: &ClearanceChecklist,
        department: ClearanceDepartment,
    ) -> Vec<String> {
        if department == ClearanceDepartment::LineManager {
            if let Some(assigned) = &checklist.item(department).assigned_to {
                match self.directory.find_employee(assigned) {
                    Ok(Some(profile)) => return vec![profile.email],
                    Ok(None) => {}
                    Err(err) => {
                        warn!(error = %err, "directory lookup failed during clearance sweep");
                        return Vec::new();
                    }
                }
            }
        }

        match self.directory.find_by_role(reminder_role(department)) {
            Ok(profiles) => profiles.into_iter().map(|profile| profile.email).collect(),
            Err(err) => {
                warn!(error = %err, "directory lookup failed during clearance sweep");
                Vec::new()
            }
        }
    }

    fn escalation_recipients(&self, checklist: &ClearanceChecklist) -> Vec<String> {
        let mut recipients: Vec<String> = match self.directory.find_by_role(Role::HrManager) {
            Ok(profiles) => profiles.into_iter().map(|profile| profile.email).collect(),
            Err(err) => {
                warn!(error = %err, "directory lookup failed during clearance escalation");
                Vec::new()
            }
        };

        let line_manager = self
            .directory
            .find_employee(&checklist.employee_id)
            .ok()
            .flatten()
            .and_then(|profile| profile.line_manager);
        if let Some(manager_id) = line_manager {
            if let Ok(Some(manager)) = self.directory.find_employee(&manager_id) {
                if !recipients.contains(&manager.email) {
                    recipients.push(manager.email);
                }
            }
        }

        recipients
    }

    fn load(&self, id: &ChecklistId) -> Result<ClearanceChecklist, LifecycleError> {
        self.repository.checklist(id)?.ok_or_else(|| {
            LifecycleError::not_found(format!("clearance checklist '{}' not found", id.0))
        })
    }
}

/// Whether `department`'s pending line is due a routine reminder and/or the
/// one-time escalation, based on the current tracker state.
fn reminder_decision(
    checklist: &ClearanceChecklist,
    department: ClearanceDepartment,
    now: DateTime<Utc>,
    force: bool,
) -> (bool, bool) {
    let (sent_count, first_sent_at, last_sent_at, escalated) =
        match checklist.tracker(department) {
            Some(tracker) => (
                tracker.sent_count,
                tracker.first_sent_at,
                tracker.last_sent_at,
                tracker.escalated,
            ),
            None => (0, None, None, false),
        };

    let due = force
        || match last_sent_at {
            None => true,
            Some(last) => now - last >= Duration::days(REMINDER_INTERVAL_DAYS),
        };
    let send_reminder = sent_count < MAX_REMINDERS && due;

    let send_escalation = !escalated
        && first_sent_at
            .is_some_and(|first| now - first >= Duration::days(ESCALATION_AFTER_DAYS));

    (send_reminder, send_escalation)
}

fn apply_reminder_bookkeeping(
    checklist: &mut ClearanceChecklist,
    reminded: &[ClearanceDepartment],
    escalated: &[ClearanceDepartment],
    now: DateTime<Utc>,
) {
    for department in reminded {
        let tracker = checklist.tracker_mut(*department);
        tracker.sent_count += 1;
        tracker.first_sent_at.get_or_insert(now);
        tracker.last_sent_at = Some(now);
    }
    for department in escalated {
        checklist.tracker_mut(*department).escalated = true;
    }
}
