//! Termination request initiation, approval gating, and editing rules.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::directory::{
    Actor, AppraisalSource, EmployeeDirectory, EmployeeId, EmployeeProfile, OrgDirectory, Role,
};
use crate::workflows::error::{LifecycleError, RepositoryError};

use super::domain::{
    ChecklistId, ClearanceChecklist, EquipmentEntry, TerminationId, TerminationInitiator,
    TerminationPatch, TerminationRequest, TerminationStatus,
};
use super::repository::SeparationRepository;

static TERMINATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CHECKLIST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_termination_id() -> TerminationId {
    let id = TERMINATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    TerminationId(format!("term-{id:06}"))
}

fn next_checklist_id() -> ChecklistId {
    let id = CHECKLIST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ChecklistId(format!("clr-{id:06}"))
}

/// Appraisal scores at or above this block performance-based terminations.
pub const APPRAISAL_THRESHOLD: f32 = 2.5;

/// Standard-issue equipment snapshotted onto every clearance checklist.
const DEFAULT_EQUIPMENT: [&str; 3] = ["laptop", "access_badge", "id_card"];

/// Resignation/termination request state machine.
pub struct TerminationWorkflow<R> {
    repository: Arc<R>,
    directory: Arc<dyn EmployeeDirectory>,
    org: Arc<dyn OrgDirectory>,
    appraisals: Arc<dyn AppraisalSource>,
}

impl<R> TerminationWorkflow<R>
where
    R: SeparationRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        directory: Arc<dyn EmployeeDirectory>,
        org: Arc<dyn OrgDirectory>,
        appraisals: Arc<dyn AppraisalSource>,
    ) -> Self {
        Self {
            repository,
            directory,
            org,
            appraisals,
        }
    }

    /// Files a termination request.
    ///
    /// A self-resignation may only be filed by the employee themself and may
    /// backdate. The HR and manager paths are performance-gated: the latest
    /// appraisal must exist and score strictly below the threshold.
    pub fn create_termination_request(
        &self,
        employee_id: &EmployeeId,
        initiator: TerminationInitiator,
        actor: &Actor,
        termination_date: NaiveDate,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<TerminationRequest, LifecycleError> {
        let profile = self.load_profile(employee_id)?;

        match initiator {
            TerminationInitiator::Employee => {
                if !actor.is(employee_id) {
                    return Err(LifecycleError::forbidden(
                        "an employee may only file their own resignation",
                    ));
                }
            }
            TerminationInitiator::Hr => {
                if !actor.has_role(Role::HrStaff) && !actor.has_role(Role::HrManager) {
                    return Err(LifecycleError::forbidden(
                        "HR-initiated termination requires an HR role",
                    ));
                }
                self.check_appraisal_gate(&profile)?;
            }
            TerminationInitiator::Manager => {
                if !actor.has_role(Role::LineManager) {
                    return Err(LifecycleError::forbidden(
                        "manager-initiated termination requires a line-manager role",
                    ));
                }
                self.check_appraisal_gate(&profile)?;
            }
        }

        if initiator.is_performance_gated() && termination_date < now.date_naive() {
            return Err(LifecycleError::validation(
                "termination date must not be in the past",
            ));
        }

        let request = TerminationRequest {
            id: next_termination_id(),
            employee_id: employee_id.clone(),
            initiator,
            status: TerminationStatus::Pending,
            termination_date,
            reason: reason.into(),
            notes: Vec::new(),
            created_at: now,
        };

        Ok(self.repository.insert_termination(request)?)
    }

    /// Moves a request between statuses. `approved` is terminal; reaching it
    /// creates the clearance checklist exactly once.
    pub fn update_status(
        &self,
        request_id: &TerminationId,
        new_status: TerminationStatus,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<TerminationRequest, LifecycleError> {
        if !actor.has_role(Role::HrStaff) && !actor.has_role(Role::HrManager) {
            return Err(LifecycleError::forbidden(
                "termination status changes require an HR role",
            ));
        }

        let mut request = self.load_request(request_id)?;

        if request.status == new_status {
            return Ok(request);
        }
        if request.status == TerminationStatus::Approved {
            return Err(LifecycleError::state(
                "an approved termination request cannot be modified",
            ));
        }

        request.status = new_status;
        self.repository.update_termination(request.clone())?;

        if new_status == TerminationStatus::Approved {
            self.ensure_checklist(&request, now)?;
        }

        Ok(request)
    }

    /// Edits the date or reason of a not-yet-approved request. Past-dated
    /// termination dates are rejected on the performance-gated paths; a
    /// self-resignation may backdate.
    pub fn update_details(
        &self,
        request_id: &TerminationId,
        patch: TerminationPatch,
        now: DateTime<Utc>,
    ) -> Result<TerminationRequest, LifecycleError> {
        let mut request = self.load_request(request_id)?;

        if request.status == TerminationStatus::Approved {
            return Err(LifecycleError::state(
                "an approved termination request cannot be modified",
            ));
        }

        if let Some(date) = patch.termination_date {
            if request.initiator.is_performance_gated() && date < now.date_naive() {
                return Err(LifecycleError::validation(
                    "termination date must not be in the past",
                ));
            }
            request.termination_date = date;
        }
        if let Some(reason) = patch.reason {
            request.reason = reason;
        }

        self.repository.update_termination(request.clone())?;
        Ok(request)
    }

    pub fn termination(&self, id: &TerminationId) -> Result<TerminationRequest, LifecycleError> {
        self.load_request(id)
    }

    /// Creates the clearance checklist for an approved request if none
    /// exists; a concurrent creation is absorbed by re-reading.
    fn ensure_checklist(
        &self,
        request: &TerminationRequest,
        now: DateTime<Utc>,
    ) -> Result<ClearanceChecklist, LifecycleError> {
        if let Some(existing) = self.repository.checklist_for_termination(&request.id)? {
            return Ok(existing);
        }

        let profile = self.load_profile(&request.employee_id)?;
        let line_manager = match &profile.line_manager {
            Some(manager) => Some(manager.clone()),
            None => self
                .org
                .department_head(&profile.department)
                .map_err(|err| RepositoryError::Unavailable(err.to_string()))?,
        };

        let checklist = ClearanceChecklist::new(
            next_checklist_id(),
            request.id.clone(),
            request.employee_id.clone(),
            line_manager,
            DEFAULT_EQUIPMENT
                .iter()
                .map(|name| EquipmentEntry {
                    name: (*name).to_string(),
                    returned: false,
                })
                .collect(),
            now,
        );

        match self.repository.insert_checklist(checklist) {
            Ok(stored) => Ok(stored),
            Err(RepositoryError::Conflict) => self
                .repository
                .checklist_for_termination(&request.id)?
                .ok_or_else(|| {
                    LifecycleError::not_found(format!(
                        "clearance checklist for termination '{}' not found",
                        request.id.0
                    ))
                }),
            Err(other) => Err(other.into()),
        }
    }

    fn check_appraisal_gate(&self, profile: &EmployeeProfile) -> Result<(), LifecycleError> {
        let appraisal = self
            .appraisals
            .latest_appraisal(&profile.id)
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?
            .ok_or_else(|| {
                LifecycleError::forbidden(
                    "performance-based termination requires an appraisal record",
                )
            })?;

        if appraisal.total_score >= APPRAISAL_THRESHOLD {
            return Err(LifecycleError::forbidden(format!(
                "appraisal score {:.1} does not permit a performance-based termination",
                appraisal.total_score
            )));
        }
        Ok(())
    }

    fn load_profile(&self, id: &EmployeeId) -> Result<EmployeeProfile, LifecycleError> {
        self.directory
            .find_employee(id)
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?
            .ok_or_else(|| LifecycleError::not_found(format!("employee '{}' not found", id.0)))
    }

    fn load_request(&self, id: &TerminationId) -> Result<TerminationRequest, LifecycleError> {
        self.repository.termination(id)?.ok_or_else(|| {
            LifecycleError::not_found(format!("termination request '{}' not found", id.0))
        })
    }
}
