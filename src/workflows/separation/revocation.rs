//! Idempotent system-access revocation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::directory::{Actor, EmployeeDirectory, EmployeeId, EmployeeStatus, Role};
use crate::notifications::{
    enqueue_best_effort, NotificationIntent, NotificationKind, NotificationOutbox,
};
use crate::workflows::error::{LifecycleError, RepositoryError};

use super::clearance::AccessRevoker;
use super::domain::{ActionOutcome, RevocationId, RevocationRecord};
use super::repository::SeparationRepository;

static REVOCATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_revocation_id() -> RevocationId {
    let id = REVOCATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RevocationId(format!("rev-{id:06}"))
}

/// Actor recorded when the IT-clearance trigger drives the revocation.
const SYSTEM_ACTOR: &str = "system";

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct DeprovisionError(pub String);

/// One external de-provisioning step (identity provider, mailbox,
/// application access). Failures are recorded, never propagated.
pub trait DeprovisionAction: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(&self, employee_id: &EmployeeId) -> Result<(), DeprovisionError>;
}

/// Default action that logs the step and reports success; stands in for the
/// real connectors in the demo server.
pub struct LoggedDeprovisionAction {
    name: &'static str,
}

impl LoggedDeprovisionAction {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl DeprovisionAction for LoggedDeprovisionAction {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(&self, employee_id: &EmployeeId) -> Result<(), DeprovisionError> {
        info!(action = self.name, employee_id = %employee_id.0, "de-provisioning step executed");
        Ok(())
    }
}

/// The three standard de-provisioning steps.
pub fn standard_actions() -> Vec<Arc<dyn DeprovisionAction>> {
    vec![
        Arc::new(LoggedDeprovisionAction::new("identity_provider")),
        Arc::new(LoggedDeprovisionAction::new("mailbox")),
        Arc::new(LoggedDeprovisionAction::new("application_access")),
    ]
}

/// Flips the employee inactive and runs the de-provisioning steps, exactly
/// once per employee.
pub struct AccessRevocationCoordinator<R> {
    repository: Arc<R>,
    directory: Arc<dyn EmployeeDirectory>,
    outbox: Arc<dyn NotificationOutbox>,
    actions: Vec<Arc<dyn DeprovisionAction>>,
}

impl<R> AccessRevocationCoordinator<R>
where
    R: SeparationRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        directory: Arc<dyn EmployeeDirectory>,
        outbox: Arc<dyn NotificationOutbox>,
        actions: Vec<Arc<dyn DeprovisionAction>>,
    ) -> Self {
        Self {
            repository,
            directory,
            outbox,
            actions,
        }
    }

    /// Direct invocation; requires a system-administrator role. The
    /// IT-clearance trigger enters through [`AccessRevoker`] instead and
    /// skips the gate.
    pub fn revoke_access(
        &self,
        employee_id: &EmployeeId,
        actor: &Actor,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<RevocationRecord, LifecycleError> {
        if !actor.has_role(Role::SystemAdmin) {
            return Err(LifecycleError::forbidden(
                "direct access revocation requires a system-administrator role",
            ));
        }
        self.execute(employee_id, actor.employee_id.clone(), reason.into(), now)
    }

    fn execute(
        &self,
        employee_id: &EmployeeId,
        requested_by: EmployeeId,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<RevocationRecord, LifecycleError> {
        let profile = self
            .directory
            .find_employee(employee_id)
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?
            .ok_or_else(|| {
                LifecycleError::not_found(format!("employee '{}' not found", employee_id.0))
            })?;

        // Second invocation is a no-op success carrying the earlier log.
        if profile.status == EmployeeStatus::Inactive {
            if let Some(prior) = self.repository.revocation_for_employee(employee_id)? {
                return Ok(prior);
            }
            let record = RevocationRecord {
                id: next_revocation_id(),
                employee_id: employee_id.clone(),
                requested_by,
                reason: "employee already inactive".to_string(),
                actions: Vec::new(),
                revoked_at: now,
            };
            return Ok(self.repository.insert_revocation(record)?);
        }

        self.directory
            .update_status(employee_id, EmployeeStatus::Inactive)
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;

        for mut termination in self.repository.terminations_for(employee_id)? {
            termination.note(format!("access revoked: {reason}"), now);
            self.repository.update_termination(termination)?;
        }

        let mut outcomes = Vec::with_capacity(self.actions.len());
        for action in &self.actions {
            let outcome = match action.execute(employee_id) {
                Ok(()) => ActionOutcome {
                    action: action.name().to_string(),
                    succeeded: true,
                    detail: "ok".to_string(),
                },
                Err(err) => {
                    warn!(
                        action = action.name(),
                        employee_id = %employee_id.0,
                        error = %err,
                        "de-provisioning step failed"
                    );
                    ActionOutcome {
                        action: action.name().to_string(),
                        succeeded: false,
                        detail: err.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let record = RevocationRecord {
            id: next_revocation_id(),
            employee_id: employee_id.clone(),
            requested_by,
            reason,
            actions: outcomes,
            revoked_at: now,
        };
        let stored = match self.repository.insert_revocation(record) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => self
                .repository
                .revocation_for_employee(employee_id)?
                .ok_or(RepositoryError::Conflict)?,
            Err(other) => return Err(other.into()),
        };

        enqueue_best_effort(
            self.outbox.as_ref(),
            NotificationIntent::new(NotificationKind::AccessRevoked, &profile.email, now)
                .with("employee_id", &employee_id.0)
                .with("reason", &stored.reason),
        );
        match self.directory.find_by_role(Role::SystemAdmin) {
            Ok(admins) => {
                for admin in admins {
                    enqueue_best_effort(
                        self.outbox.as_ref(),
                        NotificationIntent::new(NotificationKind::AccessRevoked, admin.email, now)
                            .with("employee_id", &employee_id.0)
                            .with("reason", &stored.reason),
                    );
                }
            }
            Err(err) => warn!(error = %err, "could not resolve system administrators"),
        }

        Ok(stored)
    }
}

impl<R> AccessRevoker for AccessRevocationCoordinator<R>
where
    R: SeparationRepository + 'static,
{
    fn revoke_for_clearance(
        &self,
        employee_id: &EmployeeId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<RevocationRecord, LifecycleError> {
        self.execute(
            employee_id,
            EmployeeId(SYSTEM_ACTOR.to_string()),
            reason.to_string(),
            now,
        )
    }
}
