//! Application intake and status state machine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::directory::{CandidateId, EmployeeId};
use crate::notifications::{
    enqueue_best_effort, NotificationIntent, NotificationKind, NotificationOutbox,
};
use crate::workflows::error::{LifecycleError, RepositoryError};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Referral, Requisition, RequisitionId,
};
use super::repository::RecruitingRepository;

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Application submission and status state machine.
pub struct ApplicationPipeline<R> {
    repository: Arc<R>,
    outbox: Arc<dyn NotificationOutbox>,
}

impl<R> ApplicationPipeline<R>
where
    R: RecruitingRepository + 'static,
{
    pub fn new(repository: Arc<R>, outbox: Arc<dyn NotificationOutbox>) -> Self {
        Self { repository, outbox }
    }

    /// Submits a new application for a published requisition.
    pub fn apply(
        &self,
        candidate_id: CandidateId,
        requisition_id: RequisitionId,
        referred_by: Option<EmployeeId>,
        now: DateTime<Utc>,
    ) -> Result<Application, LifecycleError> {
        let requisition = self.load_requisition(&requisition_id)?;
        requisition.accepting_applications(now.date_naive())?;

        let application = Application::new(
            next_application_id(),
            candidate_id.clone(),
            requisition_id,
            now,
        );

        let stored = self
            .repository
            .insert_application(application)
            .map_err(|err| match err {
                RepositoryError::Conflict => LifecycleError::conflict(
                    "candidate has already applied to this requisition",
                ),
                other => LifecycleError::from(other),
            })?;

        if let Some(referring_employee_id) = referred_by {
            self.repository.record_referral(Referral {
                candidate_id: candidate_id.clone(),
                referring_employee_id,
            })?;
        }

        enqueue_best_effort(
            self.outbox.as_ref(),
            NotificationIntent::new(NotificationKind::ApplicationReceived, &candidate_id.0, now)
                .with("application_id", &stored.id.0)
                .with("requisition_id", &stored.requisition_id.0),
        );

        Ok(stored)
    }

    /// Moves an application along the pipeline ordering.
    ///
    /// Terminal states absorb; `hired` recomputes the requisition fill state
    /// and auto-closes the posting once every opening is taken.
    pub fn update_status(
        &self,
        application_id: &ApplicationId,
        new_status: ApplicationStatus,
        actor: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<Application, LifecycleError> {
        let mut application = self.load_application(application_id)?;

        application.transition(new_status, actor, now)?;

        if new_status == ApplicationStatus::Hired {
            let mut requisition = self.load_requisition(&application.requisition_id)?;
            requisition.record_hire()?;
            self.repository.update_requisition(requisition)?;
        }

        self.repository.update_application(application.clone())?;

        enqueue_best_effort(
            self.outbox.as_ref(),
            NotificationIntent::new(
                NotificationKind::ApplicationStatus,
                &application.candidate_id.0,
                now,
            )
            .with("application_id", &application.id.0)
            .with("status", application.status.label())
            .with("stage", application.stage.label()),
        );

        Ok(application)
    }

    pub fn application(&self, id: &ApplicationId) -> Result<Application, LifecycleError> {
        self.load_application(id)
    }

    pub fn applications_for(
        &self,
        requisition_id: &RequisitionId,
    ) -> Result<Vec<Application>, LifecycleError> {
        Ok(self.repository.applications_for(requisition_id)?)
    }

    fn load_application(&self, id: &ApplicationId) -> Result<Application, LifecycleError> {
        self.repository
            .application(id)?
            .ok_or_else(|| LifecycleError::not_found(format!("application '{}' not found", id.0)))
    }

    fn load_requisition(&self, id: &RequisitionId) -> Result<Requisition, LifecycleError> {
        self.repository
            .requisition(id)?
            .ok_or_else(|| LifecycleError::not_found(format!("requisition '{}' not found", id.0)))
    }
}
