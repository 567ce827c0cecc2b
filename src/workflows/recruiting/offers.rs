//! Offer issuance, candidate response, and HR finalization.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::directory::EmployeeId;
use crate::notifications::{
    enqueue_best_effort, NotificationIntent, NotificationKind, NotificationOutbox,
};
use crate::workflows::error::{LifecycleError, RepositoryError};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Offer, OfferDecision, OfferId, OfferResponse,
};
use super::pipeline::ApplicationPipeline;
use super::repository::RecruitingRepository;

static OFFER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_offer_id() -> OfferId {
    let id = OFFER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OfferId(format!("off-{id:06}"))
}

/// Offer negotiation between HR and the candidate.
///
/// `applicant_response` and `final_status` each settle exactly once. Final
/// approval of an accepted offer hands the application to the pipeline's
/// `hired` transition, which also recomputes the requisition fill state.
pub struct OfferNegotiation<R> {
    repository: Arc<R>,
    pipeline: Arc<ApplicationPipeline<R>>,
    outbox: Arc<dyn NotificationOutbox>,
}

impl<R> OfferNegotiation<R>
where
    R: RecruitingRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        pipeline: Arc<ApplicationPipeline<R>>,
        outbox: Arc<dyn NotificationOutbox>,
    ) -> Self {
        Self {
            repository,
            pipeline,
            outbox,
        }
    }

    /// Issues the single offer an application may carry.
    pub fn create_offer(
        &self,
        application_id: &ApplicationId,
        gross_salary: u32,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Offer, LifecycleError> {
        let application = self.load_application(application_id)?;

        if application.status.is_terminal() {
            return Err(LifecycleError::state(format!(
                "cannot create an offer for a {} application",
                application.status.label()
            )));
        }
        if gross_salary == 0 {
            return Err(LifecycleError::validation(
                "gross salary must be greater than zero",
            ));
        }
        if deadline <= now {
            return Err(LifecycleError::validation(
                "offer deadline must be in the future",
            ));
        }

        let offer = Offer {
            id: next_offer_id(),
            application_id: application_id.clone(),
            gross_salary,
            deadline,
            applicant_response: OfferResponse::Pending,
            final_status: OfferDecision::Pending,
            signed_at: None,
            created_at: now,
        };

        let stored = self.repository.insert_offer(offer).map_err(|err| match err {
            RepositoryError::Conflict => {
                LifecycleError::conflict("an offer already exists for this application")
            }
            other => LifecycleError::from(other),
        })?;

        enqueue_best_effort(
            self.outbox.as_ref(),
            NotificationIntent::new(
                NotificationKind::OfferLetter,
                &application.candidate_id.0,
                now,
            )
            .with("offer_id", &stored.id.0)
            .with("deadline", stored.deadline.to_rfc3339()),
        );

        Ok(stored)
    }

    /// Records the candidate's decision; acceptance stamps the signature
    /// timestamp.
    pub fn respond_to_offer(
        &self,
        offer_id: &OfferId,
        response: OfferResponse,
        now: DateTime<Utc>,
    ) -> Result<Offer, LifecycleError> {
        if !response.is_settled() {
            return Err(LifecycleError::validation(
                "response must be 'accepted' or 'rejected'",
            ));
        }

        let mut offer = self.load_offer(offer_id)?;

        if offer.final_status.is_settled() {
            return Err(LifecycleError::state(
                "offer has already been finalized by HR",
            ));
        }
        if now > offer.deadline {
            return Err(LifecycleError::state("offer deadline has passed"));
        }
        if offer.applicant_response.is_settled() {
            return Err(LifecycleError::state(format!(
                "candidate has already {} this offer",
                offer.applicant_response.label()
            )));
        }

        offer.applicant_response = response;
        if response == OfferResponse::Accepted {
            offer.signed_at = Some(now);
        }

        self.repository.update_offer(offer.clone())?;
        Ok(offer)
    }

    /// HR's terminal decision. Repeating the same settled decision is a
    /// no-op; requesting a different one is rejected. Approving an accepted
    /// offer marks the application hired.
    pub fn finalize_offer(
        &self,
        offer_id: &OfferId,
        decision: OfferDecision,
        actor: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<Offer, LifecycleError> {
        if !decision.is_settled() {
            return Err(LifecycleError::validation(
                "decision must be 'approved' or 'rejected'",
            ));
        }

        let mut offer = self.load_offer(offer_id)?;

        if !offer.applicant_response.is_settled() {
            return Err(LifecycleError::state(
                "candidate has not yet responded to this offer",
            ));
        }
        if offer.final_status.is_settled() {
            if offer.final_status == decision {
                return Ok(offer);
            }
            return Err(LifecycleError::state(format!(
                "offer is already {} and cannot be changed",
                offer.final_status.label()
            )));
        }

        offer.final_status = decision;
        self.repository.update_offer(offer.clone())?;

        if decision == OfferDecision::Approved
            && offer.applicant_response == OfferResponse::Accepted
        {
            self.pipeline.update_status(
                &offer.application_id,
                ApplicationStatus::Hired,
                actor,
                now,
            )?;
        }

        Ok(offer)
    }

    pub fn offer(&self, id: &OfferId) -> Result<Offer, LifecycleError> {
        self.load_offer(id)
    }

    fn load_application(&self, id: &ApplicationId) -> Result<Application, LifecycleError> {
        self.repository
            .application(id)?
            .ok_or_else(|| LifecycleError::not_found(format!("application '{}' not found", id.0)))
    }

    fn load_offer(&self, id: &OfferId) -> Result<Offer, LifecycleError> {
        self.repository
            .offer(id)?
            .ok_or_else(|| LifecycleError::not_found(format!("offer '{}' not found", id.0)))
    }
}
