//! Storage abstraction for the recruiting workflow.
//!
//! Uniqueness rules live here, not in the services: one application per
//! `(candidate, requisition)`, one active interview per `(application,
//! stage)`, one offer per application. An insert that would violate a key
//! returns [`RepositoryError::Conflict`].

use crate::directory::CandidateId;
use crate::workflows::error::RepositoryError;

use super::domain::{
    Application, ApplicationId, Interview, InterviewId, Offer, OfferId, Referral, Requisition,
    RequisitionId,
};

pub trait RecruitingRepository: Send + Sync {
    // Requisitions.
    fn insert_requisition(&self, requisition: Requisition) -> Result<Requisition, RepositoryError>;
    fn requisition(&self, id: &RequisitionId) -> Result<Option<Requisition>, RepositoryError>;
    fn update_requisition(&self, requisition: Requisition) -> Result<(), RepositoryError>;

    // Applications; unique per (candidate, requisition).
    fn insert_application(&self, application: Application) -> Result<Application, RepositoryError>;
    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn update_application(&self, application: Application) -> Result<(), RepositoryError>;
    fn applications_for(
        &self,
        requisition_id: &RequisitionId,
    ) -> Result<Vec<Application>, RepositoryError>;

    // Interviews; unique active (non-cancelled) per (application, stage).
    fn insert_interview(&self, interview: Interview) -> Result<Interview, RepositoryError>;
    fn interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError>;
    fn update_interview(&self, interview: Interview) -> Result<(), RepositoryError>;
    fn interviews_for(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<Interview>, RepositoryError>;

    // Offers; unique per application.
    fn insert_offer(&self, offer: Offer) -> Result<Offer, RepositoryError>;
    fn offer(&self, id: &OfferId) -> Result<Option<Offer>, RepositoryError>;
    fn update_offer(&self, offer: Offer) -> Result<(), RepositoryError>;

    // Referral tags; bias ranking only.
    fn record_referral(&self, referral: Referral) -> Result<(), RepositoryError>;
    fn is_referred(&self, candidate_id: &CandidateId) -> Result<bool, RepositoryError>;
}
