//! In-memory recruiting store backing the demo server and tests.
//!
//! The uniqueness keys the production schema would enforce are enforced here
//! at insert time, so the services never rely on check-then-write.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::directory::CandidateId;
use crate::workflows::error::RepositoryError;

use super::domain::{
    Application, ApplicationId, Interview, InterviewId, Offer, OfferId, Referral, Requisition,
    RequisitionId,
};
use super::repository::RecruitingRepository;

#[derive(Default, Clone)]
pub struct MemoryRecruitingRepository {
    requisitions: Arc<Mutex<HashMap<RequisitionId, Requisition>>>,
    applications: Arc<Mutex<HashMap<ApplicationId, Application>>>,
    application_keys: Arc<Mutex<HashMap<(CandidateId, RequisitionId), ApplicationId>>>,
    interviews: Arc<Mutex<HashMap<InterviewId, Interview>>>,
    offers: Arc<Mutex<HashMap<OfferId, Offer>>>,
    offer_keys: Arc<Mutex<HashMap<ApplicationId, OfferId>>>,
    referrals: Arc<Mutex<Vec<Referral>>>,
}

impl RecruitingRepository for MemoryRecruitingRepository {
    fn insert_requisition(&self, requisition: Requisition) -> Result<Requisition, RepositoryError> {
        let mut guard = self.requisitions.lock().expect("repository mutex poisoned");
        if guard.contains_key(&requisition.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(requisition.id.clone(), requisition.clone());
        Ok(requisition)
    }

    fn requisition(&self, id: &RequisitionId) -> Result<Option<Requisition>, RepositoryError> {
        let guard = self.requisitions.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_requisition(&self, requisition: Requisition) -> Result<(), RepositoryError> {
        let mut guard = self.requisitions.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&requisition.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(requisition.id.clone(), requisition);
        Ok(())
    }

    fn insert_application(&self, application: Application) -> Result<Application, RepositoryError> {
        let key = (
            application.candidate_id.clone(),
            application.requisition_id.clone(),
        );
        let mut keys = self.application_keys.lock().expect("repository mutex poisoned");
        if keys.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        keys.insert(key, application.id.clone());
        self.applications
            .lock()
            .expect("repository mutex poisoned")
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.applications.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_application(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.applications.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&application.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(application.id.clone(), application);
        Ok(())
    }

    fn applications_for(
        &self,
        requisition_id: &RequisitionId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.applications.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|application| &application.requisition_id == requisition_id)
            .cloned()
            .collect())
    }

    fn insert_interview(&self, interview: Interview) -> Result<Interview, RepositoryError> {
        let mut guard = self.interviews.lock().expect("repository mutex poisoned");
        let slot_taken = guard.values().any(|existing| {
            existing.application_id == interview.application_id
                && existing.stage == interview.stage
                && existing.is_active()
        });
        if slot_taken {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(interview.id.clone(), interview.clone());
        Ok(interview)
    }

    fn interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError> {
        let guard = self.interviews.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_interview(&self, interview: Interview) -> Result<(), RepositoryError> {
        let mut guard = self.interviews.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&interview.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(interview.id.clone(), interview);
        Ok(())
    }

    fn interviews_for(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<Interview>, RepositoryError> {
        let guard = self.interviews.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|interview| &interview.application_id == application_id)
            .cloned()
            .collect())
    }

    fn insert_offer(&self, offer: Offer) -> Result<Offer, RepositoryError> {
        let mut keys = self.offer_keys.lock().expect("repository mutex poisoned");
        if keys.contains_key(&offer.application_id) {
            return Err(RepositoryError::Conflict);
        }
        keys.insert(offer.application_id.clone(), offer.id.clone());
        self.offers
            .lock()
            .expect("repository mutex poisoned")
            .insert(offer.id.clone(), offer.clone());
        Ok(offer)
    }

    fn offer(&self, id: &OfferId) -> Result<Option<Offer>, RepositoryError> {
        let guard = self.offers.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_offer(&self, offer: Offer) -> Result<(), RepositoryError> {
        let mut guard = self.offers.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&offer.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(offer.id.clone(), offer);
        Ok(())
    }

    fn record_referral(&self, referral: Referral) -> Result<(), RepositoryError> {
        let mut guard = self.referrals.lock().expect("repository mutex poisoned");
        let duplicate = guard
            .iter()
            .any(|existing| existing.candidate_id == referral.candidate_id);
        if !duplicate {
            guard.push(referral);
        }
        Ok(())
    }

    fn is_referred(&self, candidate_id: &CandidateId) -> Result<bool, RepositoryError> {
        let guard = self.referrals.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .any(|referral| &referral.candidate_id == candidate_id))
    }
}
