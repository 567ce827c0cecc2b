//! In-memory separation store backing the demo server and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::directory::EmployeeId;
use crate::workflows::error::RepositoryError;

use super::domain::{
    ChecklistId, ClearanceChecklist, FinalSettlement, RevocationRecord, TerminationId,
    TerminationRequest,
};
use super::repository::SeparationRepository;

#[derive(Default, Clone)]
pub struct MemorySeparationRepository {
    terminations: Arc<Mutex<HashMap<TerminationId, TerminationRequest>>>,
    checklists: Arc<Mutex<HashMap<ChecklistId, ClearanceChecklist>>>,
    checklist_keys: Arc<Mutex<HashMap<TerminationId, ChecklistId>>>,
    settlements: Arc<Mutex<HashMap<TerminationId, FinalSettlement>>>,
    revocations: Arc<Mutex<HashMap<EmployeeId, RevocationRecord>>>,
}

impl SeparationRepository for MemorySeparationRepository {
    fn insert_termination(
        &self,
        request: TerminationRequest,
    ) -> Result<TerminationRequest, RepositoryError> {
        let mut guard = self.terminations.lock().expect("repository mutex poisoned");
        if guard.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn termination(
        &self,
        id: &TerminationId,
    ) -> Result<Option<TerminationRequest>, RepositoryError> {
        let guard = self.terminations.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_termination(&self, request: TerminationRequest) -> Result<(), RepositoryError> {
        let mut guard = self.terminations.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&request.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(request.id.clone(), request);
        Ok(())
    }

    fn terminations_for(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<TerminationRequest>, RepositoryError> {
        let guard = self.terminations.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|request| &request.employee_id == employee_id)
            .cloned()
            .collect())
    }

    fn insert_checklist(
        &self,
        checklist: ClearanceChecklist,
    ) -> Result<ClearanceChecklist, RepositoryError> {
        let mut keys = self.checklist_keys.lock().expect("repository mutex poisoned");
        if keys.contains_key(&checklist.termination_id) {
            return Err(RepositoryError::Conflict);
        }
        keys.insert(checklist.termination_id.clone(), checklist.id.clone());
        self.checklists
            .lock()
            .expect("repository mutex poisoned")
            .insert(checklist.id.clone(), checklist.clone());
        Ok(checklist)
    }

    fn checklist(&self, id: &ChecklistId) -> Result<Option<ClearanceChecklist>, RepositoryError> {
        let guard = self.checklists.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn checklist_for_termination(
        &self,
        termination_id: &TerminationId,
    ) -> Result<Option<ClearanceChecklist>, RepositoryError> {
        let keys = self.checklist_keys.lock().expect("repository mutex poisoned");
        let Some(id) = keys.get(termination_id) else {
            return Ok(None);
        };
        let guard = self.checklists.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_checklist(
        &self,
        mut checklist: ClearanceChecklist,
    ) -> Result<ClearanceChecklist, RepositoryError> {
        let mut guard = self.checklists.lock().expect("repository mutex poisoned");
        let stored = guard
            .get(&checklist.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.version != checklist.version {
            return Err(RepositoryError::VersionConflict);
        }
        checklist.version += 1;
        guard.insert(checklist.id.clone(), checklist.clone());
        Ok(checklist)
    }

    fn open_checklists(&self) -> Result<Vec<ClearanceChecklist>, RepositoryError> {
        let guard = self.checklists.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|checklist| !checklist.completed)
            .cloned()
            .collect())
    }

    fn insert_settlement(
        &self,
        settlement: FinalSettlement,
    ) -> Result<FinalSettlement, RepositoryError> {
        let mut guard = self.settlements.lock().expect("repository mutex poisoned");
        if guard.contains_key(&settlement.termination_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(settlement.termination_id.clone(), settlement.clone());
        Ok(settlement)
    }

    fn settlement_for_termination(
        &self,
        termination_id: &TerminationId,
    ) -> Result<Option<FinalSettlement>, RepositoryError> {
        let guard = self.settlements.lock().expect("repository mutex poisoned");
        Ok(guard.get(termination_id).cloned())
    }

    fn insert_revocation(
        &self,
        record: RevocationRecord,
    ) -> Result<RevocationRecord, RepositoryError> {
        let mut guard = self.revocations.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.employee_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.employee_id.clone(), record.clone());
        Ok(record)
    }

    fn revocation_for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<RevocationRecord>, RepositoryError> {
        let guard = self.revocations.lock().expect("repository mutex poisoned");
        Ok(guard.get(employee_id).cloned())
    }
}
