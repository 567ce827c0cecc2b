//! In-memory onboarding store backing the demo server and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::directory::EmployeeId;
use crate::workflows::error::RepositoryError;

use super::domain::{DocumentId, Onboarding, OnboardingId};
use super::repository::{DocumentStore, DocumentUpload, OnboardingRepository};

#[derive(Default, Clone)]
pub struct MemoryOnboardingRepository {
    records: Arc<Mutex<HashMap<OnboardingId, Onboarding>>>,
    employee_keys: Arc<Mutex<HashMap<EmployeeId, OnboardingId>>>,
}

impl OnboardingRepository for MemoryOnboardingRepository {
    fn insert(&self, onboarding: Onboarding) -> Result<Onboarding, RepositoryError> {
        let mut keys = self.employee_keys.lock().expect("repository mutex poisoned");
        if keys.contains_key(&onboarding.employee_id) {
            return Err(RepositoryError::Conflict);
        }
        keys.insert(onboarding.employee_id.clone(), onboarding.id.clone());
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(onboarding.id.clone(), onboarding.clone());
        Ok(onboarding)
    }

    fn fetch(&self, id: &OnboardingId) -> Result<Option<Onboarding>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<Onboarding>, RepositoryError> {
        let keys = self.employee_keys.lock().expect("repository mutex poisoned");
        let Some(id) = keys.get(employee_id) else {
            return Ok(None);
        };
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update(&self, mut onboarding: Onboarding) -> Result<Onboarding, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard
            .get(&onboarding.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.version != onboarding.version {
            return Err(RepositoryError::VersionConflict);
        }
        onboarding.version += 1;
        guard.insert(onboarding.id.clone(), onboarding.clone());
        Ok(onboarding)
    }

    fn incomplete(&self) -> Result<Vec<Onboarding>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|onboarding| !onboarding.completed && !onboarding.cancelled)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub struct MemoryDocumentStore {
    documents: Arc<Mutex<HashMap<DocumentId, DocumentUpload>>>,
    sequence: Arc<AtomicU64>,
}

impl DocumentStore for MemoryDocumentStore {
    fn store(&self, upload: DocumentUpload) -> Result<DocumentId, RepositoryError> {
        let id = DocumentId(format!(
            "doc-{:06}",
            self.sequence.fetch_add(1, Ordering::Relaxed) + 1
        ));
        self.documents
            .lock()
            .expect("document mutex poisoned")
            .insert(id.clone(), upload);
        Ok(id)
    }

    fn fetch(&self, id: &DocumentId) -> Result<Option<DocumentUpload>, RepositoryError> {
        let guard = self.documents.lock().expect("document mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn delete(&self, id: &DocumentId) -> Result<(), RepositoryError> {
        let mut guard = self.documents.lock().expect("document mutex poisoned");
        guard.remove(id);
        Ok(())
    }
}
