//! Storage abstraction for onboarding checklists and their documents.
//!
//! One checklist per employee, enforced at insert time. Updates are
//! version-checked: the write only lands when the caller read the version it
//! is replacing, otherwise [`RepositoryError::VersionConflict`] comes back and
//! the caller re-reads.

use crate::directory::EmployeeId;
use crate::workflows::error::RepositoryError;

use super::domain::{DocumentId, Onboarding, OnboardingId};

pub trait OnboardingRepository: Send + Sync {
    /// Inserts a new checklist; unique per employee.
    fn insert(&self, onboarding: Onboarding) -> Result<Onboarding, RepositoryError>;
    fn fetch(&self, id: &OnboardingId) -> Result<Option<Onboarding>, RepositoryError>;
    fn find_by_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<Onboarding>, RepositoryError>;

    /// Version-checked write. The stored version must equal
    /// `onboarding.version`; on success the stored copy carries
    /// `onboarding.version + 1` and the bumped record is returned.
    fn update(&self, onboarding: Onboarding) -> Result<Onboarding, RepositoryError>;

    /// Checklists that are neither completed nor cancelled, for the reminder
    /// sweep.
    fn incomplete(&self) -> Result<Vec<Onboarding>, RepositoryError>;
}

/// Payload handed to the document store. Content validation (type, size)
/// happens at the edge before this point.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub trait DocumentStore: Send + Sync {
    fn store(&self, upload: DocumentUpload) -> Result<DocumentId, RepositoryError>;
    fn fetch(&self, id: &DocumentId) -> Result<Option<DocumentUpload>, RepositoryError>;
    /// Removes a stored document; deleting an unknown id is a no-op.
    fn delete(&self, id: &DocumentId) -> Result<(), RepositoryError>;
}
