//! Storage abstraction for the separation workflow.
//!
//! One clearance checklist per termination and one revocation record per
//! employee, both enforced at insert. Checklist updates are version-checked
//! because the reminder sweep and live approvals touch the same record.

use crate::directory::EmployeeId;
use crate::workflows::error::RepositoryError;

use super::domain::{
    ChecklistId, ClearanceChecklist, FinalSettlement, RevocationRecord, TerminationId,
    TerminationRequest,
};

pub trait SeparationRepository: Send + Sync {
    // Termination requests.
    fn insert_termination(
        &self,
        request: TerminationRequest,
    ) -> Result<TerminationRequest, RepositoryError>;
    fn termination(&self, id: &TerminationId)
        -> Result<Option<TerminationRequest>, RepositoryError>;
    fn update_termination(&self, request: TerminationRequest) -> Result<(), RepositoryError>;
    fn terminations_for(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<TerminationRequest>, RepositoryError>;

    // Clearance checklists; unique per termination, version-checked writes.
    fn insert_checklist(
        &self,
        checklist: ClearanceChecklist,
    ) -> Result<ClearanceChecklist, RepositoryError>;
    fn checklist(&self, id: &ChecklistId) -> Result<Option<ClearanceChecklist>, RepositoryError>;
    fn checklist_for_termination(
        &self,
        termination_id: &TerminationId,
    ) -> Result<Option<ClearanceChecklist>, RepositoryError>;

    /// Version-checked write. The stored version must equal
    /// `checklist.version`; on success the stored copy carries the bumped
    /// version and is returned.
    fn update_checklist(
        &self,
        checklist: ClearanceChecklist,
    ) -> Result<ClearanceChecklist, RepositoryError>;

    /// Checklists not yet complete, for the reminder sweep.
    fn open_checklists(&self) -> Result<Vec<ClearanceChecklist>, RepositoryError>;

    // Final settlements; unique per termination.
    fn insert_settlement(
        &self,
        settlement: FinalSettlement,
    ) -> Result<FinalSettlement, RepositoryError>;
    fn settlement_for_termination(
        &self,
        termination_id: &TerminationId,
    ) -> Result<Option<FinalSettlement>, RepositoryError>;

    // Revocation records; one per employee, later runs return the first.
    fn insert_revocation(
        &self,
        record: RevocationRecord,
    ) -> Result<RevocationRecord, RepositoryError>;
    fn revocation_for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<RevocationRecord>, RepositoryError>;
}
