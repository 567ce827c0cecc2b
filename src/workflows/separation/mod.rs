//! Employee separation: termination requests, multi-department clearance,
//! and access revocation.

pub mod clearance;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod revocation;
pub mod router;
pub mod termination;

#[cfg(test)]
mod tests;

pub use clearance::{
    AccessRevoker, ClearanceApprovalEngine, ClearanceSweepReport, OnboardingAnnotator,
};
pub use domain::{
    ActionOutcome, AuditNote, ChecklistId, ClearanceChecklist, ClearanceDepartment, ClearanceItem,
    ClearanceItemStatus, EquipmentEntry, FinalSettlement, ReminderTracker, RevocationId,
    RevocationRecord, SettlementComponent, SettlementId, TerminationId, TerminationInitiator,
    TerminationPatch, TerminationRequest, TerminationStatus, APPROVAL_PRECEDENCE,
};
pub use memory::MemorySeparationRepository;
pub use repository::SeparationRepository;
pub use revocation::{
    standard_actions, AccessRevocationCoordinator, DeprovisionAction, DeprovisionError,
    LoggedDeprovisionAction,
};
pub use router::{separation_router, SeparationState};
pub use termination::{TerminationWorkflow, APPRAISAL_THRESHOLD};
