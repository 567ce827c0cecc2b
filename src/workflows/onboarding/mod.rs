//! New-hire onboarding: checklist lifecycle, document capture, and the
//! deadline reminder sweep.

pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    default_checklist, task_names, AuditNote, DocumentId, Onboarding, OnboardingId,
    OnboardingTask, TaskDepartment, TaskPatch, TaskStatus,
};
pub use memory::{MemoryDocumentStore, MemoryOnboardingRepository};
pub use repository::{DocumentStore, DocumentUpload, OnboardingRepository};
pub use router::{onboarding_router, OnboardingState};
pub use service::{OnboardingOrchestrator, ReminderRunReport};
