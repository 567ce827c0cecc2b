use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::directory::memory::MemoryDirectory;
use crate::directory::{EmployeeId, EmployeeProfile, EmployeeStatus, Role};
use crate::notifications::MemoryOutbox;
use crate::workflows::onboarding::memory::{MemoryDocumentStore, MemoryOnboardingRepository};
use crate::workflows::onboarding::service::OnboardingOrchestrator;

pub(super) struct OnboardingFixture {
    pub repository: Arc<MemoryOnboardingRepository>,
    pub directory: Arc<MemoryDirectory>,
    pub documents: Arc<MemoryDocumentStore>,
    pub outbox: MemoryOutbox,
    pub orchestrator: OnboardingOrchestrator<MemoryOnboardingRepository>,
}

pub(super) fn fixture() -> OnboardingFixture {
    let repository = Arc::new(MemoryOnboardingRepository::default());
    let directory = Arc::new(MemoryDirectory::default());
    let documents = Arc::new(MemoryDocumentStore::default());
    let outbox = MemoryOutbox::default();

    directory.upsert_employee(new_hire("emp-new"), vec![Role::Employee]);

    let orchestrator = OnboardingOrchestrator::new(
        repository.clone(),
        directory.clone(),
        documents.clone(),
        Arc::new(outbox.clone()),
    );

    OnboardingFixture {
        repository,
        directory,
        documents,
        outbox,
        orchestrator,
    }
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).single().expect("valid timestamp")
}

pub(super) fn employee_id(id: &str) -> EmployeeId {
    EmployeeId(id.to_string())
}

/// Starts 2025-06-16, contract signed 2025-05-20: the standard task deadline
/// lands on 2025-06-09 and the payroll deadlines are already past `now()`.
pub(super) fn new_hire(id: &str) -> EmployeeProfile {
    EmployeeProfile {
        id: EmployeeId(id.to_string()),
        employee_number: format!("E-{id}"),
        full_name: format!("Employee {id}"),
        email: format!("{id}@example.com"),
        department: "Engineering".to_string(),
        line_manager: None,
        status: EmployeeStatus::Active,
        start_date: NaiveDate::from_ymd_opt(2025, 6, 16).expect("valid date"),
        contract_signed_on: Some(NaiveDate::from_ymd_opt(2025, 5, 20).expect("valid date")),
    }
}
