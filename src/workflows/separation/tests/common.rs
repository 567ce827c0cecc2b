use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::directory::memory::MemoryDirectory;
use crate::directory::{
    Actor, AppraisalSnapshot, EmployeeId, EmployeeProfile, EmployeeStatus, Role,
};
use crate::notifications::MemoryOutbox;
use crate::workflows::onboarding::memory::{MemoryDocumentStore, MemoryOnboardingRepository};
use crate::workflows::onboarding::service::OnboardingOrchestrator;
use crate::workflows::separation::clearance::ClearanceApprovalEngine;
use crate::workflows::separation::domain::{
    ChecklistId, TerminationInitiator, TerminationStatus,
};
use crate::workflows::separation::memory::MemorySeparationRepository;
use crate::workflows::separation::repository::SeparationRepository;
use crate::workflows::separation::revocation::{standard_actions, AccessRevocationCoordinator};
use crate::workflows::separation::termination::TerminationWorkflow;

pub(super) struct SeparationFixture {
    pub repository: Arc<MemorySeparationRepository>,
    pub directory: Arc<MemoryDirectory>,
    pub outbox: MemoryOutbox,
    pub onboarding: Arc<OnboardingOrchestrator<MemoryOnboardingRepository>>,
    pub terminations: TerminationWorkflow<MemorySeparationRepository>,
    pub clearance: ClearanceApprovalEngine<MemorySeparationRepository>,
    pub revocation: Arc<AccessRevocationCoordinator<MemorySeparationRepository>>,
}

pub(super) fn fixture() -> SeparationFixture {
    let repository = Arc::new(MemorySeparationRepository::default());
    let directory = Arc::new(MemoryDirectory::default());
    let outbox = MemoryOutbox::default();

    // Leaver and the cast of approvers.
    directory.upsert_employee(
        employee("emp-leaver", Some(employee_id("emp-manager"))),
        vec![Role::Employee],
    );
    directory.upsert_employee(employee("emp-manager", None), vec![Role::LineManager]);
    directory.upsert_employee(
        employee("emp-hr-staff", None),
        vec![Role::HrStaff],
    );
    directory.upsert_employee(
        employee("emp-hr-manager", None),
        vec![Role::HrStaff, Role::HrManager],
    );
    directory.upsert_employee(employee("emp-it", None), vec![Role::ItAdmin]);
    directory.upsert_employee(employee("emp-finance", None), vec![Role::FinanceOfficer]);
    directory.upsert_employee(
        employee("emp-facilities", None),
        vec![Role::FacilitiesOfficer],
    );
    directory.upsert_employee(employee("emp-admin", None), vec![Role::AdminOfficer]);
    directory.upsert_employee(employee("emp-sysadmin", None), vec![Role::SystemAdmin]);

    let onboarding = Arc::new(OnboardingOrchestrator::new(
        Arc::new(MemoryOnboardingRepository::default()),
        directory.clone(),
        Arc::new(MemoryDocumentStore::default()),
        Arc::new(outbox.clone()),
    ));
    let revocation = Arc::new(AccessRevocationCoordinator::new(
        repository.clone(),
        directory.clone(),
        Arc::new(outbox.clone()),
        standard_actions(),
    ));
    let terminations = TerminationWorkflow::new(
        repository.clone(),
        directory.clone(),
        directory.clone(),
        directory.clone(),
    );
    let clearance = ClearanceApprovalEngine::new(
        repository.clone(),
        directory.clone(),
        Arc::new(outbox.clone()),
        revocation.clone(),
        onboarding.clone(),
    );

    SeparationFixture {
        repository,
        directory,
        outbox,
        onboarding,
        terminations,
        clearance,
        revocation,
    }
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).single().expect("valid timestamp")
}

pub(super) fn employee_id(id: &str) -> EmployeeId {
    EmployeeId(id.to_string())
}

pub(super) fn employee(id: &str, line_manager: Option<EmployeeId>) -> EmployeeProfile {
    EmployeeProfile {
        id: EmployeeId(id.to_string()),
        employee_number: format!("E-{id}"),
        full_name: format!("Employee {id}"),
        email: format!("{id}@example.com"),
        department: "Engineering".to_string(),
        line_manager,
        status: EmployeeStatus::Active,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 8).expect("valid date"),
        contract_signed_on: Some(NaiveDate::from_ymd_opt(2023, 12, 15).expect("valid date")),
    }
}

pub(super) fn actor(id: &str, roles: &[Role]) -> Actor {
    Actor::new(employee_id(id), roles.iter().copied())
}

pub(super) fn record_low_appraisal(fx: &SeparationFixture, id: &str) {
    fx.directory.record_appraisal(AppraisalSnapshot {
        employee_id: employee_id(id),
        period: "2024".to_string(),
        total_score: 1.8,
    });
}

/// Files and approves a self-resignation, returning the checklist id.
pub(super) fn approved_checklist(fx: &SeparationFixture) -> ChecklistId {
    let request = fx
        .terminations
        .create_termination_request(
            &employee_id("emp-leaver"),
            TerminationInitiator::Employee,
            &actor("emp-leaver", &[Role::Employee]),
            NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date"),
            "resignation",
            now(),
        )
        .expect("request filed");
    fx.terminations
        .update_status(
            &request.id,
            TerminationStatus::Approved,
            &actor("emp-hr-staff", &[Role::HrStaff]),
            now(),
        )
        .expect("approved");
    fx.repository
        .checklist_for_termination(&request.id)
        .expect("fetch")
        .expect("checklist created")
        .id
}
