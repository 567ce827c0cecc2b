use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::directory::memory::MemoryDirectory;
use crate::directory::{CandidateId, EmployeeId, EmployeeProfile, EmployeeStatus, Role};
use crate::notifications::MemoryOutbox;
use crate::workflows::recruiting::domain::{PublishStatus, Requisition, RequisitionId};
use crate::workflows::recruiting::interviews::InterviewScheduler;
use crate::workflows::recruiting::memory::MemoryRecruitingRepository;
use crate::workflows::recruiting::offers::OfferNegotiation;
use crate::workflows::recruiting::pipeline::ApplicationPipeline;
use crate::workflows::recruiting::repository::RecruitingRepository;

pub(super) struct RecruitingFixture {
    pub repository: Arc<MemoryRecruitingRepository>,
    pub directory: Arc<MemoryDirectory>,
    pub outbox: MemoryOutbox,
    pub pipeline: Arc<ApplicationPipeline<MemoryRecruitingRepository>>,
    pub interviews: InterviewScheduler<MemoryRecruitingRepository>,
    pub offers: OfferNegotiation<MemoryRecruitingRepository>,
}

pub(super) fn fixture() -> RecruitingFixture {
    let repository = Arc::new(MemoryRecruitingRepository::default());
    let directory = Arc::new(MemoryDirectory::default());
    let outbox = MemoryOutbox::default();

    for id in ["emp-panel-a", "emp-panel-b", "emp-panel-c", "emp-hr"] {
        directory.upsert_employee(employee(id), vec![Role::Employee]);
    }

    let pipeline = Arc::new(ApplicationPipeline::new(
        repository.clone(),
        Arc::new(outbox.clone()),
    ));
    let interviews = InterviewScheduler::new(
        repository.clone(),
        directory.clone(),
        Arc::new(outbox.clone()),
    );
    let offers = OfferNegotiation::new(
        repository.clone(),
        pipeline.clone(),
        Arc::new(outbox.clone()),
    );

    RecruitingFixture {
        repository,
        directory,
        outbox,
        pipeline,
        interviews,
        offers,
    }
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).single().expect("valid timestamp")
}

pub(super) fn employee(id: &str) -> EmployeeProfile {
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

pub(super) fn candidate(id: &str) -> CandidateId {
    CandidateId(id.to_string())
}

pub(super) fn panelist(id: &str) -> EmployeeId {
    EmployeeId(id.to_string())
}

pub(super) fn seed_requisition(
    repository: &MemoryRecruitingRepository,
    id: &str,
    openings: u32,
    publish_status: PublishStatus,
) -> RequisitionId {
    let requisition = Requisition {
        id: RequisitionId(id.to_string()),
        title: "Backend Engineer".to_string(),
        department: "Engineering".to_string(),
        openings,
        hired_count: 0,
        publish_status,
        expiry_date: NaiveDate::from_ymd_opt(2099, 12, 31).expect("valid date"),
        created_at: now(),
    };
    repository
        .insert_requisition(requisition)
        .expect("requisition inserted")
        .id
}
