//! Seed data for the demo server.
//!
//! The engine normally sits behind a real identity store and HR database;
//! the demo profile fills the in-memory adapters with a small org so every
//! workflow can be exercised end to end from a fresh process.

use chrono::{Duration, NaiveDate, Utc};
use tracing::info;

use crate::directory::memory::MemoryDirectory;
use crate::directory::{AppraisalSnapshot, EmployeeId, EmployeeProfile, EmployeeStatus, Role};
use crate::workflows::error::LifecycleError;
use crate::workflows::recruiting::{
    MemoryRecruitingRepository, PublishStatus, RecruitingRepository, Requisition, RequisitionId,
};

fn profile(
    id: &str,
    full_name: &str,
    department: &str,
    line_manager: Option<&str>,
) -> EmployeeProfile {
    EmployeeProfile {
        id: EmployeeId(id.to_string()),
        employee_number: format!("E-{id}"),
        full_name: full_name.to_string(),
        email: format!("{id}@staffline.example"),
        department: department.to_string(),
        line_manager: line_manager.map(|manager| EmployeeId(manager.to_string())),
        status: EmployeeStatus::Active,
        start_date: NaiveDate::from_ymd_opt(2023, 3, 6).unwrap_or_default(),
        contract_signed_on: Some(NaiveDate::from_ymd_opt(2023, 2, 10).unwrap_or_default()),
    }
}

/// Populates the directory with a small cast covering every role the
/// workflows check for, plus one leaver candidate with a low appraisal so
/// the performance-gated termination path can be demonstrated.
pub fn seed_directory(directory: &MemoryDirectory) {
    directory.upsert_employee(
        profile("emp-001", "Priya Raman", "Engineering", None),
        vec![Role::Employee, Role::LineManager],
    );
    directory.upsert_employee(
        profile("emp-002", "Jonas Weiss", "Engineering", Some("emp-001")),
        vec![Role::Employee],
    );
    directory.upsert_employee(
        profile("emp-003", "Mei Tanaka", "Engineering", Some("emp-001")),
        vec![Role::Employee],
    );
    directory.upsert_employee(
        profile("emp-101", "Sofia Alvarez", "Human Resources", None),
        vec![Role::Employee, Role::HrStaff],
    );
    directory.upsert_employee(
        profile("emp-102", "Daniel Okafor", "Human Resources", None),
        vec![Role::Employee, Role::HrStaff, Role::HrManager],
    );
    directory.upsert_employee(
        profile("emp-201", "Lena Kovacs", "IT", None),
        vec![Role::Employee, Role::ItAdmin, Role::SystemAdmin],
    );
    directory.upsert_employee(
        profile("emp-301", "Marcus Lindqvist", "Finance", None),
        vec![Role::Employee, Role::FinanceOfficer],
    );
    directory.upsert_employee(
        profile("emp-401", "Aisha Khan", "Facilities", None),
        vec![Role::Employee, Role::FacilitiesOfficer],
    );
    directory.upsert_employee(
        profile("emp-501", "Tom Becker", "Administration", None),
        vec![Role::Employee, Role::AdminOfficer],
    );

    directory.set_department_head("Engineering", EmployeeId("emp-001".to_string()));
    directory.set_department_head("Human Resources", EmployeeId("emp-102".to_string()));

    directory.record_appraisal(AppraisalSnapshot {
        employee_id: EmployeeId("emp-003".to_string()),
        period: "2025-H1".to_string(),
        total_score: 2.1,
    });
    directory.record_appraisal(AppraisalSnapshot {
        employee_id: EmployeeId("emp-002".to_string()),
        period: "2025-H1".to_string(),
        total_score: 4.2,
    });
}

/// Publishes two open requisitions so applications can be filed immediately.
pub fn seed_requisitions(
    repository: &MemoryRecruitingRepository,
) -> Result<(), LifecycleError> {
    let now = Utc::now();
    let expiry = (now + Duration::days(60)).date_naive();

    repository.insert_requisition(Requisition {
        id: RequisitionId("req-backend".to_string()),
        title: "Backend Engineer".to_string(),
        department: "Engineering".to_string(),
        openings: 2,
        hired_count: 0,
        publish_status: PublishStatus::Published,
        expiry_date: expiry,
        created_at: now,
    })?;
    repository.insert_requisition(Requisition {
        id: RequisitionId("req-hr-generalist".to_string()),
        title: "HR Generalist".to_string(),
        department: "Human Resources".to_string(),
        openings: 1,
        hired_count: 0,
        publish_status: PublishStatus::Published,
        expiry_date: expiry,
        created_at: now,
    })?;

    Ok(())
}

/// Seeds every in-memory store the demo server runs against.
pub fn seed(
    directory: &MemoryDirectory,
    recruiting: &MemoryRecruitingRepository,
) -> Result<(), LifecycleError> {
    seed_directory(directory);
    seed_requisitions(recruiting)?;
    info!("demo data seeded: 9 employees, 2 open requisitions");
    Ok(())
}
