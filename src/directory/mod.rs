//! Contracts for the identity/profile and org-structure collaborators.
//!
//! The lifecycle engine never owns employee data. It reads profiles and roles
//! through [`EmployeeDirectory`], resolves department heads through
//! [`OrgDirectory`], and flips exactly one field — the employment status —
//! when access is revoked. Everything else belongs to the profile service.

pub mod memory;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for employees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

/// Identifier wrapper for external candidates (pre-hire).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Employment status owned by the profile service; the engine only flips it
/// to `Inactive` during access revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

/// Roles recognised by the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    LineManager,
    HrStaff,
    HrManager,
    ItAdmin,
    FinanceOfficer,
    FacilitiesOfficer,
    AdminOfficer,
    SystemAdmin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::LineManager => "line_manager",
            Role::HrStaff => "hr_staff",
            Role::HrManager => "hr_manager",
            Role::ItAdmin => "it_admin",
            Role::FinanceOfficer => "finance_officer",
            Role::FacilitiesOfficer => "facilities_officer",
            Role::AdminOfficer => "admin_officer",
            Role::SystemAdmin => "system_admin",
        }
    }
}

/// The authenticated principal performing a workflow operation.
///
/// Token issuance and verification are external; by the time a request
/// reaches the engine the actor's identity and roles are settled facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub employee_id: EmployeeId,
    pub roles: Vec<Role>,
}

impl Actor {
    pub fn new(employee_id: EmployeeId, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            employee_id,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is(&self, employee_id: &EmployeeId) -> bool {
        &self.employee_id == employee_id
    }
}

/// Profile snapshot served by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: EmployeeId,
    pub employee_number: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub line_manager: Option<EmployeeId>,
    pub status: EmployeeStatus,
    pub start_date: NaiveDate,
    pub contract_signed_on: Option<NaiveDate>,
}

/// Most recent appraisal snapshot; gates performance-based terminations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppraisalSnapshot {
    pub employee_id: EmployeeId,
    pub period: String,
    pub total_score: f32,
}

/// Read/flip access to the identity and profile store.
pub trait EmployeeDirectory: Send + Sync {
    fn find_employee(&self, id: &EmployeeId) -> Result<Option<EmployeeProfile>, DirectoryError>;

    fn find_by_employee_number(
        &self,
        number: &str,
    ) -> Result<Option<EmployeeProfile>, DirectoryError>;

    fn find_by_department(&self, department: &str)
        -> Result<Vec<EmployeeProfile>, DirectoryError>;

    /// All employees currently holding `role`.
    fn find_by_role(&self, role: Role) -> Result<Vec<EmployeeProfile>, DirectoryError>;

    fn roles(&self, id: &EmployeeId) -> Result<Vec<Role>, DirectoryError>;

    /// The single profile mutation the engine is allowed to make.
    fn update_status(&self, id: &EmployeeId, status: EmployeeStatus)
        -> Result<(), DirectoryError>;
}

/// Read-only org-structure lookups used for clearance routing and onboarding
/// validation.
pub trait OrgDirectory: Send + Sync {
    fn department_head(&self, department: &str) -> Result<Option<EmployeeId>, DirectoryError>;
}

/// Read-only appraisal lookups.
pub trait AppraisalSource: Send + Sync {
    fn latest_appraisal(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<AppraisalSnapshot>, DirectoryError>;
}

/// Failures raised by the collaborator stores.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}
