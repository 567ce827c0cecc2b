//! Termination, clearance, settlement, and revocation domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::EmployeeId;
use crate::workflows::error::LifecycleError;

/// Identifier wrapper for termination requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerminationId(pub String);

/// Identifier wrapper for clearance checklists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChecklistId(pub String);

/// Identifier wrapper for final settlement records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlementId(pub String);

/// Identifier wrapper for access revocation records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevocationId(pub String);

/// Who filed the termination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationInitiator {
    Employee,
    Hr,
    Manager,
}

impl TerminationInitiator {
    pub const fn label(self) -> &'static str {
        match self {
            TerminationInitiator::Employee => "employee",
            TerminationInitiator::Hr => "hr",
            TerminationInitiator::Manager => "manager",
        }
    }

    /// Performance-gated paths: everything except a self-resignation.
    pub const fn is_performance_gated(self) -> bool {
        !matches!(self, TerminationInitiator::Employee)
    }
}

/// `pending -> {approved, rejected}`; `approved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationStatus {
    Pending,
    Approved,
    Rejected,
}

impl TerminationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TerminationStatus::Pending => "pending",
            TerminationStatus::Approved => "approved",
            TerminationStatus::Rejected => "rejected",
        }
    }
}

/// Free-form audit trail entry on a termination request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditNote {
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

/// A request to end employment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationRequest {
    pub id: TerminationId,
    pub employee_id: EmployeeId,
    pub initiator: TerminationInitiator,
    pub status: TerminationStatus,
    pub termination_date: NaiveDate,
    pub reason: String,
    pub notes: Vec<AuditNote>,
    pub created_at: DateTime<Utc>,
}

impl TerminationRequest {
    pub fn note(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.notes.push(AuditNote {
            message: message.into(),
            recorded_at: now,
        });
    }
}

/// Caller-supplied partial update for a pending termination request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TerminationPatch {
    pub termination_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

/// The six departments that sign off on a termination. Fixed at checklist
/// creation, never added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClearanceDepartment {
    LineManager,
    Hr,
    It,
    Finance,
    Facilities,
    Admin,
}

impl ClearanceDepartment {
    pub const fn label(self) -> &'static str {
        match self {
            ClearanceDepartment::LineManager => "LINE_MANAGER",
            ClearanceDepartment::Hr => "HR",
            ClearanceDepartment::It => "IT",
            ClearanceDepartment::Finance => "FINANCE",
            ClearanceDepartment::Facilities => "FACILITIES",
            ClearanceDepartment::Admin => "ADMIN",
        }
    }

    pub const ALL: [ClearanceDepartment; 6] = [
        ClearanceDepartment::LineManager,
        ClearanceDepartment::Hr,
        ClearanceDepartment::It,
        ClearanceDepartment::Finance,
        ClearanceDepartment::Facilities,
        ClearanceDepartment::Admin,
    ];
}

/// The only ordered slice of the checklist: these three must be approved
/// strictly in sequence. IT, FACILITIES, and ADMIN carry no ordering
/// dependency.
pub const APPROVAL_PRECEDENCE: [ClearanceDepartment; 3] = [
    ClearanceDepartment::LineManager,
    ClearanceDepartment::Finance,
    ClearanceDepartment::Hr,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceItemStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClearanceItemStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ClearanceItemStatus::Pending => "pending",
            ClearanceItemStatus::Approved => "approved",
            ClearanceItemStatus::Rejected => "rejected",
        }
    }
}

/// One department's sign-off line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceItem {
    pub department: ClearanceDepartment,
    pub status: ClearanceItemStatus,
    pub assigned_to: Option<EmployeeId>,
    pub comments: Option<String>,
}

/// Issued equipment tracked for return during FACILITIES clearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentEntry {
    pub name: String,
    pub returned: bool,
}

/// Per-department reminder bookkeeping, written back under the checklist's
/// version so concurrent sweeps cannot double-count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderTracker {
    pub department: ClearanceDepartment,
    pub sent_count: u32,
    pub first_sent_at: Option<DateTime<Utc>>,
    pub last_sent_at: Option<DateTime<Utc>>,
    pub escalated: bool,
}

impl ReminderTracker {
    pub fn new(department: ClearanceDepartment) -> Self {
        Self {
            department,
            sent_count: 0,
            first_sent_at: None,
            last_sent_at: None,
            escalated: false,
        }
    }
}

/// Multi-department sign-off record, singleton per termination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceChecklist {
    pub id: ChecklistId,
    pub termination_id: TerminationId,
    pub employee_id: EmployeeId,
    pub items: Vec<ClearanceItem>,
    pub equipment: Vec<EquipmentEntry>,
    pub completed: bool,
    pub reminders: Vec<ReminderTracker>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl ClearanceChecklist {
    /// Builds the six fixed items, all pending. The LINE_MANAGER line carries
    /// an explicit approver when one is known.
    pub fn new(
        id: ChecklistId,
        termination_id: TerminationId,
        employee_id: EmployeeId,
        line_manager: Option<EmployeeId>,
        equipment: Vec<EquipmentEntry>,
        now: DateTime<Utc>,
    ) -> Self {
        let items = ClearanceDepartment::ALL
            .into_iter()
            .map(|department| ClearanceItem {
                department,
                status: ClearanceItemStatus::Pending,
                assigned_to: match department {
                    ClearanceDepartment::LineManager => line_manager.clone(),
                    _ => None,
                },
                comments: None,
            })
            .collect();

        Self {
            id,
            termination_id,
            employee_id,
            items,
            equipment,
            completed: false,
            reminders: Vec::new(),
            version: 0,
            created_at: now,
        }
    }

    pub fn item(&self, department: ClearanceDepartment) -> &ClearanceItem {
        self.items
            .iter()
            .find(|item| item.department == department)
            .expect("checklist items are fixed at creation")
    }

    pub fn item_mut(&mut self, department: ClearanceDepartment) -> &mut ClearanceItem {
        self.items
            .iter_mut()
            .find(|item| item.department == department)
            .expect("checklist items are fixed at creation")
    }

    pub fn all_approved(&self) -> bool {
        self.items
            .iter()
            .all(|item| item.status == ClearanceItemStatus::Approved)
    }

    pub fn pending_departments(&self) -> Vec<ClearanceDepartment> {
        self.items
            .iter()
            .filter(|item| item.status == ClearanceItemStatus::Pending)
            .map(|item| item.department)
            .collect()
    }

    /// Enforces the LINE_MANAGER -> FINANCE -> HR sequence for an approval of
    /// `department`; the other three departments pass unconditionally.
    pub fn check_precedence(&self, department: ClearanceDepartment) -> Result<(), LifecycleError> {
        let Some(position) = APPROVAL_PRECEDENCE
            .iter()
            .position(|ordered| *ordered == department)
        else {
            return Ok(());
        };

        for earlier in &APPROVAL_PRECEDENCE[..position] {
            if self.item(*earlier).status != ClearanceItemStatus::Approved {
                return Err(LifecycleError::state(format!(
                    "Cannot approve '{}' before '{}' is approved",
                    department.label(),
                    earlier.label()
                )));
            }
        }
        Ok(())
    }

    pub fn tracker(&self, department: ClearanceDepartment) -> Option<&ReminderTracker> {
        self.reminders
            .iter()
            .find(|tracker| tracker.department == department)
    }

    pub fn tracker_mut(&mut self, department: ClearanceDepartment) -> &mut ReminderTracker {
        if let Some(position) = self
            .reminders
            .iter()
            .position(|tracker| tracker.department == department)
        {
            return &mut self.reminders[position];
        }
        self.reminders.push(ReminderTracker::new(department));
        self.reminders
            .last_mut()
            .expect("tracker just pushed")
    }
}

/// Placeholder settlement components; computation happens downstream in
/// payroll, the engine only queues the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementComponent {
    LeaveEncashment,
    FinalPay,
    Deductions,
    Severance,
}

impl SettlementComponent {
    pub const ALL: [SettlementComponent; 4] = [
        SettlementComponent::LeaveEncashment,
        SettlementComponent::FinalPay,
        SettlementComponent::Deductions,
        SettlementComponent::Severance,
    ];
}

/// Final settlement queued once clearance completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalSettlement {
    pub id: SettlementId,
    pub termination_id: TerminationId,
    pub employee_id: EmployeeId,
    pub components: Vec<SettlementComponent>,
    pub queued_at: DateTime<Utc>,
}

/// Success or failure of one de-provisioning action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub action: String,
    pub succeeded: bool,
    pub detail: String,
}

/// Audit log of one access revocation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    pub id: RevocationId,
    pub employee_id: EmployeeId,
    pub requested_by: EmployeeId,
    pub reason: String,
    pub actions: Vec<ActionOutcome>,
    pub revoked_at: DateTime<Utc>,
}
