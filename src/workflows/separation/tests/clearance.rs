use super::common::*;
use crate::directory::{Actor, EmployeeDirectory, EmployeeStatus, Role};
use crate::notifications::NotificationKind;
use crate::workflows::error::LifecycleError;
use crate::workflows::separation::domain::{
    ChecklistId, ClearanceChecklist, ClearanceDepartment, ClearanceItemStatus, TerminationStatus,
};
use crate::workflows::separation::repository::SeparationRepository;

fn approve(
    fx: &SeparationFixture,
    checklist_id: &ChecklistId,
    department: ClearanceDepartment,
    by: &Actor,
) -> Result<ClearanceChecklist, LifecycleError> {
    fx.clearance.update_item_status(
        checklist_id,
        department,
        ClearanceItemStatus::Approved,
        by,
        None,
        None,
        now(),
    )
}

#[test]
fn precedence_is_line_manager_then_finance_then_hr() {
    let fx = fixture();
    let checklist_id = approved_checklist(&fx);

    match approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::Finance,
        &actor("emp-finance", &[Role::FinanceOfficer]),
    ) {
        Err(LifecycleError::State(message)) => assert_eq!(
            message,
            "Cannot approve 'FINANCE' before 'LINE_MANAGER' is approved"
        ),
        other => panic!("expected state error, got {other:?}"),
    }

    approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::LineManager,
        &actor("emp-manager", &[Role::LineManager]),
    )
    .expect("line manager first");

    match approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::Hr,
        &actor("emp-hr-manager", &[Role::HrStaff, Role::HrManager]),
    ) {
        Err(LifecycleError::State(message)) => assert_eq!(
            message,
            "Cannot approve 'HR' before 'FINANCE' is approved"
        ),
        other => panic!("expected state error, got {other:?}"),
    }
}

#[test]
fn unordered_departments_may_approve_any_time() {
    let fx = fixture();
    let checklist_id = approved_checklist(&fx);

    approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::Admin,
        &actor("emp-admin", &[Role::AdminOfficer]),
    )
    .expect("ADMIN carries no ordering dependency");
}

#[test]
fn department_roles_are_enforced() {
    let fx = fixture();
    let checklist_id = approved_checklist(&fx);

    match approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::Finance,
        &actor("emp-it", &[Role::ItAdmin]),
    ) {
        Err(LifecycleError::Forbidden(message)) => assert!(message.contains("FINANCE")),
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[test]
fn assigned_line_manager_may_decide_without_the_role() {
    let fx = fixture();
    let checklist_id = approved_checklist(&fx);

    // The checklist routes to emp-manager explicitly; the assignment alone
    // authorises them even with no roles attached to the request.
    approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::LineManager,
        &actor("emp-manager", &[]),
    )
    .expect("assigned approver accepted");
}

#[test]
fn hr_approval_requires_an_hr_manager() {
    let fx = fixture();
    let checklist_id = approved_checklist(&fx);
    approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::LineManager,
        &actor("emp-manager", &[Role::LineManager]),
    )
    .expect("line manager");
    approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::Finance,
        &actor("emp-finance", &[Role::FinanceOfficer]),
    )
    .expect("finance");

    assert!(matches!(
        approve(
            &fx,
            &checklist_id,
            ClearanceDepartment::Hr,
            &actor("emp-hr-staff", &[Role::HrStaff]),
        ),
        Err(LifecycleError::Forbidden(_))
    ));

    // Plain HR staff may still reject.
    fx.clearance
        .update_item_status(
            &checklist_id,
            ClearanceDepartment::Hr,
            ClearanceItemStatus::Rejected,
            &actor("emp-hr-staff", &[Role::HrStaff]),
            Some("pending dues".to_string()),
            None,
            now(),
        )
        .expect("HR staff rejection accepted");
}

#[test]
fn it_approval_triggers_access_revocation() {
    let fx = fixture();
    let checklist_id = approved_checklist(&fx);

    approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::It,
        &actor("emp-it", &[Role::ItAdmin]),
    )
    .expect("IT clearance");

    let profile = fx
        .directory
        .find_employee(&employee_id("emp-leaver"))
        .expect("lookup")
        .expect("present");
    assert_eq!(profile.status, EmployeeStatus::Inactive);
    assert!(fx
        .repository
        .revocation_for_employee(&employee_id("emp-leaver"))
        .expect("fetch")
        .is_some());
}

#[test]
fn facilities_approval_marks_equipment_returned_and_annotates_onboarding() {
    let fx = fixture();
    fx.onboarding
        .create_onboarding(&employee_id("emp-leaver"), None, now())
        .expect("onboarding on file");
    let checklist_id = approved_checklist(&fx);

    let updated = fx
        .clearance
        .update_item_status(
            &checklist_id,
            ClearanceDepartment::Facilities,
            ClearanceItemStatus::Approved,
            &actor("emp-facilities", &[Role::FacilitiesOfficer]),
            None,
            Some(vec!["laptop".to_string(), "access_badge".to_string()]),
            now(),
        )
        .expect("facilities clearance");

    let returned: Vec<_> = updated
        .equipment
        .iter()
        .filter(|entry| entry.returned)
        .map(|entry| entry.name.as_str())
        .collect();
    assert_eq!(returned, vec!["laptop", "access_badge"]);

    let onboarding = fx
        .onboarding
        .onboarding_for_employee(&employee_id("emp-leaver"))
        .expect("fetch");
    assert!(onboarding
        .notes
        .iter()
        .any(|note| note.message.contains("equipment returned")));
}

#[test]
fn full_clearance_completes_and_queues_the_settlement() {
    let fx = fixture();
    let checklist_id = approved_checklist(&fx);

    approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::LineManager,
        &actor("emp-manager", &[Role::LineManager]),
    )
    .expect("line manager");
    approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::Finance,
        &actor("emp-finance", &[Role::FinanceOfficer]),
    )
    .expect("finance");
    approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::Hr,
        &actor("emp-hr-manager", &[Role::HrStaff, Role::HrManager]),
    )
    .expect("hr");
    approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::It,
        &actor("emp-it", &[Role::ItAdmin]),
    )
    .expect("it");
    fx.clearance
        .update_item_status(
            &checklist_id,
            ClearanceDepartment::Facilities,
            ClearanceItemStatus::Approved,
            &actor("emp-facilities", &[Role::FacilitiesOfficer]),
            None,
            Some(vec!["laptop".to_string()]),
            now(),
        )
        .expect("facilities");
    let completed = approve(
        &fx,
        &checklist_id,
        ClearanceDepartment::Admin,
        &actor("emp-admin", &[Role::AdminOfficer]),
    )
    .expect("admin closes it out");

    assert!(completed.completed);

    let termination = fx
        .repository
        .termination(&completed.termination_id)
        .expect("fetch")
        .expect("present");
    assert_eq!(termination.status, TerminationStatus::Approved);

    let settlement = fx
        .repository
        .settlement_for_termination(&completed.termination_id)
        .expect("fetch")
        .expect("queued");
    assert_eq!(settlement.components.len(), 4);
    assert!(fx
        .outbox
        .pending()
        .iter()
        .any(|intent| intent.kind == NotificationKind::FinalSettlement));

    // No further decisions once complete.
    assert!(matches!(
        approve(
            &fx,
            &checklist_id,
            ClearanceDepartment::Admin,
            &actor("emp-admin", &[Role::AdminOfficer]),
        ),
        Err(LifecycleError::State(_))
    ));
}

#[test]
fn reminder_sweep_respects_interval_cap_and_force() {
    let fx = fixture();
    approved_checklist(&fx);

    let first = fx
        .clearance
        .send_reminders(now(), false)
        .expect("first sweep");
    assert_eq!(first.reminders, 6);
    assert!(fx
        .outbox
        .pending()
        .iter()
        .any(|intent| intent.kind == NotificationKind::ClearanceReminder));

    // Same-day rerun is quiet; force overrides the interval.
    let rerun = fx
        .clearance
        .send_reminders(now(), false)
        .expect("second sweep");
    assert_eq!(rerun.reminders, 0);
    let forced = fx
        .clearance
        .send_reminders(now(), true)
        .expect("forced sweep");
    assert_eq!(forced.reminders, 6);

    // The third send exhausts the per-department cap even under force.
    let third = fx
        .clearance
        .send_reminders(now(), true)
        .expect("third sweep");
    assert_eq!(third.reminders, 6);
    let capped = fx
        .clearance
        .send_reminders(now(), true)
        .expect("capped sweep");
    assert_eq!(capped.reminders, 0);
}

#[test]
fn reminders_resume_after_the_interval_elapses() {
    let fx = fixture();
    approved_checklist(&fx);

    fx.clearance.send_reminders(now(), false).expect("first");
    let later = now() + chrono::Duration::days(3);
    let second = fx
        .clearance
        .send_reminders(later, false)
        .expect("after the interval");
    assert_eq!(second.reminders, 6);
}

#[test]
fn unresolved_items_escalate_once_after_seven_days() {
    let fx = fixture();
    approved_checklist(&fx);

    fx.clearance.send_reminders(now(), false).expect("first");

    let week_later = now() + chrono::Duration::days(7);
    let escalated = fx
        .clearance
        .send_reminders(week_later, false)
        .expect("escalating sweep");
    assert_eq!(escalated.escalations, 6);

    let escalations: Vec<_> = fx
        .outbox
        .pending()
        .into_iter()
        .filter(|intent| intent.kind == NotificationKind::ClearanceEscalation)
        .collect();
    assert!(!escalations.is_empty());
    // HR managers and the leaver's line manager are the escalation audience.
    assert!(escalations
        .iter()
        .any(|intent| intent.recipient == "emp-hr-manager@example.com"));
    assert!(escalations
        .iter()
        .any(|intent| intent.recipient == "emp-manager@example.com"));

    // Escalation fires once per department.
    let again = fx
        .clearance
        .send_reminders(week_later + chrono::Duration::days(1), false)
        .expect("post-escalation sweep");
    assert_eq!(again.escalations, 0);
}
