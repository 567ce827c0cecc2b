use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::common::*;
use crate::directory::{EmployeeDirectory, EmployeeId, EmployeeStatus, Role};
use crate::notifications::NotificationKind;
use crate::workflows::error::LifecycleError;
use crate::workflows::separation::domain::{TerminationInitiator, TerminationStatus};
use crate::workflows::separation::repository::SeparationRepository;
use crate::workflows::separation::revocation::{
    standard_actions, AccessRevocationCoordinator, DeprovisionAction, DeprovisionError,
};
use chrono::NaiveDate;

struct CountingAction {
    name: &'static str,
    runs: Arc<AtomicUsize>,
    fail: bool,
}

impl DeprovisionAction for CountingAction {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(&self, _employee_id: &EmployeeId) -> Result<(), DeprovisionError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DeprovisionError(format!("{} offline", self.name)));
        }
        Ok(())
    }
}

#[test]
fn direct_invocation_requires_a_system_admin() {
    let fx = fixture();

    assert!(matches!(
        fx.revocation.revoke_access(
            &employee_id("emp-leaver"),
            &actor("emp-hr-manager", &[Role::HrStaff, Role::HrManager]),
            "policy breach",
            now(),
        ),
        Err(LifecycleError::Forbidden(_))
    ));
}

#[test]
fn revocation_deactivates_and_notifies() {
    let fx = fixture();

    let record = fx
        .revocation
        .revoke_access(
            &employee_id("emp-leaver"),
            &actor("emp-sysadmin", &[Role::SystemAdmin]),
            "departure",
            now(),
        )
        .expect("revocation runs");

    assert_eq!(record.actions.len(), 3);
    assert!(record.actions.iter().all(|outcome| outcome.succeeded));

    let profile = fx
        .directory
        .find_employee(&employee_id("emp-leaver"))
        .expect("lookup")
        .expect("present");
    assert_eq!(profile.status, EmployeeStatus::Inactive);

    let notified: Vec<_> = fx
        .outbox
        .pending()
        .into_iter()
        .filter(|intent| intent.kind == NotificationKind::AccessRevoked)
        .map(|intent| intent.recipient)
        .collect();
    assert!(notified.contains(&"emp-leaver@example.com".to_string()));
    assert!(notified.contains(&"emp-sysadmin@example.com".to_string()));
}

#[test]
fn second_invocation_is_a_no_op_returning_the_prior_log() {
    let fx = fixture();
    let runs = Arc::new(AtomicUsize::new(0));
    let coordinator = AccessRevocationCoordinator::new(
        fx.repository.clone(),
        fx.directory.clone(),
        Arc::new(fx.outbox.clone()),
        vec![Arc::new(CountingAction {
            name: "identity_provider",
            runs: runs.clone(),
            fail: false,
        })],
    );
    let admin = actor("emp-sysadmin", &[Role::SystemAdmin]);

    let first = coordinator
        .revoke_access(&employee_id("emp-leaver"), &admin, "departure", now())
        .expect("first run");
    let second = coordinator
        .revoke_access(&employee_id("emp-leaver"), &admin, "departure again", now())
        .expect("second run is a no-op");

    assert_eq!(first.id, second.id);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_actions_are_recorded_without_aborting_the_rest() {
    let fx = fixture();
    let runs = Arc::new(AtomicUsize::new(0));
    let coordinator = AccessRevocationCoordinator::new(
        fx.repository.clone(),
        fx.directory.clone(),
        Arc::new(fx.outbox.clone()),
        vec![
            Arc::new(CountingAction {
                name: "identity_provider",
                runs: runs.clone(),
                fail: false,
            }),
            Arc::new(CountingAction {
                name: "mailbox",
                runs: runs.clone(),
                fail: true,
            }),
            Arc::new(CountingAction {
                name: "application_access",
                runs: runs.clone(),
                fail: false,
            }),
        ],
    );

    let record = coordinator
        .revoke_access(
            &employee_id("emp-leaver"),
            &actor("emp-sysadmin", &[Role::SystemAdmin]),
            "departure",
            now(),
        )
        .expect("revocation still succeeds");

    assert_eq!(runs.load(Ordering::SeqCst), 3);
    let mailbox = record
        .actions
        .iter()
        .find(|outcome| outcome.action == "mailbox")
        .expect("mailbox outcome recorded");
    assert!(!mailbox.succeeded);
    assert!(mailbox.detail.contains("offline"));
    assert!(record
        .actions
        .iter()
        .filter(|outcome| outcome.action != "mailbox")
        .all(|outcome| outcome.succeeded));
}

#[test]
fn revocation_annotates_the_termination_record() {
    let fx = fixture();
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

    fx.revocation
        .revoke_access(
            &employee_id("emp-leaver"),
            &actor("emp-sysadmin", &[Role::SystemAdmin]),
            "last working day",
            now(),
        )
        .expect("revocation runs");

    let annotated = fx
        .repository
        .termination(&request.id)
        .expect("fetch")
        .expect("present");
    assert!(annotated
        .notes
        .iter()
        .any(|note| note.message.contains("access revoked: last working day")));
    assert_eq!(annotated.status, TerminationStatus::Pending);
}

#[test]
fn standard_action_set_covers_the_three_systems() {
    let actions = standard_actions();
    let names: Vec<_> = actions.iter().map(|action| action.name()).collect();
    assert_eq!(
        names,
        vec!["identity_provider", "mailbox", "application_access"]
    );
}
