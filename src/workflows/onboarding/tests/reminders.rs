use super::common::*;
use crate::directory::Role;
use crate::notifications::NotificationKind;
use crate::workflows::onboarding::domain::{Onboarding, OnboardingId, TaskPatch, TaskStatus};
use crate::workflows::onboarding::repository::OnboardingRepository;
use chrono::NaiveDate;

#[test]
fn overdue_tasks_produce_one_aggregated_reminder() {
    let fx = fixture();
    // The two payroll tasks carry the contract-signing deadline, already past.
    let onboarding = fx
        .orchestrator
        .create_onboarding(&employee_id("emp-new"), None, now())
        .expect("checklist created");

    let report = fx.orchestrator.send_reminders(now()).expect("sweep runs");
    assert_eq!(report.reminded, 1);
    assert_eq!(report.skipped, 0);

    let pending = fx.outbox.pending();
    let reminders: Vec<_> = pending
        .iter()
        .filter(|intent| intent.kind == NotificationKind::OnboardingReminder)
        .collect();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].recipient, "emp-new@example.com");
    assert_eq!(
        reminders[0].context.get("overdue_tasks").map(String::as_str),
        Some("2")
    );

    let refreshed = fx
        .orchestrator
        .onboarding(&onboarding.id)
        .expect("fetch");
    assert_eq!(refreshed.reminders_sent, 1);
    assert_eq!(refreshed.last_reminder_at, Some(now()));
}

#[test]
fn tasks_due_within_two_days_are_included() {
    let fx = fixture();
    // Start 2025-06-10: the standard deadline lands on 2025-06-03, one day
    // out from the sweep, with no contract date to pull anything overdue.
    let mut profile = new_hire("emp-soon");
    profile.start_date = NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date");
    profile.contract_signed_on = None;
    fx.directory.upsert_employee(profile, vec![Role::Employee]);

    fx.orchestrator
        .create_onboarding(&employee_id("emp-soon"), None, now())
        .expect("checklist created");

    let report = fx.orchestrator.send_reminders(now()).expect("sweep runs");
    assert_eq!(report.reminded, 1);

    let pending = fx.outbox.pending();
    let reminder = pending
        .iter()
        .find(|intent| intent.kind == NotificationKind::OnboardingReminder)
        .expect("reminder enqueued");
    assert_eq!(
        reminder.context.get("overdue_tasks").map(String::as_str),
        Some("0")
    );
    assert_eq!(
        reminder.context.get("due_soon_tasks").map(String::as_str),
        Some("11")
    );
}

#[test]
fn quiet_and_finished_checklists_are_left_alone() {
    let fx = fixture();
    // Start far in the future, nothing due or overdue.
    let mut profile = new_hire("emp-later");
    profile.start_date = NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date");
    profile.contract_signed_on = None;
    fx.directory.upsert_employee(profile, vec![Role::Employee]);
    fx.orchestrator
        .create_onboarding(&employee_id("emp-later"), None, now())
        .expect("checklist created");

    // Fully completed checklist with overdue deadlines; the sweep skips it
    // because only open checklists are scanned.
    let done = fx
        .orchestrator
        .create_onboarding(&employee_id("emp-new"), None, now())
        .expect("checklist created");
    for index in 0..done.tasks.len() {
        fx.orchestrator
            .update_task(
                &done.id,
                index,
                TaskPatch {
                    status: Some(TaskStatus::Completed),
                    deadline: None,
                },
                now(),
            )
            .expect("task completed");
    }

    let report = fx.orchestrator.send_reminders(now()).expect("sweep runs");
    assert_eq!(report.reminded, 0);
    assert!(fx
        .outbox
        .pending()
        .iter()
        .all(|intent| intent.kind != NotificationKind::OnboardingReminder));
}

#[test]
fn a_missing_directory_entry_skips_the_checklist() {
    let fx = fixture();
    // Seeded behind the orchestrator's back: the employee never existed in
    // the directory.
    let orphan = Onboarding::new(
        OnboardingId("onb-orphan".to_string()),
        employee_id("emp-vanished"),
        crate::workflows::onboarding::domain::default_checklist(
            NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"),
            None,
        ),
        now(),
    );
    fx.repository.insert(orphan).expect("orphan inserted");

    let report = fx.orchestrator.send_reminders(now()).expect("sweep runs");
    assert_eq!(report.reminded, 0);
    assert_eq!(report.skipped, 1);
}
