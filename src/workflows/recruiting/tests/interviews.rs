use super::common::*;
use crate::notifications::NotificationKind;
use crate::workflows::error::LifecycleError;
use crate::workflows::recruiting::domain::{PublishStatus, Stage};
use chrono::Duration;

fn scheduled_date() -> chrono::DateTime<chrono::Utc> {
    now() + Duration::days(3)
}

fn booked_application(fx: &RecruitingFixture) -> crate::workflows::recruiting::domain::Application {
    let requisition_id = seed_requisition(&fx.repository, "req-1", 2, PublishStatus::Published);
    fx.pipeline
        .apply(candidate("cand-1"), requisition_id, None, now())
        .expect("application accepted")
}

#[test]
fn scheduling_updates_stage_and_notifies_panel() {
    let fx = fixture();
    let application = booked_application(&fx);

    let interview = fx
        .interviews
        .schedule_interview(
            &application.id,
            Stage::DepartmentInterview,
            scheduled_date(),
            Some(vec![panelist("emp-panel-a"), panelist("emp-panel-b")]),
            now(),
        )
        .expect("interview scheduled");

    assert_eq!(interview.panel.len(), 2);
    let updated = fx.pipeline.application(&application.id).expect("fetch");
    assert_eq!(updated.stage, Stage::DepartmentInterview);

    let pending = fx.outbox.pending();
    let invitations = pending
        .iter()
        .filter(|intent| intent.kind == NotificationKind::PanelInvitation)
        .count();
    assert_eq!(invitations, 2);
    assert!(pending
        .iter()
        .any(|intent| intent.kind == NotificationKind::InterviewScheduled));
}

#[test]
fn scheduling_rejects_past_and_far_future_dates() {
    let fx = fixture();
    let application = booked_application(&fx);

    assert!(matches!(
        fx.interviews.schedule_interview(
            &application.id,
            Stage::DepartmentInterview,
            now() - Duration::hours(1),
            None,
            now(),
        ),
        Err(LifecycleError::Validation(_))
    ));
    assert!(matches!(
        fx.interviews.schedule_interview(
            &application.id,
            Stage::DepartmentInterview,
            now() + Duration::days(400),
            None,
            now(),
        ),
        Err(LifecycleError::Validation(_))
    ));
}

#[test]
fn one_active_interview_per_stage() {
    let fx = fixture();
    let application = booked_application(&fx);

    let first = fx
        .interviews
        .schedule_interview(
            &application.id,
            Stage::DepartmentInterview,
            scheduled_date(),
            None,
            now(),
        )
        .expect("first booking");

    assert!(matches!(
        fx.interviews.schedule_interview(
            &application.id,
            Stage::DepartmentInterview,
            scheduled_date(),
            None,
            now(),
        ),
        Err(LifecycleError::Conflict(_))
    ));

    // Cancelling releases the slot for a rebooking.
    fx.interviews
        .cancel_interview(&first.id)
        .expect("cancellation succeeds");
    fx.interviews
        .schedule_interview(
            &application.id,
            Stage::DepartmentInterview,
            scheduled_date(),
            None,
            now(),
        )
        .expect("slot reopened after cancellation");
}

#[test]
fn empty_or_unknown_panel_is_rejected() {
    let fx = fixture();
    let application = booked_application(&fx);

    assert!(matches!(
        fx.interviews.schedule_interview(
            &application.id,
            Stage::DepartmentInterview,
            scheduled_date(),
            Some(Vec::new()),
            now(),
        ),
        Err(LifecycleError::Validation(_))
    ));

    match fx.interviews.schedule_interview(
        &application.id,
        Stage::DepartmentInterview,
        scheduled_date(),
        Some(vec![panelist("emp-ghost")]),
        now(),
    ) {
        Err(LifecycleError::Validation(message)) => assert!(message.contains("emp-ghost")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn feedback_is_panel_only_and_replaces_on_resubmit() {
    let fx = fixture();
    let application = booked_application(&fx);
    let interview = fx
        .interviews
        .schedule_interview(
            &application.id,
            Stage::DepartmentInterview,
            scheduled_date(),
            Some(vec![panelist("emp-panel-a"), panelist("emp-panel-b")]),
            now(),
        )
        .expect("interview scheduled");

    assert!(matches!(
        fx.interviews
            .submit_feedback(&interview.id, &panelist("emp-hr"), 50, "outsider", now()),
        Err(LifecycleError::Forbidden(_))
    ));

    fx.interviews
        .submit_feedback(&interview.id, &panelist("emp-panel-a"), 60, "first pass", now())
        .expect("feedback recorded");
    let updated = fx
        .interviews
        .submit_feedback(&interview.id, &panelist("emp-panel-a"), 85, "revised", now())
        .expect("feedback replaced");

    assert_eq!(updated.feedback.len(), 1);
    assert_eq!(updated.feedback[0].score, 85);
    assert_eq!(updated.feedback[0].comments, "revised");
}

#[test]
fn feedback_rejects_bad_scores_and_cancelled_interviews() {
    let fx = fixture();
    let application = booked_application(&fx);
    let interview = fx
        .interviews
        .schedule_interview(
            &application.id,
            Stage::DepartmentInterview,
            scheduled_date(),
            Some(vec![panelist("emp-panel-a")]),
            now(),
        )
        .expect("interview scheduled");

    assert!(matches!(
        fx.interviews
            .submit_feedback(&interview.id, &panelist("emp-panel-a"), 101, "", now()),
        Err(LifecycleError::Validation(_))
    ));

    fx.interviews
        .cancel_interview(&interview.id)
        .expect("cancelled");
    assert!(matches!(
        fx.interviews
            .submit_feedback(&interview.id, &panelist("emp-panel-a"), 90, "", now()),
        Err(LifecycleError::State(_))
    ));
}

#[test]
fn average_score_is_the_arithmetic_mean() {
    let fx = fixture();
    let application = booked_application(&fx);
    let interview = fx
        .interviews
        .schedule_interview(
            &application.id,
            Stage::DepartmentInterview,
            scheduled_date(),
            Some(vec![
                panelist("emp-panel-a"),
                panelist("emp-panel-b"),
                panelist("emp-panel-c"),
            ]),
            now(),
        )
        .expect("interview scheduled");

    for (member, score) in [
        ("emp-panel-a", 80),
        ("emp-panel-b", 90),
        ("emp-panel-c", 70),
    ] {
        fx.interviews
            .submit_feedback(&interview.id, &panelist(member), score, "", now())
            .expect("feedback recorded");
    }

    let average = fx.interviews.average_score(&interview.id).expect("average");
    assert!((average - 80.0).abs() < f32::EPSILON);
}

#[test]
fn average_score_is_zero_without_feedback() {
    let fx = fixture();
    let application = booked_application(&fx);
    let interview = fx
        .interviews
        .schedule_interview(
            &application.id,
            Stage::DepartmentInterview,
            scheduled_date(),
            None,
            now(),
        )
        .expect("interview scheduled");

    assert_eq!(
        fx.interviews.average_score(&interview.id).expect("average"),
        0.0
    );
}

#[test]
fn ranking_applies_referral_bonus_and_tie_break() {
    let fx = fixture();
    let requisition_id = seed_requisition(&fx.repository, "req-1", 3, PublishStatus::Published);

    // First applicant: referred, interview average 70.
    let referred = fx
        .pipeline
        .apply(
            candidate("cand-referred"),
            requisition_id.clone(),
            Some(panelist("emp-panel-a")),
            now(),
        )
        .expect("application accepted");
    let referred_interview = fx
        .interviews
        .schedule_interview(
            &referred.id,
            Stage::DepartmentInterview,
            scheduled_date(),
            Some(vec![panelist("emp-panel-a")]),
            now(),
        )
        .expect("scheduled");
    fx.interviews
        .submit_feedback(&referred_interview.id, &panelist("emp-panel-a"), 70, "", now())
        .expect("feedback");

    // Second applicant: not referred, interview average 75, applied later.
    let direct = fx
        .pipeline
        .apply(
            candidate("cand-direct"),
            requisition_id.clone(),
            None,
            now() + chrono::Duration::minutes(5),
        )
        .expect("application accepted");
    let direct_interview = fx
        .interviews
        .schedule_interview(
            &direct.id,
            Stage::DepartmentInterview,
            scheduled_date(),
            Some(vec![panelist("emp-panel-b")]),
            now(),
        )
        .expect("scheduled");
    fx.interviews
        .submit_feedback(&direct_interview.id, &panelist("emp-panel-b"), 75, "", now())
        .expect("feedback");

    // Third applicant: same score as the second but applied first.
    let early = fx
        .pipeline
        .apply(candidate("cand-early"), requisition_id.clone(), None, now())
        .expect("application accepted");
    let early_interview = fx
        .interviews
        .schedule_interview(
            &early.id,
            Stage::DepartmentInterview,
            scheduled_date(),
            Some(vec![panelist("emp-panel-c")]),
            now(),
        )
        .expect("scheduled");
    fx.interviews
        .submit_feedback(&early_interview.id, &panelist("emp-panel-c"), 75, "", now())
        .expect("feedback");

    let ranking = fx
        .interviews
        .rank_applications(&requisition_id)
        .expect("ranking");

    // Referral: 70 + 10 = 80 beats both 75s; the tie resolves to the
    // earlier submission.
    assert_eq!(ranking[0].candidate_id, candidate("cand-referred"));
    assert!((ranking[0].ranking_score - 80.0).abs() < f32::EPSILON);
    assert_eq!(ranking[1].candidate_id, candidate("cand-early"));
    assert_eq!(ranking[2].candidate_id, candidate("cand-direct"));
}
