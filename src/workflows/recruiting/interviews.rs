//! Interview scheduling, panel feedback, and candidate ranking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::directory::{EmployeeDirectory, EmployeeId};
use crate::notifications::{
    enqueue_best_effort, NotificationIntent, NotificationKind, NotificationOutbox,
};
use crate::workflows::error::{LifecycleError, RepositoryError};

use super::domain::{
    Application, ApplicationId, FeedbackRecord, Interview, InterviewId, InterviewStatus,
    RankedApplication, RequisitionId, Stage,
};
use super::repository::RecruitingRepository;

static INTERVIEW_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_interview_id() -> InterviewId {
    let id = INTERVIEW_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    InterviewId(format!("int-{id:06}"))
}

/// Ranking boost applied to candidates tagged as employee referrals.
pub const REFERRAL_BONUS: f32 = 10.0;

const MAX_SCHEDULING_HORIZON_DAYS: i64 = 365;

/// Interview scheduling and feedback aggregation.
pub struct InterviewScheduler<R> {
    repository: Arc<R>,
    directory: Arc<dyn EmployeeDirectory>,
    outbox: Arc<dyn NotificationOutbox>,
}

impl<R> InterviewScheduler<R>
where
    R: RecruitingRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        directory: Arc<dyn EmployeeDirectory>,
        outbox: Arc<dyn NotificationOutbox>,
    ) -> Self {
        Self {
            repository,
            directory,
            outbox,
        }
    }

    /// Books an interview for one stage of one application.
    ///
    /// At most one non-cancelled interview may exist per `(application,
    /// stage)`; the repository enforces the slot. Panel invitations are sent
    /// best-effort, one failure never suppresses the others.
    pub fn schedule_interview(
        &self,
        application_id: &ApplicationId,
        stage: Stage,
        scheduled_at: DateTime<Utc>,
        panel: Option<Vec<EmployeeId>>,
        now: DateTime<Utc>,
    ) -> Result<Interview, LifecycleError> {
        let mut application = self.load_application(application_id)?;

        if application.status.is_terminal() {
            return Err(LifecycleError::state(format!(
                "cannot schedule an interview for a {} application",
                application.status.label()
            )));
        }

        if scheduled_at <= now {
            return Err(LifecycleError::validation(
                "interview date must be in the future",
            ));
        }
        if scheduled_at > now + Duration::days(MAX_SCHEDULING_HORIZON_DAYS) {
            return Err(LifecycleError::validation(
                "interview date must be within one year",
            ));
        }

        let panel = match panel {
            Some(members) if members.is_empty() => {
                return Err(LifecycleError::validation(
                    "panel list must not be empty when supplied",
                ));
            }
            Some(members) => {
                for member in &members {
                    let known = self
                        .directory
                        .find_employee(member)
                        .map_err(|err| LifecycleError::validation(err.to_string()))?;
                    if known.is_none() {
                        return Err(LifecycleError::validation(format!(
                            "panel member '{}' is not a known employee",
                            member.0
                        )));
                    }
                }
                members
            }
            None => Vec::new(),
        };

        let interview = Interview {
            id: next_interview_id(),
            application_id: application_id.clone(),
            stage,
            scheduled_at,
            panel,
            status: InterviewStatus::Scheduled,
            feedback: Vec::new(),
            created_at: now,
        };

        let stored = self
            .repository
            .insert_interview(interview)
            .map_err(|err| match err {
                RepositoryError::Conflict => LifecycleError::conflict(format!(
                    "an active interview already exists for stage '{}'",
                    stage.label()
                )),
                other => LifecycleError::from(other),
            })?;

        application.advance_stage(stage);
        self.repository.update_application(application.clone())?;

        enqueue_best_effort(
            self.outbox.as_ref(),
            NotificationIntent::new(
                NotificationKind::InterviewScheduled,
                &application.candidate_id.0,
                now,
            )
            .with("interview_id", &stored.id.0)
            .with("stage", stage.label())
            .with("scheduled_at", stored.scheduled_at.to_rfc3339()),
        );
        for member in &stored.panel {
            enqueue_best_effort(
                self.outbox.as_ref(),
                NotificationIntent::new(NotificationKind::PanelInvitation, &member.0, now)
                    .with("interview_id", &stored.id.0)
                    .with("stage", stage.label())
                    .with("scheduled_at", stored.scheduled_at.to_rfc3339()),
            );
        }

        Ok(stored)
    }

    /// Cancels a scheduled interview, releasing its `(application, stage)`
    /// slot. Cancelling twice is a no-op.
    pub fn cancel_interview(&self, interview_id: &InterviewId) -> Result<Interview, LifecycleError> {
        let mut interview = self.load_interview(interview_id)?;

        match interview.status {
            InterviewStatus::Cancelled => return Ok(interview),
            InterviewStatus::Completed => {
                return Err(LifecycleError::state(
                    "cannot cancel a completed interview",
                ))
            }
            InterviewStatus::Scheduled => {}
        }

        interview.status = InterviewStatus::Cancelled;
        self.repository.update_interview(interview.clone())?;
        Ok(interview)
    }

    /// Records one panel member's score, replacing any prior submission by
    /// the same interviewer.
    pub fn submit_feedback(
        &self,
        interview_id: &InterviewId,
        interviewer: &EmployeeId,
        score: u8,
        comments: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Interview, LifecycleError> {
        if score > 100 {
            return Err(LifecycleError::validation(
                "feedback score must be between 0 and 100",
            ));
        }

        let mut interview = self.load_interview(interview_id)?;

        if interview.status == InterviewStatus::Cancelled {
            return Err(LifecycleError::state(
                "cannot submit feedback for a cancelled interview",
            ));
        }

        if !interview.panel.contains(interviewer) {
            return Err(LifecycleError::forbidden(
                "only listed panel members may submit feedback",
            ));
        }

        interview.record_feedback(FeedbackRecord {
            interviewer: interviewer.clone(),
            score,
            comments: comments.into(),
            submitted_at: now,
        });
        self.repository.update_interview(interview.clone())?;
        Ok(interview)
    }

    /// Arithmetic mean of all feedback scores for an interview; 0 if none.
    pub fn average_score(&self, interview_id: &InterviewId) -> Result<f32, LifecycleError> {
        Ok(self.load_interview(interview_id)?.average_score())
    }

    /// Ranks a requisition's applications by best interview average plus the
    /// referral bonus, ties broken by earliest submission.
    pub fn rank_applications(
        &self,
        requisition_id: &RequisitionId,
    ) -> Result<Vec<RankedApplication>, LifecycleError> {
        let applications = self.repository.applications_for(requisition_id)?;

        let mut ranked = Vec::with_capacity(applications.len());
        for application in applications {
            let best_average = self
                .repository
                .interviews_for(&application.id)?
                .iter()
                .filter(|interview| interview.is_active())
                .map(Interview::average_score)
                .fold(0.0_f32, f32::max);

            let bonus = if self.repository.is_referred(&application.candidate_id)? {
                REFERRAL_BONUS
            } else {
                0.0
            };

            ranked.push(RankedApplication {
                application_id: application.id,
                candidate_id: application.candidate_id,
                ranking_score: best_average + bonus,
                created_at: application.created_at,
            });
        }

        ranked.sort_by(|a, b| {
            b.ranking_score
                .total_cmp(&a.ranking_score)
                .then(a.created_at.cmp(&b.created_at))
        });

        Ok(ranked)
    }

    fn load_application(&self, id: &ApplicationId) -> Result<Application, LifecycleError> {
        self.repository
            .application(id)?
            .ok_or_else(|| LifecycleError::not_found(format!("application '{}' not found", id.0)))
    }

    fn load_interview(&self, id: &InterviewId) -> Result<Interview, LifecycleError> {
        self.repository
            .interview(id)?
            .ok_or_else(|| LifecycleError::not_found(format!("interview '{}' not found", id.0)))
    }
}
