//! Requisitions, applications, interviews, and offers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::{CandidateId, EmployeeId};
use crate::workflows::error::LifecycleError;

/// Identifier wrapper for job requisitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequisitionId(pub String);

/// Identifier wrapper for candidate applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for scheduled interviews.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterviewId(pub String);

/// Identifier wrapper for offers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(pub String);

/// Publication state of a requisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    Draft,
    Published,
    Closed,
}

impl PublishStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::Published => "published",
            PublishStatus::Closed => "closed",
        }
    }
}

/// An open job posting with a bounded number of openings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requisition {
    pub id: RequisitionId,
    pub title: String,
    pub department: String,
    pub openings: u32,
    pub hired_count: u32,
    pub publish_status: PublishStatus,
    pub expiry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Requisition {
    /// Checks whether the posting can take a new application on `today`.
    pub fn accepting_applications(&self, today: NaiveDate) -> Result<(), LifecycleError> {
        match self.publish_status {
            PublishStatus::Published => {}
            PublishStatus::Draft => {
                return Err(LifecycleError::state(
                    "requisition has not been published yet",
                ))
            }
            PublishStatus::Closed => {
                return Err(LifecycleError::state("requisition has been closed"))
            }
        }

        if self.expiry_date < today {
            return Err(LifecycleError::state(format!(
                "requisition expired on {}",
                self.expiry_date
            )));
        }

        if self.hired_count >= self.openings {
            return Err(LifecycleError::capacity(format!(
                "All {} position(s) for this requisition have been filled",
                self.openings
            )));
        }

        Ok(())
    }

    /// Records a hire. The hired count can never exceed the openings.
    pub fn record_hire(&mut self) -> Result<(), LifecycleError> {
        if self.hired_count >= self.openings {
            return Err(LifecycleError::capacity(format!(
                "All {} position(s) for this requisition have been filled",
                self.openings
            )));
        }

        self.hired_count += 1;
        if self.hired_count >= self.openings {
            self.publish_status = PublishStatus::Closed;
        }

        Ok(())
    }

    pub fn is_filled(&self) -> bool {
        self.hired_count >= self.openings
    }
}

/// Application status; advances forward only, `rejected` and `hired` absorb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    InProcess,
    Offer,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::InProcess => "in_process",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Position along the forward ordering; `rejected` sits outside it.
    const fn ordinal(self) -> Option<u8> {
        match self {
            ApplicationStatus::Submitted => Some(0),
            ApplicationStatus::InProcess => Some(1),
            ApplicationStatus::Offer => Some(2),
            ApplicationStatus::Hired => Some(3),
            ApplicationStatus::Rejected => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Hired | ApplicationStatus::Rejected)
    }
}

/// The current step of an application within the hiring pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Screening,
    DepartmentInterview,
    HrInterview,
    Offer,
}

impl Stage {
    pub const fn label(self) -> &'static str {
        match self {
            Stage::Screening => "screening",
            Stage::DepartmentInterview => "department_interview",
            Stage::HrInterview => "hr_interview",
            Stage::Offer => "offer",
        }
    }

    /// Rough completion percentage shown to candidates.
    pub const fn progress(self) -> u8 {
        match self {
            Stage::Screening => 25,
            Stage::DepartmentInterview => 50,
            Stage::HrInterview => 75,
            Stage::Offer => 90,
        }
    }
}

/// Stage derived from a status change.
pub const fn stage_for(status: ApplicationStatus) -> Option<Stage> {
    match status {
        ApplicationStatus::Submitted => Some(Stage::Screening),
        ApplicationStatus::InProcess => Some(Stage::DepartmentInterview),
        ApplicationStatus::Offer | ApplicationStatus::Hired => Some(Stage::Offer),
        ApplicationStatus::Rejected => None,
    }
}

/// Immutable record of one status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub old_status: ApplicationStatus,
    pub new_status: ApplicationStatus,
    pub old_stage: Stage,
    pub new_stage: Stage,
    pub actor: EmployeeId,
    pub changed_at: DateTime<Utc>,
}

/// A candidate's bid for a requisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub candidate_id: CandidateId,
    pub requisition_id: RequisitionId,
    pub status: ApplicationStatus,
    pub stage: Stage,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub history: Vec<StatusChange>,
}

impl Application {
    pub fn new(
        id: ApplicationId,
        candidate_id: CandidateId,
        requisition_id: RequisitionId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            candidate_id,
            requisition_id,
            status: ApplicationStatus::Submitted,
            stage: Stage::Screening,
            progress: Stage::Screening.progress(),
            created_at: now,
            history: Vec::new(),
        }
    }

    /// Applies a status change, enforcing the forward-only ordering.
    ///
    /// `rejected` is reachable one-way from any non-terminal state; `hired`
    /// and `rejected` absorb. Every successful change appends an immutable
    /// history record.
    pub fn transition(
        &mut self,
        new_status: ApplicationStatus,
        actor: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        if self.status.is_terminal() {
            if self.status == new_status {
                return Ok(());
            }
            return Err(LifecycleError::state(format!(
                "application is already {} and can no longer change",
                self.status.label()
            )));
        }

        if new_status != ApplicationStatus::Rejected {
            let current = self
                .status
                .ordinal()
                .unwrap_or_default();
            let Some(next) = new_status.ordinal() else {
                return Err(LifecycleError::validation(
                    "unknown application status requested",
                ));
            };
            if next < current {
                return Err(LifecycleError::state(format!(
                    "cannot move application status backwards from '{}' to '{}'",
                    self.status.label(),
                    new_status.label()
                )));
            }
        }

        let old_status = self.status;
        let old_stage = self.stage;
        let new_stage = stage_for(new_status).unwrap_or(self.stage);

        self.status = new_status;
        self.stage = new_stage;
        if new_status == ApplicationStatus::Hired {
            self.progress = 100;
        } else if new_status != ApplicationStatus::Rejected {
            self.progress = new_stage.progress();
        }

        self.history.push(StatusChange {
            old_status,
            new_status,
            old_stage,
            new_stage,
            actor: actor.clone(),
            changed_at: now,
        });

        Ok(())
    }

    /// Moves the pipeline stage directly (used when an interview is booked).
    pub fn advance_stage(&mut self, stage: Stage) {
        self.stage = stage;
        self.progress = self.progress.max(stage.progress());
    }
}

/// Scheduling state of an interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl InterviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
        }
    }
}

/// One panel member's score for an interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub interviewer: EmployeeId,
    pub score: u8,
    pub comments: String,
    pub submitted_at: DateTime<Utc>,
}

/// A scheduled evaluation event for one stage of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub id: InterviewId,
    pub application_id: ApplicationId,
    pub stage: Stage,
    pub scheduled_at: DateTime<Utc>,
    pub panel: Vec<EmployeeId>,
    pub status: InterviewStatus,
    pub feedback: Vec<FeedbackRecord>,
    pub created_at: DateTime<Utc>,
}

impl Interview {
    pub fn is_active(&self) -> bool {
        self.status != InterviewStatus::Cancelled
    }

    /// Stores or replaces the feedback of one interviewer.
    pub fn record_feedback(&mut self, record: FeedbackRecord) {
        match self
            .feedback
            .iter_mut()
            .find(|existing| existing.interviewer == record.interviewer)
        {
            Some(existing) => *existing = record,
            None => self.feedback.push(record),
        }
    }

    /// Arithmetic mean of all submitted scores; 0 when none exist.
    pub fn average_score(&self) -> f32 {
        if self.feedback.is_empty() {
            return 0.0;
        }
        let total: u32 = self.feedback.iter().map(|record| u32::from(record.score)).sum();
        total as f32 / self.feedback.len() as f32
    }
}

/// Candidate side of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferResponse {
    Pending,
    Accepted,
    Rejected,
}

impl OfferResponse {
    pub const fn label(self) -> &'static str {
        match self {
            OfferResponse::Pending => "pending",
            OfferResponse::Accepted => "accepted",
            OfferResponse::Rejected => "rejected",
        }
    }

    pub const fn is_settled(self) -> bool {
        !matches!(self, OfferResponse::Pending)
    }
}

/// HR side of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferDecision {
    Pending,
    Approved,
    Rejected,
}

impl OfferDecision {
    pub const fn label(self) -> &'static str {
        match self {
            OfferDecision::Pending => "pending",
            OfferDecision::Approved => "approved",
            OfferDecision::Rejected => "rejected",
        }
    }

    pub const fn is_settled(self) -> bool {
        !matches!(self, OfferDecision::Pending)
    }
}

/// A compensation proposal tied to one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub application_id: ApplicationId,
    pub gross_salary: u32,
    pub deadline: DateTime<Utc>,
    pub applicant_response: OfferResponse,
    pub final_status: OfferDecision,
    pub signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Tag linking a candidate to the employee who referred them. Only used to
/// bias ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub candidate_id: CandidateId,
    pub referring_employee_id: EmployeeId,
}

/// One row of the requisition ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedApplication {
    pub application_id: ApplicationId,
    pub candidate_id: CandidateId,
    pub ranking_score: f32,
    pub created_at: DateTime<Utc>,
}
