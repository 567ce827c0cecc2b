//! HTTP surface for the recruiting workflow.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::directory::{CandidateId, EmployeeId};
use crate::workflows::error::LifecycleError;

use super::domain::{
    ApplicationId, ApplicationStatus, InterviewId, OfferDecision, OfferId, OfferResponse,
    RequisitionId, Stage,
};
use super::interviews::InterviewScheduler;
use super::offers::OfferNegotiation;
use super::pipeline::ApplicationPipeline;
use super::repository::RecruitingRepository;

/// Shared handles for the three recruiting services.
pub struct RecruitingState<R> {
    pub pipeline: Arc<ApplicationPipeline<R>>,
    pub interviews: Arc<InterviewScheduler<R>>,
    pub offers: Arc<OfferNegotiation<R>>,
}

impl<R> Clone for RecruitingState<R> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            interviews: self.interviews.clone(),
            offers: self.offers.clone(),
        }
    }
}

/// Router builder exposing the recruiting operations.
pub fn recruiting_router<R>(state: RecruitingState<R>) -> Router
where
    R: RecruitingRepository + 'static,
{
    Router::new()
        .route("/api/v1/recruiting/applications", post(apply_handler::<R>))
        .route(
            "/api/v1/recruiting/applications/:application_id",
            get(application_handler::<R>),
        )
        .route(
            "/api/v1/recruiting/applications/:application_id/status",
            post(update_status_handler::<R>),
        )
        .route(
            "/api/v1/recruiting/requisitions/:requisition_id/ranking",
            get(ranking_handler::<R>),
        )
        .route(
            "/api/v1/recruiting/interviews",
            post(schedule_interview_handler::<R>),
        )
        .route(
            "/api/v1/recruiting/interviews/:interview_id/cancel",
            post(cancel_interview_handler::<R>),
        )
        .route(
            "/api/v1/recruiting/interviews/:interview_id/feedback",
            post(submit_feedback_handler::<R>),
        )
        .route(
            "/api/v1/recruiting/interviews/:interview_id/average",
            get(average_score_handler::<R>),
        )
        .route("/api/v1/recruiting/offers", post(create_offer_handler::<R>))
        .route(
            "/api/v1/recruiting/offers/:offer_id/response",
            post(respond_to_offer_handler::<R>),
        )
        .route(
            "/api/v1/recruiting/offers/:offer_id/finalize",
            post(finalize_offer_handler::<R>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ApplyRequest {
    candidate_id: String,
    requisition_id: String,
    #[serde(default)]
    referred_by: Option<String>,
}

async fn apply_handler<R>(
    State(state): State<RecruitingState<R>>,
    Json(request): Json<ApplyRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: RecruitingRepository + 'static,
{
    let application = state.pipeline.apply(
        CandidateId(request.candidate_id),
        RequisitionId(request.requisition_id),
        request.referred_by.map(EmployeeId),
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": "Application submitted",
        "application": application,
    })))
}

async fn application_handler<R>(
    State(state): State<RecruitingState<R>>,
    Path(application_id): Path<String>,
) -> Result<Json<Value>, LifecycleError>
where
    R: RecruitingRepository + 'static,
{
    let application = state
        .pipeline
        .application(&ApplicationId(application_id))?;
    Ok(Json(json!({ "application": application })))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: ApplicationStatus,
    actor: String,
}

async fn update_status_handler<R>(
    State(state): State<RecruitingState<R>>,
    Path(application_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: RecruitingRepository + 'static,
{
    let application = state.pipeline.update_status(
        &ApplicationId(application_id),
        request.status,
        &EmployeeId(request.actor),
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": format!("Application moved to '{}'", application.status.label()),
        "application": application,
    })))
}

async fn ranking_handler<R>(
    State(state): State<RecruitingState<R>>,
    Path(requisition_id): Path<String>,
) -> Result<Json<Value>, LifecycleError>
where
    R: RecruitingRepository + 'static,
{
    let ranking = state
        .interviews
        .rank_applications(&RequisitionId(requisition_id))?;
    Ok(Json(json!({ "ranking": ranking })))
}

#[derive(Debug, Deserialize)]
struct ScheduleInterviewRequest {
    application_id: String,
    stage: Stage,
    scheduled_at: DateTime<Utc>,
    #[serde(default)]
    panel: Option<Vec<String>>,
}

async fn schedule_interview_handler<R>(
    State(state): State<RecruitingState<R>>,
    Json(request): Json<ScheduleInterviewRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: RecruitingRepository + 'static,
{
    let panel = request
        .panel
        .map(|members| members.into_iter().map(EmployeeId).collect());
    let interview = state.interviews.schedule_interview(
        &ApplicationId(request.application_id),
        request.stage,
        request.scheduled_at,
        panel,
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": "Interview scheduled",
        "interview": interview,
    })))
}

async fn cancel_interview_handler<R>(
    State(state): State<RecruitingState<R>>,
    Path(interview_id): Path<String>,
) -> Result<Json<Value>, LifecycleError>
where
    R: RecruitingRepository + 'static,
{
    let interview = state
        .interviews
        .cancel_interview(&InterviewId(interview_id))?;
    Ok(Json(json!({
        "message": "Interview cancelled",
        "interview": interview,
    })))
}

#[derive(Debug, Deserialize)]
struct SubmitFeedbackRequest {
    interviewer: String,
    score: u8,
    #[serde(default)]
    comments: String,
}

async fn submit_feedback_handler<R>(
    State(state): State<RecruitingState<R>>,
    Path(interview_id): Path<String>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: RecruitingRepository + 'static,
{
    let interview = state.interviews.submit_feedback(
        &InterviewId(interview_id),
        &EmployeeId(request.interviewer),
        request.score,
        request.comments,
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": "Feedback recorded",
        "interview": interview,
    })))
}

async fn average_score_handler<R>(
    State(state): State<RecruitingState<R>>,
    Path(interview_id): Path<String>,
) -> Result<Json<Value>, LifecycleError>
where
    R: RecruitingRepository + 'static,
{
    let id = InterviewId(interview_id);
    let average = state.interviews.average_score(&id)?;
    Ok(Json(json!({
        "interview_id": id.0,
        "average_score": average,
    })))
}

#[derive(Debug, Deserialize)]
struct CreateOfferRequest {
    application_id: String,
    gross_salary: u32,
    deadline: DateTime<Utc>,
}

async fn create_offer_handler<R>(
    State(state): State<RecruitingState<R>>,
    Json(request): Json<CreateOfferRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: RecruitingRepository + 'static,
{
    let offer = state.offers.create_offer(
        &ApplicationId(request.application_id),
        request.gross_salary,
        request.deadline,
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": "Offer issued",
        "offer": offer,
    })))
}

#[derive(Debug, Deserialize)]
struct RespondToOfferRequest {
    response: OfferResponse,
}

async fn respond_to_offer_handler<R>(
    State(state): State<RecruitingState<R>>,
    Path(offer_id): Path<String>,
    Json(request): Json<RespondToOfferRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: RecruitingRepository + 'static,
{
    let offer = state
        .offers
        .respond_to_offer(&OfferId(offer_id), request.response, Utc::now())?;
    Ok(Json(json!({
        "message": format!("Offer {}", offer.applicant_response.label()),
        "offer": offer,
    })))
}

#[derive(Debug, Deserialize)]
struct FinalizeOfferRequest {
    decision: OfferDecision,
    actor: String,
}

async fn finalize_offer_handler<R>(
    State(state): State<RecruitingState<R>>,
    Path(offer_id): Path<String>,
    Json(request): Json<FinalizeOfferRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: RecruitingRepository + 'static,
{
    let offer = state.offers.finalize_offer(
        &OfferId(offer_id),
        request.decision,
        &EmployeeId(request.actor),
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": format!("Offer {}", offer.final_status.label()),
        "offer": offer,
    })))
}
