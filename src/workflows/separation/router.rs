//! HTTP surface for the separation workflow.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::directory::{Actor, EmployeeId, Role};
use crate::workflows::error::LifecycleError;

use super::clearance::ClearanceApprovalEngine;
use super::domain::{
    ChecklistId, ClearanceDepartment, ClearanceItemStatus, TerminationId, TerminationInitiator,
    TerminationPatch, TerminationStatus,
};
use super::repository::SeparationRepository;
use super::revocation::AccessRevocationCoordinator;
use super::termination::TerminationWorkflow;

/// Shared handles for the three separation services.
pub struct SeparationState<R> {
    pub terminations: Arc<TerminationWorkflow<R>>,
    pub clearance: Arc<ClearanceApprovalEngine<R>>,
    pub revocation: Arc<AccessRevocationCoordinator<R>>,
}

impl<R> Clone for SeparationState<R> {
    fn clone(&self) -> Self {
        Self {
            terminations: self.terminations.clone(),
            clearance: self.clearance.clone(),
            revocation: self.revocation.clone(),
        }
    }
}

/// Router builder exposing the separation operations.
pub fn separation_router<R>(state: SeparationState<R>) -> Router
where
    R: SeparationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/separation/terminations",
            post(create_termination_handler::<R>),
        )
        .route(
            "/api/v1/separation/terminations/:termination_id",
            get(termination_handler::<R>),
        )
        .route(
            "/api/v1/separation/terminations/:termination_id/status",
            post(update_status_handler::<R>),
        )
        .route(
            "/api/v1/separation/terminations/:termination_id/details",
            post(update_details_handler::<R>),
        )
        .route(
            "/api/v1/separation/clearances/:checklist_id",
            get(checklist_handler::<R>),
        )
        .route(
            "/api/v1/separation/clearances/:checklist_id/items",
            post(update_item_handler::<R>),
        )
        .route(
            "/api/v1/separation/clearances/reminders/run",
            post(run_reminders_handler::<R>),
        )
        .route(
            "/api/v1/separation/revocations",
            post(revoke_access_handler::<R>),
        )
        .with_state(state)
}

/// Authenticated principal as asserted by the (external) auth layer.
#[derive(Debug, Deserialize)]
struct ActorPayload {
    employee_id: String,
    roles: Vec<Role>,
}

impl From<ActorPayload> for Actor {
    fn from(payload: ActorPayload) -> Self {
        Actor::new(EmployeeId(payload.employee_id), payload.roles)
    }
}

#[derive(Debug, Deserialize)]
struct CreateTerminationRequest {
    employee_id: String,
    initiator: TerminationInitiator,
    actor: ActorPayload,
    termination_date: NaiveDate,
    reason: String,
}

async fn create_termination_handler<R>(
    State(state): State<SeparationState<R>>,
    Json(request): Json<CreateTerminationRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: SeparationRepository + 'static,
{
    let termination = state.terminations.create_termination_request(
        &EmployeeId(request.employee_id),
        request.initiator,
        &request.actor.into(),
        request.termination_date,
        request.reason,
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": "Termination request filed",
        "termination": termination,
    })))
}

async fn termination_handler<R>(
    State(state): State<SeparationState<R>>,
    Path(termination_id): Path<String>,
) -> Result<Json<Value>, LifecycleError>
where
    R: SeparationRepository + 'static,
{
    let termination = state
        .terminations
        .termination(&TerminationId(termination_id))?;
    Ok(Json(json!({ "termination": termination })))
}

#[derive(Debug, Deserialize)]
struct UpdateTerminationStatusRequest {
    status: TerminationStatus,
    actor: ActorPayload,
}

async fn update_status_handler<R>(
    State(state): State<SeparationState<R>>,
    Path(termination_id): Path<String>,
    Json(request): Json<UpdateTerminationStatusRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: SeparationRepository + 'static,
{
    let termination = state.terminations.update_status(
        &TerminationId(termination_id),
        request.status,
        &request.actor.into(),
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": format!("Termination request {}", termination.status.label()),
        "termination": termination,
    })))
}

async fn update_details_handler<R>(
    State(state): State<SeparationState<R>>,
    Path(termination_id): Path<String>,
    Json(patch): Json<TerminationPatch>,
) -> Result<Json<Value>, LifecycleError>
where
    R: SeparationRepository + 'static,
{
    let termination = state.terminations.update_details(
        &TerminationId(termination_id),
        patch,
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": "Termination request updated",
        "termination": termination,
    })))
}

async fn checklist_handler<R>(
    State(state): State<SeparationState<R>>,
    Path(checklist_id): Path<String>,
) -> Result<Json<Value>, LifecycleError>
where
    R: SeparationRepository + 'static,
{
    let checklist = state.clearance.checklist(&ChecklistId(checklist_id))?;
    Ok(Json(json!({ "checklist": checklist })))
}

#[derive(Debug, Deserialize)]
struct UpdateClearanceItemRequest {
    department: ClearanceDepartment,
    status: ClearanceItemStatus,
    actor: ActorPayload,
    #[serde(default)]
    comments: Option<String>,
    #[serde(default)]
    equipment_returned: Option<Vec<String>>,
}

async fn update_item_handler<R>(
    State(state): State<SeparationState<R>>,
    Path(checklist_id): Path<String>,
    Json(request): Json<UpdateClearanceItemRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: SeparationRepository + 'static,
{
    let checklist = state.clearance.update_item_status(
        &ChecklistId(checklist_id),
        request.department,
        request.status,
        &request.actor.into(),
        request.comments,
        request.equipment_returned,
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": format!(
            "Clearance item '{}' {}",
            request.department.label(),
            request.status.label()
        ),
        "checklist": checklist,
    })))
}

#[derive(Debug, Default, Deserialize)]
struct RunRemindersRequest {
    #[serde(default)]
    force: bool,
}

async fn run_reminders_handler<R>(
    State(state): State<SeparationState<R>>,
    Json(request): Json<RunRemindersRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: SeparationRepository + 'static,
{
    let report = state.clearance.send_reminders(Utc::now(), request.force)?;
    Ok(Json(json!({
        "message": "Clearance reminder sweep completed",
        "reminders": report.reminders,
        "escalations": report.escalations,
    })))
}

#[derive(Debug, Deserialize)]
struct RevokeAccessRequest {
    employee_id: String,
    actor: ActorPayload,
    reason: String,
}

async fn revoke_access_handler<R>(
    State(state): State<SeparationState<R>>,
    Json(request): Json<RevokeAccessRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: SeparationRepository + 'static,
{
    let record = state.revocation.revoke_access(
        &EmployeeId(request.employee_id),
        &request.actor.into(),
        request.reason,
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": "Access revoked",
        "revocation": record,
    })))
}
