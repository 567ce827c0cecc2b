//! HTTP surface for the onboarding workflow.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::directory::EmployeeId;
use crate::workflows::error::LifecycleError;

use super::domain::{OnboardingId, OnboardingTask, TaskPatch};
use super::repository::{DocumentUpload, OnboardingRepository};
use super::service::OnboardingOrchestrator;

/// Shared handle for the onboarding service.
pub struct OnboardingState<R> {
    pub orchestrator: Arc<OnboardingOrchestrator<R>>,
}

impl<R> Clone for OnboardingState<R> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
        }
    }
}

/// Router builder exposing the onboarding operations.
pub fn onboarding_router<R>(state: OnboardingState<R>) -> Router
where
    R: OnboardingRepository + 'static,
{
    Router::new()
        .route("/api/v1/onboarding", post(create_handler::<R>))
        .route(
            "/api/v1/onboarding/:onboarding_id",
            get(fetch_handler::<R>),
        )
        .route(
            "/api/v1/onboarding/:onboarding_id/tasks/:index",
            post(update_task_handler::<R>),
        )
        .route(
            "/api/v1/onboarding/:onboarding_id/tasks/:index/document",
            post(upload_document_handler::<R>),
        )
        .route(
            "/api/v1/onboarding/:onboarding_id/provision-system-access",
            post(provision_system_access_handler::<R>),
        )
        .route(
            "/api/v1/onboarding/:onboarding_id/schedule-access-provisioning",
            post(schedule_access_provisioning_handler::<R>),
        )
        .route(
            "/api/v1/onboarding/:onboarding_id/reserve-equipment",
            post(reserve_equipment_handler::<R>),
        )
        .route(
            "/api/v1/onboarding/:onboarding_id/trigger-payroll-initiation",
            post(trigger_payroll_initiation_handler::<R>),
        )
        .route(
            "/api/v1/onboarding/:onboarding_id/process-signing-bonus",
            post(process_signing_bonus_handler::<R>),
        )
        .route(
            "/api/v1/onboarding/:onboarding_id/cancel",
            post(cancel_handler::<R>),
        )
        .route(
            "/api/v1/onboarding/reminders/run",
            post(run_reminders_handler::<R>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CreateOnboardingRequest {
    employee_id: String,
    #[serde(default)]
    tasks: Option<Vec<OnboardingTask>>,
}

async fn create_handler<R>(
    State(state): State<OnboardingState<R>>,
    Json(request): Json<CreateOnboardingRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: OnboardingRepository + 'static,
{
    let onboarding = state.orchestrator.create_onboarding(
        &EmployeeId(request.employee_id),
        request.tasks,
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": "Onboarding checklist created",
        "onboarding": onboarding,
    })))
}

async fn fetch_handler<R>(
    State(state): State<OnboardingState<R>>,
    Path(onboarding_id): Path<String>,
) -> Result<Json<Value>, LifecycleError>
where
    R: OnboardingRepository + 'static,
{
    let onboarding = state.orchestrator.onboarding(&OnboardingId(onboarding_id))?;
    Ok(Json(json!({ "onboarding": onboarding })))
}

async fn update_task_handler<R>(
    State(state): State<OnboardingState<R>>,
    Path((onboarding_id, index)): Path<(String, usize)>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Value>, LifecycleError>
where
    R: OnboardingRepository + 'static,
{
    let onboarding = state.orchestrator.update_task(
        &OnboardingId(onboarding_id),
        index,
        patch,
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": "Task updated",
        "onboarding": onboarding,
    })))
}

#[derive(Debug, Deserialize)]
struct UploadDocumentRequest {
    file_name: String,
    content_type: String,
    content: String,
}

async fn upload_document_handler<R>(
    State(state): State<OnboardingState<R>>,
    Path((onboarding_id, index)): Path<(String, usize)>,
    Json(request): Json<UploadDocumentRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: OnboardingRepository + 'static,
{
    let upload = DocumentUpload {
        file_name: request.file_name,
        content_type: request.content_type,
        bytes: request.content.into_bytes(),
    };
    let onboarding = state.orchestrator.upload_task_document(
        &OnboardingId(onboarding_id),
        index,
        upload,
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": "Document attached",
        "onboarding": onboarding,
    })))
}

async fn provision_system_access_handler<R>(
    State(state): State<OnboardingState<R>>,
    Path(onboarding_id): Path<String>,
) -> Result<Json<Value>, LifecycleError>
where
    R: OnboardingRepository + 'static,
{
    let onboarding = state
        .orchestrator
        .provision_system_access(&OnboardingId(onboarding_id), Utc::now())?;
    Ok(Json(json!({
        "message": "System access provisioned",
        "onboarding": onboarding,
    })))
}

async fn schedule_access_provisioning_handler<R>(
    State(state): State<OnboardingState<R>>,
    Path(onboarding_id): Path<String>,
) -> Result<Json<Value>, LifecycleError>
where
    R: OnboardingRepository + 'static,
{
    let onboarding = state
        .orchestrator
        .schedule_access_provisioning(&OnboardingId(onboarding_id), Utc::now())?;
    Ok(Json(json!({
        "message": "Access provisioning scheduled",
        "onboarding": onboarding,
    })))
}

async fn reserve_equipment_handler<R>(
    State(state): State<OnboardingState<R>>,
    Path(onboarding_id): Path<String>,
) -> Result<Json<Value>, LifecycleError>
where
    R: OnboardingRepository + 'static,
{
    let onboarding = state
        .orchestrator
        .reserve_equipment(&OnboardingId(onboarding_id), Utc::now())?;
    Ok(Json(json!({
        "message": "Equipment reserved",
        "onboarding": onboarding,
    })))
}

async fn trigger_payroll_initiation_handler<R>(
    State(state): State<OnboardingState<R>>,
    Path(onboarding_id): Path<String>,
) -> Result<Json<Value>, LifecycleError>
where
    R: OnboardingRepository + 'static,
{
    let onboarding = state
        .orchestrator
        .trigger_payroll_initiation(&OnboardingId(onboarding_id), Utc::now())?;
    Ok(Json(json!({
        "message": "Payroll initiation triggered",
        "onboarding": onboarding,
    })))
}

async fn process_signing_bonus_handler<R>(
    State(state): State<OnboardingState<R>>,
    Path(onboarding_id): Path<String>,
) -> Result<Json<Value>, LifecycleError>
where
    R: OnboardingRepository + 'static,
{
    let onboarding = state
        .orchestrator
        .process_signing_bonus(&OnboardingId(onboarding_id), Utc::now())?;
    Ok(Json(json!({
        "message": "Signing bonus processed",
        "onboarding": onboarding,
    })))
}

#[derive(Debug, Deserialize)]
struct CancelOnboardingRequest {
    reason: String,
}

async fn cancel_handler<R>(
    State(state): State<OnboardingState<R>>,
    Path(onboarding_id): Path<String>,
    Json(request): Json<CancelOnboardingRequest>,
) -> Result<Json<Value>, LifecycleError>
where
    R: OnboardingRepository + 'static,
{
    let onboarding = state.orchestrator.cancel_onboarding(
        &OnboardingId(onboarding_id),
        request.reason,
        Utc::now(),
    )?;
    Ok(Json(json!({
        "message": "Onboarding cancelled",
        "onboarding": onboarding,
    })))
}

async fn run_reminders_handler<R>(
    State(state): State<OnboardingState<R>>,
) -> Result<Json<Value>, LifecycleError>
where
    R: OnboardingRepository + 'static,
{
    let report = state.orchestrator.send_reminders(Utc::now())?;
    Ok(Json(json!({
        "message": "Reminder sweep completed",
        "reminded": report.reminded,
        "skipped": report.skipped,
    })))
}
