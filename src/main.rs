use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Extension;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::{info, warn};

use staffline::config::AppConfig;
use staffline::demo;
use staffline::directory::memory::MemoryDirectory;
use staffline::directory::{Actor, CandidateId, EmployeeId, Role};
use staffline::error::AppError;
use staffline::notifications::{
    MemoryOutbox, NotificationIntent, NotificationTransport, OutboxWorker, TransportError,
};
use staffline::telemetry;
use staffline::workflows::onboarding::{
    onboarding_router, MemoryDocumentStore, MemoryOnboardingRepository, OnboardingOrchestrator,
    OnboardingState,
};
use staffline::workflows::error::LifecycleError;
use staffline::workflows::recruiting::{
    recruiting_router, ApplicationPipeline, ApplicationStatus, InterviewScheduler,
    MemoryRecruitingRepository, OfferDecision, OfferNegotiation, OfferResponse, RecruitingState,
    RequisitionId, Stage,
};
use staffline::workflows::separation::{
    separation_router, standard_actions, AccessRevocationCoordinator, ClearanceApprovalEngine,
    ClearanceDepartment, ClearanceItemStatus, MemorySeparationRepository, SeparationRepository,
    SeparationState, TerminationInitiator, TerminationStatus, TerminationWorkflow,
};

#[derive(Parser, Debug)]
#[command(
    name = "staffline",
    about = "Employee lifecycle workflow engine for HR administration"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default).
    Serve(ServeArgs),
    /// Run a scripted hire-to-exit walkthrough against seeded in-memory data.
    Demo,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured bind host.
    #[arg(long)]
    host: Option<String>,
    /// Override the configured bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(args).await,
        Command::Demo => run_demo(),
    }
}

/// Everything the HTTP layer shares outside the workflow states.
#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

/// Transport used when no real mail/chat gateway is wired in: every intent
/// is logged and counted as delivered.
struct LoggingTransport;

impl NotificationTransport for LoggingTransport {
    fn send(&self, intent: &NotificationIntent) -> Result<(), TransportError> {
        info!(
            template = intent.kind.template_key(),
            recipient = %intent.recipient,
            "delivering notification"
        );
        Ok(())
    }
}

/// The full in-memory service stack behind the routers.
struct Services {
    directory: Arc<MemoryDirectory>,
    recruiting_repository: Arc<MemoryRecruitingRepository>,
    separation_repository: Arc<MemorySeparationRepository>,
    outbox: MemoryOutbox,
    pipeline: Arc<ApplicationPipeline<MemoryRecruitingRepository>>,
    interviews: Arc<InterviewScheduler<MemoryRecruitingRepository>>,
    offers: Arc<OfferNegotiation<MemoryRecruitingRepository>>,
    onboarding: Arc<OnboardingOrchestrator<MemoryOnboardingRepository>>,
    terminations: Arc<TerminationWorkflow<MemorySeparationRepository>>,
    clearance: Arc<ClearanceApprovalEngine<MemorySeparationRepository>>,
    revocation: Arc<AccessRevocationCoordinator<MemorySeparationRepository>>,
}

fn build_services() -> Services {
    let directory = Arc::new(MemoryDirectory::default());
    let recruiting_repository = Arc::new(MemoryRecruitingRepository::default());
    let onboarding_repository = Arc::new(MemoryOnboardingRepository::default());
    let separation_repository = Arc::new(MemorySeparationRepository::default());
    let outbox = MemoryOutbox::default();

    let pipeline = Arc::new(ApplicationPipeline::new(
        recruiting_repository.clone(),
        Arc::new(outbox.clone()),
    ));
    let interviews = Arc::new(InterviewScheduler::new(
        recruiting_repository.clone(),
        directory.clone(),
        Arc::new(outbox.clone()),
    ));
    let offers = Arc::new(OfferNegotiation::new(
        recruiting_repository.clone(),
        pipeline.clone(),
        Arc::new(outbox.clone()),
    ));
    let onboarding = Arc::new(OnboardingOrchestrator::new(
        onboarding_repository,
        directory.clone(),
        Arc::new(MemoryDocumentStore::default()),
        Arc::new(outbox.clone()),
    ));
    let revocation = Arc::new(AccessRevocationCoordinator::new(
        separation_repository.clone(),
        directory.clone(),
        Arc::new(outbox.clone()),
        standard_actions(),
    ));
    let terminations = Arc::new(TerminationWorkflow::new(
        separation_repository.clone(),
        directory.clone(),
        directory.clone(),
        directory.clone(),
    ));
    let clearance = Arc::new(ClearanceApprovalEngine::new(
        separation_repository.clone(),
        directory.clone(),
        Arc::new(outbox.clone()),
        revocation.clone(),
        onboarding.clone(),
    ));

    Services {
        directory,
        recruiting_repository,
        separation_repository,
        outbox,
        pipeline,
        interviews,
        offers,
        onboarding,
        terminations,
        clearance,
        revocation,
    }
}

fn build_router(services: &Services, readiness: Arc<AtomicBool>) -> Router {
    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
    let state = AppState {
        readiness,
        metrics: metric_handle,
    };

    let recruiting = recruiting_router(RecruitingState {
        pipeline: services.pipeline.clone(),
        interviews: services.interviews.clone(),
        offers: services.offers.clone(),
    });
    let onboarding = onboarding_router(OnboardingState {
        orchestrator: services.onboarding.clone(),
    });
    let separation = separation_router(SeparationState {
        terminations: services.terminations.clone(),
        clearance: services.clearance.clone(),
        revocation: services.revocation.clone(),
    });

    Router::new()
        .merge(recruiting)
        .merge(onboarding)
        .merge(separation)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(Extension(state))
        .layer(prometheus_layer)
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn spawn_background_tasks(services: &Services, config: &AppConfig) {
    let sweep_interval = Duration::from_secs(config.sweeps.sweep_interval_secs);
    let onboarding = services.onboarding.clone();
    let clearance = services.clearance.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        // The first tick fires immediately; skip it so a restart loop does
        // not spam reminders.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match onboarding.send_reminders(Utc::now()) {
                Ok(report) => info!(
                    reminded = report.reminded,
                    skipped = report.skipped,
                    "onboarding reminder sweep finished"
                ),
                Err(err) => warn!(%err, "onboarding reminder sweep failed"),
            }
            match clearance.send_reminders(Utc::now(), false) {
                Ok(report) => info!(
                    reminders = report.reminders,
                    escalations = report.escalations,
                    "clearance reminder sweep finished"
                ),
                Err(err) => warn!(%err, "clearance reminder sweep failed"),
            }
        }
    });

    let outbox_interval = Duration::from_secs(config.sweeps.outbox_interval_secs);
    let worker = OutboxWorker::new(services.outbox.clone(), Arc::new(LoggingTransport));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(outbox_interval);
        loop {
            ticker.tick().await;
            let report = worker.deliver_pending();
            if report.delivered + report.retried + report.dropped > 0 {
                info!(
                    delivered = report.delivered,
                    retried = report.retried,
                    dropped = report.dropped,
                    "outbox pass finished"
                );
            }
        }
    });
}

async fn serve(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let readiness = Arc::new(AtomicBool::new(false));
    let services = build_services();
    demo::seed(&services.directory, &services.recruiting_repository)?;
    spawn_background_tasks(&services, &config);

    let app = build_router(&services, readiness.clone());
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness.store(true, Ordering::Relaxed);
    info!(
        environment = ?config.environment,
        %addr,
        "staffline listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Walks one candidate from application to hire and one employee from
/// resignation to settlement, printing each step.
fn run_demo() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let services = build_services();
    demo::seed(&services.directory, &services.recruiting_repository)?;
    let now = Utc::now();

    // Hire.
    let application = services.pipeline.apply(
        CandidateId("cand-demo".to_string()),
        RequisitionId("req-backend".to_string()),
        Some(EmployeeId("emp-002".to_string())),
        now,
    )?;
    println!("application {} submitted", application.id.0);

    let hr = EmployeeId("emp-101".to_string());
    services.pipeline.update_status(
        &application.id,
        ApplicationStatus::InProcess,
        &hr,
        now,
    )?;
    let interview = services.interviews.schedule_interview(
        &application.id,
        Stage::DepartmentInterview,
        now + chrono::Duration::days(3),
        Some(vec![EmployeeId("emp-001".to_string())]),
        now,
    )?;
    services.interviews.submit_feedback(
        &interview.id,
        &EmployeeId("emp-001".to_string()),
        5,
        "strong systems background".to_string(),
        now,
    )?;
    let average = services.interviews.average_score(&interview.id)?;
    println!("interview {} scored {average:.1}", interview.id.0);

    let offer = services.offers.create_offer(
        &application.id,
        78_000,
        now + chrono::Duration::days(14),
        now,
    )?;
    services
        .offers
        .respond_to_offer(&offer.id, OfferResponse::Accepted, now)?;
    services
        .offers
        .finalize_offer(&offer.id, OfferDecision::Approved, &hr, now)?;
    let hired = services.pipeline.application(&application.id)?;
    println!(
        "offer {} approved, application now '{}'",
        offer.id.0,
        hired.status.label()
    );

    // Onboard an existing junior hire.
    let onboarding = services.onboarding.create_onboarding(
        &EmployeeId("emp-003".to_string()),
        None,
        now,
    )?;
    println!(
        "onboarding {} created with {} task(s)",
        onboarding.id.0,
        onboarding.tasks.len()
    );

    // Exit.
    let leaver = EmployeeId("emp-002".to_string());
    let request = services.terminations.create_termination_request(
        &leaver,
        TerminationInitiator::Employee,
        &Actor::new(leaver.clone(), [Role::Employee]),
        (now + chrono::Duration::days(30)).date_naive(),
        "relocating".to_string(),
        now,
    )?;
    services.terminations.update_status(
        &request.id,
        TerminationStatus::Approved,
        &Actor::new(hr.clone(), [Role::HrStaff]),
        now,
    )?;
    let checklist = services
        .separation_repository
        .checklist_for_termination(&request.id)
        .map_err(LifecycleError::from)?
        .ok_or_else(|| LifecycleError::not_found("clearance checklist missing after approval"))?;
    println!("clearance checklist {} opened", checklist.id.0);

    let decisions: [(ClearanceDepartment, &str, Role); 6] = [
        (ClearanceDepartment::LineManager, "emp-001", Role::LineManager),
        (ClearanceDepartment::Finance, "emp-301", Role::FinanceOfficer),
        (ClearanceDepartment::Hr, "emp-102", Role::HrManager),
        (ClearanceDepartment::It, "emp-201", Role::ItAdmin),
        (ClearanceDepartment::Facilities, "emp-401", Role::FacilitiesOfficer),
        (ClearanceDepartment::Admin, "emp-501", Role::AdminOfficer),
    ];
    for (department, approver, role) in decisions {
        let equipment = (department == ClearanceDepartment::Facilities)
            .then(|| vec!["laptop".to_string(), "access_badge".to_string()]);
        let updated = services.clearance.update_item_status(
            &checklist.id,
            department,
            ClearanceItemStatus::Approved,
            &Actor::new(EmployeeId(approver.to_string()), [role]),
            None,
            equipment,
            now,
        )?;
        println!(
            "clearance '{}' approved by {approver} ({})",
            department.label(),
            if updated.completed { "complete" } else { "open" }
        );
    }

    let settlement = services
        .separation_repository
        .settlement_for_termination(&request.id)
        .map_err(LifecycleError::from)?
        .ok_or_else(|| LifecycleError::not_found("final settlement missing after clearance"))?;
    println!(
        "final settlement {} queued with {} component(s)",
        settlement.id.0,
        settlement.components.len()
    );

    let worker = OutboxWorker::new(services.outbox.clone(), Arc::new(LoggingTransport));
    let report = worker.deliver_pending();
    println!(
        "notifications: {} delivered, {} retried, {} dropped",
        report.delivered, report.retried, report.dropped
    );

    Ok(())
}
