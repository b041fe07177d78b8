use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use talentflow::config::AppConfig;
use talentflow::error::AppError;
use talentflow::telemetry;
use talentflow::workflows::hiring::{
    ActorId, ApplicationStatus, ApprovalDecision, ApprovalPolicy, ApprovalRequest, ApproverRole,
    CandidateId, Compensation, FeedbackScores, FeedbackSubmission, HiringPipelineService,
    InterviewMethod, InterviewRequest, MemoryIntentSink, MemoryRepository, OfferDraft,
    OfferResponse, PipelineServiceError, Recommendation, RequisitionDraft, RequisitionId,
    ReviewerId, Stage,
};
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Talentflow",
    about = "Run the hiring pipeline workflow service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk a candidate through the full pipeline against in-memory storage
    Demo,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo => run_demo(),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let policy = ApprovalPolicy::new(config.approvals.required_roles.clone());
    let service = Arc::new(HiringPipelineService::new(
        Arc::new(MemoryRepository::default()),
        Arc::new(MemoryIntentSink::default()),
        policy,
    ));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(talentflow::workflows::hiring::hiring_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hiring pipeline service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_demo() -> Result<(), AppError> {
    let repository = Arc::new(MemoryRepository::default());
    let intents = Arc::new(MemoryIntentSink::default());
    let service = HiringPipelineService::new(
        repository,
        intents.clone(),
        ApprovalPolicy::new(
            ["hr_manager", "financial_approver"]
                .into_iter()
                .map(|role| ApproverRole(role.to_string()))
                .collect(),
        ),
    );

    if let Err(error) = run_demo_pipeline(&service) {
        eprintln!("demo aborted: {error}");
        std::process::exit(1);
    }

    println!("\nOutbound intents emitted along the way");
    for intent in intents.events() {
        println!("- {intent:?}");
    }
    Ok(())
}

fn run_demo_pipeline(
    service: &HiringPipelineService<MemoryRepository, MemoryIntentSink>,
) -> Result<(), PipelineServiceError> {
    let now = Utc::now();
    let hr = ActorId("hr-001".to_string());

    println!("Hiring pipeline demo");

    let requisition_id = RequisitionId("REQ-2026-001".to_string());
    service.create_requisition(
        requisition_id.clone(),
        RequisitionDraft {
            template_id: Some("backend-engineer".to_string()),
            openings: 1,
            location: Some("Berlin".to_string()),
            hiring_manager: hr.clone(),
            posting_date: None,
            expiry_date: Some(now + Duration::days(60)),
        },
    )?;
    service.publish_requisition(&requisition_id, now)?;
    println!("- requisition {} published", requisition_id.0);

    let application = service.submit_application(
        CandidateId("cand-042".to_string()),
        requisition_id,
        Some(hr.clone()),
        now,
    )?;
    println!("- application {} submitted", application.id.0);

    for stage in [
        Stage::Screening,
        Stage::DepartmentInterview,
        Stage::HrInterview,
    ] {
        let interview = service.schedule_interview(
            &application.id,
            InterviewRequest {
                stage,
                scheduled_at: now + Duration::days(3),
                method: InterviewMethod::Video,
                panel: vec![
                    ReviewerId("alice".to_string()),
                    ReviewerId("bob".to_string()),
                ],
                video_link: Some("https://meet.example/int".to_string()),
                calendar_ref: None,
            },
            hr.clone(),
            now,
        )?;
        for (reviewer, recommendation) in
            [("alice", Recommendation::Hire), ("bob", Recommendation::Hire)]
        {
            service.submit_interview_feedback(
                &interview.id,
                FeedbackSubmission {
                    interviewer: ReviewerId(reviewer.to_string()),
                    scores: FeedbackScores {
                        technical: 8,
                        communication: 9,
                        culture_fit: 8,
                        overall: 8,
                    },
                    comments: "strong round".to_string(),
                    recommendation,
                },
                now,
            )?;
        }
        println!("- {} interview completed", stage.label());
    }

    let offer = service.create_offer(
        &application.id,
        OfferDraft {
            candidate_id: application.candidate_id.clone(),
            compensation: Compensation {
                gross_salary: 92_000,
                signing_bonus: Some(5_000),
            },
            benefits: ["health".to_string(), "pension".to_string()]
                .into_iter()
                .collect(),
            role: "Backend Engineer".to_string(),
            content: "We are pleased to offer you the role.".to_string(),
            deadline: now + Duration::days(14),
        },
        now,
    )?;
    println!("- offer {} drafted", offer.id.0);

    for (approver, role) in [("hr-001", "hr_manager"), ("fin-007", "financial_approver")] {
        service.record_offer_approval(
            &offer.id,
            ApprovalRequest {
                approver: ActorId(approver.to_string()),
                role: ApproverRole(role.to_string()),
                decision: ApprovalDecision::Approved,
                comment: None,
            },
            now,
        )?;
    }
    println!("- offer approved by quorum");

    service.respond_to_offer(&offer.id, OfferResponse::Accepted, now)?;
    let application = service.get_application(&application.id)?;
    println!(
        "- candidate accepted, application status is '{}'",
        application.status.label()
    );
    assert_eq!(application.status, ApplicationStatus::Hired);

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
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

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
