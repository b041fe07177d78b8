use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ActorId, ApplicationId, ApplicationStatus, ApprovalDecision, ApproverRole, CandidateId,
    Compensation, FeedbackScores, InterviewId, InterviewMethod, OfferId, OfferResponse,
    Recommendation, RequisitionId, ReviewerId, Stage,
};
use super::feedback::{FeedbackError, FeedbackSubmission};
use super::offer::approval::ApprovalRequest;
use super::offer::response::ResponseError;
use super::offer::{OfferDraft, OfferError};
use super::repository::{IntentSink, PipelineRepository, RepositoryError};
use super::requisition::{RequisitionDraft, RequisitionError};
use super::schedule::{InterviewRequest, ScheduleError};
use super::service::{HiringPipelineService, PipelineServiceError};

/// Router builder exposing the pipeline orchestrator over HTTP.
pub fn hiring_router<R, S>(service: Arc<HiringPipelineService<R, S>>) -> Router
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    Router::new()
        .route("/api/v1/recruitment/jobs", post(create_requisition::<R, S>))
        .route(
            "/api/v1/recruitment/jobs/:job_id",
            get(get_requisition::<R, S>),
        )
        .route(
            "/api/v1/recruitment/jobs/:job_id/publish",
            post(publish_requisition::<R, S>),
        )
        .route(
            "/api/v1/recruitment/applications",
            post(submit_application::<R, S>),
        )
        .route(
            "/api/v1/recruitment/applications/:application_id",
            get(get_application::<R, S>),
        )
        .route(
            "/api/v1/recruitment/applications/:application_id/status",
            post(update_status::<R, S>),
        )
        .route(
            "/api/v1/recruitment/applications/:application_id/reject",
            post(reject_application::<R, S>),
        )
        .route(
            "/api/v1/recruitment/applications/:application_id/interviews",
            post(schedule_interview::<R, S>),
        )
        .route(
            "/api/v1/recruitment/interviews/:interview_id/cancel",
            post(cancel_interview::<R, S>),
        )
        .route(
            "/api/v1/recruitment/interviews/:interview_id/feedback",
            post(submit_feedback::<R, S>),
        )
        .route(
            "/api/v1/recruitment/applications/:application_id/offers",
            post(create_offer::<R, S>),
        )
        .route(
            "/api/v1/recruitment/offers/:offer_id",
            get(get_offer::<R, S>),
        )
        .route(
            "/api/v1/recruitment/offers/:offer_id/approvals",
            post(record_approval::<R, S>),
        )
        .route(
            "/api/v1/recruitment/offers/:offer_id/response",
            post(respond_to_offer::<R, S>),
        )
        .with_state(service)
}

/// Error classification surfaced to callers so remediation is obvious:
/// `validation` and `temporal` errors mean fix the request, `state` means
/// the entity refused the transition, `concurrency` means re-read and retry.
fn classify(error: &PipelineServiceError) -> (StatusCode, &'static str) {
    match error {
        PipelineServiceError::Requisition(inner) => match inner {
            RequisitionError::NoOpenings | RequisitionError::ExpiryBeforePosting => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation")
            }
            RequisitionError::Expired(_) => (StatusCode::CONFLICT, "temporal"),
            RequisitionError::NotDraft(_)
            | RequisitionError::NotAcceptingApplications(_)
            | RequisitionError::OpeningsFilled => (StatusCode::CONFLICT, "state"),
        },
        PipelineServiceError::Transition(_) => (StatusCode::CONFLICT, "state"),
        PipelineServiceError::Schedule(inner) => match inner {
            ScheduleError::Panel(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
            ScheduleError::ScheduledInPast { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "temporal")
            }
            ScheduleError::Transition(_)
            | ScheduleError::DuplicateActiveInterview { .. }
            | ScheduleError::NotCancellable(_) => (StatusCode::CONFLICT, "state"),
        },
        PipelineServiceError::Feedback(inner) => match inner {
            FeedbackError::ScoreOutOfRange { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation")
            }
            FeedbackError::InterviewNotActive(_)
            | FeedbackError::NotOnPanel { .. }
            | FeedbackError::DuplicateSubmission { .. } => (StatusCode::CONFLICT, "state"),
        },
        PipelineServiceError::Offer(inner) => match inner {
            OfferError::DeadlineNotFuture { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "temporal")
            }
            OfferError::CandidateMismatch(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
            OfferError::ApplicationNotAtOfferStage(_) | OfferError::Transition(_) => {
                (StatusCode::CONFLICT, "state")
            }
        },
        PipelineServiceError::Approval(_) => (StatusCode::CONFLICT, "state"),
        PipelineServiceError::Response(inner) => match inner {
            ResponseError::DeadlinePassed { .. } => (StatusCode::CONFLICT, "temporal"),
            ResponseError::NotOpen(_)
            | ResponseError::AlreadyResponded(_)
            | ResponseError::ApprovalPending(_) => (StatusCode::CONFLICT, "state"),
        },
        PipelineServiceError::Repository(inner) => match inner {
            RepositoryError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            RepositoryError::RevisionConflict { .. } => (StatusCode::CONFLICT, "concurrency"),
            RepositoryError::Conflict => (StatusCode::CONFLICT, "state"),
            RepositoryError::Unavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        },
    }
}

fn error_response(error: PipelineServiceError) -> Response {
    let (status, kind) = classify(&error);
    let payload = json!({
        "error": error.to_string(),
        "kind": kind,
    });
    (status, axum::Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRequisitionRequest {
    requisition_id: String,
    #[serde(default)]
    template_id: Option<String>,
    openings: u32,
    #[serde(default)]
    location: Option<String>,
    hiring_manager: String,
    #[serde(default)]
    posting_date: Option<DateTime<Utc>>,
    #[serde(default)]
    expiry_date: Option<DateTime<Utc>>,
}

pub(crate) async fn create_requisition<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    axum::Json(request): axum::Json<CreateRequisitionRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    let draft = RequisitionDraft {
        template_id: request.template_id,
        openings: request.openings,
        location: request.location,
        hiring_manager: ActorId(request.hiring_manager),
        posting_date: request.posting_date,
        expiry_date: request.expiry_date,
    };
    match service.create_requisition(RequisitionId(request.requisition_id), draft) {
        Ok(requisition) => (StatusCode::CREATED, axum::Json(requisition)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_requisition<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    match service.get_requisition(&RequisitionId(job_id)) {
        Ok(requisition) => (StatusCode::OK, axum::Json(requisition)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn publish_requisition<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    match service.publish_requisition(&RequisitionId(job_id), Utc::now()) {
        Ok(requisition) => (StatusCode::OK, axum::Json(requisition)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitApplicationRequest {
    candidate_id: String,
    requisition_id: String,
    #[serde(default)]
    assigned_hr: Option<String>,
}

pub(crate) async fn submit_application<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    axum::Json(request): axum::Json<SubmitApplicationRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    match service.submit_application(
        CandidateId(request.candidate_id),
        RequisitionId(request.requisition_id),
        request.assigned_hr.map(ActorId),
        Utc::now(),
    ) {
        Ok(application) => (StatusCode::CREATED, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_application<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    match service.get_application(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdateRequest {
    status: ApplicationStatus,
    actor: String,
}

pub(crate) async fn update_status<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<StatusUpdateRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    match service.update_application_status(
        &ApplicationId(application_id),
        request.status,
        ActorId(request.actor),
        Utc::now(),
    ) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectRequest {
    #[serde(default)]
    actor: Option<String>,
}

pub(crate) async fn reject_application<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<RejectRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    let actor = ActorId(request.actor.unwrap_or_else(|| "hr".to_string()));
    match service.reject_application(&ApplicationId(application_id), actor, Utc::now()) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleInterviewRequest {
    stage: Stage,
    scheduled_at: DateTime<Utc>,
    method: InterviewMethod,
    panel: Vec<String>,
    #[serde(default)]
    video_link: Option<String>,
    #[serde(default)]
    calendar_ref: Option<String>,
    actor: String,
}

pub(crate) async fn schedule_interview<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ScheduleInterviewRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    let interview_request = InterviewRequest {
        stage: request.stage,
        scheduled_at: request.scheduled_at,
        method: request.method,
        panel: request.panel.into_iter().map(ReviewerId).collect(),
        video_link: request.video_link,
        calendar_ref: request.calendar_ref,
    };
    match service.schedule_interview(
        &ApplicationId(application_id),
        interview_request,
        ActorId(request.actor),
        Utc::now(),
    ) {
        Ok(interview) => (StatusCode::CREATED, axum::Json(interview)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_interview<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    Path(interview_id): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    match service.cancel_interview(&InterviewId(interview_id)) {
        Ok(interview) => (StatusCode::OK, axum::Json(interview)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedbackRequest {
    interviewer_id: String,
    scores: FeedbackScores,
    #[serde(default)]
    comments: String,
    recommendation: Recommendation,
}

pub(crate) async fn submit_feedback<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    Path(interview_id): Path<String>,
    axum::Json(request): axum::Json<FeedbackRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    let submission = FeedbackSubmission {
        interviewer: ReviewerId(request.interviewer_id),
        scores: request.scores,
        comments: request.comments,
        recommendation: request.recommendation,
    };
    match service.submit_interview_feedback(&InterviewId(interview_id), submission, Utc::now()) {
        Ok(receipt) => {
            let payload = json!({
                "feedback": receipt.feedback,
                "interview": receipt.interview,
                "composite_recommendation": receipt.composite,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateOfferRequest {
    candidate_id: String,
    gross_salary: u64,
    #[serde(default)]
    signing_bonus: Option<u64>,
    #[serde(default)]
    benefits: BTreeSet<String>,
    role: String,
    content: String,
    deadline: DateTime<Utc>,
}

pub(crate) async fn create_offer<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<CreateOfferRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    let draft = OfferDraft {
        candidate_id: CandidateId(request.candidate_id),
        compensation: Compensation {
            gross_salary: request.gross_salary,
            signing_bonus: request.signing_bonus,
        },
        benefits: request.benefits,
        role: request.role,
        content: request.content,
        deadline: request.deadline,
    };
    match service.create_offer(&ApplicationId(application_id), draft, Utc::now()) {
        Ok(offer) => (StatusCode::CREATED, axum::Json(offer)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_offer<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    Path(offer_id): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    match service.get_offer(&OfferId(offer_id)) {
        Ok(offer) => (StatusCode::OK, axum::Json(offer)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordApprovalRequest {
    approver_id: String,
    role: String,
    decision: ApprovalDecision,
    #[serde(default)]
    comment: Option<String>,
}

pub(crate) async fn record_approval<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    Path(offer_id): Path<String>,
    axum::Json(request): axum::Json<RecordApprovalRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    let approval = ApprovalRequest {
        approver: ActorId(request.approver_id),
        role: ApproverRole(request.role),
        decision: request.decision,
        comment: request.comment,
    };
    match service.record_offer_approval(&OfferId(offer_id), approval, Utc::now()) {
        Ok(offer) => (StatusCode::OK, axum::Json(offer)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OfferResponseRequest {
    response: OfferResponse,
}

pub(crate) async fn respond_to_offer<R, S>(
    State(service): State<Arc<HiringPipelineService<R, S>>>,
    Path(offer_id): Path<String>,
    axum::Json(request): axum::Json<OfferResponseRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    match service.respond_to_offer(&OfferId(offer_id), request.response, Utc::now()) {
        Ok(offer) => (StatusCode::OK, axum::Json(offer)).into_response(),
        Err(error) => error_response(error),
    }
}
