use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::workflows::hiring::domain::{
    ActorId, Application, ApplicationId, ApplicationStatus, ApprovalDecision, ApproverRole,
    CandidateId, Compensation, FeedbackScores, InterviewMethod, Offer, Recommendation,
    RequisitionId, ReviewerId, Stage,
};
use crate::workflows::hiring::memory::{MemoryIntentSink, MemoryRepository};
use crate::workflows::hiring::offer::approval::{ApprovalPolicy, ApprovalRequest};
use crate::workflows::hiring::offer::OfferDraft;
use crate::workflows::hiring::requisition::RequisitionDraft;
use crate::workflows::hiring::schedule::InterviewRequest;
use crate::workflows::hiring::service::HiringPipelineService;
use crate::workflows::hiring::FeedbackSubmission;

pub(super) type TestService = HiringPipelineService<MemoryRepository, MemoryIntentSink>;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn hr() -> ActorId {
    ActorId("hr-001".to_string())
}

pub(super) fn default_policy() -> ApprovalPolicy {
    let roles: BTreeSet<ApproverRole> = ["hr_manager", "financial_approver"]
        .into_iter()
        .map(|role| ApproverRole(role.to_string()))
        .collect();
    ApprovalPolicy::new(roles)
}

pub(super) fn build_service() -> (TestService, Arc<MemoryRepository>, Arc<MemoryIntentSink>) {
    let repository = Arc::new(MemoryRepository::default());
    let intents = Arc::new(MemoryIntentSink::default());
    let service =
        HiringPipelineService::new(repository.clone(), intents.clone(), default_policy());
    (service, repository, intents)
}

pub(super) fn requisition_draft() -> RequisitionDraft {
    RequisitionDraft {
        template_id: Some("backend-engineer".to_string()),
        openings: 2,
        location: Some("Berlin".to_string()),
        hiring_manager: hr(),
        posting_date: None,
        expiry_date: Some(now() + Duration::days(60)),
    }
}

pub(super) fn published_requisition(service: &TestService, id: &str) -> RequisitionId {
    let requisition_id = RequisitionId(id.to_string());
    service
        .create_requisition(requisition_id.clone(), requisition_draft())
        .expect("requisition created");
    service
        .publish_requisition(&requisition_id, now())
        .expect("requisition published");
    requisition_id
}

pub(super) fn submitted_application(service: &TestService, requisition: &str) -> Application {
    let requisition_id = published_requisition(service, requisition);
    service
        .submit_application(
            CandidateId("cand-042".to_string()),
            requisition_id,
            Some(hr()),
            now(),
        )
        .expect("application submitted")
}

pub(super) fn panel() -> Vec<ReviewerId> {
    vec![
        ReviewerId("alice".to_string()),
        ReviewerId("bob".to_string()),
    ]
}

pub(super) fn interview_request(stage: Stage) -> InterviewRequest {
    InterviewRequest {
        stage,
        scheduled_at: now() + Duration::days(2),
        method: InterviewMethod::Video,
        panel: panel(),
        video_link: Some("https://meet.example/round".to_string()),
        calendar_ref: None,
    }
}

pub(super) fn scores(value: u8) -> FeedbackScores {
    FeedbackScores {
        technical: value,
        communication: value,
        culture_fit: value,
        overall: value,
    }
}

pub(super) fn feedback(reviewer: &str, recommendation: Recommendation) -> FeedbackSubmission {
    FeedbackSubmission {
        interviewer: ReviewerId(reviewer.to_string()),
        scores: scores(8),
        comments: "solid round".to_string(),
        recommendation,
    }
}

/// Walk an application through all three interview rounds so it lands at
/// the offer stage.
pub(super) fn application_at_offer(service: &TestService, requisition: &str) -> Application {
    let application = submitted_application(service, requisition);
    for stage in [
        Stage::Screening,
        Stage::DepartmentInterview,
        Stage::HrInterview,
    ] {
        let interview = service
            .schedule_interview(&application.id, interview_request(stage), hr(), now())
            .expect("interview scheduled");
        service
            .submit_interview_feedback(
                &interview.id,
                feedback("alice", Recommendation::Hire),
                now(),
            )
            .expect("first feedback accepted");
        service
            .submit_interview_feedback(&interview.id, feedback("bob", Recommendation::Hire), now())
            .expect("second feedback accepted");
    }
    service
        .get_application(&application.id)
        .expect("application present")
}

pub(super) fn offer_draft(application: &Application) -> OfferDraft {
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
        deadline: now() + Duration::days(14),
    }
}

pub(super) fn drafted_offer(service: &TestService, application: &Application) -> Offer {
    service
        .create_offer(&application.id, offer_draft(application), now())
        .expect("offer drafted")
}

pub(super) fn approval(approver: &str, role: &str, decision: ApprovalDecision) -> ApprovalRequest {
    ApprovalRequest {
        approver: ActorId(approver.to_string()),
        role: ApproverRole(role.to_string()),
        decision,
        comment: None,
    }
}

/// Offer with the full quorum approved, ready for a candidate response.
pub(super) fn approved_offer(service: &TestService, application: &Application) -> Offer {
    let offer = drafted_offer(service, application);
    service
        .record_offer_approval(
            &offer.id,
            approval("hr-001", "hr_manager", ApprovalDecision::Approved),
            now(),
        )
        .expect("hr approval recorded");
    service
        .record_offer_approval(
            &offer.id,
            approval("fin-007", "financial_approver", ApprovalDecision::Approved),
            now(),
        )
        .expect("finance approval recorded")
}

pub(super) fn pipeline_router(service: TestService) -> axum::Router {
    crate::workflows::hiring::router::hiring_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Bare application record for pure decision-function tests.
pub(super) fn application_fixture(stage: Stage, status: ApplicationStatus) -> Application {
    Application {
        id: ApplicationId("app-fixture".to_string()),
        candidate_id: CandidateId("cand-042".to_string()),
        requisition_id: RequisitionId("REQ-FIXTURE".to_string()),
        assigned_hr: Some(hr()),
        current_stage: stage,
        status,
        history: Vec::new(),
        submitted_at: now(),
    }
}
