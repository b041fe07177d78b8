use axum::http::{header, Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;
use tower::ServiceExt;

use crate::workflows::hiring::domain::{Recommendation, RequisitionId, Stage};
use crate::workflows::hiring::requisition::RequisitionDraft;

use super::common::{
    build_service, feedback, hr, interview_request, pipeline_router, read_json_body,
    submitted_application,
};

fn post(uri: &str, payload: serde_json::Value) -> Request<axum::body::Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&payload).expect("serializable payload"),
        ))
        .expect("request builds")
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::get(uri)
        .body(axum::body::Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn requisitions_are_created_and_published_over_http() {
    let (service, _, _) = build_service();
    let router = pipeline_router(service);

    let response = router
        .clone()
        .oneshot(post(
            "/api/v1/recruitment/jobs",
            json!({
                "requisition_id": "REQ-HTTP-1",
                "openings": 1,
                "hiring_manager": "hr-001",
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("publish_status"), Some(&json!("draft")));

    let response = router
        .oneshot(post(
            "/api/v1/recruitment/jobs/REQ-HTTP-1/publish",
            json!({}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("publish_status"), Some(&json!("published")));
}

#[tokio::test]
async fn applications_are_submitted_over_http() {
    let (service, _, _) = build_service();
    let requisition_id = RequisitionId("REQ-HTTP-2".to_string());
    service
        .create_requisition(
            requisition_id.clone(),
            RequisitionDraft {
                template_id: None,
                openings: 1,
                location: None,
                hiring_manager: hr(),
                posting_date: None,
                expiry_date: None,
            },
        )
        .expect("requisition created");
    service
        .publish_requisition(&requisition_id, Utc::now())
        .expect("requisition published");
    let router = pipeline_router(service);

    let response = router
        .oneshot(post(
            "/api/v1/recruitment/applications",
            json!({
                "candidate_id": "cand-042",
                "requisition_id": "REQ-HTTP-2",
                "assigned_hr": "hr-001",
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("current_stage"), Some(&json!("screening")));
    assert_eq!(payload.get("status"), Some(&json!("submitted")));
}

#[tokio::test]
async fn missing_entities_map_to_not_found() {
    let (service, _, _) = build_service();
    let router = pipeline_router(service);

    let response = router
        .oneshot(get("/api/v1/recruitment/applications/app-missing"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("kind"), Some(&json!("not_found")));
}

#[tokio::test]
async fn illegal_transitions_map_to_conflict() {
    let (service, _, _) = build_service();
    let application = submitted_application(&service, "REQ-HTTP-3");
    let router = pipeline_router(service);

    let response = router
        .oneshot(post(
            &format!("/api/v1/recruitment/applications/{}/status", application.id.0),
            json!({ "status": "hired", "actor": "hr-001" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("kind"), Some(&json!("state")));
}

#[tokio::test]
async fn past_schedule_times_map_to_unprocessable_temporal() {
    let (service, _, _) = build_service();
    let application = submitted_application(&service, "REQ-HTTP-4");
    let router = pipeline_router(service);

    let response = router
        .oneshot(post(
            &format!(
                "/api/v1/recruitment/applications/{}/interviews",
                application.id.0
            ),
            json!({
                "stage": "screening",
                "scheduled_at": Utc::now() - Duration::hours(1),
                "method": "video",
                "panel": ["alice", "bob"],
                "actor": "hr-001",
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("kind"), Some(&json!("temporal")));
}

#[tokio::test]
async fn empty_panels_map_to_unprocessable_validation() {
    let (service, _, _) = build_service();
    let application = submitted_application(&service, "REQ-HTTP-5");
    let router = pipeline_router(service);

    let response = router
        .oneshot(post(
            &format!(
                "/api/v1/recruitment/applications/{}/interviews",
                application.id.0
            ),
            json!({
                "stage": "screening",
                "scheduled_at": Utc::now() + Duration::days(1),
                "method": "video",
                "panel": [],
                "actor": "hr-001",
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("kind"), Some(&json!("validation")));
}

#[tokio::test]
async fn feedback_route_reports_the_composite_on_completion() {
    let (service, _, _) = build_service();
    let application = submitted_application(&service, "REQ-HTTP-6");
    let mut request = interview_request(Stage::Screening);
    request.scheduled_at = Utc::now() + Duration::days(1);
    let interview = service
        .schedule_interview(&application.id, request, hr(), Utc::now())
        .expect("interview scheduled");
    service
        .submit_interview_feedback(
            &interview.id,
            feedback("alice", Recommendation::Hire),
            Utc::now(),
        )
        .expect("first feedback accepted");
    let router = pipeline_router(service);

    let response = router
        .oneshot(post(
            &format!("/api/v1/recruitment/interviews/{}/feedback", interview.id.0),
            json!({
                "interviewer_id": "bob",
                "scores": { "technical": 8, "communication": 8, "culture_fit": 7, "overall": 8 },
                "comments": "good depth",
                "recommendation": "hire",
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("composite_recommendation"),
        Some(&json!("hire"))
    );
}

#[tokio::test]
async fn reject_route_defaults_the_actor() {
    let (service, _, _) = build_service();
    let application = submitted_application(&service, "REQ-HTTP-7");
    let router = pipeline_router(service);

    let response = router
        .oneshot(post(
            &format!("/api/v1/recruitment/applications/{}/reject", application.id.0),
            json!({}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status"), Some(&json!("rejected")));
}
