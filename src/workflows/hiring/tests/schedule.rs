use chrono::Duration;

use crate::workflows::hiring::domain::{
    ApplicationStatus, InterviewId, InterviewStatus, Stage,
};
use crate::workflows::hiring::panel::PanelError;
use crate::workflows::hiring::repository::OutboundIntent;
use crate::workflows::hiring::schedule::{self, ScheduleError};
use crate::workflows::hiring::service::PipelineServiceError;
use crate::workflows::hiring::stage::TransitionError;

use super::common::{
    application_fixture, build_service, hr, interview_request, now, submitted_application,
};

#[test]
fn plan_rejects_schedule_times_not_in_the_future() {
    let application = application_fixture(Stage::Screening, ApplicationStatus::Submitted);
    for requested in [now(), now() - Duration::hours(1)] {
        let mut request = interview_request(Stage::Screening);
        request.scheduled_at = requested;
        let result = schedule::plan(
            &application,
            None,
            request,
            InterviewId("int-test".to_string()),
            now(),
        );
        assert!(matches!(
            result,
            Err(ScheduleError::ScheduledInPast { .. })
        ));
    }
}

#[test]
fn plan_rejects_an_empty_panel() {
    let application = application_fixture(Stage::Screening, ApplicationStatus::Submitted);
    let mut request = interview_request(Stage::Screening);
    request.panel.clear();
    let result = schedule::plan(
        &application,
        None,
        request,
        InterviewId("int-test".to_string()),
        now(),
    );
    assert!(matches!(
        result,
        Err(ScheduleError::Panel(PanelError::Empty))
    ));
}

#[test]
fn plan_rejects_stages_behind_the_application() {
    let application = application_fixture(Stage::HrInterview, ApplicationStatus::InProcess);
    let result = schedule::plan(
        &application,
        None,
        interview_request(Stage::Screening),
        InterviewId("int-test".to_string()),
        now(),
    );
    assert!(matches!(
        result,
        Err(ScheduleError::Transition(TransitionError::BackwardStage { .. }))
    ));
}

#[test]
fn plan_rejects_an_occupied_stage_slot() {
    let application = application_fixture(Stage::Screening, ApplicationStatus::Submitted);
    let existing = schedule::plan(
        &application,
        None,
        interview_request(Stage::Screening),
        InterviewId("int-a".to_string()),
        now(),
    )
    .expect("first interview plans");

    let result = schedule::plan(
        &application,
        Some(&existing),
        interview_request(Stage::Screening),
        InterviewId("int-b".to_string()),
        now(),
    );
    assert!(matches!(
        result,
        Err(ScheduleError::DuplicateActiveInterview {
            stage: Stage::Screening
        })
    ));
}

#[test]
fn only_scheduled_interviews_can_be_cancelled() {
    let application = application_fixture(Stage::Screening, ApplicationStatus::Submitted);
    let interview = schedule::plan(
        &application,
        None,
        interview_request(Stage::Screening),
        InterviewId("int-a".to_string()),
        now(),
    )
    .expect("interview plans");

    let cancelled = schedule::cancel(&interview).expect("cancellable");
    assert_eq!(cancelled.status, InterviewStatus::Cancelled);

    let result = schedule::cancel(&cancelled);
    assert!(matches!(
        result,
        Err(ScheduleError::NotCancellable(InterviewStatus::Cancelled))
    ));
}

#[test]
fn scheduling_advances_the_application_and_emits_intents() {
    let (service, _, intents) = build_service();
    let application = submitted_application(&service, "REQ-SCHED-1");

    let interview = service
        .schedule_interview(
            &application.id,
            interview_request(Stage::DepartmentInterview),
            hr(),
            now(),
        )
        .expect("interview scheduled");
    assert_eq!(interview.status, InterviewStatus::Scheduled);

    let updated = service
        .get_application(&application.id)
        .expect("application present");
    assert_eq!(updated.current_stage, Stage::DepartmentInterview);
    assert_eq!(updated.status, ApplicationStatus::InProcess);
    assert_eq!(updated.history.len(), 1);

    let events = intents.events();
    assert!(events
        .iter()
        .any(|intent| matches!(intent, OutboundIntent::CalendarEventCreate { .. })));
    assert!(events.iter().any(|intent| matches!(
        intent,
        OutboundIntent::StageAdvanced { stage: Stage::DepartmentInterview, .. }
    )));
}

#[test]
fn duplicate_slot_is_refused_through_the_service() {
    let (service, _, _) = build_service();
    let application = submitted_application(&service, "REQ-SCHED-2");

    service
        .schedule_interview(
            &application.id,
            interview_request(Stage::Screening),
            hr(),
            now(),
        )
        .expect("first interview scheduled");

    let result = service.schedule_interview(
        &application.id,
        interview_request(Stage::Screening),
        hr(),
        now(),
    );
    assert!(matches!(
        result,
        Err(PipelineServiceError::Schedule(
            ScheduleError::DuplicateActiveInterview { .. }
        ))
    ));
}

#[test]
fn cancelling_frees_the_stage_slot() {
    let (service, _, _) = build_service();
    let application = submitted_application(&service, "REQ-SCHED-3");

    let interview = service
        .schedule_interview(
            &application.id,
            interview_request(Stage::Screening),
            hr(),
            now(),
        )
        .expect("interview scheduled");
    service
        .cancel_interview(&interview.id)
        .expect("interview cancelled");

    let replacement = service
        .schedule_interview(
            &application.id,
            interview_request(Stage::Screening),
            hr(),
            now(),
        )
        .expect("slot is free again");
    assert_ne!(replacement.id, interview.id);
}
