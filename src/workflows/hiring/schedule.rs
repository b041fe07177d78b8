use chrono::{DateTime, Utc};

use super::domain::{
    Application, Interview, InterviewId, InterviewMethod, InterviewStatus, Recommendation,
    ReviewerId, Stage,
};
use super::panel::{validate_panel, PanelError};
use super::stage::{authorize, TransitionError, TransitionRequest};

/// Rejections raised while scheduling or cancelling interviews.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("interview must be scheduled after the current time, got {requested}")]
    ScheduledInPast { requested: DateTime<Utc> },
    #[error("an active interview already exists for stage '{}'", stage.label())]
    DuplicateActiveInterview { stage: Stage },
    #[error("only scheduled interviews can be cancelled, interview is '{}'", .0.label())]
    NotCancellable(InterviewStatus),
}

/// Inbound payload for scheduling an interview round.
#[derive(Debug, Clone)]
pub struct InterviewRequest {
    pub stage: Stage,
    pub scheduled_at: DateTime<Utc>,
    pub method: InterviewMethod,
    pub panel: Vec<ReviewerId>,
    pub video_link: Option<String>,
    pub calendar_ref: Option<String>,
}

/// Decide whether a new interview may be created for the application.
///
/// Validation failures (panel, past schedule time) are rejected before any
/// state is consulted; state failures (terminal application, backward stage,
/// occupied slot) follow.
pub fn plan(
    application: &Application,
    existing_active: Option<&Interview>,
    request: InterviewRequest,
    id: InterviewId,
    now: DateTime<Utc>,
) -> Result<Interview, ScheduleError> {
    validate_panel(&request.panel)?;
    ensure_future(request.scheduled_at, now)?;

    authorize(application, &TransitionRequest::to_stage(request.stage))?;

    if existing_active.is_some() {
        return Err(ScheduleError::DuplicateActiveInterview {
            stage: request.stage,
        });
    }

    Ok(Interview {
        id,
        application_id: application.id.clone(),
        stage: request.stage,
        scheduled_at: request.scheduled_at,
        method: request.method,
        panel: request.panel,
        status: InterviewStatus::Scheduled,
        video_link: request.video_link,
        calendar_ref: request.calendar_ref,
        composite_recommendation: None,
        completed_at: None,
    })
}

/// Reject schedule times that are not strictly in the future.
fn ensure_future(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), ScheduleError> {
    if scheduled_at <= now {
        return Err(ScheduleError::ScheduledInPast {
            requested: scheduled_at,
        });
    }
    Ok(())
}

/// Cancel an interview that is still in `scheduled` state.
pub fn cancel(interview: &Interview) -> Result<Interview, ScheduleError> {
    if interview.status != InterviewStatus::Scheduled {
        return Err(ScheduleError::NotCancellable(interview.status));
    }

    let mut cancelled = interview.clone();
    cancelled.status = InterviewStatus::Cancelled;
    Ok(cancelled)
}

/// Mark an interview completed with its composite recommendation. Only the
/// feedback aggregator takes this path, at the moment the final panel member
/// submits.
pub(crate) fn complete(
    interview: &Interview,
    composite: Recommendation,
    now: DateTime<Utc>,
) -> Interview {
    let mut completed = interview.clone();
    completed.status = InterviewStatus::Completed;
    completed.composite_recommendation = Some(composite);
    completed.completed_at = Some(now);
    completed
}
