use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::domain::{
    ActorId, Application, ApplicationId, ApplicationStatus, CandidateId, CandidateResponse,
    FeedbackId, Interview, InterviewFeedback, InterviewId, JobRequisition, Offer, OfferId,
    OfferResponse, Recommendation, RequisitionId, Stage,
};
use super::feedback::{self, FeedbackError, FeedbackSubmission};
use super::offer::approval::{self, ApprovalError, ApprovalPolicy, ApprovalRequest};
use super::offer::response::{self, ResponseError};
use super::offer::{self, OfferDraft, OfferError};
use super::repository::{
    IntentSink, OutboundIntent, PipelineRepository, RepositoryError, Versioned, WriteSet,
};
use super::requisition::{self, RequisitionDraft, RequisitionError};
use super::schedule::{self, InterviewRequest, ScheduleError};
use super::stage::{authorize, TransitionError, TransitionRequest};

/// Error raised by the pipeline orchestrator. Sub-component failures
/// propagate unmodified.
#[derive(Debug, thiserror::Error)]
pub enum PipelineServiceError {
    #[error(transparent)]
    Requisition(#[from] RequisitionError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
    #[error(transparent)]
    Offer(#[from] OfferError),
    #[error(transparent)]
    Approval(#[from] ApprovalError),
    #[error(transparent)]
    Response(#[from] ResponseError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Accepted feedback plus the interview state it produced.
#[derive(Debug, Clone)]
pub struct FeedbackReceipt {
    pub feedback: InterviewFeedback,
    pub interview: Interview,
    pub composite: Option<Recommendation>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static INTERVIEW_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static OFFER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static FEEDBACK_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

fn next_interview_id() -> InterviewId {
    let id = INTERVIEW_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    InterviewId(format!("int-{id:06}"))
}

fn next_offer_id() -> OfferId {
    let id = OFFER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OfferId(format!("off-{id:06}"))
}

fn next_feedback_id() -> FeedbackId {
    let id = FEEDBACK_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    FeedbackId(format!("fbk-{id:06}"))
}

/// Single entry point coordinating the hiring pipeline sub-workflows.
///
/// Every operation loads entities through the repository port, delegates the
/// decision to a pure component, commits one atomic write set, and only then
/// dispatches outbound intents. Intent delivery is fire-and-forget: failures
/// are logged, never turned into operation failures.
pub struct HiringPipelineService<R, S> {
    repository: Arc<R>,
    intents: Arc<S>,
    policy: ApprovalPolicy,
}

impl<R, S> HiringPipelineService<R, S>
where
    R: PipelineRepository + 'static,
    S: IntentSink + 'static,
{
    pub fn new(repository: Arc<R>, intents: Arc<S>, policy: ApprovalPolicy) -> Self {
        Self {
            repository,
            intents,
            policy,
        }
    }

    pub fn approval_policy(&self) -> &ApprovalPolicy {
        &self.policy
    }

    // ---- requisitions -----------------------------------------------------

    /// Create a draft requisition under a caller-assigned identifier.
    pub fn create_requisition(
        &self,
        id: RequisitionId,
        draft: RequisitionDraft,
    ) -> Result<JobRequisition, PipelineServiceError> {
        let requisition = requisition::create(draft, id)?;
        let stored = self.repository.insert_requisition(requisition)?;
        Ok(stored.entity)
    }

    pub fn publish_requisition(
        &self,
        id: &RequisitionId,
        now: DateTime<Utc>,
    ) -> Result<JobRequisition, PipelineServiceError> {
        let record = self.load_requisition(id)?;
        let published = requisition::publish(&record.entity, now)?;
        self.repository.commit(WriteSet {
            requisition: Some(record.with_entity(published.clone())),
            ..WriteSet::default()
        })?;
        info!(requisition = %published.id.0, "requisition published");
        Ok(published)
    }

    pub fn get_requisition(
        &self,
        id: &RequisitionId,
    ) -> Result<JobRequisition, PipelineServiceError> {
        Ok(self.load_requisition(id)?.entity)
    }

    // ---- applications -----------------------------------------------------

    /// Accept a candidate application against a published requisition.
    pub fn submit_application(
        &self,
        candidate_id: CandidateId,
        requisition_id: RequisitionId,
        assigned_hr: Option<ActorId>,
        now: DateTime<Utc>,
    ) -> Result<Application, PipelineServiceError> {
        let record = self.load_requisition(&requisition_id)?;

        if let Err(error) = requisition::accepting(&record.entity, now) {
            // Lazy close: a read that observes the expiry flips the record.
            if matches!(error, RequisitionError::Expired(_)) {
                let closed = requisition::close(&record.entity);
                self.repository.commit(WriteSet {
                    requisition: Some(record.with_entity(closed)),
                    ..WriteSet::default()
                })?;
            }
            return Err(error.into());
        }

        let application = Application {
            id: next_application_id(),
            candidate_id,
            requisition_id,
            assigned_hr,
            current_stage: Stage::Screening,
            status: ApplicationStatus::Submitted,
            history: Vec::new(),
            submitted_at: now,
        };
        let stored = self.repository.insert_application(application)?;
        info!(application = %stored.entity.id.0, "application submitted");
        Ok(stored.entity)
    }

    pub fn get_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Application, PipelineServiceError> {
        Ok(self.load_application(id)?.entity)
    }

    /// Move an application to a new lifecycle status, with the audit entry
    /// the transition authority requires.
    pub fn update_application_status(
        &self,
        id: &ApplicationId,
        requested: ApplicationStatus,
        actor: ActorId,
        now: DateTime<Utc>,
    ) -> Result<Application, PipelineServiceError> {
        let record = self.load_application(id)?;

        let mut request = TransitionRequest::to_status(requested);
        if requested == ApplicationStatus::Hired && self.has_accepted_offer(id)? {
            request = request.with_accepted_offer();
        }
        authorize(&record.entity, &request)?;

        let updated = apply_transition(&record.entity, None, Some(requested), actor, now);
        self.repository.commit(WriteSet {
            application: Some(record.with_entity(updated.clone())),
            ..WriteSet::default()
        })?;

        if requested == ApplicationStatus::Rejected {
            self.dispatch(OutboundIntent::NotifyCandidate {
                candidate_id: updated.candidate_id.clone(),
                application_id: updated.id.clone(),
                template: "application_rejected".to_string(),
            });
        }
        info!(
            application = %updated.id.0,
            status = updated.status.label(),
            "application status updated"
        );
        Ok(updated)
    }

    /// Reject an application. Sugar over the status update kept for the
    /// dedicated rejection endpoint.
    pub fn reject_application(
        &self,
        id: &ApplicationId,
        actor: ActorId,
        now: DateTime<Utc>,
    ) -> Result<Application, PipelineServiceError> {
        self.update_application_status(id, ApplicationStatus::Rejected, actor, now)
    }

    // ---- interviews -------------------------------------------------------

    /// Schedule an interview round; the application advances to the
    /// interview's stage when it is scheduled ahead of the current one.
    pub fn schedule_interview(
        &self,
        application_id: &ApplicationId,
        request: InterviewRequest,
        actor: ActorId,
        now: DateTime<Utc>,
    ) -> Result<Interview, PipelineServiceError> {
        let record = self.load_application(application_id)?;
        let occupied = self
            .repository
            .active_interview(application_id, request.stage)?;

        let interview = schedule::plan(
            &record.entity,
            occupied.as_ref().map(|record| &record.entity),
            request,
            next_interview_id(),
            now,
        )?;

        let advanced_stage = interview.stage > record.entity.current_stage;
        let needs_status_bump = record.entity.status == ApplicationStatus::Submitted;
        let application = if advanced_stage || needs_status_bump {
            let status = if interview.stage == Stage::Offer {
                ApplicationStatus::Offer
            } else {
                ApplicationStatus::InProcess
            };
            let stage = advanced_stage.then_some(interview.stage);
            let updated = apply_transition(&record.entity, stage, Some(status), actor, now);
            Some(record.with_entity(updated))
        } else {
            None
        };

        self.repository.commit(WriteSet {
            application,
            new_interview: Some(interview.clone()),
            ..WriteSet::default()
        })?;

        self.dispatch(OutboundIntent::CalendarEventCreate {
            interview_id: interview.id.clone(),
            application_id: interview.application_id.clone(),
            scheduled_at: interview.scheduled_at,
            panel: interview.panel.clone(),
        });
        if advanced_stage {
            self.dispatch(OutboundIntent::StageAdvanced {
                application_id: interview.application_id.clone(),
                stage: interview.stage,
            });
        }
        info!(
            interview = %interview.id.0,
            application = %interview.application_id.0,
            stage = interview.stage.label(),
            "interview scheduled"
        );
        Ok(interview)
    }

    pub fn cancel_interview(
        &self,
        id: &InterviewId,
    ) -> Result<Interview, PipelineServiceError> {
        let record = self.load_interview(id)?;
        let cancelled = schedule::cancel(&record.entity)?;
        self.repository.commit(WriteSet {
            interview: Some(record.with_entity(cancelled.clone())),
            ..WriteSet::default()
        })?;
        info!(interview = %cancelled.id.0, "interview cancelled");
        Ok(cancelled)
    }

    pub fn get_interview(&self, id: &InterviewId) -> Result<Interview, PipelineServiceError> {
        Ok(self.load_interview(id)?.entity)
    }

    /// Accept one interviewer's feedback. The final panel submission
    /// completes the interview and advances the application to its next
    /// stage.
    pub fn submit_interview_feedback(
        &self,
        interview_id: &InterviewId,
        submission: FeedbackSubmission,
        now: DateTime<Utc>,
    ) -> Result<FeedbackReceipt, PipelineServiceError> {
        let record = self.load_interview(interview_id)?;
        let existing = self.repository.feedback_for(interview_id)?;

        let outcome = feedback::accept(
            &record.entity,
            &existing,
            submission,
            next_feedback_id(),
            now,
        )?;

        let mut writes = WriteSet {
            new_feedback: Some(outcome.record.clone()),
            ..WriteSet::default()
        };
        let mut intents = Vec::new();

        let interview = match outcome.completion {
            Some(composite) => {
                let completed = schedule::complete(&record.entity, composite, now);
                writes.interview = Some(record.with_entity(completed.clone()));

                let application = self.load_application(&completed.application_id)?;
                if let Some(advanced) = self.plan_stage_advance(&application.entity, &completed, now)
                {
                    intents.push(OutboundIntent::StageAdvanced {
                        application_id: advanced.id.clone(),
                        stage: advanced.current_stage,
                    });
                    writes.application = Some(application.with_entity(advanced));
                }
                intents.push(OutboundIntent::NotifyCandidate {
                    candidate_id: application.entity.candidate_id.clone(),
                    application_id: completed.application_id.clone(),
                    template: "interview_completed".to_string(),
                });
                completed
            }
            // An unchanged interview write serializes concurrent submissions
            // so the final panel member is always detected exactly once.
            None => {
                writes.interview = Some(record.clone());
                record.entity.clone()
            }
        };

        self.repository.commit(writes)?;
        for intent in intents {
            self.dispatch(intent);
        }

        if let Some(composite) = outcome.completion {
            info!(
                interview = %interview.id.0,
                composite = composite.label(),
                "interview completed"
            );
        }

        Ok(FeedbackReceipt {
            feedback: outcome.record,
            interview,
            composite: outcome.completion,
        })
    }

    // ---- offers -----------------------------------------------------------

    pub fn create_offer(
        &self,
        application_id: &ApplicationId,
        draft: OfferDraft,
        now: DateTime<Utc>,
    ) -> Result<Offer, PipelineServiceError> {
        let record = self.load_application(application_id)?;
        let offer = offer::draft(&record.entity, draft, next_offer_id(), now)?;
        self.repository.commit(WriteSet {
            new_offer: Some(offer.clone()),
            ..WriteSet::default()
        })?;
        info!(offer = %offer.id.0, application = %application_id.0, "offer drafted");
        Ok(offer)
    }

    pub fn get_offer(&self, id: &OfferId) -> Result<Offer, PipelineServiceError> {
        Ok(self.load_offer(id)?.entity)
    }

    /// Record one approver decision against a pending offer.
    pub fn record_offer_approval(
        &self,
        id: &OfferId,
        request: ApprovalRequest,
        now: DateTime<Utc>,
    ) -> Result<Offer, PipelineServiceError> {
        let record = self.load_offer(id)?;
        let updated = approval::record_decision(&record.entity, &self.policy, request, now)?;
        let settled = updated.approval_status != record.entity.approval_status;

        self.repository.commit(WriteSet {
            offer: Some(record.with_entity(updated.clone())),
            ..WriteSet::default()
        })?;

        if settled {
            self.dispatch(OutboundIntent::NotifyCandidate {
                candidate_id: updated.candidate_id.clone(),
                application_id: updated.application_id.clone(),
                template: format!("offer_{}", updated.approval_status.label()),
            });
            info!(
                offer = %updated.id.0,
                status = updated.approval_status.label(),
                "offer approval settled"
            );
        }
        Ok(updated)
    }

    /// Record the candidate's accept/reject response. Acceptance marks the
    /// application hired and counts the hire against the requisition;
    /// rejection closes the application. Both land in one atomic commit with
    /// the offer write.
    pub fn respond_to_offer(
        &self,
        id: &OfferId,
        offer_response: OfferResponse,
        now: DateTime<Utc>,
    ) -> Result<Offer, PipelineServiceError> {
        let record = self.load_offer(id)?;

        if response::lapsed(&record.entity, now) {
            let expired = response::expire(&record.entity);
            self.repository.commit(WriteSet {
                offer: Some(record.with_entity(expired.clone())),
                ..WriteSet::default()
            })?;
            self.dispatch(OutboundIntent::NotifyCandidate {
                candidate_id: expired.candidate_id.clone(),
                application_id: expired.application_id.clone(),
                template: "offer_expired".to_string(),
            });
            return Err(ResponseError::DeadlinePassed {
                deadline: expired.deadline,
            }
            .into());
        }

        let updated = response::record(&record.entity, offer_response, now)?;
        let application = self.load_application(&updated.application_id)?;
        let actor = ActorId(updated.candidate_id.0.clone());

        let mut writes = WriteSet {
            offer: Some(record.with_entity(updated.clone())),
            ..WriteSet::default()
        };
        let mut intents = Vec::new();

        match offer_response {
            OfferResponse::Accepted => {
                authorize(
                    &application.entity,
                    &TransitionRequest::to_status(ApplicationStatus::Hired).with_accepted_offer(),
                )?;
                let hired = apply_transition(
                    &application.entity,
                    None,
                    Some(ApplicationStatus::Hired),
                    actor,
                    now,
                );
                let requisition = self.load_requisition(&hired.requisition_id)?;
                writes.requisition =
                    Some(requisition.with_entity(requisition::record_hire(&requisition.entity)));
                writes.application = Some(application.with_entity(hired));

                intents.push(OutboundIntent::TriggerOnboarding {
                    application_id: updated.application_id.clone(),
                    candidate_id: updated.candidate_id.clone(),
                    offer_id: updated.id.clone(),
                });
                intents.push(OutboundIntent::NotifyCandidate {
                    candidate_id: updated.candidate_id.clone(),
                    application_id: updated.application_id.clone(),
                    template: "offer_accepted".to_string(),
                });
            }
            OfferResponse::Rejected => {
                authorize(
                    &application.entity,
                    &TransitionRequest::to_status(ApplicationStatus::Rejected),
                )?;
                let rejected = apply_transition(
                    &application.entity,
                    None,
                    Some(ApplicationStatus::Rejected),
                    actor,
                    now,
                );
                writes.application = Some(application.with_entity(rejected));
                intents.push(OutboundIntent::NotifyCandidate {
                    candidate_id: updated.candidate_id.clone(),
                    application_id: updated.application_id.clone(),
                    template: "offer_declined".to_string(),
                });
            }
        }

        self.repository.commit(writes)?;
        for intent in intents {
            self.dispatch(intent);
        }
        info!(
            offer = %updated.id.0,
            response = updated.candidate_response.label(),
            "candidate responded to offer"
        );
        Ok(updated)
    }

    // ---- internals --------------------------------------------------------

    fn load_requisition(
        &self,
        id: &RequisitionId,
    ) -> Result<Versioned<JobRequisition>, PipelineServiceError> {
        Ok(self
            .repository
            .fetch_requisition(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    fn load_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Versioned<Application>, PipelineServiceError> {
        Ok(self
            .repository
            .fetch_application(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    fn load_interview(
        &self,
        id: &InterviewId,
    ) -> Result<Versioned<Interview>, PipelineServiceError> {
        Ok(self
            .repository
            .fetch_interview(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    fn load_offer(&self, id: &OfferId) -> Result<Versioned<Offer>, PipelineServiceError> {
        Ok(self
            .repository
            .fetch_offer(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    fn has_accepted_offer(&self, id: &ApplicationId) -> Result<bool, PipelineServiceError> {
        let offers = self.repository.offers_for(id)?;
        Ok(offers
            .iter()
            .any(|record| record.entity.candidate_response == CandidateResponse::Accepted))
    }

    /// Advance the application past a completed interview stage. A terminal
    /// application (rejected while the round was in flight) is left alone.
    fn plan_stage_advance(
        &self,
        application: &Application,
        interview: &Interview,
        now: DateTime<Utc>,
    ) -> Option<Application> {
        if application.current_stage != interview.stage {
            return None;
        }
        let next = interview.stage.next()?;
        let status = if next == Stage::Offer {
            ApplicationStatus::Offer
        } else {
            ApplicationStatus::InProcess
        };
        let request = TransitionRequest {
            stage: Some(next),
            status: Some(status),
            accepted_offer: false,
        };
        if authorize(application, &request).is_err() {
            return None;
        }
        Some(apply_transition(
            application,
            Some(next),
            Some(status),
            ActorId("system".to_string()),
            now,
        ))
    }

    fn dispatch(&self, intent: OutboundIntent) {
        if let Err(error) = self.intents.dispatch(intent) {
            warn!(%error, "failed to dispatch outbound intent");
        }
    }
}

/// Apply an authorized transition and append the audit entry.
fn apply_transition(
    application: &Application,
    stage: Option<Stage>,
    status: Option<ApplicationStatus>,
    actor: ActorId,
    at: DateTime<Utc>,
) -> Application {
    let mut updated = application.clone();
    if let Some(stage) = stage {
        updated.current_stage = stage;
    }
    if let Some(status) = status {
        updated.status = status;
    }
    updated.history.push(super::domain::StatusChange {
        previous_stage: application.current_stage,
        previous_status: application.status,
        stage: updated.current_stage,
        status: updated.status,
        actor,
        at,
    });
    updated
}
