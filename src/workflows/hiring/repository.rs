use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Application, ApplicationId, CandidateId, Interview, InterviewFeedback, InterviewId,
    JobRequisition, Offer, OfferId, RequisitionId, ReviewerId, Stage,
};

/// Entity snapshot paired with the revision it was read at. Every write is
/// conditioned on that revision being unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub entity: T,
    pub revision: u64,
}

impl<T> Versioned<T> {
    pub fn new(entity: T, revision: u64) -> Self {
        Self { entity, revision }
    }

    /// Replace the entity while keeping the revision the write is
    /// conditioned on.
    pub fn with_entity(&self, entity: T) -> Self {
        Self {
            entity,
            revision: self.revision,
        }
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("{entity} was modified concurrently, re-read and retry")]
    RevisionConflict { entity: &'static str },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// All entity writes produced by one orchestrator operation. Implementations
/// must apply a write set atomically: either every revision check passes and
/// every write lands, or nothing does.
///
/// Uniqueness constraints are re-checked at commit time so concurrent
/// planners cannot both win: at most one non-cancelled interview per
/// (application, stage), at most one feedback record per
/// (interview, interviewer).
#[derive(Debug, Clone, Default)]
pub struct WriteSet {
    pub requisition: Option<Versioned<JobRequisition>>,
    pub application: Option<Versioned<Application>>,
    pub interview: Option<Versioned<Interview>>,
    pub new_interview: Option<Interview>,
    pub offer: Option<Versioned<Offer>>,
    pub new_offer: Option<Offer>,
    pub new_feedback: Option<InterviewFeedback>,
}

/// Storage port for the workflow engine. The engine never caches entity
/// state across invocations; every operation re-reads what it needs.
pub trait PipelineRepository: Send + Sync {
    fn insert_requisition(
        &self,
        requisition: JobRequisition,
    ) -> Result<Versioned<JobRequisition>, RepositoryError>;
    fn fetch_requisition(
        &self,
        id: &RequisitionId,
    ) -> Result<Option<Versioned<JobRequisition>>, RepositoryError>;

    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Versioned<Application>, RepositoryError>;
    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Versioned<Application>>, RepositoryError>;

    fn fetch_interview(
        &self,
        id: &InterviewId,
    ) -> Result<Option<Versioned<Interview>>, RepositoryError>;
    /// The non-cancelled interview occupying the (application, stage) slot,
    /// if any.
    fn active_interview(
        &self,
        application_id: &ApplicationId,
        stage: Stage,
    ) -> Result<Option<Versioned<Interview>>, RepositoryError>;

    fn feedback_for(
        &self,
        interview_id: &InterviewId,
    ) -> Result<Vec<InterviewFeedback>, RepositoryError>;

    fn fetch_offer(&self, id: &OfferId) -> Result<Option<Versioned<Offer>>, RepositoryError>;
    fn offers_for(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<Versioned<Offer>>, RepositoryError>;

    fn commit(&self, writes: WriteSet) -> Result<(), RepositoryError>;
}

/// Side-effect requests emitted by the engine for external collaborators to
/// deliver. Dispatch is fire-and-forget from the engine's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundIntent {
    NotifyCandidate {
        candidate_id: CandidateId,
        application_id: ApplicationId,
        template: String,
    },
    CalendarEventCreate {
        interview_id: InterviewId,
        application_id: ApplicationId,
        scheduled_at: DateTime<Utc>,
        panel: Vec<ReviewerId>,
    },
    StageAdvanced {
        application_id: ApplicationId,
        stage: Stage,
    },
    TriggerOnboarding {
        application_id: ApplicationId,
        candidate_id: CandidateId,
        offer_id: OfferId,
    },
}

/// Intent dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    #[error("intent transport unavailable: {0}")]
    Transport(String),
}

/// Outbound port consuming intents (notification, calendar, onboarding
/// adapters).
pub trait IntentSink: Send + Sync {
    fn dispatch(&self, intent: OutboundIntent) -> Result<(), IntentError>;
}
