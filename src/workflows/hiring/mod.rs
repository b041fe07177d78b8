//! Hiring pipeline workflow engine: stage transitions, interview scheduling,
//! feedback aggregation, and the offer approval/response state machines.
//!
//! The engine performs no I/O of its own. Persistence goes through the
//! [`repository::PipelineRepository`] port with optimistic-concurrency
//! writes, and side effects leave as [`repository::OutboundIntent`] values
//! for external collaborators to deliver.

pub mod domain;
pub(crate) mod feedback;
pub mod memory;
pub mod offer;
pub(crate) mod panel;
pub mod repository;
pub mod requisition;
pub mod router;
pub(crate) mod schedule;
pub mod service;
pub(crate) mod stage;

#[cfg(test)]
mod tests;

pub use domain::{
    ActorId, Application, ApplicationId, ApplicationStatus, ApprovalDecision, ApprovalEntry,
    ApprovalStatus, ApproverRole, CandidateId, CandidateResponse, Compensation, FeedbackId,
    FeedbackScores, Interview, InterviewFeedback, InterviewId, InterviewMethod, InterviewStatus,
    JobRequisition, Offer, OfferFinalStatus, OfferId, OfferResponse, PublishStatus,
    Recommendation, RequisitionId, ReviewerId, Stage, StatusChange,
};
pub use feedback::{FeedbackError, FeedbackSubmission};
pub use memory::{MemoryIntentSink, MemoryRepository};
pub use offer::approval::{ApprovalError, ApprovalPolicy, ApprovalRequest};
pub use offer::response::ResponseError;
pub use offer::{OfferDraft, OfferError};
pub use panel::PanelError;
pub use repository::{
    IntentError, IntentSink, OutboundIntent, PipelineRepository, RepositoryError, Versioned,
    WriteSet,
};
pub use requisition::{RequisitionDraft, RequisitionError};
pub use router::hiring_router;
pub use schedule::{InterviewRequest, ScheduleError};
pub use service::{FeedbackReceipt, HiringPipelineService, PipelineServiceError};
pub use stage::{authorize, TransitionError, TransitionRequest};
