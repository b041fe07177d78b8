pub mod approval;
pub mod response;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApprovalStatus, CandidateId, CandidateResponse, Compensation, Offer,
    OfferFinalStatus, OfferId, Stage,
};
use super::stage::{authorize, TransitionError, TransitionRequest};

pub use approval::{ApprovalPolicy, ApprovalRequest};

/// Rejections raised while drafting an offer.
#[derive(Debug, thiserror::Error)]
pub enum OfferError {
    #[error("offer deadline must be strictly in the future, got {deadline}")]
    DeadlineNotFuture { deadline: DateTime<Utc> },
    #[error("application is at stage '{}', offers require stage 'offer'", .0.label())]
    ApplicationNotAtOfferStage(Stage),
    #[error("candidate '{}' does not match the application's candidate", .0.0)]
    CandidateMismatch(CandidateId),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Inbound payload for creating an offer.
#[derive(Debug, Clone)]
pub struct OfferDraft {
    pub candidate_id: CandidateId,
    pub compensation: Compensation,
    pub benefits: BTreeSet<String>,
    pub role: String,
    pub content: String,
    pub deadline: DateTime<Utc>,
}

/// Draft an offer against an application that has reached the offer stage.
/// Approval and candidate response both start `pending`.
pub fn draft(
    application: &Application,
    draft: OfferDraft,
    id: OfferId,
    now: DateTime<Utc>,
) -> Result<Offer, OfferError> {
    if draft.deadline <= now {
        return Err(OfferError::DeadlineNotFuture {
            deadline: draft.deadline,
        });
    }

    authorize(application, &TransitionRequest::default())?;

    if application.current_stage != Stage::Offer {
        return Err(OfferError::ApplicationNotAtOfferStage(
            application.current_stage,
        ));
    }
    if draft.candidate_id != application.candidate_id {
        return Err(OfferError::CandidateMismatch(draft.candidate_id));
    }

    Ok(Offer {
        id,
        application_id: application.id.clone(),
        candidate_id: draft.candidate_id,
        compensation: draft.compensation,
        benefits: draft.benefits,
        role: draft.role,
        content: draft.content,
        deadline: draft.deadline,
        approvals: Vec::new(),
        approval_status: ApprovalStatus::Pending,
        candidate_response: CandidateResponse::Pending,
        final_status: OfferFinalStatus::Open,
        created_at: now,
    })
}
