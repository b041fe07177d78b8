use chrono::{DateTime, Utc};

use super::super::domain::{
    ApprovalStatus, CandidateResponse, Offer, OfferFinalStatus, OfferResponse,
};

/// Rejections raised while recording the candidate's response.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("offer is '{}' and no longer accepts a response", .0.label())]
    NotOpen(OfferFinalStatus),
    #[error("candidate already responded with '{}'", .0.label())]
    AlreadyResponded(CandidateResponse),
    #[error("offer approval is '{}', a response requires 'approved'", .0.label())]
    ApprovalPending(ApprovalStatus),
    #[error("offer deadline {deadline} has passed")]
    DeadlinePassed { deadline: DateTime<Utc> },
}

/// True when an approved, unanswered offer has outlived its deadline and
/// must lapse to `expired`. Expiry is evaluated lazily at response time, not
/// by a timer.
pub fn lapsed(offer: &Offer, now: DateTime<Utc>) -> bool {
    offer.final_status == OfferFinalStatus::Open
        && offer.approval_status == ApprovalStatus::Approved
        && offer.candidate_response == CandidateResponse::Pending
        && now > offer.deadline
}

/// Transition a lapsed offer to `expired`.
pub fn expire(offer: &Offer) -> Offer {
    let mut expired = offer.clone();
    expired.final_status = OfferFinalStatus::Expired;
    expired
}

/// Record the candidate's response against an approved, open offer.
///
/// The approval gate is checked before the deadline so an unapproved offer
/// fails with the approval error regardless of timing.
pub fn record(
    offer: &Offer,
    response: OfferResponse,
    now: DateTime<Utc>,
) -> Result<Offer, ResponseError> {
    if offer.final_status != OfferFinalStatus::Open {
        return Err(ResponseError::NotOpen(offer.final_status));
    }
    if offer.candidate_response.is_terminal() {
        return Err(ResponseError::AlreadyResponded(offer.candidate_response));
    }
    if offer.approval_status != ApprovalStatus::Approved {
        return Err(ResponseError::ApprovalPending(offer.approval_status));
    }
    if now > offer.deadline {
        return Err(ResponseError::DeadlinePassed {
            deadline: offer.deadline,
        });
    }

    let mut updated = offer.clone();
    updated.candidate_response = match response {
        OfferResponse::Accepted => CandidateResponse::Accepted,
        OfferResponse::Rejected => CandidateResponse::Rejected,
    };
    Ok(updated)
}
