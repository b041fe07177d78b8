use chrono::{DateTime, Utc};

use super::domain::{ActorId, JobRequisition, PublishStatus, RequisitionId};

/// Failures in the requisition lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum RequisitionError {
    #[error("requisition must advertise at least one opening")]
    NoOpenings,
    #[error("expiry date must fall after the posting date")]
    ExpiryBeforePosting,
    #[error("requisition is '{}', only drafts can be published", .0.label())]
    NotDraft(PublishStatus),
    #[error("requisition is '{}' and is not accepting applications", .0.label())]
    NotAcceptingApplications(PublishStatus),
    #[error("requisition expired on {0}")]
    Expired(DateTime<Utc>),
    #[error("all openings on this requisition are filled")]
    OpeningsFilled,
}

/// Inbound payload for creating a requisition draft.
#[derive(Debug, Clone)]
pub struct RequisitionDraft {
    pub template_id: Option<String>,
    pub openings: u32,
    pub location: Option<String>,
    pub hiring_manager: ActorId,
    pub posting_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Build a draft requisition. Openings must be positive and any expiry must
/// fall after the posting date.
pub fn create(draft: RequisitionDraft, id: RequisitionId) -> Result<JobRequisition, RequisitionError> {
    if draft.openings == 0 {
        return Err(RequisitionError::NoOpenings);
    }
    if let (Some(posting), Some(expiry)) = (draft.posting_date, draft.expiry_date) {
        if expiry <= posting {
            return Err(RequisitionError::ExpiryBeforePosting);
        }
    }

    Ok(JobRequisition {
        id,
        template_id: draft.template_id,
        openings: draft.openings,
        filled: 0,
        location: draft.location,
        hiring_manager: draft.hiring_manager,
        publish_status: PublishStatus::Draft,
        posting_date: draft.posting_date,
        expiry_date: draft.expiry_date,
    })
}

/// Move a draft requisition to `published`. The posting date defaults to the
/// publish time when the draft carried none.
pub fn publish(requisition: &JobRequisition, now: DateTime<Utc>) -> Result<JobRequisition, RequisitionError> {
    if requisition.publish_status != PublishStatus::Draft {
        return Err(RequisitionError::NotDraft(requisition.publish_status));
    }

    let mut published = requisition.clone();
    published.publish_status = PublishStatus::Published;
    if published.posting_date.is_none() {
        published.posting_date = Some(now);
    }
    Ok(published)
}

/// Decide whether the requisition can accept a new application right now.
/// Expiry is evaluated lazily here rather than by a background sweep.
pub fn accepting(requisition: &JobRequisition, now: DateTime<Utc>) -> Result<(), RequisitionError> {
    if requisition.publish_status != PublishStatus::Published {
        return Err(RequisitionError::NotAcceptingApplications(
            requisition.publish_status,
        ));
    }
    if let Some(expiry) = requisition.expiry_date {
        if now > expiry {
            return Err(RequisitionError::Expired(expiry));
        }
    }
    if requisition.filled >= requisition.openings {
        return Err(RequisitionError::OpeningsFilled);
    }
    Ok(())
}

/// Count a hire against the requisition, closing it once every opening is
/// filled.
pub fn record_hire(requisition: &JobRequisition) -> JobRequisition {
    let mut updated = requisition.clone();
    updated.filled = updated.filled.saturating_add(1);
    if updated.filled >= updated.openings {
        updated.publish_status = PublishStatus::Closed;
    }
    updated
}

/// Mark an expired requisition as closed. Used when a read observes the
/// expiry has passed.
pub fn close(requisition: &JobRequisition) -> JobRequisition {
    let mut closed = requisition.clone();
    closed.publish_status = PublishStatus::Closed;
    closed
}
