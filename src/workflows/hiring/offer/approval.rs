use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::super::domain::{
    ActorId, ApprovalDecision, ApprovalEntry, ApprovalStatus, ApproverRole, Offer,
};

/// Rejections raised while recording approver decisions.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    #[error("offer approval is already '{}', decisions are closed", .0.label())]
    NotPending(ApprovalStatus),
    #[error("role '{}' is not part of the required approval quorum", .0.0)]
    RoleNotRequired(ApproverRole),
    #[error("role '{}' already recorded a decision for this offer", .0.0)]
    RoleAlreadyDecided(ApproverRole),
}

/// Configurable quorum: the set of roles that must all approve before the
/// offer is considered approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalPolicy {
    required_roles: BTreeSet<ApproverRole>,
}

impl ApprovalPolicy {
    pub fn new(required_roles: BTreeSet<ApproverRole>) -> Self {
        Self { required_roles }
    }

    pub fn required_roles(&self) -> &BTreeSet<ApproverRole> {
        &self.required_roles
    }

    pub fn requires(&self, role: &ApproverRole) -> bool {
        self.required_roles.contains(role)
    }
}

/// Inbound payload for one approver decision.
#[derive(Debug, Clone)]
pub struct ApprovalRequest {
    pub approver: ActorId,
    pub role: ApproverRole,
    pub decision: ApprovalDecision,
    pub comment: Option<String>,
}

/// Record one decision against a pending offer, returning the updated offer.
///
/// Each required role decides at most once. A single rejection settles the
/// overall status to `rejected` immediately; `approved` is reached only once
/// every required role has approved.
pub fn record_decision(
    offer: &Offer,
    policy: &ApprovalPolicy,
    request: ApprovalRequest,
    now: DateTime<Utc>,
) -> Result<Offer, ApprovalError> {
    if offer.approval_status != ApprovalStatus::Pending {
        return Err(ApprovalError::NotPending(offer.approval_status));
    }
    if !policy.requires(&request.role) {
        return Err(ApprovalError::RoleNotRequired(request.role));
    }
    if offer
        .approvals
        .iter()
        .any(|entry| entry.role == request.role)
    {
        return Err(ApprovalError::RoleAlreadyDecided(request.role));
    }

    let mut updated = offer.clone();
    updated.approvals.push(ApprovalEntry {
        approver: request.approver,
        role: request.role,
        decision: request.decision,
        comment: request.comment,
        decided_at: now,
    });
    updated.approval_status = overall_status(&updated, policy);

    Ok(updated)
}

fn overall_status(offer: &Offer, policy: &ApprovalPolicy) -> ApprovalStatus {
    if offer
        .approvals
        .iter()
        .any(|entry| entry.decision == ApprovalDecision::Rejected)
    {
        return ApprovalStatus::Rejected;
    }

    let all_approved = policy.required_roles().iter().all(|role| {
        offer
            .approvals
            .iter()
            .any(|entry| entry.role == *role && entry.decision == ApprovalDecision::Approved)
    });

    if all_approved {
        ApprovalStatus::Approved
    } else {
        ApprovalStatus::Pending
    }
}
