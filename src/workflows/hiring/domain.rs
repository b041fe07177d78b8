use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for job requisitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequisitionId(pub String);

/// Identifier wrapper for candidate applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier wrapper for scheduled interviews.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterviewId(pub String);

/// Identifier wrapper for interviewer feedback records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackId(pub String);

/// Identifier wrapper for offers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(pub String);

/// Identifier for a panel member asked to interview a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewerId(pub String);

/// Identifier for the staff member or system performing a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

/// Named approver role participating in the offer quorum (e.g. `hr_manager`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApproverRole(pub String);

/// Position of a candidate in the canonical interview pipeline.
///
/// Variant order is the canonical stage ordering; the derived `Ord` is what
/// the transition authority compares against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Screening,
    DepartmentInterview,
    HrInterview,
    Offer,
}

impl Stage {
    pub const fn label(self) -> &'static str {
        match self {
            Stage::Screening => "screening",
            Stage::DepartmentInterview => "department_interview",
            Stage::HrInterview => "hr_interview",
            Stage::Offer => "offer",
        }
    }

    pub const fn next(self) -> Option<Stage> {
        match self {
            Stage::Screening => Some(Stage::DepartmentInterview),
            Stage::DepartmentInterview => Some(Stage::HrInterview),
            Stage::HrInterview => Some(Stage::Offer),
            Stage::Offer => None,
        }
    }
}

/// Overall application lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    InProcess,
    Offer,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::InProcess => "in_process",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Terminal statuses admit no further stage or status mutation.
    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Hired | ApplicationStatus::Rejected)
    }

    /// Rank along the forward status progression. Terminal statuses are
    /// handled separately and carry no rank.
    pub(crate) const fn progression_rank(self) -> Option<u8> {
        match self {
            ApplicationStatus::Submitted => Some(0),
            ApplicationStatus::InProcess => Some(1),
            ApplicationStatus::Offer => Some(2),
            ApplicationStatus::Hired | ApplicationStatus::Rejected => None,
        }
    }
}

/// Candidate application moving through the hiring pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub candidate_id: CandidateId,
    pub requisition_id: RequisitionId,
    pub assigned_hr: Option<ActorId>,
    pub current_stage: Stage,
    pub status: ApplicationStatus,
    pub history: Vec<StatusChange>,
    pub submitted_at: DateTime<Utc>,
}

/// Audit entry recorded alongside every stage or status write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub previous_stage: Stage,
    pub previous_status: ApplicationStatus,
    pub stage: Stage,
    pub status: ApplicationStatus,
    pub actor: ActorId,
    pub at: DateTime<Utc>,
}

/// Publish lifecycle of a job requisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    Draft,
    Published,
    Closed,
}

impl PublishStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::Published => "published",
            PublishStatus::Closed => "closed",
        }
    }
}

/// Job requisition applications are submitted against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequisition {
    pub id: RequisitionId,
    pub template_id: Option<String>,
    pub openings: u32,
    pub filled: u32,
    pub location: Option<String>,
    pub hiring_manager: ActorId,
    pub publish_status: PublishStatus,
    pub posting_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// How an interview round is conducted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewMethod {
    Onsite,
    Video,
    Phone,
}

impl InterviewMethod {
    pub const fn label(self) -> &'static str {
        match self {
            InterviewMethod::Onsite => "onsite",
            InterviewMethod::Video => "video",
            InterviewMethod::Phone => "phone",
        }
    }
}

/// Interview round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl InterviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
        }
    }

    /// A non-cancelled interview occupies its (application, stage) slot.
    pub const fn occupies_slot(self) -> bool {
        !matches!(self, InterviewStatus::Cancelled)
    }
}

/// Interview round tied to an application and a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub id: InterviewId,
    pub application_id: ApplicationId,
    pub stage: Stage,
    pub scheduled_at: DateTime<Utc>,
    pub method: InterviewMethod,
    pub panel: Vec<ReviewerId>,
    pub status: InterviewStatus,
    pub video_link: Option<String>,
    pub calendar_ref: Option<String>,
    pub composite_recommendation: Option<Recommendation>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Interviewer verdict on a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Hire,
    Maybe,
    Reject,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Recommendation::Hire => "hire",
            Recommendation::Maybe => "maybe",
            Recommendation::Reject => "reject",
        }
    }
}

/// Bounded 1-10 scores captured per feedback submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackScores {
    pub technical: u8,
    pub communication: u8,
    pub culture_fit: u8,
    pub overall: u8,
}

impl FeedbackScores {
    pub const fn dimensions(&self) -> [(&'static str, u8); 4] {
        [
            ("technical", self.technical),
            ("communication", self.communication),
            ("culture_fit", self.culture_fit),
            ("overall", self.overall),
        ]
    }
}

/// Immutable per-interviewer feedback record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewFeedback {
    pub id: FeedbackId,
    pub interview_id: InterviewId,
    pub interviewer: ReviewerId,
    pub scores: FeedbackScores,
    pub comments: String,
    pub recommendation: Recommendation,
    pub submitted_at: DateTime<Utc>,
}

/// Compensation terms on an offer. Unsigned fields keep negative amounts
/// unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compensation {
    pub gross_salary: u64,
    pub signing_bonus: Option<u64>,
}

/// Decision an approver records against an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

/// Overall quorum outcome across the required approver roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

/// One recorded approver decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalEntry {
    pub approver: ActorId,
    pub role: ApproverRole,
    pub decision: ApprovalDecision,
    pub comment: Option<String>,
    pub decided_at: DateTime<Utc>,
}

/// Candidate-facing response state, independent of internal approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateResponse {
    Pending,
    Accepted,
    Rejected,
}

impl CandidateResponse {
    pub const fn label(self) -> &'static str {
        match self {
            CandidateResponse::Pending => "pending",
            CandidateResponse::Accepted => "accepted",
            CandidateResponse::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, CandidateResponse::Pending)
    }
}

/// Housekeeping state of the offer document itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferFinalStatus {
    Open,
    Expired,
    Withdrawn,
}

impl OfferFinalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            OfferFinalStatus::Open => "open",
            OfferFinalStatus::Expired => "expired",
            OfferFinalStatus::Withdrawn => "withdrawn",
        }
    }
}

/// The response a candidate submits against an approved offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferResponse {
    Accepted,
    Rejected,
}

/// Offer extended to a candidate, carrying the approval trail and the
/// candidate response alongside the commercial terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub application_id: ApplicationId,
    pub candidate_id: CandidateId,
    pub compensation: Compensation,
    pub benefits: BTreeSet<String>,
    pub role: String,
    pub content: String,
    pub deadline: DateTime<Utc>,
    pub approvals: Vec<ApprovalEntry>,
    pub approval_status: ApprovalStatus,
    pub candidate_response: CandidateResponse,
    pub final_status: OfferFinalStatus,
    pub created_at: DateTime<Utc>,
}
