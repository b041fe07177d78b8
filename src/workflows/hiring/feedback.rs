use chrono::{DateTime, Utc};

use super::domain::{
    FeedbackId, FeedbackScores, Interview, InterviewFeedback, InterviewStatus, Recommendation,
    ReviewerId,
};

const SCORE_MIN: u8 = 1;
const SCORE_MAX: u8 = 10;

/// Rejections raised while accepting interviewer feedback.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("score '{dimension}' must be within [1,10], got {value}")]
    ScoreOutOfRange { dimension: &'static str, value: u8 },
    #[error("interview is '{}' and no longer accepts feedback", .0.label())]
    InterviewNotActive(InterviewStatus),
    #[error("reviewer '{}' is not on the interview panel", interviewer.0)]
    NotOnPanel { interviewer: ReviewerId },
    #[error("reviewer '{}' already submitted feedback for this interview", interviewer.0)]
    DuplicateSubmission { interviewer: ReviewerId },
}

/// Inbound payload for one interviewer's feedback.
#[derive(Debug, Clone)]
pub struct FeedbackSubmission {
    pub interviewer: ReviewerId,
    pub scores: FeedbackScores,
    pub comments: String,
    pub recommendation: Recommendation,
}

/// Result of an accepted submission. `completion` carries the composite
/// recommendation when this was the final outstanding panel member.
#[derive(Debug, Clone)]
pub struct FeedbackOutcome {
    pub record: InterviewFeedback,
    pub completion: Option<Recommendation>,
}

/// Accept a feedback submission against an interview and its existing
/// feedback records.
///
/// Score bounds are validated before any state is consulted. Records are
/// immutable once created; a resubmission is an error, never an update.
pub fn accept(
    interview: &Interview,
    existing: &[InterviewFeedback],
    submission: FeedbackSubmission,
    id: FeedbackId,
    now: DateTime<Utc>,
) -> Result<FeedbackOutcome, FeedbackError> {
    for (dimension, value) in submission.scores.dimensions() {
        if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
            return Err(FeedbackError::ScoreOutOfRange { dimension, value });
        }
    }

    if interview.status == InterviewStatus::Cancelled {
        return Err(FeedbackError::InterviewNotActive(interview.status));
    }

    if !interview.panel.contains(&submission.interviewer) {
        return Err(FeedbackError::NotOnPanel {
            interviewer: submission.interviewer,
        });
    }

    if existing
        .iter()
        .any(|record| record.interviewer == submission.interviewer)
    {
        return Err(FeedbackError::DuplicateSubmission {
            interviewer: submission.interviewer,
        });
    }

    let record = InterviewFeedback {
        id,
        interview_id: interview.id.clone(),
        interviewer: submission.interviewer,
        scores: submission.scores,
        comments: submission.comments,
        recommendation: submission.recommendation,
        submitted_at: now,
    };

    // Completion triggers at the moment the Nth distinct panel member
    // submits, independent of submission order.
    let completion = if existing.len() + 1 == interview.panel.len() {
        let recommendations: Vec<Recommendation> = existing
            .iter()
            .map(|record| record.recommendation)
            .chain(std::iter::once(record.recommendation))
            .collect();
        Some(composite(&recommendations))
    } else {
        None
    };

    Ok(FeedbackOutcome { record, completion })
}

/// Majority vote over {hire, maybe, reject}; any tie for the top count is
/// broken toward the conservative `maybe`.
pub fn composite(recommendations: &[Recommendation]) -> Recommendation {
    let mut hire = 0usize;
    let mut maybe = 0usize;
    let mut reject = 0usize;
    for recommendation in recommendations {
        match recommendation {
            Recommendation::Hire => hire += 1,
            Recommendation::Maybe => maybe += 1,
            Recommendation::Reject => reject += 1,
        }
    }

    if hire > maybe && hire > reject {
        Recommendation::Hire
    } else if reject > maybe && reject > hire {
        Recommendation::Reject
    } else {
        Recommendation::Maybe
    }
}
