use super::domain::{Application, ApplicationStatus, Stage};

/// Rejections issued by the stage transition authority.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("application is terminal in status '{}'", .0.label())]
    Terminal(ApplicationStatus),
    #[error(
        "stage '{}' precedes current stage '{}'",
        requested.label(),
        current.label()
    )]
    BackwardStage { current: Stage, requested: Stage },
    #[error(
        "status '{}' would move backwards from '{}'",
        requested.label(),
        current.label()
    )]
    BackwardStatus {
        current: ApplicationStatus,
        requested: ApplicationStatus,
    },
    #[error("status 'hired' requires stage 'offer' and an accepted offer")]
    HiredWithoutAcceptedOffer,
}

/// Requested mutation evaluated by [`authorize`]. `accepted_offer` is the
/// caller-supplied evidence that an offer on this application has been
/// accepted by the candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionRequest {
    pub stage: Option<Stage>,
    pub status: Option<ApplicationStatus>,
    pub accepted_offer: bool,
}

impl TransitionRequest {
    pub fn to_stage(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..Self::default()
        }
    }

    pub fn to_status(status: ApplicationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_accepted_offer(mut self) -> Self {
        self.accepted_offer = true;
        self
    }
}

/// Pure decision function over an already-loaded application. The orchestrator
/// performs the write (and the audit entry) only after a positive decision.
pub fn authorize(application: &Application, request: &TransitionRequest) -> Result<(), TransitionError> {
    if application.status.is_terminal() {
        return Err(TransitionError::Terminal(application.status));
    }

    if let Some(requested) = request.stage {
        if requested < application.current_stage {
            return Err(TransitionError::BackwardStage {
                current: application.current_stage,
                requested,
            });
        }
    }

    if let Some(requested) = request.status {
        match requested {
            // Rejection is always a legal early-out from a non-terminal state.
            ApplicationStatus::Rejected => {}
            ApplicationStatus::Hired => {
                let stage = request.stage.unwrap_or(application.current_stage);
                if stage != Stage::Offer || !request.accepted_offer {
                    return Err(TransitionError::HiredWithoutAcceptedOffer);
                }
            }
            other => {
                let current_rank = application
                    .status
                    .progression_rank()
                    .unwrap_or(u8::MAX);
                let requested_rank = other.progression_rank().unwrap_or(0);
                if requested_rank < current_rank {
                    return Err(TransitionError::BackwardStatus {
                        current: application.status,
                        requested: other,
                    });
                }
            }
        }
    }

    Ok(())
}
