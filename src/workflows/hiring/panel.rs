use std::collections::BTreeSet;

use super::domain::ReviewerId;

/// Violations raised while validating an interview panel.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("interview panel must name at least one reviewer")]
    Empty,
    #[error("malformed reviewer identifier '{0}'")]
    MalformedMember(String),
    #[error("reviewer '{0}' appears more than once on the panel")]
    DuplicateMember(String),
}

/// Accept a panel only when it is non-empty, every identifier is well formed,
/// and no reviewer appears twice.
pub fn validate_panel(panel: &[ReviewerId]) -> Result<(), PanelError> {
    if panel.is_empty() {
        return Err(PanelError::Empty);
    }

    let mut seen = BTreeSet::new();
    for member in panel {
        if !well_formed(&member.0) {
            return Err(PanelError::MalformedMember(member.0.clone()));
        }
        if !seen.insert(member.0.as_str()) {
            return Err(PanelError::DuplicateMember(member.0.clone()));
        }
    }

    Ok(())
}

/// Reviewer identifiers are directory handles: non-empty ASCII limited to
/// alphanumerics plus `-`, `_`, `.`, and `@`.
fn well_formed(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '@'))
}
