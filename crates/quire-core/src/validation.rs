//! Field validation shared by the services.

use crate::error::{WorkspaceError, WorkspaceResult};

/// Require a non-blank value of at most `max` characters.
pub(crate) fn required_text(field: &str, value: &str, max: usize) -> WorkspaceResult<()> {
    if value.trim().is_empty() {
        return Err(WorkspaceError::InvalidInput(format!("{field} must not be blank")));
    }
    bounded_text(field, value, max)
}

/// Require a value of at most `max` characters.
pub(crate) fn bounded_text(field: &str, value: &str, max: usize) -> WorkspaceResult<()> {
    if value.chars().count() > max {
        return Err(WorkspaceError::InvalidInput(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}
