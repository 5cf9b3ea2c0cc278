use thiserror::Error;

use crate::config::ValidationRules;

/// Validation failures are reported to the user verbatim; the `Display` text
/// is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a question.")]
    Empty,
    #[error("Your question is too long. Please keep it under {max} characters.")]
    TooLong { max: usize },
    #[error("Your question contains content that is not allowed.")]
    SuspiciousContent,
}

/// Allow/deny gate over raw user text. Rules apply in order, first failure
/// wins. On success returns the trimmed text with no further transformation;
/// escaping for rendering stays with the caller.
pub fn validate(raw: &str, rules: &ValidationRules) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    if trimmed.chars().count() > rules.max_chars {
        return Err(ValidationError::TooLong {
            max: rules.max_chars,
        });
    }

    let lowered = trimmed.to_lowercase();
    if rules
        .blocked_patterns
        .iter()
        .any(|pattern| lowered.contains(pattern))
    {
        return Err(ValidationError::SuspiciousContent);
    }

    Ok(trimmed.to_string())
}
