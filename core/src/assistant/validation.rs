use crate::assistant::model::{
    AssistantRecord, NAME_MIN_CHARS, ResponseConfig, SYSTEM_PROMPT_MAX_CHARS,
};
use crate::assistant::sanitize::sanitize_input;
use thiserror::Error;

/// User-correctable input problems, surfaced at the guarded transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("The name must have at least {min} characters.")]
    NameTooShort { min: usize },
    #[error("An assistant named \"{name}\" already exists.")]
    DuplicateName { name: String },
    #[error("Percentages must add up to 100%. Current: {sum}%")]
    DistributionSum { sum: i64 },
    #[error("The {field} percentage cannot be negative (got {value}).")]
    NegativePercentage { field: &'static str, value: i64 },
    #[error("The system prompt is limited to {max} characters (got {len}).")]
    PromptTooLong { len: usize, max: usize },
}

/// Validates a raw name against the other records and returns the sanitized
/// value that should be persisted. `editing_id` excludes that record from the
/// uniqueness check.
pub fn validate_name(
    raw: &str,
    existing: &[AssistantRecord],
    editing_id: Option<&str>,
) -> Result<String, ValidationError> {
    let name = sanitize_input(raw);

    if name.chars().filter(|c| !c.is_whitespace()).count() < NAME_MIN_CHARS {
        return Err(ValidationError::NameTooShort {
            min: NAME_MIN_CHARS,
        });
    }

    let lowered = name.to_lowercase();
    let taken = existing
        .iter()
        .filter(|record| Some(record.id.as_str()) != editing_id)
        .any(|record| record.name.to_lowercase() == lowered);

    if taken {
        return Err(ValidationError::DuplicateName { name });
    }

    Ok(name)
}

/// Checks the sum invariant and converts draft values into a finished
/// [`ResponseConfig`].
pub fn validate_distribution(
    short: i64,
    medium: i64,
    long: i64,
    audio_enabled: bool,
) -> Result<ResponseConfig, ValidationError> {
    let sum = short.saturating_add(medium).saturating_add(long);
    if sum != 100 {
        return Err(ValidationError::DistributionSum { sum });
    }

    let percent = |field: &'static str, value: i64| {
        u8::try_from(value).map_err(|_| ValidationError::NegativePercentage { field, value })
    };

    Ok(ResponseConfig {
        short: percent("short", short)?,
        medium: percent("medium", medium)?,
        long: percent("long", long)?,
        audio_enabled,
    })
}

pub fn validate_system_prompt(prompt: &str) -> Result<(), ValidationError> {
    let len = prompt.chars().count();
    if len > SYSTEM_PROMPT_MAX_CHARS {
        return Err(ValidationError::PromptTooLong {
            len,
            max: SYSTEM_PROMPT_MAX_CHARS,
        });
    }
    Ok(())
}
