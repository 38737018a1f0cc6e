//! Two-step create/edit wizard for a single assistant.
//!
//! ```text
//!            open_create / open_edit
//!   Closed ─────────────────────────▶ Step1
//!     ▲                                │  next   (name rules)
//!     │ cancel (any state)             ▼
//!     └──────────── submit ◀──────── Step2 ──back──▶ Step1
//!                (sum == 100)
//! ```
//!
//! The form owns its draft until `submit` hands a finished record back to
//! the caller, which routes it to the store.

use crate::assistant::model::{AssistantRecord, Language, NAME_MAX_CHARS, Tone};
use crate::assistant::sanitize::sanitize_input;
use crate::assistant::validation::{ValidationError, validate_distribution, validate_name};
use crate::traits::{Clock, IdGenerator, SystemClock, UuidGenerator};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Closed,
    Step1,
    Step2,
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Step1 => write!(f, "on step 1"),
            Self::Step2 => write!(f, "on step 2"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Box<AssistantRecord>),
}

/// In-progress field values. Percentages are unconstrained integers here;
/// only `submit` enforces the sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantDraft {
    pub name: String,
    pub language: Language,
    pub tone: Tone,
    pub short: i64,
    pub medium: i64,
    pub long: i64,
    pub audio_enabled: bool,
}

impl Default for AssistantDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            language: Language::Spanish,
            tone: Tone::Professional,
            short: 30,
            medium: 40,
            long: 30,
            audio_enabled: false,
        }
    }
}

impl From<&AssistantRecord> for AssistantDraft {
    fn from(record: &AssistantRecord) -> Self {
        Self {
            name: truncate_chars(&record.name, NAME_MAX_CHARS),
            language: record.language,
            tone: record.tone,
            short: i64::from(record.response_config.short),
            medium: i64::from(record.response_config.medium),
            long: i64::from(record.response_config.long),
            audio_enabled: record.response_config.audio_enabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Language,
    Tone,
    Short,
    Medium,
    Long,
    AudioEnabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    FieldChanged(FormField),
    StepChanged(FormState),
    ValidationFailed(ValidationError),
    Finalized(AssistantRecord),
    Cancelled,
}

/// Sum readout for the distribution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionStatus {
    pub sum: i64,
    pub is_valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("cannot {action} while the form is {state}")]
    InvalidTransition {
        state: FormState,
        action: &'static str,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type FormListener = Box<dyn Fn(&FormEvent) + Send + Sync>;

pub struct AssistantForm {
    state: FormState,
    mode: FormMode,
    draft: AssistantDraft,
    last_error: Option<ValidationError>,
    listeners: Vec<FormListener>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl Default for AssistantForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AssistantForm {
    pub fn new() -> Self {
        Self {
            state: FormState::Closed,
            mode: FormMode::Create,
            draft: AssistantDraft::default(),
            last_error: None,
            listeners: Vec::new(),
            ids: Arc::new(UuidGenerator),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn on_event(&mut self, listener: FormListener) {
        self.listeners.push(listener);
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn draft(&self) -> &AssistantDraft {
        &self.draft
    }

    pub fn last_error(&self) -> Option<&ValidationError> {
        self.last_error.as_ref()
    }

    pub fn distribution_status(&self) -> DistributionStatus {
        let sum = self
            .draft
            .short
            .saturating_add(self.draft.medium)
            .saturating_add(self.draft.long);
        DistributionStatus {
            sum,
            is_valid: sum == 100,
        }
    }

    pub fn open_create(&mut self) {
        self.open(FormMode::Create, AssistantDraft::default());
    }

    pub fn open_edit(&mut self, record: &AssistantRecord) {
        self.open(
            FormMode::Edit(Box::new(record.clone())),
            AssistantDraft::from(record),
        );
    }

    fn open(&mut self, mode: FormMode, draft: AssistantDraft) {
        self.mode = mode;
        self.draft = draft;
        self.last_error = None;
        self.transition(FormState::Step1);
    }

    /// Keystrokes past the ceiling never reach the field.
    pub fn set_name(&mut self, name: &str) {
        self.draft.name = truncate_chars(name, NAME_MAX_CHARS);
        self.emit(FormEvent::FieldChanged(FormField::Name));
    }

    pub fn set_language(&mut self, language: Language) {
        self.draft.language = language;
        self.emit(FormEvent::FieldChanged(FormField::Language));
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.draft.tone = tone;
        self.emit(FormEvent::FieldChanged(FormField::Tone));
    }

    pub fn set_short(&mut self, value: i64) {
        self.draft.short = value;
        self.emit(FormEvent::FieldChanged(FormField::Short));
    }

    pub fn set_medium(&mut self, value: i64) {
        self.draft.medium = value;
        self.emit(FormEvent::FieldChanged(FormField::Medium));
    }

    pub fn set_long(&mut self, value: i64) {
        self.draft.long = value;
        self.emit(FormEvent::FieldChanged(FormField::Long));
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.draft.audio_enabled = enabled;
        self.emit(FormEvent::FieldChanged(FormField::AudioEnabled));
    }

    /// Step1 -> Step2, guarded by the name rules against `existing`.
    pub fn next(&mut self, existing: &[AssistantRecord]) -> Result<(), FormError> {
        self.require(FormState::Step1, "advance")?;

        let editing_id = match &self.mode {
            FormMode::Edit(record) => Some(record.id.as_str()),
            FormMode::Create => None,
        };

        validate_name(&self.draft.name, existing, editing_id).map_err(|e| self.reject(e))?;

        self.last_error = None;
        self.transition(FormState::Step2);
        Ok(())
    }

    /// Step2 -> Step1. Step 2 values are kept.
    pub fn back(&mut self) -> Result<(), FormError> {
        self.require(FormState::Step2, "go back")?;
        self.last_error = None;
        self.transition(FormState::Step1);
        Ok(())
    }

    /// Step2 -> Closed, producing the finished record.
    pub fn submit(&mut self) -> Result<AssistantRecord, FormError> {
        self.require(FormState::Step2, "submit")?;

        let draft = &self.draft;
        let response_config =
            validate_distribution(draft.short, draft.medium, draft.long, draft.audio_enabled)
                .map_err(|e| self.reject(e))?;

        let (id, created_at, system_prompt) = match &self.mode {
            FormMode::Edit(initial) => (
                initial.id.clone(),
                initial.created_at.clone(),
                initial.system_prompt.clone(),
            ),
            FormMode::Create => (self.ids.next_id(), self.clock.now_iso(), None),
        };

        let record = AssistantRecord {
            id,
            name: sanitize_input(&self.draft.name),
            language: self.draft.language,
            tone: self.draft.tone,
            response_config,
            created_at,
            system_prompt,
        };

        debug!(id = %record.id, edit = self.is_edit(), "Assistant form finalized");
        self.emit(FormEvent::Finalized(record.clone()));
        self.reset();
        Ok(record)
    }

    /// Discards the draft. Closing an already-closed form does nothing.
    pub fn cancel(&mut self) {
        if self.state == FormState::Closed {
            return;
        }
        self.reset();
        self.emit(FormEvent::Cancelled);
    }

    fn reset(&mut self) {
        self.mode = FormMode::Create;
        self.draft = AssistantDraft::default();
        self.last_error = None;
        self.transition(FormState::Closed);
    }

    fn require(&self, expected: FormState, action: &'static str) -> Result<(), FormError> {
        if self.state != expected {
            return Err(FormError::InvalidTransition {
                state: self.state,
                action,
            });
        }
        Ok(())
    }

    fn reject(&mut self, error: ValidationError) -> FormError {
        self.last_error = Some(error.clone());
        self.emit(FormEvent::ValidationFailed(error.clone()));
        FormError::Validation(error)
    }

    fn transition(&mut self, to: FormState) {
        self.state = to;
        self.emit(FormEvent::StepChanged(to));
    }

    fn emit(&self, event: FormEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
