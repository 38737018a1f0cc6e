use crate::traits::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 30;
pub const SYSTEM_PROMPT_MAX_CHARS: usize = 2000;

/// Spanish spellings are accepted on read so blobs written by the earlier
/// browser console still load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Language {
    #[serde(alias = "Español")]
    Spanish,
    #[serde(alias = "Inglés")]
    English,
    #[serde(alias = "Portugués")]
    Portuguese,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Spanish, Language::English, Language::Portuguese];
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spanish => write!(f, "Spanish"),
            Self::English => write!(f, "English"),
            Self::Portuguese => write!(f, "Portuguese"),
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spanish" | "español" | "espanol" | "es" => Ok(Self::Spanish),
            "english" | "inglés" | "ingles" | "en" => Ok(Self::English),
            "portuguese" | "portugués" | "portugues" | "pt" => Ok(Self::Portuguese),
            _ => Err(anyhow::anyhow!(
                "Unknown language: {}. Available: spanish, english, portuguese",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Tone {
    Formal,
    Casual,
    #[serde(alias = "Profesional")]
    Professional,
    #[serde(alias = "Amigable")]
    Friendly,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Professional, Tone::Friendly, Tone::Casual, Tone::Formal];
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Formal => write!(f, "Formal"),
            Self::Casual => write!(f, "Casual"),
            Self::Professional => write!(f, "Professional"),
            Self::Friendly => write!(f, "Friendly"),
        }
    }
}

impl FromStr for Tone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "formal" => Ok(Self::Formal),
            "casual" => Ok(Self::Casual),
            "professional" | "profesional" => Ok(Self::Professional),
            "friendly" | "amigable" => Ok(Self::Friendly),
            _ => Err(anyhow::anyhow!(
                "Unknown tone: {}. Available: formal, casual, professional, friendly",
                s
            )),
        }
    }
}

/// Response-length mix in percent plus the audio toggle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseConfig {
    pub short: u8,
    pub medium: u8,
    pub long: u8,
    pub audio_enabled: bool,
}

impl ResponseConfig {
    pub fn sum(&self) -> u32 {
        u32::from(self.short) + u32::from(self.medium) + u32::from(self.long)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRecord {
    pub id: String,
    pub name: String,
    pub language: Language,
    pub tone: Tone,
    pub response_config: ResponseConfig,
    pub created_at: String,
    #[serde(
        default,
        alias = "trainingData",
        skip_serializing_if = "Option::is_none"
    )]
    pub system_prompt: Option<String>,
}

impl AssistantRecord {
    pub fn system_prompt_or_empty(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or("")
    }
}

/// Partial update. `id` and `created_at` cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssistantPatch {
    pub name: Option<String>,
    pub language: Option<Language>,
    pub tone: Option<Tone>,
    pub response_config: Option<ResponseConfig>,
    pub system_prompt: Option<String>,
}

impl AssistantPatch {
    pub fn system_prompt(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, record: &mut AssistantRecord) {
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(language) = self.language {
            record.language = language;
        }
        if let Some(tone) = self.tone {
            record.tone = tone;
        }
        if let Some(response_config) = self.response_config {
            record.response_config = response_config;
        }
        if let Some(system_prompt) = self.system_prompt {
            record.system_prompt = Some(system_prompt);
        }
    }
}

impl From<AssistantRecord> for AssistantPatch {
    fn from(record: AssistantRecord) -> Self {
        Self {
            name: Some(record.name),
            language: Some(record.language),
            tone: Some(record.tone),
            response_config: Some(record.response_config),
            system_prompt: record.system_prompt,
        }
    }
}

/// Demo records used when durable storage is empty or unreadable.
pub fn seed_assistants(clock: &dyn Clock) -> Vec<AssistantRecord> {
    let created_at = clock.now_iso();

    vec![
        AssistantRecord {
            id: "1".to_string(),
            name: "Asistente de Ventas".to_string(),
            language: Language::Spanish,
            tone: Tone::Professional,
            response_config: ResponseConfig {
                short: 30,
                medium: 50,
                long: 20,
                audio_enabled: true,
            },
            created_at: created_at.clone(),
            system_prompt: Some("Eres un experto en ventas...".to_string()),
        },
        AssistantRecord {
            id: "2".to_string(),
            name: "Soporte Técnico".to_string(),
            language: Language::English,
            tone: Tone::Friendly,
            response_config: ResponseConfig {
                short: 20,
                medium: 30,
                long: 50,
                audio_enabled: false,
            },
            created_at,
            system_prompt: Some("Ayudas a resolver problemas técnicos...".to_string()),
        },
    ]
}
