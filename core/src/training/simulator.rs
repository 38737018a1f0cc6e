use crate::assistant::{AssistantRecord, Language};
use crate::traits::{Clock, IdGenerator, SystemClock, UuidGenerator};
use chrono::Local;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1500);

const REPLIES_ES: &[&str] = &[
    "¡Entendido! Cuéntame más sobre eso.",
    "Esa es una excelente pregunta. Déjame explicarte...",
    "Claro, puedo ayudarte con gusto.",
    "He registrado esa información en el sistema.",
    "¿Te gustaría agendar una llamada con un experto?",
];

const REPLIES_EN: &[&str] = &[
    "Got it! Tell me more about that.",
    "That's a great question. Let me explain...",
    "Sure, I'd be happy to help.",
    "I've logged that information in the system.",
    "Would you like to schedule a call with an expert?",
];

const REPLIES_PT: &[&str] = &[
    "Entendido! Conte-me mais sobre isso.",
    "Essa é uma excelente pergunta. Deixe-me explicar...",
    "Claro, posso ajudar com prazer.",
    "Registrei essa informação no sistema.",
    "Gostaria de agendar uma ligação com um especialista?",
];

fn greeting(language: Language) -> &'static str {
    match language {
        Language::Spanish => "Hola, ¿en qué puedo ayudarte hoy?",
        Language::English => "Hi, how can I help you today?",
        Language::Portuguese => "Olá, como posso ajudar você hoje?",
    }
}

fn replies(language: Language) -> &'static [&'static str] {
    match language {
        Language::Spanish => REPLIES_ES,
        Language::English => REPLIES_EN,
        Language::Portuguese => REPLIES_PT,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    /// Local wall-clock `HH:MM`.
    pub time: String,
}

/// Scripted conversation preview: every user message is answered with a
/// canned reply after an artificial delay. No model is involved.
pub struct ChatSimulator {
    assistant_name: String,
    language: Language,
    messages: Vec<ChatMessage>,
    typing: bool,
    delay: Duration,
    rng: StdRng,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl ChatSimulator {
    pub fn new(assistant: &AssistantRecord) -> Self {
        let mut simulator = Self {
            assistant_name: assistant.name.clone(),
            language: assistant.language,
            messages: Vec::new(),
            typing: false,
            delay: DEFAULT_REPLY_DELAY,
            rng: StdRng::from_entropy(),
            ids: Arc::new(UuidGenerator),
            clock: Arc::new(SystemClock),
        };
        simulator.push(greeting(assistant.language), Sender::Bot);
        simulator
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Records the user's message and marks the bot as typing. Blank input
    /// is ignored and returns `false`.
    pub fn push_user(&mut self, input: &str) -> bool {
        if input.trim().is_empty() {
            return false;
        }
        self.push(input, Sender::User);
        self.typing = true;
        true
    }

    /// Waits out the reply delay and appends one canned reply.
    pub async fn reply(&mut self) -> &ChatMessage {
        tokio::time::sleep(self.delay).await;

        let pool = replies(self.language);
        let text = pool.choose(&mut self.rng).copied().unwrap_or(pool[0]);
        self.typing = false;
        self.push(text, Sender::Bot)
    }

    /// `push_user` followed by `reply`. Returns the bot's reply, or `None`
    /// for blank input.
    pub async fn send(&mut self, input: &str) -> Option<&ChatMessage> {
        if !self.push_user(input) {
            return None;
        }
        Some(self.reply().await)
    }

    /// Clears the transcript entirely; the greeting is not re-added.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.typing = false;
    }

    fn push(&mut self, text: &str, sender: Sender) -> &ChatMessage {
        let time = self
            .clock
            .now()
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string();

        self.messages.push(ChatMessage {
            id: self.ids.next_id(),
            text: text.to_string(),
            sender,
            time,
        });
        &self.messages[self.messages.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::seed_assistants;
    use crate::traits::SequentialIds;

    fn simulator(language: Language) -> ChatSimulator {
        let mut record = seed_assistants(&SystemClock).remove(0);
        record.language = language;
        ChatSimulator::new(&record)
            .with_seed(7)
            .with_ids(Arc::new(SequentialIds::new("msg")))
    }

    #[test]
    fn opens_with_greeting_in_assistant_language() {
        let sim = simulator(Language::Portuguese);
        assert_eq!(sim.messages().len(), 1);
        assert_eq!(sim.messages()[0].sender, Sender::Bot);
        assert_eq!(sim.messages()[0].text, "Olá, como posso ajudar você hoje?");
        assert_eq!(sim.messages()[0].time.len(), 5);
        assert_eq!(sim.assistant_name(), "Asistente de Ventas");
    }

    #[tokio::test(start_paused = true)]
    async fn user_message_gets_canned_reply() {
        let mut sim = simulator(Language::Spanish);

        let reply = sim.send("¿Tienen envíos?").await.cloned().unwrap();
        assert_eq!(reply.sender, Sender::Bot);
        assert!(REPLIES_ES.contains(&reply.text.as_str()));
        assert!(!sim.is_typing());

        let senders: Vec<_> = sim.messages().iter().map(|m| m.sender).collect();
        assert_eq!(senders, [Sender::Bot, Sender::User, Sender::Bot]);
        assert_eq!(sim.messages()[1].text, "¿Tienen envíos?");
    }

    #[tokio::test(start_paused = true)]
    async fn reply_waits_for_delay() {
        let mut sim = simulator(Language::English).with_delay(Duration::from_millis(1500));
        let start = tokio::time::Instant::now();

        assert!(sim.push_user("hello"));
        assert!(sim.is_typing());
        sim.reply().await;

        assert!(start.elapsed() >= Duration::from_millis(1500));
        assert!(REPLIES_EN.contains(&sim.messages()[2].text.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_is_ignored() {
        let mut sim = simulator(Language::English);
        assert!(sim.send("   ").await.is_none());
        assert_eq!(sim.messages().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn same_seed_same_replies() {
        let mut a = simulator(Language::English);
        let mut b = simulator(Language::English);

        for _ in 0..5 {
            let ra = a.send("ping").await.map(|m| m.text.clone());
            let rb = b.send("ping").await.map(|m| m.text.clone());
            assert_eq!(ra, rb);
        }
    }

    #[test]
    fn reset_clears_everything() {
        let mut sim = simulator(Language::Spanish);
        sim.push_user("hola");
        sim.reset();
        assert!(sim.messages().is_empty());
        assert!(!sim.is_typing());
    }
}
