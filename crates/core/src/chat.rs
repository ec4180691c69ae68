//! Health assistant chatbot.
//!
//! With a language model configured, messages are proxied to it. Without one, or when the model
//! call fails, a fixed keyword table answers instead.

use crate::llm::LlmClient;
use std::sync::Arc;

pub const DEFAULT_RESPONSE: &str = "I'm your health assistant. How can I help you today? You can ask me about symptoms, diet, exercise, sleep, or common health conditions.";

const SYSTEM_PROMPT: &str = "You are a friendly health assistant. Give brief, general wellness information in plain language. You do not diagnose conditions or prescribe treatment, and you always suggest seeing a healthcare professional for anything serious, persistent or urgent.";

/// Checked in order; the first keyword contained in the message wins.
const KEYWORD_RESPONSES: &[(&str, &str)] = &[
    ("fever", "If you have a fever, rest and drink plenty of fluids. If it's high or persists, seek medical attention."),
    ("headache", "For headaches, ensure you're hydrated and try over-the-counter pain relievers. If severe or persistent, consult a doctor."),
    ("cough", "For a cough, stay hydrated and use honey (if not allergic). See a doctor if it persists more than a week."),
    ("diet", "A balanced diet includes a variety of fruits, vegetables, whole grains, lean proteins, and healthy fats."),
    ("exercise", "Aim for at least 150 minutes of moderate aerobic activity or 75 minutes of vigorous aerobic activity weekly."),
    ("sleep", "Getting 7-9 hours of quality sleep per night supports physical and mental health."),
    ("cholesterol", "Maintain healthy cholesterol with diet, exercise, and sometimes medication. Regular testing is important."),
    ("blood pressure", "Keep blood pressure healthy with diet, exercise, limited salt intake, and stress management."),
    ("diabetes", "Manage diabetes through diet, exercise, medication as prescribed, and regular monitoring."),
    ("stress", "Manage stress through exercise, mindfulness, adequate sleep, and seeking support when needed."),
];

/// Deterministic keyword answer for a message.
pub fn keyword_response(message: &str) -> &'static str {
    let lowered = message.to_lowercase();
    KEYWORD_RESPONSES
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, response)| *response)
        .unwrap_or(DEFAULT_RESPONSE)
}

/// Where a chat reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Model,
    Keywords,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub source: ReplySource,
}

#[derive(Clone, Default)]
pub struct ChatService {
    llm: Option<Arc<dyn LlmClient>>,
}

impl ChatService {
    pub fn new(llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { llm }
    }

    /// Answer a user message. Blocks while the model call is in flight.
    pub fn respond(&self, message: &str) -> ChatReply {
        let message = message.trim();

        let keywords = || ChatReply {
            text: keyword_response(message).to_string(),
            source: ReplySource::Keywords,
        };

        if message.is_empty() {
            return keywords();
        }
        let Some(llm) = &self.llm else {
            return keywords();
        };

        match llm.complete(SYSTEM_PROMPT, message) {
            Ok(text) if !text.trim().is_empty() => ChatReply {
                text: text.trim().to_string(),
                source: ReplySource::Model,
            },
            Ok(_) => {
                tracing::warn!(model = llm.model(), "empty chat reply, using keyword response");
                keywords()
            }
            Err(e) => {
                tracing::warn!(model = llm.model(), "chat model call failed: {e}");
                keywords()
            }
        }
    }
}
