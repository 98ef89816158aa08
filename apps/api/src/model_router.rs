//! Model Router: picks one of three hosted model configurations from a
//! coarse complexity label. Stateless; no retries or cross-provider fallback.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    /// Unrecognized labels fall back to `Medium`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "simple" => Complexity::Simple,
            "complex" => Complexity::Complex,
            _ => Complexity::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Anthropic,
    OpenAi,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelConfig {
    pub provider: Provider,
    pub model: &'static str,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Greetings, thanks, single lookups: cheapest model.
const SIMPLE_INTENTS: &[&str] = &[
    "greeting",
    "thanks",
    "goodbye",
    "get_profile",
    "get_contracts",
    "get_certificates",
    "get_appointments",
    "get_ticket_status",
    "get_resume",
];

/// Multi-step reasoning, legal interpretation, document drafting.
const COMPLEX_INTENTS: &[&str] = &[
    "regulation_question",
    "legal_advice",
    "labor_dispute",
    "resume_writing",
    "career_guidance",
    "contract_review",
];

pub fn route(complexity: Complexity) -> ModelConfig {
    match complexity {
        // ~$0.15 / 1M input tokens
        Complexity::Simple => ModelConfig {
            provider: Provider::OpenAi,
            model: "gpt-4o-mini",
            max_tokens: 512,
            temperature: 0.3,
        },
        Complexity::Medium => ModelConfig {
            provider: Provider::Anthropic,
            model: "claude-haiku-4-5",
            max_tokens: 1024,
            temperature: 0.4,
        },
        Complexity::Complex => ModelConfig {
            provider: Provider::Anthropic,
            model: "claude-sonnet-4-5",
            max_tokens: 2048,
            temperature: 0.2,
        },
    }
}

pub fn intent_complexity(intent: &str) -> Complexity {
    let intent = intent.trim();
    if SIMPLE_INTENTS.contains(&intent) {
        Complexity::Simple
    } else if COMPLEX_INTENTS.contains(&intent) {
        Complexity::Complex
    } else {
        Complexity::Medium
    }
}

/// Keyword-based intent guess for a chat message. Order matters: the first
/// matching rule wins, so narrower rules come first. Keywords match whole
/// words only, so "hi" does not fire on "sushi".
pub fn detect_intent(message: &str) -> &'static str {
    const RULES: &[(&str, &[&str])] = &[
        ("labor_dispute", &["dispute", "unfair dismissal", "fired", "complaint against"]),
        (
            "contract_review",
            &["review my contract", "check my contract", "contract review", "is my contract"],
        ),
        (
            "legal_advice",
            &["legal advice", "lawyer", "my rights", "sue", "take legal action"],
        ),
        (
            "regulation_question",
            &["regulation", "regulations", "law", "laws", "article", "entitled", "legal"],
        ),
        ("resume_writing", &["write my resume", "improve my resume", "cv"]),
        ("career_guidance", &["career", "which job", "job advice"]),
        ("get_ticket_status", &["ticket status", "my ticket"]),
        ("get_appointments", &["my appointments", "when is my appointment"]),
        ("get_certificates", &["my certificates"]),
        ("get_contracts", &["my contracts", "my contract"]),
        ("thanks", &["thank you", "thanks"]),
        ("greeting", &["hello", "hi", "hey", "good morning", "good evening", "salam"]),
    ];

    let text = word_padded(message);
    RULES
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|k| text.contains(&format!(" {k} ")))
        })
        .map(|(intent, _)| *intent)
        .unwrap_or("general")
}

/// Lowercase words joined by single spaces, with a space at each end.
fn word_padded(message: &str) -> String {
    let lower = message.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    format!(" {} ", words.join(" "))
}
