// Prompt fragments for the conversational assistant.
// The action catalogue is rendered at call time from the registry.

use crate::agent::ActionSpec;

/// Instructs the model to answer with a JSON envelope and at most one action.
pub const ASSISTANT_SYSTEM: &str = "\
    You are the virtual assistant of the Ministry of Labor citizen portal. \
    You help citizens with employment contracts, certificates, labor office appointments, \
    resumes and training courses, labor regulations, support tickets and domestic labor requests. \
    Answer briefly and politely, in the language the citizen uses. \
    Never invent records: when you need data or must change something, request an action.";

pub const RESPONSE_FORMAT: &str = "\
    You MUST respond with valid JSON only, shaped as \
    {\"reply\": \"<text for the citizen>\", \"action\": null} or \
    {\"reply\": \"<text for the citizen>\", \"action\": {\"name\": \"<action name>\", \"payload\": {...}}}. \
    Request at most one action. Do not include user_id in the payload; it is added for you. \
    Dates use the format YYYY-MM-DD.";

/// Builds the full system prompt with the action catalogue.
pub fn assistant_system_prompt(actions: &[ActionSpec]) -> String {
    let mut prompt = format!("{ASSISTANT_SYSTEM}\n\nAvailable actions:\n");
    for action in actions {
        prompt.push_str(&format!(
            "- {}: {} (required: {})\n",
            action.name,
            action.description,
            action.required_fields.join(", ")
        ));
    }
    prompt.push('\n');
    prompt.push_str(RESPONSE_FORMAT);
    prompt
}
