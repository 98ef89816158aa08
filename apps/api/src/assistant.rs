//! Conversational assistant: routes a message to a model, lets the model
//! request one agent action, and keeps both sides of the conversation.
//! Tool metadata is persisted with the assistant turn but never returned.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::agent::{dispatch, supported_actions};
use crate::errors::AppError;
use crate::llm_client::prompts::assistant_system_prompt;
use crate::llm_client::{strip_json_fences, ChatModel, ChatTurn};
use crate::model_router::{detect_intent, intent_complexity, route, Complexity};
use crate::models::chat::{ChatMessage, ChatRole};
use crate::store::Store;

const HISTORY_LIMIT: i64 = 12;
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// What the client sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
struct ModelReply {
    reply: String,
    #[serde(default)]
    action: Option<ActionCall>,
}

#[derive(Debug, Deserialize)]
struct ActionCall {
    name: String,
    #[serde(default)]
    payload: Value,
}

/// Falls back to the raw text when the model ignores the JSON format.
fn parse_model_reply(raw: &str) -> ModelReply {
    serde_json::from_str::<ModelReply>(strip_json_fences(raw)).unwrap_or_else(|_| ModelReply {
        reply: raw.trim().to_string(),
        action: None,
    })
}

/// `complexity` overrides the intent-derived routing when the caller
/// already knows how heavy the request is.
pub async fn respond(
    store: &dyn Store,
    model: &dyn ChatModel,
    user_id: Uuid,
    message: &str,
    complexity: Option<Complexity>,
) -> Result<ChatReply, AppError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::validation("message is required"));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::validation(format!(
            "message cannot exceed {MAX_MESSAGE_CHARS} characters"
        )));
    }

    store
        .insert_chat_message(&ChatMessage {
            id: Uuid::new_v4(),
            user_id,
            role: ChatRole::User,
            content: message.to_string(),
            metadata: None,
            created_at: Utc::now(),
        })
        .await?;

    let intent = detect_intent(message);
    let complexity = complexity.unwrap_or_else(|| intent_complexity(intent));
    let config = route(complexity);
    let system = assistant_system_prompt(&supported_actions());
    let mut turns = history_turns(store, user_id).await?;

    let raw = model
        .complete(&config, &system, &turns)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;
    let first = parse_model_reply(&raw);

    let mut metadata = json!({
        "intent": intent,
        "complexity": complexity,
        "model": config.model,
    });

    let reply = match first.action {
        None => first.reply,
        Some(call) => {
            let payload = with_user_id(call.payload, user_id);
            let outcome = dispatch(store, &call.name, payload).await;
            let (success, result_text) = match &outcome {
                Ok(data) => (true, data.to_string()),
                Err(e) => (false, json!({ "error": e.client_message() }).to_string()),
            };
            metadata["action"] = json!({ "name": call.name, "success": success });
            info!("Assistant requested '{}' for user {user_id} (success={success})", call.name);

            turns.push(ChatTurn {
                role: "assistant",
                content: raw.clone(),
            });
            turns.push(ChatTurn {
                role: "user",
                content: format!(
                    "Result of action {}: {result_text}\nNow answer the citizen using this result. \
                     Do not request another action.",
                    call.name
                ),
            });
            match model.complete(&config, &system, &turns).await {
                Ok(text) => parse_model_reply(&text).reply,
                Err(e) => {
                    warn!("Follow-up completion failed: {e}");
                    first.reply
                }
            }
        }
    };

    store
        .insert_chat_message(&ChatMessage {
            id: Uuid::new_v4(),
            user_id,
            role: ChatRole::Assistant,
            content: reply.clone(),
            metadata: Some(metadata),
            created_at: Utc::now(),
        })
        .await?;

    Ok(ChatReply { reply })
}

/// Recent history as model turns; the sequence must start with a user turn.
async fn history_turns(store: &dyn Store, user_id: Uuid) -> Result<Vec<ChatTurn>, AppError> {
    let history = store.recent_chat_messages(user_id, HISTORY_LIMIT).await?;
    Ok(history
        .into_iter()
        .skip_while(|m| m.role != ChatRole::User)
        .map(|m| ChatTurn {
            role: m.role.as_str(),
            content: m.content,
        })
        .collect())
}

/// The caller's identity always wins over whatever the model put in the payload.
fn with_user_id(payload: Value, user_id: Uuid) -> Value {
    let mut map = match payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    map.insert("user_id".to_string(), Value::String(user_id.to_string()));
    Value::Object(map)
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedModel;
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_parse_model_reply_falls_back_to_text() {
        let parsed = parse_model_reply("Sure, happy to help.");
        assert_eq!(parsed.reply, "Sure, happy to help.");
        assert!(parsed.action.is_none());

        let parsed = parse_model_reply(
            "```json\n{\"reply\":\"ok\",\"action\":{\"name\":\"get_resume\",\"payload\":{}}}\n```",
        );
        assert_eq!(parsed.action.unwrap().name, "get_resume");
    }

    #[test]
    fn test_with_user_id_overrides_model_value() {
        let user = Uuid::new_v4();
        let payload = with_user_id(json!({"user_id": "someone-else", "title": "x"}), user);
        assert_eq!(payload["user_id"], user.to_string());
        assert_eq!(payload["title"], "x");
        assert_eq!(with_user_id(json!("junk"), user), json!({"user_id": user.to_string()}));
    }

    #[tokio::test]
    async fn test_plain_reply_stores_both_turns() {
        let store = MemoryStore::new();
        let model = ScriptedModel::new(vec![r#"{"reply":"Hello! How can I help?","action":null}"#]);
        let user = Uuid::new_v4();

        let reply = respond(&store, &model, user, "hello", None).await.unwrap();
        assert_eq!(reply.reply, "Hello! How can I help?");

        let history = store.recent_chat_messages(user, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[1].metadata.as_ref().unwrap()["intent"], "greeting");

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls[0].0, route(Complexity::Simple));
    }

    #[tokio::test]
    async fn test_action_runs_and_metadata_is_internal() {
        let store = MemoryStore::new();
        let model = ScriptedModel::new(vec![
            r#"{"reply":"Booking now.","action":{"name":"book_appointment","payload":{"appointment_type":"consultation","appointment_date":"2025-12-01"}}}"#,
            r#"{"reply":"Your consultation is booked for 2025-12-01.","action":null}"#,
        ]);
        let user = Uuid::new_v4();

        let reply = respond(&store, &model, user, "Please book a consultation on 1 December", None)
            .await
            .unwrap();
        assert_eq!(reply.reply, "Your consultation is booked for 2025-12-01.");

        let counts = store.counts().await;
        assert_eq!(counts.appointments, 1);
        assert_eq!(counts.action_logs, 1);

        let history = store.recent_chat_messages(user, 10).await.unwrap();
        let meta = history[1].metadata.as_ref().unwrap();
        assert_eq!(meta["action"]["name"], "book_appointment");
        assert_eq!(meta["action"]["success"], true);

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].1.last().unwrap().content.contains("scheduled"));
    }

    #[tokio::test]
    async fn test_failed_action_is_reported_to_model() {
        let store = MemoryStore::new();
        let model = ScriptedModel::new(vec![
            r#"{"reply":"Closing.","action":{"name":"close_ticket","payload":{"ticket_id":"3f2b8c1e-4d5a-4b6c-8d7e-9f0a1b2c3d4e"}}}"#,
            r#"{"reply":"I could not find that ticket."}"#,
        ]);
        let user = Uuid::new_v4();
        let reply = respond(&store, &model, user, "close my ticket", None).await.unwrap();
        assert_eq!(reply.reply, "I could not find that ticket.");

        let logs = store.action_logs().await;
        assert_eq!(logs.len(), 1);
        assert!(!logs[0].success);
        let calls = model.calls.lock().unwrap();
        assert!(calls[1].1.last().unwrap().content.contains("not found"));
    }

    #[tokio::test]
    async fn test_complexity_hint_overrides_intent() {
        let store = MemoryStore::new();
        let model = ScriptedModel::new(vec![r#"{"reply":"Hi."}"#]);
        respond(&store, &model, Uuid::new_v4(), "hello", Some(Complexity::Complex))
            .await
            .unwrap();
        let calls = model.calls.lock().unwrap();
        assert_eq!(calls[0].0, route(Complexity::Complex));
    }

    #[tokio::test]
    async fn test_model_failure_is_llm_error() {
        let store = MemoryStore::new();
        let model = ScriptedModel::failing("overloaded");
        let err = respond(&store, &model, Uuid::new_v4(), "hello", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_empty_message_rejected_before_store() {
        let store = MemoryStore::new();
        let model = ScriptedModel::new(vec![]);
        assert!(matches!(
            respond(&store, &model, Uuid::new_v4(), "   ", None).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(store.counts().await.chat_messages, 0);
    }
}
