use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use bytes::Bytes;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use super::build_router;
use crate::assistant::testing::ScriptedModel;
use crate::config::{Config, TriggerSettings};
use crate::errors::AppError;
use crate::speech::{AudioClip, SpeechService};
use crate::state::AppState;
use crate::store::MemoryStore;

struct FakeSpeech {
    transcript: Option<&'static str>,
}

#[async_trait]
impl SpeechService for FakeSpeech {
    async fn transcribe(&self, _clip: AudioClip) -> Result<String, AppError> {
        self.transcript
            .map(str::to_string)
            .ok_or_else(|| AppError::Speech("upstream unavailable".to_string()))
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Bytes, AppError> {
        Ok(Bytes::from(format!("mp3:{voice}:{text}")))
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    state: AppState,
}

impl Harness {
    fn new(model: ScriptedModel, transcript: Option<&'static str>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState {
            store: store.clone(),
            llm: Arc::new(model),
            speech: Arc::new(FakeSpeech { transcript }),
            config: Config {
                database_url: None,
                anthropic_api_key: None,
                openai_api_key: None,
                tts_voice: "alloy".to_string(),
                port: 0,
                rust_log: "info".to_string(),
                triggers: TriggerSettings::default(),
            },
        };
        Self { store, state }
    }

    fn plain() -> Self {
        Self::new(ScriptedModel::new(vec![]), None)
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(self.state.clone()).oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(Method::POST, uri, body)).await
    }
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn voice_request(user_id: &str) -> Request<Body> {
    let boundary = "portal-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"user_id\"\r\n\r\n\
         {user_id}\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"audio\"; filename=\"note.webm\"\r\n\
         Content-Type: audio/webm\r\n\r\n\
         not-really-audio\r\n\
         --{boundary}--\r\n"
    );
    Request::post("/api/voice")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let h = Harness::plain();
    let (status, body) = h.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_invalid_user_ids_rejected_without_store_access() {
    let h = Harness::plain();
    for bad in ["abc", "", "3f2b8c1e-4d5a-0b6c-8d7e-9f0a1b2c3d4e"] {
        let (status, body) = h.get(&format!("/api/tickets?user_id={bad}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "user_id={bad:?}");
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("user_id"));

        let (status, _) = h
            .post(
                "/api/appointments",
                json!({
                    "user_id": bad,
                    "appointment_type": "consultation",
                    "appointment_date": "2025-12-01"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = h.get("/api/resume").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let counts = h.store.counts().await;
    assert_eq!(counts.domain_rows(), 0);
    assert_eq!(counts.action_logs, 0);
}

#[tokio::test]
async fn test_book_appointment_through_agent_route() {
    let h = Harness::plain();
    let user = Uuid::new_v4().to_string();
    let (status, body) = h
        .post(
            "/api/agent/actions",
            json!({
                "action": "book_appointment",
                "payload": {
                    "user_id": user,
                    "appointment_type": "consultation",
                    "appointment_date": "2025-12-01"
                }
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "scheduled");
    assert_eq!(body["data"]["appointment_date"], "2025-12-01");

    let counts = h.store.counts().await;
    assert_eq!(counts.appointments, 1);
    let logs = h.store.action_logs().await;
    assert_eq!(logs.len(), 1);
    assert!(logs[0].success);

    let (status, body) = h.get(&format!("/api/agent/logs?user_id={user}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_action_and_missing_field_are_400() {
    let h = Harness::plain();
    let user = Uuid::new_v4().to_string();

    let (status, body) = h
        .post(
            "/api/agent/actions",
            json!({"action": "launch_rocket", "payload": {"user_id": user}}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown action: launch_rocket");

    let (status, _) = h
        .post(
            "/api/agent/actions",
            json!({"action": "create_ticket", "payload": {"user_id": user, "title": "Late salary"}}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(h.store.counts().await.domain_rows(), 0);
    assert_eq!(h.store.action_logs().await.len(), 2);
}

#[tokio::test]
async fn test_action_catalogue_lists_every_action() {
    let h = Harness::plain();
    let (status, body) = h.get("/api/agent/actions").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), crate::agent::ActionKind::ALL.len());
    assert!(names.contains(&"book_appointment"));
}

#[tokio::test]
async fn test_double_cancel_is_domain_error() {
    let h = Harness::plain();
    let user = Uuid::new_v4().to_string();
    let (_, booked) = h
        .post(
            "/api/appointments",
            json!({
                "user_id": user,
                "appointment_type": "consultation",
                "appointment_date": "2025-12-01"
            }),
        )
        .await;
    let id = booked["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/appointments/{id}/cancel");

    let (status, body) = h.post(&uri, json!({"user_id": user})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, body) = h.post(&uri, json!({"user_id": user})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "error": "Appointment is already cancelled"})
    );
}

#[tokio::test]
async fn test_missing_ticket_is_404_and_bad_path_id_is_400() {
    let h = Harness::plain();
    let user = Uuid::new_v4();

    let (status, body) = h
        .get(&format!("/api/tickets/{}?user_id={user}", Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = h.get(&format!("/api/tickets/not-a-uuid?user_id={user}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_regulations_served_from_fresh_store() {
    let h = Harness::plain();

    let (status, body) = h.get("/api/regulations").await;
    assert_eq!(status, StatusCode::OK);
    let all = body["data"].as_array().unwrap();
    assert!(!all.is_empty());

    let (_, body) = h.get("/api/regulations?q=maternity&category=LEAVE").await;
    let hits = body["data"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    let id = hits[0]["id"].as_str().unwrap().to_string();

    let (status, body) = h.get(&format!("/api/regulations/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Maternity Leave");

    let (status, body) = h
        .post(
            "/api/agent/actions",
            json!({"action": "search_regulations", "payload": {"query": "overtime"}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let h = Harness::plain();
    let req = Request::post("/api/tickets")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = h.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_delete_course_returns_message() {
    let h = Harness::plain();
    let user = Uuid::new_v4().to_string();
    let (status, _) = h
        .send(json_request(
            Method::PUT,
            "/api/resume",
            json!({"user_id": user, "job_title": "Electrician"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, course) = h
        .post(
            "/api/resume/courses",
            json!({"user_id": user, "course_name": "Wiring Safety", "provider": "VTC"}),
        )
        .await;
    let course_id = course["data"]["id"].as_str().unwrap().to_string();

    let req = Request::delete(format!("/api/resume/courses/{course_id}?user_id={user}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = h.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Course deleted"}));
}

#[tokio::test]
async fn test_chat_reply_hides_action_metadata() {
    let model = ScriptedModel::new(vec![
        r#"{"reply":"Opening a ticket.","action":{"name":"create_ticket","payload":{"title":"Unpaid overtime","category":"complaint"}}}"#,
        r#"{"reply":"Your complaint has been filed."}"#,
    ]);
    let h = Harness::new(model, None);
    let user = Uuid::new_v4();

    let (status, body) = h
        .post(
            "/api/chat",
            json!({"user_id": user.to_string(), "message": "I want to file a complaint about overtime"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "data": {"reply": "Your complaint has been filed."}})
    );

    let counts = h.store.counts().await;
    assert_eq!(counts.tickets, 1);
    assert_eq!(counts.chat_messages, 2);
    assert_eq!(h.store.action_logs().await[0].user_id, Some(user));
}

#[tokio::test]
async fn test_voice_failure_degrades_to_apology() {
    let h = Harness::new(ScriptedModel::new(vec![]), None);
    let (status, body) = h.send(voice_request(&Uuid::new_v4().to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["reply"].as_str().unwrap().starts_with("Sorry"));
}

#[tokio::test]
async fn test_voice_rejects_malformed_user_id() {
    let h = Harness::new(ScriptedModel::new(vec![]), Some("hello"));
    let (status, body) = h.send(voice_request("abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_voice_chains_transcript_into_chat() {
    let model = ScriptedModel::new(vec![r#"{"reply":"Hello, how can I help?"}"#]);
    let h = Harness::new(model, Some("hello"));
    let (status, body) = h.send(voice_request(&Uuid::new_v4().to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({"transcript": "hello", "reply": "Hello, how can I help?"})
    );
}

#[tokio::test]
async fn test_tts_returns_audio_bytes() {
    let h = Harness::plain();
    let response = build_router(h.state.clone())
        .oneshot(json_request(
            Method::POST,
            "/api/tts",
            json!({"text": "Your appointment is tomorrow"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"mp3:alloy:Your appointment is tomorrow");
}

#[tokio::test]
async fn test_proactive_run_is_idempotent() {
    let h = Harness::plain();
    let user = Uuid::new_v4().to_string();
    let tomorrow = (chrono::Utc::now().date_naive() + chrono::Duration::days(1)).to_string();
    h.post(
        "/api/appointments",
        json!({"user_id": user, "appointment_type": "inspection", "appointment_date": tomorrow}),
    )
    .await;

    let (status, first) = h.post("/api/proactive/run", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["total_created"], 1);
    let (_, second) = h.post("/api/proactive/run", json!({})).await;
    assert_eq!(second["data"]["total_created"], 0);

    let (_, pending) = h.get(&format!("/api/proactive?user_id={user}")).await;
    let events = pending["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    let event_id = events[0]["id"].as_str().unwrap().to_string();

    let (status, acted) = h
        .post(
            &format!("/api/proactive/{event_id}/acted"),
            json!({"user_id": user, "action_taken": "dismissed"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(acted["data"]["acted"], true);
}
