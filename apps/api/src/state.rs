use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ChatModel;
use crate::speech::SpeechService;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in deployment, `MemoryStore` when no DATABASE_URL is set.
    pub store: Arc<dyn Store>,
    pub llm: Arc<dyn ChatModel>,
    pub speech: Arc<dyn SpeechService>,
    pub config: Config,
}
