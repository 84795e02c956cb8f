pub mod handlers;
pub mod models;
pub mod routes;

use std::sync::Arc;

use tera::Tera;

use crate::completion::CompletionClient;
use crate::controller::InteractionController;
use crate::session::SessionStore;

// Shared by every worker
pub struct AppState {
    pub tera: Tera,
    pub controller: InteractionController,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(tera: Tera, client: Arc<dyn CompletionClient>) -> Self {
        Self::with_sessions(tera, client, SessionStore::new())
    }

    pub fn with_sessions(tera: Tera, client: Arc<dyn CompletionClient>, sessions: SessionStore) -> Self {
        Self {
            tera,
            controller: InteractionController::new(client),
            sessions,
        }
    }
}

/// Load every template under `dir` with HTML autoescaping.
pub fn load_templates(dir: &str) -> Result<Tera, tera::Error> {
    let mut tera = Tera::new(&format!("{}/**/*", dir.trim_end_matches('/')))?;
    tera.autoescape_on(vec![".html"]);
    Ok(tera)
}
