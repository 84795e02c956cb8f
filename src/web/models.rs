use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::controller::Interaction;
use crate::prompts::Category;
use crate::session::ChatTurn;

#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub category: String,
    #[serde(default)]
    pub input: String,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// Absent for single-shot asks made without a session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    pub category: Category,
    pub outcome: Outcome,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Rendered { text: String },
    Ignored,
    Failed { status_code: u16, detail: String },
}

impl From<Interaction> for Outcome {
    fn from(interaction: Interaction) -> Self {
        match interaction {
            Interaction::Rendered(text) => Outcome::Rendered { text },
            Interaction::Ignored => Outcome::Ignored,
            Interaction::Failed(failure) => Outcome::Failed {
                status_code: failure.status_code,
                detail: failure.detail,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse<'a> {
    pub session_id: Uuid,
    pub turns: &'a [ChatTurn],
}

/// Form body for the HTML category pages.
#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub input: String,
}

/// Category data exposed to templates and `/api/categories`.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_label: &'static str,
    pub placeholder: &'static str,
    pub action_label: &'static str,
    pub conversational: bool,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            slug: category.slug(),
            title: category.title(),
            description: category.description(),
            input_label: category.input_label(),
            placeholder: category.placeholder(),
            action_label: category.action_label(),
            conversational: category.is_conversational(),
        }
    }
}

impl CategoryView {
    pub fn all() -> Vec<CategoryView> {
        Category::ALL.into_iter().map(CategoryView::from).collect()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorView {
    pub status_code: u16,
    pub detail: String,
}
