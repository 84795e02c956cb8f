//! Drives one session through select → submit → render.
//!
//! Single-shot categories send one freshly templated user message and keep
//! nothing. Open chat appends the user's turn before calling out, sends the
//! whole conversation, and appends the reply only when the call succeeds.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::completion::CompletionClient;
use crate::error::CompletionFailure;
use crate::prompts::Category;
use crate::session::{ChatTurn, Phase, Session};

/// What a submission produced, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Blank input: nothing was sent and nothing changed.
    Ignored,
    Rendered(String),
    Failed(CompletionFailure),
}

#[derive(Clone)]
pub struct InteractionController {
    client: Arc<dyn CompletionClient>,
}

impl InteractionController {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub fn select(&self, session: &mut Session, category: Category) {
        transition(session, Phase::AwaitingInput(category));
    }

    /// Handle one submission for `category`.
    ///
    /// The caller holds the session for the whole call, so interactions on a
    /// session never overlap.
    pub async fn submit(&self, session: &mut Session, category: Category, input: &str) -> Interaction {
        let input = input.trim();
        if input.is_empty() {
            debug!("Session {}: empty {} submission ignored", session.id(), category);
            return Interaction::Ignored;
        }

        if session.phase != Phase::AwaitingInput(category) {
            self.select(session, category);
        }

        info!(
            "Session {}: {} request ({} chars)",
            session.id(),
            category,
            input.len()
        );
        transition(session, Phase::Requesting(category));

        let template = category.template();
        let result = if category.is_conversational() {
            session.conversation.append(ChatTurn::user(input));
            self.client
                .complete(template.system_role, session.conversation.all_turns())
                .await
        } else {
            let message = [ChatTurn::user(template.render(input))];
            self.client.complete(template.system_role, &message).await
        };

        let outcome = match result {
            Ok(text) => {
                if category.is_conversational() {
                    session.conversation.append(ChatTurn::assistant(text.clone()));
                    transition(session, Phase::Appended(category));
                }
                Interaction::Rendered(text)
            }
            Err(failure) => {
                warn!(
                    "Session {}: {} request failed with {}",
                    session.id(),
                    category,
                    failure.status_code
                );
                Interaction::Failed(failure)
            }
        };

        transition(session, Phase::Rendered(category));
        transition(session, Phase::AwaitingInput(category));
        outcome
    }
}

fn transition(session: &mut Session, next: Phase) {
    debug!("Session {}: {:?} -> {:?}", session.id(), session.phase, next);
    session.phase = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionResult;
    use crate::session::Role;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Records every call and answers from a script, falling back to an echo.
    #[derive(Default)]
    struct ScriptedClient {
        replies: Mutex<VecDeque<CompletionResult>>,
        calls: Mutex<Vec<(String, Vec<ChatTurn>)>>,
    }

    impl ScriptedClient {
        fn with_replies(replies: impl IntoIterator<Item = CompletionResult>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().collect()),
                calls: Mutex::default(),
            })
        }

        fn calls(&self) -> Vec<(String, Vec<ChatTurn>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, system_role: &str, messages: &[ChatTurn]) -> CompletionResult {
            self.calls
                .lock()
                .unwrap()
                .push((system_role.to_string(), messages.to_vec()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(format!("reply {}", messages.len())))
        }
    }

    fn setup(client: &Arc<ScriptedClient>) -> (InteractionController, Session) {
        let controller = InteractionController::new(client.clone());
        (controller, Session::new(Uuid::new_v4()))
    }

    #[actix_web::test]
    async fn blank_input_never_calls_out() {
        let client = ScriptedClient::with_replies([]);
        let (controller, mut session) = setup(&client);

        for category in Category::ALL {
            controller.select(&mut session, category);
            for input in ["", "   ", "\n\t"] {
                let outcome = controller.submit(&mut session, category, input).await;
                assert_eq!(outcome, Interaction::Ignored);
                assert_eq!(session.phase(), Phase::AwaitingInput(category));
            }
        }
        assert!(client.calls().is_empty());
        assert!(session.conversation.is_empty());
    }

    #[actix_web::test]
    async fn blank_input_keeps_the_selected_category() {
        let client = ScriptedClient::with_replies([]);
        let (controller, mut session) = setup(&client);

        controller.select(&mut session, Category::OpenChat);
        let outcome = controller.submit(&mut session, Category::SymptomCheck, "  ").await;

        assert_eq!(outcome, Interaction::Ignored);
        assert_eq!(session.phase(), Phase::AwaitingInput(Category::OpenChat));
    }

    #[actix_web::test]
    async fn illness_lookup_sends_templated_prompt_and_renders_verbatim() {
        let client = ScriptedClient::with_replies([Ok("1. ...".to_string())]);
        let (controller, mut session) = setup(&client);

        let outcome = controller
            .submit(&mut session, Category::IllnessLookup, "dengue")
            .await;
        assert_eq!(outcome, Interaction::Rendered("1. ...".to_string()));

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        let (role, messages) = &calls[0];
        assert!(role.contains("medical expert"));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role(), Role::User);
        assert!(messages[0].content().contains("dengue"));
        for n in 1..=7 {
            assert!(messages[0].content().contains(&format!("\n{n}. ")));
        }
    }

    #[actix_web::test]
    async fn single_shot_requests_do_not_leak_into_each_other() {
        let client = ScriptedClient::with_replies([Ok("X".to_string()), Ok("Y".to_string())]);
        let (controller, mut session) = setup(&client);

        let first = controller
            .submit(&mut session, Category::MedicineLookup, "paracetamol")
            .await;
        let second = controller
            .submit(&mut session, Category::MedicineLookup, "ibuprofen")
            .await;
        assert_eq!(first, Interaction::Rendered("X".to_string()));
        assert_eq!(second, Interaction::Rendered("Y".to_string()));

        let calls = client.calls();
        let second_messages = &calls[1].1;
        assert_eq!(second_messages.len(), 1);
        assert!(second_messages[0].content().contains("ibuprofen"));
        assert!(!second_messages[0].content().contains("paracetamol"));
        assert!(!second_messages[0].content().contains('X'));
        assert!(session.conversation.is_empty());
    }

    #[actix_web::test]
    async fn chat_history_alternates_and_grows_by_two_per_exchange() {
        let client = ScriptedClient::with_replies([]);
        let (controller, mut session) = setup(&client);

        for (n, message) in ["hi", "I have a headache", "since yesterday"].iter().enumerate() {
            let outcome = controller.submit(&mut session, Category::OpenChat, message).await;
            assert!(matches!(outcome, Interaction::Rendered(_)));
            assert_eq!(session.conversation.len(), 2 * (n + 1));
        }

        let roles: Vec<Role> = session.conversation.all_turns().iter().map(|t| t.role()).collect();
        assert_eq!(
            roles,
            [Role::User, Role::Assistant, Role::User, Role::Assistant, Role::User, Role::Assistant]
        );

        // Each request carries everything before it plus the new user turn.
        let calls = client.calls();
        assert_eq!(calls[2].1.len(), 5);
        assert_eq!(calls[2].1[4], ChatTurn::user("since yesterday"));
        assert!(calls[2].0.contains("experienced doctor"));
    }

    #[actix_web::test]
    async fn failed_chat_keeps_user_turn_and_allows_retry() {
        let client = ScriptedClient::with_replies([
            Err(CompletionFailure::http(500, "server error")),
            Ok("Drink water and rest.".to_string()),
        ]);
        let (controller, mut session) = setup(&client);

        let outcome = controller
            .submit(&mut session, Category::OpenChat, "I have a headache")
            .await;
        match outcome {
            Interaction::Failed(failure) => {
                assert_eq!(failure.status_code, 500);
                assert_eq!(failure.detail, "server error");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(session.conversation.all_turns(), [ChatTurn::user("I have a headache")]);
        assert_eq!(session.phase(), Phase::AwaitingInput(Category::OpenChat));

        let outcome = controller
            .submit(&mut session, Category::OpenChat, "still hurts")
            .await;
        assert_eq!(outcome, Interaction::Rendered("Drink water and rest.".to_string()));

        // The failed turn is resent as part of the history.
        let calls = client.calls();
        assert_eq!(
            calls[1].1,
            [ChatTurn::user("I have a headache"), ChatTurn::user("still hurts")]
        );
        assert_eq!(session.conversation.len(), 3);
        assert_eq!(session.conversation.all_turns()[2].role(), Role::Assistant);
    }

    #[actix_web::test]
    async fn single_shot_failure_is_returned_and_nothing_is_stored() {
        let client = ScriptedClient::with_replies([Err(CompletionFailure::network(true, "timed out"))]);
        let (controller, mut session) = setup(&client);

        let outcome = controller
            .submit(&mut session, Category::SymptomCheck, "fever")
            .await;
        assert!(matches!(outcome, Interaction::Failed(ref f) if f.status_code == 504));
        assert!(session.conversation.is_empty());
    }

    #[actix_web::test]
    async fn single_shot_calls_leave_the_conversation_alone() {
        let client = ScriptedClient::with_replies([]);
        let (controller, mut session) = setup(&client);

        controller.submit(&mut session, Category::OpenChat, "hello").await;
        controller.submit(&mut session, Category::NaturalRemedy, "joint pain").await;
        controller.submit(&mut session, Category::OpenChat, "thanks").await;

        assert_eq!(session.conversation.len(), 4);
        let last = client.calls().pop().unwrap();
        assert!(last.1.iter().all(|t| !t.content().contains("joint pain")));
    }

    #[actix_web::test]
    async fn input_is_trimmed_before_use() {
        let client = ScriptedClient::with_replies([]);
        let (controller, mut session) = setup(&client);

        controller.submit(&mut session, Category::OpenChat, "  hello  ").await;
        assert_eq!(session.conversation.all_turns()[0], ChatTurn::user("hello"));
    }
}
