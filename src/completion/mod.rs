mod http;

use async_trait::async_trait;

use crate::error::CompletionFailure;
use crate::session::ChatTurn;

pub use http::HttpCompletionClient;

/// Generated text, or why it could not be produced.
pub type CompletionResult = Result<String, CompletionFailure>;

/// Anything that can turn a system role plus ordered messages into text.
///
/// One call is one attempt: implementations do not retry or cache.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system_role: &str, messages: &[ChatTurn]) -> CompletionResult;
}
