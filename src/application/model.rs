//! One-shot chat completions shared by every pipeline stage.

use tracing::warn;

use crate::domain::foundation::SessionId;
use crate::ports::{
    AIError, AIProvider, CompletionPurpose, CompletionRequest, MessageRole, RequestMetadata,
};

/// Sends `system` + one user message and returns the trimmed reply text.
pub(crate) async fn complete_text(
    provider: &dyn AIProvider,
    session_id: &SessionId,
    purpose: CompletionPurpose,
    system: &str,
    user: &str,
    temperature: f32,
) -> Result<String, AIError> {
    let request = CompletionRequest::new(RequestMetadata::new(*session_id, purpose))
        .with_system_prompt(system)
        .with_message(MessageRole::User, user)
        .with_temperature(temperature);

    match provider.complete(request).await {
        Ok(response) => Ok(response.content.trim().to_string()),
        Err(e) => {
            warn!(%purpose, error = %e, "model call failed");
            Err(e)
        }
    }
}
