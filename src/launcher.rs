//! Opens, or finds, the one conversation between a household and a househelp.
//!
//! Every call lists first and creates only when nothing listed matches the
//! pairing. A created id is trusted only if it is UUID-shaped; otherwise the
//! list is read once more. Nothing is cached between calls. Two callers racing
//! between the list and the create can still both create, since the backend
//! exposes no create-or-fetch call.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiError, InboxTransport};
use crate::extract::{extract_conversation_id, extract_conversations};
use crate::ids::is_conversation_id;
use crate::matcher::find_match;
use crate::pairing::{ConversationRecord, StartConversationPayload};

pub const LIST_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to start conversation")]
    StartFailed(#[source] ApiError),
}

/// Terminal state of one resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "resolution", content = "conversationId", rename_all = "snake_case")]
pub enum Resolution {
    Matched(String),
    Created(String),
    /// Found on the second list after a create response without a usable id.
    Recovered(String),
    Unresolved,
}

impl Resolution {
    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            Resolution::Matched(id) | Resolution::Created(id) | Resolution::Recovered(id) => {
                Some(id)
            }
            Resolution::Unresolved => None,
        }
    }

    pub fn into_conversation_id(self) -> Option<String> {
        self.conversation_id().map(str::to_owned)
    }
}

/// Lists the first page of conversations. A failed read is logged and
/// reported as an empty list so the caller can still create.
pub async fn list_conversations<T>(transport: &T) -> Vec<ConversationRecord>
where
    T: InboxTransport + ?Sized,
{
    match transport.list_conversations(LIST_PAGE_LIMIT, 0).await {
        Ok(response) => extract_conversations(&response),
        Err(error) => {
            warn!(%error, "failed to list conversations");
            Vec::new()
        }
    }
}

pub async fn create_conversation<T>(
    transport: &T,
    pairing: &StartConversationPayload,
) -> Result<Option<String>, LaunchError>
where
    T: InboxTransport + ?Sized,
{
    let response = transport
        .start_conversation(pairing)
        .await
        .map_err(LaunchError::StartFailed)?;
    let id = extract_conversation_id(&response);
    match id {
        Some(id) if is_conversation_id(&id) => Ok(Some(id)),
        Some(id) => {
            debug!(conversation_id = %id, "start response id is not a uuid");
            Ok(None)
        }
        None => {
            debug!("start response carried no conversation id");
            Ok(None)
        }
    }
}

pub async fn resolve_conversation<T>(
    transport: &T,
    pairing: &StartConversationPayload,
) -> Result<Resolution, LaunchError>
where
    T: InboxTransport + ?Sized,
{
    if let Some(id) = matched_id(transport, pairing).await {
        debug!(conversation_id = %id, "reusing listed conversation");
        return Ok(Resolution::Matched(id));
    }

    if let Some(id) = create_conversation(transport, pairing).await? {
        debug!(conversation_id = %id, "created conversation");
        return Ok(Resolution::Created(id));
    }

    if let Some(id) = matched_id(transport, pairing).await {
        debug!(conversation_id = %id, "found conversation on second list");
        return Ok(Resolution::Recovered(id));
    }

    debug!(
        household_user_id = %pairing.household_user_id,
        househelp_user_id = %pairing.househelp_user_id,
        "conversation could not be established"
    );
    Ok(Resolution::Unresolved)
}

/// Returns the conversation id for `pairing`, creating the conversation if no
/// listed one matches. `Ok(None)` means no conversation could be confirmed;
/// callers must not invent an id for it.
pub async fn start_or_get_conversation<T>(
    transport: &T,
    pairing: &StartConversationPayload,
) -> Result<Option<String>, LaunchError>
where
    T: InboxTransport + ?Sized,
{
    Ok(resolve_conversation(transport, pairing)
        .await?
        .into_conversation_id())
}

async fn matched_id<T>(transport: &T, pairing: &StartConversationPayload) -> Option<String>
where
    T: InboxTransport + ?Sized,
{
    let conversations = list_conversations(transport).await;
    let found = find_match(pairing, &conversations)?;
    match found.record.id.as_deref() {
        Some(id) if is_conversation_id(id) => {
            debug!(strategy = ?found.strategy, "matched listed conversation");
            Some(id.to_string())
        }
        _ => {
            debug!(strategy = ?found.strategy, "matched conversation has no usable id");
            None
        }
    }
}
