//! Resource fetchers for conversations, messages and user profiles.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::classify::surface_error;
use super::error::{DigestError, DigestResult};
use super::ids::NumericId;
use super::transport::{Transport, TransportResponse};
use super::types::{Conversation, Message, UserProfile};

/// Path of the conversation collection.
const CONVERSATIONS_PATH: &str = "conversations";

/// Typed access to the three read-only endpoints over an injected transport.
#[derive(Debug)]
pub struct ResourceClient<T> {
    transport: T,
}

impl<T: Transport> ResourceClient<T> {
    /// Wrap a transport.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// GET a relative path and return its JSON body.
    ///
    /// Non-success responses are reported through [`surface_error`] and
    /// returned as [`DigestError::Transport`].
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an empty path, `Transport` for a
    /// non-success status, or the transport's own fault.
    pub async fn request(&self, path: &str) -> DigestResult<Value> {
        if path.trim().is_empty() {
            return Err(DigestError::InvalidArgument(
                "path must be a non-empty string".to_string(),
            ));
        }

        tracing::debug!("GET {path}");
        match self.transport.get(path).await? {
            TransportResponse::Success(body) => Ok(body),
            TransportResponse::Failure { status } => {
                let category = surface_error(status);
                Err(DigestError::Transport { status, category })
            }
        }
    }

    async fn request_as<R: DeserializeOwned>(&self, path: &str) -> DigestResult<R> {
        let body = self.request(path).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Fetch the conversation list.
    ///
    /// # Errors
    /// Returns an error if the request fails or the body is not a conversation list.
    pub async fn fetch_conversations(&self) -> DigestResult<Vec<Conversation>> {
        self.request_as(CONVERSATIONS_PATH).await
    }

    /// Fetch the messages of a conversation, latest first.
    ///
    /// # Errors
    /// Returns `InvalidArgument` before any request if the id is not numeric,
    /// otherwise any request or decoding error.
    pub async fn fetch_messages(&self, conversation_id: &str) -> DigestResult<Vec<Message>> {
        let id = NumericId::parse(conversation_id)?;
        self.request_as(&format!("{CONVERSATIONS_PATH}/{id}/messages"))
            .await
    }

    /// Fetch a user profile.
    ///
    /// # Errors
    /// Returns `InvalidArgument` before any request if the id is not numeric,
    /// otherwise any request or decoding error.
    pub async fn fetch_user(&self, user_id: &str) -> DigestResult<UserProfile> {
        let id = NumericId::parse(user_id)?;
        self.request_as(&format!("users/{id}")).await
    }
}
