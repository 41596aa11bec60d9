//! Recent-conversation summaries for a single user.
//!
//! This module joins three read-only endpoints client-side:
//! - `GET /conversations`
//! - `GET /conversations/{id}/messages` (index 0 is the latest message)
//! - `GET /users/{id}`
//!
//! and produces one summary per conversation, newest first.

pub mod classify;
pub mod config;
pub mod error;
pub mod fetch;
pub mod ids;
pub mod mock;
pub mod pipeline;
pub mod timestamp;
pub mod transport;
pub mod types;

pub use classify::ErrorCategory;
pub use config::DigestConfig;
pub use error::{DigestError, DigestResult};
pub use fetch::ResourceClient;
pub use ids::NumericId;
pub use mock::MockTransport;
pub use pipeline::{SummaryStages, get_recent_conversation_summaries};
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use types::{
    Conversation, ConversationSummary, FromUser, LatestMessage, Message, UserProfile,
};

/// Entry point that owns a resource client and runs the summary pipeline.
pub struct ConversationDigest<T = HttpTransport> {
    client: ResourceClient<T>,
}

impl ConversationDigest<HttpTransport> {
    /// Create a digest over HTTP with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the HTTP client cannot be created.
    pub fn new(config: &DigestConfig) -> DigestResult<Self> {
        let transport = HttpTransport::new(config)?;
        tracing::debug!("digest client targeting {}", config.base_url);
        Ok(Self::from_transport(transport))
    }

    /// Create a digest over HTTP with default configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> DigestResult<Self> {
        Self::new(&DigestConfig::default())
    }
}

impl<T: Transport> ConversationDigest<T> {
    /// Create a digest over an arbitrary transport.
    #[must_use]
    pub const fn from_transport(transport: T) -> Self {
        Self {
            client: ResourceClient::new(transport),
        }
    }

    /// Borrow the resource client.
    #[must_use]
    pub const fn client(&self) -> &ResourceClient<T> {
        &self.client
    }

    /// Fetch and join everything into summaries ordered newest first.
    ///
    /// # Errors
    /// Returns the first failure of any stage; partial results are never returned.
    pub async fn recent_summaries(&self) -> DigestResult<Vec<ConversationSummary>> {
        get_recent_conversation_summaries(&self.client).await
    }
}
