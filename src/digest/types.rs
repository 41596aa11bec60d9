//! Wire and output types for conversation summaries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ids::wire_id;

/// A conversation as listed by the server. Only `id` is consumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation identifier.
    #[serde(deserialize_with = "wire_id::deserialize")]
    pub id: String,
}

/// A single message in a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier.
    #[serde(deserialize_with = "wire_id::deserialize")]
    pub id: String,
    /// Message text.
    pub body: String,
    /// ISO-8601 creation time, kept verbatim. Validated when summaries are ordered.
    pub created_at: Value,
    /// Identifier of the sender.
    #[serde(deserialize_with = "wire_id::deserialize")]
    pub from_user_id: String,
}

/// Public profile of a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier.
    #[serde(deserialize_with = "wire_id::deserialize")]
    pub id: String,
    /// Avatar location.
    pub avatar_url: String,
}

/// Messages fetched for one conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationMessages {
    /// Conversation identifier.
    pub id: String,
    /// Messages in server order; index 0 is the latest.
    pub messages: Vec<Message>,
}

/// The latest message of one conversation, before enrichment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatestMessageEntry {
    /// Conversation identifier.
    pub id: String,
    /// Latest message.
    pub latest_message: Message,
}

/// Sender identity embedded in a summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FromUser {
    /// User identifier.
    pub id: String,
    /// Avatar location.
    pub avatar_url: String,
}

impl From<UserProfile> for FromUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            avatar_url: profile.avatar_url,
        }
    }
}

/// Latest message with the sender resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestMessage {
    /// Message identifier.
    pub id: String,
    /// Message text.
    pub body: String,
    /// ISO-8601 creation time, copied from the message.
    pub created_at: Value,
    /// Resolved sender.
    pub from_user: FromUser,
}

/// One entry of the recent-conversations list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Conversation identifier.
    pub id: String,
    /// Most recent message.
    pub latest_message: LatestMessage,
}

impl ConversationSummary {
    /// Assemble a summary from a latest-message entry and its sender profile.
    ///
    /// The sender id always comes from the message's `from_user_id`; only
    /// `avatar_url` is taken from the profile.
    #[must_use]
    pub fn assemble(entry: LatestMessageEntry, sender: UserProfile) -> Self {
        let Message {
            id,
            body,
            created_at,
            from_user_id,
        } = entry.latest_message;
        Self {
            id: entry.id,
            latest_message: LatestMessage {
                id,
                body,
                created_at,
                from_user: FromUser {
                    id: from_user_id,
                    avatar_url: sender.avatar_url,
                },
            },
        }
    }
}
