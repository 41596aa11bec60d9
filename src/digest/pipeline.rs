//! Aggregation stages and the orchestrator that chains them.
//!
//! Data flows strictly forward:
//! conversations -> message lists -> latest messages -> enriched summaries -> sorted summaries.
//! Both fan-out stages join with `try_join_all`: results keep input order and
//! the first failure aborts the stage, so partial lists are never returned.

use std::future::Future;
use std::pin::Pin;

use futures::future::try_join_all;

use super::error::{DigestError, DigestResult};
use super::fetch::ResourceClient;
use super::timestamp::parse_timestamp_value;
use super::transport::Transport;
use super::types::{
    Conversation, ConversationMessages, ConversationSummary, LatestMessageEntry,
};

/// Boxed future type for pipeline stages.
pub type StageFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Each pipeline stage as an independently substitutable method.
///
/// The pure stages have default implementations; the I/O stages must be
/// provided.
pub trait SummaryStages: Send + Sync {
    /// Fetch the conversation list.
    fn conversations(&self) -> StageFuture<'_, DigestResult<Vec<Conversation>>>;

    /// Fetch the message list of every conversation.
    fn messages_for<'a>(
        &'a self,
        conversations: &'a [Conversation],
    ) -> StageFuture<'a, DigestResult<Vec<ConversationMessages>>>;

    /// Reduce each conversation to its latest message.
    ///
    /// # Errors
    /// See [`latest_messages`].
    fn latest_messages(
        &self,
        conversations: Vec<ConversationMessages>,
    ) -> DigestResult<Vec<LatestMessageEntry>> {
        latest_messages(conversations)
    }

    /// Resolve senders and assemble summaries.
    fn enrich(
        &self,
        entries: Vec<LatestMessageEntry>,
    ) -> StageFuture<'_, DigestResult<Vec<ConversationSummary>>>;

    /// Order summaries by recency.
    ///
    /// # Errors
    /// See [`sort_by_recency`].
    fn sort(&self, summaries: Vec<ConversationSummary>) -> DigestResult<Vec<ConversationSummary>> {
        sort_by_recency(summaries)
    }
}

impl<T: Transport> SummaryStages for ResourceClient<T> {
    fn conversations(&self) -> StageFuture<'_, DigestResult<Vec<Conversation>>> {
        Box::pin(self.fetch_conversations())
    }

    fn messages_for<'a>(
        &'a self,
        conversations: &'a [Conversation],
    ) -> StageFuture<'a, DigestResult<Vec<ConversationMessages>>> {
        Box::pin(fan_out_messages(self, conversations))
    }

    fn enrich(
        &self,
        entries: Vec<LatestMessageEntry>,
    ) -> StageFuture<'_, DigestResult<Vec<ConversationSummary>>> {
        Box::pin(enrich(self, entries))
    }
}

/// Fetch every conversation's messages concurrently.
///
/// # Errors
/// Returns the first fetch failure; no partial results.
pub async fn fan_out_messages<T: Transport>(
    client: &ResourceClient<T>,
    conversations: &[Conversation],
) -> DigestResult<Vec<ConversationMessages>> {
    let fetches = conversations.iter().map(|conversation| async move {
        let messages = client.fetch_messages(&conversation.id).await?;
        Ok::<_, DigestError>(ConversationMessages {
            id: conversation.id.clone(),
            messages,
        })
    });

    try_join_all(fetches).await
}

/// Select element 0 of each message list. No chronological comparison is made.
///
/// # Errors
/// Returns `InvalidArgument` if a conversation has no messages.
pub fn latest_messages(
    conversations: Vec<ConversationMessages>,
) -> DigestResult<Vec<LatestMessageEntry>> {
    conversations
        .into_iter()
        .map(|ConversationMessages { id, messages }| -> DigestResult<LatestMessageEntry> {
            let latest_message = messages.into_iter().next().ok_or_else(|| {
                DigestError::InvalidArgument(format!("conversation {id} has no messages"))
            })?;
            Ok(LatestMessageEntry { id, latest_message })
        })
        .collect()
}

/// Resolve every sender profile concurrently and assemble summaries.
///
/// # Errors
/// Returns the first profile fetch failure; no partial results.
pub async fn enrich<T: Transport>(
    client: &ResourceClient<T>,
    entries: Vec<LatestMessageEntry>,
) -> DigestResult<Vec<ConversationSummary>> {
    let lookups = entries.into_iter().map(|entry| async move {
        let sender = client.fetch_user(&entry.latest_message.from_user_id).await?;
        Ok::<_, DigestError>(ConversationSummary::assemble(entry, sender))
    });

    try_join_all(lookups).await
}

/// Stable sort, newest `latest_message.created_at` first.
///
/// # Errors
/// Returns `InvalidArgument` for a non-string timestamp and `Parse` for an
/// invalid one; nothing is dropped.
pub fn sort_by_recency(
    summaries: Vec<ConversationSummary>,
) -> DigestResult<Vec<ConversationSummary>> {
    let mut keyed = summaries
        .into_iter()
        .map(|summary| -> DigestResult<(i64, ConversationSummary)> {
            Ok((parse_timestamp_value(&summary.latest_message.created_at)?, summary))
        })
        .collect::<DigestResult<Vec<_>>>()?;

    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));

    Ok(keyed.into_iter().map(|(_, summary)| summary).collect())
}

/// Build the recency-ordered summary list.
///
/// Any stage failure aborts the run and is returned unchanged.
///
/// # Errors
/// Returns the first error raised by any stage.
pub async fn get_recent_conversation_summaries<S: SummaryStages + ?Sized>(
    stages: &S,
) -> DigestResult<Vec<ConversationSummary>> {
    let conversations = stages.conversations().await?;
    tracing::debug!(count = conversations.len(), "fetched conversations");

    let with_messages = stages.messages_for(&conversations).await?;
    let latest = stages.latest_messages(with_messages)?;
    let enriched = stages.enrich(latest).await?;
    let sorted = stages.sort(enriched)?;

    tracing::info!(count = sorted.len(), "built conversation summaries");
    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::digest::mock::MockTransport;
    use crate::digest::types::{FromUser, LatestMessage, Message};
    use serde_json::json;

    fn message(id: &str, created_at: &str, from_user_id: &str) -> Message {
        Message {
            id: id.to_string(),
            body: format!("body {id}"),
            created_at: created_at.into(),
            from_user_id: from_user_id.to_string(),
        }
    }

    fn summary(id: &str, created_at: &str) -> ConversationSummary {
        ConversationSummary {
            id: id.to_string(),
            latest_message: LatestMessage {
                id: format!("m{id}"),
                body: String::new(),
                created_at: created_at.into(),
                from_user: FromUser {
                    id: "1".to_string(),
                    avatar_url: String::new(),
                },
            },
        }
    }

    fn conversations(ids: &[&str]) -> Vec<Conversation> {
        ids.iter()
            .map(|id| Conversation { id: (*id).to_string() })
            .collect()
    }

    #[test]
    fn test_latest_takes_first_element() {
        let input = vec![
            ConversationMessages {
                id: "1".to_string(),
                messages: vec![message("a", "2016-08-20", "1")],
            },
            ConversationMessages {
                id: "2".to_string(),
                messages: vec![
                    message("b", "2016-08-01", "2"),
                    message("c", "2016-08-30", "3"),
                    message("d", "2016-08-31", "4"),
                ],
            },
        ];

        let latest = latest_messages(input).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].id, "1");
        assert_eq!(latest[0].latest_message.id, "a");
        assert_eq!(latest[1].id, "2");
        assert_eq!(latest[1].latest_message.id, "b");
    }

    #[test]
    fn test_latest_rejects_empty_conversation() {
        let input = vec![ConversationMessages {
            id: "4".to_string(),
            messages: Vec::new(),
        }];
        assert!(matches!(
            latest_messages(input),
            Err(DigestError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_sort_descending_and_stable() {
        let input = vec![
            summary("a", "2016-08-21T00:00:00Z"),
            summary("b", "2016-08-25T00:00:00Z"),
            summary("c", "2016-08-23T00:00:00Z"),
            summary("d", "2016-08-25T00:00:00Z"),
            summary("e", "2016-08-23T00:00:00.000+00:00"),
        ];

        let ids: Vec<_> = sort_by_recency(input)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["b", "d", "c", "e", "a"]);
    }

    #[test]
    fn test_sort_rejects_non_string_timestamp() {
        let mut late = summary("b", "2016-08-25");
        late.latest_message.created_at = json!(1_472_120_100_670_i64);
        let input = vec![summary("a", "2016-08-21"), late];

        let err = sort_by_recency(input).unwrap_err();
        assert!(
            matches!(err, DigestError::InvalidArgument(ref m) if m == "argument should be a string")
        );
    }

    #[test]
    fn test_sort_fails_on_invalid_timestamp() {
        let input = vec![summary("a", "2016-08-21"), summary("b", "hello")];
        assert!(matches!(sort_by_recency(input), Err(DigestError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fan_out_preserves_order() {
        let client = ResourceClient::new(
            MockTransport::new()
                .with_json("conversations/2/messages", json!([message("x", "2016-08-21", "1")]))
                .with_json("conversations/1/messages", json!([message("y", "2016-08-22", "1")])),
        );

        let result = fan_out_messages(&client, &conversations(&["2", "1"]))
            .await
            .unwrap();
        assert_eq!(result[0].id, "2");
        assert_eq!(result[0].messages[0].id, "x");
        assert_eq!(result[1].id, "1");
        assert_eq!(result[1].messages[0].id, "y");
    }

    #[tokio::test]
    async fn test_fan_out_fails_if_any_fetch_fails() {
        let mut transport = MockTransport::new();
        for id in ["1", "2", "4", "5"] {
            transport = transport.with_json(
                format!("conversations/{id}/messages"),
                json!([message(id, "2016-08-21", "1")]),
            );
        }
        let client = ResourceClient::new(transport.with_status("conversations/3/messages", 503));

        let result = fan_out_messages(&client, &conversations(&["1", "2", "3", "4", "5"])).await;
        assert_eq!(result.unwrap_err().status(), Some(503));
    }

    #[tokio::test]
    async fn test_enrich_resolves_sender() {
        let client = ResourceClient::new(MockTransport::new().with_json(
            "users/7",
            json!({ "id": "7", "avatar_url": "http://a/7.png", "extra": true }),
        ));
        let entries = vec![LatestMessageEntry {
            id: "3".to_string(),
            latest_message: message("m", "2016-08-21", "7"),
        }];

        let summaries = enrich(&client, entries).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "3");
        assert_eq!(summaries[0].latest_message.body, "body m");
        assert_eq!(
            summaries[0].latest_message.from_user,
            FromUser {
                id: "7".to_string(),
                avatar_url: "http://a/7.png".to_string(),
            }
        );
    }

    /// Stages stubbed in memory; records the order in which they run.
    struct RecordingStages {
        calls: Mutex<Vec<&'static str>>,
        fail_enrich: bool,
    }

    impl RecordingStages {
        fn record(&self, stage: &'static str) {
            self.calls.lock().unwrap().push(stage);
        }
    }

    impl SummaryStages for RecordingStages {
        fn conversations(&self) -> StageFuture<'_, DigestResult<Vec<Conversation>>> {
            self.record("conversations");
            Box::pin(async { Ok(conversations(&["1", "2"])) })
        }

        fn messages_for<'a>(
            &'a self,
            conversations: &'a [Conversation],
        ) -> StageFuture<'a, DigestResult<Vec<ConversationMessages>>> {
            self.record("messages");
            Box::pin(async move {
                Ok(conversations
                    .iter()
                    .enumerate()
                    .map(|(i, c)| ConversationMessages {
                        id: c.id.clone(),
                        messages: vec![message(&c.id, &format!("2016-08-2{i}"), "9")],
                    })
                    .collect())
            })
        }

        fn latest_messages(
            &self,
            conversations: Vec<ConversationMessages>,
        ) -> DigestResult<Vec<LatestMessageEntry>> {
            self.record("latest");
            latest_messages(conversations)
        }

        fn enrich(
            &self,
            entries: Vec<LatestMessageEntry>,
        ) -> StageFuture<'_, DigestResult<Vec<ConversationSummary>>> {
            self.record("enrich");
            let fail = self.fail_enrich;
            Box::pin(async move {
                if fail {
                    return Err(DigestError::InvalidArgument("stub".to_string()));
                }
                Ok(entries
                    .into_iter()
                    .map(|entry| {
                        let sender = crate::digest::types::UserProfile {
                            id: entry.latest_message.from_user_id.clone(),
                            avatar_url: String::new(),
                        };
                        ConversationSummary::assemble(entry, sender)
                    })
                    .collect())
            })
        }

        fn sort(
            &self,
            summaries: Vec<ConversationSummary>,
        ) -> DigestResult<Vec<ConversationSummary>> {
            self.record("sort");
            sort_by_recency(summaries)
        }
    }

    #[tokio::test]
    async fn test_orchestrator_runs_stages_in_order() {
        let stages = RecordingStages {
            calls: Mutex::new(Vec::new()),
            fail_enrich: false,
        };

        let result = get_recent_conversation_summaries(&stages).await.unwrap();

        let ids: Vec<_> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(
            *stages.calls.lock().unwrap(),
            vec!["conversations", "messages", "latest", "enrich", "sort"]
        );
    }

    #[tokio::test]
    async fn test_orchestrator_stops_at_first_failure() {
        let stages = RecordingStages {
            calls: Mutex::new(Vec::new()),
            fail_enrich: true,
        };

        let err = get_recent_conversation_summaries(&stages).await.unwrap_err();

        assert!(matches!(err, DigestError::InvalidArgument(ref m) if m == "stub"));
        assert_eq!(
            *stages.calls.lock().unwrap(),
            vec!["conversations", "messages", "latest", "enrich"]
        );
    }
}
