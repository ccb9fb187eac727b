//! Persistence synchronizer.
//!
//! Bridges the in-memory session index and message histories to the
//! repositories. All writes go through one writer task, so they complete in
//! the order they were issued; reads run directly on the caller's task.

use chatrelay_core::ConversationKey;
use chatrelay_core::error::{ChatRelayError, Result};
use chatrelay_core::message::{MessageRecord, MessageRepository};
use chatrelay_core::session::{SessionItem, SessionRepository};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

enum WriteCommand {
    AppendMessage {
        key: ConversationKey,
        record: MessageRecord,
    },
    SaveSessions {
        items: Vec<SessionItem>,
        reply: oneshot::Sender<Result<()>>,
    },
    Flush(oneshot::Sender<()>),
}

pub struct PersistenceSynchronizer {
    sessions: Arc<dyn SessionRepository>,
    messages: Arc<dyn MessageRepository>,
    writer: mpsc::UnboundedSender<WriteCommand>,
    page_size: usize,
}

impl PersistenceSynchronizer {
    /// Creates the synchronizer and starts its writer task.
    ///
    /// Must be called from within a Tokio runtime. The writer stops once the
    /// synchronizer is dropped and the queue has drained.
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        messages: Arc<dyn MessageRepository>,
        page_size: usize,
    ) -> Self {
        let (writer, queue) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(
            Arc::clone(&sessions),
            Arc::clone(&messages),
            queue,
        ));

        Self {
            sessions,
            messages,
            writer,
            page_size,
        }
    }

    /// Queues the incremental persist of one new record.
    ///
    /// Returns immediately; failures are logged by the writer.
    pub fn enqueue_append(&self, key: ConversationKey, record: MessageRecord) {
        let uuid = record.uuid.clone();
        if self
            .writer
            .send(WriteCommand::AppendMessage { key, record })
            .is_err()
        {
            tracing::error!("[PersistenceSync] writer stopped, dropping record {}", uuid);
        }
    }

    /// Writes the whole session index and waits for the result.
    pub async fn save_sessions(&self, items: Vec<SessionItem>) -> Result<()> {
        let (reply, result) = oneshot::channel();
        self.writer
            .send(WriteCommand::SaveSessions { items, reply })
            .map_err(|_| ChatRelayError::internal("persistence writer stopped"))?;
        result
            .await
            .map_err(|_| ChatRelayError::internal("persistence writer dropped the request"))?
    }

    pub async fn load_sessions(&self) -> Result<Vec<SessionItem>> {
        self.sessions.load_all().await
    }

    /// Loads the newest page of `key`'s history.
    pub async fn load_recent(&self, key: &ConversationKey) -> Result<Option<Vec<MessageRecord>>> {
        self.messages.load_recent(key, self.page_size).await
    }

    /// Waits until every write issued before this call has completed.
    pub async fn flush(&self) {
        let (reply, done) = oneshot::channel();
        if self.writer.send(WriteCommand::Flush(reply)).is_err() {
            return;
        }
        let _ = done.await;
    }
}

async fn run_writer(
    sessions: Arc<dyn SessionRepository>,
    messages: Arc<dyn MessageRepository>,
    mut queue: mpsc::UnboundedReceiver<WriteCommand>,
) {
    while let Some(command) = queue.recv().await {
        match command {
            WriteCommand::AppendMessage { key, record } => {
                if let Err(e) = messages.append(&key, &record).await {
                    tracing::error!(
                        "[PersistenceSync] failed to persist message {} of {}: {}",
                        record.uuid,
                        key,
                        e
                    );
                }
            }
            WriteCommand::SaveSessions { items, reply } => {
                let result = sessions.save_all(&items).await;
                if let Err(e) = &result {
                    tracing::error!("[PersistenceSync] failed to persist sessions: {}", e);
                }
                let _ = reply.send(result);
            }
            WriteCommand::Flush(reply) => {
                let _ = reply.send(());
            }
        }
    }
    tracing::debug!("[PersistenceSync] writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records the order in which writes complete; the first append is slow.
    #[derive(Default)]
    struct RecordingRepository {
        log: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MessageRepository for RecordingRepository {
        async fn append(&self, _key: &ConversationKey, record: &MessageRecord) -> Result<()> {
            if record.uuid == "slow" {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            if record.uuid == "fails" {
                return Err(ChatRelayError::storage("disk full"));
            }
            self.log.lock().unwrap().push(record.uuid.clone());
            Ok(())
        }

        async fn load_recent(
            &self,
            _key: &ConversationKey,
            _limit: usize,
        ) -> Result<Option<Vec<MessageRecord>>> {
            Ok(None)
        }
    }

    #[async_trait]
    impl SessionRepository for RecordingRepository {
        async fn save_all(&self, items: &[SessionItem]) -> Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("sessions:{}", items.len()));
            Ok(())
        }

        async fn load_all(&self) -> Result<Vec<SessionItem>> {
            Ok(Vec::new())
        }
    }

    fn record(uuid: &str) -> MessageRecord {
        MessageRecord {
            uuid: uuid.to_string(),
            from: "A".to_string(),
            to: "B".to_string(),
            msg: Default::default(),
            ext: None,
            extra: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_writes_complete_in_issue_order() {
        let repo = Arc::new(RecordingRepository::default());
        let sync = PersistenceSynchronizer::new(repo.clone(), repo.clone(), 13);
        let key = ConversationKey::new("B-A");

        sync.enqueue_append(key.clone(), record("slow"));
        sync.enqueue_append(key.clone(), record("fast"));
        sync.save_sessions(Vec::new()).await.unwrap();

        assert_eq!(
            *repo.log.lock().unwrap(),
            vec!["slow".to_string(), "fast".to_string(), "sessions:0".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_append_does_not_stop_writer() {
        let repo = Arc::new(RecordingRepository::default());
        let sync = PersistenceSynchronizer::new(repo.clone(), repo.clone(), 13);
        let key = ConversationKey::new("B-A");

        sync.enqueue_append(key.clone(), record("fails"));
        sync.enqueue_append(key, record("after"));
        sync.flush().await;

        assert_eq!(*repo.log.lock().unwrap(), vec!["after".to_string()]);
    }
}
