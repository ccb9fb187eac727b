pub mod inspect;
pub mod replay;
pub mod send;

use anyhow::{Context, Result};
use chatrelay_application::ChatRelay;
use chatrelay_core::session::SessionView;
use chatrelay_infrastructure::{ConfigService, FileKeyValueStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Builds the relay over the file store and restores the session index.
pub async fn open_relay(store: Option<PathBuf>, config: Option<PathBuf>) -> Result<ChatRelay> {
    let service = match config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let config = service
        .get_config()
        .context("Failed to load configuration")?;

    let store_path = match store {
        Some(path) => path,
        None => ConfigService::resolve_store_path(&config)
            .context("Failed to resolve store path")?,
    };
    let store = FileKeyValueStore::open(&store_path)
        .await
        .with_context(|| format!("Failed to open store {}", store_path.display()))?;

    let relay = ChatRelay::with_store(config, Arc::new(store));
    relay
        .restore_sessions()
        .await
        .context("Failed to restore sessions")?;
    Ok(relay)
}

pub fn format_sessions(sessions: &[SessionView], total_unread: u64) -> String {
    let mut out = String::new();
    for view in sessions {
        let item = &view.item;
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            item.key,
            item.name.as_deref().unwrap_or(&item.to_info.user_id),
            item.un_read_message_count,
            view.latest_time,
            item.latest_message
        ));
    }
    out.push_str(&format!("total unread: {}\n", total_unread));
    out
}

pub async fn print_sessions(relay: &ChatRelay) {
    let sessions = relay.sorted_sessions().await;
    print!("{}", format_sessions(&sessions, relay.total_unread().await));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_core::session::SessionItem;
    use chatrelay_core::{ConversationKey, PeerInfo};

    #[test]
    fn test_format_sessions_falls_back_to_user_id() {
        let view = SessionView {
            item: SessionItem {
                key: ConversationKey::new("B-A"),
                avatar: None,
                name: None,
                latest_message: "hi".to_string(),
                timestamp: 0,
                un_read_message_count: 2,
                to_info: PeerInfo {
                    user_id: "A".to_string(),
                    ..Default::default()
                },
            },
            latest_time: "几秒前".to_string(),
        };

        assert_eq!(
            format_sessions(&[view], 2),
            "B-A\tA\t2\t几秒前\thi\ntotal unread: 2\n"
        );
    }

    #[tokio::test]
    async fn test_open_relay_uses_explicit_paths() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = temp_dir.path().join("store.json");
        let config = temp_dir.path().join("config.toml");

        let relay = open_relay(Some(store), Some(config)).await.unwrap();
        assert!(relay.sorted_sessions().await.is_empty());
    }
}
