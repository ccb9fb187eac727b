use anyhow::{Context, Result};
use chatrelay_application::ChatRelay;
use chatrelay_core::ConversationKey;

pub async fn sessions(relay: &ChatRelay) {
    super::print_sessions(relay).await;
}

pub async fn history(relay: &ChatRelay, key: String) {
    let key = ConversationKey::new(key);
    relay.open_conversation(key).await;
    // Let the lazy restore land before reading.
    relay.flush().await;

    for record in relay.current_history().await {
        println!(
            "{}\t{} -> {}\t{}",
            record.uuid, record.from, record.to, record.msg.content
        );
    }
}

pub async fn clear_unread(relay: &ChatRelay, key: String) -> Result<()> {
    let key = ConversationKey::new(key);
    if !relay.clear_unread_message_count(&key).await {
        println!("no session {}", key);
        return Ok(());
    }
    relay
        .persist_sessions()
        .await
        .context("Failed to persist sessions")?;
    println!("cleared {}", key);
    Ok(())
}
