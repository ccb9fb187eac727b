use anyhow::{Context, Result};
use chatrelay_application::ChatRelay;
use chatrelay_core::{Payload, PeerInfo};

pub async fn run(
    relay: &ChatRelay,
    from: String,
    to: String,
    content: String,
    name: Option<String>,
    avatar: Option<String>,
) -> Result<()> {
    let to_info = PeerInfo {
        user_id: to,
        avatar,
        name,
        extra: Default::default(),
    };
    let uuid = uuid::Uuid::new_v4().to_string();
    let payload = Payload::local(uuid.clone(), from, to_info, content);

    let key = relay
        .push_locale_payload(payload)
        .await
        .context("Failed to record message")?;
    relay
        .persist_sessions()
        .await
        .context("Failed to persist sessions")?;

    println!("{}\t{}", key, uuid);
    Ok(())
}
