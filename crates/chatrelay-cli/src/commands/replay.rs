use anyhow::{Context, Result};
use async_trait::async_trait;
use chatrelay_application::{ChannelAdapter, ChannelEvent, ChatRelay, MessageChannel};
use chatrelay_core::{AppLifecycleState, Platform};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Prints acknowledgements instead of sending them anywhere.
struct StdoutChannel;

#[async_trait]
impl MessageChannel for StdoutChannel {
    async fn emit(&self, event: &str, body: &Value) -> chatrelay_core::error::Result<()> {
        println!("-> {} {}", event, body);
        Ok(())
    }
}

/// Parses JSON lines into channel events, skipping blanks and bad lines.
pub fn parse_events(content: &str) -> Vec<ChannelEvent> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str(line) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!("[replay] skipping line {}: {}", index + 1, e);
                None
            }
        })
        .collect()
}

pub async fn run(relay: &ChatRelay, file: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let events = parse_events(&content);

    let (lifecycle, signal) = watch::channel(AppLifecycleState::Active);
    let listener = relay.spawn_lifecycle_listener(signal);

    let adapter = ChannelAdapter::new(relay.clone(), Arc::new(StdoutChannel));
    let (sender, receiver) = mpsc::channel(events.len().max(1));
    let total = events.len();
    let feeder = tokio::spawn(async move {
        for event in events {
            if sender.send(event).await.is_err() {
                break;
            }
        }
    });
    let handled = adapter.run(receiver).await;
    feeder.await.context("Event feeder failed")?;
    tracing::info!("[replay] handled {} of {} events", handled, total);

    let leaving = match relay.config().platform {
        Platform::Ios => AppLifecycleState::Inactive,
        Platform::Android | Platform::Generic => AppLifecycleState::Background,
    };
    lifecycle
        .send(leaving)
        .context("Lifecycle listener stopped")?;
    drop(lifecycle);
    listener.await.context("Lifecycle listener failed")?;

    super::print_sessions(relay).await;
    Ok(())
}
