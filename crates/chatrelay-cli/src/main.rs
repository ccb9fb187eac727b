use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "chatrelay")]
#[command(about = "chatrelay - client-side relay and cache for one-to-one chat", long_about = None)]
struct Cli {
    /// Store file (defaults to `store_path` from the configuration)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a JSON-lines file of channel events through the relay
    Replay { file: PathBuf },
    /// Send a message from this client
    Send {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        content: String,
        /// Display name of the recipient
        #[arg(long)]
        name: Option<String>,
        /// Avatar of the recipient
        #[arg(long)]
        avatar: Option<String>,
    },
    /// List sessions, newest first
    Sessions,
    /// Print the history of a conversation
    History { key: String },
    /// Reset the unread counter of a conversation
    ClearUnread { key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let relay = commands::open_relay(cli.store, cli.config).await?;

    match cli.command {
        Commands::Replay { file } => commands::replay::run(&relay, &file).await?,
        Commands::Send {
            from,
            to,
            content,
            name,
            avatar,
        } => commands::send::run(&relay, from, to, content, name, avatar).await?,
        Commands::Sessions => commands::inspect::sessions(&relay).await,
        Commands::History { key } => commands::inspect::history(&relay, key).await,
        Commands::ClearUnread { key } => commands::inspect::clear_unread(&relay, key).await?,
    }

    relay.flush().await;
    Ok(())
}
