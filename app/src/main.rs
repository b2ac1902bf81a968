#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, InfoStrategy, InitStrategy, SessionStrategy,
    TelegramInput, TelegramStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "chatbridge")]
#[command(about = "Bridge between a conversational assistant and your users", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk to the assistant (interactive unless -m is given)
    Chat {
        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// User id the conversation is recorded under
        #[arg(short = 'u', long, default_value = "cli")]
        user: String,

        /// Resume an existing assistant session
        #[arg(short = 's', long)]
        session: Option<String>,

        /// Treat messages as voice input and answer with synthesized audio links
        #[arg(long)]
        audio: bool,
    },
    /// Create an assistant session and print its id
    Session,
    /// Run the Telegram bot
    Telegram {
        /// Bot token (overrides config)
        #[arg(short = 't', long)]
        token: Option<String>,

        /// Allowed chat ids (overrides config)
        #[arg(long, num_args = 1..)]
        allow_from: Option<Vec<String>>,
    },
    /// Initialize configuration
    Init,
    /// Show configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            user,
            session,
            audio,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    message,
                    user_id: user,
                    session_id: session,
                    audio,
                })
                .await
        }
        Commands::Session => SessionStrategy.execute(()).await,
        Commands::Telegram { token, allow_from } => {
            TelegramStrategy
                .execute(TelegramInput { token, allow_from })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
