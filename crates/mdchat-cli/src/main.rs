//! mdchat CLI: Command-line interface for the markdown chat window

use clap::{Parser, Subcommand};
use mdchat_engine::{
    run_reveal, ChatConfig, Conversation, RevealTicker, SubmitOutcome, ThemeName,
};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable naming a log file when `--log-file` is absent.
const LOG_ENV: &str = "MDCHAT_LOG";

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "mdchat=info";

/// Markdown chat window with a simulated streaming reveal
#[derive(Parser)]
#[command(name = "mdchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Delay between revealed characters, in milliseconds
    #[arg(long, global = true)]
    interval_ms: Option<u64>,

    /// Color theme (mocha, latte, high-contrast)
    #[arg(long, global = true)]
    theme: Option<ThemeName>,

    /// Write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat window (default when no command specified)
    Tui,

    /// Send one message and print the reply to stdout
    Say {
        /// Message text
        text: String,

        /// Print the reply at once instead of revealing it
        #[arg(long)]
        instant: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| std::env::var_os(LOG_ENV).map(PathBuf::from));
    if let Some(path) = &log_file {
        init_logging(path)?;
    }

    let config = resolve_config(&cli)?;
    debug!(?config, "configuration resolved");

    let rt = tokio::runtime::Runtime::new()?;
    match cli.command {
        None | Some(Commands::Tui) => rt.block_on(mdchat_tui::run_tui(&config)),
        Some(Commands::Say { text, instant }) => rt.block_on(cmd_say(&config, &text, instant)),
    }
}

/// Install a file-only subscriber; the terminal belongs to the UI.
fn init_logging(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

/// Load the config file, then apply flag and environment overrides.
fn resolve_config(cli: &Cli) -> Result<ChatConfig, mdchat_engine::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => ChatConfig::load_or_default(path)?,
        None => ChatConfig::default(),
    };

    if let Some(ms) = cli.interval_ms {
        config.reveal_interval_ms = ms;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    } else if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        config.theme = ThemeName::HighContrast;
    }

    config.validate()?;
    Ok(config)
}

/// Run one conversation turn headless and print the reply.
async fn cmd_say(
    config: &ChatConfig,
    text: &str,
    instant: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut conversation = Conversation::new();
    if let SubmitOutcome::Ignored(_) = conversation.submit(text)? {
        return Err("message is blank".into());
    }

    let mut stdout = io::stdout();

    if instant {
        while conversation.is_streaming() {
            conversation.tick()?;
        }
        if let Some(reply) = conversation.last_reply() {
            writeln!(stdout, "{}", reply.text)?;
        }
        return Ok(());
    }

    let mut ticker = RevealTicker::new(config.reveal_interval());
    let mut printed = 0;
    let mut write_error = None;

    let last = run_reveal(&mut conversation, &mut ticker, |conv, _tick| {
        let Some(reply) = conv.last_reply() else {
            return;
        };
        let fresh = &reply.text[printed..];
        printed = reply.text.len();
        if write_error.is_none() {
            if let Err(e) = stdout.write_all(fresh.as_bytes()).and_then(|()| stdout.flush()) {
                write_error = Some(e);
            }
        }
    })
    .await?;

    if let Some(e) = write_error {
        return Err(e.into());
    }
    writeln!(stdout)?;
    info!(?last, "reply printed");
    Ok(())
}
