//! Convo Intent - Command line front end
//!
//! Runs the intent engine over text, transcripts and message exports:
//! - `classify` tags individual messages
//! - `aggregate` summarizes one conversation
//! - `backfill` tags exported message rows that have no intent yet
//! - `replay` drives room tracking from a recorded chat log
//! - `serve` tracks rooms live from stdin with periodic re-aggregation
//! - `taxonomy` prints the active taxonomy

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use convo_intent::clock::{ManualClock, SystemClock};
use convo_intent::config::{default_config_path, IntentConfig};
use convo_intent::engine::{resolve_taxonomy, IntentEngine};
use convo_intent::room::ChatMessage;
use convo_intent::scheduler::ReaggregationTask;
use convo_intent::{NullBehavior, TaxonomyKind};

#[derive(Parser, Debug)]
#[command(name = "convo-intent")]
#[command(about = "Convo Intent - Rule-based intent tagging for chat conversations")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Override the configured taxonomy
    #[arg(short, long, global = true)]
    taxonomy: Option<TaxonomyKind>,

    /// Override what happens to messages that match nothing
    #[arg(long, global = true)]
    null_behavior: Option<NullBehavior>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify messages given as arguments, or one per stdin line
    Classify { text: Vec<String> },

    /// Aggregate a conversation, one message per line, from a file or stdin.
    /// Blank lines are blank messages and count toward the default intent.
    Aggregate {
        file: Option<PathBuf>,

        /// Recent window size (defaults to the configured one)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Tag exported message rows (JSON lines) that have no intent yet
    Backfill {
        file: PathBuf,

        /// Clear rows tagged with the default intent before tagging
        #[arg(long)]
        clear_default: bool,
    },

    /// Replay a recorded chat log (JSON lines) through room tracking
    Replay { file: PathBuf },

    /// Track rooms from chat messages on stdin (JSON lines) until interrupted
    Serve,

    /// Print the active taxonomy
    Taxonomy {
        #[arg(long, value_enum, default_value_t = TaxonomyFormat::Toml)]
        format: TaxonomyFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TaxonomyFormat {
    Toml,
    Json,
}

/// One exported message row
#[derive(Debug, Serialize, Deserialize)]
struct MessageRow {
    id: Value,
    content: Value,
    #[serde(default)]
    sales_intent: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

/// One recorded chat message
#[derive(Debug, Deserialize)]
struct ChatRow {
    room_id: String,
    user_id: String,
    username: String,
    content: String,
    timestamp: DateTime<Utc>,
}

impl ChatRow {
    fn into_message(self) -> (String, ChatMessage) {
        let message = ChatMessage::new(self.user_id, self.username, self.content, self.timestamp);
        (self.room_id, message)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries results
    // Can override with RUST_LOG env var (e.g., RUST_LOG=convo_intent=debug)
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("convo_intent={}", default_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_thread_ids(args.verbose)
                .with_file(args.verbose)
                .with_line_number(args.verbose),
        )
        .init();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let mut config = IntentConfig::load(&config_path)?;
    if let Some(taxonomy) = args.taxonomy {
        config.taxonomy = taxonomy;
    }
    if let Some(null_behavior) = args.null_behavior {
        config.null_behavior = null_behavior;
    }
    config.validate()?;
    debug!(path = %config_path, taxonomy = %config.taxonomy, "Configuration loaded");

    match args.command {
        Command::Classify { text } => run_classify(&config, text),
        Command::Aggregate { file, window } => run_aggregate(&config, file.as_deref(), window),
        Command::Backfill {
            file,
            clear_default,
        } => run_backfill(&config, &file, clear_default),
        Command::Replay { file } => run_replay(&config, &file).await,
        Command::Serve => run_serve(&config).await,
        Command::Taxonomy { format } => run_taxonomy(&config, format),
    }
}

fn read_lines(file: Option<&Path>) -> Result<Vec<String>> {
    let lines = match file {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            io::BufReader::new(file).lines().collect::<io::Result<Vec<_>>>()?
        }
        None => io::stdin().lock().lines().collect::<io::Result<Vec<_>>>()?,
    };
    Ok(lines)
}

fn run_classify(config: &IntentConfig, text: Vec<String>) -> Result<()> {
    let engine = IntentEngine::from_config(config)?;
    let messages = if text.is_empty() {
        read_lines(None)?
    } else {
        text
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for message in &messages {
        match engine.label(message) {
            Some(intent) => writeln!(out, "{}", intent)?,
            None => writeln!(out, "-")?,
        }
    }
    Ok(())
}

fn run_aggregate(config: &IntentConfig, file: Option<&Path>, window: Option<usize>) -> Result<()> {
    let engine = IntentEngine::from_config(config)?;
    let messages = read_lines(file)?;

    let window = window.unwrap_or(config.recent_window_size);
    let summary = engine.aggregate_with_window(&messages, window)?;
    info!(
        messages = messages.len(),
        dominant = %summary.dominant_intent,
        "Conversation aggregated"
    );

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_backfill(config: &IntentConfig, file: &Path, clear_default: bool) -> Result<()> {
    let engine = IntentEngine::from_config(config)?;
    let default_intent = engine.rules().default_intent();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let (mut updated, mut cleared, mut skipped) = (0usize, 0usize, 0usize);

    for (line_no, line) in read_lines(Some(file))?.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut row: MessageRow = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), line_no + 1))?;

        if clear_default && row.sales_intent.as_deref() == Some(default_intent.as_str()) {
            row.sales_intent = None;
            cleared += 1;
        }

        if row.sales_intent.as_deref().map_or(true, str::is_empty) {
            match engine.classifier().label_value(&row.content) {
                Ok(intent) => {
                    row.sales_intent = intent.map(|i| i.to_string());
                    updated += 1;
                }
                Err(e) => {
                    warn!(id = %row.id, error = %e, "Skipping message");
                    skipped += 1;
                }
            }
        }

        writeln!(out, "{}", serde_json::to_string(&row)?)?;
    }

    info!(updated, cleared, skipped, "Backfill completed");
    Ok(())
}

async fn run_replay(config: &IntentConfig, file: &Path) -> Result<()> {
    let engine = IntentEngine::from_config(config)?;

    let mut rows = Vec::new();
    for (line_no, line) in read_lines(Some(file))?.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row: ChatRow = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), line_no + 1))?;
        rows.push(row);
    }
    rows.sort_by_key(|row| row.timestamp);

    let Some(first) = rows.first() else {
        info!("Nothing to replay");
        return Ok(());
    };
    let clock = ManualClock::new(first.timestamp);
    let registry = engine.room_registry(config, Arc::new(clock.clone()));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut room_ids = BTreeSet::new();

    for row in rows {
        clock.set(row.timestamp);
        let (room_id, message) = row.into_message();
        room_ids.insert(room_id.clone());

        if let Some(analysis) = registry.ingest(&room_id, message).await {
            if let Some(transition) = analysis.transition {
                let line = serde_json::json!({
                    "room_id": room_id,
                    "transition": transition,
                });
                writeln!(out, "{}", line)?;
            }
        }
    }

    for analysis in registry.analyze_all().await {
        if let Some(transition) = analysis.transition {
            let line = serde_json::json!({
                "room_id": analysis.room_id,
                "transition": transition,
            });
            writeln!(out, "{}", line)?;
        }
    }

    for room_id in &room_ids {
        let line = serde_json::json!({
            "room_id": room_id,
            "current_intent": registry.room_intent(room_id).await,
            "intent_weights": registry.room_weights(room_id).await,
        });
        writeln!(out, "{}", line)?;
    }

    info!(rooms = room_ids.len(), "Replay completed");
    Ok(())
}

async fn run_serve(config: &IntentConfig) -> Result<()> {
    let engine = IntentEngine::from_config(config)?;
    let registry = engine.room_registry(config, Arc::new(SystemClock));

    // Print every event as a JSON line
    let mut events = registry.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!(room_id = event.room_id(), error = %e, "Failed to encode event"),
                },
                Err(RecvError::Lagged(missed)) => warn!(missed, "Event printer fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let task = ReaggregationTask::from_registry(registry.clone());
    let (token, reaggregation) = task.spawn();

    // Hourly idle-room eviction
    let eviction_registry = registry.clone();
    let eviction_token = token.clone();
    let idle_ttl = config.room.idle_ttl();
    let eviction = tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            tokio::select! {
                _ = eviction_token.cancelled() => break,
                _ = interval.tick() => {
                    eviction_registry.evict_idle(idle_ttl).await;
                }
            }
        }
    });

    info!("Reading chat messages from stdin");
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<ChatRow>(&line) {
                    Ok(row) => {
                        let room_id = row.room_id.clone();
                        registry
                            .process_message(&room_id, &row.user_id, &row.username, &row.content)
                            .await;
                    }
                    Err(e) => warn!(error = %e, "Ignoring malformed message line"),
                }
            }
        }
    }

    token.cancel();
    reaggregation.await?;
    eviction.await?;

    // One final pass so the last messages are reflected
    registry.analyze_all().await;
    drop(registry);
    printer.await?;
    Ok(())
}

fn run_taxonomy(config: &IntentConfig, format: TaxonomyFormat) -> Result<()> {
    let mut taxonomy = resolve_taxonomy(config)?;
    if let Some(default_intent) = &config.default_intent {
        taxonomy = taxonomy.with_default_intent(default_intent.clone());
    }

    debug!(
        taxonomy = %taxonomy.name,
        intents = ?taxonomy.intent_names().collect::<Vec<_>>(),
        "Rendering taxonomy"
    );
    let rendered = match format {
        TaxonomyFormat::Toml => taxonomy.to_toml()?,
        TaxonomyFormat::Json => serde_json::to_string_pretty(&taxonomy)?,
    };
    println!("{}", rendered);
    Ok(())
}
