use anyhow::{Context, Result};
use cc_logs_core::proto::UnixMillis;
use cc_logs_format::{Precision, Timezone, parse_timestamp};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod render;

use config::{DisplayConfig, FileConfig, TimestampsMode};
use render::Renderer;

#[derive(Parser)]
#[command(name = "cc-logs")]
#[command(about = "Stream and render application logs", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/cc-logs/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow a live stream, or fetch a time range when --until is set
    Tail {
        /// Server-sent events endpoint
        #[arg(long)]
        url: Option<String>,
        /// Start of the range (RFC 3339), defaults to now
        #[arg(long)]
        since: Option<String>,
        /// End of the range (RFC 3339); makes the query bounded
        #[arg(long)]
        until: Option<String>,
        /// Only stream these instances (repeatable)
        #[arg(long = "instance")]
        instances: Vec<String>,
        /// Records per connection before the stream stops for overflow
        #[arg(long)]
        overflow_limit: Option<u64>,
        /// Records kept in memory
        #[arg(long)]
        buffer_capacity: Option<usize>,
        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Render newline-delimited log events from a file or stdin
    Replay {
        file: Option<PathBuf>,
        #[command(flatten)]
        display: DisplayArgs,
    },
}

#[derive(Args)]
struct DisplayArgs {
    /// Timestamp column
    #[arg(long, value_enum)]
    timestamps: Option<TimestampsArg>,
    /// Timestamp precision
    #[arg(long, value_enum)]
    precision: Option<PrecisionArg>,
    /// Show times in UTC
    #[arg(long)]
    utc: bool,
    /// Append the zone offset to timestamps
    #[arg(long)]
    zone_offset: bool,
    /// Print plain text without ANSI styles
    #[arg(long)]
    no_color: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum TimestampsArg {
    None,
    Datetime,
    Time,
}

#[derive(Clone, Copy, ValueEnum)]
enum PrecisionArg {
    Seconds,
    Milliseconds,
}

impl DisplayArgs {
    fn apply(&self, mut display: DisplayConfig) -> DisplayConfig {
        if let Some(timestamps) = self.timestamps {
            display.timestamps = match timestamps {
                TimestampsArg::None => TimestampsMode::None,
                TimestampsArg::Datetime => TimestampsMode::Datetime,
                TimestampsArg::Time => TimestampsMode::Time,
            };
        }
        if let Some(precision) = self.precision {
            display.precision = match precision {
                PrecisionArg::Seconds => Precision::Seconds,
                PrecisionArg::Milliseconds => Precision::Milliseconds,
            };
        }
        if self.utc {
            display.timezone = Timezone::Utc;
        }
        if self.zone_offset {
            display.zone_offset = true;
        }
        if self.no_color {
            display.color = false;
        }
        display
    }
}

fn parse_date(flag: &str, value: &str) -> Result<UnixMillis> {
    parse_timestamp(value).with_context(|| format!("Invalid --{flag} value: {value}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let file_config: FileConfig = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Tail {
            url,
            since,
            until,
            instances,
            overflow_limit,
            buffer_capacity,
            display,
        } => {
            let url = url
                .or(file_config.url)
                .context("No logs endpoint: pass --url or set `url` in the config file")?;
            let since = match since {
                Some(value) => parse_date("since", &value)?,
                None => chrono::Utc::now().timestamp_millis(),
            };
            let until = until.map(|value| parse_date("until", &value)).transpose()?;

            let mut stream = file_config.stream;
            if let Some(limit) = overflow_limit {
                stream.overflow_limit = limit;
            }
            if let Some(capacity) = buffer_capacity {
                stream.buffer_capacity = capacity;
            }

            let renderer = Renderer::new(&display.apply(file_config.display));
            let options = commands::tail::TailOptions {
                url,
                since,
                until,
                instances,
                stream,
            };
            commands::tail::exec(options, renderer).await?;
        }
        Commands::Replay { file, display } => {
            let renderer = Renderer::new(&display.apply(file_config.display));
            commands::replay::exec(file.as_deref(), renderer).await?;
        }
    }

    Ok(())
}
