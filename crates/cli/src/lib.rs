use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "volscan")]
#[command(about = "volscan - 15-minute volatility scanner for USDT-margined futures")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP scanner service
    Serve {
        /// Path to the configuration file
        #[arg(short, long, default_value = "volscan.yaml")]
        config: PathBuf,

        /// Override listen host
        #[arg(long)]
        host: Option<String>,

        /// Override HTTP port
        #[arg(long)]
        port: Option<u16>,

        /// Override log format
        #[arg(long, value_enum)]
        log_format: Option<LogFormatArg>,
    },

    /// Run a single scan against the exchange and print the results
    Scan {
        /// Path to the configuration file
        #[arg(short, long, default_value = "volscan.yaml")]
        config: PathBuf,

        /// Minimum candle range in percent
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Print rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration without starting the service
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "volscan.yaml")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "volscan.yaml")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable multi-line output
    Pretty,

    /// One JSON object per line
    Json,

    /// Single-line text
    Compact,
}

impl LogFormatArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormatArg::Pretty => "pretty",
            LogFormatArg::Json => "json",
            LogFormatArg::Compact => "compact",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
