use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pdfmark")]
#[command(
    version,
    about = "Hide an identifier pattern inside PDF stream data and find it again"
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the pattern bytes for a payload
    Pattern {
        /// Three-byte identifier (defaults to the configured payload)
        #[arg(short, long)]
        payload: Option<String>,

        /// Offset shown in the dump row (decimal or 0x-prefixed hex)
        #[arg(long, value_parser = parse_offset)]
        offset: Option<usize>,
    },

    /// Write the pattern into a copy of a PDF
    Inject {
        input: PathBuf,
        output: PathBuf,

        #[arg(short, long)]
        payload: Option<String>,

        /// Preferred offset inside the carrier stream (decimal or 0x-prefixed hex)
        #[arg(long, value_parser = parse_offset)]
        offset: Option<usize>,
    },

    /// Search a file's raw bytes for the pattern
    Verify {
        input: PathBuf,

        #[arg(short, long)]
        payload: Option<String>,

        /// File offset the pattern is expected at
        #[arg(long, value_parser = parse_offset)]
        expected_offset: Option<usize>,
    },

    /// Count stream and font objects
    Analyze { input: PathBuf },

    /// Verify, convert through the external tool, re-inject and verify again
    Roundtrip {
        input: PathBuf,
        output: PathBuf,

        #[arg(short, long)]
        payload: Option<String>,

        #[arg(long, value_parser = parse_offset)]
        offset: Option<usize>,

        /// Keep the intermediate converted PDF
        #[arg(long)]
        keep_temp: bool,
    },
}

/// Parse a decimal or `0x`-prefixed hexadecimal offset.
pub fn parse_offset(s: &str) -> Result<usize, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|_| format!("Invalid offset: {}", s))
}
