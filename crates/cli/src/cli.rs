//! CLI arguments for the codec tool

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// EO protocol codec tool - encode, decode and inspect packet bytes
#[derive(Parser, Debug)]
#[command(name = "eoproto")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (defaults to ./eoproto.txt when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Force debug logging, even when RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode numbers and print their wire bytes as hex
    Encode {
        /// Width in bytes (1-4); overrides the configured width
        #[arg(short, long)]
        width: Option<u8>,

        numbers: Vec<u32>,
    },

    /// Decode a hex string as a run of numbers of one width
    Decode {
        /// Width in bytes (1-4); overrides the configured width
        #[arg(short, long)]
        width: Option<u8>,

        hex: String,
    },

    /// Print the values a packet sequencer produces
    Sequence {
        /// Sequence start; overrides the configured start
        #[arg(short, long)]
        start: Option<i32>,

        /// Number of values to print
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },

    /// Apply or reverse the string obfuscation
    String {
        #[command(subcommand)]
        action: StringAction,
    },

    /// Show the packet id of a packet and split its body into chunks
    Inspect { hex: String },
}

#[derive(Subcommand, Debug)]
pub enum StringAction {
    /// Obfuscate text and print the bytes as hex
    Encode { text: String },

    /// Restore text from obfuscated hex bytes
    Decode { hex: String },
}
