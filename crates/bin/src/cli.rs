//! CLI argument definitions for the Haven binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Aligned, human-readable text
    Human,
    /// One JSON document per command
    Json,
}

/// Haven identity and direct-message tool
#[derive(Parser, Debug)]
#[command(name = "haven")]
#[command(about = "Haven: Nostr identity custody and gift-wrapped direct messages")]
#[command(version)]
pub struct Cli {
    /// Configuration file (JSON). Missing files fall back to defaults.
    #[arg(short, long, global = true, env = "HAVEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "human", env = "HAVEN_FORMAT")]
    pub format: Format,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new identity and print its keys
    Keygen,
    /// Show the public encodings of a private or public key
    Inspect(InspectArgs),
    /// Encrypt a private key into a key record file
    Seal(SealArgs),
    /// Decrypt a key record file and print its public key
    Unseal(UnsealArgs),
    /// Gift-wrap a direct message
    Wrap(WrapArgs),
    /// Open a gift-wrapped direct message
    Unwrap(UnwrapArgs),
}

/// Arguments for the inspect command
#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// `nsec1…`, `npub1…` or 64 hexadecimal characters
    pub key: String,
}

/// Arguments for the seal command
#[derive(clap::Args, Debug)]
pub struct SealArgs {
    /// Private key to seal (`nsec1…` or hex)
    #[arg(short, long, env = "HAVEN_SECRET_KEY", hide_env_values = true)]
    pub key: String,

    /// Passphrase protecting the record
    #[arg(short, long, env = "HAVEN_PASSPHRASE", hide_env_values = true)]
    pub passphrase: String,

    /// Where to write the record
    #[arg(short, long)]
    pub out: PathBuf,
}

/// Arguments for the unseal command
#[derive(clap::Args, Debug)]
pub struct UnsealArgs {
    /// Key record file written by `seal`
    #[arg(short, long)]
    pub record: PathBuf,

    /// Passphrase protecting the record
    #[arg(short, long, env = "HAVEN_PASSPHRASE", hide_env_values = true)]
    pub passphrase: String,

    /// Also print the private key
    #[arg(long)]
    pub reveal: bool,
}

/// Arguments for the wrap command
#[derive(clap::Args, Debug)]
pub struct WrapArgs {
    /// Sender's private key (`nsec1…` or hex)
    #[arg(short, long, env = "HAVEN_SECRET_KEY", hide_env_values = true)]
    pub key: String,

    /// Recipient's public key (`npub1…` or hex)
    #[arg(short, long)]
    pub to: String,

    /// Message body
    #[arg(short, long)]
    pub message: String,
}

/// Arguments for the unwrap command
#[derive(clap::Args, Debug)]
pub struct UnwrapArgs {
    /// Recipient's private key (`nsec1…` or hex)
    #[arg(short, long, env = "HAVEN_SECRET_KEY", hide_env_values = true)]
    pub key: String,

    /// File holding the gift wrap event JSON; `-` reads standard input
    #[arg(default_value = "-")]
    pub input: PathBuf,
}
