//! CLI interface for costgpt
//!
//! # Example
//!
//! ```bash
//! # Price a call locally
//! costgpt cost gpt-4o --input 1000 --output 500
//!
//! # List the built-in catalog as JSON
//! costgpt models --json
//!
//! # Record a call and send it to the collector
//! COSTGPT_API_KEY=sk-... costgpt track claude-3.5-sonnet -i 1200 -o 300 --user-id alice
//! ```

use costgpt_core::error::{CostgptError, Result};
use serde_json::Value;

use clap::{Args, Parser, Subcommand};

/// Measure and attribute the cost of LLM API calls
#[derive(Parser, Debug, Clone)]
#[command(name = "costgpt")]
#[command(version = crate::VERSION, about, long_about = None)]
pub struct Cli {
    /// Show debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Token counts shared by `cost` and `track`
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenArgs {
    /// Prompt tokens
    #[arg(long, short = 'i', default_value_t = 0)]
    pub input: u64,

    /// Completion tokens
    #[arg(long, short = 'o', default_value_t = 0)]
    pub output: u64,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Calculate the cost of a call without recording it
    Cost {
        /// Model name as reported by the provider
        model: String,

        #[command(flatten)]
        tokens: TokenArgs,
    },

    /// List the built-in price catalog
    Models,

    /// Record a call and send it to the collector when an API key is set
    Track {
        /// Model name as reported by the provider
        model: String,

        #[command(flatten)]
        tokens: TokenArgs,

        /// User to attribute the call to
        #[arg(long)]
        user_id: Option<String>,

        /// Product feature to attribute the call to
        #[arg(long)]
        feature: Option<String>,

        /// Wall-clock duration of the call
        #[arg(long)]
        duration_ms: Option<u64>,

        /// Extra metadata as KEY=VALUE; VALUE is parsed as JSON when possible
        #[arg(long = "meta", value_parser = parse_metadata)]
        metadata: Vec<(String, Value)>,

        /// Collector API key
        #[arg(long, env = "COSTGPT_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Collector base URL
        #[arg(long, env = "COSTGPT_API_URL")]
        api_url: Option<String>,
    },
}

/// Parse a `KEY=VALUE` metadata argument
///
/// The value is read as JSON if it parses, otherwise kept as a string.
///
/// # Examples
///
/// ```
/// use costgpt::cli::parse_metadata;
/// use serde_json::json;
///
/// assert_eq!(parse_metadata("retries=3").unwrap(), ("retries".to_string(), json!(3)));
/// assert_eq!(parse_metadata("route=/chat").unwrap(), ("route".to_string(), json!("/chat")));
/// assert!(parse_metadata("novalue").is_err());
/// ```
pub fn parse_metadata(arg: &str) -> Result<(String, Value)> {
    let (key, raw) = arg.split_once('=').ok_or_else(|| {
        CostgptError::InvalidArgument(format!("Metadata must be KEY=VALUE, got '{arg}'"))
    })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(CostgptError::InvalidArgument(format!(
            "Metadata key is empty in '{arg}'"
        )));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
