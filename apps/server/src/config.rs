use std::{net::SocketAddr, time::Duration};

use clap::Parser;
use quickwatch_core::{HighlightMode, Provider};

#[derive(Debug, Clone, Parser)]
#[command(name = "quickwatch-server", version)]
#[command(about = "Serve transcript, summary and key moments for YouTube videos over HTTP")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "QUICKWATCH_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// AI provider for summary and highlights (grok, openai, gemini)
    #[arg(long, env = "QUICKWATCH_PROVIDER", default_value = "gemini")]
    pub provider: Provider,

    /// Model override (defaults to the provider's model)
    #[arg(long, env = "QUICKWATCH_MODEL")]
    pub model: Option<String>,

    /// How highlights are picked (prune, moments)
    #[arg(long, env = "QUICKWATCH_HIGHLIGHT_MODE", default_value = "moments")]
    pub mode: HighlightMode,

    /// Caption language to prefer
    #[arg(long, env = "QUICKWATCH_LANG", default_value = "en")]
    pub lang: String,

    /// Upper bound for one request, in seconds
    #[arg(long, env = "QUICKWATCH_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
