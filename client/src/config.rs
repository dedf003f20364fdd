use std::time::Duration;

use clap::Parser;

pub const DEFAULT_RELAY_URL: &str = "http://localhost:8080/legal-chat";

/// Terminal chat client for the LegalAI relay.
#[derive(Debug, Clone, Parser)]
#[command(name = "legalai", version, about)]
pub struct ClientConfig {
    /// Relay endpoint that accepts `{ messages }` and streams the reply
    #[arg(long, env = "LEGALAI_RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    pub relay_url: String,

    /// Bearer credential forwarded to the relay
    #[arg(long, env = "LEGALAI_TOKEN")]
    pub token: Option<String>,

    /// Seconds to wait for response headers or the next chunk before giving up
    #[arg(long, env = "LEGALAI_IDLE_TIMEOUT_SECS", default_value_t = 60)]
    pub idle_timeout_secs: u64,
}

impl ClientConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}
