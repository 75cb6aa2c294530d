use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "craftboard-server", version, about = "Combine elements, discover new ones")]
pub struct Config {
    /// Address the HTTP server binds to.
    #[arg(long, env = "CRAFTBOARD_ADDR", default_value = "127.0.0.1:39333")]
    pub addr: SocketAddr,

    /// Base URL of the Forge generative service.
    #[arg(long, env = "FORGE_URL", default_value = "http://127.0.0.1:8788")]
    pub forge_url: String,

    #[arg(long, env = "FORGE_API_KEY")]
    pub forge_api_key: Option<String>,

    /// Transport timeout for a single Forge query.
    #[arg(long, env = "FORGE_TIMEOUT_SECS", default_value_t = 30)]
    pub forge_timeout_secs: u64,

    /// Seed for card placement; random when omitted.
    #[arg(long, env = "CRAFTBOARD_SEED")]
    pub seed: Option<u64>,

    #[arg(long, env = "CRAFTBOARD_LOG", default_value = "info")]
    pub log_level: log::LevelFilter,
}

impl Config {
    pub fn forge_timeout(&self) -> Duration {
        Duration::from_secs(self.forge_timeout_secs)
    }
}
