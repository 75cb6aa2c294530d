use clap::Parser;
use craftboard_server::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    craftboard_server::logging::init(config.log_level);

    log::info!(
        "server listening on http://{} (forge: {})",
        config.addr,
        config.forge_url
    );
    craftboard_server::serve(config).await
}
