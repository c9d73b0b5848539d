use anyhow::Context;
use sbox_domain::config::AppConfig;
use sbox_domain::constants::DEFAULT_CONFIG_FILE;
use sbox_kernel::config::load_config;
use sbox_logger::Logger;
use sbox_server::Server;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let cfg: AppConfig =
        load_config(config_path.as_deref()).context("Critical: Configuration is malformed")?;

    let _log = Logger::from_config(env!("CARGO_PKG_NAME"), &cfg.logging)?;
    info!(
        source = config_path.as_deref().unwrap_or(DEFAULT_CONFIG_FILE),
        required = config_path.is_some(),
        "Configuration loaded"
    );

    Server::builder().config(cfg).build().await?.run().await
}
