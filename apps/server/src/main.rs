use anyhow::Context;
use folio::domain::config::ApiConfig;
use folio::kernel::config::load_config;
use folio_logger::Logger;
use folio_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig = load_config(None::<&str>).context("Critical: Configuration is malformed")?;

    let _log = Logger::from_config(env!("CARGO_PKG_NAME"), &cfg.logging)?;

    Server::builder().config(cfg).build().await?.run().await
}
