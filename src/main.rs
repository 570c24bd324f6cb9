use store_parser::config::Config;
use store_parser::crawler::proxy::ProxyPool;
use store_parser::crawler::service::ScrapingService;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::from_env()?;
    let proxies = ProxyPool::load(&cfg.proxy_file)?;
    info!(proxies = proxies.len(), "Loaded proxy pool");

    ScrapingService::new(cfg, proxies).run().await
}
