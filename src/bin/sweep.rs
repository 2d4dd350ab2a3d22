//! One-shot purge of expired refresh tokens, for running from cron instead of
//! the in-process sweeper.
//!
//! $ cargo run --bin sweep -- --settings=settings/release.toml

use std::time::Duration;
use tokenkeeper::logger::*;
use tokenkeeper::server::*;
use tokenkeeper::settings::*;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();
    let project_settings = parse_settings(cli.settings.as_deref())?;
    logger.reload_from_config(&LogConfig {
        filter: project_settings.log.filter.clone(),
    })?;

    let (token_store, pool) = build_store(&project_settings.store).await?;
    let sweeper = TokenSweeper::new(token_store, Duration::ZERO, CancellationToken::new());

    let result = sweeper.sweep_once().await;
    if let Some(pool) = pool {
        pool.close().await;
    }

    let removed = result?;
    info!(removed, "expired refresh tokens purged");
    Ok(())
}
