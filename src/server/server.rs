use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::server::TokenSweeper;
use crate::settings::{self, Settings};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// HS256 wants at least as many key bytes as the digest.
const RECOMMENDED_KEY_LEN: usize = 32;

pub struct Server {
    pub token_service: Arc<dyn TokenService>,
    pub token_codec: Arc<dyn TokenCodec>,
    sweeper_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        settings.validate()?;

        let secret = settings.auth.secret.as_bytes();
        if secret.len() < RECOMMENDED_KEY_LEN {
            warn!(
                "signing key is {} bytes; use at least {}",
                secret.len(),
                RECOMMENDED_KEY_LEN
            );
        }
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(secret)?);

        let (token_store, pool) = build_store(&settings.store).await?;

        let token_service: Arc<dyn TokenService> = Arc::new(RealTokenService::new(
            token_codec.clone(),
            token_store.clone(),
            TokenTtl {
                access: settings.auth.access_ttl(),
                refresh: settings.auth.refresh_ttl(),
            },
        ));

        let cancel = CancellationToken::new();
        let sweeper_handle = if settings.cleanup.enabled {
            let sweeper =
                TokenSweeper::new(token_store, settings.cleanup.interval(), cancel.clone());
            Some(tokio::spawn(async move { sweeper.run().await }))
        } else {
            info!("token sweeper disabled");
            None
        };

        info!(backend = %settings.store.backend, "server started");

        Ok(Self {
            token_service,
            token_codec,
            sweeper_handle: Mutex::new(sweeper_handle),
            cancel,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = match self.sweeper_handle.lock() {
            Ok(mut lock) => lock.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            let r = handle.await;
            info!("sweeper handle dropped: {:?}", r);
        }

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

/// Builds the configured refresh-token backend. The pool is handed back so the
/// owner can close it on shutdown.
pub async fn build_store(
    settings: &settings::Store,
) -> anyhow::Result<(Arc<dyn RefreshTokenStore>, Option<MySqlPool>)> {
    match settings.backend.as_str() {
        "memory" => {
            warn!("memory store selected; refresh tokens will not survive a restart");
            Ok((Arc::new(MemoryRefreshTokenStore::new()), None))
        }
        "mysql" => {
            anyhow::ensure!(!settings.dsn.is_empty(), "store.dsn is required for mysql");
            let pool = MySqlPoolOptions::new()
                .max_connections(settings.max_connections)
                .acquire_timeout(settings.op_timeout())
                .connect(&settings.dsn)
                .await?;
            let store = MySqlRefreshTokenStore::new(pool.clone(), settings.op_timeout());
            store.ensure_schema().await?;
            Ok((Arc::new(store), Some(pool)))
        }
        other => Err(anyhow::anyhow!("Unknown store backend: {}", other)),
    }
}
