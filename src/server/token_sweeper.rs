use crate::application_port::AuthError;
use crate::domain_port::RefreshTokenStore;
use crate::logger::*;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Purges refresh-token rows whose expiry has passed. A failed sweep is
/// logged and left to the next tick; dead rows only cost storage.
pub struct TokenSweeper {
    token_store: Arc<dyn RefreshTokenStore>,
    interval: Duration,
    cancellation_token: CancellationToken,
}

impl TokenSweeper {
    pub fn new(
        token_store: Arc<dyn RefreshTokenStore>,
        interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            token_store,
            interval: interval.max(MIN_INTERVAL),
            cancellation_token,
        }
    }

    pub async fn sweep_once(&self) -> Result<u64, AuthError> {
        let now = Utc::now();
        self.token_store.delete_expired_before(now).await
    }

    /// First sweep runs immediately, then once per interval until cancelled.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval = ?self.interval, "token sweeper started");
        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    info!("token sweeper shutting down...");
                    break;
                }
                _ = ticker.tick() => {
                    match self.sweep_once().await {
                        Ok(removed) => info!(removed, "expired refresh tokens purged"),
                        Err(e) => error!("token sweep failed: {}", e),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::*;
    use crate::infra_memory::MemoryRefreshTokenStore;
    use chrono::{DateTime, TimeDelta};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn sweep_removes_only_expired_records() {
        let store = Arc::new(MemoryRefreshTokenStore::new());
        let now = Utc::now();
        store
            .upsert(MemberId(1), "expired", now - TimeDelta::seconds(1))
            .await
            .unwrap();
        store
            .upsert(MemberId(2), "live", now + TimeDelta::days(1))
            .await
            .unwrap();

        let sweeper = TokenSweeper::new(
            store.clone(),
            Duration::from_secs(60),
            CancellationToken::new(),
        );
        assert_eq!(sweeper.sweep_once().await.unwrap(), 1);
        assert!(store.find_by_token("expired").await.unwrap().is_none());
        assert!(store.find_by_token("live").await.unwrap().is_some());
    }

    /// Fails the first sweep, succeeds afterwards.
    struct FlakyStore {
        sweeps: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RefreshTokenStore for FlakyStore {
        async fn find_by_member(
            &self,
            _member_id: MemberId,
        ) -> Result<Option<RefreshTokenRecord>, AuthError> {
            Ok(None)
        }
        async fn find_by_token(
            &self,
            _token: &str,
        ) -> Result<Option<RefreshTokenRecord>, AuthError> {
            Ok(None)
        }
        async fn upsert(
            &self,
            _member_id: MemberId,
            _token: &str,
            _expires_at: DateTime<Utc>,
        ) -> Result<(), AuthError> {
            Ok(())
        }
        async fn delete_by_token(&self, _token: &str) -> Result<bool, AuthError> {
            Ok(false)
        }
        async fn delete_expired_before(&self, _before: DateTime<Utc>) -> Result<u64, AuthError> {
            if self.sweeps.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AuthError::StoreUnavailable("connection refused".to_string()))
            } else {
                Ok(0)
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_ticking_after_a_failed_sweep_and_stops_on_cancel() {
        let store = Arc::new(FlakyStore {
            sweeps: AtomicUsize::new(0),
        });
        let cancel = CancellationToken::new();
        let sweeper = TokenSweeper::new(store.clone(), Duration::from_secs(3600), cancel.clone());

        let handle = tokio::spawn(async move { sweeper.run().await });

        // ticks at 0h, 1h, 2h and 3h
        tokio::time::sleep(Duration::from_secs(3 * 3600 + 1)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(store.sweeps.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_never_sweeps() {
        let store = Arc::new(FlakyStore {
            sweeps: AtomicUsize::new(0),
        });
        let cancel = CancellationToken::new();
        cancel.cancel();

        TokenSweeper::new(store.clone(), Duration::from_secs(60), cancel)
            .run()
            .await;

        assert_eq!(store.sweeps.load(Ordering::SeqCst), 0);
    }
}
