use tokenkeeper::domain_model::*;
use tokenkeeper::server::*;
use tokenkeeper::settings::*;

fn memory_settings(cleanup_enabled: bool) -> Settings {
    Settings {
        auth: Auth {
            secret: "server-test-secret-server-test-secret".to_string(),
            access_ttl_secs: 60,
            refresh_ttl_secs: 3600,
        },
        store: Store {
            backend: "memory".to_string(),
            dsn: String::new(),
            max_connections: 1,
            op_timeout_ms: 1000,
        },
        cleanup: Cleanup {
            enabled: cleanup_enabled,
            interval_secs: 3600,
        },
        http: Http {
            address: "127.0.0.1:0".to_string(),
            cert_path: None,
            key_path: None,
        },
        log: Log {
            filter: "info".to_string(),
        },
    }
}

#[tokio::test]
async fn memory_server_issues_refreshes_and_shuts_down() {
    let server = Server::try_new(&memory_settings(true)).await.unwrap();

    let tokens = server.token_service.issue(MemberId(42), "USER").await.unwrap();
    let access = server
        .token_service
        .refresh(&tokens.refresh_token.0)
        .await
        .unwrap();
    let claims = server.token_codec.verify(&access.0).unwrap();
    assert_eq!(claims.member_id, MemberId(42));

    server.shutdown().await;
    // idempotent
    server.shutdown().await;
}

#[tokio::test]
async fn unknown_backend_is_refused() {
    let mut settings = memory_settings(false);
    settings.store.backend = "postgres".to_string();
    assert!(Server::try_new(&settings).await.is_err());
}

#[tokio::test]
async fn zero_ttl_is_refused() {
    let mut settings = memory_settings(false);
    settings.auth.refresh_ttl_secs = 0;
    assert!(Server::try_new(&settings).await.is_err());

    let mut settings = memory_settings(false);
    settings.auth.access_ttl_secs = 0;
    assert!(Server::try_new(&settings).await.is_err());
}

#[tokio::test]
async fn mysql_backend_requires_a_dsn() {
    let mut settings = memory_settings(false);
    settings.store.backend = "mysql".to_string();
    assert!(build_store(&settings.store).await.is_err());
}
