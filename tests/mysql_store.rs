//! Runs against a live MySQL named by `DATABASE_URL`:
//!
//! $ DATABASE_URL=mysql://user:pw@localhost:3306/tokenkeeper_test cargo test --test mysql_store -- --ignored

use chrono::{SubsecRound, TimeDelta, Utc};
use sqlx::MySqlPool;
use std::time::Duration;
use tokenkeeper::domain_model::*;
use tokenkeeper::domain_port::*;
use tokenkeeper::infra_mysql::MySqlRefreshTokenStore;

async fn store() -> MySqlRefreshTokenStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = MySqlPool::connect(&url).await.unwrap();
    let store = MySqlRefreshTokenStore::new(pool, Duration::from_secs(5));
    store.ensure_schema().await.unwrap();
    store
}

fn unique_member() -> MemberId {
    MemberId(Utc::now().timestamp_micros())
}

fn unique_token(tag: &str) -> String {
    format!("{tag}-{}", uuid::Uuid::new_v4())
}

#[tokio::test]
#[ignore]
async fn upsert_replaces_the_member_row() {
    let store = store().await;
    let member = unique_member();
    let exp = Utc::now().trunc_subsecs(0) + TimeDelta::days(1);
    let first = unique_token("first");
    let second = unique_token("second");

    store.upsert(member, &first, exp).await.unwrap();
    let created = store.find_by_member(member).await.unwrap().unwrap();
    store.upsert(member, &second, exp).await.unwrap();
    let replaced = store.find_by_member(member).await.unwrap().unwrap();

    assert_eq!(created.id, replaced.id);
    assert_eq!(replaced.token, second);
    assert_eq!(replaced.expires_at, exp);
    assert!(store.find_by_token(&first).await.unwrap().is_none());

    assert!(store.delete_by_token(&second).await.unwrap());
    assert!(!store.delete_by_token(&second).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn token_lookup_is_case_sensitive() {
    let store = store().await;
    let member = unique_member();
    let token = unique_token("CaseSensitive");

    store
        .upsert(member, &token, Utc::now() + TimeDelta::days(1))
        .await
        .unwrap();

    assert!(store.find_by_token(&token).await.unwrap().is_some());
    assert!(store.find_by_token(&token.to_lowercase()).await.unwrap().is_none());
    store.delete_by_token(&token).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn sweep_removes_past_rows() {
    let store = store().await;
    let member = unique_member();
    let token = unique_token("dead");

    store
        .upsert(member, &token, Utc::now() - TimeDelta::hours(1))
        .await
        .unwrap();

    assert!(store.delete_expired_before(Utc::now()).await.unwrap() >= 1);
    assert!(store.find_by_token(&token).await.unwrap().is_none());
}
