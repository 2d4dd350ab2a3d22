use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

/// Process-local store. Records live in `by_member`; `by_token` is a lookup
/// index that may briefly point at a replaced record, so every read through
/// it re-checks the token on the primary entry.
///
/// Lock order is always `by_member` then `by_token`.
pub struct MemoryRefreshTokenStore {
    by_member: DashMap<MemberId, RefreshTokenRecord>,
    by_token: DashMap<String, MemberId>,
    next_id: AtomicI64,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        MemoryRefreshTokenStore {
            by_member: DashMap::new(),
            by_token: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.by_member.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_member.is_empty()
    }
}

impl Default for MemoryRefreshTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn find_by_member(
        &self,
        member_id: MemberId,
    ) -> Result<Option<RefreshTokenRecord>, AuthError> {
        Ok(self.by_member.get(&member_id).map(|r| r.value().clone()))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let Some(member_id) = self.by_token.get(token).map(|m| *m.value()) else {
            return Ok(None);
        };

        Ok(self
            .by_member
            .get(&member_id)
            .filter(|r| r.token == token)
            .map(|r| r.value().clone()))
    }

    async fn upsert(
        &self,
        member_id: MemberId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        match self.by_member.entry(member_id) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                self.by_token.remove(&record.token);
                record.token = token.to_owned();
                record.expires_at = expires_at;
            }
            Entry::Vacant(entry) => {
                let id = RecordId(self.next_id.fetch_add(1, Ordering::Relaxed));
                entry.insert(RefreshTokenRecord {
                    id,
                    member_id,
                    token: token.to_owned(),
                    expires_at,
                });
            }
        }
        // Still under the member entry lock.
        self.by_token.insert(token.to_owned(), member_id);
        Ok(())
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, AuthError> {
        let Some(member_id) = self.by_token.get(token).map(|m| *m.value()) else {
            return Ok(false);
        };

        let removed = self
            .by_member
            .remove_if(&member_id, |_, record| record.token == token);
        if removed.is_some() {
            self.by_token.remove_if(token, |_, owner| *owner == member_id);
        }
        Ok(removed.is_some())
    }

    async fn delete_expired_before(&self, before: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut count = 0u64;
        self.by_member.retain(|_, record| {
            if record.expires_at < before {
                self.by_token.remove(&record.token);
                count += 1;
                false
            } else {
                true
            }
        });
        Ok(count)
    }
}
