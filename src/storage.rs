use std::collections::HashMap;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const REFRESH_TOKEN_EXPIRY_KEY: &str = "refresh_token_expiry";

/// Pluggable token storage backing an [`AuthClient`](crate::AuthClient).
///
/// The client never caches tokens beyond the lifetime of one request;
/// implementations are the single source of truth.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn access_token(&self) -> Option<String>;
    async fn save_access_token(&self, token: &str);
    async fn refresh_token(&self) -> Option<String>;
    /// Absolute expiry of the refresh token, if the host records one.
    async fn refresh_token_expiry(&self) -> Option<Timestamp>;
    /// Removes every stored credential. Hosts with additional keys override
    /// this to extend the teardown.
    async fn clear(&self);
}

/// In-memory store keyed by the conventional credential names. The expiry is
/// stored as unix milliseconds, matching key-value hosts like localStorage.
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(access: Option<&str>, refresh: Option<&str>, expiry: Option<Timestamp>) -> Self {
        let mut entries = HashMap::new();
        if let Some(token) = access {
            entries.insert(ACCESS_TOKEN_KEY.to_string(), token.to_string());
        }
        if let Some(token) = refresh {
            entries.insert(REFRESH_TOKEN_KEY.to_string(), token.to_string());
        }
        if let Some(at) = expiry {
            entries.insert(
                REFRESH_TOKEN_EXPIRY_KEY.to_string(),
                at.as_millisecond().to_string(),
            );
        }
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    pub async fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY).await
    }

    async fn save_access_token(&self, token: &str) {
        self.set(ACCESS_TOKEN_KEY, token).await;
    }

    async fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY).await
    }

    async fn refresh_token_expiry(&self) -> Option<Timestamp> {
        let raw = self.get(REFRESH_TOKEN_EXPIRY_KEY).await?;
        let millis = raw.trim().parse::<i64>().ok()?;
        Timestamp::from_millisecond(millis).ok()
    }

    async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_store_exposes_tokens() {
        let store = MemoryTokenStore::seeded(Some("A1"), Some("R1"), None);
        assert_eq!(store.access_token().await.as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("R1"));
        assert!(store.refresh_token_expiry().await.is_none());
    }

    #[tokio::test]
    async fn save_overwrites_access_token() {
        let store = MemoryTokenStore::seeded(Some("A1"), None, None);
        store.save_access_token("A2").await;
        assert_eq!(store.access_token().await.as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn clear_removes_all_keys() {
        let store = MemoryTokenStore::seeded(Some("A1"), Some("R1"), Some(Timestamp::now()));
        store.clear().await;
        assert!(store.access_token().await.is_none());
        assert!(store.refresh_token().await.is_none());
        assert!(store.refresh_token_expiry().await.is_none());
    }

    #[tokio::test]
    async fn empty_values_read_as_absent() {
        let store = MemoryTokenStore::new();
        store.set(REFRESH_TOKEN_KEY, "").await;
        assert!(store.refresh_token().await.is_none());
    }

    #[tokio::test]
    async fn garbage_expiry_reads_as_absent() {
        let store = MemoryTokenStore::new();
        store.set(REFRESH_TOKEN_EXPIRY_KEY, "not-a-timestamp").await;
        assert!(store.refresh_token_expiry().await.is_none());
    }

    #[tokio::test]
    async fn expiry_round_trips_through_millis() {
        let at = Timestamp::from_millisecond(1_750_000_000_000).unwrap();
        let store = MemoryTokenStore::seeded(None, None, Some(at));
        assert_eq!(store.refresh_token_expiry().await, Some(at));
    }
}
