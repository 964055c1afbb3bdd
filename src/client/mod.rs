mod dispatch;

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::watch;

use crate::config::ClientConfig;
use crate::errors::Error;
use crate::refresh::RefreshCoordinator;
use crate::storage::TokenStore;

/// Authenticated HTTP client.
///
/// Attaches the current bearer token to outgoing requests and transparently
/// recovers from a single expired-token 401 per logical call by refreshing
/// through the [`RefreshCoordinator`] and retrying once.
#[derive(Clone)]
pub struct AuthClient {
    pub(crate) http: Client,
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) store: Arc<dyn TokenStore>,
    pub(crate) coordinator: RefreshCoordinator,
    refreshing: watch::Receiver<bool>,
}

impl AuthClient {
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self, Error> {
        config.validate()?;
        let http = Client::new();
        let refresh_url = join_url(config.base_url.as_deref(), &config.refresh_endpoint);
        // The coordinator talks to the transport directly so a 401 from the
        // refresh endpoint can never re-enter the interceptor.
        let coordinator = RefreshCoordinator::new(
            http.clone(),
            refresh_url,
            Arc::clone(&store),
            config.on_refresh_failure.clone(),
        );
        let refreshing = coordinator.subscribe();
        Ok(Self {
            http,
            config: Arc::new(config),
            store,
            coordinator,
            refreshing,
        })
    }

    /// True while a token refresh cycle is in flight, for UI feedback.
    pub fn is_refreshing(&self) -> bool {
        *self.refreshing.borrow()
    }

    /// Watch handle observing refresh state transitions.
    pub fn refreshing_watch(&self) -> watch::Receiver<bool> {
        self.refreshing.clone()
    }

    /// Removes every locally stored credential via the injected store.
    pub async fn clear_tokens(&self) {
        self.store.clear().await;
    }

    pub fn store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.store)
    }
}

pub(crate) fn join_url(base: Option<&str>, url: &str) -> String {
    if url.starts_with("http") {
        return url.to_string();
    }
    match base {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/')),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_bypass_the_base() {
        assert_eq!(
            join_url(Some("https://api.example.com"), "https://other.example.com/x"),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn relative_paths_join_without_duplicate_slashes() {
        assert_eq!(
            join_url(Some("https://api.example.com/"), "/orders"),
            "https://api.example.com/orders"
        );
        assert_eq!(
            join_url(Some("https://api.example.com"), "orders"),
            "https://api.example.com/orders"
        );
    }

    #[test]
    fn missing_base_leaves_path_untouched() {
        assert_eq!(join_url(None, "/orders"), "/orders");
    }
}
