use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use jiff::Timestamp;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tracing::debug;

use crate::config::RefreshFailureHook;
use crate::errors::RefreshError;
use crate::storage::TokenStore;
use crate::telemetry::refresh::RefreshTelemetry;

use super::response::{RefreshRequest, extract_access_token};

type RefreshFuture = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

/// Guarantees single-flight semantics for token refresh: however many
/// requests observe a 401 concurrently, exactly one refresh call is issued
/// and every waiter receives the same outcome.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    http: Client,
    refresh_url: String,
    store: Arc<dyn TokenStore>,
    on_failure: Option<RefreshFailureHook>,
    in_flight: Mutex<Option<RefreshFuture>>,
    refreshing: watch::Sender<bool>,
}

impl RefreshCoordinator {
    pub(crate) fn new(
        http: Client,
        refresh_url: String,
        store: Arc<dyn TokenStore>,
        on_failure: Option<RefreshFailureHook>,
    ) -> Self {
        let (refreshing, _) = watch::channel(false);
        Self {
            inner: Arc::new(CoordinatorInner {
                http,
                refresh_url,
                store,
                on_failure,
                in_flight: Mutex::new(None),
                refreshing,
            }),
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.refreshing.subscribe()
    }

    /// Returns the in-flight refresh if one exists, otherwise starts a new
    /// cycle. All joiners observe the same token or the same error.
    pub async fn acquire_fresh_token(&self) -> Result<String, RefreshError> {
        let fut = {
            // Check-then-set happens under a single lock guard with no
            // suspension in between; two concurrent 401s cannot both start
            // a refresh.
            let mut slot = self.inner.in_flight.lock().await;
            match slot.as_ref() {
                Some(existing) => {
                    debug!("joining in-flight token refresh");
                    existing.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let fut = async move { inner.drive_refresh().await }.boxed().shared();
                    *slot = Some(fut.clone());
                    self.inner.refreshing.send_replace(true);
                    fut
                }
            }
        };
        fut.await
    }
}

impl CoordinatorInner {
    async fn drive_refresh(self: Arc<Self>) -> Result<String, RefreshError> {
        let telemetry = RefreshTelemetry::new("token.refresh");
        telemetry.emit_start(Timestamp::now());
        let result = self.run_refresh().await;
        match &result {
            Ok(_) => telemetry.emit_success(Timestamp::now()),
            Err(err) => {
                telemetry.emit_failure(err, Timestamp::now());
                if let Some(hook) = &self.on_failure {
                    hook(err);
                }
            }
        }
        // Release the slot before waiters observe the outcome so the next
        // 401 starts a fresh cycle instead of replaying this one.
        *self.in_flight.lock().await = None;
        self.refreshing.send_replace(false);
        result
    }

    /// Exchanges the stored refresh token for a new access token through the
    /// raw transport. Going through the authenticated client here would let a
    /// 401 from the refresh endpoint recurse into another refresh.
    async fn run_refresh(&self) -> Result<String, RefreshError> {
        let refresh_token = self
            .store
            .refresh_token()
            .await
            .ok_or(RefreshError::MissingRefreshToken)?;

        if let Some(expiry) = self.store.refresh_token_expiry().await
            && expiry <= Timestamp::now()
        {
            return Err(RefreshError::TokenExpired(expiry));
        }

        let response = self
            .http
            .post(&self.refresh_url)
            .header("User-Agent", crate::USER_AGENT)
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await
            .map_err(|err| RefreshError::Transport(Arc::new(err)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RefreshError::Endpoint(status, body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| RefreshError::Transport(Arc::new(err)))?;
        extract_access_token(&body).ok_or_else(|| {
            RefreshError::MalformedResponse(
                "response carried no recognized access token field".to_string(),
            )
        })
    }
}
