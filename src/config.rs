//! Client configuration captured once at construction.

use std::sync::Arc;

use crate::errors::{Error, RefreshError};

/// Invoked exactly once when a refresh cycle definitively fails, intended for
/// UI-level session teardown such as a redirect to login.
pub type RefreshFailureHook = Arc<dyn Fn(&RefreshError) + Send + Sync>;

#[derive(Clone)]
pub struct ClientConfig {
    /// Prefix applied to relative request paths.
    pub base_url: Option<String>,
    /// Path (or absolute URL) used to exchange a refresh token for a new
    /// access token.
    pub refresh_endpoint: String,
    /// URL substrings that must never trigger a refresh attempt on 401,
    /// typically login/register endpoints.
    pub exempt_paths: Vec<String>,
    pub on_refresh_failure: Option<RefreshFailureHook>,
}

impl ClientConfig {
    pub fn new(refresh_endpoint: impl Into<String>) -> Self {
        Self {
            base_url: None,
            refresh_endpoint: refresh_endpoint.into(),
            exempt_paths: Vec::new(),
            on_refresh_failure: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_exempt_paths<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.exempt_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn on_refresh_failure(
        mut self,
        hook: impl Fn(&RefreshError) + Send + Sync + 'static,
    ) -> Self {
        self.on_refresh_failure = Some(Arc::new(hook));
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.refresh_endpoint.is_empty() {
            return Err(Error::Config("Refresh endpoint must not be empty".into()));
        }
        if let Some(base) = &self.base_url {
            reqwest::Url::parse(base)
                .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", base, e)))?;
        }
        Ok(())
    }

    pub(crate) fn is_exempt(&self, url: &str) -> bool {
        self.exempt_paths.iter().any(|path| url.contains(path.as_str()))
    }
}
