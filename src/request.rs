use reqwest::Method;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Options for a single outgoing request.
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Aborts the underlying transport call when triggered. Cancelling one
    /// request never cancels a shared in-flight token refresh.
    pub signal: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }
}

/// One attempt at a logical fetch call.
///
/// A retried attempt pins the token that was current when its refresh wait
/// resolved; it never races against a newer refresh cycle. `retried` bounds
/// 401 recovery to exactly one hop.
#[derive(Clone, Debug)]
pub(crate) struct RequestAttempt {
    retried: bool,
    token: Option<String>,
}

impl RequestAttempt {
    pub(crate) fn initial() -> Self {
        Self {
            retried: false,
            token: None,
        }
    }

    pub(crate) fn retry_with(token: String) -> Self {
        Self {
            retried: true,
            token: Some(token),
        }
    }

    pub(crate) fn retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
