use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::errors::Error;
use crate::request::{RequestAttempt, RequestOptions};

use super::{AuthClient, join_url};

impl AuthClient {
    /// Performs an HTTP call with the current access token attached.
    ///
    /// On a 401 the client asks the refresh coordinator for a fresh token,
    /// persists it, and replays the request exactly once with the refreshed
    /// token. 401s on exempt paths, 401s with no refresh token available,
    /// and 401s on an already-retried attempt propagate as
    /// [`Error::Status`]. Every other status or transport failure passes
    /// through unmodified.
    pub async fn fetch(&self, url: &str, options: RequestOptions) -> Result<Value, Error> {
        let target = join_url(self.config.base_url.as_deref(), url);
        let mut attempt = RequestAttempt::initial();
        loop {
            let bearer = match attempt.token() {
                Some(token) => Some(token.to_string()),
                None => self.store.access_token().await,
            };
            match self.send(&target, &options, bearer.as_deref()).await {
                Ok(body) => {
                    if attempt.retried() {
                        info!("request succeeded after token refresh: url='{}'", target);
                    }
                    return Ok(body);
                }
                Err(Error::Status(status, body)) if status == StatusCode::UNAUTHORIZED => {
                    if attempt.retried() {
                        error!("still unauthorized after token refresh: url='{}'", target);
                        return Err(Error::Status(status, body));
                    }
                    if self.config.is_exempt(&target) {
                        debug!("401 on exempt path, skipping refresh: url='{}'", target);
                        return Err(Error::Status(status, body));
                    }
                    if self.store.refresh_token().await.is_none() {
                        debug!("401 with no refresh token available: url='{}'", target);
                        return Err(Error::Status(status, body));
                    }
                    warn!("401 received, refreshing access token: url='{}'", target);
                    let token = self.coordinator.acquire_fresh_token().await?;
                    self.store.save_access_token(&token).await;
                    attempt = RequestAttempt::retry_with(token);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// `fetch` with the response deserialized into `T`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<T, Error> {
        let body = self.fetch(url, options).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        self.fetch_json(url, RequestOptions::get()).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        self.fetch_json(url, RequestOptions::post(serde_json::to_value(body)?))
            .await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let options =
            RequestOptions::post(serde_json::to_value(body)?).with_method(Method::PUT);
        self.fetch_json(url, options).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        self.fetch_json(url, RequestOptions::get().with_method(Method::DELETE))
            .await
    }

    async fn send(
        &self,
        url: &str,
        options: &RequestOptions,
        bearer: Option<&str>,
    ) -> Result<Value, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(crate::USER_AGENT));
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Config(format!("Invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Config(format!("Invalid header value: {}", e)))?;
            headers.insert(name, value);
        }
        if let Some(token) = bearer {
            // The bearer token wins over any caller-supplied Authorization
            // header, and a retried attempt overwrites the stale one.
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::Config(format!("Invalid bearer token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let mut request = self
            .http
            .request(options.method.clone(), url)
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let pending = request.send();
        let response = match &options.signal {
            Some(signal) => tokio::select! {
                _ = signal.cancelled() => return Err(Error::Aborted),
                response = pending => response?,
            },
            None => pending.await?,
        };

        let status = response.status();
        if status.is_success() {
            let text = response.text().await?;
            if text.is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&text)?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Status(status, body))
    }
}
