use std::fmt;
use std::sync::Arc;

use reqwest::StatusCode;

/// Failure modes surfaced by the refresh coordinator.
///
/// Cloneable so a single refresh outcome can be handed to every caller
/// waiting on the same in-flight refresh.
#[derive(Clone, Debug)]
pub enum RefreshError {
    MissingRefreshToken,
    TokenExpired(jiff::Timestamp),
    Endpoint(StatusCode, String),
    Transport(Arc<reqwest::Error>),
    MalformedResponse(String),
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshError::MissingRefreshToken => {
                write!(f, "no refresh token available")
            }
            RefreshError::TokenExpired(at) => {
                write!(f, "refresh token expired at {at}")
            }
            RefreshError::Endpoint(status, body) => {
                write!(f, "refresh endpoint failed: status={status} body='{body}'")
            }
            RefreshError::Transport(err) => {
                write!(f, "refresh request failed: {err}")
            }
            RefreshError::MalformedResponse(msg) => {
                write!(f, "malformed refresh response: {msg}")
            }
        }
    }
}

impl std::error::Error for RefreshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RefreshError::Transport(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    Json(serde_json::Error),
    Status(StatusCode, String),
    Refresh(RefreshError),
    Config(String),
    Aborted,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<RefreshError> for Error {
    fn from(err: RefreshError) -> Self {
        Error::Refresh(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(err) => write!(f, "http transport error: {err}"),
            Error::Json(err) => write!(f, "json error: {err}"),
            Error::Status(status, body) => {
                write!(f, "request failed: status={status} body='{body}'")
            }
            Error::Refresh(err) => write!(f, "token refresh failed: {err}"),
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
            Error::Aborted => write!(f, "request aborted by caller"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Refresh(err) => Some(err),
            _ => None,
        }
    }
}
