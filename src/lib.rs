pub mod client;
pub mod config;
pub mod errors;
pub mod refresh;
pub mod request;
pub mod storage;
pub mod telemetry;

pub use client::AuthClient;
pub use config::{ClientConfig, RefreshFailureHook};
pub use errors::{Error, RefreshError};
pub use request::RequestOptions;
pub use storage::{MemoryTokenStore, TokenStore};

pub(crate) const USER_AGENT: &str = "auth-fetch-rust/0.1.0";
