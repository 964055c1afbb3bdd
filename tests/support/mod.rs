#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use auth_fetch::{AuthClient, ClientConfig, MemoryTokenStore};
use tracing::subscriber::{DefaultGuard, set_default};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Registry, fmt};
use wiremock::MockServer;

pub const REFRESH_PATH: &str = "/auth/refresh";

pub fn seeded_store(access: &str, refresh: Option<&str>) -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::seeded(Some(access), refresh, None))
}

pub fn client_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(REFRESH_PATH).with_base_url(server.uri())
}

pub fn client_for(server: &MockServer, store: Arc<MemoryTokenStore>) -> AuthClient {
    AuthClient::new(client_config(server), store).expect("valid client config")
}

struct VecWriter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl std::io::Write for VecWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.lines.lock().unwrap();
        guard.push(String::from_utf8_lossy(buf).into_owned());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn capture_logs() -> (Arc<Mutex<Vec<String>>>, DefaultGuard) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let writer_lines = lines.clone();
    let subscriber = Registry::default().with(
        fmt::Layer::default()
            .with_writer(move || VecWriter {
                lines: writer_lines.clone(),
            })
            .with_target(false)
            .with_level(true)
            .with_ansi(false),
    );
    let guard = set_default(subscriber);
    (lines, guard)
}
