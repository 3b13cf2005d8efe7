#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

pub const SIGN_KEY: &str = "supersecretsignkey";
pub const BINARY: &str = env!("CARGO_BIN_EXE_appman-api");

// Tests in one binary share a server while any of them holds it. The last
// holder to finish drops it, which stops the process.
static SERVER: Mutex<Weak<TestServer>> = Mutex::new(Weak::new());

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Database settings come from the inherited APPMAN_DATABASE_* variables.
        // The server recreates the schema on startup.
        let mut cmd = Command::new(BINARY);
        cmd.env_remove("APPMAN_CONFIG")
            .env("APPMAN_HOST", "127.0.0.1")
            .env("APPMAN_PORT", port.to_string())
            .env("APPMAN_JWT_SIGNKEY", SIGN_KEY)
            .env("APPMAN_DATABASE_RESET_SCHEMA", "true")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Tests that need PostgreSQL only run when one is configured
pub fn database_configured() -> bool {
    std::env::var("APPMAN_DATABASE_HOST").map(|v| !v.is_empty()).unwrap_or(false)
}

/// Shared server for this test binary, or None when no database is configured.
/// Hold the returned handle for the whole test.
pub async fn ensure_server() -> Result<Option<Arc<TestServer>>> {
    if !database_configured() {
        eprintln!("APPMAN_DATABASE_HOST not set; skipping database-backed test");
        return Ok(None);
    }

    let server = {
        let mut slot = SERVER.lock().unwrap_or_else(|e| e.into_inner());
        match slot.upgrade() {
            Some(server) => server,
            None => {
                let server = Arc::new(TestServer::spawn()?);
                *slot = Arc::downgrade(&server);
                server
            }
        }
    };

    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(Some(server))
}

pub fn token(user_id: i32, username: &str) -> String {
    appman_api::auth::generate_token(user_id, username, SIGN_KEY.as_bytes()).expect("token generation")
}
