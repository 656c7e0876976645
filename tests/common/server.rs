//! Test server management.
//!
//! Spawns and manages hearthd instances for integration testing.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::Duration;
use tokio::time::sleep;

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    data_dir: PathBuf,
}

impl TestServer {
    /// Spawn a new test server with the given configuration.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        let data_dir = std::env::temp_dir().join(format!("hearthd-test-{}", port));
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join("config.toml");
        let config_content = format!(
            r#"
[server]
name = "test.server"
network = "TestNet"
sid = "00T"
description = "Test IRC Server"

[listen]
address = "127.0.0.1:{port}"

[server.idle_timeouts]
registration = 2

[security]
cloak_secret = "TestSecret-2026-Secure!9X"
cloak_suffix = "test"

[security.rate_limits]
message_rate_per_second = 1000
connection_burst_per_ip = 1000
join_burst_per_client = 1000

[motd]
lines = ["Test Server"]

[[oper]]
name = "testop"
password = "testpass"
"#
        );

        std::fs::write(&config_path, config_content)?;

        let cargo_manifest_dir = env!("CARGO_MANIFEST_DIR");
        let binary_path = PathBuf::from(cargo_manifest_dir).join("target/debug/hearthd");

        let child = Command::new(&binary_path)
            .arg(config_path.to_str().unwrap())
            .spawn()?;

        let server = Self {
            child,
            port,
            data_dir,
        };

        server.wait_until_ready().await?;

        Ok(server)
    }

    /// Spawn a test server with a custom config path.
    /// Used for tests that need a non-default config (e.g. custom oper blocks).
    pub async fn spawn_with_config(port: u16, config_path: PathBuf) -> anyhow::Result<Self> {
        if !config_path.exists() {
            anyhow::bail!("Config file not found: {:?}", config_path);
        }

        let cargo_manifest_dir = env!("CARGO_MANIFEST_DIR");
        let binary_path = PathBuf::from(cargo_manifest_dir).join("target/debug/hearthd");

        let child = Command::new(&binary_path)
            .arg(config_path.to_str().unwrap())
            .spawn()?;

        let server = Self {
            child,
            port,
            data_dir: config_path
                .parent()
                .unwrap_or_else(|| std::path::Path::new("."))
                .to_path_buf(),
        };

        server.wait_until_ready().await?;

        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..30 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 3 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self, nick: &str) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address(), nick).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}
