//! Common test utilities - NearTest harness for end-to-end testing

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dnd_near::{Config, Server};
use reqwest::Client;
use tokio::task::JoinHandle;

/// Test harness that runs a real dnd-near server on a random port
pub struct NearTest {
    pub addr: SocketAddr,
    pub client: Client,
    server: Arc<Server>,
    _handle: JoinHandle<()>,
}

impl NearTest {
    /// Start a new in-memory server instance
    pub async fn start() -> Result<Self> {
        Self::start_with(|_| {}).await
    }

    /// Start a server after adjusting the default test config
    pub async fn start_with(adjust: impl FnOnce(&mut Config)) -> Result<Self> {
        let addr = free_addr()?;

        let mut config = Config {
            bind_addr: addr,
            db_path: None, // In-memory for tests
            ..Config::default()
        };
        adjust(&mut config);

        let server = Arc::new(Server::new(config).await?);
        let server_clone = server.clone();

        // Spawn the server in a background task
        let handle = tokio::spawn(async move {
            if let Err(e) = server_clone.run().await {
                eprintln!("Server error: {}", e);
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;
        wait_until_ready(&client, addr).await;

        Ok(Self {
            addr,
            client,
            server,
            _handle: handle,
        })
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .put(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .delete(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Get direct access to the database for test setup/assertions
    pub fn db(&self) -> Arc<dnd_near::db::Database> {
        self.server.db()
    }
}

impl Drop for NearTest {
    fn drop(&mut self) {
        self.server.shutdown();
    }
}

/// The dnd-near binary running as a child process
pub struct BinaryServer {
    pub addr: SocketAddr,
    pub client: Client,
    child: Child,
}

impl BinaryServer {
    /// Spawn the compiled binary with the given extra arguments
    pub async fn spawn(extra_args: &[&str]) -> Result<Self> {
        let addr = free_addr()?;
        let binary = PathBuf::from(env!("CARGO_BIN_EXE_dnd-near"));

        let child = Command::new(&binary)
            .arg("--bind")
            .arg(addr.to_string())
            .args(extra_args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to spawn {:?}: {}", binary, e))?;

        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;
        let server = Self {
            addr,
            client,
            child,
        };
        wait_until_ready(&server.client, addr).await;
        Ok(server)
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for BinaryServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn free_addr() -> Result<SocketAddr> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Poll the health endpoint until it answers (max 5 seconds)
async fn wait_until_ready(client: &Client, addr: SocketAddr) {
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .is_ok()
        {
            return;
        }
    }
    panic!("Server failed to start within 5 seconds");
}
