//! WebDriver process management - spawning and status checking geckodriver

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to a running WebDriver process
pub struct DriverHandle {
    child: Child,
    pub url: String,
    pub port: u16,
}

impl DriverHandle {
    /// Spawn the WebDriver binary
    pub async fn spawn(config: DriverConfig) -> E2eResult<Self> {
        let port = match config.port {
            Some(port) => port,
            None => find_free_port()?,
        };
        let url = format!("http://127.0.0.1:{}", port);

        info!("Spawning {} on port {}", config.binary_path.display(), port);

        let mut cmd = Command::new(&config.binary_path);
        cmd.arg("--host")
            .arg("127.0.0.1")
            .arg("--port")
            .arg(port.to_string());

        if let Some(level) = &config.log_level {
            cmd.arg("--log").arg(level);
        }

        cmd.stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            E2eError::DriverStartup(format!(
                "Failed to spawn {}: {}",
                config.binary_path.display(),
                e
            ))
        })?;

        let handle = DriverHandle {
            child,
            url: url.clone(),
            port,
        };

        handle.wait_for_ready(config.startup_timeout).await?;

        info!("WebDriver is ready at {}", url);
        Ok(handle)
    }

    /// Wait for the WebDriver to report itself ready
    async fn wait_for_ready(&self, timeout_duration: Duration) -> E2eResult<()> {
        wait_for_ready(&self.url, timeout_duration).await
    }

    /// Get the URL of this WebDriver
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stop the WebDriver
    pub fn stop(&mut self) -> E2eResult<()> {
        if let Ok(Some(_)) = self.child.try_wait() {
            return Ok(());
        }
        info!("Stopping WebDriver (pid: {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Poll `GET {url}/status` until the WebDriver reports `ready`
pub async fn wait_for_ready(url: &str, timeout_duration: Duration) -> E2eResult<()> {
    let status_url = format!("{}/status", url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = std::time::Instant::now();
    let mut attempts = 0;

    while start.elapsed() < timeout_duration {
        attempts += 1;

        match client.get(&status_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let body: Value = resp.json().await?;
                if is_ready(&body) {
                    return Ok(());
                }
                warn!("WebDriver not ready yet: {}", body);
            }
            Ok(resp) => {
                warn!("Status check returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for WebDriver to start...");
                }
                // Connection refused is expected while the driver is starting
                if !e.is_connect() {
                    warn!("Status check error: {}", e);
                }
            }
        }

        sleep(Duration::from_millis(100)).await;
    }

    Err(E2eError::DriverStatusCheck(attempts))
}

fn is_ready(body: &Value) -> bool {
    body.get("value")
        .and_then(|v| v.get("ready"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Configuration for spawning a WebDriver
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Path to the geckodriver binary
    pub binary_path: PathBuf,

    /// Port to listen on (None = find free port)
    pub port: Option<u16>,

    /// Timeout for driver startup
    pub startup_timeout: Duration,

    /// geckodriver `--log` level
    pub log_level: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("geckodriver"),
            port: None,
            startup_timeout: Duration::from_secs(30),
            log_level: None,
        }
    }
}

/// Find a free port to use
fn find_free_port() -> E2eResult<u16> {
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
