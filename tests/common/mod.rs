//! Shared utilities for the end-to-end lifecycle tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use appserver_harness::LaunchConfig;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Request lines seen by a mock admin server.
pub type RequestLog = Arc<Mutex<Vec<String>>>;

/// Start a mock admin server that answers every request with 200 OK.
pub async fn start_mock_admin() -> (SocketAddr, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let requests = log.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let requests = requests.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]);
                        if let Some(line) = head.lines().next() {
                            requests.lock().unwrap().push(line.to_string());
                        }

                        let body = "quitting";
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, log)
}

/// Start a mock admin server that accepts connections and never answers.
pub async fn start_stalled_admin() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// Write an application directory whose `stub.toml` holds `behavior`.
pub fn stub_app(behavior: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("stub.toml"), behavior).unwrap();
    dir
}

/// Launch configuration running the stand-in server for `app_dir`.
pub fn stub_config(app_dir: &Path, timeout_secs: u64) -> LaunchConfig {
    let mut config = LaunchConfig::for_app(app_dir);
    config.executable = env!("CARGO_BIN_EXE_stub-appserver").to_string();
    config.host = "127.0.0.1".to_string();
    config.timeout_secs = timeout_secs;
    config
}

/// Pid the stand-in recorded for its grandchild.
pub fn grandchild_pid(app_dir: &Path) -> u32 {
    std::fs::read_to_string(app_dir.join("grandchild.pid"))
        .unwrap()
        .trim()
        .parse()
        .unwrap()
}

/// Whether `pid` names a live, non-zombie process.
pub fn is_running(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        // The state letter follows the parenthesised command name.
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.trim_start().chars().next())
            .map(|state| state != 'Z' && state != 'X')
            .unwrap_or(false),
        Err(_) if Path::new("/proc/self").exists() => false,
        Err(_) => {
            use nix::sys::signal::kill;
            use nix::unistd::Pid;
            kill(Pid::from_raw(pid as i32), None).is_ok()
        }
    }
}

/// Poll until `pid` is gone or `timeout` passes. Returns true if it is gone.
pub async fn wait_until_gone(pid: u32, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if !is_running(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    !is_running(pid)
}
