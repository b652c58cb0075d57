//! End-to-end tests driving the stand-in dev server.

#![cfg(unix)]

use std::time::{Duration, Instant};

use appserver_harness::{DevServer, HarnessError, LifecycleState};

mod common;

#[tokio::test]
async fn test_ready_then_clean_close() {
    let (admin_addr, requests) = common::start_mock_admin().await;
    let app = common::stub_app(&format!(
        "admin_url = \"http://{}\"\nmodule_name = \"my app\"\nlinger_ms = 500\n",
        admin_addr
    ));

    let mut config = common::stub_config(app.path(), 5);
    config.port = 8080;
    let mut server = DevServer::launch(config).await.expect("server should start");

    assert_eq!(server.state(), LifecycleState::Ready);
    assert_eq!(server.module_url(), Some("http://127.0.0.1:8080"));
    assert_eq!(server.api_url(), Some("http://127.0.0.1:36415"));
    let admin_url = format!("http://{}", admin_addr);
    assert_eq!(server.admin_url(), Some(admin_url.as_str()));
    let pid = server.pid().unwrap();

    server.close().await.expect("close should succeed");
    assert_eq!(server.state(), LifecycleState::Closed);
    assert!(!common::is_running(pid));

    let seen = requests.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].starts_with("GET /quit "), "unexpected request {:?}", seen[0]);

    // A second close is a no-op.
    server.close().await.unwrap();
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unanswered_quit_kills_child() {
    let admin_addr = common::start_stalled_admin().await;
    let app = common::stub_app(&format!("admin_url = \"http://{}\"\n", admin_addr));

    let mut server = DevServer::launch(common::stub_config(app.path(), 2))
        .await
        .expect("server should start");
    let pid = server.pid().unwrap();

    let err = server.close().await.unwrap_err();
    assert!(matches!(err, HarnessError::QuitRequestFailed(_)), "got {err}");
    assert_eq!(server.state(), LifecycleState::Closed);
    assert!(common::wait_until_gone(pid, Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_shutdown_timeout_kills_process_group() {
    let (admin_addr, _requests) = common::start_mock_admin().await;
    let app = common::stub_app(&format!(
        "admin_url = \"http://{}\"\ngrandchild = true\n",
        admin_addr
    ));

    let mut server = DevServer::launch(common::stub_config(app.path(), 2))
        .await
        .expect("server should start");
    let pid = server.pid().unwrap();
    let grandchild = common::grandchild_pid(app.path());
    assert!(common::is_running(grandchild));

    let started = Instant::now();
    let err = server.close().await.unwrap_err();
    assert_eq!(err.to_string(), "timeout killing child process");
    assert!(started.elapsed() >= Duration::from_secs(2));

    assert!(common::wait_until_gone(pid, Duration::from_secs(5)).await);
    assert!(common::wait_until_gone(grandchild, Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_startup_timeout_kills_process_group() {
    let app = common::stub_app("announce = [\"api\", \"module\"]\ngrandchild = true\n");

    let mut server = DevServer::new(common::stub_config(app.path(), 2));
    let started = Instant::now();
    let err = server.start().await.unwrap_err();

    assert!(matches!(err, HarnessError::StartupTimeout), "got {err}");
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(server.state(), LifecycleState::Failed);

    let grandchild = common::grandchild_pid(app.path());
    assert!(common::wait_until_gone(grandchild, Duration::from_secs(5)).await);

    server.close().await.unwrap();
    assert_eq!(server.state(), LifecycleState::Failed);
}

#[tokio::test]
async fn test_missing_admin_line_reported_after_exit() {
    let app = common::stub_app("announce = [\"module\", \"api\"]\nlinger_ms = 100\n");

    let err = DevServer::launch(common::stub_config(app.path(), 5))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "unable to find admin server URL");
}

#[tokio::test]
async fn test_failed_exit_status_is_reported() {
    let (admin_addr, _requests) = common::start_mock_admin().await;
    let app = common::stub_app(&format!(
        "admin_url = \"http://{}\"\nlinger_ms = 200\nexit_code = 3\n",
        admin_addr
    ));

    let mut server = DevServer::launch(common::stub_config(app.path(), 5))
        .await
        .expect("server should start");

    let err = server.close().await.unwrap_err();
    match err {
        HarnessError::ChildExited(status) => assert_eq!(status.code(), Some(3)),
        other => panic!("expected ChildExited, got {other}"),
    }
}

#[tokio::test]
async fn test_drop_kills_running_server() {
    let (admin_addr, _requests) = common::start_mock_admin().await;
    let app = common::stub_app(&format!("admin_url = \"http://{}\"\n", admin_addr));

    let server = DevServer::launch(common::stub_config(app.path(), 5))
        .await
        .expect("server should start");
    let pid = server.pid().unwrap();
    assert!(common::is_running(pid));

    drop(server);
    assert!(common::wait_until_gone(pid, Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_unexecutable_binary_fails_spawn() {
    use std::os::unix::fs::PermissionsExt;

    let app = common::stub_app("");
    let binary = app.path().join("dev_appserver.py");
    std::fs::write(&binary, b"\x00\x01\x02garbage").unwrap();
    std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).unwrap();

    let mut config = common::stub_config(app.path(), 2);
    config.executable = binary.display().to_string();
    let mut server = DevServer::new(config);

    let err = server.start().await.unwrap_err();
    assert!(matches!(err, HarnessError::SpawnFailed { .. }), "got {err}");
    assert_eq!(server.state(), LifecycleState::Failed);
    assert!(server.pid().is_none());
}

#[tokio::test]
async fn test_debug_mode_launch_and_close() {
    let (admin_addr, requests) = common::start_mock_admin().await;
    let app = common::stub_app(&format!(
        "admin_url = \"http://{}\"\nlinger_ms = 500\n",
        admin_addr
    ));

    let mut config = common::stub_config(app.path(), 5);
    config.debug = true;
    config.port = 8080;
    let mut server = DevServer::launch(config).await.expect("server should start");

    assert_eq!(server.module_url(), Some("http://127.0.0.1:8080"));
    assert_eq!(server.api_url(), Some("http://127.0.0.1:36415"));
    let admin_url = format!("http://{}", admin_addr);
    assert_eq!(server.admin_url(), Some(admin_url.as_str()));

    server.close().await.expect("close should succeed");
    assert_eq!(server.state(), LifecycleState::Closed);
    assert_eq!(requests.lock().unwrap().len(), 1);
}
