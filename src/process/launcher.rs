//! Dev server launcher.
//!
//! # Responsibilities
//! - Resolve the configured executable on disk or on `PATH`
//! - Build the fixed flag set that makes the server deterministic
//! - Spawn it as a new process group with stderr captured
//!
//! # Design Decisions
//! - stdout is discarded unless debug is set, then it is inherited
//! - stderr is always piped for scanning and teed to ours in debug mode

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncRead;
use tokio::process::{Child, Command};

use crate::config::LaunchConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::process::group::{self, ProcessGroup};
use crate::process::tee::TeeReader;

/// The child's diagnostic output, possibly mirrored.
pub type DiagnosticStream = Box<dyn AsyncRead + Send + Unpin>;

/// A freshly spawned dev server.
pub struct LaunchedChild {
    pub child: Child,
    pub group: ProcessGroup,
    pub stderr: DiagnosticStream,
}

/// Locate `name` the way a shell would.
///
/// Names containing a path separator are checked directly; bare names are
/// searched on `PATH`.
pub fn resolve_executable(name: &str) -> HarnessResult<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 || name.contains(std::path::MAIN_SEPARATOR) {
        return if is_executable(candidate) {
            Ok(candidate.to_path_buf())
        } else {
            Err(HarnessError::ExecutableNotFound(name.to_string()))
        };
    }

    env::var_os("PATH")
        .and_then(|paths| {
            env::split_paths(&paths)
                .map(|dir| dir.join(name))
                .find(|path| is_executable(path))
        })
        .ok_or_else(|| HarnessError::ExecutableNotFound(name.to_string()))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Flags passed to the dev server, ending with the application bundle.
pub fn server_args(config: &LaunchConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "--automatic_restart=false".to_string(),
        "--skip_sdk_update_check=true".to_string(),
        "--clear_datastore=true".to_string(),
        "--clear_search_indexes=true".to_string(),
        "--datastore_consistency_policy=consistent".to_string(),
        format!("--host={}", config.host),
        format!("--admin_host={}", config.host),
        format!("--port={}", config.port),
        format!("--admin_port={}", config.admin_port),
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(config.app_dir.clone().into_os_string());
    args
}

/// Spawn the dev server described by `config`.
pub fn spawn(config: &LaunchConfig) -> HarnessResult<LaunchedChild> {
    let program = resolve_executable(&config.executable)?;
    let args = server_args(config);

    if config.debug {
        tracing::info!(program = %program.display(), args = ?args, "Running dev server");
    }

    let mut command = Command::new(&program);
    command
        .args(&args)
        .stdin(Stdio::null())
        .stdout(if config.debug {
            Stdio::inherit()
        } else {
            Stdio::null()
        })
        .stderr(Stdio::piped());
    group::configure(&mut command);

    let spawn_failed = |source: std::io::Error| HarnessError::SpawnFailed {
        program: program.display().to_string(),
        source,
    };

    let mut child = command.spawn().map_err(spawn_failed)?;

    let (Some(pid), Some(stderr)) = (child.id(), child.stderr.take()) else {
        let _ = child.start_kill();
        return Err(spawn_failed(std::io::Error::other(
            "child stderr or pid unavailable after spawn",
        )));
    };

    let stderr: DiagnosticStream = if config.debug {
        Box::new(TeeReader::new(stderr, std::io::stderr()))
    } else {
        Box::new(stderr)
    };

    tracing::debug!(pid, program = %program.display(), "Dev server spawned");

    Ok(LaunchedChild {
        child,
        group: ProcessGroup::new(pid),
        stderr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_args() {
        let mut config = LaunchConfig::for_app("/srv/app");
        config.host = "127.0.0.1".into();
        config.port = 8080;
        config.admin_port = 8000;

        let args: Vec<String> = server_args(&config)
            .into_iter()
            .map(|arg| arg.into_string().unwrap())
            .collect();
        assert_eq!(
            args,
            vec![
                "--automatic_restart=false",
                "--skip_sdk_update_check=true",
                "--clear_datastore=true",
                "--clear_search_indexes=true",
                "--datastore_consistency_policy=consistent",
                "--host=127.0.0.1",
                "--admin_host=127.0.0.1",
                "--port=8080",
                "--admin_port=8000",
                "/srv/app",
            ]
        );
    }

    #[test]
    fn test_resolve_missing_bare_name() {
        let err = resolve_executable("definitely-not-a-dev-appserver-binary").unwrap_err();
        assert!(matches!(err, HarnessError::ExecutableNotFound(name) if name == "definitely-not-a-dev-appserver-binary"));
    }

    #[test]
    fn test_resolve_missing_path() {
        let err = resolve_executable("/nonexistent/dir/dev_appserver.py").unwrap_err();
        assert!(matches!(err, HarnessError::ExecutableNotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_on_path() {
        let resolved = resolve_executable("sh").unwrap();
        assert!(resolved.is_absolute() || resolved.components().count() > 1);
        assert!(resolved.ends_with("sh"));
    }

    #[tokio::test]
    async fn test_spawn_missing_executable() {
        let mut config = LaunchConfig::for_app("/srv/app");
        config.executable = "/nonexistent/dir/dev_appserver.py".into();
        let err = spawn(&config).err().unwrap();
        assert!(matches!(err, HarnessError::ExecutableNotFound(_)));
    }
}
