//! Stand-in for `dev_appserver.py`.
//!
//! Accepts the harness flag set and refuses to run unless it pins the
//! deterministic settings. Then it behaves as described by `stub.toml` in
//! the application directory: which readiness lines to print, which admin URL
//! to announce, whether to leave a grandchild in its process group, and how
//! long to run before exiting on its own.
//!
//! ```toml
//! announce = ["api", "module", "admin"]
//! admin_url = "http://127.0.0.1:8000"
//! linger_ms = 500
//! grandchild = false
//! exit_code = 0
//! ```

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use clap::{ArgAction, Parser};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "stub-appserver")]
struct Args {
    #[arg(long = "automatic_restart", action = ArgAction::Set)]
    automatic_restart: bool,

    #[arg(long = "skip_sdk_update_check", action = ArgAction::Set)]
    skip_sdk_update_check: bool,

    #[arg(long = "clear_datastore", action = ArgAction::Set)]
    clear_datastore: bool,

    #[arg(long = "clear_search_indexes", action = ArgAction::Set)]
    clear_search_indexes: bool,

    #[arg(long = "datastore_consistency_policy")]
    datastore_consistency_policy: String,

    #[arg(long = "host")]
    host: String,

    #[arg(long = "admin_host")]
    admin_host: String,

    #[arg(long = "port")]
    port: u16,

    #[arg(long = "admin_port")]
    admin_port: u16,

    app_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct StubBehavior {
    announce: Vec<String>,
    module_name: String,
    api_url: Option<String>,
    module_url: Option<String>,
    admin_url: Option<String>,
    linger_ms: Option<u64>,
    grandchild: bool,
    exit_code: i32,
}

impl Default for StubBehavior {
    fn default() -> Self {
        Self {
            announce: vec!["api".into(), "module".into(), "admin".into()],
            module_name: "default".into(),
            api_url: None,
            module_url: None,
            admin_url: None,
            linger_ms: None,
            grandchild: false,
            exit_code: 0,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.automatic_restart
        || !args.skip_sdk_update_check
        || !args.clear_datastore
        || !args.clear_search_indexes
        || args.datastore_consistency_policy != "consistent"
    {
        return Err(format!("refusing non-deterministic flags: {:?}", args).into());
    }

    let behavior: StubBehavior = match fs::read_to_string(args.app_dir.join("stub.toml")) {
        Ok(content) => toml::from_str(&content)?,
        Err(_) => StubBehavior::default(),
    };

    if behavior.grandchild {
        let grandchild = Command::new("sleep")
            .arg("300")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        fs::write(args.app_dir.join("grandchild.pid"), grandchild.id().to_string())?;
    }

    let api_url = behavior
        .api_url
        .clone()
        .unwrap_or_else(|| format!("http://{}:36415", args.host));
    let module_url = behavior
        .module_url
        .clone()
        .unwrap_or_else(|| format!("http://{}:{}", args.host, args.port));
    let admin_url = behavior
        .admin_url
        .clone()
        .unwrap_or_else(|| format!("http://{}:{}", args.admin_host, args.admin_port));

    let mut stderr = std::io::stderr().lock();
    writeln!(
        stderr,
        "INFO     devappserver2.py:769] Skipping SDK update check (consistency={}).",
        args.datastore_consistency_policy
    )?;
    for marker in &behavior.announce {
        match marker.as_str() {
            "api" => writeln!(
                stderr,
                "INFO     api_server.py:205] Starting API server at: {}",
                api_url
            )?,
            "module" => writeln!(
                stderr,
                "INFO     dispatcher.py:197] Starting module \"{}\" running at: {}",
                behavior.module_name, module_url
            )?,
            "admin" => writeln!(
                stderr,
                "INFO     admin_server.py:116] Starting admin server at: {}",
                admin_url
            )?,
            other => writeln!(stderr, "INFO     stub] {}", other)?,
        }
    }
    stderr.flush()?;
    drop(stderr);

    match behavior.linger_ms {
        Some(ms) => {
            thread::sleep(Duration::from_millis(ms));
            std::process::exit(behavior.exit_code);
        }
        None => loop {
            thread::sleep(Duration::from_secs(3600));
        },
    }
}
