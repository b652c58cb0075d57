//! Process group creation and termination.
//!
//! On Unix the child calls `setpgid(0, 0)` before exec and the whole group is
//! killed by signalling the negated group id. Windows has no process groups
//! in that sense, so the seam starts the child with
//! `CREATE_NEW_PROCESS_GROUP` and kills the tree with `taskkill /T`.

use std::io;

use tokio::process::Command;

/// The process group led by a spawned child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessGroup {
    leader: u32,
}

impl ProcessGroup {
    pub fn new(leader: u32) -> Self {
        Self { leader }
    }

    /// Pid of the group leader, which is also the group id.
    pub fn leader(&self) -> u32 {
        self.leader
    }

    /// Forcefully terminate every process in the group.
    #[cfg(unix)]
    pub fn kill(&self) -> io::Result<()> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let pgid = i32::try_from(self.leader).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("pid {} out of range", self.leader),
            )
        })?;
        kill(Pid::from_raw(-pgid), Signal::SIGKILL).map_err(io::Error::from)
    }

    /// Forcefully terminate the leader and all of its descendants.
    #[cfg(windows)]
    pub fn kill(&self) -> io::Result<()> {
        let status = std::process::Command::new("taskkill")
            .args(["/T", "/F", "/PID", &self.leader.to_string()])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("taskkill exited with {}", status)))
        }
    }

    #[cfg(not(any(unix, windows)))]
    pub fn kill(&self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "process group kill is not supported on this platform",
        ))
    }
}

/// Make the command start as the leader of a new process group.
pub fn configure(command: &mut Command) {
    #[cfg(unix)]
    {
        command.process_group(0);
    }

    #[cfg(windows)]
    {
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        command.creation_flags(CREATE_NEW_PROCESS_GROUP);
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = command;
    }
}
