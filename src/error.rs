//! Error taxonomy and exit-code translation.
//!
//! Every failure that can end an invocation is one variant of [`Error`].
//! Nothing below `main` recovers from these locally: they bubble up with `?`
//! and are turned into one diagnostic line plus an exit code by
//! [`Error::exit_code`] and [`Error::diagnostic`].
//!
//! | Variant            | Exit code                         |
//! |--------------------|-----------------------------------|
//! | `PermissionDenied` | `EACCES`                          |
//! | `InvalidTarget`    | 1                                 |
//! | `Config`           | 1                                 |
//! | `Io`               | the underlying errno              |
//! | `ProcessFailed`    | the subprocess's own return code  |
//! | `Interrupted`      | 1 (no message)                    |

use std::io;

use nix::errno::Errno;
use thiserror::Error;

use crate::jobs::BackupType;

/// Printed when the guard in [`crate::privilege`] rejects the caller.
pub const PERMISSION_DENIED_MESSAGE: &str = "This script must be run with root privileges.";

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The effective uid is not root.
    #[error("{}", PERMISSION_DENIED_MESSAGE)]
    PermissionDenied,

    /// The backup target does not fit the job that was asked for.
    #[error(
        "Backup target {target} is not valid for the type {backup_type}. The error was \"{message}\""
    )]
    InvalidTarget {
        target: String,
        backup_type: BackupType,
        message: String,
    },

    /// The settings file exists but could not be read or parsed.
    #[error("{0}")]
    Config(String),

    /// An operating-system level failure, carrying its errno.
    #[error("{message}")]
    Io { errno: Errno, message: String },

    /// The backup subprocess ran and exited unsuccessfully.
    #[error("command `{command}` returned non-zero exit status {code}")]
    ProcessFailed { command: String, code: i32 },

    /// SIGINT arrived while the backup was running.
    #[error("interrupted")]
    Interrupted,
}

impl Error {
    /// Shorthand for an OS error with a custom message, e.g. a missing source.
    pub fn io(errno: Errno, message: impl Into<String>) -> Self {
        Self::Io {
            errno,
            message: message.into(),
        }
    }

    pub fn invalid_target(
        target: impl Into<String>,
        backup_type: BackupType,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidTarget {
            target: target.into(),
            backup_type,
            message: message.into(),
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PermissionDenied => Errno::EACCES as i32,
            Self::InvalidTarget { .. } | Self::Config(_) => 1,
            Self::Io { errno, .. } => *errno as i32,
            Self::ProcessFailed { code, .. } => *code,
            Self::Interrupted => 1,
        }
    }

    /// The single line shown to the user, if any.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            Self::Interrupted => None,
            other => Some(other.to_string()),
        }
    }
}

/// Process exit code for the result of a whole invocation.
pub fn exit_code(result: &Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.exit_code(),
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        // Errors built without an errno (and errno 0) must never map to a
        // successful exit.
        let errno = err
            .raw_os_error()
            .map(Errno::from_i32)
            .filter(|e| *e != Errno::UnknownErrno)
            .unwrap_or(Errno::EIO);
        let message = if err.raw_os_error().is_some() {
            errno.desc().to_string()
        } else {
            err.to_string()
        };
        Self::Io { errno, message }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_exits_zero() {
        assert_eq!(exit_code(&Ok(())), 0);
    }

    #[test]
    fn permission_denied_uses_eacces() {
        let err = Error::PermissionDenied;
        assert_eq!(err.exit_code(), 13);
        assert_eq!(
            err.diagnostic().as_deref(),
            Some("This script must be run with root privileges.")
        );
    }

    #[test]
    fn invalid_target_exits_one_with_description() {
        let err = Error::invalid_target("/mnt/backup", BackupType::Tar, "backup_target must be a file");
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.diagnostic().unwrap(),
            "Backup target /mnt/backup is not valid for the type tar. The error was \
             \"backup_target must be a file\""
        );
    }

    #[test]
    fn config_error_exits_one() {
        assert_eq!(Error::Config("parsing backuply.toml".into()).exit_code(), 1);
    }

    #[test]
    fn io_error_exits_with_errno() {
        let err = Error::io(Errno::ENOENT, "The backup source /nope does not exist.");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.diagnostic().unwrap(),
            "The backup source /nope does not exist."
        );
    }

    #[test]
    fn process_failure_exits_with_subprocess_code() {
        let err = Error::ProcessFailed {
            command: "tar --create".into(),
            code: 2,
        };
        assert_eq!(err.exit_code(), 2);
        assert!(err.diagnostic().unwrap().contains("tar --create"));
    }

    #[test]
    fn interruption_exits_one_silently() {
        assert_eq!(Error::Interrupted.exit_code(), 1);
        assert!(Error::Interrupted.diagnostic().is_none());
    }

    #[test]
    fn std_io_error_keeps_errno_and_short_description() {
        let err: Error = io::Error::from_raw_os_error(Errno::ENOTDIR as i32).into();
        assert_eq!(err.exit_code(), Errno::ENOTDIR as i32);
        assert_eq!(err.diagnostic().unwrap(), Errno::ENOTDIR.desc());
    }

    #[test]
    fn std_io_error_without_errno_is_never_success() {
        let err: Error = io::Error::other("pipe closed").into();
        assert_eq!(err.exit_code(), Errno::EIO as i32);
        assert_eq!(err.diagnostic().unwrap(), "pipe closed");
    }
}
