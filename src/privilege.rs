//! Root privilege guard.
//!
//! Runs before argument parsing: an unprivileged caller gets the fixed
//! message and the `EACCES` exit code, and nothing else happens.

use nix::unistd::Uid;

use crate::error::{Error, Result};

/// Fail with [`Error::PermissionDenied`] unless the effective uid is root.
pub fn require_root() -> Result<()> {
    ensure_root(Uid::effective())
}

fn ensure_root(euid: Uid) -> Result<()> {
    if euid.is_root() {
        Ok(())
    } else {
        Err(Error::PermissionDenied)
    }
}
