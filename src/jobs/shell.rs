//! Shared plumbing for jobs that shell out to an external tool.
//!
//! [`ShellJob`] validates the source, exclude file and target once at
//! construction, then [`ShellJob::run`] executes a rendered command.  When the
//! target file already exists and overwriting is allowed, the old backup is
//! moved aside and only deleted once the new one completed.

use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use nix::errno::Errno;

use super::{BackupType, CommonConfig};
use crate::{
    error::{Error, Result},
    runner::Runner,
    target::{self, Fstab, TargetKind},
};

/// Validated state common to every shell-based job.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellJob {
    pub backup_type: BackupType,
    /// Always ends in `/` so the tool copies the directory's contents.
    pub source: String,
    pub backup_target: String,
    pub exclude_file: Option<String>,
    pub verbose: bool,
    pub dry_run: bool,
}

impl ShellJob {
    pub fn new(
        common: CommonConfig,
        kind: TargetKind,
        backup_type: BackupType,
        fstab: &Fstab,
    ) -> Result<Self> {
        if !Path::new(&common.source).exists() {
            return Err(Error::io(
                Errno::ENOENT,
                format!("The backup source {} does not exist.", common.source),
            ));
        }
        let mut source = common.source;
        if !source.ends_with('/') {
            source.push('/');
        }

        let backup_target = target::validate(&common.backup_target, kind, backup_type, fstab)?;

        if let Some(ref file) = common.exclude_file
            && !Path::new(file).exists()
        {
            return Err(Error::io(
                Errno::ENOENT,
                format!("The exclude file {file} does not exist."),
            ));
        }

        Ok(Self {
            backup_type,
            source,
            backup_target,
            exclude_file: common.exclude_file,
            verbose: common.verbose,
            dry_run: common.dry_run,
        })
    }

    /// Run `command`, rotating an existing target file out of the way first
    /// when `overwrite` is set.
    pub fn run(&self, command: &[String], overwrite: bool, runner: &Runner) -> Result<()> {
        let rotated = self.rotate_existing(overwrite, Local::now())?;

        runner.run(command)?;

        if let Some(old) = rotated {
            match std::fs::remove_file(&old) {
                Ok(()) => tracing::info!(path = %old.display(), "removed previous backup"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::info!(path = %old.display(), "previous backup already gone");
                },
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Move an existing target file to a timestamped name.
    ///
    /// Returns the new path, or `None` when there was nothing to move.
    fn rotate_existing(&self, overwrite: bool, now: DateTime<Local>) -> Result<Option<PathBuf>> {
        let target = Path::new(&self.backup_target);
        if !target.is_file() {
            return Ok(None);
        }
        if !overwrite {
            return Err(Error::invalid_target(
                &self.backup_target,
                self.backup_type,
                format!(
                    "The backup target {} already exists. Please specify a new filename, the \
                     --overwrite switch, or delete it.",
                    self.backup_target
                ),
            ));
        }

        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let old = target.with_file_name(rotated_name(&file_name, now));
        std::fs::rename(target, &old)?;
        tracing::info!(from = %target.display(), to = %old.display(), "moved previous backup aside");
        Ok(Some(old))
    }
}

/// `root.tar.gz` → `root.2024.01.31.23.59.59.tar.gz`.
///
/// The timestamp goes before the first extension so the compression suffix
/// still identifies the file type.
fn rotated_name(file_name: &str, now: DateTime<Local>) -> String {
    let stamp = now.format("%Y.%m.%d.%H.%M.%S");
    match file_name.char_indices().skip(1).find(|&(_, c)| c == '.') {
        Some((i, _)) => format!("{}.{stamp}{}", &file_name[..i], &file_name[i..]),
        None => format!("{file_name}.{stamp}"),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
