//! rsync strategy: mirror the source into a backup directory.
//!
//! ```text
//! rsync -a -A -X (-v -P | -q) [-n] [--exclude-from=F] (-u | --delete-after) [extra…] SOURCE TARGET
//! ```
//!
//! Full backups delete files that vanished from the source; `--incremental`
//! only transfers newer files and never deletes.

use clap::Args;

use super::{BackupJob, BackupType, CommonConfig, shell::ShellJob};
use crate::{
    error::Result,
    runner::Runner,
    target::{Fstab, TargetKind},
};

/// Flags only meaningful for `--backup-type rsync`.
#[derive(Args, Debug)]
#[command(next_help_heading = "Rsync backups")]
pub struct RsyncArgs {
    /// Only transfer updated files (rsync `-u`) instead of mirroring.
    #[arg(short, long)]
    pub incremental: bool,

    /// Extra argument passed to rsync verbatim (repeatable).
    #[arg(
        id = "rsync_extra_args",
        long = "rsync-extra-arg",
        value_name = "ARG",
        allow_hyphen_values = true
    )]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RsyncConfig {
    pub common: CommonConfig,
    pub incremental: bool,
    pub extra_args: Vec<String>,
}

#[derive(Debug)]
pub struct RsyncJob {
    shell: ShellJob,
    incremental: bool,
    extra_args: Vec<String>,
}

impl RsyncJob {
    pub fn new(config: RsyncConfig, fstab: &Fstab) -> Result<Self> {
        let shell = ShellJob::new(config.common, TargetKind::Directory, BackupType::Rsync, fstab)?;
        Ok(Self {
            shell,
            incremental: config.incremental,
            extra_args: config.extra_args,
        })
    }
}

impl BackupJob for RsyncJob {
    fn backup_type(&self) -> BackupType {
        BackupType::Rsync
    }

    fn backup_command(&self) -> Vec<String> {
        let s = &self.shell;
        let mut cmd: Vec<String> = vec!["rsync".into(), "-a".into(), "-A".into(), "-X".into()];

        if s.verbose {
            cmd.extend(["-v".into(), "-P".into()]);
        } else {
            cmd.push("-q".into());
        }

        if s.dry_run {
            cmd.push("-n".into());
        }

        if let Some(ref file) = s.exclude_file {
            cmd.push(format!("--exclude-from={file}"));
        }

        if self.incremental {
            cmd.push("-u".into());
        } else {
            cmd.push("--delete-after".into());
        }

        cmd.extend(self.extra_args.iter().cloned());
        cmd.push(s.source.clone());
        cmd.push(s.backup_target.clone());
        cmd
    }

    fn backup(&self, runner: &Runner) -> Result<()> {
        self.shell.run(&self.backup_command(), false, runner)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
