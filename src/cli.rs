//! Command-line interface definition.
//!
//! The core owns only its control flags (`--simulate`, `--print-config`,
//! `--conf-dir`); every job-related flag comes from [`crate::jobs::JobArgs`],
//! flattened in here.  Parse errors (unknown flags, bad values) are reported
//! by clap itself and end the process with its usage exit code.

use std::path::PathBuf;

use clap::Parser;

use crate::jobs::JobArgs;

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name    = "backuply",
    about   = "Simple rsync/tar backup client meant for running from cron",
    version,
    // Show a compact two-column help layout.
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// Print the backup command instead of running it.
    ///
    /// The job is still built and validated, so a simulate run fails the same
    /// way a real run would on a bad target.
    #[arg(long)]
    pub simulate: bool,

    /// Print the resolved job and settings, then exit.
    #[arg(long)]
    pub print_config: bool,

    /// Directory holding `backuply.toml`.
    ///
    /// Defaults to `/etc/backuply` overlaid by the per-user config directory.
    #[arg(long, value_name = "DIR")]
    pub conf_dir: Option<PathBuf>,

    #[command(flatten)]
    pub job: JobArgs,
}

// ─── Tests ────────────────────────────────────────────────────────────────────
