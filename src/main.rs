//! `backuply` — run one rsync or tar backup, meant for root's crontab.
//!
//! # Overview
//!
//! One invocation builds exactly one backup job from its flags (plus the
//! optional `backuply.toml`) and then either prints the command it would run
//! (`--simulate`) or runs it.  Every failure ends in one diagnostic line and
//! a meaningful exit code, so cron mail stays readable.
//!
//! # Usage
//!
//! ```text
//! backuply /mnt/backup                                 # rsync / → /mnt/backup/
//! backuply -i /mnt/backup                              # incremental rsync
//! backuply -t tar -f /mnt/backup/root.tar.gz           # tar, replacing the old archive
//! backuply -t tar --simulate /mnt/backup/root.tar.gz   # print the tar command only
//! ```
//!
//! # Exit codes
//!
//! | Code     | Meaning                                         |
//! |----------|-------------------------------------------------|
//! | 0        | success                                         |
//! | 13       | not running as root                             |
//! | 1        | invalid target / settings, or interrupted       |
//! | errno    | an OS error (e.g. 2 for a missing source)       |
//! | N        | the backup tool itself exited with N            |
//! | 2        | command-line usage error (from clap)            |
//!
//! # Module layout
//!
//! | Module        | Responsibility                                   |
//! |---------------|--------------------------------------------------|
//! | [`privilege`] | Root check, before anything else                 |
//! | [`cli`]       | Core flags; job flags are flattened in           |
//! | [`config`]    | `backuply.toml` settings                         |
//! | [`resolve`]   | CLI + settings → typed `Invocation`              |
//! | [`dispatch`]  | Variant defaults, then job construction          |
//! | [`jobs`]      | rsync and tar strategies                         |
//! | [`target`]    | fstab / mount point validation                   |
//! | [`execute`]   | Simulate or run                                  |
//! | [`runner`]    | Subprocess execution and SIGINT handling         |
//! | [`error`]     | Error kinds and exit codes                       |
//! | [`ui`]        | Spinner and diagnostic output                    |

mod cli;
mod config;
mod dispatch;
mod error;
mod execute;
mod jobs;
mod privilege;
mod resolve;
mod runner;
mod target;
mod ui;

use std::{io::Write, process};

use clap::Parser;
use cli::Cli;
use error::{Error, Result};
use jobs::CommonConfig;
use runner::{Interrupt, Runner};
use tracing_subscriber::EnvFilter;

fn main() {
    let interrupt = Interrupt::default();
    let result = run(&interrupt);

    if let Err(ref err) = result {
        ui::report(err);
    }
    process::exit(error::exit_code(&result));
}

fn run(interrupt: &Interrupt) -> Result<()> {
    privilege::require_root()?;

    let cli = Cli::parse();
    let settings = config::load_settings(cli.conf_dir.as_deref())?;
    let invocation = resolve::resolve(cli, &settings);

    if let Err(e) = init_logging(log_level(invocation.job.common())) {
        eprintln!("backuply: logging disabled: {e}");
    }
    tracing::debug!(?settings, "loaded settings");
    tracing::debug!(?invocation, "resolved invocation");

    if let Err(e) = interrupt.install() {
        tracing::warn!("could not install the SIGINT handler: {e}");
    }

    let mut stdout = std::io::stdout().lock();

    if invocation.print_config {
        let job = dispatch::apply_defaults(invocation.job);
        let settings = toml::to_string(&settings).map_err(|e| Error::Config(e.to_string()))?;
        writeln!(stdout, "{job:#?}\n\n{settings}")?;
        return Ok(());
    }

    let common = invocation.job.common();
    let runner = Runner::new(interrupt.clone(), !common.verbose && !common.quiet);

    let job = dispatch::build_job(invocation.job, &settings)?;
    execute::execute(job.as_ref(), invocation.simulate, &runner, &mut stdout)
}

/// Log level for the resolved job flags.
fn log_level(common: &CommonConfig) -> &'static str {
    if common.debug {
        "debug"
    } else if common.verbose {
        "info"
    } else if common.quiet {
        "error"
    } else {
        "warn"
    }
}

/// Log to stderr at `level`; `RUST_LOG` wins.
fn init_logging(level: &str) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("backuply={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
