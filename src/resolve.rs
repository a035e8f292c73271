//! Turns parsed arguments plus settings into a typed [`Invocation`].
//!
//! Two rules live here:
//!
//! - `--debug` implies `--verbose`.
//! - `--simulate` is a control flag for this program only; it is lifted out
//!   into [`Invocation::simulate`] and never becomes part of the
//!   [`JobConfig`] handed to job construction.
//!
//! CLI values override the settings file; the settings file only fills gaps.

use crate::{
    cli::Cli,
    config::Settings,
    jobs::{
        BackupType, CommonConfig, JobArgs, JobConfig,
        rsync::RsyncConfig,
        tar::TarConfig,
    },
};

/// Everything one run needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub simulate: bool,
    pub print_config: bool,
    pub job: JobConfig,
}

pub fn resolve(cli: Cli, settings: &Settings) -> Invocation {
    let Cli {
        simulate,
        print_config,
        conf_dir: _,
        job,
    } = cli;

    Invocation {
        simulate,
        print_config,
        job: job_config(job, settings),
    }
}

fn job_config(args: JobArgs, settings: &Settings) -> JobConfig {
    let common = CommonConfig {
        source: args.source,
        backup_target: args.backup_target,
        exclude_file: args.exclude_file,
        dry_run: args.dry_run,
        verbose: args.verbose || args.debug,
        debug: args.debug,
        quiet: args.quiet,
    };

    match args.backup_type {
        BackupType::Rsync => JobConfig::Rsync(RsyncConfig {
            common,
            incremental: args.rsync.incremental,
            extra_args: merged(&settings.rsync.extra_args, args.rsync.extra_args),
        }),
        BackupType::Tar => JobConfig::Tar(TarConfig {
            common,
            overwrite: args.tar.overwrite,
            compress: settings.tar.compress && !args.tar.no_compress,
            compression: args.tar.compression.unwrap_or(settings.tar.compression),
            extra_excludes: args.tar.extra_excludes(),
            extra_args: merged(&settings.tar.extra_args, args.tar.extra_args),
        }),
    }
}

/// Settings-file arguments first, then the ones given on the command line.
fn merged(configured: &[String], given: Vec<String>) -> Vec<String> {
    configured.iter().cloned().chain(given).collect()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
