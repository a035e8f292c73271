//! Job factory dispatch.
//!
//! Applies the one variant-specific default the core owns, then hands the
//! configuration to [`jobs::create_backup_job`].  Construction errors are
//! returned untouched.

use crate::{
    config::Settings,
    error::Result,
    jobs::{self, BackupJob, JobConfig},
};

/// Extra excludes for tar when none were given: every user's home directory.
pub const DEFAULT_TAR_EXCLUDES: &[&str] = &["/home/*"];

/// Fill in variant defaults.  Only tar has one today.
pub fn apply_defaults(config: JobConfig) -> JobConfig {
    match config {
        JobConfig::Tar(mut c) => {
            if c.extra_excludes.is_none() {
                c.extra_excludes = Some(DEFAULT_TAR_EXCLUDES.iter().map(|s| s.to_string()).collect());
            }
            JobConfig::Tar(c)
        },
        other => other,
    }
}

pub fn build_job(config: JobConfig, settings: &Settings) -> Result<Box<dyn BackupJob>> {
    jobs::create_backup_job(apply_defaults(config), settings)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{
        error::Error,
        jobs::{
            BackupType, CommonConfig,
            rsync::RsyncConfig,
            tar::{Compression, TarConfig},
        },
    };

    fn common(source: &str, target: &str) -> CommonConfig {
        CommonConfig {
            source: source.into(),
            backup_target: target.into(),
            exclude_file: None,
            dry_run: false,
            verbose: false,
            debug: false,
            quiet: false,
        }
    }

    fn tar_config(target: &str, extra_excludes: Option<Vec<String>>) -> JobConfig {
        JobConfig::Tar(TarConfig {
            common: common("/", target),
            overwrite: false,
            compress: true,
            compression: Compression::Gzip,
            extra_excludes,
            extra_args: vec![],
        })
    }

    fn excludes(config: &JobConfig) -> Option<&Vec<String>> {
        match config {
            JobConfig::Tar(c) => c.extra_excludes.as_ref(),
            JobConfig::Rsync(_) => None,
        }
    }

    /// Settings whose fstab lists nothing, so validation only looks at the
    /// temp dirs used here.
    fn isolated_settings(dir: &Path) -> Settings {
        Settings {
            fstab: dir.join("fstab"),
            ..Settings::default()
        }
    }

    // ── apply_defaults ────────────────────────────────────────────────────────

    #[test]
    fn tar_without_excludes_gets_home_glob() {
        let config = apply_defaults(tar_config("/mnt/b.tar", None));
        assert_eq!(excludes(&config).unwrap(), &vec!["/home/*".to_string()]);
    }

    #[test]
    fn tar_with_empty_excludes_is_untouched() {
        let config = apply_defaults(tar_config("/mnt/b.tar", Some(vec![])));
        assert!(excludes(&config).unwrap().is_empty());
    }

    #[test]
    fn tar_with_explicit_excludes_is_untouched() {
        let given = vec!["/var/cache/*".to_string(), "/srv/*".to_string()];
        let config = apply_defaults(tar_config("/mnt/b.tar", Some(given.clone())));
        assert_eq!(excludes(&config).unwrap(), &given);
    }

    #[test]
    fn rsync_config_is_untouched() {
        let config = JobConfig::Rsync(RsyncConfig {
            common: common("/", "/mnt/b"),
            incremental: true,
            extra_args: vec!["--numeric-ids".into()],
        });
        assert_eq!(apply_defaults(config.clone()), config);
    }

    #[test]
    fn applying_defaults_twice_changes_nothing() {
        let once = apply_defaults(tar_config("/mnt/b.tar", None));
        assert_eq!(apply_defaults(once.clone()), once);
    }

    // ── build_job ─────────────────────────────────────────────────────────────

    #[test]
    fn built_tar_job_excludes_home_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("root.tar.gz");
        let job = build_job(
            tar_config(target.to_str().unwrap(), None),
            &isolated_settings(dir.path()),
        )
        .unwrap();

        assert_eq!(job.backup_type(), BackupType::Tar);
        let cmd = job.backup_command();
        assert!(cmd.contains(&"--exclude=/home/*".to_string()));
    }

    #[test]
    fn built_tar_job_with_empty_excludes_only_excludes_itself() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("root.tar.gz");
        let job = build_job(
            tar_config(target.to_str().unwrap(), Some(vec![])),
            &isolated_settings(dir.path()),
        )
        .unwrap();

        let excludes: Vec<_> = job
            .backup_command()
            .into_iter()
            .filter(|a| a.starts_with("--exclude="))
            .collect();
        assert_eq!(excludes, vec![format!("--exclude={}", target.display())]);
    }

    #[test]
    fn validation_errors_propagate_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_job(
            tar_config(dir.path().to_str().unwrap(), None),
            &isolated_settings(dir.path()),
        )
        .err()
        .unwrap();

        assert!(matches!(err, Error::InvalidTarget { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
