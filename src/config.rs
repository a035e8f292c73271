//! Settings file types and loading logic.
//!
//! Settings are entirely optional: every field has a default, so a machine
//! with no `backuply.toml` behaves exactly like one with an empty file.
//! Command-line flags always win over anything set here (see
//! [`crate::resolve`]).
//!
//! # Locations
//!
//! 1. `--conf-dir <DIR>` given: only `<DIR>/backuply.toml` is read.
//! 2. Otherwise `/etc/backuply/backuply.toml` (system defaults), overlaid by
//!    `$XDG_CONFIG_HOME/backuply/backuply.toml` (per-user overrides).
//!
//! # File format
//!
//! ```toml
//! fstab = "/etc/fstab"     # where mount points are looked up
//!
//! [tar]
//! compress    = true       # false → `--verify` instead of a compressor
//! compression = "gzip"     # gzip | bzip2 | xz | zstd
//! extra_args  = []         # appended before --file=
//!
//! [rsync]
//! extra_args  = ["--numeric-ids"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::{error, jobs::tar::Compression};

/// Directory holding the system-wide settings file.
pub const DEFAULT_CONF_DIR: &str = "/etc/backuply";

/// Settings file name inside a configuration directory.
pub const CONF_FILE: &str = "backuply.toml";

// ─── Resolved settings ────────────────────────────────────────────────────────

/// Fully-defaulted settings handed to the rest of the program.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// fstab consulted when validating backup targets.
    pub fstab: PathBuf,
    pub tar: TarSettings,
    pub rsync: RsyncSettings,
}

impl Default for Settings {
    fn default() -> Self {
        PartialSettings::default().resolve()
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TarSettings {
    pub compress: bool,
    pub compression: Compression,
    pub extra_args: Vec<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct RsyncSettings {
    pub extra_args: Vec<String>,
}

// ─── On-disk layer ────────────────────────────────────────────────────────────

/// One settings file as written on disk; absent keys stay `None` so layers
/// can be merged field by field.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialSettings {
    pub fstab: Option<PathBuf>,
    #[serde(default)]
    pub tar: PartialTar,
    #[serde(default)]
    pub rsync: PartialRsync,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialTar {
    pub compress: Option<bool>,
    pub compression: Option<Compression>,
    pub extra_args: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRsync {
    pub extra_args: Option<Vec<String>>,
}

impl PartialSettings {
    /// Overlay `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            fstab: other.fstab.or(self.fstab),
            tar: PartialTar {
                compress: other.tar.compress.or(self.tar.compress),
                compression: other.tar.compression.or(self.tar.compression),
                extra_args: other.tar.extra_args.or(self.tar.extra_args),
            },
            rsync: PartialRsync {
                extra_args: other.rsync.extra_args.or(self.rsync.extra_args),
            },
        }
    }

    /// Fill every unset field with its default.
    pub fn resolve(self) -> Settings {
        Settings {
            fstab: self.fstab.unwrap_or_else(|| PathBuf::from("/etc/fstab")),
            tar: TarSettings {
                compress: self.tar.compress.unwrap_or(true),
                compression: self.tar.compression.unwrap_or_default(),
                extra_args: self.tar.extra_args.unwrap_or_default(),
            },
            rsync: RsyncSettings {
                extra_args: self.rsync.extra_args.unwrap_or_default(),
            },
        }
    }
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Parse one settings file.  `Ok(None)` when the file does not exist.
pub fn parse_partial(path: &Path) -> Result<Option<PartialSettings>> {
    if !path.exists() {
        return Ok(None);
    }

    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let partial = toml::from_str(&text)
        .map_err(|e| anyhow!(describe_toml_error(&e, &text)))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(partial))
}

/// toml's `Display` renders a multi-line source snippet; diagnostics must fit
/// on one line, so keep only the message and where it points.
fn describe_toml_error(err: &toml::de::Error, text: &str) -> String {
    let message = err
        .message()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let Some(before) = err.span().and_then(|span| text.get(..span.start)) else {
        return message;
    };
    let line = before.matches('\n').count() + 1;
    let column = before.chars().rev().take_while(|&c| c != '\n').count() + 1;
    format!("{message} at line {line}, column {column}")
}

/// Load the effective settings for this invocation.
pub fn load_settings(conf_dir: Option<&Path>) -> error::Result<Settings> {
    let layers: Vec<PathBuf> = match conf_dir {
        Some(dir) => vec![dir.join(CONF_FILE)],
        None => std::iter::once(Path::new(DEFAULT_CONF_DIR).join(CONF_FILE))
            .chain(dirs_next::config_dir().map(|d| d.join("backuply").join(CONF_FILE)))
            .collect(),
    };

    let mut merged = PartialSettings::default();
    for path in &layers {
        match parse_partial(path) {
            Ok(Some(layer)) => merged = merged.merge(layer),
            Ok(None) => {},
            Err(e) => return Err(error::Error::Config(format!("{e:#}"))),
        }
    }

    Ok(merged.resolve())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
