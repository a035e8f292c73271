//! Backup target validation against the fstab.
//!
//! # How it works
//!
//! 1. Reject a target of the wrong shape (a directory where tar wants a file,
//!    a file where rsync wants a directory).
//! 2. Walk the target directory (or a file target's parent) upwards.  The
//!    first ancestor listed as a mount point in the fstab must actually be
//!    mounted; otherwise the backup would silently land on the root disk.
//!    `/` itself is never checked.
//! 3. Check the directory exists and normalise directory targets to end in
//!    `/`.
//!
//! A missing fstab (containers, minimal chroots) simply lists no mount
//! points.

use std::{
    io,
    os::unix::fs::MetadataExt,
    path::{Path, PathBuf},
};

use crate::{
    error::{Error, Result},
    jobs::BackupType,
};

/// Whether a strategy writes a single file or into a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    File,
    Directory,
}

// ─── fstab ────────────────────────────────────────────────────────────────────

/// Mount points declared in an fstab file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Fstab {
    mount_points: Vec<PathBuf>,
}

impl Fstab {
    /// Read and parse `path`.  A missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no fstab, assuming no mount points");
                Ok(Self::default())
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Extract the second field (mount point) of every entry.
    pub fn parse(text: &str) -> Self {
        let mount_points = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(|l| l.split_whitespace().nth(1))
            .filter(|mp| mp.starts_with('/'))
            .map(|mp| PathBuf::from(unescape(mp)))
            .collect();
        Self { mount_points }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.mount_points.iter().any(|mp| mp == path)
    }
}

/// fstab encodes whitespace in paths as octal escapes (`\040` for space).
fn unescape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut rest = field;
    while let Some(i) = rest.find('\\') {
        out.push_str(&rest[..i]);
        let code = rest.get(i + 1..i + 4);
        match code.and_then(|c| u8::from_str_radix(c, 8).ok()) {
            Some(byte) => {
                out.push(char::from(byte));
                rest = &rest[i + 4..];
            },
            None => {
                out.push('\\');
                rest = &rest[i + 1..];
            },
        }
    }
    out.push_str(rest);
    out
}

// ─── Validation ───────────────────────────────────────────────────────────────

/// Validate `target` for a job of `backup_type` and return its normalised
/// form.
pub fn validate(
    target: &str,
    kind: TargetKind,
    backup_type: BackupType,
    fstab: &Fstab,
) -> Result<String> {
    let path = Path::new(target);
    let invalid = |message: String| Error::invalid_target(target, backup_type, message);

    let dir: PathBuf = match kind {
        TargetKind::File => {
            if path.is_dir() {
                return Err(invalid("backup_target must be a file".into()));
            }
            match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            }
        },
        TargetKind::Directory => {
            if path.is_file() {
                return Err(invalid("backup_target must be a directory".into()));
            }
            path.to_path_buf()
        },
    };

    let absolute = std::path::absolute(&dir)?;
    if let Some(mount_point) = absolute
        .ancestors()
        .filter(|a| a.parent().is_some())
        .find(|a| fstab.contains(a))
    {
        tracing::info!(path = %mount_point.display(), "found in fstab");
        if !is_mount_point(mount_point) {
            return Err(invalid(format!("{} is not mounted.", mount_point.display())));
        }
    }

    match kind {
        TargetKind::Directory if !path.is_dir() => {
            Err(invalid(format!("{target} is not a directory")))
        },
        TargetKind::File if !dir.is_dir() => Err(invalid(format!(
            "The directory {} for backup target {target} does not exist or is not a directory.",
            dir.display()
        ))),
        TargetKind::Directory if !target.ends_with('/') => Ok(format!("{target}/")),
        _ => Ok(target.to_string()),
    }
}

/// A directory is a mount point when it lives on a different device than its
/// parent, or when it is its own parent.
fn is_mount_point(path: &Path) -> bool {
    let (Ok(here), Ok(parent)) = (
        std::fs::metadata(path),
        std::fs::metadata(path.join("..")),
    ) else {
        return false;
    };
    here.is_dir() && (here.dev() != parent.dev() || here.ino() == parent.ino())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
