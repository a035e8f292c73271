//! Terminal output — the progress spinner and the final diagnostic line.
//!
//! Everything user-facing on failure goes through [`report`], so a failed
//! invocation always shows exactly one line (none when interrupted) and never
//! a backtrace.  Colour is only used when stderr is a terminal.

use std::{io::Write, time::Duration};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Error;

/// Braille spinner frames — same style as indicatif's default.
static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Start an indeterminate spinner on stderr labelled with the running tool.
///
/// indicatif hides it automatically when stderr is not a terminal (cron).
pub fn make_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan}  {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(SPINNER_CHARS),
    );
    pb.set_message(format!("{}", style(format!("running {label}")).dim().for_stderr()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Print the diagnostic for `err` to stderr.
pub fn report(err: &Error) {
    let _ = write_report(&mut std::io::stderr().lock(), err);
}

fn write_report(out: &mut dyn Write, err: &Error) -> std::io::Result<()> {
    match err.diagnostic() {
        Some(line) => writeln!(out, "{}", style(line).red().for_stderr()),
        None => Ok(()),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(err: &Error) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, err).unwrap();
        console::strip_ansi_codes(&String::from_utf8(buf).unwrap()).into_owned()
    }

    #[test]
    fn permission_denied_prints_fixed_message() {
        assert_eq!(
            rendered(&Error::PermissionDenied),
            "This script must be run with root privileges.\n"
        );
    }

    #[test]
    fn interruption_prints_nothing() {
        assert_eq!(rendered(&Error::Interrupted), "");
    }

    #[test]
    fn report_is_a_single_line() {
        let err = Error::ProcessFailed {
            command: "rsync -a -q / /mnt/backup/".into(),
            code: 23,
        };
        let text = rendered(&err);
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("exit status 23"));
    }

    #[test]
    fn spinner_can_be_cleared() {
        let pb = make_spinner("tar");
        pb.finish_and_clear();
        assert!(pb.is_finished());
    }
}
