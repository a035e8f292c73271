//! Subprocess execution.
//!
//! This is the only place that spawns the backup tool.  The child inherits
//! stdin/stdout/stderr so `--verbose` output streams straight to the
//! terminal; when not verbose, a spinner runs on stderr while we wait.
//!
//! # Interruption
//!
//! [`Interrupt::install`] replaces the default SIGINT behaviour with a flag.
//! The foreground child still receives the signal and exits; once `wait`
//! returns, the flag turns the result into [`Error::Interrupted`] regardless
//! of how the child exited.

use std::{
    os::unix::process::ExitStatusExt,
    process::{Command, ExitStatus},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use nix::errno::Errno;

use crate::{
    error::{Error, Result},
    ui,
};

// ─── Interrupt flag ───────────────────────────────────────────────────────────

/// Shared "SIGINT was received" flag.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// Route SIGINT into this flag for the rest of the process.
    pub fn install(&self) -> std::result::Result<(), ctrlc::Error> {
        let this = self.clone();
        ctrlc::set_handler(move || this.trigger())
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ─── Runner ───────────────────────────────────────────────────────────────────

/// Blocking command runner used by every job.
#[derive(Debug, Clone)]
pub struct Runner {
    interrupt: Interrupt,
    progress: bool,
}

impl Runner {
    /// `progress` shows a spinner while the child runs.
    pub const fn new(interrupt: Interrupt, progress: bool) -> Self {
        Self { interrupt, progress }
    }

    pub fn interrupted(&self) -> bool {
        self.interrupt.is_set()
    }

    /// Run `args`, failing unless the command exits zero.
    pub fn run(&self, args: &[String]) -> Result<()> {
        let (prog, rest) = args
            .split_first()
            .ok_or_else(|| Error::io(Errno::EINVAL, "cannot run an empty command"))?;
        let command = args.join(" ");

        if self.interrupted() {
            return Err(Error::Interrupted);
        }

        tracing::debug!(%command, "spawning");
        let spinner = self.progress.then(|| ui::make_spinner(prog));
        let status = Command::new(prog).args(rest).status();
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        if self.interrupted() {
            return Err(Error::Interrupted);
        }

        let status = status?;
        let code = exit_code(status);
        tracing::info!("{prog} command exited with code {code}");

        if status.success() {
            Ok(())
        } else {
            Err(Error::ProcessFailed { command, code })
        }
    }
}

/// The child's exit code, or `128 + signal` when it was killed, as a shell
/// would report it.
fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
