//! Execution controller: simulate or run.

use std::io::Write;

use crate::{
    error::{Error, Result},
    jobs::BackupJob,
    runner::Runner,
};

/// Print the job's command line when `simulate` is set, otherwise run it.
///
/// The simulate line is the dry-run contract: the exact tokens a real run
/// would execute, joined by single spaces, on one line of `out`.
pub fn execute(
    job: &dyn BackupJob,
    simulate: bool,
    runner: &Runner,
    out: &mut dyn Write,
) -> Result<()> {
    if runner.interrupted() {
        return Err(Error::Interrupted);
    }

    if simulate {
        writeln!(out, "{}", job.backup_command().join(" "))?;
        return Ok(());
    }

    tracing::info!(backup_type = %job.backup_type(), "starting backup");
    job.backup(runner)?;
    tracing::info!(backup_type = %job.backup_type(), "backup finished");
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use nix::errno::Errno;

    use super::*;
    use crate::{jobs::BackupType, runner::Interrupt};

    /// What the fake job should do when executed.
    enum Behaviour {
        Succeed,
        Invalid,
        Os,
        Exit(i32),
        Interrupt,
    }

    struct FakeJob {
        behaviour: Behaviour,
        ran: Cell<bool>,
    }

    impl FakeJob {
        fn new(behaviour: Behaviour) -> Self {
            Self {
                behaviour,
                ran: Cell::new(false),
            }
        }
    }

    impl BackupJob for FakeJob {
        fn backup_type(&self) -> BackupType {
            BackupType::Tar
        }

        fn backup_command(&self) -> Vec<String> {
            vec![
                "tar".into(),
                "--create".into(),
                "--exclude=/home/*".into(),
                "--file=/mnt/b.tar".into(),
                "/".into(),
            ]
        }

        fn backup(&self, _runner: &Runner) -> Result<()> {
            self.ran.set(true);
            match self.behaviour {
                Behaviour::Succeed => Ok(()),
                Behaviour::Invalid => Err(Error::invalid_target(
                    "/mnt/b.tar",
                    BackupType::Tar,
                    "already exists",
                )),
                Behaviour::Os => Err(Error::io(Errno::ENOSPC, "No space left on device")),
                Behaviour::Exit(code) => Err(Error::ProcessFailed {
                    command: self.backup_command().join(" "),
                    code,
                }),
                Behaviour::Interrupt => Err(Error::Interrupted),
            }
        }
    }

    fn runner() -> Runner {
        Runner::new(Interrupt::default(), false)
    }

    fn run(job: &FakeJob, simulate: bool) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = execute(job, simulate, &runner(), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    // ── simulate ──────────────────────────────────────────────────────────────

    #[test]
    fn simulate_prints_one_space_joined_line() {
        let job = FakeJob::new(Behaviour::Succeed);
        let (result, out) = run(&job, true);
        assert!(result.is_ok());
        assert_eq!(out, "tar --create --exclude=/home/* --file=/mnt/b.tar /\n");
    }

    #[test]
    fn simulate_never_executes() {
        let job = FakeJob::new(Behaviour::Exit(2));
        let (result, _) = run(&job, true);
        assert!(result.is_ok());
        assert!(!job.ran.get());
    }

    #[test]
    fn simulate_output_is_reproducible() {
        let job = FakeJob::new(Behaviour::Succeed);
        assert_eq!(run(&job, true).1, run(&job, true).1);
    }

    // ── execute ───────────────────────────────────────────────────────────────

    #[test]
    fn execute_runs_job_and_prints_nothing() {
        let job = FakeJob::new(Behaviour::Succeed);
        let (result, out) = run(&job, false);
        assert!(result.is_ok());
        assert!(job.ran.get());
        assert!(out.is_empty());
    }

    #[test]
    fn pending_interrupt_skips_the_job() {
        let interrupt = Interrupt::default();
        interrupt.trigger();
        let job = FakeJob::new(Behaviour::Succeed);

        let err = execute(&job, false, &Runner::new(interrupt, false), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Interrupted));
        assert!(!job.ran.get());
    }

    #[test]
    fn pending_interrupt_suppresses_the_simulate_line() {
        let interrupt = Interrupt::default();
        interrupt.trigger();
        let job = FakeJob::new(Behaviour::Succeed);
        let mut out = Vec::new();

        let err = execute(&job, true, &Runner::new(interrupt, false), &mut out).unwrap_err();
        assert!(matches!(err, Error::Interrupted));
        assert_eq!(crate::error::exit_code(&Err(err)), 1);
        assert!(out.is_empty());
    }

    // ── failure kinds map to their exit codes ─────────────────────────────────

    #[test]
    fn failures_propagate_with_their_exit_codes() {
        let cases = [
            (Behaviour::Invalid, 1),
            (Behaviour::Os, Errno::ENOSPC as i32),
            (Behaviour::Exit(23), 23),
            (Behaviour::Interrupt, 1),
        ];
        for (behaviour, code) in cases {
            let job = FakeJob::new(behaviour);
            let (result, out) = run(&job, false);
            assert_eq!(crate::error::exit_code(&result), code);
            assert!(out.is_empty());
        }
    }
}
