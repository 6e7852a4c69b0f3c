use crate::signal;
use crate::status::*;
use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};

/// Child process with separate stdout/stderr pipes.
///
/// The two pipes are never merged: the whole point of this tool is to
/// tag each line with the stream it came from. Stdin is inherited, so
/// interactive children still work.
pub struct ChildProc {
    child: Child,
}

impl ChildProc {
    /// Launch command.
    /// Fails synchronously if the program can't be executed (not
    /// found, permission denied), before any output is produced.
    pub fn spawn(command: &[String]) -> io::Result<ChildProc> {
        let mut cmd = Command::new(&command[0]);
        if command.len() > 1 {
            cmd.args(&command[1..]);
        }
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // SAFETY: init_child_signals() only calls async-signal-safe
        // libc functions (sigaction, pthread_sigmask), which is all
        // that's allowed between fork() and exec().
        unsafe {
            cmd.pre_exec(|| {
                // Undo the parent's blocked mask so the command gets
                // normal INT/TERM delivery.
                signal::init_child_signals()?;
                Ok(())
            });
        }

        let child = cmd.spawn()?;

        Ok(ChildProc { child })
    }

    /// Take stdout pipe.
    /// The pipe is handed to exactly one reader.
    pub fn take_stdout(&mut self) -> ChildStdout {
        match self.child.stdout.take() {
            Some(pipe) => pipe,
            None => panic!("attempt to call take_stdout() twice"),
        }
    }

    /// Take stderr pipe.
    /// The pipe is handed to exactly one reader.
    pub fn take_stderr(&mut self) -> ChildStderr {
        match self.child.stderr.take() {
            Some(pipe) => pipe,
            None => panic!("attempt to call take_stderr() twice"),
        }
    }

    /// Non-blocking check whether the child has terminated.
    /// Returns its exit code once known.
    pub fn poll_status(&mut self) -> io::Result<Option<i32>> {
        Ok(self.child.try_wait()?.map(exit_code))
    }

    /// Block until the child terminates and return its exit code.
    pub fn wait(&mut self) -> io::Result<i32> {
        Ok(exit_code(self.child.wait()?))
    }
}

/// Map wait status to an exit code.
/// A child killed by a signal has no exit code of its own; follow the
/// shell convention of 128+signum.
fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => EXIT_SIGNALED + status.signal().unwrap_or(0),
    }
}
