use crate::error::SysError;
use crate::shim::{self, SigAction, SigMask};
use crate::status::*;
use rustix::process::Signal;
use std::process;
use std::thread::{self, JoinHandle};

/// Signals that quiesce the wrapper instead of killing it with
/// default semantics (and, in debug terms, instead of a panic trace).
const QUIESCED_SIGNALS: [Signal; 2] = [Signal::INT, Signal::TERM];

/// Initialize signal mask and dispositions in parent.
/// Must be called in main() before spawning any thread, so that every
/// thread inherits the block mask and the quiescer thread is the only
/// place where INT/TERM are consumed.
pub fn init_parent_signals() -> Result<(), SysError> {
    // Block quiesced signals. We fetch them with sigwait() in the
    // quiescer thread.
    if let Err(err) = shim::sigmask(&QUIESCED_SIGNALS, SigMask::Block) {
        return Err(SysError("sigmask()", err));
    }

    // Ensure quiesced signals have their default dispositions, so that
    // unblocking them later restores normal behavior.
    for sig in QUIESCED_SIGNALS {
        if let Err(err) = shim::sigaction(sig, SigAction::Default) {
            return Err(SysError("sigaction()", err));
        }
    }

    // Ensure SIGPIPE is ignored and EPIPE is generated instead.
    if let Err(err) = shim::sigaction(Signal::PIPE, SigAction::Ignore) {
        return Err(SysError("sigaction()", err));
    }

    Ok(())
}

/// Initialize signal mask and dispositions in child.
/// Runs between fork() and exec(), via pre_exec(), so the spawned
/// command doesn't inherit our block mask.
pub fn init_child_signals() -> Result<(), SysError> {
    // Default dispositions for everything we've touched.
    if let Err(err) = shim::sigaction(Signal::PIPE, SigAction::Default) {
        return Err(SysError("sigaction()", err));
    }
    for sig in QUIESCED_SIGNALS {
        if let Err(err) = shim::sigaction(sig, SigAction::Default) {
            return Err(SysError("sigaction()", err));
        }
    }

    // Unblock what we've blocked in parent.
    if let Err(err) = shim::sigmask(&QUIESCED_SIGNALS, SigMask::Unblock) {
        return Err(SysError("sigmask()", err));
    }

    Ok(())
}

/// Spawn thread that waits for INT/TERM and terminates the process
/// with code 128+signum, without any panic or backtrace output.
///
/// One-shot: before exiting, the handler restores default dispositions
/// and unblocks both signals, so a repeated signal during teardown
/// behaves normally. The signal is not forwarded to the child.
pub fn spawn_quiescer() -> JoinHandle<()> {
    thread::spawn(move || {
        let sig = match shim::sigwait(&QUIESCED_SIGNALS, None) {
            Ok(Some(sig)) => sig,
            // No timeout is set, so None can't happen; treat both
            // impossible outcomes as a plain interrupt.
            Ok(None) | Err(_) => Signal::INT,
        };

        for s in QUIESCED_SIGNALS {
            _ = shim::sigaction(s, SigAction::Default);
        }
        _ = shim::sigmask(&QUIESCED_SIGNALS, SigMask::Unblock);

        process::exit(EXIT_SIGNALED + sig.as_raw());
    })
}
