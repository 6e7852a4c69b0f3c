// These constants follow bash conventions for exit codes.
// They are not standartizied, but are quite common.

/// General error.
/// E.g. output file can't be opened, write to stdout failed, etc.
pub const EXIT_FAILURE: i32 = 1;

/// Invalid usage.
/// E.g. missing command to run.
pub const EXIT_USAGE: i32 = 2;

/// Command invoked cannot execute.
/// E.g. not found or permission denied.
pub const EXIT_COMMAND_FAILED: i32 = 126;

/// Process terminated by signal.
/// The actual exit code is EXIT_SIGNALED + N, where N is the signal
/// number. Used both when the child is killed by a signal and when
/// the wrapper itself is interrupted.
pub const EXIT_SIGNALED: i32 = 128;
