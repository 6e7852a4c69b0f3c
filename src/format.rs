use rustix::time::{ClockId, clock_gettime};
use std::fmt::{self, Write};

/// Which of the child's output channels a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamTag {
    Stdout,
    Stderr,
}

impl StreamTag {
    /// Numeric tag used in the output prefix.
    pub fn id(self) -> u32 {
        match self {
            StreamTag::Stdout => 1,
            StreamTag::Stderr => 2,
        }
    }
}

/// Monotonic clock reading, taken when the wrapper observes a line.
/// Kept as integer seconds + nanoseconds so that the 9-decimal
/// rendering is exact (f64 can't hold it for large uptimes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    secs: i64,
    nanos: i64,
}

impl Timestamp {
    /// Read CLOCK_MONOTONIC now.
    pub fn now() -> Self {
        let ts = clock_gettime(ClockId::Monotonic);
        Timestamp {
            secs: ts.tv_sec,
            nanos: ts.tv_nsec,
        }
    }
}

/// Format line prefix to string: "[<tag>,<seconds>.<9-digit nanos>] ".
/// The payload (with its own newline, if any) follows the prefix verbatim.
pub fn format_prefix(result: &mut String, stream: StreamTag, stamp: Timestamp) -> fmt::Result {
    write!(result, "[{},{}.{:09}] ", stream.id(), stamp.secs, stamp.nanos)
}
