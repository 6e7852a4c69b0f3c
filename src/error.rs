use rustix::io::Errno;
use std::fmt;
use std::io;

/// Error from a syscall shim: which call failed and its errno.
#[derive(Debug)]
pub struct SysError(pub &'static str, pub Errno);

impl fmt::Display for SysError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.0, self.1)
    }
}

impl From<SysError> for io::Error {
    // Used where a shim result crosses an io::Error boundary, e.g. inside pre_exec().
    fn from(err: SysError) -> Self {
        io::Error::from_raw_os_error(err.1.raw_os_error())
    }
}
