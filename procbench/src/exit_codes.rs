#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// A target program could not be launched. Fatal to the whole run:
    /// baseline comparisons with missing data points are meaningless.
    LaunchFailed = 20,

    /// Invalid CLI flags or suite configuration.
    InvalidInput = 30,

    /// Internal/runtime error (IO errors, hung-trial timeouts, unexpected
    /// invariants).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
