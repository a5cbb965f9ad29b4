//! Process exit outcomes.

/// How the process should terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    /// Records emitted.
    Success,
    /// Login, roster request or output failed.
    Failure,
    /// The watchdog deadline elapsed.
    Timeout,
    /// Required arguments missing or invalid.
    ArgumentError,
}

impl ProcessExit {
    /// Numeric exit status.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Timeout => 2,
            Self::ArgumentError => 5,
        }
    }
}
