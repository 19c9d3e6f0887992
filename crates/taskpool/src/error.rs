use thiserror::Error;

// ── Status codes ─────────────────────────────────────────────────────

/// The operation completed.
pub const STATUS_SUCCESS: i32 = 0;

/// A precondition was violated: pool absent or job uninitialized.
pub const STATUS_ILLEGAL_OPERATION: i32 = 1;

/// The underlying queue or timer primitive rejected the request.
pub const STATUS_FAILED_OPERATION: i32 = 2;

/// Reserved catch-all.
pub const STATUS_GENERAL_FAILURE: i32 = 3;

/// Map a numeric status code to its fixed description.
///
/// Total over all inputs: codes outside the known set map to
/// `"INVALID STATUS"` rather than failing.
pub fn strerror(code: i32) -> &'static str {
    match code {
        STATUS_SUCCESS => "SUCCESS",
        STATUS_ILLEGAL_OPERATION => "OPERATION NOT ALLOWED",
        STATUS_FAILED_OPERATION => "OPERATION FAILED",
        STATUS_GENERAL_FAILURE => "GENERAL FAILURE",
        _ => "INVALID STATUS",
    }
}

// ── Error type ───────────────────────────────────────────────────────

/// Errors that can occur in the task pool scheduler.
#[derive(Debug, Error)]
pub enum TaskPoolError {
    /// A precondition was violated: the pool has not been started or the
    /// job was never initialized.
    #[error("operation not allowed: {0}")]
    IllegalOperation(&'static str),

    /// The dispatch queue or timer primitive rejected the request.
    #[error("operation failed: {0}")]
    FailedOperation(&'static str),

    /// Catch-all for failures outside the other categories.
    #[error("general failure: {0}")]
    GeneralFailure(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),
}

impl TaskPoolError {
    /// The numeric status code for this error.
    ///
    /// Config-layer errors fold into [`STATUS_GENERAL_FAILURE`]; the code
    /// set itself is closed.
    pub fn code(&self) -> i32 {
        match self {
            Self::IllegalOperation(_) => STATUS_ILLEGAL_OPERATION,
            Self::FailedOperation(_) => STATUS_FAILED_OPERATION,
            Self::GeneralFailure(_) | Self::Config(_) | Self::ConfigParse(_) | Self::ConfigIo(_) => {
                STATUS_GENERAL_FAILURE
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
