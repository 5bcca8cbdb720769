//! Stable process exit codes.

use svgpack::Error;

/// Exit codes reported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation completed.
    Success = 0,
    /// Some entries in a batch failed.
    PartialFailure = 1,
    /// Command-line usage error.
    UsageError = 2,
    /// The host document is not a valid container.
    InvalidFormat = 3,
    /// An entry was missing or already present.
    PathConflict = 4,
    /// Entry data failed to decode or verify.
    CorruptEntry = 5,
    /// A resource limit was exceeded.
    LimitExceeded = 6,
    /// File system failure.
    IoError = 7,
    /// Any other failure.
    OtherError = 10,
}

impl ExitCode {
    /// Terminates the process with this code.
    pub fn exit(self) -> ! {
        std::process::exit(self as i32)
    }
}

/// Maps a library error to its exit code.
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::InvalidHostFormat(_) => ExitCode::InvalidFormat,
        Error::StructureConflict(_) => ExitCode::InvalidFormat,
        Error::DuplicatePath { .. } | Error::EntryNotFound { .. } => ExitCode::PathConflict,
        Error::Decode { .. } | Error::ChecksumMismatch { .. } => ExitCode::CorruptEntry,
        Error::LimitExceeded(_) => ExitCode::LimitExceeded,
        Error::InvalidEntryPath(_) => ExitCode::UsageError,
        _ => ExitCode::OtherError,
    }
}
