//! Error types for the command bridge.
//!
//! ## Error Code Ranges
//!
//! | Range | Category | Description |
//! |-------|----------|-------------|
//! | B001-B099 | Outbound | Failures reported by the runtime for host-issued commands |
//! | B101-B199 | Inbound | Export and callback dispatch failures |

use thiserror::Error;

/// Boxed error carried out of a failing host function.
pub type HostError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors crossing the bridge in either direction.
///
/// Error codes use a stable B-series format:
/// - B001-B099: Outbound errors (unknown command, command failure)
/// - B101-B199: Inbound errors (dispatch, arity, host function failures)
#[derive(Debug, Error)]
pub enum BridgeError {
    /// B001: The runtime has no command with this name.
    #[error("B001: unknown command '{command}'")]
    UnknownCommand { command: String },

    /// B002: The command ran and reported a failure.
    #[error("B002: {command}: {message}")]
    CommandFailed { command: String, message: String },

    /// B101: The dispatcher was asked for a name that was never exported.
    #[error("B101: no such exported function '{name}'")]
    UnknownExport { name: String },

    /// B102: More (or fewer) arguments arrived than the export accepts.
    #[error("B102: {name}(): expected {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: String,
        got: usize,
    },

    /// B103: The dispatcher was invoked without an export name.
    #[error("B103: __invoke_pyfunc called with incorrect number of arguments")]
    DispatchUsage,

    /// B104: The exported host function returned an error.
    #[error("B104: {name}(): {source}")]
    HostFunction {
        name: String,
        #[source]
        source: HostError,
    },

    /// B105: A re-export was refused by the session's shadow policy.
    #[error("B105: function '{name}' is already exported")]
    AlreadyExported { name: String },
}

impl BridgeError {
    /// Creates a `CommandFailed` error.
    pub fn command_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::CommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Returns the error code (e.g., "B001", "B102").
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::UnknownCommand { .. } => "B001",
            BridgeError::CommandFailed { .. } => "B002",
            BridgeError::UnknownExport { .. } => "B101",
            BridgeError::ArityMismatch { .. } => "B102",
            BridgeError::DispatchUsage => "B103",
            BridgeError::HostFunction { .. } => "B104",
            BridgeError::AlreadyExported { .. } => "B105",
        }
    }

    /// Returns the error category.
    pub fn category(&self) -> &'static str {
        match self {
            BridgeError::UnknownCommand { .. } | BridgeError::CommandFailed { .. } => "outbound",
            BridgeError::UnknownExport { .. }
            | BridgeError::ArityMismatch { .. }
            | BridgeError::DispatchUsage
            | BridgeError::HostFunction { .. }
            | BridgeError::AlreadyExported { .. } => "inbound",
        }
    }
}
