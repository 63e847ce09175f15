use std::fmt;

/// Machine-readable error codes surfaced by the CLI and the TUI status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ValidationFailed,
    AddressNotFound,
    LabelNotFound,
    NoFocusedAddress,
    EditNotOpen,
    StorageFailure,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::ValidationFailed => "E2001",
            Self::AddressNotFound => "E2002",
            Self::LabelNotFound => "E2003",
            Self::NoFocusedAddress => "E2004",
            Self::EditNotOpen => "E2005",
            Self::StorageFailure => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ValidationFailed => "Validation failed",
            Self::AddressNotFound => "Address not found",
            Self::LabelNotFound => "Label not found",
            Self::NoFocusedAddress => "No address focused",
            Self::EditNotOpen => "No edit in progress",
            Self::StorageFailure => "Storage failure",
        }
    }

    /// Optional remediation hint that can be surfaced to the user.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in rolodex/config.toml and retry."),
            Self::ValidationFailed => Some("Correct the highlighted field and save again."),
            Self::AddressNotFound => Some("Reload the address book; the entry may have been removed."),
            Self::LabelNotFound => Some("Run `rdx labels` to list known labels."),
            Self::NoFocusedAddress => Some("Add addresses with `rdx seed` or another tool first."),
            Self::EditNotOpen => None,
            Self::StorageFailure => Some("Check the database path and file permissions."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by the address book core.
///
/// None of these are retried automatically; the store is local and
/// synchronous, so every failure is reported to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A field value was rejected before anything was written.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A row expected to exist is missing from storage.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A label name did not resolve against the label table.
    #[error("label not found: {name}")]
    LabelNotFound { name: String },

    /// An operation needs a focused address but the list is empty.
    #[error("no address is focused")]
    NoFocus,

    /// A commit or field update arrived with no edit session open.
    #[error("no edit session is open")]
    EditNotOpen,

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

impl Error {
    /// Shorthand for a missing address row.
    #[must_use]
    pub fn address_not_found(key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: "address",
            key: key.to_string(),
        }
    }

    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::NotFound { .. } => ErrorCode::AddressNotFound,
            Self::LabelNotFound { .. } => ErrorCode::LabelNotFound,
            Self::NoFocus => ErrorCode::NoFocusedAddress,
            Self::EditNotOpen => ErrorCode::EditNotOpen,
            Self::Storage(_) => ErrorCode::StorageFailure,
        }
    }

    /// Optional remediation hint for the user.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
