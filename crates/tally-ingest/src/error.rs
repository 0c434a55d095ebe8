use thiserror::Error;

/// Why a row could not be read at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowParseReason {
    /// The row is not a header-to-value mapping.
    NotAMapping,
    /// The row has no readable headers.
    NoHeaders,
}

impl std::fmt::Display for RowParseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAMapping => f.write_str("row is not a mapping of headers to values"),
            Self::NoHeaders => f.write_str("row has no readable headers"),
        }
    }
}

/// A row that could not be normalized. Individual bad cells never produce
/// this; only unreadable rows do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Row {row}: {reason}")]
pub struct RowParseError {
    /// Zero-based index of the row in its batch.
    pub row: usize,
    pub reason: RowParseReason,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AliasError {
    #[error("Unknown field in alias configuration: {0}")]
    UnknownField(String),

    #[error("Field {0} has no importable column")]
    NotImportable(String),
}
