/// Stable machine-readable code for errors that reach the host.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

impl ErrorCode for crate::history::HistoryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Serialize(_) => "E_SNAPSHOT_SERIALIZE",
            Self::CorruptSnapshot { .. } => "E_CORRUPT_SNAPSHOT",
        }
    }
}

impl ErrorCode for crate::export::ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptySurface => "E_EMPTY_SURFACE",
            Self::InvalidDimensions { .. } => "E_INVALID_DIMENSIONS",
            Self::MissingFont { .. } => "E_MISSING_FONT",
            Self::Encode(_) => "E_ENCODE",
        }
    }
}
