use super::IndexDimension;

pub type WfcResult<T> = Result<T, WfcError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WfcErrorCategory {
    InputValidationError,
    IoSystemError,
    FormatError,
    InternalError,
}

impl WfcErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::FormatError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::FormatError => "FormatError",
            Self::InternalError => "InternalError",
        }
    }

    pub fn fatal_exit_line(self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WfcError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed header: {reason}")]
    MalformedHeader { reason: String },
    #[error(
        "band count mismatch at k-point {kpoint}, spin {spin}: expected {expected}, found {actual}"
    )]
    BandCountMismatch {
        kpoint: usize,
        spin: usize,
        expected: u32,
        actual: u32,
    },
    #[error(
        "truncated record at byte {offset}: declared {declared} bytes but only {available} remain"
    )]
    TruncatedRecord {
        offset: u64,
        declared: u64,
        available: u64,
    },
    #[error("{dimension} index {index} is out of range (valid: 1..={upper})")]
    IndexOutOfRange {
        dimension: IndexDimension,
        index: usize,
        upper: usize,
    },
    #[error("invalid source configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl WfcError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn malformed_header(reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            reason: reason.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub const fn category(&self) -> WfcErrorCategory {
        match self {
            Self::Io { .. } => WfcErrorCategory::IoSystemError,
            Self::MalformedHeader { .. }
            | Self::BandCountMismatch { .. }
            | Self::TruncatedRecord { .. } => WfcErrorCategory::FormatError,
            Self::IndexOutOfRange { .. } | Self::InvalidConfig { .. } => {
                WfcErrorCategory::InputValidationError
            }
        }
    }

    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO.SOURCE_READ",
            Self::MalformedHeader { .. } => "FORMAT.MALFORMED_HEADER",
            Self::BandCountMismatch { .. } => "FORMAT.BAND_COUNT_MISMATCH",
            Self::TruncatedRecord { .. } => "FORMAT.TRUNCATED_RECORD",
            Self::IndexOutOfRange { .. } => "INPUT.INDEX_OUT_OF_RANGE",
            Self::InvalidConfig { .. } => "INPUT.SOURCE_CONFIG",
        }
    }

    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder(), self)
    }

    pub fn fatal_exit_line(&self) -> String {
        self.category().fatal_exit_line()
    }
}
