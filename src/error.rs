use std::fmt;
use std::io;

/// The taxonomy of failures the page-tree engine can surface.
///
/// These are kinds, not distinct types: every fallible call in this crate
/// returns the single [`EseError`] type below, tagged with one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    MissingState,
    Unsupported,
    OutOfRange,
    IOFailure,
    InitialisationFailure,
    GetFailure,
    AppendFailure,
    SetFailure,
    FinalisationFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::MissingState => "missing state",
            ErrorKind::Unsupported => "unsupported value",
            ErrorKind::OutOfRange => "value out of range",
            ErrorKind::IOFailure => "I/O failure",
            ErrorKind::InitialisationFailure => "initialisation failure",
            ErrorKind::GetFailure => "get failure",
            ErrorKind::AppendFailure => "append failure",
            ErrorKind::SetFailure => "set failure",
            ErrorKind::FinalisationFailure => "finalisation failure",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug)]
pub struct EseError {
    kind: ErrorKind,
    details: String,
    source: Option<io::Error>,
}

impl EseError {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> EseError {
        EseError {
            kind,
            details: msg.into(),
            source: None,
        }
    }

    pub fn from_io(kind: ErrorKind, msg: impl Into<String>, source: io::Error) -> EseError {
        EseError {
            kind,
            details: msg.into(),
            source: Some(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn unsupported(msg: impl Into<String>) -> EseError {
        EseError::new(ErrorKind::Unsupported, msg)
    }

    pub fn out_of_range(msg: impl Into<String>) -> EseError {
        EseError::new(ErrorKind::OutOfRange, msg)
    }

    pub fn missing_state(msg: impl Into<String>) -> EseError {
        EseError::new(ErrorKind::MissingState, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> EseError {
        EseError::new(ErrorKind::InvalidArgument, msg)
    }
}

impl fmt::Display for EseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.details)
    }
}

impl std::error::Error for EseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<io::Error> for EseError {
    fn from(e: io::Error) -> Self {
        EseError::from_io(ErrorKind::IOFailure, "I/O operation failed", e)
    }
}
