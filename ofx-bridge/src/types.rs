//! Core types for the OFX bridge
//!
//! Control-flow status exchanged with host callbacks, the aggregate outcome
//! of a parse call, and the error type of the crate.

use crate::native::{OFXB_ABORT, OFXB_CONTINUE, OFXB_PARSE_ABORTED, OFXB_PARSE_OK};
use crate::records::EntityKind;
use std::fmt;
use std::os::raw::c_int;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Decision a host callback returns for every delivered record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Keep parsing
    Continue,
    /// Stop parsing immediately
    Abort,
}

impl Status {
    /// Native return value for this decision
    pub fn to_native(self) -> c_int {
        match self {
            Status::Continue => OFXB_CONTINUE,
            Status::Abort => OFXB_ABORT,
        }
    }

    /// Interpret a native return value; anything but CONTINUE aborts
    pub fn from_native(value: c_int) -> Self {
        if value == OFXB_CONTINUE {
            Status::Continue
        } else {
            Status::Abort
        }
    }

    pub fn is_abort(self) -> bool {
        self == Status::Abort
    }
}

/// Aggregate result of one parse call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The engine processed the whole document
    Completed,
    /// A callback (or a failed conversion) stopped the run
    Aborted,
    /// The engine reported a parse failure with this native status
    ParseError(c_int),
}

impl ParseOutcome {
    /// Fold the engine's native status with what the registry observed
    pub fn from_native(status: c_int, aborted: bool) -> Self {
        if aborted || status == OFXB_PARSE_ABORTED {
            ParseOutcome::Aborted
        } else if status == OFXB_PARSE_OK {
            ParseOutcome::Completed
        } else {
            ParseOutcome::ParseError(status)
        }
    }
}

impl fmt::Display for ParseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseOutcome::Completed => write!(f, "completed"),
            ParseOutcome::Aborted => write!(f, "aborted"),
            ParseOutcome::ParseError(code) => write!(f, "parse error (status {})", code),
        }
    }
}

/// What happened during one parse call
#[derive(Debug)]
pub struct ParseReport {
    pub outcome: ParseOutcome,
    /// Statements dispatched to the host
    pub statements: usize,
    /// Accounts dispatched to the host
    pub accounts: usize,
    /// Transactions dispatched to the host
    pub transactions: usize,
    /// Trampoline calls dropped because the run had already aborted
    pub suppressed: usize,
    /// Trampoline calls that arrived on a thread other than the parsing one
    pub foreign_calls: usize,
    /// First failure recorded by a trampoline, if any
    pub failure: Option<BridgeError>,
}

impl ParseReport {
    pub fn is_completed(&self) -> bool {
        self.outcome == ParseOutcome::Completed
    }

    pub fn is_aborted(&self) -> bool {
        self.outcome == ParseOutcome::Aborted
    }

    /// Total records dispatched to the host
    pub fn delivered(&self) -> usize {
        self.statements + self.accounts + self.transactions
    }
}

/// Errors raised by the bridge
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Failed to convert {kind} field `{field}`: {reason}")]
    Conversion {
        kind: EntityKind,
        field: &'static str,
        reason: String,
    },

    #[error("Host {0} callback panicked: {1}")]
    CallbackPanicked(EntityKind, String),

    #[error("Trampoline called from a thread that does not own the registry")]
    ForeignThread,

    #[error("{0} trampoline re-entered while a host callback was running")]
    Reentrant(EntityKind),

    #[error("Field `{field}` is {len} bytes, at most {max} fit")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Field `{0}` contains an interior NUL byte")]
    InteriorNul(&'static str),

    #[error("Native engine setup failed: {0}")]
    EngineSetup(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BridgeError {
    pub(crate) fn conversion(kind: EntityKind, field: &'static str, reason: impl Into<String>) -> Self {
        BridgeError::Conversion {
            kind,
            field,
            reason: reason.into(),
        }
    }
}
