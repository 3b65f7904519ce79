//! Engine status codes and session state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code value for a successful engine call.
pub const STATUS_OK: i32 = 0;

/// Status codes defined by the matcher engine.
///
/// Negative values are errors, zero is success and positive values are
/// warnings. Codes not listed here are still passed through verbatim by the
/// boundary layer; this table only gives them names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    Ok,
    InvalidParamValue,
    MemAlloc,
    NotSupported,
    FileOpen,
    FileRead,
    ResourceLocked,
    MissingResource,
    InvalidAccessPointer,
    ThreadCreate,
    CommandFailed,
    FileSave,
    OpenMatcherFailed,
    CloseMatcherFailed,
    NoMatcherInstance,
    InvalidHandle,
    ExtractionFailed,
    EnrollmentFailed,
    MatchingFailed,
    CompressionFailed,
    DecompressionFailed,
    ConvertFailed,
    ThereIsNoData,
    NotSupportedFunction,
    NotSupportedImageFormat,
    NotSupportedDeviceType,
    IncorrectIsoFile,
}

impl StatusCode {
    const TABLE: [(StatusCode, i32); 27] = [
        (StatusCode::Ok, 0),
        (StatusCode::InvalidParamValue, -1),
        (StatusCode::MemAlloc, -2),
        (StatusCode::NotSupported, -3),
        (StatusCode::FileOpen, -4),
        (StatusCode::FileRead, -5),
        (StatusCode::ResourceLocked, -6),
        (StatusCode::MissingResource, -7),
        (StatusCode::InvalidAccessPointer, -8),
        (StatusCode::ThreadCreate, -9),
        (StatusCode::CommandFailed, -10),
        (StatusCode::FileSave, -11),
        (StatusCode::OpenMatcherFailed, -600),
        (StatusCode::CloseMatcherFailed, -601),
        (StatusCode::NoMatcherInstance, -602),
        (StatusCode::InvalidHandle, -603),
        (StatusCode::ExtractionFailed, -604),
        (StatusCode::EnrollmentFailed, -605),
        (StatusCode::MatchingFailed, -606),
        (StatusCode::CompressionFailed, -607),
        (StatusCode::DecompressionFailed, -608),
        (StatusCode::ConvertFailed, -609),
        (StatusCode::ThereIsNoData, -610),
        (StatusCode::NotSupportedFunction, -611),
        (StatusCode::NotSupportedImageFormat, -612),
        (StatusCode::NotSupportedDeviceType, -613),
        (StatusCode::IncorrectIsoFile, -700),
    ];

    /// Native value of this status.
    pub fn to_code(self) -> i32 {
        Self::TABLE
            .iter()
            .find(|(status, _)| *status == self)
            .map(|(_, code)| *code)
            .unwrap_or(STATUS_OK)
    }

    /// Named status for a native value, if the engine defines one.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(status, _)| *status)
    }

    /// Whether a raw engine value denotes an error.
    pub fn is_error(code: i32) -> bool {
        code < STATUS_OK
    }

    /// Whether a raw engine value denotes a warning.
    pub fn is_warning(code: i32) -> bool {
        code > STATUS_OK
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.to_code())
    }
}

/// Lifecycle state of a matcher session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// The engine returned a usable handle.
    Open,
    /// The engine could not allocate session state; the stored handle is
    /// whatever sentinel it returned.
    Invalid,
    /// The session was closed explicitly.
    Closed,
}
