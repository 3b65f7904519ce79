//! Matcher session lifecycle.
//!
//! A session owns one engine handle from `IBSM_OpenMatcher` until an explicit
//! [`MatcherSession::close`]. Nothing closes it implicitly.

use crate::engine::MatcherEngine;
use crate::error::MatcherResult;
use crate::native::INVALID_HANDLE;
use crate::status::check;
use std::ffi::c_int;

pub use lib_types::SessionState;

/// An open matcher engine session.
///
/// # Thread Safety
///
/// The engine does not promise that a handle tolerates concurrent calls.
/// Every operation takes `&mut self`, so calls on one session are serialized
/// by the borrow checker. Distinct sessions share nothing mutable and can be
/// moved to separate threads when the engine type is `Send`.
///
/// ```ignore
/// let mut session = MatcherSession::open(LibraryEngine::from_registry()?);
/// let mut status = ErrorStatus::new();
/// let template = session.extract_template(&image, &mut status);
/// session.close()?;
/// ```
pub struct MatcherSession<E: MatcherEngine> {
    pub(crate) engine: E,
    handle: c_int,
    state: SessionState,
}

impl<E: MatcherEngine> MatcherSession<E> {
    /// Open a session on the engine.
    ///
    /// The handle the engine returns is stored as is. A negative handle
    /// leaves the session [`SessionState::Invalid`]; operations still pass it
    /// through and the engine rejects them.
    pub fn open(mut engine: E) -> Self {
        let mut handle = INVALID_HANDLE;
        let code = engine.open_matcher(&mut handle);
        let state = if handle >= 0 {
            SessionState::Open
        } else {
            SessionState::Invalid
        };

        if state == SessionState::Invalid {
            tracing::warn!(code, handle, "matcher session could not be opened");
        } else {
            tracing::debug!(code, handle, "Opened matcher session");
        }

        Self {
            engine,
            handle,
            state,
        }
    }

    /// The stored engine handle, whatever its validity.
    pub fn handle(&self) -> c_int {
        self.handle
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Release the engine handle.
    ///
    /// Safe to call more than once. An invalid session is marked closed
    /// without calling the engine.
    pub fn close(&mut self) -> MatcherResult<()> {
        let result = match self.state {
            SessionState::Closed => return Ok(()),
            SessionState::Invalid => Ok(()),
            SessionState::Open => check(self.engine.close_matcher(self.handle)),
        };

        tracing::debug!(handle = self.handle, ok = result.is_ok(), "Closed matcher session");
        self.handle = INVALID_HANDLE;
        self.state = SessionState::Closed;
        result
    }
}

impl<E: MatcherEngine> Drop for MatcherSession<E> {
    fn drop(&mut self) {
        if self.state == SessionState::Open {
            tracing::warn!(
                handle = self.handle,
                "matcher session dropped without close; engine handle left open"
            );
        }
    }
}
