//! Owned pixel buffers handed to the engine.
//!
//! A [`NativeBuffer`] is allocated right before an engine call and released
//! when it goes out of scope, on every exit path. Allocations and releases are
//! counted per thread so callers can verify that a call left nothing behind.

use crate::error::{MatcherError, MatcherResult};
use std::cell::Cell;
use std::ffi::c_void;
use std::ptr;

thread_local! {
    static ALLOCATED: Cell<u64> = const { Cell::new(0) };
    static RELEASED: Cell<u64> = const { Cell::new(0) };
    #[cfg(test)]
    static FAIL_AFTER: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Snapshot of the buffer counters for the current thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferLedger {
    pub allocated: u64,
    pub released: u64,
}

impl BufferLedger {
    /// Buffers allocated but not yet released.
    pub fn outstanding(&self) -> u64 {
        self.allocated - self.released
    }

    /// Counter movement since an earlier snapshot.
    pub fn since(&self, earlier: BufferLedger) -> BufferLedger {
        BufferLedger {
            allocated: self.allocated - earlier.allocated,
            released: self.released - earlier.released,
        }
    }
}

/// Current buffer counters for this thread.
pub fn ledger() -> BufferLedger {
    BufferLedger {
        allocated: ALLOCATED.with(Cell::get),
        released: RELEASED.with(Cell::get),
    }
}

/// A heap copy of pixel data owned by this layer while the engine reads it.
#[derive(Debug)]
pub struct NativeBuffer {
    bytes: Box<[u8]>,
}

impl NativeBuffer {
    /// Allocate a buffer holding a copy of `src`.
    pub fn copy_from(src: &[u8]) -> MatcherResult<Self> {
        #[cfg(test)]
        if FAIL_AFTER.with(|f| matches!(f.get(), Some(0))) {
            return Err(MatcherError::AllocationFailed(format!(
                "{} byte pixel buffer (injected)",
                src.len()
            )));
        }

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(src.len()).map_err(|e| {
            MatcherError::AllocationFailed(format!("{} byte pixel buffer: {e}", src.len()))
        })?;
        bytes.extend_from_slice(src);

        ALLOCATED.with(|c| c.set(c.get() + 1));
        #[cfg(test)]
        FAIL_AFTER.with(|f| f.set(f.get().map(|n| n.saturating_sub(1))));

        tracing::trace!(len = src.len(), "allocated native buffer");
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Pointer handed to the engine; null for an empty buffer.
    pub fn as_mut_ptr(&mut self) -> *mut c_void {
        if self.bytes.is_empty() {
            ptr::null_mut()
        } else {
            self.bytes.as_mut_ptr().cast()
        }
    }
}

impl Drop for NativeBuffer {
    fn drop(&mut self) {
        RELEASED.with(|c| c.set(c.get() + 1));
        tracing::trace!(len = self.bytes.len(), "released native buffer");
    }
}

/// Make the allocation after the next `successes` ones fail on this thread.
#[cfg(test)]
pub(crate) fn fail_allocation_after(successes: u64) {
    FAIL_AFTER.with(|f| f.set(Some(successes)));
}

/// Clear any injected allocation failure on this thread.
#[cfg(test)]
pub(crate) fn clear_allocation_failure() {
    FAIL_AFTER.with(|f| f.set(None));
}
