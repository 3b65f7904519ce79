//! # lib-matcher-ffi
//!
//! Safe boundary layer over the `IBScanMatcher` fingerprint engine.
//!
//! This crate marshals the typed records of `lib-types` into the engine's
//! fixed-layout structures and back. It handles:
//!
//! - Dynamic library loading with `libloading` and a write-once symbol registry
//! - Record conversion with scoped ownership of native pixel buffers
//! - ISO interchange (FIR/FMR) load and save
//! - Status propagation through a per-call error channel
//! - Session handle lifecycle (open/close)
//!
//! # Safety
//!
//! The engine is foreign code. All `unsafe` is confined to the loader, the
//! library-backed engine and the reads of engine-owned output records:
//!
//! 1. **Unresolved entry points**: never called; the operation reports
//!    `MissingResource`
//! 2. **Buffer ownership**: every pixel buffer handed to the engine is owned
//!    by a scope guard and released exactly once
//! 3. **Engine-owned output**: copied out immediately after the call that
//!    produced it
//! 4. **Serialized access**: every operation borrows its session mutably

pub mod buffer;
pub mod convert;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod interchange;
pub mod loader;
pub mod matcher;
pub mod native;
pub mod registry;
pub mod session;
pub mod status;

#[cfg(test)]
mod mock;

pub use engine::{LibraryEngine, MatcherEngine};
pub use error::{MatcherError, MatcherResult};
pub use interchange::Recovered;
pub use loader::MatcherLibrary;
pub use matcher::{Identification, Matcher};
pub use session::{MatcherSession, SessionState};
pub use status::ErrorStatus;
