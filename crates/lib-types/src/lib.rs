//! # lib-types
//!
//! Core type definitions for the IBSM matcher bridge.
//!
//! This crate provides the caller-side object model used throughout the
//! workspace:
//! - Image and template records with their capture metadata
//! - Closed code enumerations with two-way native code mapping
//! - Engine status codes and session state

pub mod codes;
pub mod record;
pub mod status;

pub use codes::*;
pub use record::*;
pub use status::*;
