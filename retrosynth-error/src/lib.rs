//! # retrosynth-error
//!
//! Unified error handling for retrosynth - following OpenDAL's error handling practices.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what error occurred (e.g., InvalidSmiles, PredictionFailed)
//! - **ErrorStatus**: Decide how to handle it (Permanent, Temporary, Persistent)
//! - **Error Context**: Assist in locating the cause with rich context
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use retrosynth_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::RegistryUnavailable, "compound service returned 503")
//!         .with_operation("registry::lookup")
//!         .with_context("smiles", "C1=CC=CC=C1")
//!         .with_context("status", "503"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All functions return `Result<T, retrosynth_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context
//! - Don't abuse `From<OtherError>` to prevent raw error leakage

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using retrosynth Error
pub type Result<T> = std::result::Result<T, Error>;
