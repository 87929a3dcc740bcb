//! Shared primitives for the Aster statistics engine.
//!
//! `aster-core` provides the foundation the engine crate builds on:
//!
//! - **Error types** — [`AsterError`] and [`Result`] for structured error handling
//! - **Traits** — [`Scored`] and [`Summarizable`] implemented by result types

pub mod error;
pub mod traits;

pub use error::{AsterError, Result};
pub use traits::*;
