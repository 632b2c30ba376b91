//! Core types for the Vitae resume builder.
//!
//! Holds the resume document model, typed field addressing, the copy-on-write
//! edit and merge operations, and the form session that coordinates edits
//! with calls to a [`ResumeBackend`](backend::ResumeBackend). Nothing here
//! speaks HTTP; the CLI crate provides the networked backend.

pub mod address;
pub mod backend;
pub mod document;
pub mod edit;
pub mod error;
pub mod experience;
pub mod merge;
pub mod session;
pub mod wire;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
