//! Structural errors raised by the store.
//!
//! These are rejected synchronously, before anything reaches the assembler;
//! a bad write never silently disappears.

use thiserror::Error;

/// Errors produced by [`crate::Vfs`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VfsError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("parent folder does not exist: {0}")]
    MissingParent(String),

    #[error("entry already exists: {0}")]
    Duplicate(String),

    #[error("no such file or folder: {0}")]
    NotFound(String),

    #[error("a file occupies that path: {0}")]
    NotAFolder(String),
}
