//! # Virtual File System
//!
//! This crate provides the in-memory virtual file system backing a learner's
//! multi-file front-end project. It stores named text files and folders under
//! normalized absolute paths and offers the path resolution and listing
//! queries the rest of the pipeline builds on.
//!
//! ## Key Concepts
//! - **VirtualFile**: a named text file with an inferred [`FileLanguage`].
//! - **Vfs**: a flat two-collection store (files map + folders set) with
//!   parent-path invariants checked at write time. There is no pointer-linked
//!   tree; any tree view is rebuilt on demand from the flat collections.
//! - **Paths**: always absolute, always with a leading `/`, never with a
//!   trailing slash except root itself.

pub mod error;
pub mod file;
pub mod path;
pub mod store;

pub use error::VfsError;
pub use file::{FileLanguage, VirtualFile, is_component_script};
pub use path::{is_valid_name, normalize, parent, resolve};
pub use store::{Listing, Vfs};
