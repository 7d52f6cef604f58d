//! # Workflows Module
//!
//! High-level entry points that tie the stateless [`crate::core`] pieces to the
//! filesystem.
//!
//! - **PDB Writing** ([`write`]) - Writes a single atom37 structure or a stack of
//!   frames as a multi-model PDB file, with overwrite and auto-indexed file names.
//! - **Errors** ([`error`]) - The error type surfaced by every workflow.

pub mod error;
pub mod write;
