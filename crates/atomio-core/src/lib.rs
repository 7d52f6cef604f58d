//! # atomio Core Library
//!
//! Converts atom37 coordinate arrays produced by protein structure prediction
//! pipelines into PDB files, and rigid-body transforms into compact SE(3)
//! vectors.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless pieces: residue constant tables, the
//!   atom37 `Protein` record and its assembler, the PDB grammar, and the
//!   quaternion / rotation vector conversions.
//!
//! - **[`workflows`]: The Public API.** Ties the `core` pieces to the filesystem:
//!   writing single structures or multi-model ensembles to PDB files with
//!   overwrite and auto-indexing semantics.

pub mod core;
pub mod workflows;
