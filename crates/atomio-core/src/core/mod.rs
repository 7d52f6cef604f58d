//! # Core Module
//!
//! The stateless foundation of atomio: residue constant tables, the atom37
//! protein record, the PDB grammar, and rigid-body geometry helpers.
//!
//! ## Architecture
//!
//! - **Constant Tables** ([`constants`]) - atom37 atom names, residue codes, and PDB chain letters
//! - **Structure Representation** ([`models`]) - The [`models::protein::Protein`] record and its assembler
//! - **File I/O** ([`io`]) - Reading and writing PDB text
//! - **Geometry** ([`utils`]) - Quaternion, rotation vector, and SE(3) vector conversions
//!
//! Nothing in this module touches the filesystem except the path-based
//! convenience methods of [`io::traits::StructureFile`].

pub mod constants;
pub mod io;
pub mod models;
pub mod utils;
