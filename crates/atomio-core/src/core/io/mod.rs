//! Provides input/output functionality for protein structure file formats.
//!
//! Formats implement the [`traits::StructureFile`] trait, which supplies
//! reader/writer based methods plus path-based conveniences on top of them.

pub mod pdb;
pub mod traits;
