//! # Core Models Module
//!
//! Data structures describing a protein in the atom37 layout used by structure
//! prediction pipelines.
//!
//! ## Key Components
//!
//! - [`protein`] - The [`protein::Protein`] record, its assembler, and the atom presence mask
//! - [`shape`] - Shape validation errors shared by every array-consuming operation
//!
//! ## Usage
//!
//! ```ignore
//! use atomio::core::models::protein::{ResidueAnnotations, assemble_protein, atom37_mask_from_positions};
//!
//! let mask = atom37_mask_from_positions(positions.view());
//! let protein = assemble_protein(positions.view().into_dyn(), mask.view(), &ResidueAnnotations::default())?;
//! ```

pub mod protein;
pub mod shape;
