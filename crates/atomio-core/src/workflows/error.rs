use crate::core::io::pdb::PdbError;
use crate::core::models::shape::ShapeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    /// Input arrays were rejected before any file was touched.
    #[error("Validation failed: {0}")]
    Shape(#[from] ShapeError),

    #[error("PDB encoding failed: {0}")]
    Pdb(#[from] PdbError),

    /// The destination ends in a path separator or has no final component.
    #[error("Output path '{path}' does not name a file", path = path.display())]
    MissingFileName { path: PathBuf },

    #[error("Cannot index past '{file_name}': its index has no successor")]
    IndexOverflow { file_name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WriteError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WriteError::Shape(_) | WriteError::MissingFileName { .. }
        )
    }
}
