use thiserror::Error;

/// Raised when an input array does not have the layout an operation requires.
///
/// Always carries the offending shape so callers can report it verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Invalid {field} rank: shape {shape:?}, expected {expected}")]
    Rank {
        field: &'static str,
        shape: Vec<usize>,
        expected: &'static str,
    },
    #[error("Invalid {field} shape {shape:?}, expected {expected}")]
    Mismatch {
        field: &'static str,
        shape: Vec<usize>,
        expected: String,
    },
}

impl ShapeError {
    pub fn shape(&self) -> &[usize] {
        match self {
            ShapeError::Rank { shape, .. } | ShapeError::Mismatch { shape, .. } => shape,
        }
    }
}

pub(crate) fn ensure_shape(
    field: &'static str,
    actual: &[usize],
    expected: &[usize],
) -> Result<(), ShapeError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ShapeError::Mismatch {
            field,
            shape: actual.to_vec(),
            expected: format!("{:?}", expected),
        })
    }
}
