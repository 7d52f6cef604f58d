use super::shape::{ShapeError, ensure_shape};
use crate::core::constants::{ATOM_TYPE_NUM, UNK_RESTYPE_INDEX};
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, ArrayViewD, Axis, Ix3};
use std::collections::BTreeSet;

/// Threshold on `|x| + |y| + |z|` above which an atom37 slot counts as occupied.
pub const ATOM_PRESENCE_EPSILON: f64 = 1e-7;

const POSITIONS_LAYOUT: &str = "[n_res, 37, 3]";

/// An atom37 protein structure, the unit handed to the PDB grammar.
///
/// Every per-residue array shares the leading dimension `n_res`; the atom axis
/// is always [`ATOM_TYPE_NUM`] long.
#[derive(Debug, Clone, PartialEq)]
pub struct Protein {
    pub atom_positions: Array3<f64>, // [n_res, 37, 3], in angstroms
    pub atom_mask: Array2<bool>,     // [n_res, 37]
    pub aatype: Array1<usize>,       // [n_res], index into `RESTYPES`, 20 = unknown
    pub residue_index: Array1<i64>,  // [n_res], residue numbers written to the PDB
    pub chain_index: Array1<usize>,  // [n_res], index into `PDB_CHAIN_IDS`
    pub b_factors: Array2<f64>,      // [n_res, 37]
}

impl Protein {
    pub fn num_residues(&self) -> usize {
        self.aatype.len()
    }

    pub fn num_atoms(&self) -> usize {
        self.atom_mask.iter().filter(|&&present| present).count()
    }

    pub fn num_chains(&self) -> usize {
        self.chain_index.iter().collect::<BTreeSet<_>>().len()
    }
}

/// Optional per-residue metadata; each missing field is defaulted on its own.
#[derive(Debug, Clone, Default)]
pub struct ResidueAnnotations<'a> {
    pub aatype: Option<ArrayView1<'a, usize>>,
    pub residue_index: Option<ArrayView1<'a, i64>>,
    pub chain_index: Option<ArrayView1<'a, usize>>,
    pub b_factors: Option<ArrayView2<'a, f64>>,
}

/// Checks that `positions` is an `[n_res, 37, 3]` array and returns it as a
/// rank-3 view.
///
/// # Errors
///
/// Returns [`ShapeError`] if the array is not rank 3, if its last axis is not 3,
/// or if its atom axis is not 37.
pub fn atom37_positions<'a>(
    positions: ArrayViewD<'a, f64>,
) -> Result<ArrayView3<'a, f64>, ShapeError> {
    let shape = positions.shape().to_vec();
    if shape.len() != 3 {
        return Err(ShapeError::Rank {
            field: "positions",
            shape,
            expected: POSITIONS_LAYOUT,
        });
    }
    if shape[2] != 3 || shape[1] != ATOM_TYPE_NUM {
        return Err(ShapeError::Mismatch {
            field: "positions",
            expected: format!("[{}, {}, 3]", shape[0], ATOM_TYPE_NUM),
            shape,
        });
    }
    positions
        .into_dimensionality::<Ix3>()
        .map_err(|_| ShapeError::Rank {
            field: "positions",
            shape,
            expected: POSITIONS_LAYOUT,
        })
}

/// Marks the atom37 slots whose coordinates are not all (close to) zero.
pub fn atom37_mask_from_positions(positions: ArrayView3<'_, f64>) -> Array2<bool> {
    positions
        .mapv(f64::abs)
        .sum_axis(Axis(2))
        .mapv(|magnitude| magnitude > ATOM_PRESENCE_EPSILON)
}

/// Builds a [`Protein`] from raw atom37 arrays, filling in defaults for any
/// annotation that was not supplied.
///
/// Defaults: every residue is of the unknown type, residues are numbered
/// `0..n_res`, all residues sit on the first chain, and b-factors are zero.
///
/// # Errors
///
/// Returns [`ShapeError`] if `positions` is not `[n_res, 37, 3]` (checked
/// first), or if the mask or any supplied annotation does not match `n_res`.
pub fn assemble_protein(
    positions: ArrayViewD<'_, f64>,
    atom_mask: ArrayView2<'_, bool>,
    annotations: &ResidueAnnotations<'_>,
) -> Result<Protein, ShapeError> {
    let positions = atom37_positions(positions)?;
    let n = positions.len_of(Axis(0));

    ensure_shape("atom_mask", atom_mask.shape(), &[n, ATOM_TYPE_NUM])?;

    let aatype = match &annotations.aatype {
        Some(aatype) => {
            ensure_shape("aatype", aatype.shape(), &[n])?;
            aatype.to_owned()
        }
        None => Array1::from_elem(n, UNK_RESTYPE_INDEX),
    };
    let residue_index = match &annotations.residue_index {
        Some(residue_index) => {
            ensure_shape("residue_index", residue_index.shape(), &[n])?;
            residue_index.to_owned()
        }
        None => (0..n as i64).collect(),
    };
    let chain_index = match &annotations.chain_index {
        Some(chain_index) => {
            ensure_shape("chain_index", chain_index.shape(), &[n])?;
            chain_index.to_owned()
        }
        None => Array1::zeros(n),
    };
    let b_factors = match &annotations.b_factors {
        Some(b_factors) => {
            ensure_shape("b_factors", b_factors.shape(), &[n, ATOM_TYPE_NUM])?;
            b_factors.to_owned()
        }
        None => Array2::zeros((n, ATOM_TYPE_NUM)),
    };

    Ok(Protein {
        atom_positions: positions.to_owned(),
        atom_mask: atom_mask.to_owned(),
        aatype,
        residue_index,
        chain_index,
        b_factors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn, array};

    fn zeros_dyn(shape: &[usize]) -> Array<f64, IxDyn> {
        Array::zeros(IxDyn(shape))
    }

    #[test]
    fn mask_marks_only_atoms_with_nonzero_coordinates() {
        let mut positions = Array3::<f64>::zeros((2, 37, 3));
        positions[[0, 0, 0]] = 1.0;
        positions[[0, 0, 1]] = 2.0;
        positions[[0, 0, 2]] = 3.0;

        let mask = atom37_mask_from_positions(positions.view());

        assert_eq!(mask.shape(), &[2, 37]);
        assert!(mask[[0, 0]]);
        assert_eq!(mask.iter().filter(|&&m| m).count(), 1);
    }

    #[test]
    fn mask_ignores_coordinates_below_epsilon() {
        let mut positions = Array3::<f64>::zeros((1, 37, 3));
        positions[[0, 1, 0]] = 1e-8;
        positions[[0, 2, 2]] = -1e-3;

        let mask = atom37_mask_from_positions(positions.view());

        assert!(!mask[[0, 1]]);
        assert!(mask[[0, 2]]);
    }

    #[test]
    fn assemble_fills_defaults_for_missing_annotations() {
        let positions = zeros_dyn(&[3, 37, 3]);
        let mask = Array2::from_elem((3, 37), false);

        let protein =
            assemble_protein(positions.view(), mask.view(), &ResidueAnnotations::default())
                .unwrap();

        assert_eq!(protein.num_residues(), 3);
        assert_eq!(protein.aatype, array![20, 20, 20]);
        assert_eq!(protein.residue_index, array![0, 1, 2]);
        assert_eq!(protein.chain_index, array![0, 0, 0]);
        assert_eq!(protein.b_factors, Array2::<f64>::zeros((3, 37)));
        assert_eq!(protein.num_chains(), 1);
    }

    #[test]
    fn assemble_keeps_supplied_annotations_independently() {
        let positions = zeros_dyn(&[2, 37, 3]);
        let mask = Array2::from_elem((2, 37), true);
        let aatype = array![0usize, 7];
        let chain_index = array![0usize, 1];
        let annotations = ResidueAnnotations {
            aatype: Some(aatype.view()),
            chain_index: Some(chain_index.view()),
            ..Default::default()
        };

        let protein = assemble_protein(positions.view(), mask.view(), &annotations).unwrap();

        assert_eq!(protein.aatype, aatype);
        assert_eq!(protein.chain_index, chain_index);
        assert_eq!(protein.residue_index, array![0, 1]);
        assert_eq!(protein.num_atoms(), 74);
        assert_eq!(protein.num_chains(), 2);
    }

    #[test]
    fn assemble_rejects_wrong_rank() {
        let positions = zeros_dyn(&[37, 3]);
        let mask = Array2::from_elem((37, 37), false);

        let err = assemble_protein(positions.view(), mask.view(), &ResidueAnnotations::default())
            .unwrap_err();

        assert!(matches!(err, ShapeError::Rank { .. }));
        assert_eq!(err.shape(), &[37, 3]);
    }

    #[test]
    fn assemble_rejects_wrong_spatial_dimension() {
        let positions = zeros_dyn(&[2, 37, 4]);
        let mask = Array2::from_elem((2, 37), false);

        let err = assemble_protein(positions.view(), mask.view(), &ResidueAnnotations::default())
            .unwrap_err();

        assert_eq!(err.shape(), &[2, 37, 4]);
    }

    #[test]
    fn assemble_rejects_wrong_atom_dimension() {
        let positions = zeros_dyn(&[2, 14, 3]);
        let mask = Array2::from_elem((2, 14), false);

        let err = assemble_protein(positions.view(), mask.view(), &ResidueAnnotations::default())
            .unwrap_err();

        assert_eq!(err.shape(), &[2, 14, 3]);
    }

    #[test]
    fn assemble_rejects_mismatched_mask_and_annotations() {
        let positions = zeros_dyn(&[2, 37, 3]);
        let mask = Array2::from_elem((3, 37), false);
        let err = assemble_protein(positions.view(), mask.view(), &ResidueAnnotations::default())
            .unwrap_err();
        assert!(err.to_string().contains("atom_mask"));

        let mask = Array2::from_elem((2, 37), false);
        let residue_index = array![1i64, 2, 3];
        let annotations = ResidueAnnotations {
            residue_index: Some(residue_index.view()),
            ..Default::default()
        };
        let err = assemble_protein(positions.view(), mask.view(), &annotations).unwrap_err();
        assert!(err.to_string().contains("residue_index"));
        assert_eq!(err.shape(), &[3]);
    }
}
