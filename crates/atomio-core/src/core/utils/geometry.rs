use crate::core::models::shape::ShapeError;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use ndarray::{Array2, ArrayView2, s};

const RIGID_WIDTH: usize = 7;
const SE3_VEC_WIDTH: usize = 6;

/// Converts a quaternion in scalar-last order `[x, y, z, w]` to a rotation vector.
///
/// The quaternion is normalized first; the returned angle lies in `[0, pi]`.
/// A zero quaternion has no rotation axis and yields the zero vector.
pub fn quaternion_to_rotvec(quat: [f64; 4]) -> Vector3<f64> {
    let [x, y, z, w] = quat;
    UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)).scaled_axis()
}

/// Converts a rotation vector to a unit quaternion in scalar-last order
/// `[x, y, z, w]`, with `w >= 0`.
pub fn rotvec_to_quaternion(rotvec: &Vector3<f64>) -> [f64; 4] {
    let q = UnitQuaternion::from_scaled_axis(*rotvec);
    let sign = if q.w < 0.0 { -1.0 } else { 1.0 };
    [sign * q.i, sign * q.j, sign * q.k, sign * q.w]
}

/// Converts `[n, 7]` rigid transforms (quaternion `[x, y, z, w]` then
/// translation) to `[n, 6]` SE(3) vectors (rotation vector then scaled translation).
///
/// Only the translation is scaled; quaternions are not checked for unit norm.
///
/// # Errors
///
/// Returns [`ShapeError`] if `rigids` does not have exactly 7 columns.
pub fn rigids_to_se3_vec(
    rigids: ArrayView2<'_, f64>,
    scale_factor: f64,
) -> Result<Array2<f64>, ShapeError> {
    let (n, width) = rigids.dim();
    if width != RIGID_WIDTH {
        return Err(ShapeError::Mismatch {
            field: "rigids",
            shape: vec![n, width],
            expected: format!("[{}, {}]", n, RIGID_WIDTH),
        });
    }

    let mut se3 = Array2::zeros((n, SE3_VEC_WIDTH));
    for (row, mut out) in rigids.outer_iter().zip(se3.outer_iter_mut()) {
        let rotvec = quaternion_to_rotvec([row[0], row[1], row[2], row[3]]);
        out.slice_mut(s![..3])
            .assign(&ndarray::arr1(rotvec.as_slice()));
        out.slice_mut(s![3..])
            .assign(&row.slice(s![4..]).mapv(|t| t * scale_factor));
    }
    Ok(se3)
}

/// Inverse of [`rigids_to_se3_vec`]: `[n, 6]` SE(3) vectors back to `[n, 7]`
/// rigid transforms, dividing the translation by `scale_factor`.
///
/// # Errors
///
/// Returns [`ShapeError`] if `se3` does not have exactly 6 columns.
pub fn se3_vec_to_rigids(
    se3: ArrayView2<'_, f64>,
    scale_factor: f64,
) -> Result<Array2<f64>, ShapeError> {
    let (n, width) = se3.dim();
    if width != SE3_VEC_WIDTH {
        return Err(ShapeError::Mismatch {
            field: "se3",
            shape: vec![n, width],
            expected: format!("[{}, {}]", n, SE3_VEC_WIDTH),
        });
    }

    let mut rigids = Array2::zeros((n, RIGID_WIDTH));
    for (row, mut out) in se3.outer_iter().zip(rigids.outer_iter_mut()) {
        let quat = rotvec_to_quaternion(&Vector3::new(row[0], row[1], row[2]));
        out.slice_mut(s![..4]).assign(&ndarray::arr1(&quat));
        out.slice_mut(s![4..])
            .assign(&row.slice(s![3..]).mapv(|t| t / scale_factor));
    }
    Ok(rigids)
}
