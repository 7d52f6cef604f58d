use crate::error::{CliError, Result};
use ndarray::{Array1, ArrayD, Ix1};
use ndarray_npy::{ReadNpyError, read_npy, write_npy};
use std::path::Path;
use tracing::debug;

fn parsing_error(path: &Path, source: ReadNpyError) -> CliError {
    CliError::FileParsing {
        path: path.to_path_buf(),
        source: source.into(),
    }
}

/// Reads a float array of any rank, widening `f32` files to `f64`.
pub fn read_float_array(path: &Path) -> Result<ArrayD<f64>> {
    match read_npy::<_, ArrayD<f64>>(path) {
        Ok(array) => {
            debug!("Loaded f64 array {:?} from {:?}", array.shape(), path);
            Ok(array)
        }
        Err(ReadNpyError::WrongDescriptor(_)) => {
            let array = read_npy::<_, ArrayD<f32>>(path).map_err(|e| parsing_error(path, e))?;
            debug!("Loaded f32 array {:?} from {:?}", array.shape(), path);
            Ok(array.mapv(f64::from))
        }
        Err(e) => Err(parsing_error(path, e)),
    }
}

/// Reads a one-dimensional integer array, widening `i32` files to `i64`.
pub fn read_int_vector(path: &Path) -> Result<Array1<i64>> {
    let array = match read_npy::<_, ArrayD<i64>>(path) {
        Ok(array) => array,
        Err(ReadNpyError::WrongDescriptor(_)) => read_npy::<_, ArrayD<i32>>(path)
            .map_err(|e| parsing_error(path, e))?
            .mapv(i64::from),
        Err(e) => return Err(parsing_error(path, e)),
    };
    let shape = array.shape().to_vec();
    array.into_dimensionality::<Ix1>().map_err(|_| {
        CliError::Argument(format!(
            "{} must be a one-dimensional array, got shape {:?}",
            path.display(),
            shape
        ))
    })
}

/// Reads a one-dimensional array of non-negative codes (residue types, chain indices).
pub fn read_index_vector(path: &Path) -> Result<Array1<usize>> {
    let values = read_int_vector(path)?;
    values
        .iter()
        .map(|&v| {
            usize::try_from(v).map_err(|_| {
                CliError::Argument(format!(
                    "{} contains a negative index ({})",
                    path.display(),
                    v
                ))
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Array1::from)
}

pub fn write_float_array(path: &Path, array: &ArrayD<f64>) -> Result<()> {
    write_npy(path, array).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};
    use tempfile::tempdir;

    #[test]
    fn f32_arrays_are_widened() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pos.npy");
        let original: Array2<f32> = array![[1.5, -2.0], [0.25, 4.0]];
        write_npy(&path, &original).unwrap();

        let loaded = read_float_array(&path).unwrap();

        assert_eq!(loaded.shape(), &[2, 2]);
        assert_eq!(loaded[[1, 0]], 0.25);
    }

    #[test]
    fn i32_and_i64_vectors_both_load() {
        let dir = tempdir().unwrap();
        let narrow = dir.path().join("narrow.npy");
        let wide = dir.path().join("wide.npy");
        write_npy(&narrow, &array![3i32, -1]).unwrap();
        write_npy(&wide, &array![7i64, 8]).unwrap();

        assert_eq!(read_int_vector(&narrow).unwrap(), array![3i64, -1]);
        assert_eq!(read_int_vector(&wide).unwrap(), array![7i64, 8]);
    }

    #[test]
    fn negative_codes_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chains.npy");
        write_npy(&path, &array![0i64, -2]).unwrap();

        let err = read_index_vector(&path).unwrap_err();

        assert!(matches!(err, CliError::Argument(_)));
    }

    #[test]
    fn matrices_are_not_accepted_as_vectors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aatype.npy");
        write_npy(&path, &Array2::<i64>::zeros((2, 2))).unwrap();

        assert!(matches!(
            read_index_vector(&path),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn missing_files_report_their_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.npy");

        let err = read_float_array(&path).unwrap_err();

        assert!(matches!(err, CliError::FileParsing { .. }));
        assert!(err.to_string().contains("absent.npy"));
    }

    #[test]
    fn written_arrays_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.npy");
        let values = array![[1.0, 2.0, 3.0]].into_dyn();

        write_float_array(&path, &values).unwrap();

        assert_eq!(read_float_array(&path).unwrap(), values);
    }
}
