use crate::cli::Se3Args;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::npy;
use atomio::core::utils::geometry::{rigids_to_se3_vec, se3_vec_to_rigids};
use ndarray::Ix2;
use tracing::info;

pub fn run(args: Se3Args, config: &PartialConfig) -> Result<()> {
    let scale_factor = config.merge_scale_factor(args.scale_factor)?;

    info!("Loading transforms from {:?}", &args.input);
    let input = npy::read_float_array(&args.input)?;
    let shape = input.shape().to_vec();
    let input = input.into_dimensionality::<Ix2>().map_err(|_| {
        CliError::Argument(format!(
            "{} must be a two-dimensional array, got shape {:?}",
            args.input.display(),
            shape
        ))
    })?;

    let output = if args.inverse {
        info!(
            "Converting {} SE(3) vectors to rigids (scale factor {})",
            input.nrows(),
            scale_factor
        );
        se3_vec_to_rigids(input.view(), scale_factor)?
    } else {
        info!(
            "Converting {} rigids to SE(3) vectors (scale factor {})",
            input.nrows(),
            scale_factor
        );
        rigids_to_se3_vec(input.view(), scale_factor)?
    };

    npy::write_float_array(&args.output, &output.into_dyn())?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};
    use ndarray_npy::{read_npy, write_npy};
    use std::f64::consts::FRAC_PI_2;
    use std::path::Path;
    use tempfile::tempdir;

    fn se3_args(dir: &Path, inverse: bool, scale_factor: Option<f64>) -> Se3Args {
        Se3Args {
            input: dir.join("in.npy"),
            output: dir.join("out.npy"),
            scale_factor,
            inverse,
        }
    }

    #[test]
    fn converts_rigids_and_scales_translation() {
        let dir = tempdir().unwrap();
        let half = FRAC_PI_2 / 2.0;
        let rigids = array![[0.0, 0.0, half.sin(), half.cos(), 10.0, 20.0, 30.0]];
        write_npy(dir.path().join("in.npy"), &rigids).unwrap();

        run(se3_args(dir.path(), false, Some(0.1)), &PartialConfig::default()).unwrap();

        let out: Array2<f64> = read_npy(dir.path().join("out.npy")).unwrap();
        assert_eq!(out.dim(), (1, 6));
        assert!((out[[0, 2]] - FRAC_PI_2).abs() < 1e-9);
        assert!((out[[0, 3]] - 1.0).abs() < 1e-9);
        assert!((out[[0, 5]] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn inverse_restores_rigids() {
        let dir = tempdir().unwrap();
        let se3 = array![[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]];
        write_npy(dir.path().join("in.npy"), &se3).unwrap();

        run(se3_args(dir.path(), true, Some(2.0)), &PartialConfig::default()).unwrap();

        let out: Array2<f64> = read_npy(dir.path().join("out.npy")).unwrap();
        assert_eq!(out.dim(), (1, 7));
        assert!((out[[0, 3]] - 1.0).abs() < 1e-12);
        assert!((out[[0, 4]] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn wrong_width_is_a_shape_error() {
        let dir = tempdir().unwrap();
        write_npy(dir.path().join("in.npy"), &Array2::<f64>::zeros((2, 6))).unwrap();

        let err = run(se3_args(dir.path(), false, None), &PartialConfig::default()).unwrap_err();

        assert!(matches!(err, CliError::Shape(_)));
        assert!(!dir.path().join("out.npy").exists());
    }
}
