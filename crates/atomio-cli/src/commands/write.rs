use crate::cli::WriteArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::npy;
use atomio::core::models::protein::ResidueAnnotations;
use atomio::workflows::write::{WriteOptionsBuilder, write_prot_to_pdb};
use ndarray::{Array1, Array2, ArrayD, Ix2};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn read_optional<T>(
    path: Option<&PathBuf>,
    read: impl Fn(&Path) -> Result<T>,
) -> Result<Option<T>> {
    path.map(|p| read(p.as_path())).transpose()
}

fn read_matrix(path: &Path, field: &str) -> Result<Array2<f64>> {
    let array: ArrayD<f64> = npy::read_float_array(path)?;
    let shape = array.shape().to_vec();
    array.into_dimensionality::<Ix2>().map_err(|_| {
        CliError::Argument(format!(
            "{} in {} must be a two-dimensional array, got shape {:?}",
            field,
            path.display(),
            shape
        ))
    })
}

pub fn run(args: WriteArgs, config: &PartialConfig) -> Result<PathBuf> {
    let settings = config.merge_output(&args);
    debug!("Resolved output settings: {:?}", settings);

    info!("Loading atom37 positions from {:?}", &args.positions);
    let positions = npy::read_float_array(&args.positions)?;

    let aatype: Option<Array1<usize>> =
        read_optional(args.aatype.as_ref(), npy::read_index_vector)?;
    let residue_index: Option<Array1<i64>> =
        read_optional(args.residue_index.as_ref(), npy::read_int_vector)?;
    let chain_index: Option<Array1<usize>> =
        read_optional(args.chain_index.as_ref(), npy::read_index_vector)?;
    let b_factors = read_optional(args.b_factors.as_ref(), |p| read_matrix(p, "b_factors"))?;
    let coordinate_bias = read_optional(args.coordinate_bias.as_ref(), |p| {
        read_matrix(p, "coordinate_bias")
    })?;

    let annotations = ResidueAnnotations {
        aatype: aatype.as_ref().map(|a| a.view()),
        residue_index: residue_index.as_ref().map(|r| r.view()),
        chain_index: chain_index.as_ref().map(|c| c.view()),
        b_factors: b_factors.as_ref().map(|b| b.view()),
    };

    let mut builder = WriteOptionsBuilder::new()
        .overwrite(settings.overwrite)
        .no_indexing(settings.no_indexing);
    if let Some(bias) = &coordinate_bias {
        builder = builder.coordinate_bias(bias.view());
    }
    let options = builder.build();

    let saved = write_prot_to_pdb(positions.view(), &args.output, &annotations, &options)?;
    println!("Wrote PDB file: {}", saved.display());
    Ok(saved)
}
