use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use atomio::core::io::pdb::PdbFile;
use atomio::core::io::traits::StructureFile;
use atomio::core::models::protein::Protein;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub residues: usize,
    pub chains: usize,
    pub atoms: usize,
}

impl From<&Protein> for Summary {
    fn from(protein: &Protein) -> Self {
        Self {
            residues: protein.num_residues(),
            chains: protein.num_chains(),
            atoms: protein.num_atoms(),
        }
    }
}

pub fn run(args: InspectArgs) -> Result<Summary> {
    info!("Reading first model of {:?}", &args.input);
    let protein = PdbFile::read_from_path(&args.input).map_err(|e| CliError::FileParsing {
        path: args.input.clone(),
        source: e.into(),
    })?;

    let summary = Summary::from(&protein);
    info!("Parsed structure: {:?}", summary);
    println!(
        "{}: {} residue(s), {} chain(s), {} atom(s)",
        args.input.display(),
        summary.residues,
        summary.chains,
        summary.atoms
    );
    Ok(summary)
}
