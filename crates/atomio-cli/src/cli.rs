use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "atomio developers",
    version,
    about = "atomio CLI - Write atom37 coordinate arrays to PDB files and convert rigid transforms to SE(3) vectors.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write atom37 coordinates (.npy, [n_res, 37, 3] or [n_frames, n_res, 37, 3]) to a PDB file.
    Write(WriteArgs),
    /// Convert [n, 7] quaternion + translation rigids (.npy) to [n, 6] SE(3) vectors.
    Se3(Se3Args),
    /// Summarize the first model of a PDB file.
    Inspect(InspectArgs),
}

/// Arguments for the `write` subcommand.
#[derive(Args, Debug, Clone)]
pub struct WriteArgs {
    // --- Core Arguments ---
    /// Path to the atom37 coordinates in .npy format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub positions: PathBuf,

    /// Requested output path (e.g., samples/design.pdb).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    // --- Per-Residue Annotations ---
    /// Residue type codes, [n_res] integers in 0..=20 (20 = unknown).
    #[arg(long, value_name = "PATH")]
    pub aatype: Option<PathBuf>,

    /// Residue numbers written to the PDB, [n_res] integers.
    #[arg(long, value_name = "PATH")]
    pub residue_index: Option<PathBuf>,

    /// Chain indices, [n_res] integers in 0..62.
    #[arg(long, value_name = "PATH")]
    pub chain_index: Option<PathBuf>,

    /// Per-atom b-factors, [n_res, 37] floats.
    #[arg(long, value_name = "PATH")]
    pub b_factors: Option<PathBuf>,

    /// Per-residue translation added to every atom, [n_res, 3] floats.
    #[arg(long, value_name = "PATH")]
    pub coordinate_bias: Option<PathBuf>,

    // --- Output Naming ---
    /// Ignore existing files in the output directory when picking an index.
    #[arg(long)]
    pub overwrite: bool,

    /// Override `output.no-indexing` from the config file.
    #[command(flatten)]
    pub indexing: IndexingFlags,
}

/// A group to handle mutually exclusive flags for output file indexing.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct IndexingFlags {
    /// Append the next free `_<index>` to the output file name.
    #[arg(long)]
    pub indexed: bool,
    /// Write to the output path exactly as given.
    #[arg(long)]
    pub no_indexing: bool,
}

/// Arguments for the `se3` subcommand.
#[derive(Args, Debug, Clone)]
pub struct Se3Args {
    /// Path to the input array in .npy format ([n, 7] rigids, or [n, 6] with --inverse).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output .npy array.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Factor applied to translations (divided out with --inverse).
    #[arg(short, long, value_name = "FLOAT")]
    pub scale_factor: Option<f64>,

    /// Convert [n, 6] SE(3) vectors back to [n, 7] rigids.
    #[arg(long)]
    pub inverse: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Path to the PDB file.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn write_subcommand_parses_annotations_and_flags() {
        let cli = Cli::try_parse_from([
            "atomio",
            "write",
            "-p",
            "pos.npy",
            "-o",
            "out/x.pdb",
            "--aatype",
            "aa.npy",
            "--overwrite",
            "--indexed",
        ])
        .unwrap();

        match cli.command {
            Commands::Write(args) => {
                assert_eq!(args.positions, PathBuf::from("pos.npy"));
                assert_eq!(args.aatype, Some(PathBuf::from("aa.npy")));
                assert!(args.overwrite);
                assert!(args.indexing.indexed);
                assert!(!args.indexing.no_indexing);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn indexing_flags_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "atomio",
            "write",
            "-p",
            "pos.npy",
            "-o",
            "x.pdb",
            "--indexed",
            "--no-indexing",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from([
            "atomio", "se3", "-i", "r.npy", "-o", "v.npy", "-vv", "--config", "c.toml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }
}
