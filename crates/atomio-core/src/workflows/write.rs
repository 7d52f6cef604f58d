use super::error::WriteError;
use crate::core::io::pdb::PdbFile;
use crate::core::models::protein::{
    ResidueAnnotations, assemble_protein, atom37_mask_from_positions, atom37_positions,
};
use crate::core::models::shape::{ShapeError, ensure_shape};
use ndarray::{ArrayView2, ArrayViewD, Axis};
use regex::Regex;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, instrument, trace};

const PDB_EXTENSION: &str = ".pdb";
const END_RECORD: &[u8] = b"END";

#[derive(Debug, Clone)]
pub struct WriteOptions<'a> {
    /// Per-residue `[n_res, 3]` offset added to every atom of the residue.
    pub coordinate_bias: Option<ArrayView2<'a, f64>>,
    /// Skip the directory scan and treat the existing index as 0.
    pub overwrite: bool,
    /// Write to the requested path verbatim instead of `<base>_<index>.pdb`.
    pub no_indexing: bool,
}

impl Default for WriteOptions<'_> {
    fn default() -> Self {
        Self {
            coordinate_bias: None,
            overwrite: false,
            no_indexing: true,
        }
    }
}

#[derive(Default)]
pub struct WriteOptionsBuilder<'a> {
    coordinate_bias: Option<ArrayView2<'a, f64>>,
    overwrite: Option<bool>,
    no_indexing: Option<bool>,
}

impl<'a> WriteOptionsBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coordinate_bias(mut self, bias: ArrayView2<'a, f64>) -> Self {
        self.coordinate_bias = Some(bias);
        self
    }
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = Some(overwrite);
        self
    }
    pub fn no_indexing(mut self, no_indexing: bool) -> Self {
        self.no_indexing = Some(no_indexing);
        self
    }

    pub fn build(self) -> WriteOptions<'a> {
        let defaults = WriteOptions::default();
        WriteOptions {
            coordinate_bias: self.coordinate_bias,
            overwrite: self.overwrite.unwrap_or(defaults.overwrite),
            no_indexing: self.no_indexing.unwrap_or(defaults.no_indexing),
        }
    }
}

/// Writes atom37 coordinates to a PDB file and returns the path written.
///
/// `prot_pos` is either a single structure `[n_res, 37, 3]` (written as model 1)
/// or a stack of frames `[n_frames, n_res, 37, 3]` (written as models
/// `1..=n_frames`). For every frame the atom mask is derived from the raw
/// coordinates before `coordinate_bias` is applied. The annotations are shared
/// by all frames. The file ends with a bare `END` and no trailing newline.
///
/// # Errors
///
/// Returns [`WriteError::Shape`] or [`WriteError::Pdb`] before any filesystem
/// access if the input cannot be encoded, and [`WriteError::Io`] for failures
/// while creating directories, scanning, or writing.
#[instrument(skip_all, name = "write_pdb_workflow", fields(path = %file_path.display()))]
pub fn write_prot_to_pdb(
    prot_pos: ArrayViewD<'_, f64>,
    file_path: &Path,
    annotations: &ResidueAnnotations<'_>,
    options: &WriteOptions<'_>,
) -> Result<PathBuf, WriteError> {
    let models = render_models(prot_pos, annotations, options.coordinate_bias.as_ref())?;
    let save_path = resolve_save_path(file_path, options.overwrite, options.no_indexing)?;

    let file = File::create(&save_path)?;
    let mut writer = BufWriter::new(file);
    for model in &models {
        writer.write_all(model.as_bytes())?;
    }
    writer.write_all(END_RECORD)?;
    writer.flush()?;

    info!(
        "Wrote {} model(s) to {}",
        models.len(),
        save_path.display()
    );
    Ok(save_path)
}

fn render_models(
    prot_pos: ArrayViewD<'_, f64>,
    annotations: &ResidueAnnotations<'_>,
    coordinate_bias: Option<&ArrayView2<'_, f64>>,
) -> Result<Vec<String>, WriteError> {
    match prot_pos.ndim() {
        4 => prot_pos
            .outer_iter()
            .enumerate()
            .map(|(t, frame)| render_frame(frame, t + 1, annotations, coordinate_bias))
            .collect(),
        3 => Ok(vec![render_frame(
            prot_pos,
            1,
            annotations,
            coordinate_bias,
        )?]),
        _ => Err(ShapeError::Rank {
            field: "positions",
            shape: prot_pos.shape().to_vec(),
            expected: "[n_res, 37, 3] or [n_frames, n_res, 37, 3]",
        }
        .into()),
    }
}

fn render_frame(
    frame: ArrayViewD<'_, f64>,
    model: usize,
    annotations: &ResidueAnnotations<'_>,
    coordinate_bias: Option<&ArrayView2<'_, f64>>,
) -> Result<String, WriteError> {
    let frame = atom37_positions(frame)?;
    let atom_mask = atom37_mask_from_positions(frame);

    let mut positions = frame.to_owned();
    if let Some(bias) = coordinate_bias {
        ensure_shape(
            "coordinate_bias",
            bias.shape(),
            &[positions.len_of(Axis(0)), 3],
        )?;
        positions += &bias.view().insert_axis(Axis(1));
    }

    let protein = assemble_protein(positions.view().into_dyn(), atom_mask.view(), annotations)?;
    trace!(
        "Rendering model {} with {} residues and {} atoms",
        model,
        protein.num_residues(),
        protein.num_atoms()
    );
    Ok(PdbFile::to_pdb_string(&protein, model, false)?)
}

/// Picks the output path for a write.
///
/// Unless `overwrite` is set, the destination directory is created if needed
/// and scanned for `<base>_<index>.pdb` siblings. With `no_indexing` the scan
/// result is discarded and `file_path` is returned unchanged; otherwise the
/// path gets the next index after the largest one found.
///
/// # Errors
///
/// Returns [`WriteError::MissingFileName`] if `file_path` names a directory,
/// [`WriteError::IndexOverflow`] if the largest existing index has no
/// successor in `u64`, and [`WriteError::Io`] if the directory cannot be
/// created or listed.
pub fn resolve_save_path(
    file_path: &Path,
    overwrite: bool,
    no_indexing: bool,
) -> Result<PathBuf, WriteError> {
    if !names_a_file(file_path) {
        return Err(WriteError::MissingFileName {
            path: file_path.to_path_buf(),
        });
    }

    let (max_existing_idx, max_source) = if overwrite {
        (0, None)
    } else {
        scan_max_existing_index(file_path)?
    };

    if no_indexing {
        return Ok(file_path.to_path_buf());
    }

    let next_idx = max_existing_idx
        .checked_add(1)
        .ok_or_else(|| WriteError::IndexOverflow {
            file_name: max_source.unwrap_or_default(),
        })?;
    let indexed = file_path.with_file_name(format!(
        "{}_{}{}",
        base_name(file_path),
        next_idx,
        PDB_EXTENSION
    ));
    debug!("Resolved indexed output path {}", indexed.display());
    Ok(indexed)
}

fn names_a_file(file_path: &Path) -> bool {
    file_path.file_name().is_some()
        && !file_path
            .as_os_str()
            .to_string_lossy()
            .ends_with(std::path::is_separator)
}

fn base_name(file_path: &Path) -> String {
    let name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(PDB_EXTENSION) {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Returns the largest index among the siblings of `file_path`, together with
/// the name of the file it was read from.
fn scan_max_existing_index(file_path: &Path) -> io::Result<(u64, Option<String>)> {
    let dir = file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if !dir.exists() {
        debug!("Creating output directory {}", dir.display());
        fs::create_dir_all(dir)?;
    }

    let base = base_name(file_path);
    let mut max_idx = 0;
    let mut max_source = None;
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if !name.contains(base.as_str()) {
            continue;
        }
        if let Some(idx) = parse_index_suffix(&name) {
            if idx > max_idx {
                max_idx = idx;
                max_source = Some(name.into_owned());
            }
        }
    }
    debug!(
        "Largest existing index for '{}' in {}: {}",
        base,
        dir.display(),
        max_idx
    );
    Ok((max_idx, max_source))
}

static INDEX_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\d+).pdb").expect("index suffix pattern is valid"));

static DECIMAL_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d$").expect("decimal digit pattern is valid"));

/// Reads the digits of the first `_<digits><any char>pdb` in a file name.
///
/// Any Unicode decimal digit counts. Indices too large for `u64` saturate to
/// `u64::MAX`, which has no successor.
fn parse_index_suffix(name: &str) -> Option<u64> {
    let digits = INDEX_SUFFIX.captures(name)?.get(1)?.as_str();
    Some(
        digits
            .chars()
            .map(decimal_digit_value)
            .try_fold(0u64, |acc, d| acc.checked_mul(10)?.checked_add(d))
            .unwrap_or(u64::MAX),
    )
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut buf))
}

fn decimal_digit_value(c: char) -> u64 {
    if let Some(d) = c.to_digit(10) {
        return u64::from(d);
    }
    // Decimal digits are encoded in contiguous runs of whole 0..=9 blocks.
    let mut zero = c;
    while let Some(prev) = (zero as u32)
        .checked_sub(1)
        .and_then(char::from_u32)
        .filter(|&p| is_decimal_digit(p))
    {
        zero = prev;
    }
    u64::from((c as u32 - zero as u32) % 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn parse_index_suffix_reads_trailing_index() {
        assert_eq!(parse_index_suffix("run_12.pdb"), Some(12));
        assert_eq!(parse_index_suffix("run_0.pdb"), Some(0));
    }

    #[test]
    fn parse_index_suffix_skips_names_without_pattern() {
        assert_eq!(parse_index_suffix("run.pdb"), None);
        assert_eq!(parse_index_suffix("run_.pdb"), None);
        assert_eq!(parse_index_suffix("run_3.cif"), None);
    }

    #[test]
    fn parse_index_suffix_takes_first_match_from_the_left() {
        assert_eq!(parse_index_suffix("a_1_2.pdb"), Some(2));
        assert_eq!(parse_index_suffix("run_3.pdb.bak"), Some(3));
        assert_eq!(parse_index_suffix("run_7_sample_9.pdb"), Some(9));
    }

    #[test]
    fn parse_index_suffix_treats_separator_as_any_character() {
        assert_eq!(parse_index_suffix("run_5xpdb"), Some(5));
        assert_eq!(parse_index_suffix("run_123pdb"), Some(12));
    }

    #[test]
    fn parse_index_suffix_accepts_unicode_decimal_digits() {
        assert_eq!(parse_index_suffix("run_\u{FF17}.pdb"), Some(7));
        assert_eq!(parse_index_suffix("run_\u{0661}\u{0662}.pdb"), Some(12));
        assert_eq!(parse_index_suffix("run_\u{1D7D9}.pdb"), Some(1));
    }

    #[test]
    fn parse_index_suffix_saturates_indices_beyond_u64() {
        assert_eq!(
            parse_index_suffix("run_18446744073709551615.pdb"),
            Some(u64::MAX)
        );
        assert_eq!(
            parse_index_suffix("run_99999999999999999999999.pdb"),
            Some(u64::MAX)
        );
    }

    #[test]
    fn index_without_successor_is_an_error() {
        for name in ["run_18446744073709551615.pdb", "run_99999999999999999999999.pdb"] {
            let dir = tempdir().unwrap();
            touch(dir.path(), "run_2.pdb");
            touch(dir.path(), name);

            let err = resolve_save_path(&dir.path().join("run.pdb"), false, false).unwrap_err();

            match err {
                WriteError::IndexOverflow { file_name } => assert_eq!(file_name, name),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn index_without_successor_is_ignored_when_not_indexing() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "run_18446744073709551615.pdb");
        let requested = dir.path().join("run.pdb");

        let path = resolve_save_path(&requested, false, true).unwrap();

        assert_eq!(path, requested);
    }

    #[test]
    fn directory_destination_is_rejected_before_any_filesystem_access() {
        let dir = tempdir().unwrap();
        let requested = PathBuf::from(format!("{}/out/", dir.path().display()));

        let err = resolve_save_path(&requested, false, false).unwrap_err();

        assert!(matches!(err, WriteError::MissingFileName { .. }));
        assert!(err.is_validation());
        assert!(!dir.path().join("out").exists());
        assert!(matches!(
            resolve_save_path(Path::new("/"), true, true),
            Err(WriteError::MissingFileName { .. })
        ));
    }

    #[test]
    fn base_name_strips_only_the_pdb_suffix() {
        assert_eq!(base_name(Path::new("out/bpd_run.pdb")), "bpd_run");
        assert_eq!(base_name(Path::new("out/run")), "run");
    }

    #[test]
    fn auto_index_continues_after_largest_existing_index() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "run_1.pdb");
        touch(dir.path(), "run_3.pdb");
        touch(dir.path(), "other_9.pdb");

        let path = resolve_save_path(&dir.path().join("run.pdb"), false, false).unwrap();

        assert_eq!(path, dir.path().join("run_4.pdb"));
    }

    #[test]
    fn auto_index_starts_at_one_in_empty_directory() {
        let dir = tempdir().unwrap();
        let path = resolve_save_path(&dir.path().join("run.pdb"), false, false).unwrap();
        assert_eq!(path, dir.path().join("run_1.pdb"));
    }

    #[test]
    fn overwrite_ignores_existing_indices() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "run_5.pdb");

        let path = resolve_save_path(&dir.path().join("run.pdb"), true, false).unwrap();

        assert_eq!(path, dir.path().join("run_1.pdb"));
    }

    #[test]
    fn no_indexing_keeps_requested_path_and_still_creates_directory() {
        let dir = tempdir().unwrap();
        let requested = dir.path().join("nested/deeper/x.pdb");

        let path = resolve_save_path(&requested, false, true).unwrap();

        assert_eq!(path, requested);
        assert!(dir.path().join("nested/deeper").is_dir());
    }

    #[test]
    fn overwrite_skips_directory_creation() {
        let dir = tempdir().unwrap();
        let requested = dir.path().join("missing/x.pdb");

        let path = resolve_save_path(&requested, true, true).unwrap();

        assert_eq!(path, requested);
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn builder_defaults_match_write_options_defaults() {
        let options = WriteOptionsBuilder::new().build();
        assert!(!options.overwrite);
        assert!(options.no_indexing);
        assert!(options.coordinate_bias.is_none());

        let options = WriteOptionsBuilder::new()
            .overwrite(true)
            .no_indexing(false)
            .build();
        assert!(options.overwrite);
        assert!(!options.no_indexing);
    }
}
