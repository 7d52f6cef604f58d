use crate::core::constants::{
    ATOM_TYPE_NUM, ATOM_TYPES, PDB_MAX_CHAINS, atom_order, chain_id, restype_3letter,
    restype_index,
};
use crate::core::io::traits::StructureFile;
use crate::core::models::protein::Protein;
use ndarray::{Array1, Array2, Array3};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, trace};

const PDB_LINE_WIDTH: usize = 80;
const MIN_ATOM_LINE_LENGTH: usize = 54;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdbWriteOptions {
    /// Number written on the `MODEL` record.
    pub model: usize,
    /// Whether to close the output with an `END` record.
    pub add_end: bool,
}

impl Default for PdbWriteOptions {
    fn default() -> Self {
        Self {
            model: 1,
            add_end: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid residue type code {aatype} at residue {residue}")]
    InvalidResidueType { residue: usize, aatype: usize },
    #[error("The PDB format supports at most {max} chains (got chain index {index})", max = PDB_MAX_CHAINS)]
    TooManyChains { index: usize },
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for an ATOM record (must be at least 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn column_char(line: &str, column: usize) -> char {
    line.get(column..)
        .and_then(|rest| rest.chars().next())
        .unwrap_or(' ')
}

fn parse_int(line: &str, start: usize, end: usize, line_num: usize) -> Result<i64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn parse_float(line: &str, start: usize, end: usize, line_num: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn write_line(writer: &mut impl Write, line: &str) -> io::Result<()> {
    writeln!(writer, "{:<width$}", line, width = PDB_LINE_WIDTH)
}

fn atom_line(
    serial: usize,
    atom_name: &str,
    residue_name: &str,
    chain: char,
    residue_number: i64,
    position: [f64; 3],
    b_factor: f64,
) -> String {
    let name = if atom_name.len() == 4 {
        atom_name.to_string()
    } else {
        format!(" {}", atom_name)
    };
    let element = &atom_name[..1];
    format!(
        "{:<6}{:>5} {:<4}{:>1}{:>3} {:>1}{:>4}{:>1}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}{:>2}",
        "ATOM",
        serial,
        name,
        "",
        residue_name,
        chain,
        residue_number,
        "",
        position[0],
        position[1],
        position[2],
        1.00,
        b_factor,
        element,
        ""
    )
}

fn chain_end_line(serial: usize, residue_name: &str, chain: char, residue_number: i64) -> String {
    format!(
        "{:<6}{:>5}      {:>3} {:>1}{:>4}",
        "TER", serial, residue_name, chain, residue_number
    )
}

/// Resolves the residue names and chain letters of every residue, failing on
/// anything the PDB format cannot express.
fn encode_residues(protein: &Protein) -> Result<(Vec<&'static str>, Vec<char>), PdbError> {
    let names = protein
        .aatype
        .iter()
        .enumerate()
        .map(|(residue, &aatype)| {
            restype_3letter(aatype).ok_or(PdbError::InvalidResidueType { residue, aatype })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let chains = protein
        .chain_index
        .iter()
        .map(|&index| chain_id(index).ok_or(PdbError::TooManyChains { index }))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((names, chains))
}

#[derive(Debug)]
struct ParsedResidue {
    key: (char, i64, char),
    name: String,
    positions: [[f64; 3]; ATOM_TYPE_NUM],
    mask: [bool; ATOM_TYPE_NUM],
    b_factors: [f64; ATOM_TYPE_NUM],
}

impl ParsedResidue {
    fn new(key: (char, i64, char), name: &str) -> Self {
        Self {
            key,
            name: name.to_string(),
            positions: [[0.0; 3]; ATOM_TYPE_NUM],
            mask: [false; ATOM_TYPE_NUM],
            b_factors: [0.0; ATOM_TYPE_NUM],
        }
    }
}

pub struct PdbFile;

impl PdbFile {
    /// Renders one model block of `protein` as PDB text.
    ///
    /// # Errors
    ///
    /// Returns [`PdbError`] if a residue type or chain index cannot be encoded.
    pub fn to_pdb_string(protein: &Protein, model: usize, add_end: bool) -> Result<String, PdbError> {
        let mut buffer = Vec::new();
        Self::write_to(protein, &PdbWriteOptions { model, add_end }, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| PdbError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

impl StructureFile for PdbFile {
    type Options = PdbWriteOptions;
    type Error = PdbError;

    /// Reads the first model of a PDB file.
    ///
    /// Atoms are placed in their atom37 slot by name; names outside the atom37
    /// layout (hydrogens, ligands) and repeated alternate locations are skipped.
    /// Chains are numbered in order of first appearance.
    fn read_from(reader: &mut impl BufRead) -> Result<Protein, Self::Error> {
        let mut residues: Vec<ParsedResidue> = Vec::new();
        let mut chain_order: Vec<char> = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "ATOM" => {
                    if line.len() < MIN_ATOM_LINE_LENGTH {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }

                    let atom_name = slice_and_trim(&line, 12, 16);
                    let residue_name = slice_and_trim(&line, 17, 20);
                    let chain = column_char(&line, 21);
                    let residue_number = parse_int(&line, 22, 26, line_num)?;
                    let insertion_code = column_char(&line, 26);
                    let x = parse_float(&line, 30, 38, line_num)?;
                    let y = parse_float(&line, 38, 46, line_num)?;
                    let z = parse_float(&line, 46, 54, line_num)?;
                    let b_factor = if slice_and_trim(&line, 60, 66).is_empty() {
                        0.0
                    } else {
                        parse_float(&line, 60, 66, line_num)?
                    };

                    let key = (chain, residue_number, insertion_code);
                    if residues.last().is_none_or(|r| r.key != key) {
                        if !chain_order.contains(&chain) {
                            chain_order.push(chain);
                        }
                        residues.push(ParsedResidue::new(key, residue_name));
                    }

                    let Some(slot) = atom_order(atom_name) else {
                        trace!("Skipping atom '{}' on line {}: not an atom37 name", atom_name, line_num);
                        continue;
                    };
                    if let Some(residue) = residues.last_mut() {
                        if residue.mask[slot] {
                            continue;
                        }
                        residue.positions[slot] = [x, y, z];
                        residue.mask[slot] = true;
                        residue.b_factors[slot] = b_factor;
                    }
                }
                "ENDMDL" | "END" if !residues.is_empty() => break,
                _ => {}
            }
        }

        if residues.is_empty() {
            return Err(PdbError::MissingRecord("ATOM records".into()));
        }

        let n = residues.len();
        debug!(
            "Parsed {} residues across {} chains from PDB input",
            n,
            chain_order.len()
        );

        let chain_of = |c: char| chain_order.iter().position(|&o| o == c).unwrap_or(0);
        Ok(Protein {
            atom_positions: Array3::from_shape_fn((n, ATOM_TYPE_NUM, 3), |(i, j, k)| {
                residues[i].positions[j][k]
            }),
            atom_mask: Array2::from_shape_fn((n, ATOM_TYPE_NUM), |(i, j)| residues[i].mask[j]),
            aatype: residues.iter().map(|r| restype_index(&r.name)).collect::<Array1<_>>(),
            residue_index: residues.iter().map(|r| r.key.1).collect::<Array1<_>>(),
            chain_index: residues.iter().map(|r| chain_of(r.key.0)).collect::<Array1<_>>(),
            b_factors: Array2::from_shape_fn((n, ATOM_TYPE_NUM), |(i, j)| residues[i].b_factors[j]),
        })
    }

    fn write_to(
        protein: &Protein,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let (residue_names, chains) = encode_residues(protein)?;
        let n = protein.num_residues();

        write_line(writer, &format!("MODEL     {}", options.model))?;

        if n > 0 {
            let mut serial = 1;
            let mut last_chain_index = protein.chain_index[0];

            for i in 0..n {
                if protein.chain_index[i] != last_chain_index {
                    write_line(
                        writer,
                        &chain_end_line(
                            serial,
                            residue_names[i - 1],
                            chains[i - 1],
                            protein.residue_index[i - 1],
                        ),
                    )?;
                    last_chain_index = protein.chain_index[i];
                    serial += 1;
                }

                for (slot, atom_name) in ATOM_TYPES.iter().enumerate() {
                    if !protein.atom_mask[[i, slot]] {
                        continue;
                    }
                    let position = [
                        protein.atom_positions[[i, slot, 0]],
                        protein.atom_positions[[i, slot, 1]],
                        protein.atom_positions[[i, slot, 2]],
                    ];
                    write_line(
                        writer,
                        &atom_line(
                            serial,
                            atom_name,
                            residue_names[i],
                            chains[i],
                            protein.residue_index[i],
                            position,
                            protein.b_factors[[i, slot]],
                        ),
                    )?;
                    serial += 1;
                }
            }

            write_line(
                writer,
                &chain_end_line(
                    serial,
                    residue_names[n - 1],
                    chains[n - 1],
                    protein.residue_index[n - 1],
                ),
            )?;
        }

        write_line(writer, "ENDMDL")?;
        if options.add_end {
            write_line(writer, "END")?;
        }
        Ok(())
    }
}
