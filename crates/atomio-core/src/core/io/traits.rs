use crate::core::models::protein::Protein;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing protein structure file formats.
///
/// Implementors handle format-specific parsing and serialization; the
/// path-based methods are provided on top of the reader/writer ones.
pub trait StructureFile {
    /// Format-specific knobs for writing (e.g. the model number of a PDB block).
    type Options: Default;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a protein from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Protein, Self::Error>;

    /// Writes a protein to a writer.
    ///
    /// # Arguments
    ///
    /// * `protein` - The protein to write.
    /// * `options` - Format-specific write options.
    /// * `writer` - The writer to output to.
    ///
    /// # Errors
    ///
    /// Returns an error if the protein cannot be encoded in the format or
    /// writing fails.
    fn write_to(
        protein: &Protein,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Reads a protein from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Protein, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a protein to a file path, creating or truncating the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        protein: &Protein,
        options: &Self::Options,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(protein, options, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes a protein to a file path with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_default_to_path<P: AsRef<Path>>(
        protein: &Protein,
        path: P,
    ) -> Result<(), Self::Error> {
        Self::write_to_path(protein, &Self::Options::default(), path)
    }
}
