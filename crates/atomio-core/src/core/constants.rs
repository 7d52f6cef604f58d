use phf::{Map, phf_map};

/// Heavy-atom names of the atom37 layout, in slot order.
pub const ATOM_TYPES: [&str; 37] = [
    "N", "CA", "C", "CB", "O", "CG", "CG1", "CG2", "OG", "OG1", "SG", "CD", "CD1", "CD2", "ND1",
    "ND2", "OD1", "OD2", "SD", "CE", "CE1", "CE2", "CE3", "NE", "NE1", "NE2", "OE1", "OE2", "CH2",
    "NH1", "NH2", "OH", "CZ", "CZ2", "CZ3", "NZ", "OXT",
];

pub const ATOM_TYPE_NUM: usize = 37;

/// One-letter residue codes in `aatype` order.
pub const RESTYPES: [&str; 20] = [
    "A", "R", "N", "D", "C", "Q", "E", "G", "H", "I", "L", "K", "M", "F", "P", "S", "T", "W", "Y",
    "V",
];

pub const RESTYPE_NUM: usize = 20;

/// `aatype` code of an unknown residue (`X` / `UNK`).
pub const UNK_RESTYPE_INDEX: usize = RESTYPE_NUM;

pub const UNK_RESIDUE_NAME: &str = "UNK";

pub const PDB_CHAIN_IDS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub const PDB_MAX_CHAINS: usize = 62;

static ATOM_ORDER: Map<&'static str, usize> = phf_map! {
    "N" => 0, "CA" => 1, "C" => 2, "CB" => 3, "O" => 4, "CG" => 5, "CG1" => 6, "CG2" => 7,
    "OG" => 8, "OG1" => 9, "SG" => 10, "CD" => 11, "CD1" => 12, "CD2" => 13, "ND1" => 14,
    "ND2" => 15, "OD1" => 16, "OD2" => 17, "SD" => 18, "CE" => 19, "CE1" => 20, "CE2" => 21,
    "CE3" => 22, "NE" => 23, "NE1" => 24, "NE2" => 25, "OE1" => 26, "OE2" => 27, "CH2" => 28,
    "NH1" => 29, "NH2" => 30, "OH" => 31, "CZ" => 32, "CZ2" => 33, "CZ3" => 34, "NZ" => 35,
    "OXT" => 36,
};

static RESTYPE_1TO3: Map<&'static str, &'static str> = phf_map! {
    "A" => "ALA", "R" => "ARG", "N" => "ASN", "D" => "ASP", "C" => "CYS",
    "Q" => "GLN", "E" => "GLU", "G" => "GLY", "H" => "HIS", "I" => "ILE",
    "L" => "LEU", "K" => "LYS", "M" => "MET", "F" => "PHE", "P" => "PRO",
    "S" => "SER", "T" => "THR", "W" => "TRP", "Y" => "TYR", "V" => "VAL",
};

static RESTYPE_3TO1: Map<&'static str, &'static str> = phf_map! {
    "ALA" => "A", "ARG" => "R", "ASN" => "N", "ASP" => "D", "CYS" => "C",
    "GLN" => "Q", "GLU" => "E", "GLY" => "G", "HIS" => "H", "ILE" => "I",
    "LEU" => "L", "LYS" => "K", "MET" => "M", "PHE" => "F", "PRO" => "P",
    "SER" => "S", "THR" => "T", "TRP" => "W", "TYR" => "Y", "VAL" => "V",
};

/// Slot of a heavy atom in the atom37 layout.
pub fn atom_order(atom_name: &str) -> Option<usize> {
    ATOM_ORDER.get(atom_name.trim()).copied()
}

/// Three-letter residue name for an `aatype` code; `UNK` for the unknown code.
///
/// Returns `None` for codes past the unknown code, which cannot be encoded.
pub fn restype_3letter(aatype: usize) -> Option<&'static str> {
    match RESTYPES.get(aatype) {
        Some(one_letter) => RESTYPE_1TO3.get(one_letter).copied(),
        None if aatype == UNK_RESTYPE_INDEX => Some(UNK_RESIDUE_NAME),
        None => None,
    }
}

/// `aatype` code for a three-letter residue name, falling back to the unknown code.
pub fn restype_index(residue_name: &str) -> usize {
    RESTYPE_3TO1
        .get(residue_name.trim())
        .and_then(|one_letter| RESTYPES.iter().position(|r| r == one_letter))
        .unwrap_or(UNK_RESTYPE_INDEX)
}

pub fn chain_id(chain_index: usize) -> Option<char> {
    PDB_CHAIN_IDS.chars().nth(chain_index)
}
