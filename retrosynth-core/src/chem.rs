//! # SMILES Validity Oracle
//!
//! Structural well-formedness checking for linear-notation molecule strings.
//!
//! The oracle answers one question: does this text parse as a SMILES
//! structure? It is a pure function with no side effects, used by the
//! refinement loop to discard garbled predictor output before the (much
//! more expensive) registry lookup.
//!
//! ## Design
//! - `ValidityOracle` trait so callers and tests can swap implementations
//! - `SmilesChecker` walks the string token by token: atoms (organic
//!   subset and bracket form), bonds, branches, ring-bond digits, and
//!   dot-separated components
//! - Syntax-level only: ring bonds must pair, branches must balance,
//!   bonds must connect two atoms. Valence is not checked.

/// Structural well-formedness oracle for molecule strings
pub trait ValidityOracle: Send + Sync {
    /// Check whether the given SMILES text is structurally well-formed
    fn is_valid(&self, smiles: &str) -> bool;
}

/// Default syntactic SMILES checker
#[derive(Debug, Clone, Copy, Default)]
pub struct SmilesChecker;

impl SmilesChecker {
    pub fn new() -> Self {
        Self
    }
}

impl ValidityOracle for SmilesChecker {
    fn is_valid(&self, smiles: &str) -> bool {
        well_formed(smiles)
    }
}

/// What the previous token was - drives which tokens may follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Start,
    Atom,
    RingBond,
    Bond,
    BranchOpen,
    BranchClose,
    Dot,
}

fn well_formed(smiles: &str) -> bool {
    if smiles.is_empty() || !smiles.is_ascii() || smiles.bytes().any(|b| b.is_ascii_whitespace()) {
        return false;
    }

    let bytes = smiles.as_bytes();
    let mut i = 0;
    let mut depth = 0usize;
    let mut open_rings = [false; 100];
    let mut last = Last::Start;

    while i < bytes.len() {
        match bytes[i] {
            b'(' => {
                if !matches!(last, Last::Atom | Last::RingBond | Last::BranchClose) {
                    return false;
                }
                depth += 1;
                last = Last::BranchOpen;
                i += 1;
            }
            b')' => {
                // a branch may not be empty or end with a dangling bond
                if depth == 0 || !matches!(last, Last::Atom | Last::RingBond | Last::BranchClose) {
                    return false;
                }
                depth -= 1;
                last = Last::BranchClose;
                i += 1;
            }
            b'.' => {
                if depth != 0 || !matches!(last, Last::Atom | Last::RingBond | Last::BranchClose) {
                    return false;
                }
                last = Last::Dot;
                i += 1;
            }
            b'-' | b'=' | b'#' | b'$' | b':' | b'/' | b'\\' => {
                if !matches!(
                    last,
                    Last::Atom | Last::RingBond | Last::BranchClose | Last::BranchOpen
                ) {
                    return false;
                }
                last = Last::Bond;
                i += 1;
            }
            b'0'..=b'9' => {
                if !ring_bond(&mut open_rings, (bytes[i] - b'0') as usize, last) {
                    return false;
                }
                last = Last::RingBond;
                i += 1;
            }
            b'%' => {
                // two-digit ring bond: %nn
                if i + 2 >= bytes.len()
                    || !bytes[i + 1].is_ascii_digit()
                    || !bytes[i + 2].is_ascii_digit()
                {
                    return false;
                }
                let number = (bytes[i + 1] - b'0') as usize * 10 + (bytes[i + 2] - b'0') as usize;
                if !ring_bond(&mut open_rings, number, last) {
                    return false;
                }
                last = Last::RingBond;
                i += 3;
            }
            b'[' => {
                let close = match smiles[i + 1..].find(']') {
                    Some(offset) => i + 1 + offset,
                    None => return false,
                };
                if !bracket_atom(&smiles[i + 1..close]) {
                    return false;
                }
                last = Last::Atom;
                i = close + 1;
            }
            _ => {
                let consumed = organic_atom(&bytes[i..]);
                if consumed == 0 {
                    return false;
                }
                last = Last::Atom;
                i += consumed;
            }
        }
    }

    depth == 0
        && matches!(last, Last::Atom | Last::RingBond | Last::BranchClose)
        && !open_rings.iter().any(|open| *open)
}

/// Toggle a ring-bond number between open and closed
fn ring_bond(open_rings: &mut [bool; 100], number: usize, last: Last) -> bool {
    // ring digits attach to the preceding atom, optionally through a bond
    if !matches!(last, Last::Atom | Last::RingBond | Last::Bond) {
        return false;
    }
    open_rings[number] = !open_rings[number];
    true
}

/// Match an organic-subset atom at the head of `bytes`, returning its length
fn organic_atom(bytes: &[u8]) -> usize {
    if bytes.starts_with(b"Cl") || bytes.starts_with(b"Br") {
        return 2;
    }
    match bytes[0] {
        b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I' => 1,
        b'b' | b'c' | b'n' | b'o' | b'p' | b's' => 1,
        b'*' => 1,
        _ => 0,
    }
}

/// Validate the inside of a bracket atom:
/// isotope? symbol chirality? hcount? charge? class?
fn bracket_atom(inner: &str) -> bool {
    let bytes = inner.as_bytes();
    let mut i = 0;

    // isotope
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }

    // element symbol, aromatic symbol, or wildcard
    if i >= bytes.len() {
        return false;
    }
    if bytes[i] == b'*' {
        i += 1;
    } else if bytes[i].is_ascii_uppercase() {
        i += 1;
        if i < bytes.len() && bytes[i].is_ascii_lowercase() {
            i += 1;
        }
    } else if inner[i..].starts_with("se") || inner[i..].starts_with("as") {
        i += 2;
    } else if matches!(bytes[i], b'b' | b'c' | b'n' | b'o' | b'p' | b's') {
        i += 1;
    } else {
        return false;
    }

    // chirality: @ or @@
    if i < bytes.len() && bytes[i] == b'@' {
        i += 1;
        if i < bytes.len() && bytes[i] == b'@' {
            i += 1;
        }
    }

    // attached hydrogen count: H or Hn
    if i < bytes.len() && bytes[i] == b'H' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }

    // charge: repeated sign or sign plus magnitude
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        let sign = bytes[i];
        i += 1;
        if i < bytes.len() && bytes[i] == sign {
            while i < bytes.len() && bytes[i] == sign {
                i += 1;
            }
        } else {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
    }

    // atom class: :n
    if i < bytes.len() && bytes[i] == b':' {
        i += 1;
        if i >= bytes.len() || !bytes[i].is_ascii_digit() {
            return false;
        }
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }

    i == bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(smiles: &str) -> bool {
        SmilesChecker::new().is_valid(smiles)
    }

    #[test]
    fn test_simple_chains() {
        assert!(valid("C"));
        assert!(valid("CCO"));
        assert!(valid("N#N"));
        assert!(valid("CC(C)(C)O"));
        assert!(valid("C/C=C/C"));
    }

    #[test]
    fn test_rings() {
        assert!(valid("C1=CC=CC=C1")); // benzene, kekulized
        assert!(valid("c1ccccc1")); // benzene, aromatic
        assert!(valid("C1CC1C1CC1")); // ring number reuse after closure
        assert!(valid("C%10CCCC%10")); // two-digit ring bond
    }

    #[test]
    fn test_bracket_atoms() {
        assert!(valid("[Na+].[Cl-]"));
        assert!(valid("[13CH4]"));
        assert!(valid("[C@@H](N)C(=O)O"));
        assert!(valid("[nH]1cccc1"));
        assert!(valid("[Fe+2]"));
        assert!(valid("[O-]C(=O)C"));
    }

    #[test]
    fn test_real_molecules() {
        assert!(valid("CC(=O)Oc1ccccc1C(=O)O")); // aspirin
        assert!(valid("CN1C=NC2=C1C(=O)N(C(=O)N2C)C")); // caffeine
        assert!(valid("C(C1C(C(C(C(O1)O)O)O)O)O")); // glucose
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(!valid(""));
        assert!(!valid("  "));
        assert!(!valid("C C"));
    }

    #[test]
    fn test_unbalanced_branches() {
        assert!(!valid("C("));
        assert!(!valid("C)"));
        assert!(!valid("(C)"));
        assert!(!valid("CC(C"));
        assert!(!valid("C(())"));
        assert!(!valid("C((C))"));
        assert!(!valid("C()C")); // empty branch
    }

    #[test]
    fn test_unpaired_rings() {
        assert!(!valid("C1CC"));
        assert!(!valid("c1ccccc2"));
        assert!(!valid("C%1CC%1")); // % needs exactly two digits
    }

    #[test]
    fn test_dangling_bonds() {
        assert!(!valid("C="));
        assert!(!valid("=C"));
        assert!(!valid("CC-"));
        assert!(!valid("C.=C"));
        assert!(!valid("C..C"));
        assert!(!valid("CC."));
    }

    #[test]
    fn test_unknown_atoms() {
        assert!(!valid("Si")); // silicon must be written [Si]
        assert!(!valid("Xx"));
        assert!(!valid("hello"));
        assert!(!valid("[]"));
        assert!(!valid("[C")); // unterminated bracket
        assert!(!valid("[+2]")); // charge with no symbol
    }

    #[test]
    fn test_bonded_ring_closure() {
        // a bond symbol may sit between atom and ring digit
        assert!(valid("C=1CC=CC=C1"));
    }
}
