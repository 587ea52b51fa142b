//! # Nucleotide Encoding
//!
//! 2-bit symbol codes used by every stage of the seed-extend engine.
//!
//! ```text
//! A/a → 0    C/c → 1    G/g → 2    T/t/U/u → 3
//! anything else → WILDCARD (254)
//! sequence boundary → SEPARATOR (255)
//! ```
//!
//! Wildcards never match anything (not even another wildcard) and break k-mer
//! windows. Separators reset the bit-parallel distance state.

/// Number of regular symbols in the nucleotide alphabet.
pub const ALPHABET_SIZE: usize = 4;

/// Code for ambiguous or unknown bases (N, IUPAC codes, gaps).
pub const WILDCARD: u8 = 254;

/// Code marking a boundary between sequences.
pub const SEPARATOR: u8 = 255;

/// Convert an ASCII base to its 2-bit code.
#[inline]
pub fn base_to_code(base: u8) -> u8 {
    match base {
        b'A' | b'a' => 0,
        b'C' | b'c' => 1,
        b'G' | b'g' => 2,
        b'T' | b't' | b'U' | b'u' => 3,
        _ => WILDCARD,
    }
}

/// Convert a 2-bit code back to its ASCII base (`N` for sentinels).
#[inline(always)]
pub const fn code_to_base(code: u8) -> u8 {
    match code {
        0 => b'A',
        1 => b'C',
        2 => b'G',
        3 => b'T',
        _ => b'N',
    }
}

/// True for the wildcard and separator sentinels.
#[inline(always)]
pub const fn is_special(code: u8) -> bool {
    code >= WILDCARD
}

/// Complement of a 2-bit code (A↔T, C↔G); sentinels are preserved.
#[inline(always)]
pub const fn complement_code(code: u8) -> u8 {
    if is_special(code) {
        code
    } else {
        3 - code
    }
}

/// Encode an ASCII sequence.
pub fn encode_sequence(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|&b| base_to_code(b)).collect()
}

/// Reverse complement of an encoded sequence.
pub fn reverse_complement(encoded: &[u8]) -> Vec<u8> {
    encoded.iter().rev().map(|&c| complement_code(c)).collect()
}

/// Decode an encoded sequence back to ASCII (debug output, tests).
pub fn decode_sequence(encoded: &[u8]) -> String {
    encoded.iter().map(|&c| code_to_base(c) as char).collect()
}
