//! Alphabet checks and Watson-Crick complements.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("invalid base '{base}' at position {position}")]
    InvalidBase { base: char, position: usize },
}

/// Complement of a single uppercase base: `A <-> T`, `G <-> C`.
#[inline]
pub fn complement(base: u8) -> Option<u8> {
    match base {
        b'A' => Some(b'T'),
        b'T' => Some(b'A'),
        b'G' => Some(b'C'),
        b'C' => Some(b'G'),
        _ => None,
    }
}

#[inline]
pub fn is_nucleotide(base: u8) -> bool {
    matches!(base, b'A' | b'C' | b'G' | b'T')
}

/// Check that every byte of `seq` is one of `ACGT`.
pub fn validate(seq: &str) -> Result<(), SequenceError> {
    match seq.bytes().position(|b| !is_nucleotide(b)) {
        None => Ok(()),
        Some(position) => Err(invalid_at(seq, position)),
    }
}

/// Reverse complement of an uppercase `ACGT` string.
///
/// ```
/// use kmerdex_bio::reverse_complement;
/// assert_eq!(reverse_complement("AAAC").unwrap(), "GTTT");
/// assert_eq!(reverse_complement("ACGT").unwrap(), "ACGT");
/// ```
pub fn reverse_complement(seq: &str) -> Result<String, SequenceError> {
    let bytes = seq.as_bytes();
    let mut out = String::with_capacity(bytes.len());
    for (offset, &b) in bytes.iter().enumerate().rev() {
        match complement(b) {
            Some(c) => out.push(c as char),
            None => return Err(invalid_at(seq, offset)),
        }
    }
    Ok(out)
}

fn invalid_at(seq: &str, position: usize) -> SequenceError {
    let base = seq
        .get(position..)
        .and_then(|rest| rest.chars().next())
        .unwrap_or('?');
    SequenceError::InvalidBase { base, position }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_complement_pairs() {
        assert_eq!(complement(b'A'), Some(b'T'));
        assert_eq!(complement(b'T'), Some(b'A'));
        assert_eq!(complement(b'G'), Some(b'C'));
        assert_eq!(complement(b'C'), Some(b'G'));
        assert_eq!(complement(b'N'), None);
        assert_eq!(complement(b'a'), None);
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("AAAC").unwrap(), "GTTT");
        assert_eq!(reverse_complement("GATTACA").unwrap(), "TGTAATC");
        assert_eq!(reverse_complement("").unwrap(), "");
    }

    #[test]
    fn test_reverse_complement_rejects_ambiguous() {
        let err = reverse_complement("ACNGT").unwrap_err();
        assert_eq!(err, SequenceError::InvalidBase { base: 'N', position: 2 });
    }

    #[test]
    fn test_validate() {
        assert!(validate("ACGTACGT").is_ok());
        assert_eq!(
            validate("ACGTx").unwrap_err(),
            SequenceError::InvalidBase { base: 'x', position: 4 }
        );
    }

    proptest! {
        #[test]
        fn prop_reverse_complement_is_involution(seq in "[ACGT]{0,64}") {
            let rc = reverse_complement(&seq).unwrap();
            prop_assert_eq!(rc.len(), seq.len());
            prop_assert_eq!(reverse_complement(&rc).unwrap(), seq);
        }
    }
}
