//! Sample identifiers as stored in k-mer documents

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Numeric identifier of a sequenced sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleId(pub u64);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid sample id '{0}'")]
pub struct SampleIdError(pub String);

impl SampleId {
    /// Zero-padded form used inside index documents, e.g. `00000042`
    pub fn padded(&self, width: usize) -> String {
        format!("{:0width$}", self.0, width = width)
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SampleId {
    type Err = SampleIdError;

    /// Accepts both plain and zero-padded digits
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SampleIdError(s.to_string()));
        }
        trimmed
            .parse::<u64>()
            .map(SampleId)
            .map_err(|_| SampleIdError(s.to_string()))
    }
}

impl From<u64> for SampleId {
    fn from(id: u64) -> Self {
        SampleId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded() {
        assert_eq!(SampleId(42).padded(8), "00000042");
        assert_eq!(SampleId(123456789).padded(8), "123456789");
    }

    #[test]
    fn test_parse_padded_and_plain() {
        assert_eq!("00000042".parse::<SampleId>().unwrap(), SampleId(42));
        assert_eq!("42".parse::<SampleId>().unwrap(), SampleId(42));
        assert_eq!("00000000".parse::<SampleId>().unwrap(), SampleId(0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<SampleId>().is_err());
        assert!("-5".parse::<SampleId>().is_err());
        assert!("12a".parse::<SampleId>().is_err());
    }
}
