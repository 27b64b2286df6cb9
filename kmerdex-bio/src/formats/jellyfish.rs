//! K-mer count dumps, one record per line.
//!
//! `jellyfish dump -c` writes `kmer<WS>count`; `sort | uniq -c` writes
//! `count<WS>kmer`. [`CountLayout`] picks the column order.

use super::counts::CorpusError;
use std::io::BufRead;

/// Column order of a count dump
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountLayout {
    /// `kmer<WS>count`
    #[default]
    KmerFirst,
    /// `count<WS>kmer`
    CountFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmerCount {
    pub kmer: String,
    pub count: u64,
}

/// Streaming reader over a k-mer count dump.
///
/// K-mers are upper-cased. Blank lines are skipped.
pub struct KmerCountReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    layout: CountLayout,
}

impl<R: BufRead> KmerCountReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_layout(reader, CountLayout::default())
    }

    pub fn with_layout(reader: R, layout: CountLayout) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            layout,
        }
    }

    /// Number of lines consumed so far
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for KmerCountReader<R> {
    type Item = Result<KmerCount, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Some(parse_kmer_count(self.line_no, trimmed, self.layout));
        }
    }
}

fn parse_kmer_count(
    line_no: usize,
    line: &str,
    layout: CountLayout,
) -> Result<KmerCount, CorpusError> {
    let mut fields = line.split_whitespace();
    let (kmer, count) = match (layout, fields.next(), fields.next(), fields.next()) {
        (CountLayout::KmerFirst, Some(kmer), Some(count), None) => (kmer, count),
        (CountLayout::CountFirst, Some(count), Some(kmer), None) => (kmer, count),
        (CountLayout::KmerFirst, ..) => {
            return Err(CorpusError::malformed(line_no, line, "expected kmer<WS>count"))
        }
        (CountLayout::CountFirst, ..) => {
            return Err(CorpusError::malformed(line_no, line, "expected count<WS>kmer"))
        }
    };
    let count = count
        .parse::<u64>()
        .map_err(|_| CorpusError::malformed(line_no, line, "count is not a non-negative integer"))?;

    Ok(KmerCount {
        kmer: kmer.to_ascii_uppercase(),
        count,
    })
}
