//! Sliding-window k-mer decomposition and suffix routing keys.

/// Iterator over all overlapping windows of length `k` (stride 1).
#[derive(Debug, Clone)]
pub struct KmerWindows<'a> {
    seq: &'a str,
    k: usize,
    pos: usize,
}

/// Decompose `seq` into its `max(0, len - k + 1)` overlapping k-mers.
/// `k == 0` yields nothing.
pub fn kmers(seq: &str, k: usize) -> KmerWindows<'_> {
    KmerWindows { seq, k, pos: 0 }
}

impl<'a> Iterator for KmerWindows<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.k == 0 || self.pos + self.k > self.seq.len() {
            return None;
        }
        let window = self.seq.get(self.pos..self.pos + self.k)?;
        self.pos += 1;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.k == 0 {
            0
        } else {
            (self.seq.len() + 1).saturating_sub(self.pos + self.k)
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for KmerWindows<'_> {}

/// The last `width` characters of `fragment`, or `None` when it is shorter.
#[inline]
pub fn suffix_key(fragment: &str, width: usize) -> Option<&str> {
    let len = fragment.len();
    if len < width {
        return None;
    }
    fragment.get(len - width..)
}
