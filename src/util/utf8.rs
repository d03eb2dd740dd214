/*!
Translates a range of Unicode scalar values into a set of UTF-8 byte-range
sequences.

This is the piece that lets the compiler (`nfa::thompson::compiler`) turn a
`CharClass` range like `[a-\u{10ffff}]` into a handful of `ByteRange` chains
instead of one state per codepoint. Each [`Utf8Sequence`] describes one to
four consecutive byte ranges; a byte string matches the original scalar
range if and only if it matches one of the yielded sequences byte-for-byte.

The surrogate range `U+D800..=U+DFFF` is never valid UTF-8 and is always
excluded from the output, splitting a scalar range that straddles it into
two.
*/

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Utf8Range {
    pub start: u8,
    pub end: u8,
}

impl Utf8Range {
    fn new(start: u8, end: u8) -> Utf8Range {
        Utf8Range { start, end }
    }
}

/// A sequence of one to four byte ranges describing every byte string that
/// encodes a contiguous (and UTF-8-only) block of scalar values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Utf8Sequence {
    One([Utf8Range; 1]),
    Two([Utf8Range; 2]),
    Three([Utf8Range; 3]),
    Four([Utf8Range; 4]),
}

impl Utf8Sequence {
    fn from_ranges(ranges: Vec<Utf8Range>) -> Utf8Sequence {
        match ranges.len() {
            1 => Utf8Sequence::One([ranges[0]]),
            2 => Utf8Sequence::Two([ranges[0], ranges[1]]),
            3 => Utf8Sequence::Three([ranges[0], ranges[1], ranges[2]]),
            4 => Utf8Sequence::Four([ranges[0], ranges[1], ranges[2], ranges[3]]),
            _ => unreachable!("utf8 sequences are always 1 to 4 bytes"),
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[Utf8Range] {
        match self {
            Utf8Sequence::One(r) => r,
            Utf8Sequence::Two(r) => r,
            Utf8Sequence::Three(r) => r,
            Utf8Sequence::Four(r) => r,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }
}

/// An iterator over the [`Utf8Sequence`]s describing `start..=end`.
pub struct Utf8Sequences {
    stack: Vec<(u32, u32)>,
}

impl Utf8Sequences {
    pub fn new(start: char, end: char) -> Utf8Sequences {
        Utf8Sequences { stack: vec![(start as u32, end as u32)] }
    }
}

impl Iterator for Utf8Sequences {
    type Item = Utf8Sequence;

    fn next(&mut self) -> Option<Utf8Sequence> {
        while let Some((lo, hi)) = self.stack.pop() {
            debug_assert!(lo <= hi);
            // Never cross the surrogate hole; it has no UTF-8 encoding.
            if lo < 0xD800 && hi > 0xDFFF {
                self.stack.push((0xE000, hi));
                self.stack.push((lo, 0xD7FF));
                continue;
            }
            if lo <= 0xDFFF && hi >= 0xD800 {
                if lo < 0xD800 {
                    self.stack.push((lo, 0xD7FF));
                    continue;
                }
                if hi > 0xDFFF {
                    self.stack.push((0xE000, hi));
                    continue;
                }
                // Entirely inside the hole: contributes nothing.
                continue;
            }
            // Split at UTF-8 encoded-length boundaries so that every
            // remaining (lo, hi) pair encodes to the same number of bytes.
            let (boundary, len) = match lo {
                0..=0x7F => (0x7F, 1),
                0x80..=0x7FF => (0x7FF, 2),
                0x800..=0xFFFF => (0xFFFF, 3),
                _ => (0x10FFFF, 4),
            };
            if hi > boundary {
                self.stack.push((boundary + 1, hi));
                self.stack.push((lo, boundary));
                continue;
            }
            let lo_bytes = encode(lo, len);
            let hi_bytes = encode(hi, len);
            match split_same_length(&lo_bytes[..len], &hi_bytes[..len]) {
                Ok(seq) => return Some(Utf8Sequence::from_ranges(seq)),
                Err((lo_range, hi_range)) => {
                    self.stack.push((decode(&hi_range[..len]), hi));
                    self.stack.push((lo, decode(&lo_range[..len]) - 1));
                }
            }
        }
        None
    }
}

/// Encode `cp` as UTF-8, left-justified in a 4-byte buffer. `len` names how
/// many of the leading bytes are meaningful (every scalar value that falls
/// in the same encoded-length class as `cp` encodes to exactly that many
/// bytes).
fn encode(cp: u32, len: usize) -> [u8; 4] {
    let mut buf = [0u8; 4];
    let ch = char::from_u32(cp).expect("valid scalar value");
    let n = ch.encode_utf8(&mut buf).len();
    debug_assert_eq!(n, len);
    buf
}

fn decode(bytes: &[u8]) -> u32 {
    core::str::from_utf8(bytes).unwrap().chars().next().unwrap() as u32
}

/// Given two same-length UTF-8 encodings `lo` and `hi` of the low and high
/// ends of a scalar range (both already confirmed to encode to the same
/// number of bytes and to avoid the surrogate hole), either:
///
/// * returns `Ok(ranges)`, a single rectangular sequence of per-byte ranges
///   that exactly covers `lo..=hi`, or
/// * returns `Err((lo_split, hi_split))` naming two sub-encodings that
///   should be queued separately, because `lo..=hi` isn't expressible as a
///   single rectangular sequence.
///
/// The recursion bottoms out once the leading bytes agree (trivially
/// rectangular) or once one side's suffix is already "full" (all `0xBF`s
/// trailing `lo`, or all `0x80`s trailing `hi`), in which case the leading
/// byte itself can be widened into a shared range.
fn split_same_length(
    lo: &[u8],
    hi: &[u8],
) -> Result<Vec<Utf8Range>, ([u8; 4], [u8; 4])> {
    let n = lo.len();
    debug_assert_eq!(n, hi.len());
    if n == 1 {
        return Ok(vec![Utf8Range::new(lo[0], hi[0])]);
    }
    if lo[0] == hi[0] {
        return match split_same_length(&lo[1..], &hi[1..]) {
            Ok(mut rest) => {
                rest.insert(0, Utf8Range::new(lo[0], lo[0]));
                Ok(rest)
            }
            Err((l, h)) => {
                let mut lfull = [0u8; 4];
                lfull[0] = lo[0];
                lfull[1..n].copy_from_slice(&l[..n - 1]);
                let mut hfull = [0u8; 4];
                hfull[0] = hi[0];
                hfull[1..n].copy_from_slice(&h[..n - 1]);
                Err((lfull, hfull))
            }
        };
    }

    let lo_suffix_is_max = lo[1..].iter().all(|&b| b == 0xBF);
    let hi_suffix_is_min = hi[1..].iter().all(|&b| b == 0x80);

    if lo_suffix_is_max && hi_suffix_is_min {
        // The whole thing is rectangular: leading byte varies lo[0]..=hi[0]
        // and every continuation byte varies over its full 0x80..=0xBF
        // range.
        let mut ranges = vec![Utf8Range::new(lo[0], hi[0])];
        for _ in 1..n {
            ranges.push(Utf8Range::new(0x80, 0xBF));
        }
        return Ok(ranges);
    }

    // Not rectangular. Split off whichever side is not yet "full" so the
    // caller can re-queue two smaller, still-same-length ranges: the low
    // side shrunk up to its leading byte's max suffix, and everything
    // above that.
    if !lo_suffix_is_max {
        let mut lo_hi = [0u8; 4];
        lo_hi[0] = lo[0];
        for i in 1..n {
            lo_hi[i] = 0xBF;
        }
        let mut next_lo = [0u8; 4];
        next_lo[0] = lo[0] + 1;
        for i in 1..n {
            next_lo[i] = 0x80;
        }
        let mut lo_full = [0u8; 4];
        lo_full[..n].copy_from_slice(lo);
        return Err((lo_full, lo_hi));
    }
    // lo's suffix is already max, so lo[0] merges into the middle; hi's
    // suffix must be the one that's not minimal.
    let mut hi_lo = [0u8; 4];
    hi_lo[0] = hi[0];
    for i in 1..n {
        hi_lo[i] = 0x80;
    }
    let mut hi_full = [0u8; 4];
    hi_full[..n].copy_from_slice(hi);
    Err((hi_lo, hi_full))
}

/// Returns true if and only if `offset` is a valid UTF-8 codepoint boundary
/// in `haystack`. Unspecified if `haystack` is not valid UTF-8.
#[inline]
pub(crate) fn is_boundary(haystack: &[u8], offset: usize) -> bool {
    match haystack.get(offset) {
        // The offset is at or beyond the end of the haystack; the only
        // in-bounds boundary out here is exactly at the end.
        None => offset == haystack.len(),
        // Any byte that isn't a continuation byte (10xxxxxx) starts (or is)
        // a codepoint, and so is always a valid boundary.
        Some(&b) => (b & 0b1100_0000) != 0b1000_0000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{vec, vec::Vec};

    fn sequences(start: char, end: char) -> Vec<Vec<(u8, u8)>> {
        Utf8Sequences::new(start, end)
            .map(|seq| {
                seq.as_slice().iter().map(|r| (r.start, r.end)).collect()
            })
            .collect()
    }

    // Checks the defining property: every byte string produced by walking
    // the cross product of the yielded ranges decodes to a codepoint in
    // `start..=end`, and every codepoint in that range is produced by
    // exactly one sequence.
    fn check_round_trip(start: char, end: char) {
        use alloc::collections::BTreeSet;
        let mut got: BTreeSet<u32> = BTreeSet::new();
        for seq in Utf8Sequences::new(start, end) {
            let ranges = seq.as_slice();
            let mut bytes = vec![0u8; ranges.len()];
            fn walk(
                ranges: &[Utf8Range],
                bytes: &mut Vec<u8>,
                out: &mut BTreeSet<u32>,
            ) {
                if ranges.is_empty() {
                    if let Ok(s) = core::str::from_utf8(bytes) {
                        if let Some(c) = s.chars().next() {
                            out.insert(c as u32);
                        }
                    }
                    return;
                }
                for b in ranges[0].start..=ranges[0].end {
                    bytes.push(b);
                    walk(&ranges[1..], bytes, out);
                    bytes.pop();
                }
            }
            bytes.clear();
            walk(ranges, &mut bytes, &mut got);
        }
        let expected: BTreeSet<u32> =
            (start as u32..=end as u32).filter(|&c| char::from_u32(c).is_some()).collect();
        assert_eq!(got, expected, "{:?}..={:?}", start, end);
    }

    #[test]
    fn ascii_single_byte() {
        assert_eq!(sequences('a', 'z'), vec![vec![(b'a', b'z')]]);
    }

    #[test]
    fn round_trips() {
        check_round_trip('a', 'z');
        check_round_trip('\u{0}', '\u{7F}');
        check_round_trip('\u{80}', '\u{7FF}');
        check_round_trip('\u{800}', '\u{FFFF}');
        check_round_trip('\u{10000}', '\u{10FFFF}');
        check_round_trip('\u{0}', '\u{10FFFF}');
        check_round_trip('a', '\u{10FFFF}');
        check_round_trip('\u{D7FF}', '\u{E000}');
    }

    #[test]
    fn is_boundary_works() {
        let s = "☃".as_bytes();
        assert!(is_boundary(s, 0));
        assert!(!is_boundary(s, 1));
        assert!(!is_boundary(s, 2));
        assert!(is_boundary(s, 3));
    }
}
