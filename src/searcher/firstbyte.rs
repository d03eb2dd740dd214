/*!
`FirstByteSet`: a prefilter wrapping a pattern's possible first bytes, as
computed by [`crate::nfa::thompson::compiler::extract_first_bytes`]. Used
to skip ahead to the next position a match could possibly start at,
without running any part of the NFA.
*/

use crate::util::memchr;

/// A 256-bit set of possible first bytes, useful as a prefilter only when
/// it's both complete and a real restriction: a pattern that can match the
/// empty string, or whose first-byte set can't be determined exactly, has
/// no useful `FirstByteSet`.
#[derive(Clone)]
pub struct FirstByteSet {
    member: [bool; 256],
    count: usize,
}

impl FirstByteSet {
    /// Builds a prefilter from [`extract_first_bytes`]'s output (`None`
    /// meaning "incomplete"). Returns `None` if the result isn't useful as
    /// a prefilter: empty (nothing can ever match) or the full byte range
    /// (every byte is possible, so scanning for membership would never
    /// reject anything).
    ///
    /// [`extract_first_bytes`]: crate::nfa::thompson::compiler::extract_first_bytes
    pub fn new(bytes: Option<[bool; 256]>) -> Option<FirstByteSet> {
        let member = bytes?;
        let count = member.iter().filter(|&&b| b).count();
        if count == 0 || count >= 256 {
            return None;
        }
        Some(FirstByteSet { member, count })
    }

    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.member[byte as usize]
    }

    /// The number of distinct bytes in this set; always in `1..256`.
    pub fn count(&self) -> usize {
        self.count
    }

    fn members(&self) -> impl Iterator<Item = u8> + '_ {
        (0u16..256).map(|b| b as u8).filter(|&b| self.contains(b))
    }

    /// Finds the first position at or after `at` whose byte could start a
    /// match, using a `memchr`-backed scan when the set is small enough to
    /// enumerate directly (at most 3 distinct bytes), falling back to a
    /// plain membership scan otherwise.
    pub fn find(&self, haystack: &[u8], at: usize) -> Option<usize> {
        if at >= haystack.len() {
            return None;
        }
        let hay = &haystack[at..];
        let found = match self.count {
            1 => {
                let b = self.members().next().unwrap();
                memchr::memchr(b, hay)
            }
            2 => {
                let mut it = self.members();
                let (a, b) = (it.next().unwrap(), it.next().unwrap());
                memchr::memchr2(a, b, hay)
            }
            3 => {
                let mut it = self.members();
                let (a, b, c) = (it.next().unwrap(), it.next().unwrap(), it.next().unwrap());
                memchr::memchr3(a, b, c, hay)
            }
            _ => hay.iter().position(|&b| self.contains(b)),
        };
        found.map(|i| at + i)
    }
}

impl core::fmt::Debug for FirstByteSet {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "FirstByteSet({} bytes)", self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(bytes: &[u8]) -> [bool; 256] {
        let mut m = [false; 256];
        for &b in bytes {
            m[b as usize] = true;
        }
        m
    }

    #[test]
    fn rejects_empty_and_universal() {
        assert!(FirstByteSet::new(Some([false; 256])).is_none());
        assert!(FirstByteSet::new(Some([true; 256])).is_none());
        assert!(FirstByteSet::new(None).is_none());
    }

    #[test]
    fn find_uses_memchr_paths_for_small_sets() {
        let s = FirstByteSet::new(Some(set_of(b"x"))).unwrap();
        assert_eq!(s.find(b"abcxdef", 0), Some(3));
        let s2 = FirstByteSet::new(Some(set_of(b"xy"))).unwrap();
        assert_eq!(s2.find(b"abcydef", 0), Some(3));
        let s3 = FirstByteSet::new(Some(set_of(b"xyz"))).unwrap();
        assert_eq!(s3.find(b"abczdef", 0), Some(3));
    }

    #[test]
    fn find_falls_back_for_larger_sets() {
        let s = FirstByteSet::new(Some(set_of(b"0123456789"))).unwrap();
        assert_eq!(s.find(b"abc7def", 0), Some(3));
        assert_eq!(s.find(b"abcdef", 0), None);
    }

    #[test]
    fn find_respects_start_offset() {
        let s = FirstByteSet::new(Some(set_of(b"x"))).unwrap();
        assert_eq!(s.find(b"xabcxdef", 1), Some(4));
    }
}
