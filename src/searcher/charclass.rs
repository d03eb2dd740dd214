/*!
`CharClassSearcher`: a fast path for a pattern that's nothing but a single
repeated ASCII character class — `[ranges]+` or `[ranges]*` — with no
other structure. Scans the haystack against a 256-entry membership table
directly, instead of stepping a general NFA one byte at a time.
*/

use alloc::vec::Vec;

use crate::{
    ast::{Ast, Op},
    searcher::byteset::{ascii_ranges_of, ByteSet},
    util::{
        primitives::PatternID,
        search::{Match, Span},
    },
};

/// Searches for maximal runs of bytes drawn from a fixed ASCII class, of
/// at least `min_match` bytes (`1` for `+`, `0` for `*`).
#[derive(Clone)]
pub struct CharClassSearcher {
    member: ByteSet,
    min_match: usize,
}

impl CharClassSearcher {
    /// Builds a searcher directly from a list of byte ranges and a minimum
    /// repeat count.
    pub fn new(ranges: &[(u8, u8)], min_match: usize) -> CharClassSearcher {
        CharClassSearcher { member: ByteSet::from_ranges(ranges), min_match }
    }

    /// Recognizes a `Star`/`Plus` node over a single ASCII `CharClass`
    /// child. Returns `None` for any other shape, including a quantified
    /// literal or a class with any non-ASCII pair.
    pub fn try_from_ast(ast: &Ast) -> Option<CharClassSearcher> {
        let min_match = match ast.op {
            Op::Plus => 1,
            Op::Star => 0,
            _ => return None,
        };
        let ranges = ascii_ranges_of(ast.sub.first()?)?;
        Some(CharClassSearcher::new(&ranges, min_match))
    }

    #[inline]
    fn is_member(&self, b: u8) -> bool {
        self.member.contains(b)
    }

    fn run_end(&self, haystack: &[u8], start: usize) -> usize {
        let mut pos = start;
        while pos < haystack.len() && self.is_member(haystack[pos]) {
            pos += 1;
        }
        pos
    }

    /// Finds the leftmost match at or after `at`. For `min_match == 0`
    /// this always succeeds (the empty match at `at` is always valid);
    /// for `min_match >= 1` this scans forward for the first member byte,
    /// retrying past any run that's too short.
    pub fn search_at(&self, haystack: &[u8], at: usize) -> Option<Span> {
        if at > haystack.len() {
            return None;
        }
        if self.min_match == 0 {
            let end = self.run_end(haystack, at);
            return Some(Span { start: at, end });
        }
        let mut pos = at;
        loop {
            while pos < haystack.len() && !self.is_member(haystack[pos]) {
                pos += 1;
            }
            if pos >= haystack.len() {
                return None;
            }
            let start = pos;
            let end = self.run_end(haystack, start);
            if end - start >= self.min_match {
                return Some(Span { start, end });
            }
            pos = end.max(start + 1);
        }
    }

    pub fn search(&self, haystack: &[u8]) -> Option<Match> {
        self.search_at(haystack, 0).map(|span| Match::new(PatternID::ZERO, span))
    }

    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.search(haystack).is_some()
    }

    /// Collects every non-overlapping match into `out` (cleared first) in
    /// a single forward pass, without the per-match call overhead of
    /// repeatedly invoking [`Self::search_at`].
    ///
    /// When `min_match == 0`, a zero-length match is reported once at the
    /// start of each run of non-member bytes (not once per such byte); a
    /// caller that needs the general engine's exact empty-match count for
    /// a `*`-shaped pattern should not use this fast path.
    pub fn find_all_indices(&self, haystack: &[u8], out: &mut Vec<Span>) {
        out.clear();
        let mut i = 0;
        while i < haystack.len() {
            if self.is_member(haystack[i]) {
                let start = i;
                i = self.run_end(haystack, i);
                out.push(Span { start, end: i });
            } else {
                if self.min_match == 0 {
                    out.push(Span { start: i, end: i });
                }
                i += 1;
            }
        }
    }

    /// Equivalent to `self.find_all_indices(haystack, &mut buf); buf.len()`
    /// without the intermediate buffer.
    pub fn count(&self, haystack: &[u8]) -> usize {
        let mut n = 0;
        let mut i = 0;
        while i < haystack.len() {
            if self.is_member(haystack[i]) {
                n += 1;
                i = self.run_end(haystack, i);
            } else {
                if self.min_match == 0 {
                    n += 1;
                }
                i += 1;
            }
        }
        n
    }
}

impl core::fmt::Debug for CharClassSearcher {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("CharClassSearcher")
            .field("member", &self.member)
            .field("min_match", &self.min_match)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_requires_at_least_one() {
        let s = CharClassSearcher::new(&[(b'0', b'9')], 1);
        assert_eq!(s.search(b"abc123xyz").unwrap().range(), 3..6);
        assert!(s.search(b"abcxyz").is_none());
    }

    #[test]
    fn star_matches_empty_at_start() {
        let s = CharClassSearcher::new(&[(b'0', b'9')], 0);
        assert_eq!(s.search(b"abc123").unwrap().range(), 0..0);
        assert_eq!(s.search(b"123abc").unwrap().range(), 0..3);
    }

    #[test]
    fn find_all_indices_collects_every_run() {
        let s = CharClassSearcher::new(&[(b'0', b'9')], 1);
        let mut out = Vec::new();
        s.find_all_indices(b"a12b3c456", &mut out);
        let got: Vec<_> = out.iter().map(|sp| sp.range()).collect();
        assert_eq!(got, alloc::vec![1..3, 4..5, 6..9]);
        assert_eq!(s.count(b"a12b3c456"), 3);
    }

    #[test]
    fn try_from_ast_recognizes_plus_over_ascii_class() {
        let class = Ast::char_class(alloc::vec![(b'0' as u32, b'9' as u32)]);
        let ast = Ast::plus(class, true);
        let s = CharClassSearcher::try_from_ast(&ast).unwrap();
        assert_eq!(s.search(b"x42").unwrap().range(), 1..3);
    }

    #[test]
    fn try_from_ast_rejects_other_shapes() {
        let lit = Ast::literal(alloc::vec!['a' as u32], crate::ast::Flags::empty());
        assert!(CharClassSearcher::try_from_ast(&lit).is_none());
    }
}
