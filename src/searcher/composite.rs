/*!
`CompositeSearcher`: a fast path for a concatenation of quantified ASCII
character classes, e.g. `[a-z]+[0-9]+`. Each part is matched greedily,
backtracking the previous part's run length when a later part can't reach
its minimum — the same resolution order leftmost-first semantics would
produce, just without a general NFA simulation.
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

#[derive(Clone)]
struct Part {
    member: ByteSet,
    min_match: usize,
    max_match: usize,
}

impl Part {
    fn from_ast(ast: &Ast) -> Option<Part> {
        let (ranges, min_match, max_match) = match ast.op {
            Op::Plus => (ascii_ranges_of(ast.sub.first()?)?, 1, usize::MAX),
            Op::Star => (ascii_ranges_of(ast.sub.first()?)?, 0, usize::MAX),
            Op::Quest => (ascii_ranges_of(ast.sub.first()?)?, 0, 1),
            Op::Repeat => {
                if ast.min < 0 {
                    return None;
                }
                let ranges = ascii_ranges_of(ast.sub.first()?)?;
                let min = ast.min as usize;
                let max = if ast.max < 0 { usize::MAX } else { ast.max as usize };
                if max < min {
                    return None;
                }
                (ranges, min, max)
            }
            Op::CharClass => (ascii_ranges_of(ast)?, 1, 1),
            _ => return None,
        };
        Some(Part { member: ByteSet::from_ranges(&ranges), min_match, max_match })
    }

    #[inline]
    fn max_run(&self, haystack: &[u8], pos: usize) -> usize {
        let mut len = 0;
        while pos + len < haystack.len()
            && len < self.max_match
            && self.member.contains(haystack[pos + len])
        {
            len += 1;
        }
        len
    }
}

/// Matches a fixed sequence of quantified ASCII character classes.
#[derive(Clone)]
pub struct CompositeSearcher {
    parts: Vec<Part>,
}

impl CompositeSearcher {
    /// Recognizes a `Concat` of two or more parts, each of which is a bare
    /// ASCII `CharClass` or a `Star`/`Plus`/`Quest`/`Repeat` over one.
    /// Returns `None` for any other shape.
    pub fn try_from_ast(ast: &Ast) -> Option<CompositeSearcher> {
        if ast.op != Op::Concat || ast.sub.len() < 2 {
            return None;
        }
        let mut parts = Vec::with_capacity(ast.sub.len());
        for child in &ast.sub {
            parts.push(Part::from_ast(child)?);
        }
        Some(CompositeSearcher { parts })
    }

    /// Tries to match every part starting at `pos`, preferring the
    /// longest run for each part and backtracking to shorter runs only
    /// when a later part fails to reach its minimum. Returns the end of
    /// the match, if any.
    fn match_from(&self, haystack: &[u8], pos: usize, part_idx: usize) -> Option<usize> {
        let Some(part) = self.parts.get(part_idx) else { return Some(pos) };
        let max_len = part.max_run(haystack, pos);
        if max_len < part.min_match {
            return None;
        }
        let mut len = max_len;
        loop {
            if let Some(end) = self.match_from(haystack, pos + len, part_idx + 1) {
                return Some(end);
            }
            if len == part.min_match {
                return None;
            }
            len -= 1;
        }
    }

    /// Finds a match starting exactly at `at`, or `None` if none exists
    /// there.
    pub fn search_at(&self, haystack: &[u8], at: usize) -> Option<Span> {
        self.match_from(haystack, at, 0).map(|end| Span { start: at, end })
    }

    /// Finds the leftmost match starting at or after `at`. Unlike a
    /// DFA-backed searcher this isn't worst-case linear: a position whose
    /// first part matches but whose later parts never do can still cost
    /// `O(part_count)` backtracking work before being rejected.
    pub fn search_from(&self, haystack: &[u8], at: usize) -> Option<Match> {
        for pos in at..=haystack.len() {
            if let Some(span) = self.search_at(haystack, pos) {
                return Some(Match::new(PatternID::ZERO, span));
            }
        }
        None
    }

    pub fn search(&self, haystack: &[u8]) -> Option<Match> {
        self.search_from(haystack, 0)
    }

    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.search(haystack).is_some()
    }
}

impl core::fmt::Debug for CompositeSearcher {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "CompositeSearcher({} parts)", self.parts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plus_class(lo: u8, hi: u8) -> Ast {
        Ast::plus(Ast::char_class(alloc::vec![(lo as u32, hi as u32)]), true)
    }

    #[test]
    fn matches_letters_then_digits() {
        let ast = Ast::concat(alloc::vec![plus_class(b'a', b'z'), plus_class(b'0', b'9')]);
        let s = CompositeSearcher::try_from_ast(&ast).unwrap();
        assert_eq!(s.search(b"abc123").unwrap().range(), 0..6);
    }

    #[test]
    fn backtracks_when_final_part_needs_room() {
        // `[a-z]+[a-z]` on "abc" must give the last part the trailing 'c'.
        let ast = Ast::concat(alloc::vec![
            plus_class(b'a', b'z'),
            Ast::char_class(alloc::vec![(b'a' as u32, b'z' as u32)]),
        ]);
        let s = CompositeSearcher::try_from_ast(&ast).unwrap();
        assert_eq!(s.search(b"abc").unwrap().range(), 0..3);
    }

    #[test]
    fn rejects_non_ascii_part() {
        let ast = Ast::concat(alloc::vec![
            plus_class(b'a', b'z'),
            Ast::plus(Ast::char_class(alloc::vec![(0, 0x2FF)]), true),
        ]);
        assert!(CompositeSearcher::try_from_ast(&ast).is_none());
    }

    #[test]
    fn no_match_returns_none() {
        let ast = Ast::concat(alloc::vec![plus_class(b'a', b'z'), plus_class(b'0', b'9')]);
        let s = CompositeSearcher::try_from_ast(&ast).unwrap();
        assert!(s.search(b"abcdef").is_none());
    }
}
