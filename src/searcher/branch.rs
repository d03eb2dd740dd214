/*!
`BranchDispatcher`: a fast path for a start-anchored alternation whose
branches all begin with disjoint sets of possible first bytes — e.g.
`UUID|hex32|\d+`. A single byte lookup picks the (at most one) branch that
could possibly match, and only that branch's own matcher runs.
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

/// A single branch's specialized matcher: either a fixed byte string, or a
/// repeated ASCII character class with a `(min, max)` repeat bound.
#[derive(Clone)]
enum BranchMatcher {
    Literal(Vec<u8>),
    CharClass(ByteSet, usize, usize),
}

impl BranchMatcher {
    fn from_ast(ast: &Ast) -> Option<BranchMatcher> {
        match ast.op {
            Op::Literal => Some(BranchMatcher::Literal(literal_utf8_bytes(ast)?)),
            Op::Plus => {
                let ranges = ascii_ranges_of(ast.sub.first()?)?;
                Some(BranchMatcher::CharClass(ByteSet::from_ranges(&ranges), 1, usize::MAX))
            }
            Op::CharClass => {
                let ranges = ascii_ranges_of(ast)?;
                Some(BranchMatcher::CharClass(ByteSet::from_ranges(&ranges), 1, 1))
            }
            _ => None,
        }
    }

    /// Every byte this branch could possibly start with.
    fn first_bytes(&self) -> Vec<u8> {
        match self {
            BranchMatcher::Literal(bytes) => alloc::vec![bytes[0]],
            BranchMatcher::CharClass(set, _, _) => {
                (0..=255u8).filter(|&b| set.contains(b)).collect()
            }
        }
    }

    /// The length of this branch's match starting at `at`, or `None` if it
    /// doesn't match there. Assumes the caller has already confirmed
    /// `haystack[at]` is one of this branch's possible first bytes.
    fn match_len(&self, haystack: &[u8], at: usize) -> Option<usize> {
        match self {
            BranchMatcher::Literal(bytes) => {
                haystack[at..].starts_with(bytes.as_slice()).then(|| bytes.len())
            }
            BranchMatcher::CharClass(set, min, max) => {
                let mut n = 0usize;
                while at + n < haystack.len() && n < *max && set.contains(haystack[at + n]) {
                    n += 1;
                }
                (n >= *min).then_some(n)
            }
        }
    }
}

fn literal_utf8_bytes(ast: &Ast) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(ast.rune.len());
    let mut buf = [0u8; 4];
    for &r in &ast.rune {
        let ch = char::from_u32(r)?;
        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Dispatches on the first byte of an anchored alternation to a single
/// branch-specific matcher, skipping the general NFA simulation entirely.
#[derive(Clone)]
pub struct BranchDispatcher {
    // -1 means no branch can start with this byte.
    dispatch: [i8; 256],
    matchers: Vec<BranchMatcher>,
}

impl BranchDispatcher {
    /// Recognizes an `Alternate` of 2 to 127 branches (each a `Literal`, a
    /// `Plus` over an ASCII `CharClass`, or a bare ASCII `CharClass`) whose
    /// possible first-byte sets are pairwise disjoint. Returns `None` for
    /// any other shape, including one with overlapping first bytes (the
    /// dispatch table could only pick one branch, which would be wrong).
    pub fn try_from_ast(ast: &Ast) -> Option<BranchDispatcher> {
        if ast.op != Op::Alternate || ast.sub.len() < 2 || ast.sub.len() > 127 {
            return None;
        }
        let mut matchers = Vec::with_capacity(ast.sub.len());
        let mut dispatch = [-1i8; 256];
        for (idx, branch) in ast.sub.iter().enumerate() {
            let matcher = BranchMatcher::from_ast(branch)?;
            for b in matcher.first_bytes() {
                if dispatch[b as usize] != -1 {
                    return None;
                }
                dispatch[b as usize] = idx as i8;
            }
            matchers.push(matcher);
        }
        Some(BranchDispatcher { dispatch, matchers })
    }

    /// Finds a match starting exactly at `at`, or `None` if the byte there
    /// isn't any branch's first byte, or its branch fails.
    pub fn search_at(&self, haystack: &[u8], at: usize) -> Option<Span> {
        let &b = haystack.get(at)?;
        let idx = self.dispatch[b as usize];
        if idx < 0 {
            return None;
        }
        let len = self.matchers[idx as usize].match_len(haystack, at)?;
        Some(Span { start: at, end: at + len })
    }

    pub fn search_from(&self, haystack: &[u8], at: usize) -> Option<Match> {
        for pos in at..haystack.len() {
            if let Some(span) = self.search_at(haystack, pos) {
                return Some(Match::new(PatternID::ZERO, span));
            }
        }
        None
    }

    pub fn search(&self, haystack: &[u8]) -> Option<Match> {
        self.search_from(haystack, 0)
    }

    /// Whether `haystack` matches starting exactly at its first byte,
    /// without scanning for a later start — the fast path an anchored
    /// caller actually wants.
    pub fn is_match_anchored(&self, haystack: &[u8]) -> bool {
        self.search_at(haystack, 0).is_some()
    }

    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.search(haystack).is_some()
    }
}

impl core::fmt::Debug for BranchDispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("BranchDispatcher").field("branches", &self.matchers.len()).finish()
    }
}
