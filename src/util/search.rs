/*!
Types shared by every search routine in this crate: the input configuration
([`Input`]), the half-open byte range a match occupies ([`Span`]), the
result of a search ([`Match`]) and the leftmost-first/leftmost-longest match
semantics selector ([`MatchKind`]).
*/

use core::ops::{Range, RangeBounds};

use crate::util::primitives::PatternID;

/// The parameters of a single regex search.
///
/// Every search in this crate accepts a haystack and an optional sub-span
/// of it to search, a starting anchoring mode, and a pattern restriction.
/// Bundling these into one type means every engine accepts the same shape
/// of argument regardless of how many of these knobs a particular caller
/// actually needs to turn.
///
/// Critically, `Input` always carries the *entire* haystack, even when the
/// search is logically confined to a sub-span of it via [`Input::span`].
/// Zero-width assertions (`^`, `$`, `\b`) must be able to see bytes outside
/// of the searched span to decide correctly, so slicing the haystack before
/// handing it to an engine is never equivalent to narrowing the span.
#[derive(Clone)]
pub struct Input<'h> {
    haystack: &'h [u8],
    span: Span,
    anchored: Anchored,
    pattern: Option<PatternID>,
    earliest: bool,
    utf8: bool,
}

impl<'h> Input<'h> {
    /// Create a new search over the entirety of `haystack`.
    #[inline]
    pub fn new<H: ?Sized + AsRef<[u8]>>(haystack: &'h H) -> Input<'h> {
        let haystack = haystack.as_ref();
        Input {
            haystack,
            span: Span { start: 0, end: haystack.len() },
            anchored: Anchored::No,
            pattern: None,
            earliest: false,
            utf8: true,
        }
    }

    /// Restrict the search to the given span, without changing the bytes
    /// that look-around assertions may observe.
    #[inline]
    pub fn span<S: Into<Span>>(mut self, span: S) -> Input<'h> {
        self.set_span(span);
        self
    }

    /// Like [`Input::span`], but accepts any range.
    #[inline]
    pub fn range<R: RangeBounds<usize>>(mut self, range: R) -> Input<'h> {
        self.set_range(range);
        self
    }

    /// Force every match to begin at the start of the search (not
    /// necessarily the start of the haystack; see [`Anchored`]).
    #[inline]
    pub fn anchored(mut self, mode: Anchored) -> Input<'h> {
        self.set_anchored(mode);
        self
    }

    /// Restrict the search to a single pattern, when the NFA carries more
    /// than one (multi-pattern NFAs are otherwise outside this crate's
    /// scope, but the field is threaded through regardless since it costs
    /// nothing and keeps `Input` forward compatible).
    #[inline]
    pub fn pattern(mut self, pattern: Option<PatternID>) -> Input<'h> {
        self.set_pattern(pattern);
        self
    }

    /// Ask the engine to stop as soon as it can prove a match exists,
    /// without necessarily finding the correct (leftmost) end position.
    #[inline]
    pub fn earliest(mut self, yes: bool) -> Input<'h> {
        self.set_earliest(yes);
        self
    }

    /// Toggle whether empty matches that split a UTF-8 encoded codepoint
    /// should be skipped.
    #[inline]
    pub fn utf8(mut self, yes: bool) -> Input<'h> {
        self.set_utf8(yes);
        self
    }

    #[inline]
    pub fn set_span<S: Into<Span>>(&mut self, span: S) {
        self.span = span.into();
    }

    #[inline]
    pub fn set_range<R: RangeBounds<usize>>(&mut self, range: R) {
        use core::ops::Bound;

        let start = match range.start_bound() {
            Bound::Included(&i) => i,
            Bound::Excluded(&i) => i.checked_add(1).unwrap(),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&i) => i.checked_add(1).unwrap(),
            Bound::Excluded(&i) => i,
            Bound::Unbounded => self.haystack().len(),
        };
        self.set_span(Span { start, end });
    }

    #[inline]
    pub fn set_start(&mut self, start: usize) {
        self.span.start = start;
    }

    #[inline]
    pub fn set_end(&mut self, end: usize) {
        self.span.end = end;
    }

    #[inline]
    pub fn set_anchored(&mut self, mode: Anchored) {
        self.anchored = mode;
    }

    #[inline]
    pub fn set_pattern(&mut self, pattern: Option<PatternID>) {
        self.pattern = pattern;
    }

    #[inline]
    pub fn set_earliest(&mut self, yes: bool) {
        self.earliest = yes;
    }

    #[inline]
    pub fn set_utf8(&mut self, yes: bool) {
        self.utf8 = yes;
    }

    #[inline]
    pub fn haystack(&self) -> &[u8] {
        self.haystack
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.get_span().start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.get_span().end
    }

    #[inline]
    pub fn get_span(&self) -> Span {
        self.span
    }

    #[inline]
    pub fn get_range(&self) -> Range<usize> {
        self.get_span().range()
    }

    #[inline]
    pub fn get_anchored(&self) -> Anchored {
        self.anchored
    }

    #[inline]
    pub fn get_pattern(&self) -> Option<PatternID> {
        self.pattern
    }

    #[inline]
    pub fn get_earliest(&self) -> bool {
        self.earliest
    }

    #[inline]
    pub fn get_utf8(&self) -> bool {
        self.utf8
    }

    /// True when this search's span can never produce a match, e.g. because
    /// the start exceeds the end.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.get_span().start > self.get_span().end
    }

    /// True when `offset` falls on a valid UTF-8 codepoint boundary in this
    /// search's haystack. Behavior is unspecified if the haystack is not
    /// valid UTF-8.
    #[inline]
    pub fn is_char_boundary(&self, offset: usize) -> bool {
        crate::util::utf8::is_boundary(self.haystack(), offset)
    }
}

impl<'h> core::fmt::Debug for Input<'h> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Input")
            .field("haystack", &crate::util::escape::DebugHaystack(self.haystack()))
            .field("span", &self.span)
            .field("anchored", &self.anchored)
            .field("pattern", &self.pattern)
            .field("earliest", &self.earliest)
            .field("utf8", &self.utf8)
            .finish()
    }
}

/// Whether, and how, a search must be anchored to its starting position.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Anchored {
    /// The match may begin anywhere at or after the start of the search.
    No,
    /// The match must begin exactly at the start of the search.
    Yes,
    /// The match must begin exactly at the start of the search, and must
    /// additionally be produced by the given pattern.
    Pattern(PatternID),
}

impl Anchored {
    /// True unless this is `Anchored::No`.
    #[inline]
    pub fn is_anchored(&self) -> bool {
        !matches!(self, Anchored::No)
    }

    #[inline]
    pub fn pattern(&self) -> Option<PatternID> {
        match *self {
            Anchored::Pattern(pid) => Some(pid),
            _ => None,
        }
    }
}

/// A half-open `[start, end)` byte range reported by, or given to, a search.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub fn range(&self) -> Range<usize> {
        Range::from(*self)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

impl core::fmt::Debug for Span {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Range<usize>> for Span {
    #[inline]
    fn from(range: Range<usize>) -> Span {
        Span { start: range.start, end: range.end }
    }
}

impl From<Span> for Range<usize> {
    #[inline]
    fn from(span: Span) -> Range<usize> {
        Range { start: span.start, end: span.end }
    }
}

impl core::ops::Index<Span> for [u8] {
    type Output = [u8];

    #[inline]
    fn index(&self, index: Span) -> &[u8] {
        &self[index.range()]
    }
}

/// The result of a successful search: which pattern matched, and where.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Match {
    pattern: PatternID,
    span: Span,
}

impl Match {
    /// Panics if `span.start > span.end`.
    #[inline]
    pub fn new<S: Into<Span>>(pattern: PatternID, span: S) -> Match {
        let span = span.into();
        assert!(span.start <= span.end, "invalid match span");
        Match { pattern, span }
    }

    #[inline]
    pub fn must<S: Into<Span>>(pattern: usize, span: S) -> Match {
        Match::new(PatternID::must(pattern), span)
    }

    #[inline]
    pub fn pattern(&self) -> PatternID {
        self.pattern
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.span.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.span.end
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.span.range()
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.span
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

/// Selects between the two match-resolution disciplines a Thompson NFA
/// engine can implement.
///
/// The two disciplines only ever disagree about which match to report when
/// more than one candidate shares the same (leftmost) start position; they
/// always agree on the start position itself.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MatchKind {
    /// Perl-style semantics: among matches sharing a start position, the one
    /// produced by the highest-priority (leftmost in the original
    /// alternation/quantifier structure) thread wins, with longer extension
    /// preferred only among equal-priority threads.
    LeftmostFirst,
    /// POSIX-style semantics: among matches sharing a start position, the
    /// longest one wins, regardless of which alternative produced it.
    LeftmostLongest,
}

impl Default for MatchKind {
    fn default() -> MatchKind {
        MatchKind::LeftmostFirst
    }
}

impl MatchKind {
    #[inline]
    pub fn is_longest(&self) -> bool {
        matches!(self, MatchKind::LeftmostLongest)
    }
}

/// An error indicating that a search could not report a definitive answer.
///
/// Every engine in this crate is total: it never panics and never fails to
/// return *some* answer for a well-formed `Input`. This type instead covers
/// the cases where an engine can correctly claim "I don't know" rather than
/// silently producing the wrong match, e.g. because the bounded backtracker
/// was asked to search more bytes than its budget allows.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatchError(MatchErrorKind);

#[derive(Clone, Debug, Eq, PartialEq)]
enum MatchErrorKind {
    /// The backtracker determined that `len(haystack) * nfa.states().len()`
    /// exceeds its configured budget.
    HaystackTooLong { len: usize },
    /// An `Anchored::Pattern` search was requested for a pattern ID that
    /// the NFA does not contain.
    UnsupportedAnchored { mode: Anchored },
}

impl MatchError {
    #[inline]
    pub fn haystack_too_long(len: usize) -> MatchError {
        MatchError(MatchErrorKind::HaystackTooLong { len })
    }

    #[inline]
    pub fn unsupported_anchored(mode: Anchored) -> MatchError {
        MatchError(MatchErrorKind::UnsupportedAnchored { mode })
    }
}

impl core::fmt::Display for MatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match &self.0 {
            MatchErrorKind::HaystackTooLong { len } => write!(
                f,
                "haystack of length {} exceeds the configured backtracking budget",
                len
            ),
            MatchErrorKind::UnsupportedAnchored { mode } => {
                write!(f, "anchored mode {:?} is not supported", mode)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MatchError {}
