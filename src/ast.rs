/*!
The external AST boundary: the only shape of "surface syntax" this crate
knows about.

Parsing concrete regex syntax into this tree is explicitly out of scope;
callers (or, in the full `regex` ecosystem, `regex-syntax`) are expected to
produce one of these and hand it to [`crate::nfa::thompson::Compiler`].
*/

use alloc::{string::String, vec::Vec};

/// A node in a normalized regex syntax tree.
///
/// `rune` holds scalar values for [`Op::Literal`] and low/high pairs for
/// [`Op::CharClass`] (so `rune.len()` is always even for a char class).
/// `min`/`max` are only meaningful for [`Op::Repeat`], with `max == -1`
/// meaning unbounded. `cap`/`name` are only meaningful for [`Op::Capture`].
#[derive(Clone, Debug)]
pub struct Ast {
    pub op: Op,
    pub sub: Vec<Ast>,
    pub rune: Vec<u32>,
    pub min: i64,
    pub max: i64,
    pub cap: u32,
    pub name: String,
    pub flags: Flags,
}

impl Ast {
    fn leaf(op: Op) -> Ast {
        Ast {
            op,
            sub: Vec::new(),
            rune: Vec::new(),
            min: 0,
            max: 0,
            cap: 0,
            name: String::new(),
            flags: Flags::empty(),
        }
    }

    pub fn empty_match() -> Ast {
        Ast::leaf(Op::EmptyMatch)
    }

    pub fn no_match() -> Ast {
        Ast::leaf(Op::NoMatch)
    }

    pub fn literal(runes: Vec<u32>, flags: Flags) -> Ast {
        let mut ast = Ast::leaf(Op::Literal);
        ast.rune = runes;
        ast.flags = flags;
        ast
    }

    pub fn char_class(ranges: Vec<(u32, u32)>) -> Ast {
        let mut ast = Ast::leaf(Op::CharClass);
        ast.rune = ranges.into_iter().flat_map(|(lo, hi)| [lo, hi]).collect();
        ast
    }

    pub fn any_char(dot_newline: bool) -> Ast {
        let mut ast = Ast::leaf(if dot_newline { Op::AnyChar } else { Op::AnyCharNotNL });
        ast.flags = if dot_newline { Flags::DOT_NEWLINE } else { Flags::empty() };
        ast
    }

    pub fn concat(sub: Vec<Ast>) -> Ast {
        let mut ast = Ast::leaf(Op::Concat);
        ast.sub = sub;
        ast
    }

    pub fn alternate(sub: Vec<Ast>) -> Ast {
        let mut ast = Ast::leaf(Op::Alternate);
        ast.sub = sub;
        ast
    }

    pub fn star(sub: Ast, greedy: bool) -> Ast {
        Ast::quantifier(Op::Star, sub, greedy)
    }

    pub fn plus(sub: Ast, greedy: bool) -> Ast {
        Ast::quantifier(Op::Plus, sub, greedy)
    }

    pub fn quest(sub: Ast, greedy: bool) -> Ast {
        Ast::quantifier(Op::Quest, sub, greedy)
    }

    fn quantifier(op: Op, sub: Ast, greedy: bool) -> Ast {
        let mut ast = Ast::leaf(op);
        ast.flags = if greedy { Flags::empty() } else { Flags::NON_GREEDY };
        ast.sub = alloc::vec![sub];
        ast
    }

    pub fn repeat(sub: Ast, min: i64, max: i64, greedy: bool) -> Ast {
        let mut ast = Ast::leaf(Op::Repeat);
        ast.min = min;
        ast.max = max;
        ast.flags = if greedy { Flags::empty() } else { Flags::NON_GREEDY };
        ast.sub = alloc::vec![sub];
        ast
    }

    pub fn capture(sub: Ast, index: u32, name: String) -> Ast {
        let mut ast = Ast::leaf(Op::Capture);
        ast.cap = index;
        ast.name = name;
        ast.sub = alloc::vec![sub];
        ast
    }

    pub fn look(op: Op) -> Ast {
        debug_assert!(matches!(
            op,
            Op::BeginText
                | Op::EndText
                | Op::BeginLine
                | Op::EndLine
                | Op::WordBoundary
                | Op::NoWordBoundary
        ));
        Ast::leaf(op)
    }

    /// The node's capture index, for `Capture`; the AST's maximum capture
    /// index otherwise (used by the compiler to size `capture_count`).
    pub fn max_capture_index(&self) -> u32 {
        let mut max = if self.op == Op::Capture { self.cap } else { 0 };
        for s in &self.sub {
            max = max.max(s.max_capture_index());
        }
        max
    }
}

/// The recognized node kinds, matching the shape of a language-standard
/// regexp syntax tree (§4.2).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Op {
    Literal,
    CharClass,
    AnyChar,
    AnyCharNotNL,
    Concat,
    Alternate,
    Star,
    Plus,
    Quest,
    Repeat,
    Capture,
    BeginText,
    EndText,
    BeginLine,
    EndLine,
    WordBoundary,
    NoWordBoundary,
    EmptyMatch,
    NoMatch,
}

/// Per-node flags. Only a subset apply to any given `Op`; see the
/// constructors above for which.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Flags(u8);

impl Flags {
    pub const FOLD_CASE: Flags = Flags(1 << 0);
    pub const DOT_NEWLINE: Flags = Flags(1 << 1);
    pub const MULTILINE: Flags = Flags(1 << 2);
    pub const NON_GREEDY: Flags = Flags(1 << 3);

    pub const fn empty() -> Flags {
        Flags(0)
    }

    pub fn contains(&self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Flags) {
        self.0 |= other.0;
    }
}

impl core::ops::BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_capture_index_recurses() {
        let inner = Ast::capture(Ast::literal(alloc::vec![b'a' as u32], Flags::empty()), 2, String::new());
        let outer = Ast::concat(alloc::vec![
            Ast::capture(Ast::empty_match(), 1, String::new()),
            inner,
        ]);
        assert_eq!(outer.max_capture_index(), 2);
    }

    #[test]
    fn flags_roundtrip() {
        let f = Flags::FOLD_CASE | Flags::NON_GREEDY;
        assert!(f.contains(Flags::FOLD_CASE));
        assert!(f.contains(Flags::NON_GREEDY));
        assert!(!f.contains(Flags::MULTILINE));
    }
}
