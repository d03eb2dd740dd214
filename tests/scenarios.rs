//! The eight end-to-end scenarios table: build each `Ast` by hand (surface
//! syntax is out of scope), compile it, and check the resulting match
//! against its hand-derived span.

#![cfg(feature = "nfa-pikevm")]

use thompson_regex_core::{
    ast::{Ast, Flags, Op},
    nfa::thompson::{pikevm::PikeVM, Compiler, Config},
};

fn lit(s: &str) -> Ast {
    Ast::literal(s.chars().map(|c| c as u32).collect(), Flags::empty())
}

fn digit_class() -> Ast {
    Ast::char_class(vec![(b'0' as u32, b'9' as u32)])
}

fn vm(ast: &Ast) -> PikeVM {
    let nfa = Compiler::new().build(ast).unwrap();
    PikeVM::new(nfa, Default::default())
}

/// `\d+|UUID|hex32` over `"abc123xyz"`: only the first alternative can
/// possibly match this haystack, at `[3, 6)`.
#[test]
fn scenario_1_disjoint_alternation_matches_digit_run() {
    let ast = Ast::alternate(vec![
        Ast::plus(digit_class(), true),
        lit("UUID"),
        lit("hex32"),
    ]);
    let (m, groups) = vm(&ast).search_with_captures(b"abc123xyz").unwrap();
    assert_eq!(m.range(), 3..6);
    assert_eq!(groups[0], Some((3, 6)));
}

#[cfg(feature = "searcher")]
#[test]
fn scenario_1_branch_dispatcher_agrees_with_pikevm() {
    use thompson_regex_core::searcher::BranchDispatcher;

    let ast = Ast::alternate(vec![
        Ast::plus(digit_class(), true),
        lit("UUID"),
        lit("hex32"),
    ]);
    let dispatcher = BranchDispatcher::try_from_ast(&ast).unwrap();
    let haystack: &[u8] = b"abc123xyz";
    assert_eq!(dispatcher.search(haystack), vm(&ast).search(haystack));
}

/// `^(\d+)-(\d+)$` over `"12-34"`: both groups' bounds are reported
/// alongside the overall match.
#[test]
fn scenario_2_anchored_groups_report_bounds() {
    let group1 = Ast::capture(Ast::plus(digit_class(), true), 1, String::new());
    let group2 = Ast::capture(Ast::plus(digit_class(), true), 2, String::new());
    let ast = Ast::concat(vec![
        Ast::look(Op::BeginText),
        group1,
        lit("-"),
        group2,
        Ast::look(Op::EndText),
    ]);
    let (m, groups) = vm(&ast).search_with_captures(b"12-34").unwrap();
    assert_eq!(m.range(), 0..5);
    assert_eq!(groups[0], Some((0, 5)));
    assert_eq!(groups[1], Some((0, 2)));
    assert_eq!(groups[2], Some((3, 5)));
}

/// `(foo|bar)+` over `"foobar"` in leftmost-first mode: the pinned
/// `took_left`/quantifier-split disambiguation that lets the loop extend
/// through alternating branches instead of stopping after one repetition.
#[test]
fn scenario_3_alternation_inside_plus_matches_maximally() {
    let inner = Ast::alternate(vec![lit("foo"), lit("bar")]);
    let ast = Ast::plus(inner, true);
    let m = vm(&ast).search(b"foobar").unwrap();
    assert_eq!(m.range(), 0..6);
}

/// `a|aa` over `"aaa"` under leftmost-longest: the longest alternative that
/// can match from the leftmost start wins, which is `"aa"`, not the whole
/// three-byte haystack (neither alternative is three bytes long).
#[test]
fn scenario_4_leftmost_longest_prefers_longer_alternative() {
    let ast = Ast::alternate(vec![lit("a"), lit("aa")]);
    let nfa = Compiler::new().build(&ast).unwrap();
    let mut machine = PikeVM::new(nfa, Default::default());
    machine.set_longest(true);
    let m = machine.search(b"aaa").unwrap();
    assert_eq!(m.range(), 0..2);
}

/// `(?s)a.+b`, dot-matches-newline, over the 4-byte haystack `"a\n\nb"`: the
/// only span a full match of that haystack can occupy is `0..4` (the
/// haystack itself is 4 bytes: `'a'`, `'\n'`, `'\n'`, `'b'`). Dot-matches-
/// newline is a compiler-level setting, not a per-node `Ast` flag, so this
/// builds the NFA with `Config::dot_newline(true)` directly rather than
/// going through the shared `vm()` helper.
#[test]
fn scenario_5_dot_newline_spans_embedded_newlines() {
    let ast = Ast::concat(vec![
        lit("a"),
        Ast::plus(Ast::any_char(true), true),
        lit("b"),
    ]);
    let nfa = Compiler::new().configure(Config::new().dot_newline(true)).build(&ast).unwrap();
    let machine = PikeVM::new(nfa, Default::default());
    let m = machine.search(b"a\n\nb").unwrap();
    assert_eq!(m.range(), 0..4);
}

/// `[^,]*` over `",abc"`: the negated class is expressed as its explicit
/// complement range list (this core takes normalized ranges, not negation
/// syntax); the leftmost position is a comma, so the only possible match is
/// the empty one at `0..0`.
#[test]
fn scenario_6_negated_class_star_matches_empty_at_comma() {
    let not_comma = Ast::char_class(vec![(0x00, 0x2B), (0x2D, 0x10FFFF)]);
    let ast = Ast::star(not_comma, true);
    let m = vm(&ast).search(b",abc").unwrap();
    assert_eq!(m.range(), 0..0);
}

/// A literal of non-ASCII codepoints over a haystack with an ASCII prefix:
/// `"привет"` is 12 bytes of UTF-8 and starts after `"hello "` (6 bytes).
#[test]
fn scenario_7_utf8_literal_reports_byte_offsets() {
    let ast = lit("привет");
    let haystack = "hello привет".as_bytes();
    assert_eq!("привет".len(), 12);
    let m = vm(&ast).search(haystack).unwrap();
    assert_eq!(m.range(), 6..18);
}

/// `test$` over `"xtest"`: an unanchored search still finds the
/// end-anchored match wherever it starts.
#[test]
fn scenario_8_end_anchored_literal_found_by_unanchored_search() {
    let ast = Ast::concat(vec![lit("test"), Ast::look(Op::EndText)]);
    let m = vm(&ast).search(b"xtest").unwrap();
    assert_eq!(m.range(), 1..5);
}
