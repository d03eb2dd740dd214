//! Property 3: reversing a compiled NFA and walking it backward from a
//! known end position answers the same question the forward NFA would,
//! just from the other direction. `nfa::thompson::reverse` already carries
//! unit tests pinned to a plain literal; this exercises a pattern with a
//! quantified character class and an internal capture, which forces the
//! reversal to merge several distinct forward predecessors into one
//! `Sparse` state and to thread a `Capture` state through correctly.

#![cfg(feature = "nfa-pikevm")]

use thompson_regex_core::{
    ast::{Ast, Flags},
    nfa::thompson::{pikevm::PikeVM, reverse, Compiler},
    Anchored, Input,
};

fn lit(s: &str) -> Ast {
    Ast::literal(s.chars().map(|c| c as u32).collect(), Flags::empty())
}

fn digit_class() -> Ast {
    Ast::char_class(vec![(b'0' as u32, b'9' as u32)])
}

/// `v(\d+).log`: a literal prefix, a captured run of digits, and a literal
/// suffix, compiled anchored so the reverse graph excludes the unanchored
/// prefix entirely.
fn pattern() -> Ast {
    Ast::concat(vec![
        lit("v"),
        Ast::capture(Ast::plus(digit_class(), true), 1, String::new()),
        lit(".log"),
    ])
}

#[test]
fn reverse_walk_finds_same_span_as_forward_search() {
    let ast = pattern();
    let fwd = Compiler::new().build(&ast).unwrap();
    let rev = reverse::reverse(&fwd, true).unwrap();

    let haystack = b"rotate v42.log now";
    let fvm = PikeVM::new(fwd, Default::default());
    let m = fvm.search(haystack).unwrap();
    assert_eq!(m.range(), 7..14);

    let mut reversed_haystack = haystack.to_vec();
    reversed_haystack.reverse();
    let start_in_reversed = reversed_haystack.len() - m.end();

    let rvm = PikeVM::new(rev, Default::default());
    let input = Input::new(&reversed_haystack)
        .span(start_in_reversed..reversed_haystack.len())
        .anchored(Anchored::Yes);
    let rm = rvm.try_search(&input).unwrap();
    assert_eq!(rm.end() - rm.start(), m.end() - m.start());
}

#[test]
fn reverse_walk_rejects_a_haystack_with_no_forward_match() {
    let ast = pattern();
    let fwd = Compiler::new().build(&ast).unwrap();
    let rev = reverse::reverse(&fwd, true).unwrap();

    // "v.log" has no digits between the prefix and suffix, so neither
    // direction should find a match ending here.
    let haystack = b"v.log";
    let mut reversed_haystack = haystack.to_vec();
    reversed_haystack.reverse();

    let rvm = PikeVM::new(rev, Default::default());
    let input = Input::new(&reversed_haystack).anchored(Anchored::Yes);
    assert_eq!(rvm.try_search(&input), None);
}

#[test]
fn reverse_of_unanchored_build_is_never_smaller_than_anchored_reverse() {
    let ast = lit("needle");
    let fwd = Compiler::new()
        .configure(thompson_regex_core::nfa::thompson::Config::new().anchored(false))
        .build(&ast)
        .unwrap();
    let rev_anchored = reverse::reverse(&fwd, true).unwrap();
    let rev_full = reverse::reverse(&fwd, false).unwrap();
    assert!(rev_anchored.num_states() <= rev_full.num_states());
}
