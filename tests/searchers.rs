//! Each specialized searcher is a fast path for one narrow `Ast` shape;
//! this checks every one of them against the general Pike VM on the shape
//! it claims to recognize, and that each correctly declines shapes outside
//! its domain.

#![cfg(all(feature = "nfa-pikevm", feature = "searcher"))]

use thompson_regex_core::{
    ast::{Ast, Flags, Op},
    nfa::thompson::{compiler::extract_first_bytes, pikevm::PikeVM, Compiler},
    searcher::{BranchDispatcher, CharClassSearcher, CompositeSearcher, CompositeSequenceDFA, FirstByteSet},
};

fn lit(s: &str) -> Ast {
    Ast::literal(s.chars().map(|c| c as u32).collect(), Flags::empty())
}

fn digit_class() -> Ast {
    Ast::char_class(vec![(b'0' as u32, b'9' as u32)])
}

fn lower_class() -> Ast {
    Ast::char_class(vec![(b'a' as u32, b'z' as u32)])
}

fn vm(ast: &Ast) -> PikeVM {
    let nfa = Compiler::new().build(ast).unwrap();
    PikeVM::new(nfa, Default::default())
}

#[test]
fn char_class_searcher_agrees_with_pikevm_on_digit_runs() {
    let ast = Ast::plus(digit_class(), true);
    let searcher = CharClassSearcher::try_from_ast(&ast).unwrap();
    for haystack in [&b"abc123xyz"[..], b"", b"42", b"no digits here"] {
        assert_eq!(searcher.search(haystack), vm(&ast).search(haystack));
    }
}

#[test]
fn char_class_searcher_rejects_non_class_shapes() {
    assert!(CharClassSearcher::try_from_ast(&lit("abc")).is_none());
}

#[test]
fn composite_searcher_agrees_with_pikevm_on_lower_then_digit() {
    let ast = Ast::concat(vec![Ast::plus(lower_class(), true), Ast::plus(digit_class(), true)]);
    let searcher = CompositeSearcher::try_from_ast(&ast).unwrap();
    for haystack in [&b"abc123"[..], b"x1", b"999", b""] {
        assert_eq!(searcher.search(haystack), vm(&ast).search(haystack));
    }
}

#[test]
fn composite_searcher_rejects_single_part_concat() {
    let ast = Ast::concat(vec![Ast::plus(digit_class(), true)]);
    assert!(CompositeSearcher::try_from_ast(&ast).is_none());
}

#[test]
fn composite_sequence_dfa_agrees_with_pikevm_and_composite_searcher() {
    let ast = Ast::concat(vec![Ast::plus(lower_class(), true), Ast::plus(digit_class(), true)]);
    let dfa = CompositeSequenceDFA::try_from_ast(&ast).unwrap();
    let searcher = CompositeSearcher::try_from_ast(&ast).unwrap();
    for haystack in [&b"abc123"[..], b"x1", b"999", b""] {
        let expected = vm(&ast).search(haystack);
        assert_eq!(dfa.search(haystack), expected);
        assert_eq!(searcher.search(haystack), expected);
    }
}

#[test]
fn composite_sequence_dfa_rejects_star_first_part() {
    // A `Star` part may match zero bytes, violating "every part requires
    // at least one byte" that the DFA construction relies on.
    let ast = Ast::concat(vec![Ast::star(lower_class(), true), Ast::plus(digit_class(), true)]);
    assert!(CompositeSequenceDFA::try_from_ast(&ast).is_none());
}

#[test]
fn branch_dispatcher_agrees_with_pikevm_on_disjoint_literal_branches() {
    let ast = Ast::alternate(vec![lit("cat"), lit("dog"), lit("fish")]);
    let dispatcher = BranchDispatcher::try_from_ast(&ast).unwrap();
    for haystack in [&b"a dog ran"[..], b"catfish", b"no pets", b""] {
        assert_eq!(dispatcher.search(haystack), vm(&ast).search(haystack));
    }
}

#[test]
fn branch_dispatcher_rejects_overlapping_first_bytes() {
    let ast = Ast::alternate(vec![lit("cat"), lit("car")]);
    assert!(BranchDispatcher::try_from_ast(&ast).is_none());
}

#[test]
fn first_byte_set_matches_extracted_literal_prefixes() {
    let ast = Ast::alternate(vec![lit("cat"), lit("dog")]);
    let bytes = extract_first_bytes(&ast).unwrap();
    let set = FirstByteSet::new(Some(bytes)).unwrap();
    assert!(set.contains(b'c'));
    assert!(set.contains(b'd'));
    assert!(!set.contains(b'x'));
    assert_eq!(set.count(), 2);

    let haystack = b"a dog and a cat";
    assert_eq!(set.find(haystack, 0), Some(2));
    assert_eq!(set.find(haystack, 3), Some(12));
    assert_eq!(set.find(haystack, 13), None);
}

#[test]
fn first_byte_set_rejects_empty_and_universal_sets() {
    assert!(FirstByteSet::new(None).is_none());
    assert!(FirstByteSet::new(Some([false; 256])).is_none());
    assert!(FirstByteSet::new(Some([true; 256])).is_none());
}

#[test]
fn first_byte_set_agrees_with_pikevm_start_position() {
    let ast = Ast::alternate(vec![lit("cat"), lit("dog")]);
    let bytes = extract_first_bytes(&ast).unwrap();
    let set = FirstByteSet::new(Some(bytes)).unwrap();

    let haystack = b"zzz dog here";
    let found = set.find(haystack, 0).unwrap();
    assert_eq!(Some(found), vm(&ast).search(haystack).map(|m| m.start()));
}
