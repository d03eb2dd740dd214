//! Alphabet-reduction soundness: any two bytes the compiler puts in the
//! same class must appear identically in every transition interval of the
//! compiled NFA. If they didn't, an engine dispatching on class instead of
//! raw byte would behave differently than one dispatching on the byte
//! itself, which is exactly what the reduction promises never happens.

#![cfg(feature = "syntax")]

use thompson_regex_core::{
    ast::{Ast, Flags},
    nfa::thompson::{Compiler, State},
};

fn lit(s: &str) -> Ast {
    Ast::literal(s.chars().map(|c| c as u32).collect(), Flags::empty())
}

fn assert_classes_sound(ast: &Ast) {
    let nfa = Compiler::new().build(ast).unwrap();
    let classes = nfa.byte_classes();

    let mut intervals = Vec::new();
    for state in nfa.states() {
        match state {
            State::ByteRange { trans } => intervals.push((trans.lo, trans.hi)),
            State::Sparse { transitions } => {
                intervals.extend(transitions.iter().map(|t| (t.lo, t.hi)));
            }
            _ => {}
        }
    }

    for b1 in 0..=255u8 {
        for b2 in (b1 + 1)..=255u8 {
            if classes.get(b1) != classes.get(b2) {
                continue;
            }
            for &(lo, hi) in &intervals {
                let in1 = lo <= b1 && b1 <= hi;
                let in2 = lo <= b2 && b2 <= hi;
                assert_eq!(
                    in1, in2,
                    "bytes {b1:#04x} and {b2:#04x} share class {} but disagree on interval {lo:#04x}..={hi:#04x}",
                    classes.get(b1),
                );
            }
            if b2 == 255 {
                break;
            }
        }
    }
}

#[test]
fn digit_class_alphabet_is_sound() {
    assert_classes_sound(&Ast::char_class(vec![(b'0' as u32, b'9' as u32)]));
}

#[test]
fn disjoint_classes_alphabet_is_sound() {
    let ast = Ast::alternate(vec![
        Ast::char_class(vec![(b'a' as u32, b'z' as u32)]),
        Ast::char_class(vec![(b'A' as u32, b'Z' as u32)]),
    ]);
    assert_classes_sound(&ast);
}

#[test]
fn literal_concat_alphabet_is_sound() {
    let ast = Ast::concat(vec![lit("foo"), Ast::char_class(vec![(b'0' as u32, b'9' as u32)])]);
    assert_classes_sound(&ast);
}

#[test]
fn wide_utf8_class_alphabet_is_sound() {
    assert_classes_sound(&Ast::char_class(vec![(0x0, 0x10FFFF)]));
}
