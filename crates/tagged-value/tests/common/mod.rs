//! Helpers shared by the integration tests.
#![allow(dead_code)]

use tagged_value::{Mapping, Value};

/// Whether every mapping and artefact content in `a` lists its names in the
/// same order as its counterpart in `b`.
///
/// `Value` equality ignores entry order, so round-trip tests check this
/// separately.
pub fn same_order(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Mapping(a), Value::Mapping(b)) => same_entry_order(a, b),
        (Value::Artefact(a), Value::Artefact(b)) => same_entry_order(&a.content, &b.content),
        (Value::Sequence(a), Value::Sequence(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_order(a, b))
        }
        (a, b) => a.tag() == b.tag(),
    }
}

fn same_entry_order(a: &Mapping, b: &Mapping) -> bool {
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|((name_a, a), (name_b, b))| name_a == name_b && same_order(a, b))
}

pub fn assert_same_order(a: &Value, b: &Value) {
    assert!(same_order(a, b), "entry order differs:\n{:?}\n{:?}", a, b);
}
