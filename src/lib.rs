//! # Latticework
//!
//! Latticework verifies relational structures over small finite sets of
//! labelled elements and analyzes permutations of them. It answers four
//! questions:
//!
//! - is this relation a partial order, and if not, which element, pair or
//!   triple breaks which axiom? ([`validate`])
//! - does every pair of elements have a unique least upper and greatest lower
//!   bound, and is there a single bottom and top? ([`lattice`])
//! - which elements lie above or below a given one? ([`closure`])
//! - is this mapping a bijection, and what are its cycles and order?
//!   ([`permutation`])
//!
//! Every call is a pure function of its input. Nothing is cached and nothing
//! is remembered between calls; an application that lets a user edit a
//! relation simply re-runs the checks after each edit.
//!
//! The typed API works on [`relation::Relation`] and
//! [`element::ElementSet`]. The functions at the crate root are label based
//! conveniences that build those from slices:
//!
//! ```
//! use latticework::{check_bounded, validate_relation, lattice::BoundedVerdict};
//!
//! let elements = ["A", "B", "C", "D"];
//! let pairs = [
//!     ("A", "A"), ("A", "B"), ("A", "C"), ("A", "D"),
//!     ("B", "B"), ("B", "D"),
//!     ("C", "C"), ("C", "D"),
//!     ("D", "D"),
//! ];
//! assert!(validate_relation(&elements, &pairs).unwrap().is_valid());
//! assert_eq!(
//!     check_bounded(&elements, &pairs).unwrap(),
//!     BoundedVerdict::Bounded { bottom: "A".into(), top: "D".into() }
//! );
//! ```

pub mod typed_vec;

pub mod closure;
pub mod element;
pub mod lattice;
pub mod parser;
pub mod permutation;
pub mod relation;
pub mod validate;

use element::{ElementSet, InputError};
use lattice::{BoundedVerdict, LatticeAnalysis};
use permutation::{PermutationAnalysis, PermutationError};
use relation::Relation;
use validate::Verdict;

fn relation_of<S: AsRef<str>>(elements: &[S], pairs: &[(S, S)]) -> Result<Relation, InputError> {
    let elements = ElementSet::new(elements)?;
    Relation::new(elements, pairs.iter().map(|(a, b)| (a, b)))
}

/// Decides whether `pairs` is a partial order on `elements`.
pub fn validate_relation<S: AsRef<str>>(
    elements: &[S],
    pairs: &[(S, S)],
) -> Result<Verdict, InputError> {
    Ok(validate::validate(&relation_of(elements, pairs)?))
}

/// Pairwise bounds and the lattice verdict for `pairs` on `elements`.
pub fn analyze_lattice<S: AsRef<str>>(
    elements: &[S],
    pairs: &[(S, S)],
) -> Result<LatticeAnalysis, InputError> {
    Ok(lattice::analyze(&relation_of(elements, pairs)?))
}

/// Looks for a unique bottom and top element.
pub fn check_bounded<S: AsRef<str>>(
    elements: &[S],
    pairs: &[(S, S)],
) -> Result<BoundedVerdict, InputError> {
    Ok(lattice::check_bounded(&relation_of(elements, pairs)?))
}

/// Validates `mapping` as a permutation of `elements`: `elements[i]` is sent
/// to `mapping[i]`.
///
/// ```
/// # use latticework::analyze_permutation;
/// let analysis = analyze_permutation(&["A", "B", "C"], &["B", "C", "A"]).unwrap();
/// assert_eq!(analysis.to_string(), "(A B C), order 3");
/// ```
pub fn analyze_permutation<S: AsRef<str>>(
    elements: &[S],
    mapping: &[S],
) -> Result<PermutationAnalysis, PermutationError> {
    permutation::analyze(&ElementSet::new(elements)?, mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{Violation, ViolationKind};

    #[test]
    fn malformed_input_is_an_error_not_a_verdict() {
        assert_eq!(
            validate_relation(&["A", "A"], &[]),
            Err(InputError::DuplicateElement("A".into()))
        );
        assert_eq!(
            analyze_lattice(&["A"], &[("A", "B")]).unwrap_err(),
            InputError::UnknownElement("B".into())
        );
        assert_eq!(
            analyze_permutation(&["A", "A"], &["A", "A"]),
            Err(PermutationError::Malformed(InputError::DuplicateElement(
                "A".into()
            )))
        );
    }

    #[test]
    fn label_level_round_trip() {
        let verdict = validate_relation(&["A", "B"], &[("A", "A"), ("A", "B")]).unwrap();
        assert_eq!(
            verdict.violation().map(Violation::kind),
            Some(ViolationKind::NotReflexive)
        );

        let elements: Vec<String> = vec!["x".into(), "y".into()];
        let pairs: Vec<(String, String)> = vec![("x".into(), "y".into())];
        assert!(analyze_lattice(&elements, &pairs).unwrap().is_lattice);
    }
}
