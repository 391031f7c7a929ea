//! # Partial order validation
//!
//! [`validate`] checks the three partial order axioms in a fixed order:
//!
//! 1. reflexivity
//! 2. antisymmetry
//! 3. transitivity
//!
//! and stops at the first failure. The reported [`Violation`] carries the
//! offending element, pair or triple, found by scanning elements in
//! declaration order, so the same relation always yields the same verdict.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::{element::ElementIndex, relation::Relation};

/// The axiom a relation failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViolationKind {
    NotReflexive,
    NotAntisymmetric,
    NotTransitive,
}

/// A failed axiom together with its witness.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Violation {
    #[error("not reflexive: ({element}, {element}) is missing")]
    NotReflexive { element: String },

    #[error("not antisymmetric: both ({a}, {b}) and ({b}, {a}) are present")]
    NotAntisymmetric { a: String, b: String },

    #[error("not transitive: ({a}, {b}) and ({b}, {c}) are present but ({a}, {c}) is missing")]
    NotTransitive { a: String, b: String, c: String },
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::NotReflexive { .. } => ViolationKind::NotReflexive,
            Violation::NotAntisymmetric { .. } => ViolationKind::NotAntisymmetric,
            Violation::NotTransitive { .. } => ViolationKind::NotTransitive,
        }
    }

    /// The labels naming the offending element, pair or triple.
    pub fn witness(&self) -> Vec<&str> {
        match self {
            Violation::NotReflexive { element } => vec![element.as_str()],
            Violation::NotAntisymmetric { a, b } => vec![a.as_str(), b.as_str()],
            Violation::NotTransitive { a, b, c } => vec![a.as_str(), b.as_str(), c.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verdict {
    Valid,
    Invalid(Violation),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(v) => Some(v),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Valid => write!(f, "partial order"),
            Verdict::Invalid(v) => write!(f, "{v}"),
        }
    }
}

/// Decides whether `relation` is a partial order.
///
/// # Examples
///
/// ```
/// # use latticework::{element::ElementSet, relation::Relation, validate::*};
/// let elements = ElementSet::new(["A", "B"]).unwrap();
/// let r = Relation::new(elements, [("A", "A"), ("A", "B")]).unwrap();
/// assert_eq!(
///     validate(&r),
///     Verdict::Invalid(Violation::NotReflexive { element: "B".into() })
/// );
/// ```
pub fn validate(relation: &Relation) -> Verdict {
    let verdict = match check_partial_order(relation) {
        Ok(()) => Verdict::Valid,
        Err(violation) => Verdict::Invalid(violation),
    };
    debug!(elements = relation.elements().len(), %verdict, "validated relation");
    verdict
}

/// [`validate`] as a `Result`, for callers that want to `?` through it.
pub fn check_partial_order(relation: &Relation) -> Result<(), Violation> {
    check_reflexive(relation)?;
    check_antisymmetric(relation)?;
    check_transitive(relation)
}

pub fn check_reflexive(relation: &Relation) -> Result<(), Violation> {
    let elements = relation.elements();
    match elements.indices().find(|&a| !relation.relates(a, a)) {
        Some(a) => Err(Violation::NotReflexive {
            element: elements.label(a).to_string(),
        }),
        None => Ok(()),
    }
}

pub fn check_antisymmetric(relation: &Relation) -> Result<(), Violation> {
    let elements = relation.elements();
    for (a, b) in relation.pairs() {
        if a < b && relation.relates(b, a) {
            return Err(Violation::NotAntisymmetric {
                a: elements.label(a).to_string(),
                b: elements.label(b).to_string(),
            });
        }
    }
    Ok(())
}

pub fn check_transitive(relation: &Relation) -> Result<(), Violation> {
    match find_intransitive(relation) {
        Some((a, b, c)) => {
            let elements = relation.elements();
            Err(Violation::NotTransitive {
                a: elements.label(a).to_string(),
                b: elements.label(b).to_string(),
                c: elements.label(c).to_string(),
            })
        }
        None => Ok(()),
    }
}

fn find_intransitive(relation: &Relation) -> Option<(ElementIndex, ElementIndex, ElementIndex)> {
    for (a, b) in relation.pairs() {
        if let Some(c) = relation.successors(b).find(|&c| !relation.relates(a, c)) {
            return Some((a, b, c));
        }
    }
    None
}
