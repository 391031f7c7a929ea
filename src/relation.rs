//! # Binary relations
//!
//! A [`Relation`] is a finite set of ordered pairs `(a, b)` over an
//! [`ElementSet`], read as `a ≤ b`. It is stored as one successor row per
//! element, so `relates(a, b)` is a single bit lookup.
//!
//! A relation is never *marked* as a partial order. Whether it is one is
//! re-derived by [`crate::validate`] on every call, so a caller can keep a
//! relation around, mutate it with [`Relation::insert`] / [`Relation::remove`]
//! and simply re-run the checks.
//!
//! Besides construction and queries this module provides the two derived
//! relations the analyzers and the graph editor care about:
//!
//! - [`Relation::reflexive_transitive_closure`]: the smallest reflexive and
//!   transitive relation containing `self`. Feeding it a Hasse diagram yields
//!   the full order.
//! - [`Relation::hasse_diagram`]: the covering pairs, i.e. the edges a
//!   diagram of the order actually draws.

use std::fmt;

use bitvec::vec::BitVec;
use itertools::Itertools;

use crate::{
    closure::{self, Direction},
    element::{ElementIndex, ElementSet, ElementVec, InputError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relation {
    elements: ElementSet,
    // successors[a][b] is set iff (a, b) is in the relation
    successors: ElementVec<BitVec>,
}

impl Relation {
    /// The empty relation over `elements`.
    pub fn empty(elements: ElementSet) -> Self {
        let n = elements.len();
        let successors = elements.new_vec(|_| BitVec::repeat(false, n));
        Relation {
            elements,
            successors,
        }
    }

    /// Builds a relation from labelled pairs.
    ///
    /// Every label must be declared in `elements`; repeating a pair is harmless.
    ///
    /// # Examples
    ///
    /// ```
    /// # use latticework::{element::ElementSet, relation::Relation};
    /// let elements = ElementSet::new(["A", "B"]).unwrap();
    /// let r = Relation::new(elements.clone(), [("A", "A"), ("A", "B"), ("B", "B")]).unwrap();
    /// assert_eq!(r.to_string(), "{(A, A), (A, B), (B, B)}");
    ///
    /// assert!(Relation::new(elements, [("A", "C")]).is_err());
    /// ```
    pub fn new<I, A, B>(elements: ElementSet, pairs: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut relation = Relation::empty(elements);
        for (a, b) in pairs {
            let a = relation.elements.require(a.as_ref())?;
            let b = relation.elements.require(b.as_ref())?;
            relation.insert(a, b);
        }
        Ok(relation)
    }

    /// The identity relation `{(a, a)}`, the discrete order.
    pub fn identity(elements: ElementSet) -> Self {
        let mut relation = Relation::empty(elements);
        for a in relation.elements.indices() {
            relation.insert(a, a);
        }
        relation
    }

    pub fn elements(&self) -> &ElementSet {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.successors.iter().map(|(_, row)| row.count_ones()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.iter().all(|(_, row)| row.not_any())
    }

    /// Returns true if and only if `(a, b)` is in the relation.
    ///
    /// Indices from another element set simply do not relate.
    pub fn relates(&self, a: ElementIndex, b: ElementIndex) -> bool {
        self.successors
            .get(a)
            .and_then(|row| row.get(b.0).map(|bit| *bit))
            .unwrap_or(false)
    }

    /// Adds `(a, b)`, returning whether it was new.
    ///
    /// # Panics
    ///
    /// Panics if either index is outside the element set.
    pub fn insert(&mut self, a: ElementIndex, b: ElementIndex) -> bool {
        assert!(a.0 < self.elements.len() && b.0 < self.elements.len());
        let row = &mut self.successors[a];
        let was = row[b.0];
        row.set(b.0, true);
        !was
    }

    /// Removes `(a, b)`, returning whether it was present.
    pub fn remove(&mut self, a: ElementIndex, b: ElementIndex) -> bool {
        let Some(row) = self.successors.get_mut(a) else {
            return false;
        };
        if b.0 >= row.len() {
            return false;
        }
        let was = row[b.0];
        row.set(b.0, false);
        was
    }

    /// Elements `b` with `(a, b)` in the relation, in declaration order.
    pub fn successors(&self, a: ElementIndex) -> impl Iterator<Item = ElementIndex> + '_ {
        self.successors
            .get(a)
            .into_iter()
            .flat_map(|row| row.iter_ones().map(ElementIndex))
    }

    /// Elements `b` with `(b, a)` in the relation, in declaration order.
    pub fn predecessors(&self, a: ElementIndex) -> impl Iterator<Item = ElementIndex> + '_ {
        self.elements.indices().filter(move |&b| self.relates(b, a))
    }

    /// All pairs, row by row in declaration order.
    pub fn pairs(&self) -> impl Iterator<Item = (ElementIndex, ElementIndex)> + '_ {
        self.elements
            .indices()
            .flat_map(move |a| self.successors(a).map(move |b| (a, b)))
    }

    pub fn label_pairs(&self) -> Vec<(String, String)> {
        self.pairs()
            .map(|(a, b)| {
                (
                    self.elements.label(a).to_string(),
                    self.elements.label(b).to_string(),
                )
            })
            .collect()
    }

    /// The smallest reflexive and transitive relation containing `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use latticework::{element::ElementSet, relation::Relation, validate::validate};
    /// let elements = ElementSet::new(["a", "b", "c"]).unwrap();
    /// let chain = Relation::new(elements, [("a", "b"), ("b", "c")]).unwrap();
    /// let order = chain.reflexive_transitive_closure();
    /// assert!(order.relates(0.into(), 2.into()));
    /// assert!(validate(&order).is_valid());
    /// ```
    pub fn reflexive_transitive_closure(&self) -> Self {
        let successors = closure::upper_sets(self);
        Relation {
            elements: self.elements.clone(),
            successors,
        }
    }

    /// The covering pairs of the order generated by `self`.
    ///
    /// `a` is covered by `b` when `a < b` and nothing lies strictly between
    /// them. Strictness is taken from reachability, so elements on a common
    /// cycle are never covers of each other.
    pub fn hasse_diagram(&self) -> HasseDiagram {
        let up = closure::upper_sets(self);
        let lt = |a: ElementIndex, b: ElementIndex| up[a][b.0] && !up[b][a.0];

        let covers = self
            .elements
            .indices()
            .cartesian_product(self.elements.indices())
            .filter(|&(a, b)| lt(a, b))
            .filter(|&(a, b)| !self.elements.indices().any(|c| lt(a, c) && lt(c, b)))
            .collect();

        HasseDiagram {
            elements: self.elements.clone(),
            covers,
        }
    }

    /// Reachability from `start` in the given direction, see [`closure::reachable`].
    pub fn reachable(&self, start: ElementIndex, direction: Direction) -> BitVec {
        closure::reachable(self, start, direction)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.pairs()
                .map(|(a, b)| format!("({}, {})", self.elements.label(a), self.elements.label(b)))
                .join(", ")
        )
    }
}

/// Covering pairs of an order, ready to be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HasseDiagram {
    pub elements: ElementSet,
    pub covers: Vec<(ElementIndex, ElementIndex)>,
}

impl HasseDiagram {
    pub fn label_covers(&self) -> Vec<(String, String)> {
        self.covers
            .iter()
            .map(|&(a, b)| {
                (
                    self.elements.label(a).to_string(),
                    self.elements.label(b).to_string(),
                )
            })
            .collect()
    }

    /// Graphviz rendering, one node per element and one edge per cover,
    /// drawn bottom to top.
    pub fn dot(&self) -> String {
        let mut out = String::new();
        self.dot_fmt(&mut out)
            .expect("writing to a String cannot fail");
        out
    }

    pub fn dot_fmt(&self, writer: &mut impl fmt::Write) -> fmt::Result {
        writeln!(writer, "digraph {{")?;
        writeln!(writer, "  rankdir=BT;")?;
        for (_, label) in self.elements.iter() {
            writeln!(writer, "  {label:?};")?;
        }
        for (a, b) in self.label_covers() {
            writeln!(writer, "  {a:?} -> {b:?};")?;
        }
        writeln!(writer, "}}")
    }
}

impl fmt::Display for HasseDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.dot_fmt(f)
    }
}
