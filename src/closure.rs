//! # Reachability
//!
//! One breadth-first traversal serves both directions. [`Direction::Forward`]
//! follows `(a, b)` from `a` to `b` and collects the elements *above* the
//! start; [`Direction::Backward`] reads every pair the other way round and
//! collects the elements *below* it. The pair orientation is the only thing
//! that changes, so the two queries cannot drift apart.
//!
//! The start element is not part of its own reachable set unless a cycle or
//! self-loop leads back to it. [`upper_set`] and [`lower_set`] add it, which
//! is what the order-theoretic checks want.

use std::collections::VecDeque;

use bitvec::vec::BitVec;
use tracing::trace;

use crate::{
    element::{ElementIndex, ElementVec},
    relation::Relation,
};

/// Which way to follow the pairs of a relation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// From `a` to `b` for every `(a, b)`: towards larger elements.
    Forward,
    /// From `b` to `a` for every `(a, b)`: towards smaller elements.
    Backward,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    fn follows(self, relation: &Relation, from: ElementIndex, to: ElementIndex) -> bool {
        match self {
            Direction::Forward => relation.relates(from, to),
            Direction::Backward => relation.relates(to, from),
        }
    }
}

/// The set of elements reachable from `start` by following at least one pair
/// in `direction`.
///
/// Each element is visited at most once, so cycles terminate. A `start` that
/// does not belong to the relation's element set reaches nothing.
///
/// # Examples
///
/// ```
/// # use latticework::{closure::{reachable, Direction}, element::ElementSet, relation::Relation};
/// let elements = ElementSet::new(["a", "b", "c"]).unwrap();
/// let r = Relation::new(elements, [("a", "b"), ("b", "c")]).unwrap();
///
/// let above_a = reachable(&r, 0.into(), Direction::Forward);
/// assert_eq!(above_a.iter_ones().collect::<Vec<_>>(), vec![1, 2]);
///
/// let below_c = reachable(&r, 2.into(), Direction::Backward);
/// assert_eq!(below_c.iter_ones().collect::<Vec<_>>(), vec![0, 1]);
/// ```
pub fn reachable(relation: &Relation, start: ElementIndex, direction: Direction) -> BitVec {
    let elements = relation.elements();
    let mut visited = BitVec::repeat(false, elements.len());
    if start.0 >= elements.len() {
        return visited;
    }

    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in elements.indices() {
            if visited[next.0] || !direction.follows(relation, current, next) {
                continue;
            }
            visited.set(next.0, true);
            queue.push_back(next);
        }
    }

    trace!(
        start = elements.label(start),
        ?direction,
        reached = visited.count_ones(),
        "reachability"
    );
    visited
}

/// Label based variant of [`reachable`]; an unknown label reaches nothing.
pub fn reachable_from(relation: &Relation, label: &str, direction: Direction) -> Vec<String> {
    let elements = relation.elements();
    match elements.index_of(label) {
        Some(start) => {
            elements.labels_of(reachable(relation, start, direction).iter_ones().map(ElementIndex))
        }
        None => Vec::new(),
    }
}

/// Elements above `start`: everything forward-reachable.
pub fn descendants(relation: &Relation, start: ElementIndex) -> Vec<ElementIndex> {
    reachable(relation, start, Direction::Forward)
        .iter_ones()
        .map(ElementIndex)
        .collect()
}

/// Elements below `start`: everything backward-reachable.
pub fn ancestors(relation: &Relation, start: ElementIndex) -> Vec<ElementIndex> {
    reachable(relation, start, Direction::Backward)
        .iter_ones()
        .map(ElementIndex)
        .collect()
}

fn closed_sets(relation: &Relation, direction: Direction) -> ElementVec<BitVec> {
    relation.elements().new_vec(|x| {
        let mut set = reachable(relation, x, direction);
        set.set(x.0, true);
        set
    })
}

/// For every element `x`, the set `{x} ∪ reachable(x, Forward)`.
pub fn upper_sets(relation: &Relation) -> ElementVec<BitVec> {
    closed_sets(relation, Direction::Forward)
}

/// For every element `x`, the set `{x} ∪ reachable(x, Backward)`.
pub fn lower_sets(relation: &Relation) -> ElementVec<BitVec> {
    closed_sets(relation, Direction::Backward)
}

/// `{x} ∪ reachable(x, Forward)` for a single element.
pub fn upper_set(relation: &Relation, x: ElementIndex) -> BitVec {
    let mut set = reachable(relation, x, Direction::Forward);
    if x.0 < set.len() {
        set.set(x.0, true);
    }
    set
}

/// `{x} ∪ reachable(x, Backward)` for a single element.
pub fn lower_set(relation: &Relation, x: ElementIndex) -> BitVec {
    let mut set = reachable(relation, x, Direction::Backward);
    if x.0 < set.len() {
        set.set(x.0, true);
    }
    set
}
