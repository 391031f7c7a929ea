//! # Lattice analysis
//!
//! Bounds are computed from reachability, never from the raw pairs, so the
//! analysis also runs on a bare Hasse diagram or on a relation that is not
//! yet a partial order. The answers are only *meaningful* for a validated
//! partial order; on anything else they describe the preorder generated by
//! the relation. Nothing here checks the axioms, see [`crate::validate`].
//!
//! For a pair `a, b` the supremum candidates are the common upper bounds
//! `up(a) ∩ up(b)`, where `up(x)` is `x` plus everything forward-reachable
//! from it. The supremum is the one candidate lying below every other
//! candidate. When there is no candidate the result is [`Bound::None`]; when
//! no single candidate is least, the minimal candidates are reported as
//! [`Bound::NotUnique`] instead of picking one. Infima are the mirror image
//! over `down(x)`.

use std::fmt;

use bitvec::vec::BitVec;
use itertools::Itertools;
use tracing::debug;

use crate::{
    closure,
    element::{ElementIndex, ElementSet, ElementVec},
    relation::Relation,
};

/// The bound of a pair, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bound {
    Unique(String),
    /// No common upper (or lower) bound at all.
    None,
    /// Common bounds exist, but these minimal (or maximal) ones are incomparable.
    NotUnique(Vec<String>),
}

impl Bound {
    pub fn unique(&self) -> Option<&str> {
        match self {
            Bound::Unique(x) => Some(x.as_str()),
            _ => None,
        }
    }

    pub fn exists(&self) -> bool {
        matches!(self, Bound::Unique(_))
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Unique(x) => write!(f, "{x}"),
            Bound::None => write!(f, "none"),
            Bound::NotUnique(xs) => write!(f, "not unique ({})", xs.join(", ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairBounds {
    pub a: String,
    pub b: String,
    pub supremum: Bound,
    pub infimum: Bound,
}

impl PairBounds {
    pub fn is_complete(&self) -> bool {
        self.supremum.exists() && self.infimum.exists()
    }
}

impl fmt::Display for PairBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}: sup {}, inf {}",
            self.a, self.b, self.supremum, self.infimum
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatticeAnalysis {
    pub elements: ElementSet,
    /// One entry per unordered pair of distinct elements, `(i, j)` with `i < j`
    /// in declaration order.
    pub pairs: Vec<PairBounds>,
    pub is_lattice: bool,
    /// The first pair lacking a unique supremum or infimum.
    pub counterexample: Option<PairBounds>,
}

impl LatticeAnalysis {
    fn pair(&self, a: &str, b: &str) -> Option<&PairBounds> {
        self.pairs
            .iter()
            .find(|p| (p.a == a && p.b == b) || (p.a == b && p.b == a))
    }

    /// The least upper bound of `a` and `b`, if it exists.
    ///
    /// # Examples
    ///
    /// ```
    /// # use latticework::analyze_lattice;
    /// let analysis = analyze_lattice(
    ///     &["0", "x", "y", "1"],
    ///     &[("0", "x"), ("0", "y"), ("x", "1"), ("y", "1")],
    /// )
    /// .unwrap();
    /// assert_eq!(analysis.join("x", "y"), Some("1"));
    /// assert_eq!(analysis.meet("y", "x"), Some("0"));
    /// assert_eq!(analysis.join("x", "x"), Some("x"));
    /// ```
    pub fn join(&self, a: &str, b: &str) -> Option<&str> {
        if a == b {
            return self.elements.index_of(a).map(|i| self.elements.label(i));
        }
        self.pair(a, b).and_then(|p| p.supremum.unique())
    }

    /// The greatest lower bound of `a` and `b`, if it exists.
    pub fn meet(&self, a: &str, b: &str) -> Option<&str> {
        if a == b {
            return self.elements.index_of(a).map(|i| self.elements.label(i));
        }
        self.pair(a, b).and_then(|p| p.infimum.unique())
    }
}

impl fmt::Display for LatticeAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pair in &self.pairs {
            writeln!(f, "{pair}")?;
        }
        match &self.counterexample {
            None if self.is_lattice => write!(f, "lattice"),
            Some(p) => write!(f, "not a lattice: {}, {}", p.a, p.b),
            None => write!(f, "not a lattice"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundedVerdict {
    Bounded { bottom: String, top: String },
    Unbounded,
    Ambiguous { bottoms: Vec<String>, tops: Vec<String> },
}

impl fmt::Display for BoundedVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundedVerdict::Bounded { bottom, top } => {
                write!(f, "bounded: bottom {bottom}, top {top}")
            }
            BoundedVerdict::Unbounded => write!(f, "unbounded"),
            BoundedVerdict::Ambiguous { bottoms, tops } => write!(
                f,
                "ambiguous: bottoms [{}], tops [{}]",
                bottoms.join(", "),
                tops.join(", ")
            ),
        }
    }
}

/// Picks the candidate lying below every other candidate.
///
/// `dominated[c]` holds everything `c` lies below: the upper set of `c` when
/// looking for a supremum, its lower set when looking for an infimum. Both are
/// closed under reachability, which the single pass below relies on: if some
/// candidate lies below all others, the pass ends on it or on a candidate
/// equivalent to it.
fn extremum(
    elements: &ElementSet,
    candidates: &BitVec,
    dominated: &ElementVec<BitVec>,
) -> Bound {
    let Some(first) = candidates.first_one() else {
        return Bound::None;
    };
    let below = |c: usize, d: usize| dominated[ElementIndex(c)][d];

    let least = candidates
        .iter_ones()
        .fold(first, |m, d| if below(d, m) { d } else { m });

    if candidates.iter_ones().all(|d| below(least, d)) {
        // Several mutually reachable candidates: only possible off a partial order.
        let extreme: Vec<ElementIndex> = candidates
            .iter_ones()
            .filter(|&d| below(d, least))
            .map(ElementIndex)
            .collect();
        return match extreme.as_slice() {
            [single] => Bound::Unique(elements.label(*single).to_string()),
            _ => Bound::NotUnique(elements.labels_of(extreme)),
        };
    }

    // d strictly beats c when c is dominated by d but not the other way round
    let minimal = candidates.iter_ones().filter(|&c| {
        !candidates
            .iter_ones()
            .any(|d| d != c && below(d, c) && !below(c, d))
    });
    Bound::NotUnique(elements.labels_of(minimal.map(ElementIndex)))
}

fn common(x: &BitVec, y: &BitVec) -> BitVec {
    let mut both = x.clone();
    both &= y.as_bitslice();
    both
}

/// Supremum and infimum of every unordered pair, and the lattice verdict.
///
/// # Examples
///
/// ```
/// # use latticework::{element::ElementSet, relation::Relation, lattice::*};
/// // Two maximal elements: x and y have no common upper bound.
/// let elements = ElementSet::new(["0", "x", "y"]).unwrap();
/// let v = Relation::new(elements, [("0", "x"), ("0", "y")]).unwrap();
/// let analysis = analyze(&v);
/// assert!(!analysis.is_lattice);
/// let bad = analysis.counterexample.unwrap();
/// assert_eq!((bad.a.as_str(), bad.b.as_str()), ("x", "y"));
/// assert_eq!(bad.supremum, Bound::None);
/// ```
pub fn analyze(relation: &Relation) -> LatticeAnalysis {
    let elements = relation.elements();
    let up = closure::upper_sets(relation);
    let down = closure::lower_sets(relation);

    let pairs: Vec<PairBounds> = elements
        .indices()
        .tuple_combinations()
        .map(|(a, b)| PairBounds {
            a: elements.label(a).to_string(),
            b: elements.label(b).to_string(),
            supremum: extremum(elements, &common(&up[a], &up[b]), &up),
            infimum: extremum(elements, &common(&down[a], &down[b]), &down),
        })
        .collect();

    let counterexample = pairs.iter().find(|p| !p.is_complete()).cloned();
    let is_lattice = counterexample.is_none();
    debug!(
        elements = elements.len(),
        pairs = pairs.len(),
        is_lattice,
        "analyzed lattice"
    );

    LatticeAnalysis {
        elements: elements.clone(),
        pairs,
        is_lattice,
        counterexample,
    }
}

/// Looks for a global bottom and top.
///
/// A bottom candidate lies below every element; a top candidate lies above
/// every element. An empty candidate list wins over an ambiguous one.
pub fn check_bounded(relation: &Relation) -> BoundedVerdict {
    let elements = relation.elements();
    let up = closure::upper_sets(relation);

    let bottoms: Vec<ElementIndex> = elements.indices().filter(|&x| up[x].all()).collect();
    let tops: Vec<ElementIndex> = elements
        .indices()
        .filter(|&x| elements.indices().all(|y| up[y][x.0]))
        .collect();

    let verdict = match (bottoms.as_slice(), tops.as_slice()) {
        ([], _) | (_, []) => BoundedVerdict::Unbounded,
        ([bottom], [top]) => BoundedVerdict::Bounded {
            bottom: elements.label(*bottom).to_string(),
            top: elements.label(*top).to_string(),
        },
        _ => BoundedVerdict::Ambiguous {
            bottoms: elements.labels_of(bottoms.iter().copied()),
            tops: elements.labels_of(tops.iter().copied()),
        },
    };
    debug!(%verdict, "checked bounds");
    verdict
}
