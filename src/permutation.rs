//! # Permutations
//!
//! Two layers:
//!
//! - [`Permutation`], a bijection of `0..n` stored by its direct mapping
//!   (`map[i]` is the image of `i`) and its inverse. It knows cycle
//!   decomposition, order, sign, composition and powers.
//! - [`analyze`], which takes a labelled mapping as a caller supplies it,
//!   checks that it really is a bijection of the element set, and reports its
//!   cycles and order in terms of the labels.
//!
//! ## Order
//!
//! The order of a permutation is the least common multiple of its cycle
//! lengths, folded from an accumulator of `1` with `lcm(a, b) = a / gcd(a, b) * b`.
//! It is computed in `u128` with checked multiplication, which cannot overflow
//! for any element set within the default limits.

use std::{fmt, ops::Index};

use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::element::{ElementIndex, ElementSet, InputError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PermutationError {
    #[error(transparent)]
    Malformed(#[from] InputError),

    #[error("mapping has {mapping} entries for {elements} elements")]
    LengthMismatch { elements: usize, mapping: usize },

    #[error("`{0}` is mapped to but is not a declared element")]
    UnknownImage(String),

    #[error(
        "not a bijection: duplicated [{}], missing [{}]",
        .duplicated.join(", "),
        .missing.join(", ")
    )]
    NotBijective {
        duplicated: Vec<String>,
        missing: Vec<String>,
    },

    #[error("cycles are not disjoint: {0} appears more than once")]
    OverlappingCycles(usize),

    #[error("the order does not fit in 128 bits")]
    OrderOverflow,
}

/// A permutation of `0..n`.
///
/// # Examples
///
/// ```
/// use latticework::permutation::Permutation;
///
/// // 0 -> 1 -> 2 -> 0, 3 fixed
/// let p = Permutation::from_map(vec![1, 2, 0, 3]);
/// assert_eq!(p.find_cycles(), vec![vec![0, 1, 2], vec![3]]);
/// assert_eq!(p.order(), Some(3));
/// assert_eq!(p.to_string(), "(0 1 2)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permutation {
    map: Vec<usize>,
    inv: Vec<usize>,
}

impl Permutation {
    /// The identity permutation of length `n`.
    pub fn id(n: usize) -> Self {
        Permutation {
            map: (0..n).collect(),
            inv: (0..n).collect(),
        }
    }

    /// Returns true if `map` sends `0..map.len()` bijectively onto itself.
    pub fn is_bijection(map: &[usize]) -> bool {
        let mut seen = vec![false; map.len()];
        map.iter()
            .all(|&j| j < map.len() && !std::mem::replace(&mut seen[j], true))
    }

    /// Creates a permutation from a mapping vector: `map[i]` is the image of `i`.
    ///
    /// # Panics
    ///
    /// Panics if `map` is not a bijection of `0..map.len()`; use
    /// [`Permutation::try_from_map`] for untrusted input.
    pub fn from_map(map: Vec<usize>) -> Self {
        assert!(Self::is_bijection(&map), "not a permutation: {map:?}");
        let mut inv = vec![0; map.len()];
        for (i, &j) in map.iter().enumerate() {
            inv[j] = i;
        }
        Permutation { map, inv }
    }

    pub fn try_from_map(map: Vec<usize>) -> Option<Self> {
        Self::is_bijection(&map).then(|| Self::from_map(map))
    }

    /// Creates a permutation of `0..n` from disjoint cycles, where `n` is one
    /// more than the largest index mentioned. Unmentioned indices are fixed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use latticework::permutation::Permutation;
    /// let p = Permutation::from_disjoint_cycles(&[vec![0, 1, 2], vec![3, 4]]).unwrap();
    /// assert_eq!(p.map(), &[1, 2, 0, 4, 3]);
    ///
    /// assert!(Permutation::from_disjoint_cycles(&[vec![0, 1], vec![1, 2]]).is_err());
    /// ```
    pub fn from_disjoint_cycles(cycles: &[Vec<usize>]) -> Result<Self, PermutationError> {
        let n = cycles
            .iter()
            .flatten()
            .max()
            .map(|&max| max + 1)
            .unwrap_or(0);

        let mut seen = vec![false; n];
        let mut map: Vec<usize> = (0..n).collect();
        for cycle in cycles {
            for (i, &from) in cycle.iter().enumerate() {
                if std::mem::replace(&mut seen[from], true) {
                    return Err(PermutationError::OverlappingCycles(from));
                }
                map[from] = cycle[(i + 1) % cycle.len()];
            }
        }
        Ok(Self::from_map(map))
    }

    pub fn map(&self) -> &[usize] {
        &self.map
    }

    pub fn inv(&self) -> &[usize] {
        &self.inv
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn inverse(&self) -> Self {
        Permutation {
            map: self.inv.clone(),
            inv: self.map.clone(),
        }
    }

    /// `(self ∘ other)(i) = self.map[other.map[i]]`: apply `other` first.
    pub fn compose(&self, other: &Self) -> Self {
        assert_eq!(self.len(), other.len());
        let map = other.map.iter().map(|&i| self.map[i]).collect();
        Self::from_map(map)
    }

    /// `self` composed with itself `k` times, by repeated squaring.
    pub fn pow(&self, k: usize) -> Self {
        let mut result = Permutation::id(self.len());
        let mut base = self.clone();
        let mut exp = k;

        while exp > 0 {
            if exp % 2 == 1 {
                result = result.compose(&base);
            }
            base = base.compose(&base);
            exp /= 2;
        }
        result
    }

    pub fn is_identity(&self) -> bool {
        self.map.iter().enumerate().all(|(i, &m)| i == m)
    }

    /// Cycle decomposition, fixed points included.
    ///
    /// Cycles start at the smallest index not yet visited and are listed in
    /// that order; `[0, 2, 1]` means `0 -> 2 -> 1 -> 0`.
    pub fn find_cycles(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.map.len()];
        let mut cycles = Vec::new();
        for i in 0..self.map.len() {
            if visited[i] {
                continue;
            }
            let mut cycle = Vec::new();
            let mut j = i;
            while !visited[j] {
                visited[j] = true;
                cycle.push(j);
                j = self.map[j];
            }
            cycles.push(cycle);
        }
        cycles
    }

    /// Cycle lengths, longest first.
    pub fn cycle_type(&self) -> Vec<usize> {
        self.find_cycles()
            .iter()
            .map(Vec::len)
            .sorted_unstable_by(|a, b| b.cmp(a))
            .collect()
    }

    /// The smallest `k > 0` with `self.pow(k)` the identity, or `None` if it
    /// does not fit in a `u128`.
    pub fn order(&self) -> Option<u128> {
        self.find_cycles()
            .iter()
            .map(|cycle| cycle.len() as u128)
            .try_fold(1, lcm)
    }

    /// `+1` for an even permutation, `-1` for an odd one.
    pub fn sign(&self) -> i8 {
        let transpositions: usize = self.find_cycles().iter().map(|c| c.len() - 1).sum();
        if transpositions % 2 == 0 {
            1
        } else {
            -1
        }
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn lcm(a: u128, b: u128) -> Option<u128> {
    (a / gcd(a, b)).checked_mul(b)
}

impl Index<usize> for Permutation {
    type Output = usize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.map[index]
    }
}

/// Cycle notation, fixed points omitted; the identity is `()`.
impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cycles = self.find_cycles();
        let mut nontrivial = cycles.iter().filter(|c| c.len() > 1).peekable();
        if nontrivial.peek().is_none() {
            return write!(f, "()");
        }
        for cycle in nontrivial {
            write!(f, "({})", cycle.iter().join(" "))?;
        }
        Ok(())
    }
}

/// A validated permutation of labelled elements.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PermutationAnalysis {
    pub elements: ElementSet,
    pub permutation: Permutation,
    /// Every element exactly once, fixed points as singleton cycles.
    pub cycles: Vec<Vec<String>>,
    pub order: u128,
}

impl PermutationAnalysis {
    pub fn sign(&self) -> i8 {
        self.permutation.sign()
    }

    pub fn cycle_type(&self) -> Vec<usize> {
        self.permutation.cycle_type()
    }

    pub fn is_identity(&self) -> bool {
        self.permutation.is_identity()
    }

    /// The image of `label`, if it is an element.
    pub fn image(&self, label: &str) -> Option<&str> {
        let i = self.elements.index_of(label)?;
        Some(self.elements.label(ElementIndex(self.permutation[i.0])))
    }

    /// Cycle notation over the labels, fixed points omitted.
    pub fn cycle_notation(&self) -> String {
        let notation: String = self
            .cycles
            .iter()
            .filter(|c| c.len() > 1)
            .map(|c| format!("({})", c.join(" ")))
            .collect();
        if notation.is_empty() {
            "()".to_string()
        } else {
            notation
        }
    }
}

impl fmt::Display for PermutationAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, order {}", self.cycle_notation(), self.order)
    }
}

/// Validates `mapping` as a permutation of `elements` and decomposes it.
///
/// `mapping[i]` is the label `elements[i]` is sent to.
///
/// # Examples
///
/// ```
/// # use latticework::{element::ElementSet, permutation::*};
/// let elements = ElementSet::new(["A", "B", "C", "D"]).unwrap();
/// let analysis = analyze(&elements, &["B", "A", "D", "C"]).unwrap();
/// assert_eq!(analysis.cycles, vec![vec!["A", "B"], vec!["C", "D"]]);
/// assert_eq!(analysis.order, 2);
///
/// let err = analyze(&elements, &["A", "A", "C", "D"]).unwrap_err();
/// assert_eq!(err.to_string(), "not a bijection: duplicated [A], missing [B]");
/// ```
pub fn analyze<S: AsRef<str>>(
    elements: &ElementSet,
    mapping: &[S],
) -> Result<PermutationAnalysis, PermutationError> {
    if mapping.len() != elements.len() {
        return Err(PermutationError::LengthMismatch {
            elements: elements.len(),
            mapping: mapping.len(),
        });
    }

    let map = mapping
        .iter()
        .map(|image| {
            let image = image.as_ref();
            elements
                .index_of(image)
                .map(|i| i.0)
                .ok_or_else(|| PermutationError::UnknownImage(image.to_string()))
        })
        .collect::<Result<Vec<usize>, _>>()?;

    let mut hits = elements.new_vec(|_| 0usize);
    for &j in &map {
        hits[ElementIndex(j)] += 1;
    }
    if hits.iter().any(|(_, &h)| h != 1) {
        let duplicated = hits.iter().filter(|&(_, &h)| h > 1).map(|(i, _)| i);
        let missing = hits.iter().filter(|&(_, &h)| h == 0).map(|(i, _)| i);
        return Err(PermutationError::NotBijective {
            duplicated: elements.labels_of(duplicated),
            missing: elements.labels_of(missing),
        });
    }

    let permutation = Permutation::from_map(map);
    let cycles = permutation
        .find_cycles()
        .into_iter()
        .map(|cycle| elements.labels_of(cycle.into_iter().map(ElementIndex)))
        .collect();
    let order = permutation
        .order()
        .ok_or(PermutationError::OrderOverflow)?;

    let analysis = PermutationAnalysis {
        elements: elements.clone(),
        permutation,
        cycles,
        order,
    };
    debug!(%analysis, "analyzed permutation");
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(labels: &[&str]) -> ElementSet {
        ElementSet::new(labels).unwrap()
    }

    #[test]
    fn three_cycle() {
        let analysis = analyze(&set(&["A", "B", "C"]), &["B", "C", "A"]).unwrap();
        assert_eq!(analysis.cycles, vec![vec!["A", "B", "C"]]);
        assert_eq!(analysis.order, 3);
        assert_eq!(analysis.sign(), 1);
        assert_eq!(analysis.to_string(), "(A B C), order 3");
        assert_eq!(analysis.image("C"), Some("A"));
        assert_eq!(analysis.image("Q"), None);
    }

    #[test]
    fn two_transpositions() {
        let analysis = analyze(&set(&["A", "B", "C", "D"]), &["B", "A", "D", "C"]).unwrap();
        assert_eq!(analysis.cycles, vec![vec!["A", "B"], vec!["C", "D"]]);
        assert_eq!(analysis.order, 2);
        assert_eq!(analysis.cycle_notation(), "(A B)(C D)");
    }

    #[test]
    fn identity() {
        let labels = ["p", "q", "r"];
        let analysis = analyze(&set(&labels), &labels).unwrap();
        assert!(analysis.is_identity());
        assert_eq!(analysis.cycles, vec![vec!["p"], vec!["q"], vec!["r"]]);
        assert_eq!(analysis.order, 1);
        assert_eq!(analysis.to_string(), "(), order 1");
    }

    #[test]
    fn empty() {
        let analysis = analyze::<&str>(&set(&[]), &[]).unwrap();
        assert!(analysis.cycles.is_empty());
        assert_eq!(analysis.order, 1);
    }

    #[test]
    fn mixed_cycle_lengths() {
        // (a b)(c d e), order lcm(2, 3) = 6
        let analysis = analyze(
            &set(&["a", "b", "c", "d", "e", "f"]),
            &["b", "a", "d", "e", "c", "f"],
        )
        .unwrap();
        assert_eq!(analysis.order, 6);
        assert_eq!(analysis.cycle_type(), vec![3, 2, 1]);
        assert_eq!(analysis.sign(), -1);
        assert!(analysis.permutation.pow(6).is_identity());
        assert!(!analysis.permutation.pow(3).is_identity());
    }

    #[test]
    fn not_bijective() {
        let err = analyze(&set(&["A", "B", "C"]), &["A", "A", "C"]).unwrap_err();
        assert_eq!(
            err,
            PermutationError::NotBijective {
                duplicated: vec!["A".into()],
                missing: vec!["B".into()],
            }
        );
    }

    #[test]
    fn foreign_and_short_mappings() {
        let elements = set(&["A", "B"]);
        assert_eq!(
            analyze(&elements, &["A", "X"]).unwrap_err(),
            PermutationError::UnknownImage("X".into())
        );
        assert_eq!(
            analyze(&elements, &["A"]).unwrap_err(),
            PermutationError::LengthMismatch {
                elements: 2,
                mapping: 1
            }
        );
    }

    #[test]
    fn compose_and_inverse() {
        let p = Permutation::from_map(vec![2, 0, 1, 3]);
        assert!(p.compose(&p.inverse()).is_identity());
        assert_eq!(p.compose(&p), p.pow(2));
        assert_eq!(p.inverse().map(), p.inv());
        assert_eq!(p[0], 2);
    }

    #[test]
    fn from_map_rejects_non_bijections() {
        assert!(Permutation::try_from_map(vec![0, 0]).is_none());
        assert!(Permutation::try_from_map(vec![0, 2]).is_none());
        assert!(Permutation::try_from_map(vec![1, 0]).is_some());
    }

    #[test]
    fn overlapping_cycles() {
        assert_eq!(
            Permutation::from_disjoint_cycles(&[vec![0, 1], vec![1, 2]]),
            Err(PermutationError::OverlappingCycles(1))
        );
        let p = Permutation::from_disjoint_cycles(&[vec![3]]).unwrap();
        assert!(p.is_identity());
        assert_eq!(p.len(), 4);
    }

    #[test]
    fn large_order() {
        // cycles of the first primes up to 23: order is their product
        let primes = [2usize, 3, 5, 7, 11, 13, 17, 19, 23];
        let mut start = 0;
        let cycles: Vec<Vec<usize>> = primes
            .iter()
            .map(|&p| {
                let cycle = (start..start + p).collect();
                start += p;
                cycle
            })
            .collect();
        let p = Permutation::from_disjoint_cycles(&cycles).unwrap();
        assert_eq!(p.order(), Some(223_092_870));
    }

    #[test]
    fn display() {
        insta::assert_snapshot!(Permutation::from_map(vec![1, 0, 3, 4, 2]).to_string(), @"(0 1)(2 3 4)");
        insta::assert_snapshot!(Permutation::id(3).to_string(), @"()");
    }
}
