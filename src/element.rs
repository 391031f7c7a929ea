//! # Element sets
//!
//! Every structure the engine inspects lives over a finite, ordered set of
//! labels. [`ElementSet`] owns those labels and hands out [`ElementIndex`]
//! values; the rest of the crate only ever talks in indices, so a label
//! lookup happens once, at the input boundary.
//!
//! Declaration order is significant: it is the enumeration order used when
//! searching for witnesses and counterexamples.

use std::fmt;

use indexmap::IndexSet;
use thiserror::Error;

use crate::{define_index, typed_vec::IndexVec};

define_index!(
    /// Position of an element in its [`ElementSet`].
    pub struct ElementIndex;
);

/// A vector with one slot per element.
pub type ElementVec<T> = IndexVec<ElementIndex, T>;

/// Default cap on the number of elements a single structure may hold.
pub const DEFAULT_MAX_ELEMENTS: usize = 256;

/// Bounds applied to caller supplied input.
///
/// All checks are at worst cubic in the element count, so the cap keeps
/// every call bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    pub max_elements: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }
}

/// Malformed input: the description handed to the engine does not even
/// describe a structure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputError {
    #[error("element `{0}` is declared more than once")]
    DuplicateElement(String),

    #[error("`{0}` is not a declared element")]
    UnknownElement(String),

    /// `count` is the number of labels supplied.
    #[error("{count} elements exceed the limit of {max}")]
    TooManyElements { count: usize, max: usize },
}

/// An ordered set of unique element labels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementSet {
    labels: IndexSet<String>,
}

impl ElementSet {
    /// Builds a set from labels in declaration order, with the default [`Limits`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use latticework::element::{ElementSet, InputError};
    /// let set = ElementSet::new(["A", "B", "C"]).unwrap();
    /// assert_eq!(set.len(), 3);
    ///
    /// assert_eq!(
    ///     ElementSet::new(["A", "B", "A"]),
    ///     Err(InputError::DuplicateElement("A".into()))
    /// );
    /// ```
    pub fn new<I, S>(labels: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_limits(labels, Limits::default())
    }

    pub fn with_limits<I, S>(labels: I, limits: Limits) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels = labels.into_iter();
        let mut set = IndexSet::new();
        while let Some(label) = labels.next() {
            let label = label.as_ref();
            if !set.insert(label.to_string()) {
                return Err(InputError::DuplicateElement(label.to_string()));
            }
            // the rest is only counted, never stored
            if set.len() > limits.max_elements {
                return Err(InputError::TooManyElements {
                    count: set.len() + labels.count(),
                    max: limits.max_elements,
                });
            }
        }
        Ok(ElementSet { labels: set })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn index_of(&self, label: &str) -> Option<ElementIndex> {
        self.labels.get_index_of(label).map(ElementIndex)
    }

    /// Like [`ElementSet::index_of`], but an unknown label is an error.
    pub fn require(&self, label: &str) -> Result<ElementIndex, InputError> {
        self.index_of(label)
            .ok_or_else(|| InputError::UnknownElement(label.to_string()))
    }

    /// # Panics
    ///
    /// Panics if `index` does not belong to this set.
    pub fn label(&self, index: ElementIndex) -> &str {
        &self.labels[index.0]
    }

    pub fn indices(&self) -> impl ExactSizeIterator<Item = ElementIndex> + Clone {
        (0..self.labels.len()).map(ElementIndex)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementIndex, &str)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, l)| (ElementIndex(i), l.as_str()))
    }

    /// A vector with one slot per element, filled by `init`.
    pub fn new_vec<T>(&self, init: impl FnMut(ElementIndex) -> T) -> ElementVec<T> {
        self.indices().map(init).collect()
    }

    /// Labels of `indices`, in the given order.
    pub fn labels_of(&self, indices: impl IntoIterator<Item = ElementIndex>) -> Vec<String> {
        indices
            .into_iter()
            .map(|i| self.label(i).to_string())
            .collect()
    }
}

impl fmt::Display for ElementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{label}")?;
        }
        write!(f, "}}")
    }
}
