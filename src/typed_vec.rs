//! Vectors indexed by a newtype instead of a bare `usize`.
//!
//! [`define_index!`](crate::define_index) declares the newtype, [`IndexVec`]
//! is the storage. Mixing up indices of different kinds then fails to compile.

use std::{
    fmt,
    iter::{Enumerate, Map},
    marker::PhantomData,
    ops::{Index, IndexMut},
};

/// A `usize` newtype usable as an [`IndexVec`] index.
pub trait Idx: Copy + Eq + fmt::Debug {
    fn from_usize(index: usize) -> Self;
    fn to_usize(self) -> usize;
}

/// Declares a `pub usize` newtype implementing [`Idx`].
#[macro_export]
macro_rules! define_index {
    ($(#[$meta:meta])* $vis:vis struct $Idx:ident;) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $Idx(pub usize);

        impl $crate::typed_vec::Idx for $Idx {
            #[inline]
            fn from_usize(index: usize) -> Self {
                $Idx(index)
            }

            #[inline]
            fn to_usize(self) -> usize {
                self.0
            }
        }

        impl ::std::convert::From<usize> for $Idx {
            fn from(index: usize) -> Self {
                $Idx(index)
            }
        }

        impl ::std::convert::From<$Idx> for usize {
            fn from(index: $Idx) -> Self {
                index.0
            }
        }
    };
}

#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexVec<I, T> {
    raw: Vec<T>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: PhantomData<fn(&I)>,
}

type Enumerated<It, I, T> = Map<Enumerate<It>, fn((usize, T)) -> (I, T)>;

impl<I: Idx, T> IndexVec<I, T> {
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Appends `value` and returns its index.
    pub fn push(&mut self, value: T) -> I {
        self.raw.push(value);
        I::from_usize(self.raw.len() - 1)
    }

    pub fn get(&self, index: I) -> Option<&T> {
        self.raw.get(index.to_usize())
    }

    pub fn get_mut(&mut self, index: I) -> Option<&mut T> {
        self.raw.get_mut(index.to_usize())
    }

    pub fn iter(&self) -> Enumerated<std::slice::Iter<'_, T>, I, &T> {
        self.raw.iter().enumerate().map(|(i, t)| (I::from_usize(i), t))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.raw
    }
}

impl<I: Idx, T> Default for IndexVec<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, T: fmt::Debug> fmt::Debug for IndexVec<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.raw).finish()
    }
}

impl<I: Idx, T> Index<I> for IndexVec<I, T> {
    type Output = T;

    #[inline]
    fn index(&self, index: I) -> &T {
        &self.raw[index.to_usize()]
    }
}

impl<I: Idx, T> IndexMut<I> for IndexVec<I, T> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut T {
        &mut self.raw[index.to_usize()]
    }
}

impl<I, T> From<Vec<T>> for IndexVec<I, T> {
    fn from(raw: Vec<T>) -> Self {
        IndexVec {
            raw,
            index: PhantomData,
        }
    }
}

impl<I, T> FromIterator<T> for IndexVec<I, T> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<I: Idx, T> IntoIterator for IndexVec<I, T> {
    type Item = (I, T);
    type IntoIter = Enumerated<std::vec::IntoIter<T>, I, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.raw
            .into_iter()
            .enumerate()
            .map(|(i, t)| (I::from_usize(i), t))
    }
}

impl<'a, I: Idx, T> IntoIterator for &'a IndexVec<I, T> {
    type Item = (I, &'a T);
    type IntoIter = Enumerated<std::slice::Iter<'a, T>, I, &'a T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::define_index!(
        struct Slot;
    );

    #[test]
    fn indices_follow_insertion() {
        let mut v: IndexVec<Slot, &str> = IndexVec::new();
        assert_eq!(v.push("a"), Slot(0));
        assert_eq!(v.push("b"), Slot(1));
        assert_eq!(v[Slot(1)], "b");
        assert_eq!(v.get(Slot(2)), None);

        v[Slot(0)] = "z";
        let pairs: Vec<(Slot, &str)> = v.into_iter().collect();
        assert_eq!(pairs, vec![(Slot(0), "z"), (Slot(1), "b")]);
    }

    #[test]
    fn collects_and_debugs_like_a_vec() {
        let v: IndexVec<Slot, u8> = (1..=3).collect();
        assert_eq!(format!("{v:?}"), "[1, 2, 3]");
        assert_eq!(v.iter().map(|(i, _)| i.0).sum::<usize>(), 3);
        assert_eq!(usize::from(Slot::from(4)), 4);
    }
}
