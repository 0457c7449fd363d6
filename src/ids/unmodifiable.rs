//! Static (read-only) identity collections.

use super::array::SliceIter;
use super::traits::{check_slice_bounds, AnyModifiable, ArrayIds, ArrayView, Ids, SetIds};
use super::{Id, IdRef};
use crate::error::{IdError, Result};

/// Read-only wrapper around any identity collection.
///
/// Only the read capabilities of the wrapped collection are exposed, so
/// mutation is rejected at compile time rather than at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmodifiableIds<C> {
    inner: C,
}

impl<C: Ids> UnmodifiableIds<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Ids> Ids for UnmodifiableIds<C> {
    type Iter<'a>
        = C::Iter<'a>
    where
        Self: 'a;

    #[inline]
    fn iter(&self) -> Self::Iter<'_> {
        self.inner.iter()
    }

    #[inline]
    fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    fn contains(&self, id: &impl IdRef) -> bool {
        self.inner.contains(id)
    }

    fn is_set_like(&self) -> bool {
        self.inner.is_set_like()
    }

    fn as_array(&self) -> Option<ArrayView<'_>> {
        self.inner.as_array()
    }

    fn as_hash_set(&self) -> Option<&super::IdHashSet> {
        self.inner.as_hash_set()
    }

    fn into_modifiable(self) -> AnyModifiable {
        self.inner.into_modifiable()
    }
}

impl<C: ArrayIds> ArrayIds for UnmodifiableIds<C> {
    type Cursor<'a>
        = C::Cursor<'a>
    where
        Self: 'a;

    fn array_iter(&self) -> Self::Cursor<'_> {
        self.inner.array_iter()
    }

    fn get(&self, offset: usize) -> Result<Id> {
        self.inner.get(offset)
    }

    fn binary_search(&self, key: &impl IdRef) -> std::result::Result<usize, usize> {
        self.inner.binary_search(key)
    }

    fn slice(&self, begin: usize, end: usize) -> Result<ArrayView<'_>> {
        self.inner.slice(begin, end)
    }
}

impl<C: SetIds> SetIds for UnmodifiableIds<C> {}

/// The empty collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyIds;

impl Ids for EmptyIds {
    type Iter<'a>
        = SliceIter<'static>
    where
        Self: 'a;

    fn iter(&self) -> Self::Iter<'_> {
        SliceIter::new(&[])
    }

    fn len(&self) -> usize {
        0
    }

    fn contains(&self, _id: &impl IdRef) -> bool {
        false
    }

    fn is_set_like(&self) -> bool {
        true
    }

    fn as_array(&self) -> Option<ArrayView<'_>> {
        Some(ArrayView::Slice(&[]))
    }
}

impl ArrayIds for EmptyIds {
    type Cursor<'a>
        = SliceIter<'static>
    where
        Self: 'a;

    fn array_iter(&self) -> Self::Cursor<'_> {
        SliceIter::new(&[])
    }

    fn get(&self, offset: usize) -> Result<Id> {
        Err(IdError::out_of_range(offset, 0))
    }

    fn binary_search(&self, _key: &impl IdRef) -> std::result::Result<usize, usize> {
        Err(0)
    }

    fn slice(&self, begin: usize, end: usize) -> Result<ArrayView<'_>> {
        check_slice_bounds(begin, end, 0)?;
        Ok(ArrayView::Slice(&[]))
    }
}

impl SetIds for EmptyIds {}
