//! Array-backed identity collections.

use std::cmp::Ordering;
use std::fmt;

use super::cursor::{position, ArrayCursor, IdCursor, IdCursorMut};
use super::traits::{
    check_slice_bounds, AnyModifiable, ArrayIds, ArrayModifiableIds, ArrayView, Ids,
    ModifiableIds, SetIds,
};
use super::{Id, IdRef, IdVar};
use crate::error::{IdError, Result};

/// Random-access cursor over a slice of identities.
#[derive(Debug, Clone)]
pub struct SliceIter<'a> {
    data: &'a [Id],
    pos: isize,
}

impl<'a> SliceIter<'a> {
    #[inline]
    pub fn new(data: &'a [Id]) -> Self {
        Self { data, pos: 0 }
    }
}

impl IdRef for SliceIter<'_> {
    /// # Panics
    ///
    /// Panics when the cursor is not [`valid`](IdCursor::valid), like slice
    /// indexing does. Use [`IdCursor::try_id`] for a checked access.
    #[inline]
    fn internal_index(&self) -> u32 {
        self.data[self.pos as usize].0
    }
}

impl IdCursor for SliceIter<'_> {
    #[inline]
    fn valid(&self) -> bool {
        position(self.pos, self.data.len()).is_some()
    }

    #[inline]
    fn advance(&mut self) -> &mut Self {
        self.pos += 1;
        self
    }
}

impl ArrayCursor for SliceIter<'_> {
    #[inline]
    fn offset(&self) -> isize {
        self.pos
    }

    #[inline]
    fn seek(&mut self, offset: isize) -> &mut Self {
        self.pos = offset;
        self
    }
}

/// Ordered, modifiable array of identities.
///
/// Preserves insertion order; random access is O(1), positional insertion
/// and removal O(n).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IdArray {
    ids: Vec<Id>,
}

impl IdArray {
    #[must_use]
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
        }
    }

    /// Copy of an arbitrary collection, in its iteration order.
    #[must_use]
    pub fn from_ids<C: Ids + ?Sized>(source: &C) -> Self {
        if let Some(ArrayView::Slice(s)) = source.as_array() {
            return Self { ids: s.to_vec() };
        }
        let mut ids = Vec::with_capacity(source.len());
        let mut it = source.iter();
        while it.valid() {
            ids.push(it.id());
            it.advance();
        }
        Self { ids }
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Id] {
        &self.ids
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Id] {
        &mut self.ids
    }

    /// Cursor that can replace and remove elements while walking.
    pub fn iter_mut(&mut self) -> IdArrayCursorMut<'_> {
        IdArrayCursorMut {
            ids: &mut self.ids,
            pos: 0,
        }
    }

    /// Drop everything from `len` on.
    pub fn truncate(&mut self, len: usize) {
        self.ids.truncate(len);
    }

    pub fn reserve(&mut self, additional: usize) {
        self.ids.reserve(additional);
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Id> {
        self.ids
    }
}

impl From<Vec<Id>> for IdArray {
    fn from(ids: Vec<Id>) -> Self {
        Self { ids }
    }
}

impl From<Vec<u32>> for IdArray {
    fn from(raw: Vec<u32>) -> Self {
        Self {
            ids: raw.into_iter().map(Id).collect(),
        }
    }
}

impl FromIterator<Id> for IdArray {
    fn from_iter<I: IntoIterator<Item = Id>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for IdArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::util::format_ids(self))
    }
}

impl Ids for IdArray {
    type Iter<'a>
        = SliceIter<'a>
    where
        Self: 'a;

    #[inline]
    fn iter(&self) -> Self::Iter<'_> {
        SliceIter::new(&self.ids)
    }

    #[inline]
    fn len(&self) -> usize {
        self.ids.len()
    }

    fn contains(&self, id: &impl IdRef) -> bool {
        self.ids.contains(&id.id())
    }

    fn as_array(&self) -> Option<ArrayView<'_>> {
        Some(ArrayView::Slice(&self.ids))
    }

    fn into_modifiable(self) -> AnyModifiable {
        AnyModifiable::Array(self)
    }
}

impl ArrayIds for IdArray {
    type Cursor<'a>
        = SliceIter<'a>
    where
        Self: 'a;

    #[inline]
    fn array_iter(&self) -> Self::Cursor<'_> {
        SliceIter::new(&self.ids)
    }

    #[inline]
    fn get(&self, offset: usize) -> Result<Id> {
        self.ids
            .get(offset)
            .copied()
            .ok_or_else(|| IdError::out_of_range(offset, self.ids.len()))
    }

    fn binary_search(&self, key: &impl IdRef) -> std::result::Result<usize, usize> {
        self.ids.binary_search(&key.id())
    }

    fn slice(&self, begin: usize, end: usize) -> Result<ArrayView<'_>> {
        check_slice_bounds(begin, end, self.ids.len())?;
        Ok(ArrayView::Slice(&self.ids[begin..end]))
    }
}

impl ModifiableIds for IdArray {
    #[inline]
    fn add(&mut self, id: &impl IdRef) -> bool {
        self.ids.push(id.id());
        true
    }

    fn remove(&mut self, id: &impl IdRef) -> bool {
        let target = id.id();
        match self.ids.iter().position(|&x| x == target) {
            Some(offset) => {
                self.ids.remove(offset);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.ids.clear();
    }

    fn pop(&mut self, var: &mut IdVar) -> Result<()> {
        let last = self.ids.pop().ok_or_else(|| IdError::out_of_range(0, 0))?;
        var.set(&last);
        Ok(())
    }
}

impl ArrayModifiableIds for IdArray {
    fn set(&mut self, offset: usize, id: &impl IdRef) -> Result<Id> {
        let len = self.ids.len();
        let slot = self
            .ids
            .get_mut(offset)
            .ok_or_else(|| IdError::out_of_range(offset, len))?;
        Ok(std::mem::replace(slot, id.id()))
    }

    fn insert(&mut self, offset: usize, id: &impl IdRef) -> Result<()> {
        if offset > self.ids.len() {
            return Err(IdError::out_of_range(offset, self.ids.len()));
        }
        self.ids.insert(offset, id.id());
        Ok(())
    }

    fn remove_at(&mut self, offset: usize) -> Result<Id> {
        if offset >= self.ids.len() {
            return Err(IdError::out_of_range(offset, self.ids.len()));
        }
        Ok(self.ids.remove(offset))
    }

    fn remove_swap(&mut self, offset: usize) -> Result<Id> {
        if offset >= self.ids.len() {
            return Err(IdError::out_of_range(offset, self.ids.len()));
        }
        Ok(self.ids.swap_remove(offset))
    }

    fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let len = self.ids.len();
        if a >= len || b >= len {
            return Err(IdError::out_of_range(a.max(b), len));
        }
        self.ids.swap(a, b);
        Ok(())
    }

    fn sort(&mut self) {
        self.ids.sort_unstable();
    }

    fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(Id, Id) -> Ordering,
    {
        self.ids.sort_by(|a, b| compare(*a, *b));
    }
}

/// Mutable random-access cursor over an [`IdArray`].
#[derive(Debug)]
pub struct IdArrayCursorMut<'a> {
    ids: &'a mut Vec<Id>,
    pos: isize,
}

impl IdRef for IdArrayCursorMut<'_> {
    /// # Panics
    ///
    /// Panics when the cursor is not valid.
    #[inline]
    fn internal_index(&self) -> u32 {
        self.ids[self.pos as usize].0
    }
}

impl IdCursor for IdArrayCursorMut<'_> {
    #[inline]
    fn valid(&self) -> bool {
        position(self.pos, self.ids.len()).is_some()
    }

    #[inline]
    fn advance(&mut self) -> &mut Self {
        self.pos += 1;
        self
    }
}

impl ArrayCursor for IdArrayCursorMut<'_> {
    #[inline]
    fn offset(&self) -> isize {
        self.pos
    }

    #[inline]
    fn seek(&mut self, offset: isize) -> &mut Self {
        self.pos = offset;
        self
    }
}

impl IdCursorMut for IdArrayCursorMut<'_> {
    fn set_current(&mut self, value: &impl IdRef) -> Result<()> {
        let idx = self.checked_position()?;
        self.ids[idx] = value.id();
        Ok(())
    }

    fn remove_current(&mut self) -> Result<()> {
        let idx = self.checked_position()?;
        self.ids.remove(idx);
        self.pos -= 1;
        Ok(())
    }
}

impl IdArrayCursorMut<'_> {
    fn checked_position(&self) -> Result<usize> {
        position(self.pos, self.ids.len()).ok_or_else(|| {
            IdError::InvalidReference(format!(
                "cursor at {} outside array of length {}",
                self.pos,
                self.ids.len()
            ))
        })
    }
}

// A single identity is a one-element array and a (trivially O(1)) set.

impl Ids for Id {
    type Iter<'a>
        = SliceIter<'a>
    where
        Self: 'a;

    fn iter(&self) -> Self::Iter<'_> {
        SliceIter::new(std::slice::from_ref(self))
    }

    fn len(&self) -> usize {
        1
    }

    fn contains(&self, id: &impl IdRef) -> bool {
        *self == id.id()
    }

    fn is_set_like(&self) -> bool {
        true
    }

    fn as_array(&self) -> Option<ArrayView<'_>> {
        Some(ArrayView::Slice(std::slice::from_ref(self)))
    }
}

impl ArrayIds for Id {
    type Cursor<'a>
        = SliceIter<'a>
    where
        Self: 'a;

    fn array_iter(&self) -> Self::Cursor<'_> {
        SliceIter::new(std::slice::from_ref(self))
    }

    fn get(&self, offset: usize) -> Result<Id> {
        if offset == 0 {
            Ok(*self)
        } else {
            Err(IdError::out_of_range(offset, 1))
        }
    }

    fn binary_search(&self, key: &impl IdRef) -> std::result::Result<usize, usize> {
        std::slice::from_ref(self).binary_search(&key.id())
    }

    fn slice(&self, begin: usize, end: usize) -> Result<ArrayView<'_>> {
        check_slice_bounds(begin, end, 1)?;
        Ok(ArrayView::Slice(&std::slice::from_ref(self)[begin..end]))
    }
}

impl SetIds for Id {}
