//! Contiguous, immutable identity ranges.
//!
//! A range of `len` identities starting at `start` maps offsets to
//! identities by plain addition, so `get(offset_of(x)) == x` and
//! `offset_of(get(i)) == i` hold without any lookup table. Static datasets
//! use ranges to name their records compactly.

use std::fmt;

use super::cursor::{position, ArrayCursor, IdCursor};
use super::traits::{check_slice_bounds, ArrayIds, ArrayView, Ids, SetIds};
use super::{Id, IdRef};
use crate::error::{IdError, Result};

/// A static block of consecutive identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdRange {
    start: u32,
    len: u32,
}

impl IdRange {
    /// Range `start..start + len`.
    ///
    /// Fails with [`IdError::OutOfRange`] if the range would overflow the
    /// identity space.
    pub fn new(start: u32, len: u32) -> Result<Self> {
        if start.checked_add(len).is_none() {
            return Err(IdError::out_of_range(len as usize, (u32::MAX - start) as usize));
        }
        Ok(Self { start, len })
    }

    /// First identity of the range.
    #[inline]
    #[must_use]
    pub fn start(&self) -> u32 {
        self.start
    }

    /// One past the last identity of the range.
    #[inline]
    #[must_use]
    pub fn end(&self) -> u32 {
        self.start + self.len
    }

    /// Offset of `id` within the range.
    #[inline]
    pub fn offset_of(&self, id: &impl IdRef) -> Result<usize> {
        let index = id.internal_index();
        if index >= self.start && index < self.end() {
            Ok((index - self.start) as usize)
        } else {
            Err(IdError::out_of_range(
                index.wrapping_sub(self.start) as usize,
                self.len as usize,
            ))
        }
    }

    /// Whether `other` lies entirely inside this range.
    #[must_use]
    pub fn covers(&self, other: &IdRange) -> bool {
        other.start >= self.start && other.end() <= self.end()
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

/// Cursor over an [`IdRange`].
#[derive(Debug, Clone)]
pub struct RangeIter {
    start: u32,
    len: u32,
    pos: isize,
}

impl IdRef for RangeIter {
    /// Identity at the current position.
    ///
    /// # Panics
    ///
    /// If the cursor is not [`valid`](IdCursor::valid).
    #[inline]
    fn internal_index(&self) -> u32 {
        assert!(self.valid(), "range cursor dereferenced past its end");
        self.start.wrapping_add(self.pos as u32)
    }
}

impl IdCursor for RangeIter {
    #[inline]
    fn valid(&self) -> bool {
        position(self.pos, self.len as usize).is_some()
    }

    #[inline]
    fn advance(&mut self) -> &mut Self {
        self.pos += 1;
        self
    }
}

impl ArrayCursor for RangeIter {
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

impl Ids for IdRange {
    type Iter<'a>
        = RangeIter
    where
        Self: 'a;

    #[inline]
    fn iter(&self) -> Self::Iter<'_> {
        self.array_iter()
    }

    #[inline]
    fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    fn contains(&self, id: &impl IdRef) -> bool {
        self.offset_of(id).is_ok()
    }

    fn is_set_like(&self) -> bool {
        true
    }

    fn as_array(&self) -> Option<ArrayView<'_>> {
        Some(ArrayView::Range(*self))
    }
}

impl ArrayIds for IdRange {
    type Cursor<'a>
        = RangeIter
    where
        Self: 'a;

    #[inline]
    fn array_iter(&self) -> Self::Cursor<'_> {
        RangeIter {
            start: self.start,
            len: self.len,
            pos: 0,
        }
    }

    #[inline]
    fn get(&self, offset: usize) -> Result<Id> {
        if offset < self.len as usize {
            Ok(Id(self.start + offset as u32))
        } else {
            Err(IdError::out_of_range(offset, self.len as usize))
        }
    }

    fn binary_search(&self, key: &impl IdRef) -> std::result::Result<usize, usize> {
        let index = key.internal_index();
        if index < self.start {
            Err(0)
        } else if index >= self.end() {
            Err(self.len as usize)
        } else {
            Ok((index - self.start) as usize)
        }
    }

    fn slice(&self, begin: usize, end: usize) -> Result<ArrayView<'_>> {
        check_slice_bounds(begin, end, self.len as usize)?;
        Ok(ArrayView::Range(IdRange {
            start: self.start + begin as u32,
            len: (end - begin) as u32,
        }))
    }
}

impl SetIds for IdRange {}
