//! Hash-set-backed identity collection.
//!
//! Members live in a dense vector with a position index on the side. This
//! keeps membership tests O(1) while letting iteration walk plain contiguous
//! memory, and it makes removal under a cursor well defined: the last member
//! is swapped into the hole and visited next.

use std::collections::HashMap;
use std::fmt;

use super::array::SliceIter;
use super::cursor::{position, IdCursor, IdCursorMut};
use super::traits::{AnyModifiable, Ids, ModifiableIds, SetIds};
use super::{Id, IdRef, IdVar};
use crate::error::{IdError, Result};

/// Modifiable set of identities with O(1) membership.
#[derive(Debug, Clone, Default)]
pub struct IdHashSet {
    dense: Vec<Id>,
    index: HashMap<Id, usize>,
}

impl IdHashSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Set of the distinct members of `source`.
    #[must_use]
    pub fn from_ids<C: Ids + ?Sized>(source: &C) -> Self {
        let mut set = Self::with_capacity(source.len());
        set.add_all(source);
        set
    }

    /// Members in storage order (unspecified, but stable between edits).
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Id] {
        &self.dense
    }

    /// Cursor that can replace and remove members while walking.
    pub fn iter_mut(&mut self) -> IdHashSetCursorMut<'_> {
        IdHashSetCursorMut { set: self, pos: 0 }
    }

    /// Keep only the members for which `keep` returns true.
    pub fn retain<F: FnMut(Id) -> bool>(&mut self, mut keep: F) {
        let mut pos = 0;
        while pos < self.dense.len() {
            if keep(self.dense[pos]) {
                pos += 1;
            } else {
                self.remove_position(pos);
            }
        }
    }

    fn remove_position(&mut self, pos: usize) -> Id {
        let removed = self.dense.swap_remove(pos);
        self.index.remove(&removed);
        if let Some(&moved) = self.dense.get(pos) {
            self.index.insert(moved, pos);
        }
        removed
    }
}

impl PartialEq for IdHashSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.dense.iter().all(|id| other.index.contains_key(id))
    }
}

impl Eq for IdHashSet {}

impl FromIterator<Id> for IdHashSet {
    fn from_iter<I: IntoIterator<Item = Id>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.add(&id);
        }
        set
    }
}

impl fmt::Display for IdHashSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::util::format_ids(self))
    }
}

impl Ids for IdHashSet {
    type Iter<'a>
        = SliceIter<'a>
    where
        Self: 'a;

    #[inline]
    fn iter(&self) -> Self::Iter<'_> {
        SliceIter::new(&self.dense)
    }

    #[inline]
    fn len(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    fn contains(&self, id: &impl IdRef) -> bool {
        self.index.contains_key(&id.id())
    }

    fn is_set_like(&self) -> bool {
        true
    }

    fn as_hash_set(&self) -> Option<&IdHashSet> {
        Some(self)
    }

    fn into_modifiable(self) -> AnyModifiable {
        AnyModifiable::HashSet(self)
    }
}

impl SetIds for IdHashSet {}

impl ModifiableIds for IdHashSet {
    fn add(&mut self, id: &impl IdRef) -> bool {
        let id = id.id();
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.dense.len());
        self.dense.push(id);
        true
    }

    fn remove(&mut self, id: &impl IdRef) -> bool {
        match self.index.get(&id.id()) {
            Some(&pos) => {
                self.remove_position(pos);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.dense.clear();
        self.index.clear();
    }

    fn pop(&mut self, var: &mut IdVar) -> Result<()> {
        let last = self.dense.pop().ok_or_else(|| IdError::out_of_range(0, 0))?;
        self.index.remove(&last);
        var.set(&last);
        Ok(())
    }
}

/// Mutable cursor over an [`IdHashSet`].
#[derive(Debug)]
pub struct IdHashSetCursorMut<'a> {
    set: &'a mut IdHashSet,
    pos: isize,
}

impl IdHashSetCursorMut<'_> {
    fn checked_position(&self) -> Result<usize> {
        position(self.pos, self.set.dense.len()).ok_or_else(|| {
            IdError::InvalidReference(format!(
                "cursor at {} outside set of size {}",
                self.pos,
                self.set.dense.len()
            ))
        })
    }
}

impl IdRef for IdHashSetCursorMut<'_> {
    /// # Panics
    ///
    /// Panics when the cursor is not valid.
    #[inline]
    fn internal_index(&self) -> u32 {
        self.set.dense[self.pos as usize].0
    }
}

impl IdCursor for IdHashSetCursorMut<'_> {
    #[inline]
    fn valid(&self) -> bool {
        position(self.pos, self.set.dense.len()).is_some()
    }

    #[inline]
    fn advance(&mut self) -> &mut Self {
        self.pos += 1;
        self
    }
}

impl IdCursorMut for IdHashSetCursorMut<'_> {
    /// Replace the current member.
    ///
    /// If `value` is already a member elsewhere, the current member is
    /// simply removed, keeping the set free of duplicates.
    fn set_current(&mut self, value: &impl IdRef) -> Result<()> {
        let pos = self.checked_position()?;
        let value = value.id();
        let current = self.set.dense[pos];
        if value == current {
            return Ok(());
        }
        if self.set.index.contains_key(&value) {
            return self.remove_current();
        }
        self.set.index.remove(&current);
        self.set.index.insert(value, pos);
        self.set.dense[pos] = value;
        Ok(())
    }

    fn remove_current(&mut self) -> Result<()> {
        let pos = self.checked_position()?;
        self.set.remove_position(pos);
        self.pos -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(raw: &[u32]) -> IdHashSet {
        raw.iter().map(|&i| Id(i)).collect()
    }

    #[test]
    fn add_is_idempotent() {
        let mut s = IdHashSet::new();
        assert!(s.add(&Id(1)));
        assert!(!s.add(&Id(1)));
        assert_eq!(s.len(), 1);
        assert!(s.contains(&Id(1)));
    }

    #[test]
    fn remove_keeps_index_consistent() {
        let mut s = set(&[1, 2, 3, 4]);
        assert!(s.remove(&Id(1)));
        assert!(!s.remove(&Id(1)));
        for i in 2..=4 {
            assert!(s.contains(&Id(i)));
            assert!(s.remove(&Id(i)));
        }
        assert!(s.is_empty());
    }

    #[test]
    fn equality_ignores_order() {
        assert_eq!(set(&[1, 2, 3]), set(&[3, 1, 2]));
        assert_ne!(set(&[1, 2]), set(&[1, 2, 3]));
    }

    #[test]
    fn cursor_removal_visits_swapped_member() {
        let mut s = set(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut it = s.iter_mut();
        while it.valid() {
            if it.internal_index() % 2 == 1 {
                it.remove_current().unwrap();
            }
            it.advance();
        }
        assert_eq!(s, set(&[2, 4, 6, 8]));
    }

    #[test]
    fn cursor_set_current_deduplicates() {
        let mut s = set(&[1, 2, 3]);
        let mut it = s.iter_mut();
        // Replace 1 by 2, which already exists.
        it.set_current(&Id(2)).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s, set(&[2, 3]));

        let mut it = s.iter_mut();
        it.set_current(&Id(9)).unwrap();
        assert!(s.contains(&Id(9)));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn pop_drains() {
        let mut s = set(&[5, 6]);
        let mut var = IdVar::new();
        s.pop(&mut var).unwrap();
        s.pop(&mut var).unwrap();
        assert!(s.pop(&mut var).is_err());
        assert!(s.is_empty());
    }

    #[test]
    fn retain_filters() {
        let mut s = set(&[1, 2, 3, 4, 5]);
        s.retain(|id| id.index() > 2);
        assert_eq!(s, set(&[3, 4, 5]));
    }
}
