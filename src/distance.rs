//! Distance-annotated identities and lists thereof.
//!
//! A [`DistanceIdPair`] tags an identity with the `f64` distance a caller
//! computed for it. Lists of such pairs carry no ordering until sorted; the
//! k-NN types in [`crate::knn`] are the sorted, immutable variety, while
//! [`DistanceIdArray`] is the general modifiable one (used e.g. to collect
//! all distances of a query and then quickselect a percentile).
//!
//! Distances are ordered with `f64::total_cmp`, so NaN never breaks sorting
//! or selection: it simply sorts after `+inf`.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{IdError, Result};
use crate::ids::cursor::position;
use crate::ids::{ArrayCursor, Id, IdCursor, IdCursorMut, IdRef};

/// An identity tagged with a distance.
#[derive(Debug, Clone, Copy)]
pub struct DistanceIdPair {
    pub distance: f64,
    pub id: Id,
}

impl DistanceIdPair {
    #[inline]
    #[must_use]
    pub fn new(distance: f64, id: &impl IdRef) -> Self {
        Self {
            distance,
            id: id.id(),
        }
    }
}

impl IdRef for DistanceIdPair {
    #[inline]
    fn internal_index(&self) -> u32 {
        self.id.internal_index()
    }
}

// Ordered by distance first, identity second, so ties break deterministically.
impl Ord for DistanceIdPair {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for DistanceIdPair {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DistanceIdPair {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DistanceIdPair {}

impl fmt::Display for DistanceIdPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.distance)
    }
}

/// Read access shared by every list of distance pairs.
pub trait DistanceIdList {
    /// The pairs, in list order.
    fn as_pairs(&self) -> &[DistanceIdPair];

    #[inline]
    fn size(&self) -> usize {
        self.as_pairs().len()
    }

    /// Pair at `offset`.
    fn pair(&self, offset: usize) -> Result<DistanceIdPair> {
        let pairs = self.as_pairs();
        pairs
            .get(offset)
            .copied()
            .ok_or_else(|| IdError::out_of_range(offset, pairs.len()))
    }

    /// Distance at `offset`.
    fn distance(&self, offset: usize) -> Result<f64> {
        self.pair(offset).map(|p| p.distance)
    }

    /// Cursor over the pairs that also exposes the current distance.
    fn pairs_iter(&self) -> DistanceIdIter<'_> {
        DistanceIdIter::new(self.as_pairs())
    }
}

/// Cursor over a distance list.
#[derive(Debug, Clone)]
pub struct DistanceIdIter<'a> {
    pairs: &'a [DistanceIdPair],
    pos: isize,
}

impl<'a> DistanceIdIter<'a> {
    #[inline]
    pub fn new(pairs: &'a [DistanceIdPair]) -> Self {
        Self { pairs, pos: 0 }
    }

    /// Distance of the current pair.
    ///
    /// # Panics
    ///
    /// Panics when the cursor is not valid.
    #[inline]
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.pairs[self.pos as usize].distance
    }

    /// Checked copy of the current pair.
    pub fn pair(&self) -> Result<DistanceIdPair> {
        position(self.pos, self.pairs.len())
            .map(|i| self.pairs[i])
            .ok_or_else(|| IdError::InvalidReference("cursor is past the end of the list".into()))
    }
}

impl IdRef for DistanceIdIter<'_> {
    #[inline]
    fn internal_index(&self) -> u32 {
        self.pairs[self.pos as usize].id.0
    }
}

impl IdCursor for DistanceIdIter<'_> {
    #[inline]
    fn valid(&self) -> bool {
        position(self.pos, self.pairs.len()).is_some()
    }

    #[inline]
    fn advance(&mut self) -> &mut Self {
        self.pos += 1;
        self
    }
}

impl ArrayCursor for DistanceIdIter<'_> {
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

/// Implements [`Ids`](crate::ids::Ids) for a distance list type.
macro_rules! distance_list_ids {
    ($ty:ty $(, $lt:lifetime)?) => {
        impl$(<$lt>)? $crate::ids::Ids for $ty {
            type Iter<'a>
                = $crate::distance::DistanceIdIter<'a>
            where
                Self: 'a;

            #[inline]
            fn iter(&self) -> Self::Iter<'_> {
                $crate::distance::DistanceIdList::pairs_iter(self)
            }

            #[inline]
            fn len(&self) -> usize {
                $crate::distance::DistanceIdList::as_pairs(self).len()
            }

            fn contains(&self, id: &impl $crate::ids::IdRef) -> bool {
                let id = $crate::ids::IdRef::id(id);
                $crate::distance::DistanceIdList::as_pairs(self)
                    .iter()
                    .any(|p| p.id == id)
            }
        }
    };
}
pub(crate) use distance_list_ids;

/// Modifiable, unordered list of distance pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceIdArray {
    pairs: Vec<DistanceIdPair>,
}

impl DistanceIdArray {
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn add(&mut self, distance: f64, id: &impl IdRef) {
        self.pairs.push(DistanceIdPair::new(distance, id));
    }

    #[inline]
    pub fn add_pair(&mut self, pair: DistanceIdPair) {
        self.pairs.push(pair);
    }

    /// Overwrite the pair at `offset`.
    pub fn set(&mut self, offset: usize, distance: f64, id: &impl IdRef) -> Result<()> {
        let len = self.pairs.len();
        let slot = self
            .pairs
            .get_mut(offset)
            .ok_or_else(|| IdError::out_of_range(offset, len))?;
        *slot = DistanceIdPair::new(distance, id);
        Ok(())
    }

    /// Remove at `offset`, preserving order. O(n).
    pub fn remove_at(&mut self, offset: usize) -> Result<DistanceIdPair> {
        if offset >= self.pairs.len() {
            return Err(IdError::out_of_range(offset, self.pairs.len()));
        }
        Ok(self.pairs.remove(offset))
    }

    /// Remove at `offset` by moving the last pair into its place. O(1).
    pub fn remove_swap(&mut self, offset: usize) -> Result<DistanceIdPair> {
        if offset >= self.pairs.len() {
            return Err(IdError::out_of_range(offset, self.pairs.len()));
        }
        Ok(self.pairs.swap_remove(offset))
    }

    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let len = self.pairs.len();
        if a >= len || b >= len {
            return Err(IdError::out_of_range(a.max(b), len));
        }
        self.pairs.swap(a, b);
        Ok(())
    }

    /// Sort ascending by distance (ties by identity).
    pub fn sort(&mut self) {
        self.pairs.sort_unstable();
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    pub fn truncate(&mut self, len: usize) {
        self.pairs.truncate(len);
    }

    #[inline]
    pub fn as_mut_pairs(&mut self) -> &mut [DistanceIdPair] {
        &mut self.pairs
    }

    /// Cursor that can edit the list while walking it.
    pub fn iter_mut(&mut self) -> DistanceIdCursorMut<'_> {
        DistanceIdCursorMut {
            pairs: &mut self.pairs,
            pos: 0,
        }
    }
}

impl DistanceIdList for DistanceIdArray {
    #[inline]
    fn as_pairs(&self) -> &[DistanceIdPair] {
        &self.pairs
    }
}

distance_list_ids!(DistanceIdArray);

impl From<Vec<DistanceIdPair>> for DistanceIdArray {
    fn from(pairs: Vec<DistanceIdPair>) -> Self {
        Self { pairs }
    }
}

impl FromIterator<DistanceIdPair> for DistanceIdArray {
    fn from_iter<I: IntoIterator<Item = DistanceIdPair>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// Mutable cursor over a [`DistanceIdArray`].
#[derive(Debug)]
pub struct DistanceIdCursorMut<'a> {
    pairs: &'a mut Vec<DistanceIdPair>,
    pos: isize,
}

impl DistanceIdCursorMut<'_> {
    fn checked_position(&self) -> Result<usize> {
        position(self.pos, self.pairs.len()).ok_or_else(|| {
            IdError::InvalidReference(format!(
                "cursor at {} outside list of length {}",
                self.pos,
                self.pairs.len()
            ))
        })
    }

    /// Distance of the current pair.
    pub fn distance(&self) -> Result<f64> {
        let i = self.checked_position()?;
        Ok(self.pairs[i].distance)
    }

    /// Overwrite the distance of the current pair.
    pub fn set_distance(&mut self, distance: f64) -> Result<()> {
        let i = self.checked_position()?;
        self.pairs[i].distance = distance;
        Ok(())
    }
}

impl IdRef for DistanceIdCursorMut<'_> {
    #[inline]
    fn internal_index(&self) -> u32 {
        self.pairs[self.pos as usize].id.0
    }
}

impl IdCursor for DistanceIdCursorMut<'_> {
    #[inline]
    fn valid(&self) -> bool {
        position(self.pos, self.pairs.len()).is_some()
    }

    #[inline]
    fn advance(&mut self) -> &mut Self {
        self.pos += 1;
        self
    }
}

impl ArrayCursor for DistanceIdCursorMut<'_> {
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

impl IdCursorMut for DistanceIdCursorMut<'_> {
    /// Replace the identity of the current pair, keeping its distance.
    fn set_current(&mut self, value: &impl IdRef) -> Result<()> {
        let i = self.checked_position()?;
        self.pairs[i].id = value.id();
        Ok(())
    }

    fn remove_current(&mut self) -> Result<()> {
        let i = self.checked_position()?;
        self.pairs.remove(i);
        self.pos -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Ids;

    #[test]
    fn pair_ordering_breaks_ties_by_id() {
        let a = DistanceIdPair::new(1.0, &Id(5));
        let b = DistanceIdPair::new(1.0, &Id(2));
        let c = DistanceIdPair::new(0.5, &Id(9));
        let mut v = vec![a, b, c];
        v.sort();
        assert_eq!(v, vec![c, b, a]);
    }

    #[test]
    fn nan_sorts_last() {
        let mut list = DistanceIdArray::new();
        list.add(f64::NAN, &Id(0));
        list.add(2.0, &Id(1));
        list.add(f64::INFINITY, &Id(2));
        list.sort();
        assert_eq!(list.distance(0), Ok(2.0));
        assert_eq!(list.distance(1), Ok(f64::INFINITY));
        assert!(list.distance(2).unwrap().is_nan());
    }

    #[test]
    fn edits() {
        let mut list = DistanceIdArray::with_capacity(4);
        for (i, d) in [3.0, 1.0, 2.0, 4.0].into_iter().enumerate() {
            list.add(d, &Id(i as u32));
        }
        list.swap(0, 1).unwrap();
        assert_eq!(list.pair(0).unwrap().id, Id(1));
        assert_eq!(list.remove_swap(0).unwrap().id, Id(1));
        assert_eq!(list.pair(0).unwrap().id, Id(3));
        assert_eq!(list.remove_at(1).unwrap().id, Id(0));
        list.set(0, 9.0, &Id(7)).unwrap();
        assert_eq!(list.pair(0).unwrap(), DistanceIdPair::new(9.0, &Id(7)));
        assert!(list.set(5, 1.0, &Id(1)).is_err());
        assert!(list.remove_at(5).is_err());
    }

    #[test]
    fn cursor_edits() {
        let mut list: DistanceIdArray = (0..6)
            .map(|i| DistanceIdPair::new(f64::from(i), &Id(i)))
            .collect();
        let mut it = list.iter_mut();
        while it.valid() {
            if it.distance().unwrap() < 2.0 {
                it.remove_current().unwrap();
            } else {
                let d = it.distance().unwrap();
                it.set_distance(d * 10.0).unwrap();
            }
            it.advance();
        }
        assert_eq!(list.len(), 4);
        assert_eq!(list.distance(0), Ok(20.0));
        assert!(list.contains(&Id(5)));
        assert!(!list.contains(&Id(0)));
    }

    #[test]
    fn read_cursor_exposes_distance() {
        let list: DistanceIdArray = vec![
            DistanceIdPair::new(0.25, &Id(3)),
            DistanceIdPair::new(0.75, &Id(4)),
        ]
        .into();
        let mut it = list.pairs_iter();
        let mut total = 0.0;
        while it.valid() {
            total += it.distance();
            it.advance();
        }
        assert_eq!(total, 1.0);
        assert!(it.pair().is_err());
    }
}
