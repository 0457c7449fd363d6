//! Identity factory: the single allocation point for identities and ranges.
//!
//! A factory is an explicitly constructed value that algorithms receive and
//! pass down. It owns the numbering scheme, so everything that needs to
//! create, compare or print identities goes through it:
//!
//! - single identities come from a recycling pool;
//! - contiguous ranges are allocated and deallocated in explicit pairs, and
//!   freed ranges are reused first-fit;
//! - empty or pre-sized collections, heaps and distance lists are built here.
//!
//! ```rust
//! use vicinity_ids::factory::IdFactory;
//! use vicinity_ids::ids::{Ids, ModifiableIds};
//!
//! let mut factory = IdFactory::default();
//! let range = factory.generate_range(100).unwrap();
//! let mut seen = factory.new_hash_set();
//! seen.add_all(&range);
//! assert_eq!(seen.len(), 100);
//! factory.deallocate_range(range).unwrap();
//! ```
//!
//! The factory is not synchronised. Allocation takes `&mut self`; share one
//! across threads only behind a lock of your own.

use std::cmp::Ordering;

use tracing::{debug, trace, warn};

use crate::distance::{DistanceIdArray, DistanceIdPair};
use crate::error::{IdError, Result};
use crate::ids::{
    Id, IdArray, IdHashSet, IdPair, IdRange, IdRef, IdVar, Ids, UnmodifiableIds,
};
use crate::knn::{KnnHeap, KnnList};

/// How identities map to external integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdScheme {
    /// Identities are plain integers and may be imported and exported.
    #[default]
    Integer,
    /// Identities are opaque; integer import and export are refused.
    Sealed,
}

/// Factory configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactoryConfig {
    /// Numbering scheme.
    pub scheme: IdScheme,
    /// First identity handed out by the factory.
    pub first_id: u32,
    /// Reuse deallocated single identities before minting new ones.
    pub recycle_singles: bool,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            scheme: IdScheme::Integer,
            first_id: 0,
            recycle_singles: true,
        }
    }
}

impl FactoryConfig {
    /// Check that the configuration leaves room to allocate.
    pub fn validate(&self) -> Result<()> {
        if self.first_id == u32::MAX {
            return Err(IdError::InvalidArgument(
                "first_id leaves no identities to allocate".into(),
            ));
        }
        Ok(())
    }
}

/// Allocator and constructor hub for identities.
#[derive(Debug, Clone)]
pub struct IdFactory {
    config: FactoryConfig,
    /// Next never-issued identity.
    next: u32,
    /// Set once `u32::MAX` itself has been issued.
    exhausted: bool,
    /// Deallocated singles, reused LIFO.
    free_singles: Vec<Id>,
    /// Deallocated ranges, sorted by start and coalesced.
    free_ranges: Vec<IdRange>,
}

impl Default for IdFactory {
    fn default() -> Self {
        let config = FactoryConfig::default();
        Self {
            next: config.first_id,
            exhausted: false,
            config,
            free_singles: Vec::new(),
            free_ranges: Vec::new(),
        }
    }
}

impl IdFactory {
    /// Create a factory after validating `config`.
    pub fn new(config: FactoryConfig) -> Result<Self> {
        config.validate()?;
        debug!(scheme = ?config.scheme, first_id = config.first_id, "created identity factory");
        Ok(Self {
            config,
            next: config.first_id,
            exhausted: false,
            free_singles: Vec::new(),
            free_ranges: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Integer import/export
    // -------------------------------------------------------------------------

    /// Identity for a raw integer.
    pub fn import_integer(&self, value: u32) -> Result<Id> {
        match self.config.scheme {
            IdScheme::Integer => Ok(Id(value)),
            IdScheme::Sealed => {
                warn!(value, "integer import rejected by sealed identity scheme");
                Err(IdError::Unsupported(
                    "integer import under a sealed identity scheme".into(),
                ))
            }
        }
    }

    /// Raw integer for an identity.
    pub fn export_integer(&self, id: &impl IdRef) -> Result<u32> {
        match self.config.scheme {
            IdScheme::Integer => Ok(id.internal_index()),
            IdScheme::Sealed => Err(IdError::Unsupported(
                "integer export under a sealed identity scheme".into(),
            )),
        }
    }

    // -------------------------------------------------------------------------
    // Allocation
    // -------------------------------------------------------------------------

    /// Allocate one identity, preferring a recycled one.
    pub fn generate_single(&mut self) -> Result<Id> {
        if let Some(id) = self.free_singles.pop() {
            trace!(%id, "reusing recycled identity");
            return Ok(id);
        }
        if self.exhausted {
            return Err(exhausted());
        }
        let id = Id(self.next);
        match self.next.checked_add(1) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
        Ok(id)
    }

    /// Return an identity obtained from [`generate_single`](Self::generate_single).
    ///
    /// Deallocating an identity twice, or one that was never issued, hands
    /// it out twice later.
    pub fn deallocate_single(&mut self, id: &impl IdRef) {
        if self.config.recycle_singles {
            trace!(id = id.internal_index(), "recycling identity");
            self.free_singles.push(id.id());
        }
    }

    /// Allocate `size` contiguous identities.
    ///
    /// Freed ranges are searched first-fit; the unused tail of a reused range
    /// stays on the free list. An empty request allocates nothing.
    pub fn generate_range(&mut self, size: u32) -> Result<IdRange> {
        if size == 0 {
            return IdRange::new(self.next, 0);
        }
        if let Some(slot) = self.free_ranges.iter().position(|r| r.len() >= size as usize) {
            let free = self.free_ranges[slot];
            let range = IdRange::new(free.start(), size)?;
            if free.len() == size as usize {
                self.free_ranges.remove(slot);
            } else {
                self.free_ranges[slot] = IdRange::new(range.end(), free.len() as u32 - size)?;
            }
            debug!(%range, "reusing freed identity range");
            return Ok(range);
        }
        let range = IdRange::new(self.next, size).map_err(|_| exhausted())?;
        // `end()` may equal u32::MAX, which is still a valid next start.
        self.next = range.end();
        debug!(%range, "allocated identity range");
        Ok(range)
    }

    /// Return a range obtained from [`generate_range`](Self::generate_range).
    ///
    /// Fails with [`IdError::InvalidArgument`] if any part of `range` was
    /// never issued or is already free. The free list is unchanged then.
    pub fn deallocate_range(&mut self, range: IdRange) -> Result<()> {
        if range.is_empty() {
            return Ok(());
        }
        if range.start() < self.config.first_id || range.end() > self.next {
            return Err(IdError::InvalidArgument(format!(
                "range {range} was never issued by this factory"
            )));
        }
        let slot = self
            .free_ranges
            .partition_point(|r| r.start() < range.start());
        let overlaps_left = slot > 0 && self.free_ranges[slot - 1].end() > range.start();
        let overlaps_right = self
            .free_ranges
            .get(slot)
            .is_some_and(|r| r.start() < range.end());
        if overlaps_left || overlaps_right {
            warn!(%range, "rejected deallocation of an already free range");
            return Err(IdError::InvalidArgument(format!(
                "range {range} overlaps an already free range"
            )));
        }
        self.free_ranges.insert(slot, range);

        // Coalesce with the right neighbour, then the left one.
        if slot + 1 < self.free_ranges.len() {
            let (cur, right) = (self.free_ranges[slot], self.free_ranges[slot + 1]);
            if cur.end() == right.start() {
                if let Ok(merged) = IdRange::new(cur.start(), (cur.len() + right.len()) as u32) {
                    self.free_ranges[slot] = merged;
                    self.free_ranges.remove(slot + 1);
                }
            }
        }
        if slot > 0 {
            let (left, cur) = (self.free_ranges[slot - 1], self.free_ranges[slot]);
            if left.end() == cur.start() {
                if let Ok(merged) = IdRange::new(left.start(), (left.len() + cur.len()) as u32) {
                    self.free_ranges[slot - 1] = merged;
                    self.free_ranges.remove(slot);
                }
            }
        }
        debug!(%range, free_ranges = self.free_ranges.len(), "deallocated identity range");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn new_var(&self) -> IdVar {
        IdVar::new()
    }

    #[must_use]
    pub fn new_var_from(&self, id: &impl IdRef) -> IdVar {
        IdVar::with(id)
    }

    #[must_use]
    pub fn new_array(&self) -> IdArray {
        IdArray::new()
    }

    #[must_use]
    pub fn new_array_with_capacity(&self, capacity: usize) -> IdArray {
        IdArray::with_capacity(capacity)
    }

    /// Array holding a copy of `ids`, in iteration order.
    #[must_use]
    pub fn new_array_from<C: Ids + ?Sized>(&self, ids: &C) -> IdArray {
        IdArray::from_ids(ids)
    }

    #[must_use]
    pub fn new_hash_set(&self) -> IdHashSet {
        IdHashSet::new()
    }

    #[must_use]
    pub fn new_hash_set_with_capacity(&self, capacity: usize) -> IdHashSet {
        IdHashSet::with_capacity(capacity)
    }

    /// Hash set holding the distinct elements of `ids`.
    #[must_use]
    pub fn new_hash_set_from<C: Ids + ?Sized>(&self, ids: &C) -> IdHashSet {
        IdHashSet::from_ids(ids)
    }

    #[must_use]
    pub fn new_pair(&self, first: &impl IdRef, second: &impl IdRef) -> IdPair {
        IdPair::new(first.id(), second.id())
    }

    #[must_use]
    pub fn new_distance_pair(&self, distance: f64, id: &impl IdRef) -> DistanceIdPair {
        DistanceIdPair::new(distance, id)
    }

    /// Bounded heap keeping the `k` nearest candidates.
    pub fn new_heap(&self, k: usize) -> Result<KnnHeap> {
        KnnHeap::new(k)
    }

    /// Heap seeded with the contents of a finalized list.
    #[must_use]
    pub fn new_heap_from(&self, list: &KnnList) -> KnnHeap {
        KnnHeap::from_knn_list(list)
    }

    #[must_use]
    pub fn new_distance_list(&self, capacity: usize) -> DistanceIdArray {
        DistanceIdArray::with_capacity(capacity)
    }

    /// Read-only wrapper around `ids`.
    #[must_use]
    pub fn make_unmodifiable<C: Ids>(&self, ids: C) -> UnmodifiableIds<C> {
        UnmodifiableIds::new(ids)
    }

    // -------------------------------------------------------------------------
    // Comparison and formatting
    // -------------------------------------------------------------------------

    /// Total order on identities.
    #[must_use]
    pub fn compare(&self, a: &impl IdRef, b: &impl IdRef) -> Ordering {
        a.internal_index().cmp(&b.internal_index())
    }

    #[must_use]
    pub fn equal(&self, a: &impl IdRef, b: &impl IdRef) -> bool {
        a.internal_index() == b.internal_index()
    }

    #[must_use]
    pub fn format(&self, id: &impl IdRef) -> String {
        id.id().to_string()
    }

    /// Comma-separated identities of `ids`, in iteration order.
    #[must_use]
    pub fn format_all<C: Ids + ?Sized>(&self, ids: &C) -> String {
        crate::util::format_ids(ids)
    }
}

fn exhausted() -> IdError {
    IdError::Unsupported("identity space exhausted".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ModifiableIds;
    use crate::knn::KnnResult;

    #[test]
    fn default_config_is_valid() {
        assert!(FactoryConfig::default().validate().is_ok());
        let bad = FactoryConfig {
            first_id: u32::MAX,
            ..Default::default()
        };
        assert!(IdFactory::new(bad).is_err());
    }

    #[test]
    fn sealed_scheme_refuses_integers() {
        let open = IdFactory::default();
        assert_eq!(open.import_integer(7), Ok(Id(7)));
        assert_eq!(open.export_integer(&Id(7)), Ok(7));

        let sealed = IdFactory::new(FactoryConfig {
            scheme: IdScheme::Sealed,
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(sealed.import_integer(7), Err(IdError::Unsupported(_))));
        assert!(matches!(sealed.export_integer(&Id(7)), Err(IdError::Unsupported(_))));
    }

    #[test]
    fn singles_are_recycled() {
        let mut f = IdFactory::new(FactoryConfig {
            first_id: 10,
            ..Default::default()
        })
        .unwrap();
        let a = f.generate_single().unwrap();
        let b = f.generate_single().unwrap();
        assert_eq!((a, b), (Id(10), Id(11)));
        f.deallocate_single(&a);
        assert_eq!(f.generate_single().unwrap(), a);
        assert_eq!(f.generate_single().unwrap(), Id(12));
    }

    #[test]
    fn recycling_can_be_disabled() {
        let mut f = IdFactory::new(FactoryConfig {
            recycle_singles: false,
            ..Default::default()
        })
        .unwrap();
        let a = f.generate_single().unwrap();
        f.deallocate_single(&a);
        assert_ne!(f.generate_single().unwrap(), a);
    }

    #[test]
    fn ranges_do_not_overlap_and_are_reused_first_fit() {
        let mut f = IdFactory::default();
        let r1 = f.generate_range(10).unwrap();
        let r2 = f.generate_range(5).unwrap();
        assert_eq!((r1.start(), r1.end()), (0, 10));
        assert_eq!((r2.start(), r2.end()), (10, 15));

        f.deallocate_range(r1).unwrap();
        let r3 = f.generate_range(4).unwrap();
        assert_eq!((r3.start(), r3.end()), (0, 4));
        let r4 = f.generate_range(6).unwrap();
        assert_eq!((r4.start(), r4.end()), (4, 10));
        let r5 = f.generate_range(1).unwrap();
        assert_eq!(r5.start(), 15);
    }

    #[test]
    fn freed_neighbours_coalesce() {
        let mut f = IdFactory::default();
        let a = f.generate_range(3).unwrap();
        let b = f.generate_range(3).unwrap();
        let c = f.generate_range(3).unwrap();
        f.deallocate_range(a).unwrap();
        f.deallocate_range(c).unwrap();
        f.deallocate_range(b).unwrap();
        let all = f.generate_range(9).unwrap();
        assert_eq!((all.start(), all.end()), (0, 9));
    }

    #[test]
    fn double_free_of_a_range_is_rejected() {
        let mut f = IdFactory::default();
        let r = f.generate_range(5).unwrap();
        f.deallocate_range(r).unwrap();
        assert!(matches!(f.deallocate_range(r), Err(IdError::InvalidArgument(_))));

        let a = f.generate_range(5).unwrap();
        let b = f.generate_range(5).unwrap();
        assert!(a.end() <= b.start() || b.end() <= a.start());
    }

    #[test]
    fn partial_overlap_with_free_range_is_rejected() {
        let mut f = IdFactory::default();
        let whole = f.generate_range(10).unwrap();
        let head = IdRange::new(0, 4).unwrap();
        let tail = IdRange::new(6, 4).unwrap();
        f.deallocate_range(head).unwrap();
        f.deallocate_range(tail).unwrap();
        assert!(f.deallocate_range(IdRange::new(3, 2).unwrap()).is_err());
        assert!(f.deallocate_range(IdRange::new(5, 2).unwrap()).is_err());
        assert!(f.deallocate_range(whole).is_err());

        // The gap between them is still live and may be returned.
        f.deallocate_range(IdRange::new(4, 2).unwrap()).unwrap();
        let all = f.generate_range(10).unwrap();
        assert_eq!((all.start(), all.end()), (0, 10));
    }

    #[test]
    fn never_issued_range_is_rejected() {
        let mut f = IdFactory::new(FactoryConfig {
            first_id: 100,
            ..Default::default()
        })
        .unwrap();
        let r = f.generate_range(10).unwrap();
        assert!(f.deallocate_range(IdRange::new(105, 10).unwrap()).is_err());
        assert!(f.deallocate_range(IdRange::new(90, 10).unwrap()).is_err());
        f.deallocate_range(r).unwrap();
    }

    #[test]
    fn last_identity_is_issued_before_exhaustion() {
        let mut f = IdFactory::new(FactoryConfig {
            first_id: u32::MAX - 3,
            recycle_singles: false,
            ..Default::default()
        })
        .unwrap();
        let r = f.generate_range(3).unwrap();
        assert_eq!(r.end(), u32::MAX);
        assert!(f.generate_range(1).is_err());
        assert_eq!(f.generate_single(), Ok(Id(u32::MAX)));
        assert!(matches!(f.generate_single(), Err(IdError::Unsupported(_))));
    }

    #[test]
    fn empty_range_allocates_nothing() {
        let mut f = IdFactory::default();
        assert!(f.generate_range(0).unwrap().is_empty());
        assert_eq!(f.generate_single().unwrap(), Id(0));
    }

    #[test]
    fn constructors_and_formatting() {
        let f = IdFactory::default();
        let mut set = f.new_hash_set();
        set.add(&Id(3));
        set.add(&Id(3));
        assert_eq!(f.new_array_from(&set).len(), 1);

        let arr = f.new_array_from(&IdRange::new(1, 3).unwrap());
        assert_eq!(f.format_all(&arr), "1,2,3");
        assert_eq!(f.format(&Id(9)), "9");
        assert_eq!(f.compare(&Id(1), &Id(2)), Ordering::Less);
        assert!(f.equal(&Id(1), &arr.as_slice()[0]));

        let var = f.new_var_from(&Id(5));
        assert_eq!(var.get(), Ok(Id(5)));
        assert!(f.new_heap(0).is_err());

        let mut heap = f.new_heap(2).unwrap();
        heap.insert(1.0, &Id(1));
        let list = heap.into_knn_list();
        assert_eq!(f.new_heap_from(&list).len(), 1);
        assert_eq!(list.k(), 2);

        let ro = f.make_unmodifiable(arr);
        assert_eq!(ro.len(), 3);
    }
}
