//! Capability adapters, set algebra and random sampling over identity
//! collections.
//!
//! The `ensure_*` adapters hand back the input untouched when it already has
//! the requested capability and copy it otherwise, so callers can write
//! against one shape without paying for a conversion they do not need.
//!
//! Set operations pick their strategy from runtime capability probes: a
//! set-like operand is used for membership tests directly, and a plain
//! operand larger than [`PROMOTE_THRESHOLD`] is first copied into a hash set.
//!
//! Sampling is either constructive (draw random offsets into a hash set
//! until it is full) for samples smaller than a quarter of the population,
//! or destructive (copy, partially shuffle, truncate) otherwise.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{IdError, Result};
use crate::ids::{
    AnyModifiable, ArrayIds, ArrayView, Id, IdArray, IdCursor, IdHashSet, IdRange, IdRef, IdVar,
    Ids, ModifiableIds, SetIds, SliceIter, ViewIter,
};

/// Plain operands above this size are promoted to a hash set before
/// repeated membership tests.
pub const PROMOTE_THRESHOLD: usize = 16;

// =============================================================================
// Capability adapters
// =============================================================================

/// Array view of a collection, borrowed when possible.
#[derive(Debug, Clone)]
pub enum EnsuredArray<'a> {
    /// The input already was array-backed.
    View(ArrayView<'a>),
    /// The input was copied.
    Owned(IdArray),
}

impl EnsuredArray<'_> {
    /// The array as a borrowed view.
    pub fn view(&self) -> ArrayView<'_> {
        match self {
            Self::View(v) => *v,
            Self::Owned(a) => ArrayView::Slice(a.as_slice()),
        }
    }

    /// Whether the input had to be copied.
    pub fn is_copy(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

impl Ids for EnsuredArray<'_> {
    type Iter<'b>
        = ViewIter<'b>
    where
        Self: 'b;

    fn iter(&self) -> Self::Iter<'_> {
        self.view().into_cursor()
    }

    fn len(&self) -> usize {
        self.view().len()
    }

    fn contains(&self, id: &impl IdRef) -> bool {
        self.view().contains(id)
    }

    fn is_set_like(&self) -> bool {
        self.view().is_set_like()
    }

    fn as_array(&self) -> Option<ArrayView<'_>> {
        Some(self.view())
    }
}

impl ArrayIds for EnsuredArray<'_> {
    type Cursor<'b>
        = ViewIter<'b>
    where
        Self: 'b;

    fn array_iter(&self) -> Self::Cursor<'_> {
        self.view().into_cursor()
    }

    fn get(&self, offset: usize) -> Result<Id> {
        self.view().get(offset)
    }

    fn binary_search(&self, key: &impl IdRef) -> std::result::Result<usize, usize> {
        self.view().binary_search(key)
    }

    fn slice(&self, begin: usize, end: usize) -> Result<ArrayView<'_>> {
        self.view().sub_view(begin, end)
    }
}

/// Array-backed form of `ids`. Zero-copy for arrays, slices and ranges.
pub fn ensure_array<C: Ids + ?Sized>(ids: &C) -> EnsuredArray<'_> {
    match ids.as_array() {
        Some(view) => EnsuredArray::View(view),
        None => EnsuredArray::Owned(IdArray::from_ids(ids)),
    }
}

/// Set-like form of a collection, borrowed when possible.
#[derive(Debug)]
pub enum EnsuredSet<'a, C: ?Sized> {
    /// The input already had O(1) membership.
    Native(&'a C),
    /// The input was copied into a hash set.
    Copied(IdHashSet),
}

/// Cursor over an [`EnsuredSet`].
#[derive(Debug, Clone)]
pub enum EnsuredSetIter<'a, I> {
    Native(I),
    Copied(SliceIter<'a>),
}

impl<I: IdCursor> IdRef for EnsuredSetIter<'_, I> {
    fn internal_index(&self) -> u32 {
        match self {
            Self::Native(it) => it.internal_index(),
            Self::Copied(it) => it.internal_index(),
        }
    }
}

impl<I: IdCursor> IdCursor for EnsuredSetIter<'_, I> {
    fn valid(&self) -> bool {
        match self {
            Self::Native(it) => it.valid(),
            Self::Copied(it) => it.valid(),
        }
    }

    fn advance(&mut self) -> &mut Self {
        match self {
            Self::Native(it) => {
                it.advance();
            }
            Self::Copied(it) => {
                it.advance();
            }
        }
        self
    }
}

impl<'c, C: Ids + ?Sized> Ids for EnsuredSet<'c, C> {
    type Iter<'a>
        = EnsuredSetIter<'a, C::Iter<'a>>
    where
        Self: 'a;

    fn iter(&self) -> Self::Iter<'_> {
        match self {
            Self::Native(c) => EnsuredSetIter::Native(c.iter()),
            Self::Copied(s) => EnsuredSetIter::Copied(SliceIter::new(s.as_slice())),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Native(c) => c.len(),
            Self::Copied(s) => s.len(),
        }
    }

    fn contains(&self, id: &impl IdRef) -> bool {
        match self {
            Self::Native(c) => c.contains(id),
            Self::Copied(s) => s.contains(id),
        }
    }

    fn is_set_like(&self) -> bool {
        true
    }

    fn as_hash_set(&self) -> Option<&IdHashSet> {
        match self {
            Self::Native(c) => c.as_hash_set(),
            Self::Copied(s) => Some(s),
        }
    }
}

impl<C: Ids + ?Sized> SetIds for EnsuredSet<'_, C> {}

/// Set-like form of `ids`. Zero-copy for hash sets, ranges and other
/// set-like collections.
pub fn ensure_set<C: Ids + ?Sized>(ids: &C) -> EnsuredSet<'_, C> {
    if ids.is_set_like() {
        EnsuredSet::Native(ids)
    } else {
        EnsuredSet::Copied(IdHashSet::from_ids(ids))
    }
}

/// Modifiable form of `ids`.
///
/// Arrays and hash sets, bare or behind a read-only wrapper, are moved as
/// they are. Everything else is copied into an array.
pub fn ensure_modifiable<C: Ids>(ids: C) -> AnyModifiable {
    ids.into_modifiable()
}

/// The static range backing `ids`.
///
/// Algorithms that index per-object storage by offset only work on
/// contiguous ranges.
pub fn assert_range<C: Ids + ?Sized>(ids: &C) -> Result<IdRange> {
    match ids.as_array() {
        Some(ArrayView::Range(range)) => Ok(range),
        _ => Err(IdError::Unsupported(
            "only static identity ranges are supported here".into(),
        )),
    }
}

/// Identities of `ids` in iteration order, comma separated.
pub fn format_ids<C: Ids + ?Sized>(ids: &C) -> String {
    let mut out = String::with_capacity(ids.len() * 6);
    let mut it = ids.iter();
    while it.valid() {
        if !out.is_empty() {
            out.push(',');
        }
        out.push_str(&it.id().to_string());
        it.advance();
    }
    out
}

// =============================================================================
// Set algebra
// =============================================================================

/// Membership oracle for the probed side of an intersection.
enum Probe<'a, B: ?Sized> {
    Direct(&'a B),
    Promoted(IdHashSet),
}

impl<B: Ids + ?Sized> Probe<'_, B> {
    fn new(ids: &B) -> Probe<'_, B> {
        if ids.len() > PROMOTE_THRESHOLD && !ids.is_set_like() {
            Probe::Promoted(IdHashSet::from_ids(ids))
        } else {
            Probe::Direct(ids)
        }
    }

    fn contains(&self, id: &impl IdRef) -> bool {
        match self {
            Self::Direct(b) => b.contains(id),
            Self::Promoted(s) => s.contains(id),
        }
    }
}

/// Call `visit` for every element of `scan` that `probe` contains.
fn visit_common<A, B, F>(scan: &A, probe: &B, mut visit: F)
where
    A: Ids + ?Sized,
    B: Ids + ?Sized,
    F: FnMut(Id),
{
    let probe = Probe::new(probe);
    let mut it = scan.iter();
    while it.valid() {
        if probe.contains(&it) {
            visit(it.id());
        }
        it.advance();
    }
}

/// Scan the plain operand and probe the set-like one; if both or neither
/// are set-like, scan the smaller.
fn visit_intersection<A, B, F>(first: &A, second: &B, visit: F)
where
    A: Ids + ?Sized,
    B: Ids + ?Sized,
    F: FnMut(Id),
{
    match (first.is_set_like(), second.is_set_like()) {
        (false, true) => visit_common(first, second, visit),
        (true, false) => visit_common(second, first, visit),
        _ if first.len() <= second.len() => visit_common(first, second, visit),
        _ => visit_common(second, first, visit),
    }
}

/// Elements present in both collections.
pub fn intersection<A, B>(first: &A, second: &B) -> IdHashSet
where
    A: Ids + ?Sized,
    B: Ids + ?Sized,
{
    let mut out = IdHashSet::with_capacity(first.len().min(second.len()));
    visit_intersection(first, second, |id| {
        out.add(&id);
    });
    out
}

/// Number of elements present in both collections.
///
/// Counts duplicates of the scanned operand, so for non-set inputs with
/// repeated identities this can exceed `intersection(..).len()`.
pub fn intersection_size<A, B>(first: &A, second: &B) -> usize
where
    A: Ids + ?Sized,
    B: Ids + ?Sized,
{
    let mut count = 0;
    visit_intersection(first, second, |_| count += 1);
    count
}

/// Split two collections into elements only in `first`, in both, and only
/// in `second`. All three outputs must be empty.
pub fn symmetric_intersection<A, B>(
    first: &A,
    second: &B,
    first_only: &mut IdHashSet,
    both: &mut IdHashSet,
    second_only: &mut IdHashSet,
) -> Result<()>
where
    A: Ids + ?Sized,
    B: Ids + ?Sized,
{
    if !first_only.is_empty() || !both.is_empty() || !second_only.is_empty() {
        return Err(IdError::InvalidArgument(
            "symmetric intersection outputs must start empty".into(),
        ));
    }
    if first.len() > second.len() {
        partition_against(second, first, second_only, both, first_only);
    } else {
        partition_against(first, second, first_only, both, second_only);
    }
    Ok(())
}

/// Seed `larger_only` with `larger` and move every element of `smaller` to
/// `both` if it could be removed from there, to `smaller_only` otherwise.
fn partition_against<A, B>(
    smaller: &A,
    larger: &B,
    smaller_only: &mut IdHashSet,
    both: &mut IdHashSet,
    larger_only: &mut IdHashSet,
) where
    A: Ids + ?Sized,
    B: Ids + ?Sized,
{
    larger_only.add_all(larger);
    let mut it = smaller.iter();
    while it.valid() {
        if larger_only.remove(&it) {
            both.add(&it);
        } else {
            smaller_only.add(&it);
        }
        it.advance();
    }
}

/// Elements present in either collection, without duplicates.
pub fn union<A, B>(first: &A, second: &B) -> IdHashSet
where
    A: Ids + ?Sized,
    B: Ids + ?Sized,
{
    let mut out = IdHashSet::with_capacity(first.len().max(second.len()));
    out.add_all(first);
    out.add_all(second);
    out
}

/// Elements of `first` not present in `second`.
pub fn difference<A, B>(first: &A, second: &B) -> IdHashSet
where
    A: Ids + ?Sized,
    B: Ids + ?Sized,
{
    let mut out = IdHashSet::from_ids(first);
    out.remove_all(second);
    out
}

// =============================================================================
// Sampling
// =============================================================================

/// Shuffle so that the first `limit` positions hold a uniform random
/// sample of the whole array, in random order.
///
/// `limit >= len` shuffles the entire array.
pub fn random_shuffle<R: Rng + ?Sized>(ids: &mut IdArray, rng: &mut R, limit: usize) {
    let data = ids.as_mut_slice();
    let end = data.len();
    for i in 0..limit.min(end.saturating_sub(1)) {
        data.swap(i, rng.random_range(i..end));
    }
}

fn check_sample_size(k: usize, n: usize) -> Result<()> {
    if k > n {
        return Err(IdError::InvalidArgument(format!(
            "sample size {k} exceeds population size {n}"
        )));
    }
    Ok(())
}

/// Fail unless `source` holds at least `k` distinct identities other than
/// `excluded`.
fn check_distinct<C: Ids + ?Sized>(source: &C, k: usize, excluded: Option<Id>) -> Result<()> {
    let set = ensure_set(source);
    let mut distinct = set.len();
    if excluded.is_some_and(|id| set.contains(&id)) {
        distinct -= 1;
    }
    if k > distinct {
        return Err(IdError::InvalidArgument(format!(
            "sample size {k} exceeds the {distinct} distinct identities available"
        )));
    }
    Ok(())
}

/// Draw `k` distinct elements of `source` without replacement.
///
/// `source` must not contain duplicates. Small samples come back as a hash
/// set, large ones as an array in random order. A small sample from a source
/// with fewer than `k` distinct identities fails with
/// [`IdError::InvalidArgument`]; a large one keeps the duplicates.
pub fn random_sample<C, R>(source: &C, k: usize, rng: &mut R) -> Result<AnyModifiable>
where
    C: Ids + ?Sized,
    R: Rng + ?Sized,
{
    let n = source.len();
    check_sample_size(k, n)?;

    if k < n >> 2 {
        debug!(k, n, "constructive sampling");
        check_distinct(source, k, None)?;
        let array = ensure_array(source);
        let mut sample = IdHashSet::with_capacity(k);
        while sample.len() < k {
            sample.add(&array.get(rng.random_range(0..n))?);
        }
        return Ok(AnyModifiable::HashSet(sample));
    }

    debug!(k, n, "destructive sampling");
    let mut sample = IdArray::from_ids(source);
    random_shuffle(&mut sample, rng, k);
    sample.truncate(k);
    Ok(AnyModifiable::Array(sample))
}

/// Like [`random_sample`], but never draws `except`.
pub fn random_sample_except<C, R>(
    source: &C,
    except: &impl IdRef,
    k: usize,
    rng: &mut R,
) -> Result<AnyModifiable>
where
    C: Ids + ?Sized,
    R: Rng + ?Sized,
{
    let n = source.len();
    check_sample_size(k, n)?;
    let excluded = except.id();

    if k < n >> 2 {
        debug!(k, n, "constructive sampling");
        check_distinct(source, k, Some(excluded))?;
        let array = ensure_array(source);
        let mut sample = IdHashSet::with_capacity(k);
        while sample.len() < k {
            let drawn = array.get(rng.random_range(0..n))?;
            if drawn != excluded {
                sample.add(&drawn);
            }
        }
        return Ok(AnyModifiable::HashSet(sample));
    }

    debug!(k, n, "destructive sampling");
    let mut sample = IdArray::from_ids(source);
    random_shuffle(&mut sample, rng, k);
    let found = sample.as_slice()[..k].iter().position(|&id| id == excluded);
    if let Some(pos) = found {
        if k >= n {
            return Err(IdError::InvalidArgument(format!(
                "cannot draw {k} of {n} identities while excluding {excluded}"
            )));
        }
        // Exclusion assumes `except` occurs at most once.
        sample.as_mut_slice().swap(pos, k);
    }
    sample.truncate(k);
    Ok(AnyModifiable::Array(sample))
}

/// Sample by rate.
///
/// - `rate <= 0`: no sampling, every element is kept;
/// - `0 < rate <= 1`: that fraction of the population, rounded down;
/// - `rate > 1`: an absolute count, clamped to the population size.
pub fn random_sample_rate<C, R>(ids: &C, rate: f64, rng: &mut R) -> Result<AnyModifiable>
where
    C: Ids + ?Sized,
    R: Rng + ?Sized,
{
    if rate.is_nan() {
        return Err(IdError::InvalidArgument("sampling rate is NaN".into()));
    }
    let n = ids.len();
    if rate <= 0.0 {
        return Ok(AnyModifiable::Array(IdArray::from_ids(ids)));
    }
    let k = if rate <= 1.0 {
        (rate * n as f64) as usize
    } else {
        rate as usize
    };
    random_sample(ids, k.min(n), rng)
}

/// Draw one element uniformly at random.
pub fn random_sample_one<C, R>(ids: &C, rng: &mut R) -> Result<IdVar>
where
    C: Ids + ?Sized,
    R: Rng + ?Sized,
{
    let n = ids.len();
    if n == 0 {
        return Err(IdError::out_of_range(0, 0));
    }
    let mut var = IdVar::new();
    ensure_array(ids).assign_var(rng.random_range(0..n), &mut var)?;
    Ok(var)
}

/// [`random_sample`] with a reproducible generator.
///
/// `None` draws a fresh seed from the thread-local generator.
pub fn random_sample_seeded<C>(source: &C, k: usize, seed: Option<u64>) -> Result<AnyModifiable>
where
    C: Ids + ?Sized,
{
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    debug!(seed, k, "seeded sample");
    let mut rng = StdRng::seed_from_u64(seed);
    random_sample(source, k, &mut rng)
}

/// Shuffle `ids` and cut it into `parts` partitions of almost equal size.
///
/// The first `len % parts` partitions hold one extra element.
pub fn random_split<C, R>(ids: &C, parts: usize, rng: &mut R) -> Result<Vec<IdArray>>
where
    C: Ids + ?Sized,
    R: Rng + ?Sized,
{
    if parts == 0 {
        return Err(IdError::InvalidArgument(
            "cannot split into zero partitions".into(),
        ));
    }
    let mut shuffled = IdArray::from_ids(ids);
    let n = shuffled.len();
    random_shuffle(&mut shuffled, rng, n);

    let (min_size, extra) = (n / parts, n % parts);
    let mut rest = shuffled.as_slice();
    let mut split = Vec::with_capacity(parts);
    for part in 0..parts {
        let size = min_size + usize::from(part < extra);
        let (head, tail) = rest.split_at(size);
        split.push(IdArray::from(head.to_vec()));
        rest = tail;
    }
    Ok(split)
}
