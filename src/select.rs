//! In-place order-statistic selection (quickselect).
//!
//! After selecting rank `r` in `start..end`, the element at `r` is the one a
//! full ascending sort would put there, everything in `start..r` compares
//! `<=` to it and everything in `r + 1..end` compares `>=`. Nothing else
//! about the order is guaranteed.
//!
//! # Algorithm
//!
//! - Intervals shorter than [`SMALL`] are insertion sorted and done.
//! - Otherwise five spread-out candidates are sorted with an optimal
//!   9-comparison network, and the candidate whose position is closest to
//!   the target rank becomes the pivot.
//! - The interval is partitioned around the pivot, which is then swapped
//!   into its final slot. Runs of elements equal to the pivot are skipped
//!   before narrowing to the side that holds the target rank.
//!
//! Expected time is O(n). The same core drives three front ends: identity
//! arrays with a caller-supplied comparator, distance lists compared on raw
//! `f64` distances, and plain `f64` slices.
//!
//! # Example
//!
//! ```rust
//! use vicinity_ids::select::median_f64;
//!
//! let mut values = [5.0, 3.0, 1.0, 4.0, 2.0];
//! assert_eq!(median_f64(&mut values).unwrap(), 3.0);
//! ```

use std::cmp::Ordering;

use crate::distance::{DistanceIdArray, DistanceIdPair};
use crate::error::{IdError, Result};
use crate::ids::{Id, IdArray};

/// Intervals shorter than this are insertion sorted.
pub const SMALL: usize = 47;

// =============================================================================
// Generic core
// =============================================================================

/// Select `rank` within `data[start..end]` using `compare`.
pub fn quick_select_by<T, F>(
    data: &mut [T],
    start: usize,
    end: usize,
    rank: usize,
    mut compare: F,
) -> Result<()>
where
    F: FnMut(&T, &T) -> Ordering,
{
    check_interval(data.len(), start, end)?;
    if rank < start || rank >= end {
        return Err(IdError::out_of_range(rank, end));
    }
    select_in_place(data, start, end, rank, &mut compare);
    Ok(())
}

fn check_interval(len: usize, start: usize, end: usize) -> Result<()> {
    if end > len {
        return Err(IdError::out_of_range(end, len));
    }
    if start >= end {
        return Err(IdError::InvalidArgument(format!(
            "cannot select from empty interval {start}..{end}"
        )));
    }
    Ok(())
}

/// Pivot candidate closest to the target rank.
#[inline]
fn best_pivot(rank: usize, m: [usize; 5]) -> usize {
    if rank < m[0] {
        return m[0];
    }
    if rank > m[4] {
        return m[4];
    }
    if rank < m[1] {
        return m[1];
    }
    if rank > m[3] {
        return m[3];
    }
    m[2]
}

/// Sort the five positions in `m` with Knuth's optimal network.
#[inline]
fn sort5<T, F>(data: &mut [T], m: [usize; 5], compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    const NETWORK: [(usize, usize); 9] = [
        (0, 1),
        (0, 2),
        (1, 2),
        (3, 4),
        (0, 3),
        (2, 3),
        (1, 4),
        (1, 2),
        (3, 4),
    ];
    for (a, b) in NETWORK {
        if compare(&data[m[a]], &data[m[b]]) == Ordering::Greater {
            data.swap(m[a], m[b]);
        }
    }
}

fn insertion_sort<T, F>(data: &mut [T], start: usize, end: usize, compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in start + 1..end {
        let mut j = i;
        while j > start && compare(&data[j - 1], &data[j]) == Ordering::Greater {
            data.swap(j, j - 1);
            j -= 1;
        }
    }
}

fn select_in_place<T, F>(data: &mut [T], mut start: usize, mut end: usize, rank: usize, compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    loop {
        // Also guarantees len >= SMALL below, so the candidates are distinct.
        if start + SMALL > end {
            insertion_sort(data, start, end, compare);
            return;
        }

        let len = end - start;
        let seventh = (len >> 3) + (len >> 6) + 1;
        let m3 = (start + end) >> 1;
        let m2 = m3 - seventh;
        let m1 = m2 - seventh;
        let m4 = m3 + seventh;
        let m5 = m4 + seventh;
        let candidates = [m1, m2, m3, m4, m5];
        sort5(data, candidates, compare);

        let pivot = end - 1;
        data.swap(best_pivot(rank, candidates), pivot);

        // Signed, since j may step below `start` when everything is >= pivot.
        let mut i = start as isize;
        let mut j = end as isize - 2;
        loop {
            while i <= j && compare(&data[i as usize], &data[pivot]) != Ordering::Greater {
                i += 1;
            }
            while j >= i && compare(&data[j as usize], &data[pivot]) != Ordering::Less {
                j -= 1;
            }
            if i >= j {
                break;
            }
            data.swap(i as usize, j as usize);
        }
        let mut i = i as usize;
        data.swap(i, pivot);

        // Skip runs equal to the pivot: they are already in their final place.
        let settled = i;
        while rank < i && compare(&data[i - 1], &data[settled]) == Ordering::Equal {
            i -= 1;
        }
        while rank > i && compare(&data[i + 1], &data[settled]) == Ordering::Equal {
            i += 1;
        }

        match rank.cmp(&i) {
            Ordering::Less => end = i,
            Ordering::Greater => start = i + 1,
            Ordering::Equal => return,
        }
    }
}

/// Position of the lower median of `begin..end`.
#[inline]
fn median_rank(begin: usize, end: usize) -> usize {
    begin + ((end - begin - 1) >> 1)
}

/// Position and interpolation weight of quantile `q` in `begin..end`.
fn quantile_rank(begin: usize, end: usize, q: f64) -> Result<(usize, f64)> {
    if !(0.0..=1.0).contains(&q) {
        return Err(IdError::InvalidArgument(format!(
            "quantile must be within [0, 1], got {q}"
        )));
    }
    let exact = (end - begin - 1) as f64 * q;
    let offset = exact.floor();
    Ok((begin + offset as usize, exact - offset))
}

// =============================================================================
// Identity arrays
// =============================================================================

/// Select `rank` within the whole array, ordering identities by `compare`.
pub fn quick_select_ids<F>(data: &mut IdArray, rank: usize, compare: F) -> Result<()>
where
    F: FnMut(Id, Id) -> Ordering,
{
    let len = data.as_slice().len();
    quick_select_ids_range(data, 0, len, rank, compare)
}

/// Select `rank` within `data[start..end]`.
pub fn quick_select_ids_range<F>(
    data: &mut IdArray,
    start: usize,
    end: usize,
    rank: usize,
    mut compare: F,
) -> Result<()>
where
    F: FnMut(Id, Id) -> Ordering,
{
    quick_select_by(data.as_mut_slice(), start, end, rank, |a, b| compare(*a, *b))
}

/// Move the lower median into place and return its position.
pub fn median_ids<F>(data: &mut IdArray, compare: F) -> Result<usize>
where
    F: FnMut(Id, Id) -> Ordering,
{
    let len = data.as_slice().len();
    median_ids_range(data, 0, len, compare)
}

/// Lower median of `data[begin..end]`; returns its position.
pub fn median_ids_range<F>(data: &mut IdArray, begin: usize, end: usize, compare: F) -> Result<usize>
where
    F: FnMut(Id, Id) -> Ordering,
{
    check_interval(data.as_slice().len(), begin, end)?;
    let rank = median_rank(begin, end);
    quick_select_ids_range(data, begin, end, rank, compare)?;
    Ok(rank)
}

/// Move quantile `q` (rounded down) into place and return its position.
pub fn quantile_ids<F>(data: &mut IdArray, q: f64, compare: F) -> Result<usize>
where
    F: FnMut(Id, Id) -> Ordering,
{
    let len = data.as_slice().len();
    quantile_ids_range(data, 0, len, q, compare)
}

/// Quantile `q` of `data[begin..end]`; returns its position.
pub fn quantile_ids_range<F>(
    data: &mut IdArray,
    begin: usize,
    end: usize,
    q: f64,
    compare: F,
) -> Result<usize>
where
    F: FnMut(Id, Id) -> Ordering,
{
    check_interval(data.as_slice().len(), begin, end)?;
    let (rank, _) = quantile_rank(begin, end, q)?;
    quick_select_ids_range(data, begin, end, rank, compare)?;
    Ok(rank)
}

// =============================================================================
// Distance lists
// =============================================================================

#[inline]
fn by_distance(a: &DistanceIdPair, b: &DistanceIdPair) -> Ordering {
    a.distance.total_cmp(&b.distance)
}

/// Select `rank` within the whole list, by distance.
pub fn quick_select_distances(data: &mut DistanceIdArray, rank: usize) -> Result<()> {
    let len = data.as_mut_pairs().len();
    quick_select_distances_range(data, 0, len, rank)
}

/// Select `rank` within `data[start..end]`, by distance.
pub fn quick_select_distances_range(
    data: &mut DistanceIdArray,
    start: usize,
    end: usize,
    rank: usize,
) -> Result<()> {
    quick_select_by(data.as_mut_pairs(), start, end, rank, by_distance)
}

/// Move the lower median distance into place and return its position.
pub fn median_distances(data: &mut DistanceIdArray) -> Result<usize> {
    let len = data.as_mut_pairs().len();
    median_distances_range(data, 0, len)
}

/// Lower median of `data[begin..end]`; returns its position.
pub fn median_distances_range(data: &mut DistanceIdArray, begin: usize, end: usize) -> Result<usize> {
    let pairs = data.as_mut_pairs();
    check_interval(pairs.len(), begin, end)?;
    let rank = median_rank(begin, end);
    select_in_place(pairs, begin, end, rank, &mut by_distance);
    Ok(rank)
}

/// Move quantile `q` (rounded down) into place and return its position.
pub fn quantile_distances(data: &mut DistanceIdArray, q: f64) -> Result<usize> {
    let len = data.as_mut_pairs().len();
    quantile_distances_range(data, 0, len, q)
}

/// Quantile `q` of `data[begin..end]`; returns its position.
pub fn quantile_distances_range(
    data: &mut DistanceIdArray,
    begin: usize,
    end: usize,
    q: f64,
) -> Result<usize> {
    let pairs = data.as_mut_pairs();
    check_interval(pairs.len(), begin, end)?;
    let (rank, _) = quantile_rank(begin, end, q)?;
    select_in_place(pairs, begin, end, rank, &mut by_distance);
    Ok(rank)
}

// =============================================================================
// Plain f64 slices
// =============================================================================

#[inline]
fn by_value(a: &f64, b: &f64) -> Ordering {
    a.total_cmp(b)
}

/// Select `rank` within `data[start..end]` and return the selected value.
pub fn quick_select_f64(data: &mut [f64], start: usize, end: usize, rank: usize) -> Result<f64> {
    quick_select_by(data, start, end, rank, by_value)?;
    Ok(data[rank])
}

/// Median of `data`, averaging the two middle values for even lengths.
pub fn median_f64(data: &mut [f64]) -> Result<f64> {
    let end = data.len();
    check_interval(end, 0, end)?;
    let left = median_rank(0, end);
    select_in_place(data, 0, end, left, &mut by_value);
    if end % 2 == 1 {
        return Ok(data[left]);
    }
    // The upper middle value is the minimum of the right part.
    select_in_place(data, left + 1, end, left + 1, &mut by_value);
    Ok(data[left] + 0.5 * (data[left + 1] - data[left]))
}

/// Quantile `q` of `data`, interpolating linearly between neighbouring
/// order statistics.
pub fn quantile_f64(data: &mut [f64], q: f64) -> Result<f64> {
    let end = data.len();
    check_interval(end, 0, end)?;
    let (rank, weight) = quantile_rank(0, end, q)?;
    select_in_place(data, 0, end, rank, &mut by_value);
    if weight <= f64::MIN_POSITIVE {
        return Ok(data[rank]);
    }
    select_in_place(data, rank + 1, end, rank + 1, &mut by_value);
    Ok(data[rank] + (data[rank + 1] - data[rank]) * weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ArrayIds, Ids};
    use rand::prelude::*;

    fn assert_selected(data: &[f64], rank: usize) {
        let mut sorted = data.to_vec();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(data[rank], sorted[rank], "wrong value at rank {rank}");
        assert!(data[..rank].iter().all(|&x| x <= data[rank]));
        assert!(data[rank + 1..].iter().all(|&x| x >= data[rank]));
    }

    #[test]
    fn median_examples() {
        let mut odd = [5.0, 3.0, 1.0, 4.0, 2.0];
        assert_eq!(median_f64(&mut odd).unwrap(), 3.0);

        let mut ids = IdArray::from(vec![1, 2, 3, 4]);
        let pos = median_ids(&mut ids, |a, b| a.cmp(&b)).unwrap();
        assert_eq!(pos, 1);
        assert_eq!(ids.get(pos), Ok(Id(2)));

        let mut even = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(median_f64(&mut even).unwrap(), 2.5);
    }

    #[test]
    fn small_and_large_inputs() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in [1usize, 2, 5, 46, 47, 48, 100, 1000, 5000] {
            let data: Vec<f64> = (0..n).map(|_| rng.random_range(0.0..1.0)).collect();
            for rank in [0, n / 3, n / 2, n - 1] {
                let mut work = data.clone();
                quick_select_f64(&mut work, 0, n, rank).unwrap();
                assert_selected(&work, rank);
            }
        }
    }

    #[test]
    fn many_duplicates() {
        let mut rng = StdRng::seed_from_u64(7);
        let data: Vec<f64> = (0..2000).map(|_| f64::from(rng.random_range(0..4u8))).collect();
        for rank in [0, 499, 500, 1000, 1999] {
            let mut work = data.clone();
            let n = work.len();
            quick_select_f64(&mut work, 0, n, rank).unwrap();
            assert_selected(&work, rank);
        }
    }

    #[test]
    fn adversarial_orders() {
        let ascending: Vec<f64> = (0..1000).map(f64::from).collect();
        let descending: Vec<f64> = ascending.iter().rev().copied().collect();
        let organ: Vec<f64> = (0..500).chain((0..500).rev()).map(f64::from).collect();
        for data in [ascending, descending, organ] {
            let mut work = data.clone();
            let rank = 333;
            quick_select_f64(&mut work, 0, 1000, rank).unwrap();
            assert_selected(&work, rank);
        }
    }

    #[test]
    fn subrange_is_respected() {
        let mut data: Vec<f64> = (0..200).rev().map(f64::from).collect();
        let before = data.clone();
        quick_select_f64(&mut data, 50, 150, 100).unwrap();
        assert_eq!(&data[..50], &before[..50]);
        assert_eq!(&data[150..], &before[150..]);
        assert_selected(&data[50..150], 50);
    }

    #[test]
    fn quantile_positions() {
        let mut ids: IdArray = (0..101u32).rev().map(Id).collect();
        let pos = quantile_ids(&mut ids, 0.9, |a, b| a.cmp(&b)).unwrap();
        assert_eq!(pos, 90);
        assert_eq!(ids.get(pos), Ok(Id(90)));

        let mut values = [4.0, 0.0, 2.0, 1.0, 3.0];
        assert_eq!(quantile_f64(&mut values, 0.25).unwrap(), 1.0);
        let interpolated = quantile_f64(&mut values, 0.3).unwrap();
        assert!((interpolated - 1.2).abs() < 1e-12, "got {interpolated}");
    }

    #[test]
    fn distance_lists() {
        let mut list = DistanceIdArray::new();
        for i in 0..60u32 {
            list.add(f64::from((i * 7) % 60), &Id(i));
        }
        let pos = median_distances(&mut list).unwrap();
        assert_eq!(pos, 29);
        let pairs = list.as_mut_pairs();
        assert_eq!(pairs[pos].distance, 29.0);
        // The identity travels with its distance.
        assert_eq!((pairs[pos].id.index() * 7) % 60, 29);

        let pos = quantile_distances(&mut list, 1.0).unwrap();
        assert_eq!(pos, 59);
        assert_eq!(list.as_mut_pairs()[pos].distance, 59.0);
        assert_eq!(list.len(), 60);
    }

    #[test]
    fn invalid_arguments() {
        let mut empty: [f64; 0] = [];
        assert!(matches!(median_f64(&mut empty), Err(IdError::InvalidArgument(_))));

        let mut ids = IdArray::new();
        assert!(median_ids(&mut ids, |a, b| a.cmp(&b)).is_err());

        let mut values = [1.0, 2.0];
        assert!(quantile_f64(&mut values, 1.5).is_err());
        assert!(quantile_f64(&mut values, f64::NAN).is_err());
        assert!(quick_select_f64(&mut values, 0, 3, 1).is_err());
        assert!(matches!(
            quick_select_f64(&mut values, 0, 2, 2),
            Err(IdError::OutOfRange { .. })
        ));
    }
}
