//! Integration tests for the bounded k-NN heap and finalized lists.

use rand::prelude::*;
use vicinity_ids::distance::DistanceIdList;
use vicinity_ids::{Id, IdCursor, IdError, IdFactory, IdRef, Ids, KnnHeap, KnnResult};

fn brute_force(distances: &[f64], k: usize) -> Vec<f64> {
    let mut sorted = distances.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.truncate(k);
    sorted
}

#[test]
fn heap_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(42);
    let factory = IdFactory::default();
    for k in [1, 5, 20, 100] {
        let distances: Vec<f64> = (0..500).map(|_| rng.random::<f64>()).collect();
        let mut heap = factory.new_heap(k).expect("k > 0");
        for (i, &d) in distances.iter().enumerate() {
            heap.insert(d, &Id::from(i as u32));
        }
        let knn = heap.into_knn_list();
        let expected = brute_force(&distances, k);

        assert_eq!(knn.len(), k);
        let got: Vec<f64> = knn.as_pairs().iter().map(|p| p.distance).collect();
        assert_eq!(got, expected);
        assert_eq!(knn.k_distance(), expected[k - 1]);
    }
}

#[test]
fn k_distance_is_a_pruning_bound() {
    let mut heap = KnnHeap::new(3).unwrap();
    let mut pruned = 0;
    for (i, d) in [5.0, 4.0, 3.0, 2.0, 9.0, 8.0, 1.0].into_iter().enumerate() {
        if d > heap.k_distance() {
            pruned += 1;
            continue;
        }
        heap.insert(d, &Id::from(i as u32));
    }
    assert_eq!(pruned, 2);
    assert_eq!(heap.k_distance(), 3.0);
}

#[test]
fn fewer_candidates_than_k() {
    let mut heap = KnnHeap::new(10).unwrap();
    heap.insert(0.3, &Id::from(1));
    heap.insert(0.1, &Id::from(2));
    assert!(!heap.is_full());
    let knn = heap.into_knn_list();
    assert_eq!(knn.len(), 2);
    assert_eq!(knn.k(), 10);
    assert_eq!(knn.k_distance(), f64::INFINITY);
}

#[test]
fn finalized_list_is_iterable_as_identities() {
    let mut heap = KnnHeap::new(3).unwrap();
    for (i, d) in [0.7, 0.2, 0.5, 0.9].into_iter().enumerate() {
        heap.insert(d, &Id::from(i as u32));
    }
    let knn = heap.into_knn_list();

    let mut order = Vec::new();
    let mut it = knn.pairs_iter();
    while it.valid() {
        order.push((it.internal_index(), it.distance()));
        it.advance();
    }
    assert_eq!(order, vec![(1, 0.2), (2, 0.5), (0, 0.7)]);
    assert!(knn.contains(&Id::from(2)));
    assert!(!knn.contains(&Id::from(3)));
    assert_eq!(knn.to_id_array().as_slice(), &[Id::from(1), Id::from(2), Id::from(0)]);
}

#[test]
fn ties_are_kept_by_sub_list_but_not_by_heap() {
    // Candidates 2 and 3 tie at the 2nd-smallest distance.
    let candidates = [(0.5, 0), (0.1, 1), (0.3, 2), (0.3, 3), (0.9, 4)];

    let mut online = KnnHeap::new(2).unwrap();
    let mut generous = KnnHeap::new(4).unwrap();
    for &(d, i) in &candidates {
        online.insert(d, &Id::from(i));
        generous.insert(d, &Id::from(i));
    }
    assert_eq!(online.into_knn_list().len(), 2);

    let generous = generous.into_knn_list();
    let exact = generous.sub_list(2).unwrap();
    assert!(exact.len() > 2);
    assert!(exact.contains(&Id::from(2)));
    assert!(exact.contains(&Id::from(3)));
}

#[test]
fn reseeded_heap_continues_search() {
    let mut heap = KnnHeap::new(2).unwrap();
    heap.insert(0.4, &Id::from(0));
    heap.insert(0.6, &Id::from(1));
    let first_pass = heap.into_knn_list();

    let factory = IdFactory::default();
    let mut heap = factory.new_heap_from(&first_pass);
    assert_eq!(heap.k_distance(), 0.6);
    heap.insert(0.5, &Id::from(2));
    let knn = heap.into_knn_list();
    assert_eq!(knn.distance(1), Ok(0.5));
    assert!(matches!(knn.distance(2), Err(IdError::OutOfRange { .. })));
}

#[test]
fn poll_yields_descending_distances() {
    let mut heap = KnnHeap::new(4).unwrap();
    for (i, d) in [0.3, 0.1, 0.4, 0.2].into_iter().enumerate() {
        heap.insert(d, &Id::from(i as u32));
    }
    let mut drained = Vec::new();
    while let Some(pair) = heap.poll() {
        drained.push(pair.distance);
    }
    assert_eq!(drained, vec![0.4, 0.3, 0.2, 0.1]);
    assert!(heap.is_empty());
}
