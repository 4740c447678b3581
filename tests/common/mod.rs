//! Graph generators shared by the integration tests

#![allow(dead_code)]

use proptest::prelude::*;
use std::collections::BTreeSet;

/// Strictly lower triangular edge list of the complete graph on `n` vertices
pub fn complete_graph(n: usize) -> Vec<(usize, usize)> {
    (0..n).flat_map(|i| (0..i).map(move |j| (i, j))).collect()
}

/// Cycle 0 - 1 - ... - (n-1) - 0, lower triangle only
pub fn cycle_graph(n: usize) -> Vec<(usize, usize)> {
    let mut edges: Vec<_> = (1..n).map(|i| (i, i - 1)).collect();
    if n > 2 {
        edges.push((n - 1, 0));
    }
    edges
}

/// `n choose 3`
pub fn choose3(n: usize) -> i64 {
    if n < 3 {
        return 0;
    }
    let n = n as i64;
    n * (n - 1) * (n - 2) / 6
}

/// Random simple graph: a vertex count and its distinct lower-triangle edges
pub fn lower_graph(max_nodes: usize) -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1..max_nodes)
        .prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..n * n)))
        .prop_map(|(n, pairs)| {
            let edges: BTreeSet<(usize, usize)> = pairs
                .into_iter()
                .filter(|(u, v)| u != v)
                .map(|(u, v)| (u.max(v), u.min(v)))
                .collect();
            (n, edges.into_iter().collect())
        })
}
