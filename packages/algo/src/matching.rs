//! Maximum-weight bipartite matching
//!
//! Aligns source tokens (rows) with target tokens (columns) so that the sum
//! of similarity over selected pairs is maximal. Edges scoring below the
//! acceptance threshold (or not strictly positive) are never selected, so a
//! token may stay unmatched.
//!
//! Solved as a rectangular assignment problem with the Hungarian method,
//! O(n² · m) for n ≤ m. Ties resolve the same way on every run.

/// Select the maximum-weight set of `(row, col)` pairs
///
/// `scores` must be rectangular; rows of differing length are treated as
/// padded with zeros. Returned pairs are sorted by row, then column.
pub fn max_weight_matching(scores: &[Vec<f64>], threshold: f64) -> Vec<(usize, usize)> {
    let rows = scores.len();
    let cols = scores.iter().map(Vec::len).max().unwrap_or(0);
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let weight = |i: usize, j: usize| -> f64 {
        let w = scores[i].get(j).copied().unwrap_or(0.0);
        if w.is_finite() && w > 0.0 && w >= threshold {
            w
        } else {
            0.0
        }
    };

    // The solver needs at least as many columns as rows.
    let transposed = rows > cols;
    let (n, m) = if transposed { (cols, rows) } else { (rows, cols) };
    let cost: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..m)
                .map(|j| if transposed { -weight(j, i) } else { -weight(i, j) })
                .collect()
        })
        .collect();

    let assignment = hungarian(&cost, n, m);

    let mut pairs: Vec<(usize, usize)> = assignment
        .into_iter()
        .map(|(i, j)| if transposed { (j, i) } else { (i, j) })
        .filter(|&(i, j)| weight(i, j) > 0.0)
        .collect();
    pairs.sort_unstable();
    pairs
}

/// Total score of a set of pairs
pub fn matching_weight(scores: &[Vec<f64>], pairs: &[(usize, usize)]) -> f64 {
    pairs
        .iter()
        .filter_map(|&(i, j)| scores.get(i).and_then(|row| row.get(j)))
        .sum()
}

/// Minimum-cost assignment of every row to a distinct column (n ≤ m)
fn hungarian(cost: &[Vec<f64>], n: usize, m: usize) -> Vec<(usize, usize)> {
    // 1-indexed potentials; p[j] is the row assigned to column j (0 = none).
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; m + 1];
    let mut p = vec![0_usize; m + 1];
    let mut way = vec![0_usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0_usize;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0_usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    (1..=m)
        .filter(|&j| p[j] != 0)
        .map(|j| (p[j] - 1, j - 1))
        .collect()
}
