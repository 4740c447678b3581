//! Merge-join dot product over sorted sparse rows

use num_traits::Num;
use std::cmp::Ordering;
use std::ops::AddAssign;

use crate::matrix::SparseRow;

/// Dot product of two rows sorted by column
///
/// Walks both rows with two cursors, advancing the one with the smaller
/// column and accumulating `a·b` where the columns are equal. This is a
/// presence test as much as a sum: `None` means no column is shared,
/// while `Some(sum)` means at least one is, even if `sum` is zero.
///
/// Runs in O(|a| + |b|).
#[inline]
pub fn dot<T>(a: &[(usize, T)], b: &[(usize, T)]) -> Option<T>
where
    T: Copy + Num + AddAssign,
{
    let mut matched = false;
    let mut sum = T::zero();
    let (mut ia, mut ib) = (0, 0);

    while ia < a.len() && ib < b.len() {
        let (a_col, a_val) = a[ia];
        let (b_col, b_val) = b[ib];

        match a_col.cmp(&b_col) {
            Ordering::Equal => {
                sum += a_val * b_val;
                matched = true;
                ia += 1;
                ib += 1;
            }
            Ordering::Less => ia += 1,
            Ordering::Greater => ib += 1,
        }
    }

    matched.then_some(sum)
}

/// [`dot`] over two [`SparseRow`]s
#[inline]
pub fn dot_rows<T>(a: &SparseRow<T>, b: &SparseRow<T>) -> Option<T>
where
    T: Copy + Num + AddAssign,
{
    dot(a.entries(), b.entries())
}
