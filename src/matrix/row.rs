//! Sorted sparse row storage

use num_traits::Num;
use std::ops::AddAssign;

use crate::matrix::config::DuplicatePolicy;

/// Result of a sorted insert into a [`SparseRow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The column was new and a pair was added
    Inserted,
    /// The column existed and the value was added onto it
    Merged,
    /// The column existed and the policy refused the insert
    Duplicate,
}

/// A sparse row: `(column, value)` pairs strictly increasing by column
///
/// Every mutation goes through [`SparseRow::insert`] or
/// [`SparseRow::push_sorted`], both of which keep the columns sorted and
/// unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseRow<T> {
    entries: Vec<(usize, T)>,
}

impl<T> SparseRow<T>
where
    T: Copy + Num + AddAssign,
{
    /// Creates an empty row
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a row from pairs that are already strictly sorted by column
    ///
    /// Returns `None` if the columns are not strictly increasing.
    pub fn from_sorted(entries: Vec<(usize, T)>) -> Option<Self> {
        if entries.windows(2).all(|w| w[0].0 < w[1].0) {
            Some(Self { entries })
        } else {
            None
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the row has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The stored pairs in column order
    pub fn entries(&self) -> &[(usize, T)] {
        &self.entries
    }

    /// Iterator over the column indices
    pub fn columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|&(col, _)| col)
    }

    /// Iterator over `(column, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.entries.iter().copied()
    }

    /// Whether `col` has an entry (existence only, the value is ignored)
    pub fn contains(&self, col: usize) -> bool {
        self.entries.binary_search_by_key(&col, |&(c, _)| c).is_ok()
    }

    /// Value stored at `col`, if any
    pub fn get(&self, col: usize) -> Option<T> {
        self.entries
            .binary_search_by_key(&col, |&(c, _)| c)
            .ok()
            .map(|pos| self.entries[pos].1)
    }

    /// Sorted insertion that keeps columns unique
    pub fn insert(&mut self, col: usize, val: T, policy: DuplicatePolicy) -> InsertOutcome {
        // Fast path for the common case of columns arriving in order
        if self.entries.last().map_or(true, |&(last, _)| last < col) {
            self.entries.push((col, val));
            return InsertOutcome::Inserted;
        }

        match self.entries.binary_search_by_key(&col, |&(c, _)| c) {
            Ok(pos) => match policy {
                DuplicatePolicy::Reject => InsertOutcome::Duplicate,
                DuplicatePolicy::Sum => {
                    self.entries[pos].1 += val;
                    InsertOutcome::Merged
                }
            },
            Err(pos) => {
                self.entries.insert(pos, (col, val));
                InsertOutcome::Inserted
            }
        }
    }

    /// Append a pair whose column is greater than every stored column
    ///
    /// Returns `false` (and leaves the row untouched) otherwise.
    pub fn push_sorted(&mut self, col: usize, val: T) -> bool {
        match self.entries.last() {
            Some(&(last, _)) if last >= col => false,
            _ => {
                self.entries.push((col, val));
                true
            }
        }
    }

    /// Sum of the stored values
    pub fn sum(&self) -> T {
        let mut total = T::zero();
        for &(_, val) in &self.entries {
            total += val;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_columns_sorted() {
        let mut row = SparseRow::<i64>::new();
        for col in [5, 1, 3, 0, 4] {
            assert_eq!(row.insert(col, 1, DuplicatePolicy::Reject), InsertOutcome::Inserted);
        }
        let cols: Vec<_> = row.columns().collect();
        assert_eq!(cols, vec![0, 1, 3, 4, 5]);
    }

    #[test]
    fn test_duplicate_reject_leaves_row_untouched() {
        let mut row = SparseRow::<i64>::new();
        row.insert(2, 7, DuplicatePolicy::Reject);
        assert_eq!(row.insert(2, 1, DuplicatePolicy::Reject), InsertOutcome::Duplicate);
        assert_eq!(row.entries(), &[(2, 7)]);
    }

    #[test]
    fn test_duplicate_sum_merges() {
        let mut row = SparseRow::<i64>::new();
        row.insert(2, 7, DuplicatePolicy::Sum);
        row.insert(4, 1, DuplicatePolicy::Sum);
        assert_eq!(row.insert(2, 3, DuplicatePolicy::Sum), InsertOutcome::Merged);
        assert_eq!(row.entries(), &[(2, 10), (4, 1)]);
    }

    #[test]
    fn test_contains_is_structural() {
        let row = SparseRow::from_sorted(vec![(1, 0i64), (3, 2)]).unwrap();
        assert!(row.contains(1)); // stored zero still counts
        assert!(row.contains(3));
        assert!(!row.contains(2));
        assert_eq!(row.get(3), Some(2));
        assert_eq!(row.get(0), None);
    }

    #[test]
    fn test_from_sorted_rejects_unsorted() {
        assert!(SparseRow::from_sorted(vec![(2, 1i64), (1, 1)]).is_none());
        assert!(SparseRow::from_sorted(vec![(1, 1i64), (1, 1)]).is_none());
    }

    #[test]
    fn test_push_sorted() {
        let mut row = SparseRow::<i64>::new();
        assert!(row.push_sorted(0, 1));
        assert!(row.push_sorted(3, 1));
        assert!(!row.push_sorted(3, 1));
        assert!(!row.push_sorted(1, 1));
        assert_eq!(row.len(), 2);
        assert_eq!(row.sum(), 2);
    }
}
