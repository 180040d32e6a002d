use core::fmt;
use core::iter::FusedIterator;

use crate::raw::{NodeId, RawTree};
use crate::record::Record;

/// An iterator over the records of a `BPlusTree`, in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`BPlusTree`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use heirloom_index::{BPlusTree, Record};
///
/// let index: BPlusTree = [Record::new(2, 20), Record::new(1, 10)].into_iter().collect();
/// let mut iter = index.iter();
/// assert_eq!(iter.len(), 2);
/// assert_eq!(iter.next(), Some(&Record::new(1, 10)));
/// assert_eq!(iter.next(), Some(&Record::new(2, 20)));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: crate::BPlusTree::iter
/// [`BPlusTree`]: crate::BPlusTree
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Clone)]
pub struct Iter<'a> {
    tree: &'a RawTree,
    leaf: Option<NodeId>,
    index: usize,
    remaining: usize,
}

impl<'a> Iter<'a> {
    pub(super) fn new(tree: &'a RawTree) -> Self {
        Self {
            tree,
            leaf: Some(tree.first_leaf()),
            index: 0,
            remaining: tree.len(),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<&'a Record> {
        if self.remaining == 0 {
            return None;
        }

        // Leaves emptied by removals stay in the chain until merged; step over them.
        loop {
            let node = self.tree.node(self.leaf?);
            if let Some(record) = node.as_leaf().records().get(self.index) {
                self.index += 1;
                self.remaining -= 1;
                return Some(record);
            }
            self.leaf = node.next;
            self.index = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl FusedIterator for Iter<'_> {}

impl fmt::Debug for Iter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::{BPlusTree, Record, Thresholds};
    use alloc::format;
    use alloc::vec::Vec;

    fn keys(tree: &BPlusTree) -> Vec<i64> {
        tree.iter().map(Record::key).collect()
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let tree = BPlusTree::new();
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 0);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn walks_every_leaf_in_order() {
        let mut tree = BPlusTree::with_thresholds(Thresholds::new(4, 2).unwrap());
        tree.extend((0..50).rev().map(|key| Record::new(key, key)));
        assert!(tree.height() > 2);
        assert_eq!(keys(&tree), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn reflects_removals() {
        let mut tree = BPlusTree::with_thresholds(Thresholds::new(3, 1).unwrap());
        tree.extend((1..=4).map(|key| Record::new(key, key)));
        tree.remove(1);
        tree.remove(2);
        assert_eq!(keys(&tree), [3, 4]);
    }

    #[test]
    fn restarts_from_the_leftmost_leaf() {
        let tree: BPlusTree = (0..100).map(|key| Record::new(key, key)).collect();
        let mut first = tree.iter();
        first.nth(49);
        assert_eq!(first.len(), 50);
        assert_eq!(tree.iter().next(), Some(&Record::new(0, 0)));
    }

    #[test]
    fn size_hint_tracks_progress() {
        let tree: BPlusTree = (0..3).map(|key| Record::new(key, key)).collect();
        let mut iter = tree.iter();
        assert_eq!(iter.size_hint(), (3, Some(3)));
        iter.next();
        assert_eq!(iter.size_hint(), (2, Some(2)));
        assert_eq!(
            format!("{iter:?}"),
            "[Record { key: 1, value: 1 }, Record { key: 2, value: 2 }]"
        );
    }
}
