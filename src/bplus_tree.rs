use core::fmt;

use crate::error::Result;
use crate::raw::RawTree;
use crate::record::{Key, Record};
use crate::thresholds::Thresholds;

mod inspect;
mod iter;

pub use inspect::{Links, NodeRef};
pub use iter::Iter;

/// An ordered index from integer keys to integer values, based on a [B+ tree].
///
/// Records are kept in leaves sorted by key and the leaves are chained left to right, so
/// [`iter`](BPlusTree::iter) visits every record in ascending key order without climbing
/// back up the tree. Inner nodes hold one "heir" child for the keys below their first
/// routing key and one link per further child.
///
/// Keys may repeat. A record inserted under an existing key lands after the records
/// already stored under it, and [`remove`](BPlusTree::remove) deletes the run of equal
/// keys held by the rightmost leaf that has any, so older duplicates outlive newer ones.
///
/// Node occupancy is bounded by the tree's [`Thresholds`]: a node holding more than
/// `max` entries splits, and a non-root node holding fewer than `min` folds itself into a
/// neighbour sharing its parent when the result stays within `max`. When no neighbour
/// qualifies the node is left under-sized.
///
/// # Examples
///
/// ```
/// use heirloom_index::{BPlusTree, Record};
///
/// let mut index = BPlusTree::new();
/// index.insert(Record::new(3, 30));
/// index.insert(Record::new(1, 10));
/// index.insert(Record::new(2, 20));
///
/// assert_eq!(index.search(2), Some(&Record::new(2, 20)));
/// assert_eq!(index.search(4), None);
///
/// assert!(index.remove(1));
/// assert!(!index.remove(1));
///
/// for record in &index {
///     println!("{record}");
/// }
/// assert_eq!(index.len(), 2);
/// ```
///
/// A tree with a known list of records can be collected from an iterator:
///
/// ```
/// use heirloom_index::{BPlusTree, Record};
///
/// let index: BPlusTree = (0..100).map(|key| Record::new(key, -key)).collect();
/// assert_eq!(index.search(42).map(Record::value), Some(-42));
/// ```
///
/// [B+ tree]: https://en.wikipedia.org/wiki/B%2B_tree
#[derive(Clone)]
pub struct BPlusTree {
    raw: RawTree,
}

impl BPlusTree {
    /// Makes a new, empty tree using the default [`Thresholds`].
    ///
    /// The root starts out as an empty leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use heirloom_index::{BPlusTree, MAX_THRESHOLD};
    ///
    /// let index = BPlusTree::new();
    /// assert!(index.is_empty());
    /// assert_eq!(index.thresholds().max(), MAX_THRESHOLD);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_thresholds(Thresholds::default())
    }

    /// Makes a new, empty tree whose nodes obey `thresholds`.
    ///
    /// # Examples
    ///
    /// ```
    /// use heirloom_index::{BPlusTree, Record, Thresholds};
    ///
    /// let mut index = BPlusTree::with_thresholds(Thresholds::new(3, 1)?);
    /// index.extend((1..=4).map(|key| Record::new(key, key)));
    /// assert_eq!(index.height(), 2);
    /// # Ok::<(), heirloom_index::Error>(())
    /// ```
    #[must_use]
    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self {
            raw: RawTree::new(thresholds),
        }
    }

    /// Returns the occupancy bounds this tree was built with.
    #[must_use]
    pub const fn thresholds(&self) -> Thresholds {
        self.raw.thresholds()
    }

    /// Returns the number of records in the tree, duplicates included.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of levels, counting the root and the leaves. A tree whose root
    /// is a leaf has height 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use heirloom_index::{BPlusTree, Record};
    ///
    /// let mut index = BPlusTree::new();
    /// assert_eq!(index.height(), 1);
    /// index.extend((0..1000).map(|key| Record::new(key, key)));
    /// assert!(index.height() > 1);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the number of nodes currently allocated, leaves and inner nodes alike.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.raw.node_count()
    }

    /// Returns a record stored under `key`, if any.
    ///
    /// Equal keys may span several leaves. The record returned is the oldest one in the
    /// rightmost leaf holding `key`, which is not the oldest overall once a run spans
    /// leaves.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use heirloom_index::{BPlusTree, Record};
    ///
    /// let mut index = BPlusTree::new();
    /// index.insert(Record::new(1, 100));
    /// index.insert(Record::new(1, 200));
    /// assert_eq!(index.search(1).map(Record::value), Some(100));
    /// assert_eq!(index.search(2), None);
    /// ```
    #[must_use]
    pub fn search(&self, key: Key) -> Option<&Record> {
        self.raw.search(key)
    }

    /// Adds `record` to the tree, splitting nodes that grow past the maximum occupancy.
    ///
    /// Records with an equal key are kept; the new one goes after them. Always returns
    /// `true`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use heirloom_index::{BPlusTree, Record};
    ///
    /// let mut index = BPlusTree::new();
    /// assert!(index.insert(Record::new(5, 50)));
    /// assert!(index.insert(Record::new(5, 51)));
    /// assert_eq!(index.len(), 2);
    /// ```
    #[allow(clippy::must_use_candidate)]
    pub fn insert(&mut self, record: Record) -> bool {
        self.raw.insert(record);
        true
    }

    /// Removes every record stored under `key` in the rightmost leaf holding `key`, then
    /// repairs routing keys and merges under-sized nodes into their neighbours.
    ///
    /// Returns `false`, leaving the tree untouched, when no such record exists.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use heirloom_index::{BPlusTree, Record};
    ///
    /// let mut index: BPlusTree = (0..10).map(|key| Record::new(key, key)).collect();
    /// assert!(index.remove(4));
    /// assert!(!index.remove(4));
    /// assert_eq!(index.len(), 9);
    /// ```
    #[allow(clippy::must_use_candidate)]
    pub fn remove(&mut self, key: Key) -> bool {
        self.raw.remove(key) > 0
    }

    /// Removes every record, leaving a single empty leaf as the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use heirloom_index::{BPlusTree, Record};
    ///
    /// let mut index: BPlusTree = (0..500).map(|key| Record::new(key, key)).collect();
    /// index.clear();
    /// assert!(index.is_empty());
    /// assert_eq!(index.height(), 1);
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator over the records of the tree, in ascending key order.
    ///
    /// Every call starts over from the leftmost leaf.
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; O(1) amortized per step along the leaf chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use heirloom_index::{BPlusTree, Record};
    ///
    /// let index: BPlusTree = [3, 1, 2].into_iter().map(|key| Record::new(key, 0)).collect();
    /// let keys: Vec<i64> = index.iter().map(Record::key).collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.raw)
    }

    /// Returns a read-only view of the root node.
    ///
    /// # Examples
    ///
    /// ```
    /// use heirloom_index::{BPlusTree, Record, Thresholds};
    ///
    /// let mut index = BPlusTree::with_thresholds(Thresholds::new(3, 1)?);
    /// index.extend((1..=4).map(|key| Record::new(key, key)));
    ///
    /// let root = index.root();
    /// assert!(!root.is_leaf());
    /// let keys: Vec<i64> = root.links().map(|(key, _)| key).collect();
    /// assert_eq!(keys, [3]);
    /// # Ok::<(), heirloom_index::Error>(())
    /// ```
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef::new(&self.raw, self.raw.root())
    }

    /// Checks the structural invariants of the whole tree.
    ///
    /// Ordinary operations never call this; it is meant for tests and debugging.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: an over-full node, unsorted records or links, a
    /// routing key that differs from the smallest key below it, a wrong parent or sibling
    /// reference, leaves at different depths, or a record count that disagrees with the
    /// leaves. Nodes left under-sized for lack of a mergeable neighbour are not reported.
    pub fn validate(&self) -> Result<()> {
        self.raw.validate()
    }
}

impl Default for BPlusTree {
    fn default() -> Self {
        BPlusTree::new()
    }
}

impl fmt::Debug for BPlusTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Writes one line per leaf, left to right, each record as `[key: k, value: v]`. Empty
/// leaves produce empty lines.
impl fmt::Display for BPlusTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut leaf = Some(self.raw.first_leaf());
        while let Some(id) = leaf {
            let node = self.raw.node(id);
            for record in node.as_leaf().records() {
                write!(f, "{record}")?;
            }
            writeln!(f)?;
            leaf = node.next;
        }
        Ok(())
    }
}

/// Trees are equal when they yield the same records in the same order; their thresholds
/// and shapes may differ.
impl PartialEq for BPlusTree {
    fn eq(&self, other: &BPlusTree) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for BPlusTree {}

impl FromIterator<Record> for BPlusTree {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        let mut tree = BPlusTree::new();
        tree.extend(iter);
        tree
    }
}

impl Extend<Record> for BPlusTree {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl<'a> Extend<&'a Record> for BPlusTree {
    fn extend<T: IntoIterator<Item = &'a Record>>(&mut self, iter: T) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a> IntoIterator for &'a BPlusTree {
    type Item = &'a Record;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
