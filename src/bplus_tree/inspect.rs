use core::fmt;
use core::iter::FusedIterator;
use core::slice;

use crate::raw::{Body, Link, Node, NodeId, RawTree};
use crate::record::{Key, Record};

/// A read-only view of one node of a `BPlusTree`.
///
/// Obtained from [`BPlusTree::root`] and navigated through [`heir`](NodeRef::heir),
/// [`links`](NodeRef::links) and the parent and sibling accessors. The view borrows the
/// tree, so the tree can not change while it is alive.
///
/// # Examples
///
/// ```
/// use heirloom_index::{BPlusTree, Record, Thresholds};
///
/// let mut index = BPlusTree::with_thresholds(Thresholds::new(3, 1)?);
/// index.extend((1..=4).map(|key| Record::new(key, key * 10)));
///
/// let root = index.root();
/// let heir = root.heir().unwrap();
/// assert_eq!(heir.records().unwrap(), &[Record::new(1, 10), Record::new(2, 20)]);
///
/// let (key, right) = root.links().next().unwrap();
/// assert_eq!(key, 3);
/// assert_eq!(right.min_key(), Some(3));
/// assert_eq!(right.prev().map(|node| node.id()), Some(heir.id()));
/// # Ok::<(), heirloom_index::Error>(())
/// ```
///
/// [`BPlusTree::root`]: crate::BPlusTree::root
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a RawTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(super) fn new(tree: &'a RawTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    fn node(&self) -> &'a Node {
        self.tree.node(self.id)
    }

    fn at(&self, id: Option<NodeId>) -> Option<NodeRef<'a>> {
        id.map(|id| NodeRef::new(self.tree, id))
    }

    /// Arena identity of the node. Stable until the node is merged away.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    /// Occupancy: the record count of a leaf, or the link count of an inner node. The heir
    /// is not counted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.node().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Key of the record or link at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn key_at(&self, index: usize) -> Key {
        self.node().key_at(index)
    }

    /// Records of a leaf in stored order, or `None` for an inner node.
    #[must_use]
    pub fn records(&self) -> Option<&'a [Record]> {
        match &self.node().body {
            Body::Leaf(leaf) => Some(leaf.records()),
            Body::Inner(_) => None,
        }
    }

    /// The child holding the keys below the first link, or `None` for a leaf.
    #[must_use]
    pub fn heir(&self) -> Option<NodeRef<'a>> {
        match &self.node().body {
            Body::Leaf(_) => None,
            Body::Inner(inner) => self.at(Some(inner.heir())),
        }
    }

    /// Routing keys and the children they lead to, in key order. Empty for a leaf.
    pub fn links(&self) -> Links<'a> {
        let links: &'a [Link] = match &self.node().body {
            Body::Leaf(_) => &[],
            Body::Inner(inner) => inner.links(),
        };
        Links {
            tree: self.tree,
            inner: links.iter(),
        }
    }

    /// The inner node owning this one, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.at(self.node().parent)
    }

    /// Left neighbour on the same level, possibly under another parent.
    #[must_use]
    pub fn prev(&self) -> Option<NodeRef<'a>> {
        self.at(self.node().prev)
    }

    /// Right neighbour on the same level, possibly under another parent.
    #[must_use]
    pub fn next(&self) -> Option<NodeRef<'a>> {
        self.at(self.node().next)
    }

    /// Smallest key stored anywhere below this node, or `None` if the subtree holds no
    /// records.
    #[must_use]
    pub fn min_key(&self) -> Option<Key> {
        self.tree.subtree_min(self.id)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("leaf", &self.is_leaf())
            .field("len", &self.len())
            .finish()
    }
}

/// An iterator over the links of an inner node, as `(key, child)` pairs.
///
/// This `struct` is created by the [`links`] method on [`NodeRef`].
///
/// [`links`]: NodeRef::links
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Clone)]
pub struct Links<'a> {
    tree: &'a RawTree,
    inner: slice::Iter<'a, Link>,
}

impl<'a> Iterator for Links<'a> {
    type Item = (Key, NodeRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.inner.next()?;
        Some((link.key, NodeRef::new(self.tree, link.child)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Links<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let link = self.inner.next_back()?;
        Some((link.key, NodeRef::new(self.tree, link.child)))
    }
}

impl ExactSizeIterator for Links<'_> {}

impl FusedIterator for Links<'_> {}

impl fmt::Debug for Links<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::{BPlusTree, Record, Thresholds};
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;

    fn scenario() -> BPlusTree {
        let mut tree = BPlusTree::with_thresholds(Thresholds::new(3, 1).unwrap());
        tree.extend((1..=4).map(|key| Record::new(key, key)));
        tree
    }

    #[test]
    fn leaf_root_has_no_children() {
        let tree = BPlusTree::new();
        let root = tree.root();
        assert!(root.is_leaf());
        assert!(root.is_empty());
        assert_eq!(root.records(), Some(&[][..]));
        assert!(root.heir().is_none());
        assert_eq!(root.links().len(), 0);
        assert!(root.parent().is_none());
        assert_eq!(root.min_key(), None);
    }

    #[test]
    fn inner_root_exposes_heir_and_links() {
        let tree = scenario();
        let root = tree.root();
        assert!(!root.is_leaf());
        assert_eq!(root.len(), 1);
        assert_eq!(root.key_at(0), 3);
        assert_eq!(root.records(), None);
        assert_eq!(root.min_key(), Some(1));

        let heir = root.heir().unwrap();
        let keys: Vec<i64> = heir.records().unwrap().iter().map(Record::key).collect();
        assert_eq!(keys, [1, 2]);
        assert_eq!(heir.parent().map(|node| node.id()), Some(root.id()));
        assert!(heir.prev().is_none());

        let children: Vec<(i64, Vec<i64>)> = root
            .links()
            .map(|(key, child)| (key, child.records().unwrap().iter().map(Record::key).collect()))
            .collect();
        assert_eq!(children, [(3, Vec::from([3, 4]))]);
    }

    #[test]
    fn siblings_link_across_parents() {
        let mut tree = BPlusTree::with_thresholds(Thresholds::new(3, 1).unwrap());
        tree.extend((0..30).map(|key| Record::new(key, key)));
        assert!(tree.height() >= 3);

        let mut leaf = tree.root();
        while let Some(heir) = leaf.heir() {
            leaf = heir;
        }
        let mut seen = Vec::new();
        let mut parents = Vec::new();
        let mut current = Some(leaf);
        while let Some(node) = current {
            seen.extend(node.records().unwrap().iter().map(Record::key));
            parents.push(node.parent().map(|parent| parent.id()));
            current = node.next();
        }
        assert_eq!(seen, (0..30).collect::<Vec<_>>());
        parents.dedup();
        assert!(parents.len() > 1);
    }

    #[test]
    fn links_iterate_from_both_ends() {
        let mut tree = BPlusTree::with_thresholds(Thresholds::new(4, 2).unwrap());
        tree.extend((0..12).map(|key| Record::new(key, key)));
        let keys: Vec<i64> = tree.root().links().rev().map(|(key, _)| key).collect();
        let mut forward = keys.clone();
        forward.reverse();
        assert_eq!(forward, tree.root().links().map(|(key, _)| key).collect::<Vec<_>>());
        assert!(keys.windows(2).all(|pair| pair[0] > pair[1]));
    }
}
