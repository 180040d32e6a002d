use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::NodeId;
use super::node::{Body, InnerNode, Link, Node};
use crate::record::{Key, Record};
use crate::thresholds::Thresholds;

/// The B+ tree engine backing `BPlusTree`.
///
/// Every node lives in `nodes`; `root` is the only node not owned by an inner node.
#[derive(Clone)]
pub(crate) struct RawTree {
    pub(super) nodes: Arena<Node>,
    pub(super) root: NodeId,
    pub(super) len: usize,
    pub(super) thresholds: Thresholds,
}

/// Outcome of splitting one node: the freshly allocated right sibling and the key that
/// routes to it from the parent.
struct Split {
    key: Key,
    sibling: NodeId,
}

impl RawTree {
    /// Creates a tree whose root is an empty leaf.
    pub(crate) fn new(thresholds: Thresholds) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::new_leaf());
        Self {
            nodes,
            root,
            len: 0,
            thresholds,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub(crate) const fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id)
    }

    /// Number of live nodes, leaves and inner nodes alike.
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Levels from the root down to the leaves, counting both.
    pub(crate) fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.root;
        while let Body::Inner(inner) = &self.nodes.get(current).body {
            current = inner.heir();
            height += 1;
        }
        height
    }

    /// Drops every record and node, leaving a single empty leaf as root.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::new_leaf());
        self.len = 0;
    }

    /// Follows routing decisions from the root to the leaf responsible for `key`.
    pub(crate) fn find_leaf(&self, key: Key) -> NodeId {
        let mut current = self.root;
        loop {
            match &self.nodes.get(current).body {
                Body::Inner(inner) => current = inner.search(key),
                Body::Leaf(_) => return current,
            }
        }
    }

    /// Leftmost leaf, reached through heirs only.
    pub(crate) fn first_leaf(&self) -> NodeId {
        let mut current = self.root;
        while let Body::Inner(inner) = &self.nodes.get(current).body {
            current = inner.heir();
        }
        current
    }

    /// First record with `key` in the leaf holding that key.
    pub(crate) fn search(&self, key: Key) -> Option<&Record> {
        let leaf = self.leaf_holding(key)?;
        self.nodes.get(leaf).as_leaf().search(key)
    }

    /// Adds `record` to its leaf, then splits over-sized nodes bottom-up.
    ///
    /// A record landing first in its leaf refreshes the routing keys on its path: a link
    /// to a subtree emptied by removals still carries its old key.
    pub(crate) fn insert(&mut self, record: Record) {
        let leaf = self.find_leaf(record.key());
        let slot = self.nodes.get_mut(leaf).as_leaf_mut().add_record(record);
        self.len += 1;
        if slot == 0 {
            self.repair_routing_keys(leaf);
        }

        let mut current = leaf;
        while self.thresholds.is_too_big(self.nodes.get(current).len()) {
            let Split { key, sibling } = self.split(current);
            let Some(parent) = self.nodes.get(current).parent else {
                self.promote_root(key, sibling);
                break;
            };

            self.nodes.get_mut(sibling).parent = Some(parent);
            let inner = self.nodes.get_mut(parent).as_inner_mut();
            inner.add_link_after(current, Link::new(key, sibling));
            if self.subtree_min(sibling).is_none() {
                let index = self
                    .nodes
                    .get(parent)
                    .as_inner()
                    .position_of(sibling)
                    .expect("`RawTree::insert()` - split sibling has no link in its parent");
                self.refresh_link(parent, index);
            }
            current = parent;
        }
    }

    /// Moves the upper half of `id` into a new right sibling and splices that sibling into
    /// the level chain. The caller links the sibling into a parent.
    fn split(&mut self, id: NodeId) -> Split {
        let node = self.nodes.get_mut(id);
        let (key, body) = match &mut node.body {
            Body::Leaf(leaf) => {
                let (key, right) = leaf.split_off();
                (key, Body::Leaf(right))
            }
            Body::Inner(inner) => {
                let (key, right) = inner.split_off();
                (key, Body::Inner(right))
            }
        };
        let is_leaf = node.is_leaf();
        let old_next = node.next;

        let mut right = Node::new(body);
        right.prev = Some(id);
        right.next = old_next;
        let sibling = self.nodes.alloc(right);

        self.nodes.get_mut(id).next = Some(sibling);
        if let Some(old_next) = old_next {
            self.nodes.get_mut(old_next).prev = Some(sibling);
        }
        // The new heir may lead to an emptied subtree; route by the smallest stored key.
        let key = if is_leaf {
            key
        } else {
            self.adopt_children(sibling);
            self.subtree_min(sibling).unwrap_or(key)
        };

        tracing::trace!(
            target: "heirloom_index::split",
            node = ?id,
            sibling = ?sibling,
            key,
            leaf = is_leaf,
            "split node"
        );
        Split { key, sibling }
    }

    /// Points every child of the inner node `id` back at it.
    pub(super) fn adopt_children(&mut self, id: NodeId) {
        let children: SmallVec<[NodeId; 32]> = self.nodes.get(id).as_inner().children().collect();
        for child in children {
            self.nodes.get_mut(child).parent = Some(id);
        }
    }

    /// Grows the tree by one level: the old root becomes the heir of a new inner root that
    /// also links to `sibling`.
    fn promote_root(&mut self, key: Key, sibling: NodeId) {
        let old_root = self.root;
        let mut inner = InnerNode::new(old_root);
        inner.add_link(Link::new(key, sibling));
        let root = self.nodes.alloc(Node::new(Body::Inner(inner)));

        self.nodes.get_mut(old_root).parent = Some(root);
        self.nodes.get_mut(sibling).parent = Some(root);
        self.root = root;

        tracing::debug!(
            target: "heirloom_index::root",
            root = ?root,
            key,
            height = self.height(),
            "promoted new root"
        );
    }
}
