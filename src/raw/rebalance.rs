//! Removal: sibling joins, parent fix-ups and root collapse.

use super::handle::NodeId;
use super::node::Body;
use super::raw_tree::RawTree;
use crate::record::Key;

/// Which chain neighbour absorbs an under-sized node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Side {
    Prev,
    Next,
}

/// A merge decided on before anything moves.
#[derive(Clone, Copy, Debug)]
struct JoinPlan {
    parent: NodeId,
    side: Side,
    target: NodeId,
}

/// Result of a completed join: `emptied` still sits in the arena and in its parent's
/// heir or link slot until [`RawTree::detach`] runs.
#[derive(Clone, Copy, Debug)]
pub(super) struct Joined {
    pub(super) parent: NodeId,
    pub(super) emptied: NodeId,
    pub(super) target: NodeId,
}

impl RawTree {
    /// Removes every record with `key` from the leaf holding them.
    /// Returns the number of records removed; zero leaves the tree untouched.
    pub(crate) fn remove(&mut self, key: Key) -> usize {
        let Some(leaf) = self.leaf_holding(key) else {
            return 0;
        };
        let node = self.nodes.get_mut(leaf).as_leaf_mut();
        let was_minimum = node.first_key() == Some(key);
        let removed = node.remove_record(key);
        self.len -= removed;

        if was_minimum {
            self.repair_routing_keys(leaf);
        }
        self.rebalance(leaf);
        removed
    }

    /// Joins under-sized nodes into same-parent neighbours, walking towards the root until
    /// a node is large enough or has nobody to join.
    fn rebalance(&mut self, start: NodeId) {
        let mut current = start;
        while self.thresholds.is_too_small(self.nodes.get(current).len()) {
            if self.nodes.get(current).parent.is_none() {
                self.collapse_root();
                return;
            }
            let Some(joined) = self.join_sibling_node(current) else {
                tracing::trace!(
                    target: "heirloom_index::merge",
                    node = ?current,
                    len = self.nodes.get(current).len(),
                    "no eligible sibling, node stays under-sized"
                );
                return;
            };
            self.detach(joined);
            current = joined.parent;
        }
    }

    /// Picks the neighbour that absorbs `id`: the previous one if eligible, else the next.
    ///
    /// A neighbour is eligible when it shares `id`'s parent and the merged node stays within
    /// the maximum. An inner node's heir turns into an extra link on the way, so it counts.
    fn plan_join(&self, id: NodeId) -> Option<JoinPlan> {
        let node = self.nodes.get(id);
        let parent = node.parent?;
        let carried = node.len() + usize::from(!node.is_leaf());
        let fits = |sibling: NodeId| {
            let sibling = self.nodes.get(sibling);
            sibling.parent == Some(parent) && sibling.len() + carried <= self.thresholds.max()
        };

        if let Some(prev) = node.prev.filter(|&prev| fits(prev)) {
            return Some(JoinPlan {
                parent,
                side: Side::Prev,
                target: prev,
            });
        }
        node.next.filter(|&next| fits(next)).map(|next| JoinPlan {
            parent,
            side: Side::Next,
            target: next,
        })
    }

    /// Folds `id` into an eligible chain neighbour and unlinks it from the chain.
    ///
    /// Returns `None` for the root and when no neighbour is eligible. The emptied node is
    /// left for [`RawTree::detach`] to remove from its parent.
    pub(super) fn join_sibling_node(&mut self, id: NodeId) -> Option<Joined> {
        let JoinPlan { parent, side, target } = self.plan_join(id)?;

        let node = self.nodes.get_mut(id);
        let (prev, next) = (node.prev.take(), node.next.take());
        match side {
            Side::Prev => {
                self.nodes.get_mut(target).next = next;
                if let Some(next) = next {
                    self.nodes.get_mut(next).prev = Some(target);
                }
            }
            Side::Next => {
                self.nodes.get_mut(target).prev = prev;
                if let Some(prev) = prev {
                    self.nodes.get_mut(prev).next = Some(target);
                }
            }
        }

        if self.nodes.get(id).is_leaf() {
            let records = self.nodes.get_mut(id).as_leaf_mut().take_records();
            let leaf = self.nodes.get_mut(target).as_leaf_mut();
            match side {
                Side::Prev => leaf.extend_back(records),
                Side::Next => leaf.extend_front(records),
            }
        } else {
            // The parent's key for whichever of the pair sits on the right becomes the
            // explicit link for that node's former heir.
            let right = match side {
                Side::Prev => id,
                Side::Next => target,
            };
            let key = self
                .nodes
                .get(parent)
                .as_inner()
                .key_of(right)
                .expect("`RawTree::join_sibling_node()` - right-hand node has no link in its parent");
            let (heir, links) = self.nodes.get_mut(id).as_inner_mut().take_children();
            let inner = self.nodes.get_mut(target).as_inner_mut();
            match side {
                Side::Prev => inner.extend_back(key, heir, links),
                Side::Next => inner.extend_front(key, heir, links),
            }
            self.adopt_children(target);
        }

        tracing::trace!(
            target: "heirloom_index::merge",
            node = ?id,
            into = ?target,
            into_prev = side == Side::Prev,
            len = self.nodes.get(target).len(),
            "joined sibling"
        );
        Some(Joined {
            parent,
            emptied: id,
            target,
        })
    }

    /// Drops the emptied node from its parent and releases its arena slot.
    pub(super) fn detach(&mut self, joined: Joined) {
        let Joined { parent, emptied, target } = joined;
        let heir = self.nodes.get(parent).as_inner().heir();
        let missing = "`RawTree::detach()` - merged node has no link in its parent";

        if heir == emptied {
            let inner = self.nodes.get_mut(parent).as_inner_mut();
            let index = inner.position_of(target).expect(missing);
            let link = inner.remove_link_at(index);
            inner.set_heir(link.child);
        } else if heir == target {
            let inner = self.nodes.get_mut(parent).as_inner_mut();
            let index = inner.position_of(emptied).expect(missing);
            inner.remove_link_at(index);
        } else {
            let inner = self.nodes.get_mut(parent).as_inner_mut();
            let gone = inner.position_of(emptied).expect(missing);
            let kept = inner.position_of(target).expect(missing);
            if inner.key_at(gone) < inner.key_at(kept) {
                inner.set_key_at(kept, inner.key_at(gone));
            }
            inner.remove_link_at(gone);
            // The target now also holds the emptied node's keys.
            let kept = inner.position_of(target).expect(missing);
            self.refresh_link(parent, kept);
        }

        self.nodes.take(emptied);
    }

    /// Replaces a link-less inner root by its heir until the root routes somewhere.
    fn collapse_root(&mut self) {
        while let Body::Inner(inner) = &self.nodes.get(self.root).body {
            if !inner.is_empty() {
                return;
            }
            let heir = inner.heir();
            self.nodes.take(self.root);
            self.nodes.get_mut(heir).parent = None;
            self.root = heir;

            tracing::debug!(
                target: "heirloom_index::root",
                root = ?heir,
                height = self.height(),
                "collapsed root"
            );
        }
    }
}
