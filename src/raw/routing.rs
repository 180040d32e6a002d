//! Routing-key maintenance and lookups that stay correct around emptied subtrees.

use alloc::vec::Vec;

use super::handle::NodeId;
use super::node::{Body, Link};
use super::raw_tree::RawTree;
use crate::record::Key;

impl RawTree {
    /// Leaf holding the records with `key`, or `None` when no leaf holds any.
    ///
    /// Routing leads to the rightmost leaf that may hold `key`. If that leaf has none, a
    /// run of `key` can still close the nearest non-empty leaf to its left: a link over an
    /// emptied subtree routes its key past that run until the key is raised.
    pub(crate) fn leaf_holding(&self, key: Key) -> Option<NodeId> {
        let routed = self.find_leaf(key);
        if self.nodes.get(routed).as_leaf().search(key).is_some() {
            return Some(routed);
        }

        let mut current = self.nodes.get(routed).prev;
        while let Some(id) = current {
            let node = self.nodes.get(id);
            if let Some(last) = node.as_leaf().last_key() {
                return (last == key).then_some(id);
            }
            current = node.prev;
        }
        None
    }

    /// Refreshes every link key on the path from `from` up to the root after the smallest
    /// key below `from` changed.
    ///
    /// Heirs carry no key and are skipped. Subtrees emptied by earlier removals contribute
    /// no minimum, which can carry the change past the first link on the way up.
    pub(super) fn repair_routing_keys(&mut self, from: NodeId) {
        let mut child = from;
        let mut ancestor = self.nodes.get(from).parent;
        while let Some(id) = ancestor {
            if let Some(index) = self.nodes.get(id).as_inner().position_of(child) {
                self.refresh_link(id, index);
            }
            child = id;
            ancestor = self.nodes.get(id).parent;
        }
    }

    /// Brings the key of link `index` in `parent` in line with the subtree it leads to.
    ///
    /// A subtree holding records is keyed by its smallest key. An emptied subtree is keyed
    /// by the first key stored after it, capped by the next link of `parent`, and every
    /// link inside it takes the same key. The key of an emptied subtree never drops.
    pub(super) fn refresh_link(&mut self, parent: NodeId, index: usize) {
        let links = self.nodes.get(parent).as_inner().links();
        let Link { key: stale, child } = links[index];
        let upper = links.get(index + 1).map(|link| link.key);

        if let Some(minimum) = self.subtree_min(child) {
            if minimum != stale {
                self.nodes.get_mut(parent).as_inner_mut().set_key_at(index, minimum);
                tracing::trace!(
                    target: "heirloom_index::routing",
                    node = ?parent,
                    child = ?child,
                    stale,
                    key = minimum,
                    "repaired routing key"
                );
            }
            return;
        }

        let Some(next) = self.key_after(child) else {
            return;
        };
        let key = upper.map_or(next, |upper| next.min(upper));
        if key > stale {
            self.nodes.get_mut(parent).as_inner_mut().set_key_at(index, key);
            self.flatten_routing_keys(child, key);
            tracing::trace!(
                target: "heirloom_index::routing",
                node = ?parent,
                child = ?child,
                stale,
                key,
                "raised routing key over emptied subtree"
            );
        }
    }

    /// First key stored to the right of the subtree `id`, following the leaf chain.
    fn key_after(&self, id: NodeId) -> Option<Key> {
        let mut last = id;
        while let Body::Inner(inner) = &self.nodes.get(last).body {
            last = inner.links().last().map_or(inner.heir(), |link| link.child);
        }

        let mut current = self.nodes.get(last).next;
        while let Some(leaf) = current {
            let node = self.nodes.get(leaf);
            if let Some(key) = node.as_leaf().first_key() {
                return Some(key);
            }
            current = node.next;
        }
        None
    }

    /// Sets every link key inside the record-less subtree `id` to `key`.
    fn flatten_routing_keys(&mut self, id: NodeId, key: Key) {
        let mut stack = Vec::from([id]);
        while let Some(current) = stack.pop() {
            if let Body::Inner(inner) = &mut self.nodes.get_mut(current).body {
                for index in 0..inner.len() {
                    inner.set_key_at(index, key);
                }
                stack.extend(inner.children());
            }
        }
    }
}
