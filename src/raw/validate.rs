//! Structural checks run on demand. Mutations never call these.

use alloc::vec::Vec;

use super::handle::NodeId;
use super::node::Body;
use super::raw_tree::RawTree;
use crate::error::{Error, Result};
use crate::record::Key;

impl RawTree {
    /// Smallest key stored anywhere below `id`, skipping empty leaves.
    pub(crate) fn subtree_min(&self, id: NodeId) -> Option<Key> {
        match &self.nodes.get(id).body {
            Body::Leaf(leaf) => leaf.first_key(),
            Body::Inner(inner) => inner.children().find_map(|child| self.subtree_min(child)),
        }
    }

    /// Checks every structural invariant and reports the first violation found.
    ///
    /// Under-sized nodes are not reported: a node whose neighbours could not take it in
    /// legitimately stays below the minimum.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(parent) = self.nodes.get(self.root).parent {
            return Err(Error::RootHasParent { root: self.root, parent });
        }

        let levels = self.check_nodes()?;
        for level in &levels {
            self.check_chain(level)?;
        }
        self.check_leaf_order()
    }

    /// Walks the tree depth-first, left to right, checking each node locally. Returns the
    /// nodes of every level in left-to-right order.
    fn check_nodes(&self) -> Result<Vec<Vec<NodeId>>> {
        let max = self.thresholds.max();
        let mut levels: Vec<Vec<NodeId>> = Vec::new();
        let mut leaf_depth = None;
        let mut stack = Vec::from([(self.root, 0_usize)]);

        while let Some((id, depth)) = stack.pop() {
            if levels.len() == depth {
                levels.push(Vec::new());
            }
            levels[depth].push(id);

            let node = self.nodes.get(id);
            if node.len() > max {
                return Err(Error::Overfull {
                    node: id,
                    len: node.len(),
                    max,
                });
            }

            match &node.body {
                Body::Leaf(leaf) => {
                    if leaf.records().windows(2).any(|pair| pair[0].key() > pair[1].key()) {
                        return Err(Error::UnsortedRecords { node: id });
                    }
                    let expected = *leaf_depth.get_or_insert(depth);
                    if depth != expected {
                        return Err(Error::UnevenDepth { node: id, depth, expected });
                    }
                }
                Body::Inner(inner) => {
                    if inner.links().windows(2).any(|pair| pair[0].key > pair[1].key) {
                        return Err(Error::UnsortedLinks { node: id });
                    }
                    for child in inner.children() {
                        if self.nodes.get(child).parent != Some(id) {
                            return Err(Error::ParentMismatch { node: child, parent: id });
                        }
                    }
                    for link in inner.links() {
                        match self.subtree_min(link.child) {
                            Some(minimum) if minimum != link.key => {
                                return Err(Error::StaleRoutingKey {
                                    child: link.child,
                                    key: link.key,
                                    minimum,
                                });
                            }
                            _ => {}
                        }
                    }
                    let children: Vec<NodeId> = inner.children().collect();
                    stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
                }
            }
        }
        Ok(levels)
    }

    /// The chain of one level must visit exactly `level`, in order, and end on both sides.
    fn check_chain(&self, level: &[NodeId]) -> Result<()> {
        for (index, &id) in level.iter().enumerate() {
            let node = self.nodes.get(id);
            let prev = index.checked_sub(1).map(|i| level[i]);
            let next = level.get(index + 1).copied();
            if node.prev != prev || node.next != next {
                return Err(Error::BrokenChain { node: id });
            }
        }
        Ok(())
    }

    /// Keys must never decrease along the leaf chain, and the leaves must hold `len` records.
    fn check_leaf_order(&self) -> Result<()> {
        let mut previous: Option<Key> = None;
        let mut counted = 0;
        let mut current = Some(self.first_leaf());
        while let Some(id) = current {
            let node = self.nodes.get(id);
            for record in node.as_leaf().records() {
                if let Some(previous) = previous.filter(|&p| p > record.key()) {
                    return Err(Error::OutOfOrder {
                        previous,
                        key: record.key(),
                    });
                }
                previous = Some(record.key());
                counted += 1;
            }
            current = node.next;
        }

        if counted == self.len {
            Ok(())
        } else {
            Err(Error::LengthMismatch {
                expected: self.len,
                counted,
            })
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::thresholds::Thresholds;

    /// Four leaves under one root: {0,1} {2,3} {4,5} {6,7,8}.
    fn sample() -> RawTree {
        let mut tree = RawTree::new(Thresholds::new(4, 2).unwrap());
        for key in 0..9 {
            tree.insert(Record::new(key, key));
        }
        tree
    }

    fn second_leaf(tree: &RawTree) -> NodeId {
        tree.node(tree.root()).as_inner().links()[0].child
    }

    #[test]
    fn healthy_trees_pass() {
        assert_eq!(sample().validate(), Ok(()));
        assert_eq!(RawTree::new(Thresholds::default()).validate(), Ok(()));
    }

    #[test]
    fn subtree_min_skips_empty_leaves() {
        let mut tree = sample();
        let root = tree.root();
        assert_eq!(tree.subtree_min(root), Some(0));

        let heir = tree.node(root).as_inner().heir();
        tree.nodes.get_mut(heir).as_leaf_mut().take_records();
        assert_eq!(tree.subtree_min(root), Some(2));
    }

    #[test]
    fn detects_stale_routing_key() {
        let mut tree = sample();
        let root = tree.root();
        tree.nodes.get_mut(root).as_inner_mut().set_key_at(0, 1);
        assert_eq!(
            tree.validate(),
            Err(Error::StaleRoutingKey {
                child: second_leaf(&tree),
                key: 1,
                minimum: 2,
            })
        );
    }

    #[test]
    fn detects_wrong_parent() {
        let mut tree = sample();
        let leaf = second_leaf(&tree);
        let stray = tree.node(tree.root()).as_inner().heir();
        tree.nodes.get_mut(leaf).parent = Some(stray);
        assert_eq!(
            tree.validate(),
            Err(Error::ParentMismatch {
                node: leaf,
                parent: tree.root(),
            })
        );
    }

    #[test]
    fn detects_broken_chain() {
        let mut tree = sample();
        let leaf = second_leaf(&tree);
        tree.nodes.get_mut(leaf).prev = None;
        assert_eq!(tree.validate(), Err(Error::BrokenChain { node: leaf }));
    }

    #[test]
    fn detects_unsorted_records_and_length_drift() {
        let mut tree = sample();
        let leaf = second_leaf(&tree);
        tree.len += 1;
        assert_eq!(
            tree.validate(),
            Err(Error::LengthMismatch {
                expected: 10,
                counted: 9,
            })
        );

        tree.len -= 1;
        // Keep the first key intact so the parent's routing key still matches.
        let mut records = tree.nodes.get_mut(leaf).as_leaf_mut().take_records();
        records.push(Record::new(1, 1));
        tree.nodes.get_mut(leaf).as_leaf_mut().extend_back(records);
        tree.len += 1;
        assert_eq!(tree.validate(), Err(Error::UnsortedRecords { node: leaf }));
    }

    #[test]
    fn detects_overfull_node() {
        let mut tree = sample();
        let leaf = second_leaf(&tree);
        for value in 0..3 {
            tree.nodes.get_mut(leaf).as_leaf_mut().add_record(Record::new(3, value));
        }
        tree.len += 3;
        assert_eq!(
            tree.validate(),
            Err(Error::Overfull {
                node: leaf,
                len: 5,
                max: 4,
            })
        );
    }
}
