use core::iter;

use smallvec::SmallVec;

use super::handle::NodeId;
use crate::record::{Key, Record};
use crate::thresholds::MAX_THRESHOLD;

// One extra slot holds the overflowing entry until the node splits.
const INLINE: usize = MAX_THRESHOLD + 1;

pub(crate) type Records = SmallVec<[Record; INLINE]>;
pub(crate) type Links = SmallVec<[Link; INLINE]>;

/// Routing entry of an inner node: `child` holds every key in `[key, next link's key)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Link {
    pub(crate) key: Key,
    pub(crate) child: NodeId,
}

impl Link {
    pub(crate) const fn new(key: Key, child: NodeId) -> Self {
        Self { key, child }
    }
}

/// A tree node: its place in the tree plus a leaf or inner payload.
///
/// `parent`, `prev` and `next` are back-references only. Ownership runs strictly
/// downwards through heirs and links; the horizontal chain links every node of one
/// level, across parent boundaries.
#[derive(Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) body: Body,
}

#[allow(clippy::large_enum_variant)]
#[derive(Clone)]
pub(crate) enum Body {
    Leaf(LeafNode),
    Inner(InnerNode),
}

impl Node {
    pub(crate) const fn new(body: Body) -> Self {
        Self {
            parent: None,
            prev: None,
            next: None,
            body,
        }
    }

    /// Creates a detached, empty leaf.
    pub(crate) fn new_leaf() -> Self {
        Self::new(Body::Leaf(LeafNode::new()))
    }

    pub(crate) const fn is_leaf(&self) -> bool {
        matches!(self.body, Body::Leaf(_))
    }

    /// Occupancy: records of a leaf, links of an inner node.
    pub(crate) fn len(&self) -> usize {
        match &self.body {
            Body::Leaf(leaf) => leaf.len(),
            Body::Inner(inner) => inner.len(),
        }
    }

    pub(crate) fn key_at(&self, index: usize) -> Key {
        match &self.body {
            Body::Leaf(leaf) => leaf.key_at(index),
            Body::Inner(inner) => inner.key_at(index),
        }
    }

    /// Returns the leaf payload, panicking if this is an inner node.
    pub(crate) fn as_leaf(&self) -> &LeafNode {
        match &self.body {
            Body::Leaf(leaf) => leaf,
            Body::Inner(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf payload mutably, panicking if this is an inner node.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode {
        match &mut self.body {
            Body::Leaf(leaf) => leaf,
            Body::Inner(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the inner payload, panicking if this is a leaf.
    pub(crate) fn as_inner(&self) -> &InnerNode {
        match &self.body {
            Body::Inner(inner) => inner,
            Body::Leaf(_) => panic!("expected inner node"),
        }
    }

    /// Returns the inner payload mutably, panicking if this is a leaf.
    pub(crate) fn as_inner_mut(&mut self) -> &mut InnerNode {
        match &mut self.body {
            Body::Inner(inner) => inner,
            Body::Leaf(_) => panic!("expected inner node"),
        }
    }
}

/// Terminal node: records sorted by key, equal keys in insertion order.
#[derive(Clone, Default)]
pub(crate) struct LeafNode {
    records: Records,
}

impl LeafNode {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub(crate) fn key_at(&self, index: usize) -> Key {
        self.records[index].key()
    }

    pub(crate) fn first_key(&self) -> Option<Key> {
        self.records.first().map(Record::key)
    }

    pub(crate) fn last_key(&self) -> Option<Key> {
        self.records.last().map(Record::key)
    }

    pub(crate) fn records(&self) -> &[Record] {
        &self.records
    }

    /// Inserts after every record with an equal key and returns the slot it landed in.
    pub(crate) fn add_record(&mut self, record: Record) -> usize {
        let index = self.records.partition_point(|r| r.key() <= record.key());
        self.records.insert(index, record);
        index
    }

    /// Removes the run of records matching `key` and returns how many went.
    pub(crate) fn remove_record(&mut self, key: Key) -> usize {
        let start = self.records.partition_point(|r| r.key() < key);
        let end = self.records.partition_point(|r| r.key() <= key);
        self.records.drain(start..end);
        end - start
    }

    /// Returns the first record carrying `key`.
    pub(crate) fn search(&self, key: Key) -> Option<&Record> {
        let index = self.records.partition_point(|r| r.key() < key);
        self.records.get(index).filter(|r| r.key() == key)
    }

    /// Moves the upper half `[len / 2, len)` into a new leaf.
    /// Returns the first key of the moved half together with the new leaf.
    pub(crate) fn split_off(&mut self) -> (Key, LeafNode) {
        let mid = self.records.len() / 2;
        let records: Records = self.records.drain(mid..).collect();
        let key = records.first().map(Record::key).expect("`LeafNode::split_off()` - leaf is empty");
        (key, LeafNode { records })
    }

    pub(crate) fn take_records(&mut self) -> Records {
        core::mem::take(&mut self.records)
    }

    /// Appends records that sort after everything already here.
    pub(crate) fn extend_back(&mut self, records: Records) {
        self.records.extend(records);
    }

    /// Prepends records that sort before everything already here.
    pub(crate) fn extend_front(&mut self, records: Records) {
        self.records.insert_many(0, records);
    }
}

/// Routing node: an unkeyed heir for everything below the first link, then links.
#[derive(Clone)]
pub(crate) struct InnerNode {
    heir: NodeId,
    links: Links,
}

impl InnerNode {
    pub(crate) fn new(heir: NodeId) -> Self {
        Self {
            heir,
            links: SmallVec::new(),
        }
    }

    pub(crate) const fn heir(&self) -> NodeId {
        self.heir
    }

    pub(crate) fn set_heir(&mut self, heir: NodeId) {
        self.heir = heir;
    }

    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[inline]
    pub(crate) fn key_at(&self, index: usize) -> Key {
        self.links[index].key
    }

    pub(crate) fn links(&self) -> &[Link] {
        &self.links
    }

    /// Heir first, then every link's child in key order.
    pub(crate) fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        iter::once(self.heir).chain(self.links.iter().map(|link| link.child))
    }

    /// Inserts after every link with an equal key.
    pub(crate) fn add_link(&mut self, link: Link) {
        let index = self.links.partition_point(|l| l.key <= link.key);
        self.links.insert(index, link);
    }

    /// Inserts `link` directly behind the slot holding `left`, which is either the heir
    /// or one of the links. Keeps equal-key links in the same order as their children
    /// appear on the level below.
    pub(crate) fn add_link_after(&mut self, left: NodeId, link: Link) {
        let index = if left == self.heir {
            0
        } else {
            self.position_of(left).map_or_else(|| self.links.partition_point(|l| l.key <= link.key), |i| i + 1)
        };
        debug_assert!(index == 0 || self.links[index - 1].key <= link.key);
        self.links.insert(index, link);
    }

    /// Removes the link at `index`. Links are addressed by slot: several may share a key.
    pub(crate) fn remove_link_at(&mut self, index: usize) -> Link {
        self.links.remove(index)
    }

    pub(crate) fn set_key_at(&mut self, index: usize, key: Key) {
        self.links[index].key = key;
    }

    /// Child responsible for `key`: the heir below the first link, otherwise the child of
    /// the last link whose key is `<= key`.
    pub(crate) fn search(&self, key: Key) -> NodeId {
        match self.links.partition_point(|l| l.key <= key) {
            0 => self.heir,
            index => self.links[index - 1].child,
        }
    }

    /// Index of the link whose child is `child`.
    pub(crate) fn position_of(&self, child: NodeId) -> Option<usize> {
        self.links.iter().position(|l| l.child == child)
    }

    /// Key under which `child` is reached; `None` for the heir or a stranger.
    pub(crate) fn key_of(&self, child: NodeId) -> Option<Key> {
        self.position_of(child).map(|index| self.links[index].key)
    }

    /// Moves links `[len / 2, len)` into a new inner node. The first moved link turns
    /// into the new node's heir and its key is returned as the split key.
    pub(crate) fn split_off(&mut self) -> (Key, InnerNode) {
        let mid = self.links.len() / 2;
        let moved: Links = self.links.drain(mid..).collect();
        let (first, rest) = moved.split_first().expect("`InnerNode::split_off()` - node has no links");
        let right = InnerNode {
            heir: first.child,
            links: rest.iter().copied().collect(),
        };
        (first.key, right)
    }

    /// Empties the node, returning its heir and links.
    pub(crate) fn take_children(&mut self) -> (NodeId, Links) {
        (self.heir, core::mem::take(&mut self.links))
    }

    /// Absorbs the right-hand neighbour: its heir becomes a link keyed `key`, reached
    /// before its remaining links.
    pub(crate) fn extend_back(&mut self, key: Key, heir: NodeId, links: Links) {
        self.links.push(Link::new(key, heir));
        self.links.extend(links);
    }

    /// Absorbs the left-hand neighbour: its heir replaces ours, which becomes a link
    /// keyed `own_key` placed after the neighbour's links.
    pub(crate) fn extend_front(&mut self, own_key: Key, heir: NodeId, links: Links) {
        let demoted = Link::new(own_key, core::mem::replace(&mut self.heir, heir));
        self.links.insert_many(0, links.into_iter().chain(iter::once(demoted)));
    }
}
