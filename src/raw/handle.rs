use core::fmt;
use core::num::NonZero;

#[cfg(test)]
type RawId = u16;
#[cfg(not(test))]
type RawId = u32;

/// Stable identity of a node inside a tree's arena.
///
/// Parent, sibling and child references are all expressed as `NodeId`s, never as
/// pointers, so detaching a merged node can not leave a dangling reference behind.
/// Ids of released nodes are recycled by later splits.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct NodeId(NonZero<RawId>);

impl NodeId {
    pub(crate) const MAX: usize = (RawId::MAX - 1) as usize;

    #[inline]
    pub(crate) const fn from_slot(slot: usize) -> Self {
        assert!(slot <= Self::MAX, "`NodeId::from_slot()` - `slot` > `NodeId::MAX`!");
        // `slot + 1` is never zero and fits after the bound check above.
        #[allow(clippy::cast_possible_truncation)]
        match NonZero::new((slot + 1) as RawId) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn slot(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.slot())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    // Back-references are stored as `Option<NodeId>`; the niche keeps them one word.
    assert_eq_size!(NodeId, Option<NodeId>);
    assert_eq_size!(NodeId, RawId);

    #[test]
    #[should_panic(expected = "`NodeId::from_slot()` - `slot` > `NodeId::MAX`!")]
    fn slot_out_of_range() {
        let _ = NodeId::from_slot(NodeId::MAX + 1);
    }

    #[test]
    fn displays_slot_number() {
        assert_eq!(NodeId::from_slot(0).to_string(), "#0");
        assert_eq!(NodeId::from_slot(41).to_string(), "#41");
    }

    proptest! {
        #[test]
        fn slot_survives_conversion(slot in 0..=NodeId::MAX) {
            prop_assert_eq!(NodeId::from_slot(slot).slot(), slot);
        }
    }
}
