use alloc::vec::Vec;

use super::handle::NodeId;

/// Slot storage for tree nodes.
///
/// Released slots go on a free list and are handed out again by [`Arena::alloc`], so ids
/// stay small and the backing vector only grows with the peak node count.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    vacant: Vec<NodeId>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Number of live elements.
    pub(crate) const fn len(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    pub(crate) fn alloc(&mut self, element: T) -> NodeId {
        if let Some(id) = self.vacant.pop() {
            self.slots[id.slot()] = Some(element);
            return id;
        }

        assert!(
            self.slots.len() <= NodeId::MAX,
            "`Arena::alloc()` - arena is full ({} slots)",
            NodeId::MAX + 1
        );
        self.slots.push(Some(element));
        NodeId::from_slot(self.slots.len() - 1)
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &T {
        match self.slots.get(id.slot()) {
            Some(Some(element)) => element,
            _ => panic!("`Arena::get()` - {id} is not allocated"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut T {
        match self.slots.get_mut(id.slot()) {
            Some(Some(element)) => element,
            _ => panic!("`Arena::get_mut()` - {id} is not allocated"),
        }
    }

    /// Moves the element out and releases its slot for reuse.
    pub(crate) fn take(&mut self, id: NodeId) -> T {
        let Some(element) = self.slots.get_mut(id.slot()).and_then(Option::take) else {
            panic!("`Arena::take()` - {id} is not allocated");
        };
        self.vacant.push(id);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.vacant.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn released_slots_are_reused() {
        let mut arena = Arena::new();
        let a = arena.alloc('a');
        let b = arena.alloc('b');
        assert_eq!(arena.take(a), 'a');
        assert_eq!(arena.len(), 1);

        let c = arena.alloc('c');
        assert_eq!(c, a);
        assert_eq!(*arena.get(b), 'b');
        assert_eq!(*arena.get(c), 'c');
        assert_eq!(arena.len(), 2);
    }

    #[test]
    #[should_panic(expected = "is not allocated")]
    fn reading_a_released_slot_panics() {
        let mut arena = Arena::new();
        let id = arena.alloc(7_u8);
        arena.take(id);
        let _ = arena.get(id);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut arena = Arena::new();
        for value in 0..10 {
            arena.alloc(value);
        }
        arena.clear();
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.alloc(99).slot(), 0);
    }

    #[derive(Clone, Debug)]
    enum Step {
        Alloc(u32),
        Overwrite(usize, u32),
        Take(usize),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            4 => any::<u32>().prop_map(Step::Alloc),
            2 => (any::<usize>(), any::<u32>()).prop_map(|(pick, value)| Step::Overwrite(pick, value)),
            2 => any::<usize>().prop_map(Step::Take),
        ]
    }

    proptest! {
        #[test]
        fn live_ids_keep_their_values(steps in prop::collection::vec(step(), 0..200)) {
            let mut arena = Arena::new();
            let mut live: Vec<(NodeId, u32)> = Vec::new();

            for step in steps {
                match step {
                    Step::Alloc(value) => live.push((arena.alloc(value), value)),
                    Step::Overwrite(pick, value) if !live.is_empty() => {
                        let index = pick % live.len();
                        *arena.get_mut(live[index].0) = value;
                        live[index].1 = value;
                    }
                    Step::Take(pick) if !live.is_empty() => {
                        let (id, value) = live.swap_remove(pick % live.len());
                        prop_assert_eq!(arena.take(id), value);
                    }
                    Step::Overwrite(..) | Step::Take(_) => {}
                }

                prop_assert_eq!(arena.len(), live.len());
                for &(id, value) in &live {
                    prop_assert_eq!(*arena.get(id), value);
                }
            }
        }
    }
}
