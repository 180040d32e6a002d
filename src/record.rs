use core::fmt;

/// Key type of the index. Keys are fixed-width integers.
pub type Key = i64;

/// Value type stored alongside each key.
pub type Value = i64;

/// An immutable key/value pair stored in a leaf.
///
/// Records are ordered by [`key`](Record::key) alone; the value never takes part in a
/// comparison. Several records may share a key, in which case they keep their
/// insertion order within a leaf.
///
/// # Examples
///
/// ```
/// use heirloom_index::Record;
///
/// let record = Record::new(7, 700);
/// assert_eq!(record.key(), 7);
/// assert_eq!(record.value(), 700);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Record {
    key: Key,
    value: Value,
}

impl Record {
    #[must_use]
    pub const fn new(key: Key, value: Value) -> Self {
        Self { key, value }
    }

    #[must_use]
    pub const fn key(&self) -> Key {
        self.key
    }

    #[must_use]
    pub const fn value(&self) -> Value {
        self.value
    }
}

/// Formats as `[key: 7, value: 700]`.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[key: {}, value: {}]", self.key, self.value)
    }
}

impl From<(Key, Value)> for Record {
    fn from((key, value): (Key, Value)) -> Self {
        Self::new(key, value)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_matches_leaf_dump_format() {
        assert_eq!(Record::new(-3, 12).to_string(), "[key: -3, value: 12]");
    }

    #[test]
    fn equality_covers_the_value() {
        assert_eq!(Record::from((1, 2)), Record::new(1, 2));
        assert_ne!(Record::new(1, 2), Record::new(1, 3));
    }
}
