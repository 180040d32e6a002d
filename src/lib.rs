//! An in-memory B+ tree index over integer keys.
//!
//! [`BPlusTree`] maps `i64` keys to `i64` values. All records live in the leaves, which
//! are chained left to right, while inner nodes only route lookups. Nodes split when they
//! grow past an upper occupancy bound and merge into a neighbour when they shrink below a
//! lower one, keeping every leaf at the same depth.
//!
//! # Example
//!
//! ```
//! use heirloom_index::{BPlusTree, Record};
//!
//! let mut index = BPlusTree::new();
//! for key in 0..1000 {
//!     index.insert(Record::new(key, key * 2));
//! }
//!
//! assert_eq!(index.search(21).map(Record::value), Some(42));
//! assert!(index.remove(21));
//! assert_eq!(index.search(21), None);
//!
//! // Records come back in ascending key order.
//! let keys: Vec<i64> = index.iter().map(Record::key).take(3).collect();
//! assert_eq!(keys, [0, 1, 2]);
//! assert!(index.validate().is_ok());
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Duplicate keys** - Equal keys are kept in insertion order
//! - **Tunable fan-out** - Occupancy bounds are set per tree through [`Thresholds`]
//! - **Inspectable** - [`BPlusTree::root`] exposes a read-only view of every node and
//!   [`BPlusTree::validate`] checks the structural invariants on demand
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to their parent and to their neighbours on the same
//! level by [`NodeId`]. Each inner node owns one "heir" child for keys below its first
//! routing key, plus one link per further child.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;
mod record;
mod thresholds;

pub mod bplus_tree;

pub use bplus_tree::{BPlusTree, Iter, NodeRef};
pub use error::{Error, Result};
pub use raw::NodeId;
pub use record::{Key, Record, Value};
pub use thresholds::{MAX_THRESHOLD, MIN_THRESHOLD, Thresholds};
