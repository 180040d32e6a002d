mod arena;
mod handle;
mod node;
mod raw_tree;
mod rebalance;
mod routing;
mod validate;

pub use handle::NodeId;
pub(crate) use node::{Body, Link, Node};
pub(crate) use raw_tree::RawTree;
