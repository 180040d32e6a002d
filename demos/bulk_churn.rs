//! Bulk-loads an index, deletes every fifth key from the top down and reports what is gone.
//!
//! Run with `cargo run --example bulk_churn`, optionally followed by the number of keys
//! (default 1000) and `--dump` to print every leaf afterwards.

use std::env;
use std::process::ExitCode;

use heirloom_index::{BPlusTree, Record};

fn main() -> ExitCode {
    let mut count: i64 = 1_000;
    let mut dump = false;
    for arg in env::args().skip(1) {
        if arg == "--dump" {
            dump = true;
        } else if let Ok(parsed) = arg.parse() {
            count = parsed;
        } else {
            eprintln!("usage: bulk_churn [COUNT] [--dump]");
            return ExitCode::FAILURE;
        }
    }

    let mut index = BPlusTree::new();
    for key in 0..count {
        index.insert(Record::new(key, key));
    }

    for key in (0..count).rev().filter(|key| key % 5 == 0) {
        println!("deleting: {key}");
        index.remove(key);
    }

    for key in (0..count).filter(|&key| index.search(key).is_none()) {
        println!("key: {key} deleted");
    }

    if dump {
        print!("{index}");
    }

    if let Err(err) = index.validate() {
        eprintln!("index is inconsistent: {err}");
        return ExitCode::FAILURE;
    }
    println!("{} records in {} nodes, height {}", index.len(), index.node_count(), index.height());
    ExitCode::SUCCESS
}
