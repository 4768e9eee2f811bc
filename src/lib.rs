//! An in-memory ordered map from byte-string keys to values, backed by a
//! probabilistic skip list.
//!
//! ```
//! use skiplist::SkipList;
//!
//! let mut list = SkipList::with_seed(7);
//! for key in [5u8, 3, 8, 1] {
//!     list.put([key], u32::from(key) * 10);
//! }
//! assert_eq!(list.get(&[3]).map(|e| *e.value()), Some(30));
//!
//! let keys: Vec<u8> = list.iter().map(|(key, _)| key[0]).collect();
//! assert_eq!(keys, vec![1, 3, 5, 8]);
//! ```
//!
//! The list is single-threaded and does no locking of its own.

mod config;
mod error;
mod level;
mod skip_list;

pub use config::{DEFAULT_MAX_LEVEL, DEFAULT_PROBABILITY, SkipListConfig};
pub use error::{Error, Result};
pub use level::{LevelGenerator, probability_table};
pub use skip_list::{Element, Entry, Iter, SkipList};
