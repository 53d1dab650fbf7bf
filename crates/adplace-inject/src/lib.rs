//! Position-counting injection
//!
//! Every countable stream (paragraphs, archive posts, comments, forum replies,
//! activity entries) shares one rule: a counter starts at 0 for each stream
//! occurrence and is incremented per item; after each increment every assigned
//! ad whose `(after, repeat)` policy fires at that position is emitted, in the
//! order the rules were given.

pub mod counter;
pub mod paragraph;

pub use counter::{CountingRule, StreamCounter};
pub use paragraph::{ParagraphSplicer, SpliceOutcome};
