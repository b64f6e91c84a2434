//! A one-dimensional cellular automaton on an unbounded tape.
//!
//! Each cell's next state depends on the five cells centered on it. The tape
//! is a doubly linked sequence that grows lazily in both directions, as far as
//! true states reach, and is trimmed back after every generation.

pub mod error;
pub mod export;
pub mod literal;
mod node;
pub mod rule;
pub mod universe;

pub use error::{Error, Result};
pub use rule::{Neighborhood, RuleTable};
pub use universe::Universe;
