//! Corruption core: header/body split, random byte mutation, recombination

pub mod engine;
mod split;

pub use engine::{corrupt, CorruptionReport, GuardMode, DEFAULT_CORRUPTION_COUNT};
pub use split::HeaderBodySplit;
