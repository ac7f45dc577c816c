//! Replay queue built from a cassette

mod queue;

pub use queue::ReplayQueue;
