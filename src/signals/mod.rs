//! Signal evaluation and candidate alerts.

pub mod alerts;
pub mod book;
pub mod engine;
pub mod scoring;

pub use book::{AlertBacklog, DatedBook, DatedPair, DecisionBook, SnapshotBook};
pub use engine::{Evaluation, SignalEngine};
