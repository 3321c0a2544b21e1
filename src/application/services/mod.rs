//! Application services
//!
//! Services orchestrate domain logic and use I/O boundary traits for testability.

pub mod episodes;
pub mod explore;
#[cfg(test)]
pub(crate) mod fakes;

pub use episodes::{Episode, EpisodeRunner, EpisodeSummary};
pub use explore::{restore, BestRun, Cell, ExploreSummary, Explorer};
