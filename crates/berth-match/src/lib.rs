//! Adaptive retrieval and ranking engine behind a swipe-driven boat
//! discovery feed. The `feed` module holds the engine itself; `catalog`
//! holds the listing backends; `config`, `telemetry` and `error` carry the
//! service plumbing.

pub mod catalog;
pub mod config;
pub mod error;
pub mod feed;
pub mod telemetry;
