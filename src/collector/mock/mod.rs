//! Mock implementations for testing.
//!
//! This module provides `MockFs` and pre-built `/proc` scenarios, plus a
//! scripted `StaticSource` and a `FixedDisk` probe, so the sampler and the
//! poll loop can be exercised without a Linux host.

mod filesystem;
mod scenarios;
mod source;

pub use filesystem::MockFs;
pub use source::{FixedDisk, StaticSource};
