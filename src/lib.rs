//! gouge - menu-bar system metrics.
//!
//! This library provides everything behind the `gouge` binary:
//! - `collector` - OS metric queries (`/proc`, mounted volumes) behind the `MetricsSource` seam
//! - `sampler` - one sampling cycle: query, derive network rate, format
//! - `poll` - the 2-second ticker and the quit wait
//! - `shell` - the menu the strings are pushed into
//! - `icon`, `logging`, `fmt` - startup plumbing and formatting helpers

pub mod collector;
pub mod fmt;
pub mod icon;
pub mod logging;
pub mod poll;
pub mod sampler;
pub mod shell;
