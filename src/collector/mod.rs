//! Host metric collection.
//!
//! Every query the sampler needs goes through the [`MetricsSource`] trait.
//! The production implementation, [`HostSource`], reads the Linux `/proc`
//! filesystem through the [`FileSystem`] trait and asks a [`DiskProbe`] for
//! volume space, so both halves can be mocked in tests.
//!
//! Hosts without `/proc` use [`SysinfoSource`], which asks the platform APIs
//! wrapped by `sysinfo` instead.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                 HostSource (MetricsSource)            │
//! │  ┌──────────────────────────┐   ┌──────────────────┐  │
//! │  │  /proc/stat              │   │    DiskProbe     │  │
//! │  │  /proc/meminfo           │   │  (trait)         │  │
//! │  │  /proc/uptime            │   └────────┬─────────┘  │
//! │  │  /proc/net/dev           │            │            │
//! │  └────────────┬─────────────┘            │            │
//! │        ┌──────▼──────┐                   │            │
//! │        │  FileSystem │ (trait)           │            │
//! │        └──────┬──────┘                   │            │
//! └───────────────┼──────────────────────────┼────────────┘
//!          ┌──────┴──────┐           ┌───────┴────────┐
//!          │ RealFs      │           │ StatvfsDisk    │
//!          │ MockFs      │           │ SysinfoDisks   │
//!          │             │           │ FixedDisk      │
//!          └─────────────┘           └────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use gouge::collector::mock::{FixedDisk, MockFs};
//! use gouge::collector::{HostSource, MetricsSource};
//!
//! let fs = MockFs::typical_system();
//! let mut source = HostSource::new(fs, "/proc", FixedDisk::new(100, 25));
//! let mem = source.virtual_memory().unwrap();
//! assert!(mem.used_percent > 0.0);
//! ```

pub mod disk;
pub mod host;
pub mod mock;
pub mod procfs;
pub mod source;
pub mod sysinfo_source;
pub mod traits;

#[cfg(unix)]
pub use disk::StatvfsDisk;
pub use disk::{DiskProbe, PlatformDisk, SysinfoDisks};
pub use host::{CpuTimes, HostSource};
pub use mock::MockFs;
pub use procfs::CollectError;
pub use source::{DiskUsage, MemoryUsage, MetricError, MetricKind, MetricsSource, NetCounters};
pub use sysinfo_source::SysinfoSource;
pub use traits::{FileSystem, RealFs};
