//! Volume space lookup.
//!
//! `/proc` has no notion of free space, so disk usage comes from a
//! [`DiskProbe`]. On Unix the probe calls `statvfs(2)` on the path, which
//! separates free blocks from blocks available to unprivileged users. Other
//! platforms ask `sysinfo` for the mounted volumes and pick the one whose
//! mount point is the longest prefix of the path; there free and available
//! space are the same figure.

use std::path::{Path, PathBuf};

use sysinfo::Disks;
use tracing::trace;

use super::procfs::CollectError;
use super::source::DiskUsage;

/// Looks up space on the volume holding a path.
pub trait DiskProbe: Send {
    fn usage(&mut self, path: &Path) -> Result<DiskUsage, CollectError>;
}

/// One mounted volume.
#[derive(Debug, Clone, PartialEq)]
pub struct MountSpace {
    pub mount_point: PathBuf,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

/// Picks the volume whose mount point is the longest prefix of `path`.
pub fn select_mount<'a>(mounts: &'a [MountSpace], path: &Path) -> Option<&'a MountSpace> {
    mounts
        .iter()
        .filter(|m| path.starts_with(&m.mount_point))
        .max_by_key(|m| m.mount_point.components().count())
}

/// The probe used for the root volume on this platform.
#[cfg(unix)]
pub type PlatformDisk = StatvfsDisk;
#[cfg(not(unix))]
pub type PlatformDisk = SysinfoDisks;

/// Raw `statvfs` block counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockCounts {
    /// Fragment size; every count below is in these units.
    pub fragment_size: u64,
    pub blocks: u64,
    pub free: u64,
    pub available: u64,
}

impl BlockCounts {
    pub fn usage(&self) -> DiskUsage {
        DiskUsage::from_space(
            self.blocks.saturating_mul(self.fragment_size),
            self.free.saturating_mul(self.fragment_size),
            self.available.saturating_mul(self.fragment_size),
        )
    }
}

/// [`DiskProbe`] backed by `statvfs(2)`.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct StatvfsDisk;

#[cfg(unix)]
impl StatvfsDisk {
    pub fn new() -> Self {
        Self
    }

    pub fn block_counts(path: &Path) -> Result<BlockCounts, CollectError> {
        let st = rustix::fs::statvfs(path).map_err(std::io::Error::from)?;
        let fragment_size = if st.f_frsize == 0 {
            st.f_bsize
        } else {
            st.f_frsize
        };
        Ok(BlockCounts {
            fragment_size,
            blocks: st.f_blocks,
            free: st.f_bfree,
            available: st.f_bavail,
        })
    }
}

#[cfg(unix)]
impl DiskProbe for StatvfsDisk {
    fn usage(&mut self, path: &Path) -> Result<DiskUsage, CollectError> {
        let counts = Self::block_counts(path)?;
        trace!("statvfs {}: {:?}", path.display(), counts);
        Ok(counts.usage())
    }
}

/// [`DiskProbe`] backed by `sysinfo::Disks`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoDisks;

impl SysinfoDisks {
    pub fn new() -> Self {
        Self
    }
}

impl DiskProbe for SysinfoDisks {
    fn usage(&mut self, path: &Path) -> Result<DiskUsage, CollectError> {
        // Mounts can change between cycles, so the list is rebuilt every time.
        let disks = Disks::new_with_refreshed_list();
        let mounts: Vec<MountSpace> = disks
            .list()
            .iter()
            .map(|d| MountSpace {
                mount_point: d.mount_point().to_path_buf(),
                total_bytes: d.total_space(),
                available_bytes: d.available_space(),
            })
            .collect();
        trace!("{} mounted volumes", mounts.len());

        let mount = select_mount(&mounts, path).ok_or_else(|| {
            CollectError::Unsupported(format!("no mounted volume holds {}", path.display()))
        })?;

        Ok(DiskUsage::from_space(
            mount.total_bytes,
            mount.available_bytes,
            mount.available_bytes,
        ))
    }
}
