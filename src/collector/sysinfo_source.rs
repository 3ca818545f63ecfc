//! [`MetricsSource`] backed by `sysinfo`, for hosts without `/proc`.

use std::path::Path;
use std::thread;
use std::time::Duration;

use sysinfo::{MINIMUM_CPU_UPDATE_INTERVAL, Networks, System};

use super::disk::{DiskProbe, PlatformDisk};
use super::procfs::CollectError;
use super::source::{DiskUsage, MemoryUsage, MetricsSource, NetCounters};

/// Host metrics through the platform APIs `sysinfo` wraps.
pub struct SysinfoSource {
    sys: System,
    networks: Networks,
    disks: PlatformDisk,
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self {
            sys: System::new(),
            networks: Networks::new_with_refreshed_list(),
            disks: PlatformDisk::new(),
        }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for SysinfoSource {
    fn cpu_percent(&mut self, window: Duration) -> Result<f64, CollectError> {
        self.sys.refresh_cpu_usage();
        // sysinfo needs a minimum gap between two CPU refreshes.
        thread::sleep(window.max(MINIMUM_CPU_UPDATE_INTERVAL));
        self.sys.refresh_cpu_usage();
        if self.sys.cpus().is_empty() {
            return Err(CollectError::Unsupported("no CPUs reported".into()));
        }
        Ok(self.sys.global_cpu_usage() as f64)
    }

    fn virtual_memory(&mut self) -> Result<MemoryUsage, CollectError> {
        self.sys.refresh_memory();
        MemoryUsage::from_used(
            self.sys.total_memory(),
            self.sys.used_memory(),
            self.sys.available_memory(),
        )
    }

    fn disk_usage(&mut self, path: &Path) -> Result<DiskUsage, CollectError> {
        self.disks.usage(path)
    }

    fn uptime(&mut self) -> Result<u64, CollectError> {
        Ok(System::uptime())
    }

    fn network_counters(&mut self) -> Result<NetCounters, CollectError> {
        self.networks.refresh(true);
        if self.networks.list().is_empty() {
            return Err(CollectError::Unsupported("no network interfaces".into()));
        }
        Ok(self
            .networks
            .list()
            .values()
            .fold(NetCounters::default(), |acc, data| NetCounters {
                bytes_sent: acc.bytes_sent.wrapping_add(data.total_transmitted()),
                bytes_recv: acc.bytes_recv.wrapping_add(data.total_received()),
            }))
    }
}
