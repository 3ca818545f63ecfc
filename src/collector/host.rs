//! [`MetricsSource`] over `/proc` plus a [`DiskProbe`].

use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::trace;

use super::disk::DiskProbe;
use super::procfs::CollectError;
use super::procfs::parser::{CpuStat, parse_meminfo, parse_net_dev, parse_stat_cpus, parse_uptime};
use super::source::{DiskUsage, MemoryUsage, MetricsSource, NetCounters};
use super::traits::FileSystem;

/// Aggregate CPU time split into idle and total ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    /// idle + iowait
    pub idle: u64,
    /// Every non-guest column; guest time is already counted in user/nice.
    pub total: u64,
}

impl CpuTimes {
    pub fn from_stat(stat: &CpuStat) -> Self {
        let idle = stat.idle + stat.iowait;
        let total = stat.user
            + stat.nice
            + stat.system
            + idle
            + stat.irq
            + stat.softirq
            + stat.steal;
        Self { idle, total }
    }

    /// Busy percentage between `prev` and `self`. Zero when no ticks elapsed.
    pub fn busy_percent_since(&self, prev: &CpuTimes) -> f64 {
        let total_delta = self.total.saturating_sub(prev.total);
        if total_delta == 0 {
            return 0.0;
        }
        let idle_delta = self.idle.saturating_sub(prev.idle).min(total_delta);
        (total_delta - idle_delta) as f64 / total_delta as f64 * 100.0
    }
}

/// Host metrics read from the proc filesystem.
pub struct HostSource<F: FileSystem, D: DiskProbe> {
    fs: F,
    proc_path: String,
    disks: D,
}

impl<F: FileSystem, D: DiskProbe> HostSource<F, D> {
    /// Creates a new host source.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    /// * `disks` - Volume space lookup
    pub fn new(fs: F, proc_path: impl Into<String>, disks: D) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            disks,
        }
    }

    fn read_proc(&self, name: &str) -> Result<String, CollectError> {
        let path = format!("{}/{}", self.proc_path, name);
        Ok(self.fs.read_to_string(Path::new(&path))?)
    }

    /// Reads the aggregate `cpu` line of `/proc/stat`.
    pub fn read_cpu_times(&self) -> Result<CpuTimes, CollectError> {
        let content = self.read_proc("stat")?;
        let cpus = parse_stat_cpus(&content)?;
        let aggregate = cpus
            .iter()
            .find(|c| c.cpu_id.is_none())
            .ok_or_else(|| CollectError::Parse("aggregate cpu line missing".into()))?;
        Ok(CpuTimes::from_stat(aggregate))
    }
}

impl<F: FileSystem, D: DiskProbe> MetricsSource for HostSource<F, D> {
    fn cpu_percent(&mut self, window: Duration) -> Result<f64, CollectError> {
        let before = self.read_cpu_times()?;
        if !window.is_zero() {
            thread::sleep(window);
        }
        let after = self.read_cpu_times()?;
        let pct = after.busy_percent_since(&before);
        trace!(
            "cpu: {} of {} ticks idle, {:.2}%",
            after.idle.saturating_sub(before.idle),
            after.total.saturating_sub(before.total),
            pct
        );
        Ok(pct)
    }

    fn virtual_memory(&mut self) -> Result<MemoryUsage, CollectError> {
        let content = self.read_proc("meminfo")?;
        let info = parse_meminfo(&content)?;
        let cache_kb = info.buffers + info.cached + info.s_reclaimable;
        // Page cache and reclaimable slab count as free.
        let used_kb = info
            .mem_total
            .saturating_sub(info.mem_free)
            .saturating_sub(cache_kb);
        let available_kb = info.mem_available.unwrap_or(info.mem_free + cache_kb);
        MemoryUsage::from_used(
            info.mem_total * 1024,
            used_kb * 1024,
            available_kb * 1024,
        )
    }

    fn disk_usage(&mut self, path: &Path) -> Result<DiskUsage, CollectError> {
        self.disks.usage(path)
    }

    fn uptime(&mut self) -> Result<u64, CollectError> {
        let content = self.read_proc("uptime")?;
        Ok(parse_uptime(&content)?.floor() as u64)
    }

    fn network_counters(&mut self) -> Result<NetCounters, CollectError> {
        let content = self.read_proc("net/dev")?;
        let devices = parse_net_dev(&content)?;
        if devices.is_empty() {
            return Err(CollectError::Parse("no interfaces in /proc/net/dev".into()));
        }
        Ok(devices.iter().fold(NetCounters::default(), |acc, d| NetCounters {
            bytes_sent: acc.bytes_sent.wrapping_add(d.tx_bytes),
            bytes_recv: acc.bytes_recv.wrapping_add(d.rx_bytes),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{FixedDisk, MockFs};

    fn source(fs: MockFs) -> HostSource<MockFs, FixedDisk> {
        HostSource::new(fs, "/proc", FixedDisk::new(1000, 250))
    }

    #[test]
    fn test_cpu_times_from_stat() {
        let stat = CpuStat {
            user: 10000,
            nice: 500,
            system: 3000,
            idle: 80000,
            iowait: 1000,
            irq: 200,
            softirq: 100,
            ..CpuStat::default()
        };
        let times = CpuTimes::from_stat(&stat);
        assert_eq!(times.idle, 81000);
        assert_eq!(times.total, 94800);
    }

    #[test]
    fn test_busy_percent_since() {
        let prev = CpuTimes {
            idle: 1000,
            total: 2000,
        };
        let cur = CpuTimes {
            idle: 1075,
            total: 2100,
        };
        assert!((cur.busy_percent_since(&prev) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_busy_percent_no_ticks() {
        let t = CpuTimes {
            idle: 10,
            total: 20,
        };
        assert_eq!(t.busy_percent_since(&t), 0.0);
    }

    #[test]
    fn test_busy_percent_counter_went_backwards() {
        let prev = CpuTimes {
            idle: 500,
            total: 1000,
        };
        let cur = CpuTimes {
            idle: 400,
            total: 1100,
        };
        // Idle regressed; treat the whole delta as busy rather than underflow.
        assert_eq!(cur.busy_percent_since(&prev), 100.0);
    }

    #[test]
    fn test_cpu_percent_zero_window() {
        let mut src = source(MockFs::typical_system());
        // Same file read twice: no elapsed ticks.
        assert_eq!(src.cpu_percent(Duration::ZERO).unwrap(), 0.0);
    }

    #[test]
    fn test_cpu_percent_missing_stat() {
        let mut src = source(MockFs::new());
        assert!(matches!(
            src.cpu_percent(Duration::ZERO),
            Err(CollectError::Io(_))
        ));
    }

    #[test]
    fn test_virtual_memory() {
        let mut src = source(MockFs::typical_system());
        let mem = src.virtual_memory().unwrap();
        assert_eq!(mem.total_bytes, 16384000 * 1024);
        assert_eq!(mem.available_bytes, 12000000 * 1024);
        // (16384000 - 8192000 - 512000 - 2048000) / 16384000
        assert_eq!(mem.used_bytes, 5632000 * 1024);
        assert!((mem.used_percent - 34.375).abs() < 1e-9);
    }

    #[test]
    fn test_virtual_memory_counts_reclaimable_slab_as_cache() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/meminfo",
            "MemTotal: 1000 kB\nMemFree: 200 kB\nMemAvailable: 500 kB\n\
             Buffers: 50 kB\nCached: 150 kB\nSReclaimable: 100 kB\n",
        );
        let mut src = source(fs);
        let mem = src.virtual_memory().unwrap();
        assert_eq!(mem.used_bytes, 500 * 1024);
        assert!((mem.used_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_virtual_memory_without_mem_available() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/meminfo",
            "MemTotal: 1000 kB\nMemFree: 200 kB\nBuffers: 50 kB\nCached: 150 kB\n",
        );
        let mut src = source(fs);
        let mem = src.virtual_memory().unwrap();
        assert!((mem.used_percent - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_disk_usage_delegates_to_probe() {
        let mut src = source(MockFs::new());
        let disk = src.disk_usage(Path::new("/")).unwrap();
        assert!((disk.used_percent - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_uptime() {
        let mut src = source(MockFs::typical_system());
        assert_eq!(src.uptime().unwrap(), 90125);
    }

    #[test]
    fn test_network_counters_sum_all_interfaces() {
        let mut src = source(MockFs::typical_system());
        let net = src.network_counters().unwrap();
        assert_eq!(net.bytes_recv, 12345678 + 987654321);
        assert_eq!(net.bytes_sent, 12345678 + 123456789);
    }

    #[test]
    fn test_network_counters_no_interfaces() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/net/dev",
            "Inter-|   Receive |  Transmit\n face |bytes packets|bytes packets\n",
        );
        let mut src = source(fs);
        assert!(src.network_counters().is_err());
    }

    #[test]
    fn test_custom_proc_path() {
        let mut fs = MockFs::new();
        fs.add_file("/host/proc/uptime", "42.9 10.0\n");
        let mut src = HostSource::new(fs, "/host/proc", FixedDisk::new(1, 1));
        assert_eq!(src.uptime().unwrap(), 42);
    }
}
