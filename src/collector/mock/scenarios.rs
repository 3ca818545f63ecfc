//! Pre-built mock filesystem scenarios for testing.

use super::filesystem::MockFs;

impl MockFs {
    /// Creates a typical four-core host with loopback and one ethernet link.
    ///
    /// Uptime is 90125 seconds (1 d, 1 h, 2 m).
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file("/proc/uptime", "90125.67 350000.43\n");
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
",
        );
        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );
        fs.add_file(
            "/proc/net/dev",
            "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 12345678    9876    0    0    0     0          0         0 12345678    9876    0    0    0     0       0          0
  eth0: 987654321  654321    5   10    0     0          0      1000 123456789  123456    2    5    0     0       0          0
",
        );

        fs
    }

    /// A host whose `/proc` has no network statistics (e.g. a restricted
    /// network namespace).
    pub fn without_net_dev() -> Self {
        let mut fs = Self::typical_system();
        fs.remove_file("/proc/net/dev");
        fs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typical_system_files() {
        let fs = MockFs::typical_system();
        for file in ["stat", "meminfo", "uptime", "net/dev"] {
            let path = format!("/proc/{}", file);
            assert!(fs.has_file(&path), "missing {}", path);
        }
    }

    #[test]
    fn test_without_net_dev() {
        let fs = MockFs::without_net_dev();
        assert!(!fs.has_file("/proc/net/dev"));
        assert!(fs.has_file("/proc/stat"));
    }
}
