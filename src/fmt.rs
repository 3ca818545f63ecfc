//! Formatting helpers for menu text.
//!
//! All pure formatting functions live here; the sampler composes them into
//! the five display strings.

/// Menu label prefixes.
pub const CPU_LABEL: &str = "CPU";
pub const RAM_LABEL: &str = "RAM";
pub const DISK_LABEL: &str = "Disk";
pub const NETWORK_LABEL: &str = "Network";
pub const UPTIME_LABEL: &str = "Uptime";

/// Format a percentage with one decimal place: `42.37` -> `"42.4%"`.
pub fn format_percent(pct: f64) -> String {
    format!("{:.1}%", pct)
}

/// Format uptime as `"D d, H h, M m"`.
///
/// Hours and minutes are floor-divided totals; the day count is total hours
/// over 24, the hour part is total hours mod 24 and the minute part is total
/// minutes mod 60. Seconds are dropped.
pub fn format_uptime(secs: u64) -> String {
    let total_minutes = secs / 60;
    let total_hours = secs / 3600;
    format!(
        "{} d, {} h, {} m",
        total_hours / 24,
        total_hours % 24,
        total_minutes % 60
    )
}

/// Format send/receive throughput in MB/s with two decimals:
/// `"Sent: 1.00 MB/s, Received: 0.00 MB/s"`.
pub fn format_network_rate(sent_mbps: f64, recv_mbps: f64) -> String {
    format!(
        "Sent: {:.2} MB/s, Received: {:.2} MB/s",
        sent_mbps, recv_mbps
    )
}

/// Prefix a value with its menu label: `("CPU", "42.4%")` -> `"CPU: 42.4%"`.
pub fn labeled(label: &str, value: &str) -> String {
    format!("{}: {}", label, value)
}

/// Format byte count as human-readable size: `"1.5 KiB"`, `"512 B"`.
pub fn format_bytes(bytes: u64) -> String {
    let f = bytes as f64;
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.1} GiB", f / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", f / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", f / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(42.37), "42.4%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(100.0), "100.0%");
        assert_eq!(format_percent(7.04), "7.0%");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(90125), "1 d, 1 h, 2 m");
        assert_eq!(format_uptime(0), "0 d, 0 h, 0 m");
        assert_eq!(format_uptime(59), "0 d, 0 h, 0 m");
        assert_eq!(format_uptime(3600 * 23 + 60 * 59 + 59), "0 d, 23 h, 59 m");
        assert_eq!(format_uptime(86400 * 40 + 3600 * 5), "40 d, 5 h, 0 m");
    }

    #[test]
    fn test_format_network_rate() {
        assert_eq!(
            format_network_rate(0.0, 0.0),
            "Sent: 0.00 MB/s, Received: 0.00 MB/s"
        );
        assert_eq!(
            format_network_rate(1.0, 0.25),
            "Sent: 1.00 MB/s, Received: 0.25 MB/s"
        );
    }

    #[test]
    fn test_labeled() {
        assert_eq!(labeled(CPU_LABEL, "42.4%"), "CPU: 42.4%");
        assert_eq!(labeled(UPTIME_LABEL, "1 d, 1 h, 2 m"), "Uptime: 1 d, 1 h, 2 m");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
    }
}
