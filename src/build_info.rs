//! Version and build stamp
//!
//! `build.rs` stamps every compile with a counter and a UTC time. Both show up
//! in the startup banner, the MCP server info and `culinary_status`.

use serde::Serialize;

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const STAMPED_NUMBER: Option<&str> = option_env!("CULINARY_BUILD_NUMBER");
const STAMPED_TIMESTAMP: Option<&str> = option_env!("CULINARY_BUILD_TIMESTAMP");

/// Version plus build stamp
///
/// Builds without a stamp (e.g. `cargo install` from a read-only source)
/// report build 0 and an unknown timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self::from_stamp(STAMPED_NUMBER, STAMPED_TIMESTAMP)
    }

    fn from_stamp(number: Option<&str>, timestamp: Option<&'static str>) -> Self {
        Self {
            version: VERSION,
            build_number: number.and_then(|n| n.trim().parse().ok()).unwrap_or(0),
            build_timestamp: timestamp
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or("unknown"),
        }
    }

    /// `0.1.0+build.12`, or the bare version for unstamped builds
    pub fn version_label(&self) -> String {
        match self.build_number {
            0 => self.version.to_string(),
            n => format!("{}+build.{}", self.version, n),
        }
    }

    /// Startup banner, written to stderr so stdout stays free for MCP
    pub fn banner(&self) -> String {
        let rule = "=".repeat(47);
        format!(
            "{rule}\n  Culinary Assistant {}\n  Compiled: {}\n{rule}",
            self.version_label(),
            self.build_timestamp,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_parsing() {
        let info = BuildInfo::from_stamp(Some(" 42 "), Some("2026-10-18T09:30:00Z"));
        assert_eq!(info.build_number, 42);
        assert_eq!(info.build_timestamp, "2026-10-18T09:30:00Z");
        assert_eq!(info.version_label(), format!("{}+build.42", VERSION));

        let unstamped = BuildInfo::from_stamp(Some("12a"), Some(""));
        assert_eq!(unstamped.build_number, 0);
        assert_eq!(unstamped.build_timestamp, "unknown");
        assert_eq!(unstamped.version_label(), VERSION);

        assert_eq!(BuildInfo::from_stamp(None, None), unstamped);
    }

    #[test]
    fn test_banner() {
        let banner = BuildInfo::from_stamp(Some("7"), Some("2026-10-18T09:30:00Z")).banner();
        let lines: Vec<&str> = banner.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], format!("  Culinary Assistant {}+build.7", VERSION));
        assert_eq!(lines[2], "  Compiled: 2026-10-18T09:30:00Z");
        assert_eq!(lines[0], lines[3]);
    }
}
