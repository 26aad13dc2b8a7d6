//! Configuration loading for GridNav

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{NavError, Result};
use crate::grid::{Cell, Direction, GridMap};

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub actuator: ActuatorConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Grid geometry and initial vehicle pose
#[derive(Clone, Debug, Deserialize)]
pub struct MapConfig {
    /// Number of rows (default: 5)
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Number of columns (default: 5)
    #[serde(default = "default_cols")]
    pub cols: usize,

    /// Destination cell as [row, col] (default: [0, 4])
    #[serde(default = "default_destination")]
    pub destination: [usize; 2],

    /// Start cell as [row, col] (default: [4, 4])
    #[serde(default = "default_start")]
    pub start: [usize; 2],

    /// Initial facing (default: east)
    #[serde(default = "default_facing")]
    pub facing: Direction,

    /// Rows known to be free before any report arrives
    #[serde(default)]
    pub free_rows: Vec<usize>,

    /// Columns known to be free before any report arrives
    #[serde(default)]
    pub free_cols: Vec<usize>,
}

/// Drive controller serial line
#[derive(Clone, Debug, Deserialize)]
pub struct ActuatorConfig {
    /// Serial port path (default: /dev/ttymxc3)
    #[serde(default = "default_port")]
    pub port: String,

    /// Baud rate (default: 115200)
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Write timeout in milliseconds (default: 100)
    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,
}

/// Remote map server
#[derive(Clone, Debug, Deserialize)]
pub struct TelemetryConfig {
    /// Server address (default: 127.0.0.1:6363)
    #[serde(default = "default_address")]
    pub address: String,

    /// Name prefix for place requests (default: /place)
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Connect/read timeout in milliseconds (default: 3000)
    #[serde(default = "default_fetch_timeout")]
    pub timeout_ms: u64,

    /// Places to poll. Empty polls the neighbours of the current cell.
    #[serde(default)]
    pub places: Vec<String>,
}

/// Loop periods
#[derive(Clone, Debug, Deserialize)]
pub struct TimingConfig {
    /// Refresh thread period in milliseconds (default: 500)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,

    /// Control thread period in milliseconds (default: 1000)
    #[serde(default = "default_control_interval")]
    pub control_interval_ms: u64,

    /// Status log period in seconds (default: 5)
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            destination: default_destination(),
            start: default_start(),
            facing: default_facing(),
            free_rows: Vec::new(),
            free_cols: Vec::new(),
        }
    }
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            write_timeout_ms: default_write_timeout(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            prefix: default_prefix(),
            timeout_ms: default_fetch_timeout(),
            places: Vec::new(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval(),
            control_interval_ms: default_control_interval(),
            status_interval_secs: default_status_interval(),
        }
    }
}

// Default value functions
fn default_rows() -> usize {
    5
}
fn default_cols() -> usize {
    5
}
fn default_destination() -> [usize; 2] {
    [0, 4]
}
fn default_start() -> [usize; 2] {
    [4, 4]
}
fn default_facing() -> Direction {
    Direction::East
}
fn default_port() -> String {
    "/dev/ttymxc3".to_string()
}
fn default_baud_rate() -> u32 {
    115200
}
fn default_write_timeout() -> u64 {
    100
}
fn default_address() -> String {
    "127.0.0.1:6363".to_string()
}
fn default_prefix() -> String {
    "/place".to_string()
}
fn default_fetch_timeout() -> u64 {
    3000
}
fn default_refresh_interval() -> u64 {
    500
}
fn default_control_interval() -> u64 {
    1000
}
fn default_status_interval() -> u64 {
    5
}

impl NavConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("Failed to read config file: {}", e)))?;
        let config: NavConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check geometry and periods.
    pub fn validate(&self) -> Result<()> {
        let map = &self.map;
        if map.rows == 0 || map.cols == 0 {
            return Err(NavError::Config(format!(
                "grid must be non-empty, got {}x{}",
                map.rows, map.cols
            )));
        }
        for (name, [row, col]) in [("destination", map.destination), ("start", map.start)] {
            if row >= map.rows || col >= map.cols {
                return Err(NavError::Config(format!(
                    "{} ({}, {}) outside {}x{} grid",
                    name, row, col, map.rows, map.cols
                )));
            }
        }
        if let Some(row) = map.free_rows.iter().find(|&&r| r >= map.rows) {
            return Err(NavError::Config(format!("free row {} out of range", row)));
        }
        if let Some(col) = map.free_cols.iter().find(|&&c| c >= map.cols) {
            return Err(NavError::Config(format!("free column {} out of range", col)));
        }
        if self.timing.refresh_interval_ms == 0 || self.timing.control_interval_ms == 0 {
            return Err(NavError::Config("loop intervals must be non-zero".into()));
        }
        Ok(())
    }

    /// Build the session's grid map with the seeded free lines.
    pub fn build_map(&self) -> Result<GridMap> {
        let mut map = GridMap::new(
            self.map.rows,
            self.map.cols,
            Cell::from(self.map.destination),
            Cell::from(self.map.start),
            self.map.facing,
        )?;
        for &row in &self.map.free_rows {
            map.free_row(row)?;
        }
        for &col in &self.map.free_cols {
            map.free_col(col)?;
        }
        Ok(map)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.timing.refresh_interval_ms)
    }

    pub fn control_interval(&self) -> Duration {
        Duration::from_millis(self.timing.control_interval_ms)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.timing.status_interval_secs.max(1))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.telemetry.timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.actuator.write_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = NavConfig::default();
        assert_eq!(config.map.rows, 5);
        assert_eq!(config.map.destination, [0, 4]);
        assert_eq!(config.map.facing, Direction::East);
        assert_eq!(config.actuator.baud_rate, 115200);
        assert!(config.validate().is_ok());

        // No seeded lines: everything starts blocked
        let map = config.build_map().unwrap();
        assert!(!map.is_free(Cell::new(4, 4)));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[map]
rows = 6
cols = 7
destination = [0, 6]
start = [5, 6]
facing = "north"
free_rows = [5]
free_cols = [6]

[telemetry]
places = ["5_5", "4_6"]
"#
        )
        .unwrap();

        let config = NavConfig::load(file.path()).unwrap();
        assert_eq!(config.map.cols, 7);
        assert_eq!(config.map.facing, Direction::North);
        assert_eq!(config.telemetry.places.len(), 2);
        assert_eq!(config.telemetry.prefix, "/place");
        assert_eq!(config.timing.control_interval_ms, 1000);

        let map = config.build_map().unwrap();
        assert!(map.is_free(Cell::new(5, 0)));
        assert!(map.is_free(Cell::new(0, 6)));
        assert!(!map.is_free(Cell::new(0, 0)));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let mut config = NavConfig::default();
        config.map.start = [5, 0];
        assert!(matches!(config.validate(), Err(NavError::Config(_))));

        let mut config = NavConfig::default();
        config.map.free_cols = vec![9];
        assert!(config.validate().is_err());

        let mut config = NavConfig::default();
        config.timing.control_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[map]\nfacing = \"up\"").unwrap();
        assert!(matches!(
            NavConfig::load(file.path()),
            Err(NavError::Config(_))
        ));
    }
}
