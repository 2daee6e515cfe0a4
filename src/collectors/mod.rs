pub mod network;
pub mod system;

use serde::{Deserialize, Serialize};

/// Point-in-time facts about the host. Immutable once built, never persisted.
/// Absent fields mean "unknown"; zero is never substituted for unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SysInfo {
    pub timestamp_utc: String,
    pub hostname: String,
    pub os: String,
    pub os_version: String,
    pub runtime_version: String,
    pub cpu_count_logical: Option<usize>,
    pub memory_total_gb: Option<f64>,
    pub disk_total_gb: Option<f64>,
    pub disk_free_gb: Option<f64>,
}

/// Point-in-time network probe results. Each sub-probe succeeds or fails
/// independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetCheck {
    pub local_ip: Option<String>,
    pub dns_test: DnsTest,
    pub ping_test: PingTest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsTest {
    pub host: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingTest {
    pub host: String,
    pub ok: bool,
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}
