use crate::collectors::SysInfo;
use crate::probes::{run_cmd, OsFamily, DEFAULT_CMD_TIMEOUT};
use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use sysinfo::{DiskExt, System, SystemExt};
use tracing::debug;

/// Hardware figures that depend on the selected metrics capability.
#[derive(Debug, Clone, Default)]
pub struct HardwareMetrics {
    pub cpu_count_logical: Option<usize>,
    pub memory_total_gb: Option<f64>,
    pub disk_total_gb: Option<f64>,
    pub disk_free_gb: Option<f64>,
}

/// Source of hardware metrics. The enriched implementation reads everything
/// through `sysinfo`; the baseline one covers CPU and disk through generic
/// OS facilities and leaves memory unknown.
#[async_trait]
pub trait MetricsProvider: Send {
    fn name(&self) -> &'static str;

    async fn hardware(&mut self) -> HardwareMetrics;
}

/// Picks the richest capability available on this platform. The check is a
/// static platform-support flag, not a failing attempt.
pub fn default_provider() -> Box<dyn MetricsProvider> {
    if <System as SystemExt>::IS_SUPPORTED {
        Box::new(EnrichedMetrics::new())
    } else {
        Box::new(BaselineMetrics)
    }
}

pub struct EnrichedMetrics {
    system: System,
}

impl EnrichedMetrics {
    pub fn new() -> Self {
        Self {
            system: System::new_all(),
        }
    }
}

impl Default for EnrichedMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricsProvider for EnrichedMetrics {
    fn name(&self) -> &'static str {
        "enriched"
    }

    async fn hardware(&mut self) -> HardwareMetrics {
        self.system.refresh_cpu();
        self.system.refresh_memory();
        self.system.refresh_disks_list();
        self.system.refresh_disks();

        let cpu_count_logical = match self.system.cpus().len() {
            0 => None,
            n => Some(n),
        };
        let memory_total_gb = match self.system.total_memory() {
            0 => None,
            bytes => Some(round_gb(bytes as f64)),
        };

        let root = root_mount_point();
        let disk = self
            .system
            .disks()
            .iter()
            .find(|d| d.mount_point() == root)
            .or_else(|| {
                self.system
                    .disks()
                    .iter()
                    .max_by_key(|d| d.total_space())
            });
        let (disk_total_gb, disk_free_gb) = match disk {
            Some(d) => (
                Some(round_gb(d.total_space() as f64)),
                Some(round_gb(d.available_space() as f64)),
            ),
            None => (None, None),
        };

        HardwareMetrics {
            cpu_count_logical,
            memory_total_gb,
            disk_total_gb,
            disk_free_gb,
        }
    }
}

/// Degraded path: CPU count and root disk usage still populate, total memory
/// stays unknown rather than being estimated.
pub struct BaselineMetrics;

#[async_trait]
impl MetricsProvider for BaselineMetrics {
    fn name(&self) -> &'static str {
        "baseline"
    }

    async fn hardware(&mut self) -> HardwareMetrics {
        let cpu_count_logical = std::thread::available_parallelism().ok().map(|n| n.get());
        let (disk_total_gb, disk_free_gb) = match baseline_disk_usage().await {
            Some((total, free)) => (Some(total), Some(free)),
            None => (None, None),
        };

        HardwareMetrics {
            cpu_count_logical,
            memory_total_gb: None,
            disk_total_gb,
            disk_free_gb,
        }
    }
}

async fn baseline_disk_usage() -> Option<(f64, f64)> {
    match OsFamily::current() {
        OsFamily::Unix => {
            let out = run_cmd("df", &["-Pk", "/"], DEFAULT_CMD_TIMEOUT).await;
            if out.code != 0 {
                return None;
            }
            // POSIX df: Filesystem 1024-blocks Used Available Capacity Mounted
            let line = out.stdout.lines().nth(1)?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            let total_kb: f64 = fields.get(1)?.parse().ok()?;
            let free_kb: f64 = fields.get(3)?.parse().ok()?;
            Some((round_gb(total_kb * 1024.0), round_gb(free_kb * 1024.0)))
        }
        OsFamily::Windows => {
            let script = "$d = Get-PSDrive -Name C; \"$($d.Used + $d.Free)|$($d.Free)\"";
            let out = run_cmd(
                "powershell",
                &["-NoProfile", "-Command", script],
                DEFAULT_CMD_TIMEOUT,
            )
            .await;
            if out.code != 0 {
                return None;
            }
            let mut parts = out.stdout.splitn(2, '|');
            let total: f64 = parts.next()?.trim().parse().ok()?;
            let free: f64 = parts.next()?.trim().parse().ok()?;
            Some((round_gb(total), round_gb(free)))
        }
    }
}

fn root_mount_point() -> &'static Path {
    if cfg!(windows) {
        Path::new("C:\\")
    } else {
        Path::new("/")
    }
}

fn round_gb(bytes: f64) -> f64 {
    let gb = bytes / (1024.0 * 1024.0 * 1024.0);
    (gb * 100.0).round() / 100.0
}

pub async fn collect_sysinfo(provider: &mut dyn MetricsProvider) -> SysInfo {
    let system = System::new();
    let hostname = system.host_name().unwrap_or_else(|| "unknown".to_string());
    let os = system.name().unwrap_or_else(|| "unknown".to_string());
    let os_version = system.os_version().unwrap_or_else(|| "unknown".to_string());

    debug!(provider = provider.name(), "collecting system snapshot");
    let hardware = provider.hardware().await;

    SysInfo {
        timestamp_utc: utc_now_iso(),
        hostname,
        os,
        os_version,
        runtime_version: env!("SYSREPORT_RUSTC_VERSION").to_string(),
        cpu_count_logical: hardware.cpu_count_logical,
        memory_total_gb: hardware.memory_total_gb,
        disk_total_gb: hardware.disk_total_gb,
        disk_free_gb: hardware.disk_free_gb,
    }
}

/// UTC, second precision, explicit Z suffix.
fn utc_now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
