use crate::collectors::network::run_netcheck;
use crate::collectors::system::{collect_sysinfo, MetricsProvider};
use crate::collectors::{NetCheck, SysInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// One collection pass: a system snapshot and a network check, joined only
/// at serialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub sysinfo: SysInfo,
    pub netcheck: NetCheck,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Single entry point for callers that need a full report.
pub async fn build_report(
    dns_host: &str,
    ping_host: &str,
    provider: &mut dyn MetricsProvider,
) -> Report {
    let sysinfo = collect_sysinfo(provider).await;
    let netcheck = run_netcheck(dns_host, ping_host).await;
    Report { sysinfo, netcheck }
}

pub fn to_json(report: &Report) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn default_prefix(now: DateTime<Utc>) -> String {
    format!("support_report_{}", now.format("%Y%m%d_%H%M%S"))
}

/// Fixed-layout text summary derived from the report value. Ping stdout and
/// stderr are left out to keep the view scannable.
pub fn render_text(report: &Report) -> String {
    let si = &report.sysinfo;
    let nc = &report.netcheck;

    let dns_line = if nc.dns_test.ok {
        format!(
            "DNS lookup: {} ok=true ips=[{}]",
            nc.dns_test.host,
            nc.dns_test.ips.join(", ")
        )
    } else {
        format!(
            "DNS lookup: {} ok=false error={}",
            nc.dns_test.host,
            nc.dns_test.error.as_deref().unwrap_or("unknown")
        )
    };

    let lines = [
        format!("IT Support Report ({})", si.timestamp_utc),
        "-".repeat(40),
        format!("Host: {}", si.hostname),
        format!("OS: {} ({})", si.os, si.os_version),
        format!("Runtime: {}", si.runtime_version),
        format!("CPU (logical): {}", fmt_opt_usize(si.cpu_count_logical)),
        format!("Memory total (GB): {}", fmt_opt_gb(si.memory_total_gb)),
        format!(
            "Disk total/free (GB): {} / {}",
            fmt_opt_gb(si.disk_total_gb),
            fmt_opt_gb(si.disk_free_gb)
        ),
        String::new(),
        "Network:".to_string(),
        format!(
            "Local IP: {}",
            nc.local_ip.as_deref().unwrap_or("unknown")
        ),
        dns_line,
        format!(
            "Ping test: {} ok={} code={}",
            nc.ping_test.host, nc.ping_test.ok, nc.ping_test.code
        ),
    ];

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Writes `<prefix>.json` and `<prefix>.txt`, both in full, and returns the
/// two paths. I/O errors propagate to the caller.
pub fn save_report(report: &Report, prefix: &str) -> Result<(PathBuf, PathBuf), ReportError> {
    let json_path = PathBuf::from(format!("{prefix}.json"));
    let txt_path = PathBuf::from(format!("{prefix}.txt"));

    let json = to_json(report)?;
    fs::write(&json_path, json).map_err(|source| ReportError::Write {
        path: json_path.display().to_string(),
        source,
    })?;

    let text = render_text(report);
    fs::write(&txt_path, text).map_err(|source| ReportError::Write {
        path: txt_path.display().to_string(),
        source,
    })?;

    debug!(json = %json_path.display(), txt = %txt_path.display(), "report written");
    Ok((json_path, txt_path))
}

fn fmt_opt_usize(value: Option<usize>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

fn fmt_opt_gb(value: Option<f64>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| format!("{v:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::system::default_provider;
    use crate::collectors::{DnsTest, PingTest};
    use chrono::TimeZone;

    fn sample_report() -> Report {
        Report {
            sysinfo: SysInfo {
                timestamp_utc: "2024-05-01T10:20:30Z".to_string(),
                hostname: "support-box".to_string(),
                os: "Linux".to_string(),
                os_version: "6.1.0".to_string(),
                runtime_version: "rustc 1.80.0".to_string(),
                cpu_count_logical: Some(8),
                memory_total_gb: Some(15.42),
                disk_total_gb: Some(476.94),
                disk_free_gb: Some(123.4),
            },
            netcheck: NetCheck {
                local_ip: Some("192.168.1.10".to_string()),
                dns_test: DnsTest {
                    host: "google.com".to_string(),
                    ok: true,
                    ips: vec!["142.250.64.78".to_string(), "2607:f8b0::1".to_string()],
                    error: None,
                },
                ping_test: PingTest {
                    host: "8.8.8.8".to_string(),
                    ok: true,
                    code: 0,
                    stdout: "2 packets transmitted, 2 received".to_string(),
                    stderr: String::new(),
                },
            },
        }
    }

    fn degraded_report() -> Report {
        let mut report = sample_report();
        report.sysinfo.memory_total_gb = None;
        report.netcheck.local_ip = None;
        report.netcheck.dns_test = DnsTest {
            host: "nope.invalid".to_string(),
            ok: false,
            ips: Vec::new(),
            error: Some("failed to lookup address information".to_string()),
        };
        report.netcheck.ping_test.ok = false;
        report.netcheck.ping_test.code = 124;
        report
    }

    #[test]
    fn json_round_trip_preserves_every_field() {
        for report in [sample_report(), degraded_report()] {
            let json = to_json(&report).expect("serialize");
            let parsed: Report = serde_json::from_str(&json).expect("parse");
            assert_eq!(parsed, report);
        }
    }

    #[test]
    fn json_has_both_top_level_sections() {
        let json = to_json(&sample_report()).expect("serialize");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert!(value.get("sysinfo").is_some());
        assert!(value.get("netcheck").is_some());
        // Pretty output with 2-space indentation.
        assert!(json.contains("\n  \"sysinfo\""));
    }

    #[test]
    fn render_text_is_deterministic() {
        let report = sample_report();
        assert_eq!(render_text(&report), render_text(&report));
    }

    #[test]
    fn render_text_layout() {
        let text = render_text(&sample_report());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "IT Support Report (2024-05-01T10:20:30Z)");
        assert_eq!(lines[1], "-".repeat(40));
        assert_eq!(lines[2], "Host: support-box");
        assert_eq!(lines[3], "OS: Linux (6.1.0)");
        assert_eq!(lines[8], "");
        assert_eq!(lines[9], "Network:");
        assert_eq!(lines[12], "Ping test: 8.8.8.8 ok=true code=0");
        assert!(!text.contains("packets transmitted"));
    }

    #[test]
    fn render_text_marks_unknown_fields() {
        let text = render_text(&degraded_report());
        assert!(text.contains("Memory total (GB): unknown"));
        assert!(text.contains("Local IP: unknown"));
        assert!(text.contains("ok=false"));
    }

    #[test]
    fn default_prefix_format() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap();
        assert_eq!(default_prefix(now), "support_report_20240501_102030");
    }

    #[test]
    fn save_report_writes_both_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefix = dir.path().join("report").display().to_string();
        let report = sample_report();

        let (json_path, txt_path) = save_report(&report, &prefix).expect("save");
        assert!(json_path.exists());
        assert!(txt_path.exists());

        let json = fs::read_to_string(&json_path).expect("read json");
        let parsed: Report = serde_json::from_str(&json).expect("parse json");
        assert_eq!(parsed, report);

        let text = fs::read_to_string(&txt_path).expect("read txt");
        assert!(text.contains(&report.sysinfo.timestamp_utc));
    }

    #[test]
    fn save_report_surfaces_io_errors() {
        let report = sample_report();
        let err = save_report(&report, "/no-such-dir-xyz/report").expect_err("must fail");
        assert!(matches!(err, ReportError::Write { .. }));
    }

    #[tokio::test]
    #[ignore = "requires a working ping binary and ICMP to localhost"]
    async fn end_to_end_report_against_localhost() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefix = dir.path().join("e2e").display().to_string();

        let mut provider = default_provider();
        let report = build_report("localhost", "127.0.0.1", provider.as_mut()).await;
        let (json_path, txt_path) = save_report(&report, &prefix).expect("save");

        let json = fs::read_to_string(json_path).expect("read json");
        let parsed: Report = serde_json::from_str(&json).expect("parse json");
        assert!(parsed.netcheck.ping_test.ok);

        let text = fs::read_to_string(txt_path).expect("read txt");
        assert!(text.contains("ok=true code=0"));
        assert!(text.contains(&parsed.sysinfo.timestamp_utc));
    }
}
