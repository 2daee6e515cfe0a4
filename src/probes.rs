use crate::collectors::{DnsTest, PingTest};
use std::collections::BTreeSet;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time;
use tracing::{debug, warn};

pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(8);
const PING_TIMEOUT: Duration = Duration::from_secs(10);
const DNS_TIMEOUT: Duration = Duration::from_secs(5);
const LOCAL_IP_TIMEOUT: Duration = Duration::from_millis(300);
const PING_COUNT: u32 = 2;

/// OS family resolved once; everything platform-dependent maps off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Unix,
    Windows,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(windows) {
            OsFamily::Windows
        } else {
            OsFamily::Unix
        }
    }

    pub fn ping_count_flag(self) -> &'static str {
        match self {
            OsFamily::Windows => "-n",
            OsFamily::Unix => "-c",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmdFailure {
    NotFound,
    TimedOut,
    Spawn,
}

/// Uniform outcome of an external command. Invocation failures are folded
/// into sentinel exit codes (127 not found, 124 timeout, 1 other) so no
/// caller ever handles a spawn error directly.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
    pub failure: Option<CmdFailure>,
}

pub async fn run_cmd(program: &str, args: &[&str], timeout: Duration) -> CmdOutput {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(program, ?args, timeout_secs = timeout.as_secs(), "running external command");

    match time::timeout(timeout, command.output()).await {
        Err(_elapsed) => CmdOutput {
            code: 124,
            stdout: String::new(),
            stderr: format!(
                "command timed out after {}s: {} {}",
                timeout.as_secs(),
                program,
                args.join(" ")
            ),
            failure: Some(CmdFailure::TimedOut),
        },
        Ok(Err(err)) if err.kind() == io::ErrorKind::NotFound => CmdOutput {
            code: 127,
            stdout: String::new(),
            stderr: format!("command not found: {program}"),
            failure: Some(CmdFailure::NotFound),
        },
        Ok(Err(err)) => CmdOutput {
            code: 1,
            stdout: String::new(),
            stderr: format!("command error: {err}"),
            failure: Some(CmdFailure::Spawn),
        },
        Ok(Ok(output)) => CmdOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            failure: None,
        },
    }
}

/// Best-effort local outbound IP. The UDP connect never sends a packet; it
/// only forces the OS to pick a routing interface.
pub async fn local_ip() -> Option<String> {
    let attempt = async {
        let socket = tokio::net::UdpSocket::bind("0.0.0.0:0").await.ok()?;
        socket.connect(("8.8.8.8", 80)).await.ok()?;
        socket.local_addr().ok().map(|addr| addr.ip().to_string())
    };

    match time::timeout(LOCAL_IP_TIMEOUT, attempt).await {
        Ok(ip) => ip,
        Err(_elapsed) => {
            debug!("local IP discovery timed out");
            None
        }
    }
}

pub async fn dns_lookup(host: &str) -> DnsTest {
    match time::timeout(DNS_TIMEOUT, tokio::net::lookup_host((host, 0u16))).await {
        Ok(Ok(addrs)) => {
            let ips: BTreeSet<String> = addrs.map(|addr| addr.ip().to_string()).collect();
            DnsTest {
                host: host.to_string(),
                ok: true,
                ips: ips.into_iter().collect(),
                error: None,
            }
        }
        Ok(Err(err)) => {
            warn!(host, error = %err, "DNS lookup failed");
            DnsTest {
                host: host.to_string(),
                ok: false,
                ips: Vec::new(),
                error: Some(err.to_string()),
            }
        }
        Err(_elapsed) => {
            warn!(host, "DNS lookup timed out");
            DnsTest {
                host: host.to_string(),
                ok: false,
                ips: Vec::new(),
                error: Some(format!(
                    "DNS lookup timed out after {}s: {host}",
                    DNS_TIMEOUT.as_secs()
                )),
            }
        }
    }
}

pub async fn ping(host: &str) -> PingTest {
    let flag = OsFamily::current().ping_count_flag();
    let count = PING_COUNT.to_string();
    let out = run_cmd("ping", &[flag, count.as_str(), host], PING_TIMEOUT).await;
    if out.code != 0 {
        debug!(host, code = out.code, "ping returned nonzero");
    }

    PingTest {
        host: host.to_string(),
        ok: out.code == 0,
        code: out.code,
        stdout: out.stdout,
        stderr: out.stderr,
    }
}
