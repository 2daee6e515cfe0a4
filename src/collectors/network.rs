use crate::collectors::NetCheck;
use crate::probes;
use tracing::debug;

/// Runs the three probes in sequence. Each is best-effort; one failing never
/// prevents the others from running.
pub async fn run_netcheck(dns_host: &str, ping_host: &str) -> NetCheck {
    let local_ip = probes::local_ip().await;
    debug!(local_ip = ?local_ip, "local IP discovery done");

    let dns_test = probes::dns_lookup(dns_host).await;
    let ping_test = probes::ping(ping_host).await;

    NetCheck {
        local_ip,
        dns_test,
        ping_test,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn netcheck_assembles_all_probes() {
        let check = run_netcheck("localhost", "127.0.0.1").await;
        // localhost resolves from the hosts file, no network needed.
        assert!(check.dns_test.ok);
        assert_eq!(check.dns_test.host, "localhost");
        // Ping may fail in minimal environments; the result is still data.
        assert_eq!(check.ping_test.host, "127.0.0.1");
    }

    #[tokio::test]
    async fn dns_failure_does_not_block_ping() {
        let check = run_netcheck("no-such-host.invalid", "127.0.0.1").await;
        assert!(!check.dns_test.ok);
        assert_eq!(check.ping_test.host, "127.0.0.1");
    }
}
