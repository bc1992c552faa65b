//! TCP reachability probe.

use super::error::ProbeError;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::net::TcpStream;

/// Checks whether anything accepts TCP connections on a port.
#[derive(Debug, Clone)]
pub struct ReachabilityProbe {
    host: String,
    timeout: Duration,
}

impl ReachabilityProbe {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            timeout,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Attempt one connection, classifying the failure.
    pub async fn connect(&self, port: u16) -> Result<(), ProbeError> {
        let attempt = TcpStream::connect((self.host.as_str(), port));
        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                Err(ProbeError::ConnectionRefused)
            }
            Ok(Err(e)) => Err(ProbeError::ConnectionFailed(e.to_string())),
            Err(_) => Err(ProbeError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    /// True if `port` accepted a connection within the timeout.
    ///
    /// Never fails: refusal, timeout and socket errors all mean unreachable.
    pub async fn is_reachable(&self, port: u16) -> bool {
        match self.connect(port).await {
            Ok(()) => true,
            Err(e) => {
                tracing::trace!(host = %self.host, port, error = %e, "Port not reachable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_open_port_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = ReachabilityProbe::new("127.0.0.1", Duration::from_secs(3));
        assert!(probe.is_reachable(port).await);
    }

    #[tokio::test]
    async fn test_closed_port_is_refused_quickly() {
        // Bind then drop to get a port nothing listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let probe = ReachabilityProbe::new("127.0.0.1", Duration::from_secs(3));
        let start = Instant::now();
        let result = probe.connect(port).await;

        assert!(matches!(result, Err(ProbeError::ConnectionRefused)));
        assert!(!probe.is_reachable(port).await);
        assert!(start.elapsed() <= Duration::from_millis(3500));
    }

    #[tokio::test]
    async fn test_unroutable_host_times_out_within_bound() {
        // TEST-NET-1 is reserved and never answers
        let probe = ReachabilityProbe::new("192.0.2.1", Duration::from_millis(300));
        let start = Instant::now();

        assert!(!probe.is_reachable(8554).await);
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
