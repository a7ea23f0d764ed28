//! TCP reachability checks against the terminal

use std::collections::BTreeMap;
use std::time::Duration;

use punchsync_domain::constants::PORT_DETECTION_TIMEOUT_SECS;
use punchsync_domain::{DeviceConfig, DeviceProbe};
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

/// Checks whether the terminal accepts TCP connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpDeviceProbe {
    ip: String,
    port: u16,
    timeout: Duration,
}

impl TcpDeviceProbe {
    pub fn new(ip: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self { ip: ip.into(), port, timeout }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(config.ip.clone(), config.port, Duration::from_secs(config.timeout_seconds))
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    pub async fn is_reachable(&self) -> bool {
        can_connect(&self.ip, self.port, self.timeout).await
    }

    /// Reachability plus the address that was tried.
    #[instrument(skip(self), fields(address = %self.address()))]
    pub async fn probe(&self) -> DeviceProbe {
        let mut info = BTreeMap::new();
        info.insert("ip".to_string(), self.ip.clone());
        info.insert("port".to_string(), self.port.to_string());

        if self.is_reachable().await {
            info!("Terminal reachable");
            DeviceProbe::reachable(info)
        } else {
            info!("Terminal not reachable");
            DeviceProbe { reachable: false, info }
        }
    }
}

/// First candidate port on `ip` that accepts a TCP connection.
#[instrument(skip(candidates))]
pub async fn detect_port(ip: &str, candidates: &[u16]) -> Option<u16> {
    let timeout = Duration::from_secs(PORT_DETECTION_TIMEOUT_SECS);
    for &port in candidates {
        if can_connect(ip, port, timeout).await {
            info!(port, "Terminal port detected");
            return Some(port);
        }
        debug!(port, "Port closed");
    }
    None
}

async fn can_connect(ip: &str, port: u16, timeout: Duration) -> bool {
    matches!(tokio::time::timeout(timeout, TcpStream::connect((ip, port))).await, Ok(Ok(_)))
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    #[tokio::test]
    async fn open_port_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = TcpDeviceProbe::new("127.0.0.1", port, Duration::from_secs(1));
        let report = probe.probe().await;

        assert!(report.reachable);
        assert_eq!(report.info.get("port"), Some(&port.to_string()));
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let probe = TcpDeviceProbe::new("127.0.0.1", closed_port().await, Duration::from_secs(1));
        let report = probe.probe().await;
        assert!(!report.reachable);
        assert_eq!(report.info.get("ip").map(String::as_str), Some("127.0.0.1"));
    }

    #[tokio::test]
    async fn detects_first_open_candidate() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().port();
        let closed = closed_port().await;

        assert_eq!(detect_port("127.0.0.1", &[closed, open]).await, Some(open));
        assert_eq!(detect_port("127.0.0.1", &[closed]).await, None);
    }
}
