use std::time::Duration;

use async_trait::async_trait;
use gw_domain::{Error, Result};

/// Bounded-timeout reachability check against `(host, port)` (spec §4.3).
/// Abstracted behind a trait so tests can substitute a deterministic
/// double instead of opening real sockets.
#[async_trait]
pub trait TrunkProber: Send + Sync {
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> Result<Duration>;
}

/// Real reachability probe: a bare TCP connect, timed and bounded.
pub struct TcpProber;

#[async_trait]
impl TrunkProber for TcpProber {
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> Result<Duration> {
        let started = std::time::Instant::now();
        let addr = format!("{host}:{port}");
        match tokio::time::timeout(timeout, tokio::net::TcpStream::connect(&addr)).await {
            Ok(Ok(_stream)) => Ok(started.elapsed()),
            Ok(Err(e)) => Err(Error::Connection(e.to_string())),
            Err(_) => Err(Error::Timeout(format!("probe of {addr} exceeded {timeout:?}"))),
        }
    }
}
