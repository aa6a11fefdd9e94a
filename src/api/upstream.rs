use async_trait::async_trait;
use std::io;
use tokio::net::TcpStream;
use tracing::debug;

/// Reachability check for the service's upstream dependency
#[async_trait]
pub trait UpstreamProbe: Send + Sync {
    /// Address being probed, for logs and responses
    fn addr(&self) -> &str;

    /// Returns once the upstream has accepted a connection
    async fn check(&self) -> io::Result<()>;
}

/// Probes an upstream by opening a TCP connection to it
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl UpstreamProbe for TcpProbe {
    fn addr(&self) -> &str {
        &self.addr
    }

    async fn check(&self) -> io::Result<()> {
        let stream = TcpStream::connect(&self.addr).await?;
        debug!(addr = %self.addr, peer = ?stream.peer_addr().ok(), "Upstream reachable");
        Ok(())
    }
}
