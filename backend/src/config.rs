//! Server configuration.
//!
//! Every setting can come from a command-line flag or an environment variable
//! (a `.env` file is loaded at startup).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Args;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default number of metric samples kept in memory.
pub const DEFAULT_METRICS_CAPACITY: usize = 1000;

/// Default request body limit: 10 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// HTTP server settings.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "LINEFILTER_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "LINEFILTER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Number of per-request metric samples to keep
    #[arg(long, env = "LINEFILTER_METRICS_CAPACITY", default_value_t = DEFAULT_METRICS_CAPACITY)]
    pub metrics_capacity: usize,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "LINEFILTER_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            metrics_capacity: DEFAULT_METRICS_CAPACITY,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
