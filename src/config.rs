//! Startup configuration.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Address the server listens on unless told otherwise.
pub const DEFAULT_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8081));

/// What [`start`](crate::start) needs to bring the server up.
///
/// `height` and `width` are handed to the simulation service unchecked; it
/// owns the validation rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub height: usize,
    pub width: usize,
    pub addr: SocketAddr,
}

impl ServerConfig {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width, addr: DEFAULT_ADDR }
    }

    /// Overrides the listen address, e.g. `127.0.0.1:0` in tests.
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }
}
