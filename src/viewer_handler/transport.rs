//! Transport primitives for the viewer handler.
//!
//! Socket creation and TCP connect are separate steps so the worker can
//! tell a socket it failed to create apart from a peer it failed to reach.

use std::{
    io::{self, Write},
    net::{IpAddr, SocketAddr, ToSocketAddrs},
    time::Duration,
};

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use super::config::{TcpTarget, ViewerHandlerConfig};

/// Creates and connects sockets for the worker.
///
/// The worker holds the returned socket in its connection state and only
/// ever writes to it from its own thread.
pub trait Connector: Send + 'static {
    type Socket: Write + Send;

    /// Create an unconnected socket.
    fn open(&mut self) -> io::Result<Self::Socket>;

    /// Connect `socket` to the viewer, waiting at most `timeout`.
    ///
    /// On failure the socket must be left ready for another attempt.
    fn connect(&mut self, socket: &mut Self::Socket, timeout: Duration) -> io::Result<()>;
}

/// Connector for plain TCP viewers.
///
/// The socket created by [`open`](Connector::open) uses the family of the
/// target when it is an IP literal and IPv4 otherwise. `connect` tries every
/// resolved address in order and swaps in a socket of the matching family
/// whenever the address family differs.
#[derive(Clone, Debug)]
pub struct TcpConnector {
    target: TcpTarget,
    write_timeout: Duration,
    socket_domain: Domain,
}

impl TcpConnector {
    pub fn new(target: TcpTarget, write_timeout: Duration) -> Self {
        Self {
            target,
            write_timeout,
            socket_domain: Domain::IPV4,
        }
    }

    pub fn from_config(config: &ViewerHandlerConfig) -> Self {
        Self::new(config.target.clone(), config.write_timeout)
    }

    fn preferred_domain(&self) -> Domain {
        match self.target.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => Domain::IPV6,
            _ => Domain::IPV4,
        }
    }

    fn open_for(&mut self, domain: Domain) -> io::Result<Socket> {
        let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
        self.socket_domain = domain;
        Ok(socket)
    }

    fn socket_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = (self.target.host.as_str(), self.target.port)
            .to_socket_addrs()?
            .collect();
        if addrs.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no usable address for {}", self.target),
            ));
        }
        Ok(addrs)
    }
}

impl Connector for TcpConnector {
    type Socket = Socket;

    fn open(&mut self) -> io::Result<Socket> {
        self.open_for(self.preferred_domain())
    }

    fn connect(&mut self, socket: &mut Socket, timeout: Duration) -> io::Result<()> {
        let mut last_err = None;
        for addr in self.socket_addrs()? {
            let domain = Domain::for_address(addr);
            if domain != self.socket_domain {
                *socket = self.open_for(domain)?;
            }
            match socket.connect_timeout(&SockAddr::from(addr), timeout) {
                Ok(()) => {
                    socket.set_write_timeout(Some(self.write_timeout))?;
                    socket.set_nodelay(true)?;
                    return Ok(());
                }
                Err(err) => {
                    // A socket that failed to connect cannot be reused.
                    *socket = self.open_for(domain)?;
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::TimedOut,
                format!("unable to connect to {}", self.target),
            )
        }))
    }
}
