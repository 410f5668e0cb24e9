//! TCP transport layer for EtherNet/IP communication.
//!
//! This module provides the [`TcpTransport`] struct which handles low-level
//! TCP communication with the controller. The transport layer is completely
//! separated from the protocol layer: it only knows about sockets and bytes,
//! and framing is driven by the encapsulation header's length field one
//! layer up.
//!
//! # Design
//!
//! - **Protocol agnostic** - Handles only byte transmission
//! - **Synchronous** - Blocking send/receive with configurable timeout
//! - **Simple** - One stream, one remote address, no connection pooling
//!
//! Closing the stream from another handle (via [`TcpTransport::shutdown`])
//! unblocks a pending receive, which is the cancellation path.
//!
//! # Constants
//!
//! - [`DEFAULT_PORT`] - Default EtherNet/IP TCP port (44818)
//! - [`DEFAULT_TIMEOUT`] - Default timeout (5000 ms)

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::{PcccError, Result};

/// Default EtherNet/IP TCP port.
pub const DEFAULT_PORT: u16 = 44818;

/// Default timeout for connect, send and receive operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// TCP transport for EtherNet/IP communication.
///
/// Handles synchronous TCP communication with configurable timeout.
/// The protocol layer doesn't know about sockets; the socket layer doesn't
/// know PCCC.
pub struct TcpTransport {
    stream: TcpStream,
    remote_addr: SocketAddr,
}

impl TcpTransport {
    /// Opens a TCP connection to the controller.
    ///
    /// The same timeout bounds the connect itself and all later send and
    /// receive operations.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Timeout` if the connect does not complete within
    /// the timeout, or an I/O error if the stream cannot be configured.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ab_pccc::TcpTransport;
    /// use std::time::Duration;
    ///
    /// let transport = TcpTransport::connect(
    ///     "192.168.1.100:44818".parse().unwrap(),
    ///     Duration::from_millis(5000),
    /// ).unwrap();
    /// ```
    pub fn connect(plc_addr: SocketAddr, timeout: Duration) -> Result<Self> {
        let stream = match TcpStream::connect_timeout(&plc_addr, timeout) {
            Ok(stream) => stream,
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                return Err(PcccError::Timeout)
            }
            Err(e) => return Err(PcccError::Io(e)),
        };
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        Ok(Self {
            stream,
            remote_addr: plc_addr,
        })
    }

    /// Sends a complete frame.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Timeout` if the write timeout expires, or the
    /// underlying I/O error otherwise.
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        map_timeout(self.stream.write_all(data))
    }

    /// Receives exactly `buf.len()` bytes, blocking until they arrive.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Timeout` if the read timeout expires, or the
    /// underlying I/O error otherwise (including an unexpected EOF when the
    /// controller closes the stream).
    pub fn recv_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        map_timeout(self.stream.read_exact(buf))
    }

    /// Shuts down both directions of the stream.
    ///
    /// Unblocks any pending receive with a transport error. The result of
    /// the shutdown itself is intentionally ignored; teardown is best
    /// effort.
    pub fn shutdown(&self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }

    /// Returns the remote controller address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }
}

fn map_timeout(result: std::io::Result<()>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(PcccError::Timeout),
        Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(PcccError::Timeout),
        Err(e) => Err(PcccError::Io(e)),
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("remote_addr", &self.remote_addr)
            .field("local_addr", &self.stream.local_addr().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_PORT, 44818);
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_millis(5000));
    }

    #[test]
    fn test_send_receive_roundtrip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let echo = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4];
            stream.read_exact(&mut buf).unwrap();
            stream.write_all(&buf).unwrap();
        });

        let mut transport =
            TcpTransport::connect(addr, Duration::from_millis(1000)).unwrap();
        transport.send(&[1, 2, 3, 4]).unwrap();

        let mut buf = [0u8; 4];
        transport.recv_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);

        echo.join().unwrap();
    }

    #[test]
    fn test_receive_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let hold = std::thread::spawn(move || {
            // accept but never answer
            let (_stream, _) = listener.accept().unwrap();
            std::thread::sleep(Duration::from_millis(300));
        });

        let mut transport =
            TcpTransport::connect(addr, Duration::from_millis(50)).unwrap();
        let mut buf = [0u8; 1];
        let err = transport.recv_exact(&mut buf).unwrap_err();
        assert!(matches!(err, PcccError::Timeout));

        hold.join().unwrap();
    }

    #[test]
    fn test_transport_debug() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let transport = TcpTransport::connect(addr, Duration::from_millis(500)).unwrap();
        let debug_str = format!("{:?}", transport);
        assert!(debug_str.contains("TcpTransport"));
        assert!(debug_str.contains("127.0.0.1"));
    }
}
