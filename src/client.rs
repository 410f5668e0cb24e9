//! Session management and the high-level PLC connection.
//!
//! This module provides the [`Connection`] struct, which owns one
//! controller link end to end: the TCP transport, the encapsulation
//! session, the transaction counter, and the request/reply round trip.
//!
//! # Session Lifecycle
//!
//! A connection moves through an explicit state machine:
//!
//! ```text
//! Disconnected -> Connecting -> SessionPending -> Active -> Closing -> Disconnected
//! ```
//!
//! [`Connection::connect`] opens the transport and registers a session;
//! only an `Active` connection accepts data commands. Any transport
//! failure or timeout forces the connection back to `Disconnected` - there
//! is no automatic retry or reconnection, recovery belongs to the caller.
//!
//! # Example
//!
//! ```no_run
//! use ab_pccc::{ClientConfig, Connection};
//! use std::net::{IpAddr, Ipv4Addr};
//!
//! fn main() -> ab_pccc::Result<()> {
//!     let config = ClientConfig::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100)));
//!     let mut plc = Connection::new(config);
//!     plc.connect()?;
//!
//!     // N7:0
//!     let value = plc.read_integer(7, 0)?;
//!     println!("N7:0 = {}", value);
//!
//!     // F8:2
//!     plc.write_float(8, 2, 98.6)?;
//!
//!     plc.close()?;
//!     Ok(())
//! }
//! ```
//!
//! # Concurrency
//!
//! Each connection carries exactly one in-flight command at a time; the
//! `&mut self` receivers make external serialization a compile-time
//! requirement rather than a documentation note. Wrap the connection in a
//! caller-owned lock to share it between threads.

use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::cip;
use crate::command::{PcccCommand, PcccRequest, MAX_TRANSFER_BYTES};
use crate::encapsulation::{
    self, EncapsulationCommand, EncapsulationHeader, ENCAPSULATION_HEADER_SIZE,
};
use crate::error::{PcccError, Result};
use crate::file_types::FileType;
use crate::reply::PcccReply;
use crate::transport::{TcpTransport, DEFAULT_PORT, DEFAULT_TIMEOUT};
use crate::utils;
use crate::PlcAddress;

/// Characters that fit in one ST file string record.
pub const MAX_STRING_LEN: usize = 82;

/// Configuration for creating a PLC connection.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Controller socket address.
    pub plc_addr: SocketAddr,
    /// Timeout bounding connect, send and receive operations.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration for the given controller IP with the default
    /// port (44818) and timeout (5000 ms).
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::ClientConfig;
    /// use std::net::{IpAddr, Ipv4Addr};
    ///
    /// let config = ClientConfig::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100)));
    /// ```
    pub fn new(plc_ip: IpAddr) -> Self {
        Self {
            plc_addr: SocketAddr::from((plc_ip, DEFAULT_PORT)),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom controller port (default is 44818).
    pub fn with_port(mut self, port: u16) -> Self {
        self.plc_addr.set_port(port);
        self
    }

    /// Sets a custom timeout (default is 5000 ms).
    ///
    /// # Example
    ///
    /// ```
    /// use ab_pccc::ClientConfig;
    /// use std::net::{IpAddr, Ipv4Addr};
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100)))
    ///     .with_timeout(Duration::from_secs(2));
    /// ```
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Session state of a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport, no session. The only state `connect` accepts.
    Disconnected,
    /// Transport handshake in progress.
    Connecting,
    /// RegisterSession sent, awaiting the session handle.
    SessionPending,
    /// Session registered; data commands are accepted.
    Active,
    /// Teardown in progress.
    Closing,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::SessionPending => "session pending",
            SessionState::Active => "active",
            SessionState::Closing => "closing",
        };
        write!(f, "{}", name)
    }
}

/// One connection to an SLC-500 / MicroLogix controller.
///
/// Owns the transport, the session handle, the transaction counter and the
/// sender-context correlation token. Created disconnected; call
/// [`Connection::connect`] before any data operation.
pub struct Connection {
    config: ClientConfig,
    transport: Option<TcpTransport>,
    state: SessionState,
    session_handle: u32,
    tns: u16,
    context: u64,
}

impl Connection {
    /// Creates a disconnected connection. No I/O happens until
    /// [`Connection::connect`].
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            state: SessionState::Disconnected,
            session_handle: 0,
            tns: 0,
            context: 0,
        }
    }

    /// Returns the current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the controller-assigned session handle, or 0 when no session
    /// is active.
    pub fn session_handle(&self) -> u32 {
        self.session_handle
    }

    /// Opens the transport and registers a session.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Connect` if the connection is not disconnected
    /// (a second `connect` without an intervening `close` is rejected), or
    /// if the transport handshake or session registration fails. On any
    /// failure the connection reverts to `Disconnected`.
    pub fn connect(&mut self) -> Result<()> {
        if self.state != SessionState::Disconnected {
            return Err(PcccError::connect(format!(
                "connect rejected: connection is {}",
                self.state
            )));
        }

        self.state = SessionState::Connecting;
        debug!("connecting to {}", self.config.plc_addr);
        match TcpTransport::connect(self.config.plc_addr, self.config.timeout) {
            Ok(transport) => self.transport = Some(transport),
            Err(e) => {
                self.state = SessionState::Disconnected;
                return Err(PcccError::connect(format!(
                    "transport connect failed: {}",
                    e
                )));
            }
        }

        self.state = SessionState::SessionPending;
        match self.register_session() {
            Ok(handle) => {
                self.session_handle = handle;
                self.state = SessionState::Active;
                debug!("session registered, handle 0x{:08X}", handle);
                Ok(())
            }
            Err(e) => {
                self.force_disconnect();
                Err(PcccError::connect(format!(
                    "session registration failed: {}",
                    e
                )))
            }
        }
    }

    fn register_session(&mut self) -> Result<u32> {
        let context = self.next_context();
        let header =
            EncapsulationHeader::new_request(EncapsulationCommand::RegisterSession, 0, context);
        let frame = encapsulation::encode(&header, &encapsulation::register_session_payload());
        self.send_frame(&frame)?;

        let reply = self.recv_frame()?;
        let (reply_header, _) = encapsulation::decode(&reply)?;
        if reply_header.command != EncapsulationCommand::RegisterSession {
            return Err(PcccError::frame(format!(
                "expected RegisterSession reply, got {:?}",
                reply_header.command
            )));
        }
        if reply_header.sender_context != context {
            return Err(PcccError::frame("sender context not echoed"));
        }
        if reply_header.session_handle == 0 {
            return Err(PcccError::connect("controller assigned a null session handle"));
        }
        Ok(reply_header.session_handle)
    }

    /// Closes the session and the transport.
    ///
    /// UnRegisterSession is sent best-effort and its reply ignored; the
    /// connection always ends up `Disconnected`, whatever the outcome.
    pub fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Disconnected {
            return Ok(());
        }

        self.state = SessionState::Closing;
        let context = self.next_context();
        let session_handle = self.session_handle;
        if let Some(transport) = self.transport.as_mut() {
            if session_handle != 0 {
                let header = EncapsulationHeader::new_request(
                    EncapsulationCommand::UnRegisterSession,
                    session_handle,
                    context,
                );
                let frame = encapsulation::encode(&header, &[]);
                if let Err(e) = transport.send(&frame) {
                    debug!("unregister send failed (ignored): {}", e);
                }
            }
            transport.shutdown();
        }

        self.transport = None;
        self.session_handle = 0;
        self.state = SessionState::Disconnected;
        debug!("session closed");
        Ok(())
    }

    /// Sends one PCCC command and blocks for its matching reply.
    ///
    /// Assigns the next transaction number and a fresh sender context,
    /// wraps the command through the CIP and encapsulation layers, and
    /// waits for the reply bearing the same transaction number. Frames
    /// correlating to an older exchange are discarded and waiting
    /// continues; nothing else is retried.
    ///
    /// # Errors
    ///
    /// - `PcccError::Connect` if the connection is not `Active`
    /// - `PcccError::Timeout` if no matching reply arrives in the window;
    ///   the connection is forced to `Disconnected`
    /// - `PcccError::Io` on transport failure, also forcing `Disconnected`
    /// - `PcccError::Plc` when the controller reports a nonzero status;
    ///   the session stays `Active`
    pub fn round_trip(&mut self, command: PcccCommand) -> Result<PcccReply> {
        if self.state != SessionState::Active {
            return Err(PcccError::connect(format!(
                "command rejected: connection is {}",
                self.state
            )));
        }

        let tns = self.next_tns();
        let context = self.next_context();
        let request = PcccRequest::new(command, tns);
        let envelope = cip::encode_unconnected_send(
            &request.to_bytes(),
            self.config.timeout.as_millis().min(u16::MAX as u128) as u16,
        );
        let header = EncapsulationHeader::new_request(
            EncapsulationCommand::SendRRData,
            self.session_handle,
            context,
        );
        let frame = encapsulation::encode(&header, &envelope);

        self.send_frame(&frame)?;
        let reply = self.await_reply(tns, context)?;
        reply.check_status()?;
        Ok(reply)
    }

    /// Waits for the reply matching `tns` and `context`, discarding stale
    /// frames, until the configured timeout is spent.
    fn await_reply(&mut self, tns: u16, context: u64) -> Result<PcccReply> {
        let deadline = Instant::now() + self.config.timeout;

        loop {
            if Instant::now() >= deadline {
                self.force_disconnect();
                return Err(PcccError::Timeout);
            }

            let frame = self.recv_frame()?;
            match self.parse_reply(&frame) {
                Ok(reply) => match reply.check_tns(tns) {
                    Ok(()) => return Ok(reply),
                    Err(stale) => {
                        debug!("discarding stale reply: {}", stale);
                        continue;
                    }
                },
                Err(PcccError::StaleReply { expected, received }) => {
                    debug!(
                        "discarding frame with stale context 0x{:04X} (expected 0x{:04X})",
                        received, expected
                    );
                    continue;
                }
                Err(e) => {
                    self.force_disconnect();
                    return Err(e);
                }
            }
        }
    }

    /// Decodes one received frame down to the PCCC reply.
    ///
    /// A frame whose sender context does not match the outstanding request
    /// is reported as stale so the caller can discard it.
    fn parse_reply(&self, frame: &[u8]) -> Result<PcccReply> {
        let (header, payload) = encapsulation::decode(frame)?;
        if header.command != EncapsulationCommand::SendRRData {
            return Err(PcccError::frame(format!(
                "expected SendRRData reply, got {:?}",
                header.command
            )));
        }
        if header.sender_context != self.context {
            // reported with the truncated contexts; only used for logging
            return Err(PcccError::stale_reply(
                self.context as u16,
                header.sender_context as u16,
            ));
        }
        let (_, data_item) = cip::decode(payload)?;
        PcccReply::from_bytes(&data_item.data)
    }

    fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        let result = match self.transport.as_mut() {
            Some(transport) => transport.send(frame),
            None => Err(PcccError::connect("transport is not open")),
        };
        if result.is_err() {
            self.force_disconnect();
        }
        result
    }

    /// Reads one complete encapsulation frame: the fixed header, then the
    /// number of payload bytes the header declares.
    fn recv_frame(&mut self) -> Result<Vec<u8>> {
        let result = (|| {
            let transport = self
                .transport
                .as_mut()
                .ok_or_else(|| PcccError::connect("transport is not open"))?;

            let mut frame = vec![0u8; ENCAPSULATION_HEADER_SIZE];
            transport.recv_exact(&mut frame)?;
            let header = EncapsulationHeader::from_bytes(&frame)?;
            frame.resize(ENCAPSULATION_HEADER_SIZE + header.length as usize, 0);
            transport.recv_exact(&mut frame[ENCAPSULATION_HEADER_SIZE..])?;
            Ok(frame)
        })();
        if result.is_err() {
            self.force_disconnect();
        }
        result
    }

    /// Tears the connection down after a session-level failure.
    fn force_disconnect(&mut self) {
        if self.state != SessionState::Disconnected {
            warn!("forcing disconnect from state {}", self.state);
        }
        if let Some(transport) = self.transport.take() {
            transport.shutdown();
        }
        self.session_handle = 0;
        self.state = SessionState::Disconnected;
    }

    fn next_tns(&mut self) -> u16 {
        self.tns = self.tns.wrapping_add(1);
        self.tns
    }

    fn next_context(&mut self) -> u64 {
        self.context = self.context.wrapping_add(1);
        self.context
    }

    // ------------------------------------------------------------------
    // Typed data operations
    // ------------------------------------------------------------------

    /// Reads `count` elements as raw 16-bit words.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Address` for invalid addressing, plus the
    /// [`Connection::round_trip`] error kinds.
    pub fn read_words(&mut self, address: PlcAddress, count: u16) -> Result<Vec<u16>> {
        let command = PcccCommand::typed_read(address, count)?;
        let expected = command.expected_reply_size();
        let reply = self.round_trip(command)?;
        if let Some(size) = expected {
            reply.check_payload_size(size)?;
        }
        reply.to_words()
    }

    /// Writes raw 16-bit words starting at `address`.
    pub fn write_words(&mut self, address: PlcAddress, words: &[u16]) -> Result<()> {
        let mut data = Vec::with_capacity(words.len() * 2);
        for word in words {
            data.extend_from_slice(&word.to_le_bytes());
        }
        self.round_trip(PcccCommand::typed_write(address, data)?)?;
        Ok(())
    }

    /// Reads `count` elements from an N file as signed integers.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use ab_pccc::{ClientConfig, Connection};
    /// # use std::net::{IpAddr, Ipv4Addr};
    /// # let mut plc = Connection::new(ClientConfig::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100))));
    /// # plc.connect()?;
    /// // N7:0 through N7:9
    /// let values = plc.read_integers(7, 0, 10)?;
    /// # Ok::<(), ab_pccc::PcccError>(())
    /// ```
    pub fn read_integers(&mut self, file_number: u8, element: u16, count: u16) -> Result<Vec<i16>> {
        let address = PlcAddress::new(file_number, FileType::Integer, element)?;
        let command = PcccCommand::typed_read(address, count)?;
        let expected = command.expected_reply_size();
        let reply = self.round_trip(command)?;
        if let Some(size) = expected {
            reply.check_payload_size(size)?;
        }
        reply.to_integers()
    }

    /// Reads a single N file element.
    pub fn read_integer(&mut self, file_number: u8, element: u16) -> Result<i16> {
        let values = self.read_integers(file_number, element, 1)?;
        values
            .first()
            .copied()
            .ok_or_else(|| PcccError::frame("empty integer reply"))
    }

    /// Writes signed integers to an N file.
    pub fn write_integers(&mut self, file_number: u8, element: u16, values: &[i16]) -> Result<()> {
        let address = PlcAddress::new(file_number, FileType::Integer, element)?;
        let words: Vec<u16> = values.iter().map(|&v| v as u16).collect();
        self.write_words(address, &words)
    }

    /// Reads one F file element, combining its two 16-bit halves.
    pub fn read_float(&mut self, file_number: u8, element: u16) -> Result<f32> {
        let address = PlcAddress::new(file_number, FileType::Float, element)?;
        let command = PcccCommand::typed_read(address, 1)?;
        let reply = self.round_trip(command)?;
        reply.to_float()
    }

    /// Writes one F file element as two 16-bit halves.
    pub fn write_float(&mut self, file_number: u8, element: u16, value: f32) -> Result<()> {
        let address = PlcAddress::new(file_number, FileType::Float, element)?;
        let (hi, lo) = utils::float_to_words(value);
        let mut data = Vec::with_capacity(4);
        data.extend_from_slice(&hi.to_le_bytes());
        data.extend_from_slice(&lo.to_le_bytes());
        self.round_trip(PcccCommand::typed_write(address, data)?)?;
        Ok(())
    }

    /// Reads a single bit, addressed by a `PlcAddress` carrying a bit index
    /// (see [`PlcAddress::with_bit`]).
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Address` if the address has no bit index.
    pub fn read_bit(&mut self, address: PlcAddress) -> Result<bool> {
        let bit = require_bit(address)?;
        let words = self.read_words(address, 1)?;
        let word = *words
            .first()
            .ok_or_else(|| PcccError::frame("empty bit-read reply"))?;
        Ok(utils::get_bit(word, bit))
    }

    /// Writes a single bit via read-modify-write.
    ///
    /// Two round trips: the containing word is read, the bit patched, and
    /// the word written back. Other bits changed by the controller in
    /// between are overwritten.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Address` if the address has no bit index.
    pub fn write_bit(&mut self, address: PlcAddress, value: bool) -> Result<()> {
        let bit = require_bit(address)?;
        let words = self.read_words(address, 1)?;
        let word = *words
            .first()
            .ok_or_else(|| PcccError::frame("empty bit-read reply"))?;
        self.write_words(address, &[utils::set_bit(word, bit, value)])
    }

    /// Reads one ST file record and decodes it to a string.
    ///
    /// A string record is a length word followed by 82 characters stored
    /// two per word with their bytes swapped.
    pub fn read_string(&mut self, file_number: u8, element: u16) -> Result<String> {
        let address = PlcAddress::new(file_number, FileType::String, element)?;
        let command = PcccCommand::file_read(address, 1)?;
        let expected = command.expected_reply_size();
        let reply = self.round_trip(command)?;
        if let Some(size) = expected {
            reply.check_payload_size(size)?;
        }
        decode_string_record(&reply.data)
    }

    /// Writes a string to one ST file record.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Address` if the string exceeds
    /// [`MAX_STRING_LEN`] characters or contains non-ASCII characters.
    pub fn write_string(&mut self, file_number: u8, element: u16, value: &str) -> Result<()> {
        let address = PlcAddress::new(file_number, FileType::String, element)?;
        let record = encode_string_record(value)?;
        self.round_trip(PcccCommand::file_write(address, record)?)?;
        Ok(())
    }

    /// Requests the processor diagnostic status block.
    pub fn diagnostic_status(&mut self) -> Result<Vec<u8>> {
        let reply = self.round_trip(PcccCommand::Diagnostic)?;
        Ok(reply.data)
    }

    /// Reads raw bytes at a word offset using unprotected addressing.
    pub fn unprotected_read(&mut self, offset: u16, size: u8) -> Result<Vec<u8>> {
        let command = PcccCommand::UnprotectedRead { offset, size };
        let expected = command.expected_reply_size();
        let reply = self.round_trip(command)?;
        if let Some(size) = expected {
            reply.check_payload_size(size)?;
        }
        Ok(reply.data)
    }

    /// Writes raw bytes at a word offset using unprotected addressing.
    ///
    /// # Errors
    ///
    /// Returns `PcccError::Address` if `data` is empty or exceeds
    /// [`MAX_TRANSFER_BYTES`].
    pub fn unprotected_write(&mut self, offset: u16, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(PcccError::address("write data must not be empty"));
        }
        if data.len() > MAX_TRANSFER_BYTES {
            return Err(PcccError::address(format!(
                "{} byte transfer exceeds the {} byte command limit",
                data.len(),
                MAX_TRANSFER_BYTES
            )));
        }
        self.round_trip(PcccCommand::UnprotectedWrite {
            offset,
            data: data.to_vec(),
        })?;
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("plc_addr", &self.config.plc_addr)
            .field("state", &self.state)
            .field("session_handle", &self.session_handle)
            .finish()
    }
}

fn require_bit(address: PlcAddress) -> Result<u8> {
    address
        .bit
        .ok_or_else(|| PcccError::address(format!("{} carries no bit index", address)))
}

/// Decodes an 84-byte ST record: length word, then byte-swapped characters.
fn decode_string_record(record: &[u8]) -> Result<String> {
    if record.len() != FileType::String.element_size() {
        return Err(PcccError::frame(format!(
            "string record must be {} bytes, got {}",
            FileType::String.element_size(),
            record.len()
        )));
    }
    let len = u16::from_le_bytes([record[0], record[1]]) as usize;
    if len > MAX_STRING_LEN {
        return Err(PcccError::frame(format!(
            "string record declares {} characters, limit is {}",
            len, MAX_STRING_LEN
        )));
    }

    let mut chars = Vec::with_capacity(len);
    for pair in record[2..].chunks_exact(2) {
        // characters are stored swapped within each word
        chars.push(pair[1]);
        chars.push(pair[0]);
    }
    chars.truncate(len);
    Ok(chars.into_iter().map(|c| c as char).collect())
}

/// Encodes a string into an 84-byte ST record.
fn encode_string_record(value: &str) -> Result<Vec<u8>> {
    if !value.is_ascii() {
        return Err(PcccError::address("string data must be ASCII"));
    }
    if value.len() > MAX_STRING_LEN {
        return Err(PcccError::address(format!(
            "string of {} characters exceeds the record limit of {}",
            value.len(),
            MAX_STRING_LEN
        )));
    }

    let mut record = vec![0u8; FileType::String.element_size()];
    record[0..2].copy_from_slice(&(value.len() as u16).to_le_bytes());
    for (i, pair) in value.as_bytes().chunks(2).enumerate() {
        let hi = pair[0];
        let lo = pair.get(1).copied().unwrap_or(0);
        record[2 + i * 2] = lo;
        record[3 + i * 2] = hi;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::REPLY_CMD_FLAG;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::JoinHandle;

    /// Spawns a controller double on a loopback listener.
    fn spawn_controller<F>(handler: F) -> (SocketAddr, JoinHandle<()>)
    where
        F: FnOnce(TcpStream) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handler(stream);
        });
        (addr, handle)
    }

    fn test_config(addr: SocketAddr) -> ClientConfig {
        ClientConfig::new(addr.ip())
            .with_port(addr.port())
            .with_timeout(Duration::from_millis(500))
    }

    fn read_request(stream: &mut TcpStream) -> (EncapsulationHeader, Vec<u8>) {
        let mut head = [0u8; ENCAPSULATION_HEADER_SIZE];
        stream.read_exact(&mut head).unwrap();
        let header = EncapsulationHeader::from_bytes(&head).unwrap();
        let mut payload = vec![0u8; header.length as usize];
        stream.read_exact(&mut payload).unwrap();
        (header, payload)
    }

    /// Accepts a RegisterSession request and grants `handle`.
    fn grant_session(stream: &mut TcpStream, handle: u32) {
        let (header, _) = read_request(stream);
        assert_eq!(header.command, EncapsulationCommand::RegisterSession);
        let mut reply = header;
        reply.session_handle = handle;
        let frame = encapsulation::encode(&reply, &encapsulation::register_session_payload());
        stream.write_all(&frame).unwrap();
    }

    /// Answers one SendRRData request with the given PCCC reply tail
    /// (everything after Cmd and Sts), with an optionally overridden TNS.
    fn answer_pccc(stream: &mut TcpStream, status: u8, tns_override: Option<u16>, tail: &[u8]) {
        let (header, payload) = read_request(stream);
        assert_eq!(header.command, EncapsulationCommand::SendRRData);
        let (_, data_item) = cip::decode(&payload).unwrap();
        let request = PcccRequest::from_bytes(&data_item.data).unwrap();

        let mut fragment = Vec::new();
        fragment.push(request.command.cmd() | REPLY_CMD_FLAG);
        fragment.push(status);
        fragment.extend_from_slice(&tns_override.unwrap_or(request.tns).to_le_bytes());
        fragment.extend_from_slice(tail);

        let envelope = cip::encode_unconnected_send(&fragment, 5000);
        let frame = encapsulation::encode(&header, &envelope);
        stream.write_all(&frame).unwrap();
    }

    #[test]
    fn test_registration_reaches_active() {
        let (addr, controller) = spawn_controller(|mut stream| {
            grant_session(&mut stream, 0x0000_0001);
        });

        let mut plc = Connection::new(test_config(addr));
        assert_eq!(plc.state(), SessionState::Disconnected);
        plc.connect().unwrap();
        assert_eq!(plc.state(), SessionState::Active);
        assert_eq!(plc.session_handle(), 0x0000_0001);

        controller.join().unwrap();
    }

    #[test]
    fn test_double_connect_rejected() {
        let (addr, controller) = spawn_controller(|mut stream| {
            grant_session(&mut stream, 7);
            // keep the stream open while the second connect is attempted
            std::thread::sleep(Duration::from_millis(100));
        });

        let mut plc = Connection::new(test_config(addr));
        plc.connect().unwrap();

        let err = plc.connect().unwrap_err();
        assert!(matches!(err, PcccError::Connect { .. }));
        // the active session is untouched
        assert_eq!(plc.state(), SessionState::Active);

        controller.join().unwrap();
    }

    #[test]
    fn test_command_before_connect_rejected() {
        let config = ClientConfig::new(IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));
        let mut plc = Connection::new(config);
        let err = plc.read_integer(7, 0).unwrap_err();
        assert!(matches!(err, PcccError::Connect { .. }));
        assert_eq!(plc.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_null_session_handle_rejected() {
        let (addr, controller) = spawn_controller(|mut stream| {
            grant_session(&mut stream, 0);
        });

        let mut plc = Connection::new(test_config(addr));
        let err = plc.connect().unwrap_err();
        assert!(matches!(err, PcccError::Connect { .. }));
        assert_eq!(plc.state(), SessionState::Disconnected);

        controller.join().unwrap();
    }

    #[test]
    fn test_integer_read_scenario() {
        let (addr, controller) = spawn_controller(|mut stream| {
            grant_session(&mut stream, 1);
            // N7:0 = 5
            answer_pccc(&mut stream, 0x00, None, &[0x05, 0x00]);
        });

        let mut plc = Connection::new(test_config(addr));
        plc.connect().unwrap();
        assert_eq!(plc.read_integer(7, 0).unwrap(), 5);
        assert_eq!(plc.state(), SessionState::Active);

        controller.join().unwrap();
    }

    #[test]
    fn test_stale_reply_discarded_state_unchanged() {
        let (addr, controller) = spawn_controller(|mut stream| {
            grant_session(&mut stream, 1);

            // first a reply with a wrong transaction number, then the real one
            let (header, payload) = read_request(&mut stream);
            let (_, data_item) = cip::decode(&payload).unwrap();
            let request = PcccRequest::from_bytes(&data_item.data).unwrap();

            let stale_tns = request.tns.wrapping_sub(1);
            let mut stale = Vec::new();
            stale.push(request.command.cmd() | REPLY_CMD_FLAG);
            stale.push(0x00);
            stale.extend_from_slice(&stale_tns.to_le_bytes());
            stale.extend_from_slice(&[0xFF, 0xFF]);

            let mut good = Vec::new();
            good.push(request.command.cmd() | REPLY_CMD_FLAG);
            good.push(0x00);
            good.extend_from_slice(&request.tns.to_le_bytes());
            good.extend_from_slice(&[0x2A, 0x00]);

            for fragment in [stale, good] {
                let envelope = cip::encode_unconnected_send(&fragment, 5000);
                let frame = encapsulation::encode(&header, &envelope);
                stream.write_all(&frame).unwrap();
            }
        });

        let mut plc = Connection::new(test_config(addr));
        plc.connect().unwrap();
        assert_eq!(plc.read_integer(7, 0).unwrap(), 42);
        assert_eq!(plc.state(), SessionState::Active);

        controller.join().unwrap();
    }

    #[test]
    fn test_extended_status_surfaces_code() {
        let (addr, controller) = spawn_controller(|mut stream| {
            grant_session(&mut stream, 1);
            // status 0xF0, extended-status byte 0x10
            answer_pccc(&mut stream, 0xF0, None, &[0x10]);
        });

        let mut plc = Connection::new(test_config(addr));
        plc.connect().unwrap();
        match plc.read_integer(7, 0).unwrap_err() {
            PcccError::Plc { code } => assert_eq!(code, 0x10),
            other => panic!("expected Plc error, got {:?}", other),
        }
        // a controller error is not a session failure
        assert_eq!(plc.state(), SessionState::Active);

        controller.join().unwrap();
    }

    #[test]
    fn test_plain_error_status_surfaces_code() {
        let (addr, controller) = spawn_controller(|mut stream| {
            grant_session(&mut stream, 1);
            answer_pccc(&mut stream, 0x30, None, &[]);
        });

        let mut plc = Connection::new(test_config(addr));
        plc.connect().unwrap();
        match plc.read_integer(7, 0).unwrap_err() {
            PcccError::Plc { code } => assert_eq!(code, 0x30),
            other => panic!("expected Plc error, got {:?}", other),
        }

        controller.join().unwrap();
    }

    #[test]
    fn test_timeout_forces_disconnect() {
        let (addr, controller) = spawn_controller(|mut stream| {
            grant_session(&mut stream, 1);
            // swallow the data request and never answer
            let _ = read_request(&mut stream);
            std::thread::sleep(Duration::from_millis(700));
        });

        let mut plc = Connection::new(test_config(addr));
        plc.connect().unwrap();
        let err = plc.read_integer(7, 0).unwrap_err();
        assert!(matches!(err, PcccError::Timeout));
        assert_eq!(plc.state(), SessionState::Disconnected);

        controller.join().unwrap();
    }

    #[test]
    fn test_close_returns_to_disconnected() {
        let (addr, controller) = spawn_controller(|mut stream| {
            grant_session(&mut stream, 1);
            // the unregister frame may or may not be readable before the
            // client shuts the stream down; drain whatever arrives
            let mut sink = Vec::new();
            let _ = stream.read_to_end(&mut sink);
        });

        let mut plc = Connection::new(test_config(addr));
        plc.connect().unwrap();
        plc.close().unwrap();
        assert_eq!(plc.state(), SessionState::Disconnected);
        assert_eq!(plc.session_handle(), 0);

        // close is idempotent
        plc.close().unwrap();

        controller.join().unwrap();
    }

    #[test]
    fn test_reconnect_after_close() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let controller = std::thread::spawn(move || {
            for _ in 0..2 {
                let (mut stream, _) = listener.accept().unwrap();
                grant_session(&mut stream, 3);
                let mut sink = Vec::new();
                let _ = stream.read_to_end(&mut sink);
            }
        });

        let mut plc = Connection::new(test_config(addr));
        plc.connect().unwrap();
        plc.close().unwrap();
        plc.connect().unwrap();
        assert_eq!(plc.state(), SessionState::Active);
        plc.close().unwrap();

        controller.join().unwrap();
    }

    #[test]
    fn test_string_record_roundtrip() {
        let record = encode_string_record("PRODUCT-001").unwrap();
        assert_eq!(record.len(), 84);
        assert_eq!(u16::from_le_bytes([record[0], record[1]]), 11);
        // first word pair is swapped: "PR" stored as 'R','P'
        assert_eq!(record[2], b'R');
        assert_eq!(record[3], b'P');
        assert_eq!(decode_string_record(&record).unwrap(), "PRODUCT-001");
    }

    #[test]
    fn test_string_record_odd_length() {
        let record = encode_string_record("ABC").unwrap();
        assert_eq!(decode_string_record(&record).unwrap(), "ABC");
    }

    #[test]
    fn test_string_record_limits() {
        let long = "x".repeat(MAX_STRING_LEN + 1);
        assert!(matches!(
            encode_string_record(&long).unwrap_err(),
            PcccError::Address { .. }
        ));
        assert!(encode_string_record(&"y".repeat(MAX_STRING_LEN)).is_ok());

        let mut record = encode_string_record("ok").unwrap();
        record[0] = 0xFF; // claim 255 characters
        assert!(decode_string_record(&record).is_err());
    }

    #[test]
    fn test_bit_read_requires_bit_index() {
        let config = ClientConfig::new(IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));
        let mut plc = Connection::new(config);
        let address = PlcAddress::new(3, FileType::Bit, 0).unwrap();
        // the bit index is checked before the connection state
        let err = plc.read_bit(address).unwrap_err();
        assert!(matches!(err, PcccError::Address { .. }));
    }

    #[test]
    fn test_bit_read_masks_word() {
        let (addr, controller) = spawn_controller(|mut stream| {
            grant_session(&mut stream, 1);
            // B3:0 = 0b0000_0000_0010_0000
            answer_pccc(&mut stream, 0x00, None, &[0x20, 0x00]);
        });

        let mut plc = Connection::new(test_config(addr));
        plc.connect().unwrap();
        let b3_0_5 = PlcAddress::new(3, FileType::Bit, 0)
            .unwrap()
            .with_bit(5)
            .unwrap();
        assert!(plc.read_bit(b3_0_5).unwrap());

        controller.join().unwrap();
    }
}
