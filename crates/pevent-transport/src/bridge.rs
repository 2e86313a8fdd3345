//! Unix-socket bridge to a management controller.
//!
//! Every message travels in a small envelope:
//! ```text
//! ┌────────────┬───────────┬──────────────────┐
//! │ Magic (2B) │ Length    │ Body             │
//! │ "PE"       │ (2B LE)   │ (Length bytes)   │
//! └────────────┴───────────┴──────────────────┘
//! ```
//! A request body is `[netfn, cmd, data...]`; a response body is
//! `[completion_code, data...]`.

use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, warn};

use crate::error::{Result, TransportError};
use crate::message::{ChannelMedium, PrivilegeLevel, Request, Response};
use crate::stream::BridgeStream;
use crate::traits::{query_channel_medium, MediumResolver, PrivilegeNegotiator, Transport};

/// Envelope magic: "PE" (0x50 0x45).
pub const ENVELOPE_MAGIC: [u8; 2] = [0x50, 0x45];

/// Envelope header: magic (2) + length (2).
pub const ENVELOPE_HEADER_SIZE: usize = 4;

/// Largest body accepted in either direction.
pub const MAX_ENVELOPE_BODY: usize = 1024;

/// Append one envelope carrying `body` to `dst`.
pub fn encode_envelope(body: &[u8], dst: &mut BytesMut) -> Result<()> {
    if body.len() > MAX_ENVELOPE_BODY {
        return Err(TransportError::PayloadTooLarge {
            size: body.len(),
            max: MAX_ENVELOPE_BODY,
        });
    }
    dst.reserve(ENVELOPE_HEADER_SIZE + body.len());
    dst.put_slice(&ENVELOPE_MAGIC);
    dst.put_u16_le(body.len() as u16);
    dst.put_slice(body);
    Ok(())
}

/// Read one envelope body from `src`.
///
/// Returns `Ok(None)` if the stream is closed before any header byte arrives.
pub fn read_envelope<R: Read>(src: &mut R) -> Result<Option<Bytes>> {
    let mut header = [0u8; ENVELOPE_HEADER_SIZE];
    let mut filled = 0;
    while filled < ENVELOPE_HEADER_SIZE {
        match src.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(TransportError::InvalidEnvelope("truncated header")),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }

    if header[0..2] != ENVELOPE_MAGIC {
        return Err(TransportError::InvalidEnvelope("bad magic"));
    }

    let len = u16::from_le_bytes([header[2], header[3]]) as usize;
    if len > MAX_ENVELOPE_BODY {
        return Err(TransportError::PayloadTooLarge {
            size: len,
            max: MAX_ENVELOPE_BODY,
        });
    }

    let mut body = vec![0u8; len];
    src.read_exact(&mut body).map_err(|err| match err.kind() {
        ErrorKind::UnexpectedEof => TransportError::InvalidEnvelope("truncated body"),
        _ => TransportError::Io(err),
    })?;
    Ok(Some(Bytes::from(body)))
}

fn encode_request(request: &Request) -> Result<BytesMut> {
    let mut body = BytesMut::with_capacity(2 + request.data.len());
    body.put_u8(request.netfn);
    body.put_u8(request.cmd);
    body.put_slice(&request.data);
    let mut wire = BytesMut::new();
    encode_envelope(&body, &mut wire)?;
    Ok(wire)
}

fn decode_request(mut body: Bytes) -> Result<Request> {
    if body.len() < 2 {
        return Err(TransportError::InvalidEnvelope("request body shorter than 2 bytes"));
    }
    let head = body.split_to(2);
    Ok(Request::new(head[0], head[1], body))
}

fn encode_response(response: &Response) -> Result<BytesMut> {
    let mut body = BytesMut::with_capacity(1 + response.data.len());
    body.put_u8(response.completion_code);
    body.put_slice(&response.data);
    let mut wire = BytesMut::new();
    encode_envelope(&body, &mut wire)?;
    Ok(wire)
}

fn decode_response(mut body: Bytes) -> Result<Response> {
    if body.is_empty() {
        return Err(TransportError::InvalidEnvelope("empty response body"));
    }
    let ccode = body.split_to(1)[0];
    Ok(Response::new(ccode, body))
}

/// Configuration for [`UnixBridge`].
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    /// How long to wait for a response. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,
    /// Write timeout for requests.
    pub write_timeout: Option<Duration>,
    /// Skip the Get Channel Info query and use this medium.
    pub medium_override: Option<ChannelMedium>,
}

/// Client side of the management bridge.
///
/// An exchange that ends without a complete reply leaves the stream unusable:
/// a late reply would otherwise be read as the answer to the next request.
/// The next request opens a fresh connection first.
#[derive(Debug)]
pub struct UnixBridge {
    stream: BridgeStream,
    path: PathBuf,
    stale: bool,
    config: BridgeConfig,
    privilege: PrivilegeLevel,
    medium: Option<ChannelMedium>,
}

impl UnixBridge {
    /// Connect with default configuration.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self> {
        Self::connect_with_config(path, BridgeConfig::default())
    }

    /// Connect and apply timeouts from `config`.
    pub fn connect_with_config(path: impl AsRef<Path>, config: BridgeConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let stream = open_stream(&path, &config)?;
        Ok(Self {
            stream,
            path,
            stale: false,
            medium: config.medium_override,
            config,
            privilege: PrivilegeLevel::User,
        })
    }

    /// Privilege currently requested for this session.
    pub fn privilege(&self) -> PrivilegeLevel {
        self.privilege
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn reconnect(&mut self) -> Result<()> {
        debug!(path = %self.path.display(), "reconnecting after an unfinished exchange");
        self.stream = open_stream(&self.path, &self.config)?;
        self.stale = false;
        Ok(())
    }

    fn exchange(&mut self, wire: &[u8]) -> Result<Option<Bytes>> {
        self.stream.write_all(wire)?;
        self.stream.flush()?;
        read_envelope(&mut self.stream)
    }
}

fn open_stream(path: &Path, config: &BridgeConfig) -> Result<BridgeStream> {
    let stream = BridgeStream::connect(path)?;
    stream.set_read_timeout(config.read_timeout)?;
    stream.set_write_timeout(config.write_timeout)?;
    Ok(stream)
}

impl Transport for UnixBridge {
    fn send_recv(&mut self, request: &Request) -> Result<Option<Response>> {
        let wire = encode_request(request)?;
        if self.stale {
            self.reconnect()?;
        }
        debug!(
            netfn = request.netfn,
            cmd = request.cmd,
            len = request.data.len(),
            "bridge request"
        );

        let reply = self.exchange(&wire);
        if !matches!(reply, Ok(Some(_))) {
            self.stale = true;
        }
        match reply {
            Ok(Some(body)) => decode_response(body).map(Some),
            Ok(None) => {
                warn!("bridge closed before responding");
                Ok(None)
            }
            Err(TransportError::Io(err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                warn!(timeout = ?self.config.read_timeout, "no response from bridge");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

impl MediumResolver for UnixBridge {
    fn current_channel_medium(&mut self) -> Result<ChannelMedium> {
        if let Some(medium) = self.medium {
            return Ok(medium);
        }
        let medium = query_channel_medium(self)?;
        self.medium = Some(medium);
        Ok(medium)
    }
}

impl PrivilegeNegotiator for UnixBridge {
    fn set_privilege_level(&mut self, level: PrivilegeLevel) {
        debug!(privilege = level.name(), "session privilege level set");
        self.privilege = level;
    }
}

/// Server side of one bridge client connection.
#[derive(Debug)]
pub struct BridgeConnection {
    stream: BridgeStream,
}

impl BridgeConnection {
    pub(crate) fn new(stream: BridgeStream) -> Self {
        Self { stream }
    }

    /// Read the next request. `Ok(None)` when the client disconnects.
    pub fn recv_request(&mut self) -> Result<Option<Request>> {
        match read_envelope(&mut self.stream)? {
            Some(body) => decode_request(body).map(Some),
            None => Ok(None),
        }
    }

    /// Write a response for the last request.
    pub fn send_response(&mut self, response: &Response) -> Result<()> {
        let wire = encode_response(response)?;
        self.stream.write_all(&wire)?;
        self.stream.flush()?;
        Ok(())
    }

    /// `(uid, gid, pid)` of the connected client, where available.
    pub fn peer_credentials(&self) -> Option<(u32, u32, u32)> {
        self.stream.peer_credentials()
    }
}
