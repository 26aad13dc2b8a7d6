//! TCP request/response client for cell reports.
//!
//! One connection per exchange. Both directions use frames prefixed with a
//! big-endian `u32` length. The request carries `"{prefix}/{place}"`, the
//! response carries a report payload or nothing.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use super::{CellReport, MapFetch, decode_payload};
use crate::error::{NavError, Result};

/// Upper bound on a response frame.
const MAX_FRAME_LEN: usize = 4096;

/// Fetches cell reports from a TCP map server.
pub struct TcpMapFetcher {
    address: SocketAddr,
    prefix: String,
    timeout: Duration,
}

impl TcpMapFetcher {
    pub fn new(address: &str, prefix: &str, timeout: Duration) -> Result<Self> {
        let address: SocketAddr = address
            .parse()
            .map_err(|e| NavError::Config(format!("Invalid telemetry address: {}", e)))?;

        Ok(Self {
            address,
            prefix: prefix.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Full request name for a place.
    pub fn request_name(&self, place: &str) -> String {
        format!("{}/{}", self.prefix, place)
    }

    fn exchange(&self, name: &str) -> std::io::Result<Vec<u8>> {
        let mut stream = TcpStream::connect_timeout(&self.address, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        write_frame(&mut stream, name.as_bytes())?;
        read_frame(&mut stream)
    }
}

impl MapFetch for TcpMapFetcher {
    fn fetch(&mut self, place: &str) -> Result<Option<CellReport>> {
        let name = self.request_name(place);
        let payload = match self.exchange(&name) {
            Ok(payload) => payload,
            Err(e) if is_timeout(&e) => {
                tracing::trace!("Fetch {} timed out", name);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if payload.is_empty() {
            return Ok(None);
        }

        let text = std::str::from_utf8(&payload)
            .map_err(|e| NavError::Protocol(format!("report is not UTF-8: {}", e)))?;
        decode_payload(text).map(Some)
    }
}

fn is_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock)
}

/// Write a length-prefixed frame.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> std::io::Result<()> {
    let len = payload.len() as u32;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    writer.flush()
}

/// Read a length-prefixed frame.
pub fn read_frame<R: Read>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf) as usize;

    if len > MAX_FRAME_LEN {
        return Err(std::io::Error::new(
            ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds {}", len, MAX_FRAME_LEN),
        ));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}
