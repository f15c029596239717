/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use bytes::{Bytes, BytesMut};
use thiserror::Error;

use super::cursor::ByteCursor;

mod client_hello;
pub use client_hello::{ClientHello, ClientHelloParseError};

/// https://datatracker.ietf.org/doc/html/rfc8446#appendix-B.3
#[repr(u8)]
#[non_exhaustive]
pub enum HandshakeType {
    ClientHello = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandshakeHeader {
    pub msg_type: u8,
    pub msg_length: u32,
}

impl HandshakeHeader {
    pub const SIZE: usize = 4;

    /// Try to parse the data as a HandshakeHeader
    pub fn try_parse(data: &[u8]) -> Option<Self> {
        let mut c = ByteCursor::new(data);
        let msg_type = c.read_u8()?;
        let msg_length = c.read_u24()?;
        Some(HandshakeHeader {
            msg_type,
            msg_length,
        })
    }

    /// Get the capacity needed to hold the encoded Handshake message
    pub fn encoded_cap(&self) -> usize {
        Self::SIZE + self.msg_length as usize
    }
}

pub struct HandshakeMessage {
    header: HandshakeHeader,
    msg_data: Bytes,
}

impl HandshakeMessage {
    #[inline]
    pub fn header(&self) -> &HandshakeHeader {
        &self.header
    }

    /// Get the total length of this message on the wire
    pub fn encoded_len(&self) -> usize {
        self.msg_data.len()
    }

    /// Parse this message as a ClientHello message
    pub fn parse_client_hello(self) -> Result<ClientHello, ClientHelloParseError> {
        ClientHello::parse(self.msg_data)
    }
}

#[derive(Debug, Error)]
pub enum HandshakeCoalesceError {
    #[error("too large message size {0}")]
    TooLargeMessageSize(u32),
}

/// Join the handshake fragments carried by consecutive records.
pub struct HandshakeCoalescer {
    max_message_size: u32,
    header: Option<HandshakeHeader>,
    buf: BytesMut,
}

impl Default for HandshakeCoalescer {
    fn default() -> Self {
        HandshakeCoalescer::new(1 << 14)
    }
}

impl HandshakeCoalescer {
    pub fn new(max_message_size: u32) -> Self {
        HandshakeCoalescer {
            max_message_size,
            header: None,
            buf: BytesMut::new(),
        }
    }

    pub fn coalesce_fragment(&mut self, data: &[u8]) -> Result<(), HandshakeCoalesceError> {
        self.buf.extend_from_slice(data);
        if self.header.is_some() {
            return Ok(());
        }

        if let Some(hdr) = HandshakeHeader::try_parse(&self.buf) {
            if hdr.msg_length > self.max_message_size {
                return Err(HandshakeCoalesceError::TooLargeMessageSize(hdr.msg_length));
            }
            let cap = hdr.encoded_cap();
            if cap > self.buf.len() {
                self.buf.reserve(cap - self.buf.len());
            }
            self.header = Some(hdr);
        }
        Ok(())
    }

    #[inline]
    pub fn header(&self) -> Option<&HandshakeHeader> {
        self.header.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Take the first message out if all of its fragments have arrived.
    ///
    /// Handshake data after the first message is dropped.
    pub fn take_message(&mut self) -> Option<HandshakeMessage> {
        let hdr = self.header?;
        let cap = hdr.encoded_cap();
        if self.buf.len() < cap {
            return None;
        }

        let msg_data = self.buf.split_to(cap).freeze();
        self.buf.clear();
        self.header = None;
        Some(HandshakeMessage {
            header: hdr,
            msg_data,
        })
    }
}
