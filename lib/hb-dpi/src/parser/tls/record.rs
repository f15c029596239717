/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::TlsParseError;

/// The only record type a client may start with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ContentType {
    Handshake = 22, // 0x16
}

#[derive(Debug, Error)]
pub enum RecordParseError {
    #[error("need more data of size {0}")]
    NeedMoreData(usize),
    #[error("unsupported SSLv2 handshake received")]
    LegacySslV2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    pub content_type: u8,
    pub version: u16,
    pub fragment_len: u16,
}

impl RecordHeader {
    pub const SIZE: usize = 5;

    /// No valid TLS record has a type of 0x80. SSLv2 handshakes start with a
    /// 2 bytes length with the MSB set, and the first record is always less
    /// than 256 bytes long, so this first byte strongly suggests an SSLv2 client.
    pub const SSLV2_MARKER: u8 = 0x80;

    /// The record version of every real SSL/TLS/TLCP version is far below this.
    pub const IMPLAUSIBLE_VERSION: u16 = 0x1000;

    pub fn parse(data: &[u8]) -> Result<Self, RecordParseError> {
        if data.len() < Self::SIZE {
            return Err(RecordParseError::NeedMoreData(Self::SIZE - data.len()));
        }

        if data[0] == Self::SSLV2_MARKER {
            return Err(RecordParseError::LegacySslV2);
        }

        Ok(RecordHeader {
            content_type: data[0],
            version: u16::from_be_bytes([data[1], data[2]]),
            fragment_len: u16::from_be_bytes([data[3], data[4]]),
        })
    }

    /// Be extra suspicious about the first record, as the peer might not be a
    /// TLS client at all. This is checked before the record body is read.
    pub fn check_first(&self) -> Result<(), TlsParseError> {
        if self.content_type != ContentType::Handshake as u8 {
            return Err(TlsParseError::InvalidContentType(self.content_type));
        }
        if self.version >= Self::IMPLAUSIBLE_VERSION {
            return Err(TlsParseError::ImplausibleVersion(self.version));
        }
        Ok(())
    }

    /// Get the total length of this record on the wire
    #[inline]
    pub fn encoded_len(&self) -> usize {
        Self::SIZE + self.fragment_len as usize
    }
}
