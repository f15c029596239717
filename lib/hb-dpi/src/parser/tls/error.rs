/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use super::{ClientHelloParseError, HandshakeCoalesceError};

#[derive(Debug, Error)]
pub enum TlsParseError {
    #[error("invalid content type {0} in the first record")]
    InvalidContentType(u8),
    #[error("implausible record version {0:#06x}")]
    ImplausibleVersion(u16),
    #[error("invalid handshake message type {0}")]
    InvalidMessageType(u8),
    #[error("too large handshake message size {0}")]
    TooLargeMessage(u32),
    #[error("invalid client hello: {0}")]
    ClientHello(#[from] ClientHelloParseError),
}

impl From<HandshakeCoalesceError> for TlsParseError {
    fn from(value: HandshakeCoalesceError) -> Self {
        match value {
            HandshakeCoalesceError::TooLargeMessageSize(n) => TlsParseError::TooLargeMessage(n),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientHelloReadError {
    #[error("tls: unsupported SSLv2 handshake received")]
    LegacySslV2,
    #[error("not a tls packet: {0}")]
    NotTls(#[from] TlsParseError),
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

impl From<ClientHelloParseError> for ClientHelloReadError {
    fn from(value: ClientHelloParseError) -> Self {
        ClientHelloReadError::NotTls(TlsParseError::ClientHello(value))
    }
}

impl From<HandshakeCoalesceError> for ClientHelloReadError {
    fn from(value: HandshakeCoalesceError) -> Self {
        ClientHelloReadError::NotTls(value.into())
    }
}
