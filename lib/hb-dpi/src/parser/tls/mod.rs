/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

mod cursor;

mod error;
pub use error::{ClientHelloReadError, TlsParseError};

mod record;
pub use record::{ContentType, RecordHeader, RecordParseError};

mod handshake;
pub use handshake::{
    ClientHello, ClientHelloParseError, HandshakeCoalesceError, HandshakeCoalescer,
    HandshakeHeader, HandshakeMessage, HandshakeType,
};

mod extension;
pub use extension::{ExtensionParseError, ExtensionType};

mod reader;
pub use reader::{ClientHelloReader, read_client_hello};

#[cfg(test)]
mod tests;
