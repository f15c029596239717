/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use bytes::Bytes;
use thiserror::Error;

use super::HandshakeHeader;
use crate::parser::tls::cursor::ByteCursor;
use crate::parser::tls::extension::{self, Extension};
use crate::parser::tls::{ExtensionParseError, ExtensionType};

#[derive(Debug, Error)]
pub enum ClientHelloParseError {
    #[error("message too short ({0} bytes)")]
    MessageTooShort(usize),
    #[error("truncated {0}")]
    Truncated(&'static str),
    #[error("invalid session id length {0}")]
    InvalidSessionIdLength(u8),
    #[error("invalid cipher suites length {0}")]
    InvalidCipherSuitesLength(u16),
    #[error("extensions length {declared} mismatch with the {remaining} bytes left")]
    InvalidExtensionsLength { declared: u16, remaining: usize },
    #[error("invalid extension {0:?}: {1}")]
    InvalidExtension(ExtensionType, ExtensionParseError),
}

/// A decoded ClientHello message.
///
/// All byte fields share the buffer of the raw message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientHello {
    raw: Bytes,
    legacy_version: u16,
    random: Bytes,
    session_id: Bytes,
    cipher_suites: Vec<u16>,
    compression_methods: Bytes,
    server_name: Option<String>,
    next_proto_neg: bool,
    ocsp_stapling: bool,
    supported_curves: Vec<u16>,
    supported_points: Bytes,
    ticket_supported: bool,
    session_ticket: Bytes,
    alpn_protocols: Vec<Bytes>,
    supported_versions: Vec<u16>,
}

impl ClientHello {
    /// handshake header + version + random + session id length
    /// + cipher suites length + compression methods length
    pub const MIN_LEN: usize = HandshakeHeader::SIZE + 2 + 32 + 1 + 2 + 1;

    const RANDOM_LEN: usize = 32;
    const MAX_SESSION_ID_LEN: u8 = 32;

    /// Decode a full handshake message, including the 4 bytes handshake header.
    ///
    /// The caller should make sure the message type is ClientHello and the
    /// data is exactly as long as the handshake header declares.
    pub fn parse(raw: Bytes) -> Result<Self, ClientHelloParseError> {
        if raw.len() < Self::MIN_LEN {
            return Err(ClientHelloParseError::MessageTooShort(raw.len()));
        }

        let mut c = ByteCursor::new(&raw);
        c.take(HandshakeHeader::SIZE)
            .ok_or(ClientHelloParseError::Truncated("handshake header"))?;

        let legacy_version = c
            .read_u16()
            .ok_or(ClientHelloParseError::Truncated("legacy version"))?;
        let random = c
            .take(Self::RANDOM_LEN)
            .ok_or(ClientHelloParseError::Truncated("random"))?;

        // Session ID
        let session_id_len = c
            .read_u8()
            .ok_or(ClientHelloParseError::Truncated("session id length"))?;
        if session_id_len > Self::MAX_SESSION_ID_LEN {
            return Err(ClientHelloParseError::InvalidSessionIdLength(session_id_len));
        }
        let session_id = c
            .take(session_id_len as usize)
            .ok_or(ClientHelloParseError::Truncated("session id"))?;

        // Cipher Suites, each of which is a u16
        let cipher_suites_len = c
            .read_u16()
            .ok_or(ClientHelloParseError::Truncated("cipher suites length"))?;
        if cipher_suites_len & 0x01 != 0 {
            return Err(ClientHelloParseError::InvalidCipherSuitesLength(
                cipher_suites_len,
            ));
        }
        let cipher_suites = c
            .take(cipher_suites_len as usize)
            .ok_or(ClientHelloParseError::Truncated("cipher suites"))?
            .chunks_exact(2)
            .map(|v| u16::from_be_bytes([v[0], v[1]]))
            .collect();

        // Compression Methods
        let compression_methods = c
            .take_u8_prefixed()
            .ok_or(ClientHelloParseError::Truncated("compression methods"))?;

        let mut ch = ClientHello {
            legacy_version,
            random: raw.slice_ref(random),
            session_id: raw.slice_ref(session_id),
            cipher_suites,
            compression_methods: raw.slice_ref(compression_methods),
            server_name: None,
            next_proto_neg: false,
            ocsp_stapling: false,
            supported_curves: Vec::new(),
            supported_points: Bytes::new(),
            ticket_supported: false,
            session_ticket: Bytes::new(),
            alpn_protocols: Vec::new(),
            supported_versions: Vec::new(),
            raw: Bytes::new(),
        };

        if !c.is_empty() {
            // Extensions are optional
            let extensions_len = c
                .read_u16()
                .ok_or(ClientHelloParseError::Truncated("extensions length"))?;
            if extensions_len as usize != c.remaining() {
                return Err(ClientHelloParseError::InvalidExtensionsLength {
                    declared: extensions_len,
                    remaining: c.remaining(),
                });
            }
            ch.parse_extensions(&raw, c)?;
        }

        ch.raw = raw;
        Ok(ch)
    }

    fn parse_extensions(
        &mut self,
        raw: &Bytes,
        mut c: ByteCursor<'_>,
    ) -> Result<(), ClientHelloParseError> {
        while !c.is_empty() {
            let ext = Extension::parse(&mut c)
                .ok_or(ClientHelloParseError::Truncated("extension header"))?
                .map_err(|(t, e)| ClientHelloParseError::InvalidExtension(t, e))?;
            self.apply_extension(raw, &ext)
                .map_err(|e| ClientHelloParseError::InvalidExtension(ext.ext_type, e))?;
        }
        Ok(())
    }

    fn apply_extension(
        &mut self,
        raw: &Bytes,
        ext: &Extension<'_>,
    ) -> Result<(), ExtensionParseError> {
        let data = ext.ext_data;
        match ext.ext_type {
            ExtensionType::ServerName => {
                if let Some(name) = extension::parse_server_name(data)? {
                    self.server_name = Some(String::from_utf8_lossy(name).into_owned());
                }
            }
            ExtensionType::NextProtocolNegotiation => {
                extension::parse_next_protocol_negotiation(data)?;
                self.next_proto_neg = true;
            }
            ExtensionType::StatusRequest => {
                self.ocsp_stapling = extension::parse_status_request(data);
            }
            ExtensionType::SupportedGroups => {
                self.supported_curves = extension::parse_supported_groups(data)?;
            }
            ExtensionType::EcPointFormats => {
                let points = extension::parse_ec_point_formats(data)?;
                self.supported_points = raw.slice_ref(points);
            }
            ExtensionType::SessionTicket => {
                // any content, even empty, means the client supports tickets, see rfc5077
                self.ticket_supported = true;
                self.session_ticket = raw.slice_ref(data);
            }
            // best effort, a malformed list is left empty
            ExtensionType::ApplicationLayerProtocolNegotiation => {
                self.alpn_protocols = extension::parse_alpn(data)
                    .map(|list| list.into_iter().map(|p| raw.slice_ref(p)).collect())
                    .unwrap_or_default();
            }
            ExtensionType::SupportedVersions => {
                self.supported_versions =
                    extension::parse_supported_versions(data).unwrap_or_default();
            }
            ExtensionType::Unknown(_) => {
                // ignored, new extensions should never break the parsing
            }
        }
        Ok(())
    }

    /// Get the full message, including the handshake header
    #[inline]
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    #[inline]
    pub fn legacy_version(&self) -> u16 {
        self.legacy_version
    }

    #[inline]
    pub fn random(&self) -> &[u8] {
        &self.random
    }

    #[inline]
    pub fn session_id(&self) -> &[u8] {
        &self.session_id
    }

    #[inline]
    pub fn cipher_suites(&self) -> &[u16] {
        &self.cipher_suites
    }

    #[inline]
    pub fn compression_methods(&self) -> &[u8] {
        &self.compression_methods
    }

    /// Get the first host_name in the server_name extension, or an empty
    /// string if there is none.
    #[inline]
    pub fn server_name(&self) -> &str {
        self.server_name.as_deref().unwrap_or_default()
    }

    #[inline]
    pub fn has_server_name(&self) -> bool {
        self.server_name.is_some()
    }

    #[inline]
    pub fn next_proto_neg(&self) -> bool {
        self.next_proto_neg
    }

    #[inline]
    pub fn ocsp_stapling(&self) -> bool {
        self.ocsp_stapling
    }

    #[inline]
    pub fn supported_curves(&self) -> &[u16] {
        &self.supported_curves
    }

    #[inline]
    pub fn supported_points(&self) -> &[u8] {
        &self.supported_points
    }

    #[inline]
    pub fn ticket_supported(&self) -> bool {
        self.ticket_supported
    }

    #[inline]
    pub fn session_ticket(&self) -> &[u8] {
        &self.session_ticket
    }

    #[inline]
    pub fn alpn_protocols(&self) -> &[Bytes] {
        &self.alpn_protocols
    }

    #[inline]
    pub fn supported_versions(&self) -> &[u16] {
        &self.supported_versions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_hello(extensions: &[u8]) -> Bytes {
        let mut body = vec![
            0x03, 0x03, // TLS 1.2
        ];
        body.extend_from_slice(&[0x5a; 32]); // Random data, 32 bytes
        body.extend_from_slice(&[
            0x00, // Session ID Length
            0x00, 0x04, // Cipher Suites Length
            0x13, 0x01, 0xc0, 0x2f, // Cipher Suites
            0x01, // Compression Methods Length
            0x00, // Compression Methods
        ]);
        body.extend_from_slice(&(extensions.len() as u16).to_be_bytes());
        body.extend_from_slice(extensions);

        let mut msg = vec![0x01];
        msg.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        msg.extend_from_slice(&body);
        Bytes::from(msg)
    }

    #[test]
    fn no_extensions() {
        let data: &[u8] = &[
            0x01, // Handshake Type - ClientHello
            0x00, 0x00, 0x29, // Message Length, 41
            0x03, 0x03, // TLS 1.2
            0x74, 0x90, 0x65, 0xea, 0xbb, 0x00, 0x5d, 0xf8, 0xdf, 0xd6, 0xde, 0x04, 0xf8, 0xd3,
            0x69, 0x02, 0xf5, 0x8c, 0x82, 0x50, 0x7a, 0x40, 0xf6, 0xf3, 0xbb, 0x18, 0xc0, 0xac,
            0x4f, 0x55, 0x9a, 0xda, // Random data, 32 bytes
            0x00, // Session ID Length
            0x00, 0x02, // Cipher Suites Length
            0x00, 0x2f, // Cipher Suites
            0x01, // Compression Methods Length
            0x00, // Compression Methods
        ];

        let ch = ClientHello::parse(Bytes::from_static(data)).unwrap();
        assert_eq!(ch.legacy_version(), 0x0303);
        assert_eq!(ch.random()[0], 0x74);
        assert!(ch.session_id().is_empty());
        assert_eq!(ch.cipher_suites(), &[0x002f]);
        assert_eq!(ch.compression_methods(), &[0x00]);
        assert_eq!(ch.server_name(), "");
        assert!(!ch.has_server_name());
        assert!(!ch.ticket_supported());
        assert!(ch.supported_curves().is_empty());
        assert_eq!(&ch.raw()[..], data);
    }

    #[test]
    fn too_short() {
        let data = [0x01, 0x00, 0x00, 0x25, 0x03, 0x03];
        assert!(matches!(
            ClientHello::parse(Bytes::copy_from_slice(&data)),
            Err(ClientHelloParseError::MessageTooShort(6))
        ));
    }

    #[test]
    fn invalid_session_id_len() {
        let mut data = client_hello(&[]).to_vec();
        data[38] = 33;
        assert!(matches!(
            ClientHello::parse(Bytes::from(data)),
            Err(ClientHelloParseError::InvalidSessionIdLength(33))
        ));

        let mut data = client_hello(&[]).to_vec();
        data[38] = 32;
        assert!(matches!(
            ClientHello::parse(Bytes::from(data)),
            Err(ClientHelloParseError::Truncated(_))
        ));
    }

    #[test]
    fn odd_cipher_suites_len() {
        let mut data = client_hello(&[]).to_vec();
        data[40] = 0x03;
        assert!(matches!(
            ClientHello::parse(Bytes::from(data)),
            Err(ClientHelloParseError::InvalidCipherSuitesLength(3))
        ));
    }

    #[test]
    fn extensions_len_mismatch() {
        let ext: &[u8] = &[0x00, 0x17, 0x00, 0x00]; // extended_master_secret

        let mut data = client_hello(ext).to_vec();
        let pos = data.len() - ext.len() - 1;
        data[pos] = 0x05;
        assert!(matches!(
            ClientHello::parse(Bytes::from(data)),
            Err(ClientHelloParseError::InvalidExtensionsLength {
                declared: 5,
                remaining: 4
            })
        ));

        let mut data = client_hello(ext).to_vec();
        data[pos] = 0x03;
        assert!(matches!(
            ClientHello::parse(Bytes::from(data)),
            Err(ClientHelloParseError::InvalidExtensionsLength {
                declared: 3,
                remaining: 4
            })
        ));

        // a single dangling byte after compression methods
        let mut data = client_hello(&[]).to_vec();
        data.truncate(data.len() - 1);
        assert!(matches!(
            ClientHello::parse(Bytes::from(data)),
            Err(ClientHelloParseError::Truncated("extensions length"))
        ));
    }

    #[test]
    fn full_extensions() {
        let ext: &[u8] = &[
            0x0a, 0x0a, 0x00, 0x00, // GREASE
            0x00, 0x00, // Extension Type - Server Name
            0x00, 0x10, // Extension Length, 16
            0x00, 0x01, // Server Name Count
            0x00, // Server Name Type - Domain
            0x00, 0x0b, // Server Name Length, 11
            b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'.', b'c', b'o', b'm', //
            0x00, 0x05, // Extension Type - Status Request
            0x00, 0x05, // Extension Length, 5
            0x01, 0x00, 0x00, 0x00, 0x00, //
            0x00, 0x0a, // Extension Type - Supported Groups
            0x00, 0x06, // Extension Length, 6
            0x00, 0x04, 0x00, 0x1d, 0x00, 0x17, //
            0x00, 0x0b, // Extension Type - EC Point Formats
            0x00, 0x02, // Extension Length, 2
            0x01, 0x00, //
            0x00, 0x23, // Extension Type - Session Ticket
            0x00, 0x03, // Extension Length, 3
            0xde, 0xad, 0x01, //
            0x33, 0x74, // Extension Type - Next Protocol Negotiation
            0x00, 0x00, //
            0x00, 0x10, // Extension Type - ALPN
            0x00, 0x05, // Extension Length, 5
            0x00, 0x03, 0x02, b'h', b'2', //
            0x00, 0x2b, // Extension Type - Supported Versions
            0x00, 0x05, // Extension Length, 5
            0x04, 0x03, 0x04, 0x03, 0x03,
        ];

        let ch = ClientHello::parse(client_hello(ext)).unwrap();
        assert_eq!(ch.cipher_suites(), &[0x1301, 0xc02f]);
        assert_eq!(ch.server_name(), "example.com");
        assert!(ch.ocsp_stapling());
        assert_eq!(ch.supported_curves(), &[0x001d, 0x0017]);
        assert_eq!(ch.supported_points(), &[0x00]);
        assert!(ch.ticket_supported());
        assert_eq!(ch.session_ticket(), &[0xde, 0xad, 0x01]);
        assert!(ch.next_proto_neg());
        assert_eq!(ch.alpn_protocols(), &[Bytes::from_static(b"h2")]);
        assert_eq!(ch.supported_versions(), &[0x0304, 0x0303]);
    }

    #[test]
    fn empty_session_ticket() {
        let ext: &[u8] = &[0x00, 0x23, 0x00, 0x00];
        let ch = ClientHello::parse(client_hello(ext)).unwrap();
        assert!(ch.ticket_supported());
        assert!(ch.session_ticket().is_empty());
    }

    #[test]
    fn invalid_ext_len() {
        let ext: &[u8] = &[
            0x00, 0x00, // Extension Type - Server Name
            0x01, 0x10, // Extension Length, 256 + 16
            0x00, 0x01, // Server Name Count
            0x00, // Server Name Type - Domain
            0x00, 0x0b, // Server Name Length, 11
            b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'.', b'n', b'e', b't',
        ];
        assert!(matches!(
            ClientHello::parse(client_hello(ext)),
            Err(ClientHelloParseError::InvalidExtension(
                ExtensionType::ServerName,
                ExtensionParseError::NotEnoughData
            ))
        ));
    }

    #[test]
    fn invalid_npn() {
        let ext: &[u8] = &[0x33, 0x74, 0x00, 0x01, 0x00];
        assert!(matches!(
            ClientHello::parse(client_hello(ext)),
            Err(ClientHelloParseError::InvalidExtension(
                ExtensionType::NextProtocolNegotiation,
                ExtensionParseError::UnexpectedData
            ))
        ));
    }

    #[test]
    fn non_utf8_server_name() {
        let ext: &[u8] = &[
            0x00, 0x00, 0x00, 0x07, //
            0x00, 0x01, 0x00, 0x00, 0x02, 0xff, b'b', //
            0x00, 0x0a, 0x00, 0x04, 0x00, 0x02, 0x00, 0x1d, //
        ];
        let ch = ClientHello::parse(client_hello(ext)).unwrap();
        assert!(ch.has_server_name());
        assert_eq!(ch.server_name(), "\u{fffd}b");
        assert_eq!(ch.cipher_suites(), &[0x1301, 0xc02f]);
        assert_eq!(ch.supported_curves(), &[0x001d]);
    }

    #[test]
    fn malformed_alpn() {
        let sni: &[u8] = &[
            0x00, 0x00, 0x00, 0x07, //
            0x00, 0x01, 0x00, 0x00, 0x02, b'a', b'b',
        ];
        let bad_alpns: [&[u8]; 3] = [
            &[0x00, 0x10, 0x00, 0x00],                   // missing list length
            &[0x00, 0x10, 0x00, 0x03, 0x00, 0x01, 0x00], // empty protocol name
            &[0x00, 0x10, 0x00, 0x04, 0x00, 0x02, 0x05, b'h'], // name past the list
        ];
        for alpn in bad_alpns {
            let mut ext = sni.to_vec();
            ext.extend_from_slice(alpn);
            let ch = ClientHello::parse(client_hello(&ext)).unwrap();
            assert_eq!(ch.server_name(), "ab");
            assert!(ch.alpn_protocols().is_empty());
        }
    }

    #[test]
    fn malformed_supported_versions() {
        let ext: &[u8] = &[
            0x00, 0x2b, 0x00, 0x02, 0x01, 0x03, // odd list length
            0x00, 0x23, 0x00, 0x00, // Session Ticket
        ];
        let ch = ClientHello::parse(client_hello(ext)).unwrap();
        assert!(ch.supported_versions().is_empty());
        assert!(ch.ticket_supported());
    }

    #[test]
    fn truncated_extension_header() {
        let ext: &[u8] = &[0x00, 0x17, 0x00];
        assert!(matches!(
            ClientHello::parse(client_hello(ext)),
            Err(ClientHelloParseError::Truncated("extension header"))
        ));
    }
}
