/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::cursor::ByteCursor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtensionType {
    ServerName,                          // rfc6066
    StatusRequest,                       // rfc6066
    SupportedGroups,                     // rfc8422, rfc7919
    EcPointFormats,                      // rfc8422
    ApplicationLayerProtocolNegotiation, // rfc7301
    SessionTicket,                       // rfc5077
    SupportedVersions,                   // rfc8446(TLS1.3)
    NextProtocolNegotiation,             // draft-agl-tls-nextprotoneg, not IANA assigned
    Unknown(u16),
}

impl From<u16> for ExtensionType {
    fn from(value: u16) -> Self {
        match value {
            0 => ExtensionType::ServerName,
            5 => ExtensionType::StatusRequest,
            10 => ExtensionType::SupportedGroups,
            11 => ExtensionType::EcPointFormats,
            16 => ExtensionType::ApplicationLayerProtocolNegotiation,
            35 => ExtensionType::SessionTicket,
            43 => ExtensionType::SupportedVersions,
            13172 => ExtensionType::NextProtocolNegotiation,
            n => ExtensionType::Unknown(n),
        }
    }
}

impl From<ExtensionType> for u16 {
    fn from(value: ExtensionType) -> Self {
        match value {
            ExtensionType::ServerName => 0,
            ExtensionType::StatusRequest => 5,
            ExtensionType::SupportedGroups => 10,
            ExtensionType::EcPointFormats => 11,
            ExtensionType::ApplicationLayerProtocolNegotiation => 16,
            ExtensionType::SessionTicket => 35,
            ExtensionType::SupportedVersions => 43,
            ExtensionType::NextProtocolNegotiation => 13172,
            ExtensionType::Unknown(n) => n,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtensionParseError {
    #[error("not enough data")]
    NotEnoughData,
    #[error("invalid length")]
    InvalidLength,
    #[error("unexpected extension data")]
    UnexpectedData,
    #[error("empty protocol name")]
    EmptyProtocolName,
}

pub(crate) struct Extension<'a> {
    pub(crate) ext_type: ExtensionType,
    pub(crate) ext_data: &'a [u8],
}

impl<'a> Extension<'a> {
    pub(crate) const HEADER_LEN: usize = 4;

    /// Take the next extension from the extension block.
    ///
    /// Returns `None` if the header itself is truncated.
    pub(crate) fn parse(
        cursor: &mut ByteCursor<'a>,
    ) -> Option<Result<Self, (ExtensionType, ExtensionParseError)>> {
        if cursor.remaining() < Self::HEADER_LEN {
            return None;
        }
        let ext_type = ExtensionType::from(cursor.read_u16()?);
        let ext_len = cursor.read_u16()? as usize;
        match cursor.take(ext_len) {
            Some(ext_data) => Some(Ok(Extension { ext_type, ext_data })),
            None => Some(Err((ext_type, ExtensionParseError::NotEnoughData))),
        }
    }
}

const SERVER_NAME_TYPE_HOST_NAME: u8 = 0;
const CERTIFICATE_STATUS_TYPE_OCSP: u8 = 1; // rfc6066

/// Get the first host_name in the server_name list.
///
/// The list starts with a 2 bytes count of entries, each of which is a 1 byte
/// name type followed by a 2 bytes length prefixed name.
pub(crate) fn parse_server_name(data: &[u8]) -> Result<Option<&[u8]>, ExtensionParseError> {
    let mut c = ByteCursor::new(data);
    let count = c.read_u16().ok_or(ExtensionParseError::NotEnoughData)?;
    for _ in 0..count {
        let name_type = c.read_u8().ok_or(ExtensionParseError::NotEnoughData)?;
        let name = c
            .take_u16_prefixed()
            .ok_or(ExtensionParseError::NotEnoughData)?;
        if name_type == SERVER_NAME_TYPE_HOST_NAME {
            return Ok(Some(name));
        }
    }
    Ok(None)
}

pub(crate) fn parse_next_protocol_negotiation(data: &[u8]) -> Result<(), ExtensionParseError> {
    if data.is_empty() {
        Ok(())
    } else {
        Err(ExtensionParseError::UnexpectedData)
    }
}

/// Check if the client asks for OCSP stapling.
pub(crate) fn parse_status_request(data: &[u8]) -> bool {
    data.first() == Some(&CERTIFICATE_STATUS_TYPE_OCSP)
}

/// https://tools.ietf.org/html/rfc4492#section-5.5.1
pub(crate) fn parse_supported_groups(data: &[u8]) -> Result<Vec<u16>, ExtensionParseError> {
    let mut c = ByteCursor::new(data);
    let list_len = c.read_u16().ok_or(ExtensionParseError::NotEnoughData)? as usize;
    if list_len & 0x01 != 0 || list_len != c.remaining() {
        return Err(ExtensionParseError::InvalidLength);
    }
    let mut groups = Vec::with_capacity(list_len / 2);
    while let Some(group) = c.read_u16() {
        groups.push(group);
    }
    Ok(groups)
}

/// https://tools.ietf.org/html/rfc4492#section-5.5.2
pub(crate) fn parse_ec_point_formats(data: &[u8]) -> Result<&[u8], ExtensionParseError> {
    let mut c = ByteCursor::new(data);
    let list_len = c.read_u8().ok_or(ExtensionParseError::NotEnoughData)? as usize;
    if list_len != c.remaining() {
        return Err(ExtensionParseError::InvalidLength);
    }
    c.take(list_len).ok_or(ExtensionParseError::NotEnoughData)
}

/// https://tools.ietf.org/html/rfc7301#section-3.1
pub(crate) fn parse_alpn(data: &[u8]) -> Result<Vec<&[u8]>, ExtensionParseError> {
    let mut c = ByteCursor::new(data);
    let list_len = c.read_u16().ok_or(ExtensionParseError::NotEnoughData)? as usize;
    if list_len != c.remaining() {
        return Err(ExtensionParseError::InvalidLength);
    }
    let mut protocols = Vec::new();
    while !c.is_empty() {
        let name = c
            .take_u8_prefixed()
            .ok_or(ExtensionParseError::NotEnoughData)?;
        if name.is_empty() {
            return Err(ExtensionParseError::EmptyProtocolName);
        }
        protocols.push(name);
    }
    Ok(protocols)
}

/// https://tools.ietf.org/html/rfc8446#section-4.2.1
pub(crate) fn parse_supported_versions(data: &[u8]) -> Result<Vec<u16>, ExtensionParseError> {
    let mut c = ByteCursor::new(data);
    let list_len = c.read_u8().ok_or(ExtensionParseError::NotEnoughData)? as usize;
    if list_len & 0x01 != 0 || list_len != c.remaining() {
        return Err(ExtensionParseError::InvalidLength);
    }
    let mut versions = Vec::with_capacity(list_len / 2);
    while let Some(version) = c.read_u16() {
        versions.push(version);
    }
    Ok(versions)
}
