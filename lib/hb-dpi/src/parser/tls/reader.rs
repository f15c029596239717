/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use std::io::Read;

use bytes::BytesMut;
use log::{debug, trace};
use tokio::io::AsyncRead;

use hb_io_ext::ByteAccumulator;

use super::{
    ClientHello, ClientHelloReadError, HandshakeCoalescer, HandshakeType, RecordHeader,
    RecordParseError, TlsParseError,
};
use crate::ClientHelloReadConfig;

#[derive(Clone, Copy)]
enum ReadState {
    AwaitingHeader,
    AwaitingBody(RecordHeader),
}

enum Progress {
    NeedLength(usize),
    Done(ClientHello),
}

/// Read the first handshake message from a client stream and decode it as ClientHello.
///
/// The message may span any number of TLS records. Only the bytes of these
/// records are taken off the stream.
pub struct ClientHelloReader {
    buf: ByteAccumulator,
    coalescer: HandshakeCoalescer,
    state: ReadState,
    record_count: usize,
}

impl ClientHelloReader {
    pub fn new(config: &ClientHelloReadConfig) -> Self {
        ClientHelloReader::with_initial_data(config, BytesMut::new())
    }

    /// Creates a new reader with the bytes that have already been read from the stream
    pub fn with_initial_data(config: &ClientHelloReadConfig, data: BytesMut) -> Self {
        ClientHelloReader {
            buf: ByteAccumulator::with_bytes(data),
            coalescer: HandshakeCoalescer::new(config.max_client_hello_size()),
            state: ReadState::AwaitingHeader,
            record_count: 0,
        }
    }

    pub fn read<R>(mut self, reader: &mut R) -> Result<ClientHello, ClientHelloReadError>
    where
        R: Read + ?Sized,
    {
        loop {
            match self.advance()? {
                Progress::NeedLength(len) => self.buf.ensure_len(reader, len)?,
                Progress::Done(ch) => return Ok(ch),
            }
        }
    }

    pub async fn read_async<R>(
        mut self,
        reader: &mut R,
    ) -> Result<ClientHello, ClientHelloReadError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        loop {
            match self.advance()? {
                Progress::NeedLength(len) => self.buf.ensure_len_async(reader, len).await?,
                Progress::Done(ch) => return Ok(ch),
            }
        }
    }

    /// Consume as many buffered records as possible.
    fn advance(&mut self) -> Result<Progress, ClientHelloReadError> {
        loop {
            match self.state {
                ReadState::AwaitingHeader => {
                    let header = match RecordHeader::parse(self.buf.chunk()) {
                        Ok(header) => header,
                        Err(RecordParseError::NeedMoreData(_)) => {
                            return Ok(Progress::NeedLength(RecordHeader::SIZE));
                        }
                        Err(RecordParseError::LegacySslV2) => {
                            debug!("SSLv2 framing found in record #{}", self.record_count);
                            return Err(ClientHelloReadError::LegacySslV2);
                        }
                    };
                    trace!(
                        "tls record #{}: type {}, version {:#06x}, length {}",
                        self.record_count,
                        header.content_type,
                        header.version,
                        header.fragment_len
                    );

                    if self.record_count == 0 {
                        if let Err(e) = header.check_first() {
                            debug!("first record rejected: {e}");
                            return Err(e.into());
                        }
                    }
                    self.state = ReadState::AwaitingBody(header);
                }
                ReadState::AwaitingBody(header) => {
                    let record_len = header.encoded_len();
                    if self.buf.len() < record_len {
                        return Ok(Progress::NeedLength(record_len));
                    }

                    let record = self.buf.split(record_len);
                    self.state = ReadState::AwaitingHeader;
                    self.record_count += 1;
                    if let Some(ch) = self.coalesce(&record[RecordHeader::SIZE..])? {
                        return Ok(Progress::Done(ch));
                    }
                }
            }
        }
    }

    fn coalesce(&mut self, fragment: &[u8]) -> Result<Option<ClientHello>, ClientHelloReadError> {
        if let Err(e) = self.coalescer.coalesce_fragment(fragment) {
            debug!("handshake message rejected: {e}");
            return Err(e.into());
        }

        let Some(hdr) = self.coalescer.header() else {
            return Ok(None);
        };
        if hdr.msg_type != HandshakeType::ClientHello as u8 {
            debug!("unexpected handshake message type {}", hdr.msg_type);
            return Err(TlsParseError::InvalidMessageType(hdr.msg_type).into());
        }

        let Some(msg) = self.coalescer.take_message() else {
            return Ok(None);
        };
        trace!(
            "handshake message of type {} length {} received in {} records",
            msg.header().msg_type,
            msg.header().msg_length,
            self.record_count
        );
        match msg.parse_client_hello() {
            Ok(ch) => Ok(Some(ch)),
            Err(e) => {
                debug!("invalid client hello: {e}");
                Err(e.into())
            }
        }
    }
}

/// Read one ClientHello from the stream with the default config
pub fn read_client_hello<R>(reader: &mut R) -> Result<ClientHello, ClientHelloReadError>
where
    R: Read + ?Sized,
{
    ClientHelloReader::new(&ClientHelloReadConfig::default()).read(reader)
}
