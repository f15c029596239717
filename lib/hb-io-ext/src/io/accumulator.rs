/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Read};

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

/// A growable receive buffer that is filled on demand from a stream.
///
/// The buffer only ever pulls the bytes that are still missing for the
/// current request, so nothing beyond the requested length is taken off the
/// stream. Consumed bytes are detached from the front with [`split`], which
/// leaves the remaining bytes in place to seed the next request.
///
/// [`split`]: ByteAccumulator::split
#[derive(Debug, Default)]
pub struct ByteAccumulator {
    buf: BytesMut,
}

impl ByteAccumulator {
    pub const MIN_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        ByteAccumulator::default()
    }

    /// Creates a new `ByteAccumulator` with bytes already received from the stream
    pub fn with_bytes(buf: BytesMut) -> Self {
        ByteAccumulator { buf }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the buffered but not yet consumed bytes.
    #[inline]
    pub fn chunk(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> BytesMut {
        self.buf
    }

    /// Make sure the buffer has a capacity of at least `n` bytes.
    ///
    /// The capacity grows by doubling, starting from [`Self::MIN_CAPACITY`].
    pub fn reserve(&mut self, n: usize) {
        let cap = self.buf.capacity();
        if cap >= n {
            return;
        }

        let mut new_cap = cap.max(Self::MIN_CAPACITY);
        while new_cap < n {
            new_cap = new_cap.checked_mul(2).unwrap_or(n);
        }
        self.buf.reserve(new_cap - self.buf.len());
    }

    /// Read from `reader` until the buffer holds at least `n` bytes.
    ///
    /// Short reads are retried. An end of stream before `n` bytes are present
    /// is reported as [`io::ErrorKind::UnexpectedEof`].
    pub fn ensure_len<R>(&mut self, reader: &mut R, n: usize) -> io::Result<()>
    where
        R: Read + ?Sized,
    {
        let mut filled = self.buf.len();
        if filled >= n {
            return Ok(());
        }

        self.reserve(n);
        self.buf.resize(n, 0);
        while filled < n {
            match reader.read(&mut self.buf[filled..n]) {
                Ok(0) => {
                    self.buf.truncate(filled);
                    return Err(unexpected_eof(filled, n));
                }
                Ok(len) => filled += len,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.buf.truncate(filled);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Async version of [`ensure_len`](Self::ensure_len).
    ///
    /// This is cancel safe: bytes already received when the future is dropped
    /// stay in the buffer.
    pub async fn ensure_len_async<R>(&mut self, reader: &mut R, n: usize) -> io::Result<()>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        if self.buf.len() >= n {
            return Ok(());
        }

        self.reserve(n);
        while self.buf.len() < n {
            let need = n - self.buf.len();
            let mut limited = (&mut self.buf).limit(need);
            match reader.read_buf(&mut limited).await {
                Ok(0) => return Err(unexpected_eof(self.buf.len(), n)),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Detach the first `at` bytes.
    ///
    /// The bytes after `at` stay in the accumulator without being copied.
    pub fn split(&mut self, at: usize) -> BytesMut {
        debug_assert!(at <= self.buf.len());
        let at = at.min(self.buf.len());
        self.buf.split_to(at)
    }
}

fn unexpected_eof(filled: usize, needed: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("stream closed after {filled} of {needed} bytes"),
    )
}
