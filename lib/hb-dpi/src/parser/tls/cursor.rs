/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

/// A read-only view over wire data.
///
/// Every read either returns the requested bytes and advances, or returns
/// `None` and leaves the cursor untouched. Integers are big-endian.
#[derive(Clone, Copy)]
pub(crate) struct ByteCursor<'a> {
    data: &'a [u8],
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        ByteCursor { data }
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if n > self.data.len() {
            return None;
        }
        let (head, tail) = self.data.split_at(n);
        self.data = tail;
        Some(head)
    }

    pub(crate) fn read_u8(&mut self) -> Option<u8> {
        let (&b, tail) = self.data.split_first()?;
        self.data = tail;
        Some(b)
    }

    pub(crate) fn read_u16(&mut self) -> Option<u16> {
        let b = self.take(2)?;
        Some(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn read_u24(&mut self) -> Option<u32> {
        let b = self.take(3)?;
        Some(u32::from_be_bytes([0, b[0], b[1], b[2]]))
    }

    /// Take a vector with a 1 byte length prefix.
    pub(crate) fn take_u8_prefixed(&mut self) -> Option<&'a [u8]> {
        let mut c = *self;
        let len = c.read_u8()? as usize;
        let v = c.take(len)?;
        *self = c;
        Some(v)
    }

    /// Take a vector with a 2 bytes length prefix.
    pub(crate) fn take_u16_prefixed(&mut self) -> Option<&'a [u8]> {
        let mut c = *self;
        let len = c.read_u16()? as usize;
        let v = c.take(len)?;
        *self = c;
        Some(v)
    }
}
