/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientHelloReadConfig {
    max_client_hello_size: u32,
}

impl Default for ClientHelloReadConfig {
    fn default() -> Self {
        ClientHelloReadConfig {
            max_client_hello_size: 1 << 14,
        }
    }
}

impl ClientHelloReadConfig {
    /// Set the max length a peer may declare in the ClientHello handshake header.
    ///
    /// The handshake length field allows up to 16MiB, which is never seen from
    /// a real client.
    pub fn set_max_client_hello_size(&mut self, size: u32) {
        self.max_client_hello_size = size;
    }

    #[inline]
    pub fn max_client_hello_size(&self) -> u32 {
        self.max_client_hello_size
    }
}
