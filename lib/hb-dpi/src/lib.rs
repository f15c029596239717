/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::ClientHelloReadConfig;

pub mod parser;
pub use parser::tls::{ClientHello, ClientHelloReadError, ClientHelloReader, read_client_hello};
