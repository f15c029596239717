/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

/// Keys are case insensitive, and '-' is the same as '_'
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t() {
        assert_eq!(normalize("Max-Client-Hello-Size"), "max_client_hello_size");
        assert_eq!(normalize("MAX_MESSAGE_SIZE"), "max_message_size");
        assert_eq!(normalize("max-message_size"), "max_message_size");
    }
}
