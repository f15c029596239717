/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use hb_dpi::ClientHelloReadConfig;

pub fn as_client_hello_read_config(value: &Yaml) -> anyhow::Result<ClientHelloReadConfig> {
    if let Yaml::Hash(map) = value {
        let mut config = ClientHelloReadConfig::default();

        crate::foreach_kv(map, |k, v| match crate::key::normalize(k).as_str() {
            "max_client_hello_size" | "max_message_size" => {
                let size = crate::humanize::as_u32(v)
                    .context(format!("invalid humanize u32 value for key {k}"))?;
                config.set_max_client_hello_size(size);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;

        Ok(config)
    } else {
        Err(anyhow!(
            "yaml value type for 'client hello read config' should be 'map'"
        ))
    }
}
