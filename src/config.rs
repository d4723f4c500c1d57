// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runtime configuration from environment variables.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::store::WriteDurability;

pub const DEFAULT_APP_NAME: &str = "Theory of Change Builder";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PRIMARY_MODEL: &str = "gpt-4o";
pub const DEFAULT_FALLBACK_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_DATA_DIR: &str = ".tocb";
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub app_name: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub primary_model: String,
    pub fallback_model: String,
    pub data_dir: PathBuf,
    /// Where saves land when no file dialog is available; `<data_dir>/downloads` by default.
    pub downloads_dir: Option<PathBuf>,
    pub server_addr: SocketAddr,
    pub enable_auto_save: bool,
    pub durability: WriteDurability,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { var, value } => {
                write!(f, "invalid value for {var}: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_owned(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_owned(),
            primary_model: DEFAULT_PRIMARY_MODEL.to_owned(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_owned(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            downloads_dir: None,
            server_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            enable_auto_save: true,
            durability: WriteDurability::BestEffort,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds a config from a variable lookup; blank values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(name) = var("TOCB_APP_NAME") {
            config.app_name = name;
        }
        config.openai_api_key = var("OPENAI_API_KEY").map(|key| key.trim().to_owned());
        if let Some(url) = var("TOCB_OPENAI_BASE_URL") {
            config.openai_base_url = url;
        }
        if let Some(model) = var("TOCB_PRIMARY_MODEL") {
            config.primary_model = model;
        }
        if let Some(model) = var("TOCB_FALLBACK_MODEL") {
            config.fallback_model = model;
        }
        if let Some(dir) = var("TOCB_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.downloads_dir = var("TOCB_DOWNLOADS_DIR").map(PathBuf::from);
        if let Some(addr) = var("TOCB_SERVER_ADDR") {
            config.server_addr = addr.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "TOCB_SERVER_ADDR",
                value: addr.clone(),
            })?;
        }
        if let Some(raw) = var("TOCB_ENABLE_AUTO_SAVE") {
            config.enable_auto_save = parse_bool("TOCB_ENABLE_AUTO_SAVE", &raw)?;
        }
        if let Some(raw) = var("TOCB_DURABLE_WRITES") {
            if parse_bool("TOCB_DURABLE_WRITES", &raw)? {
                config.durability = WriteDurability::Durable;
            }
        }

        Ok(config)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.downloads_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("downloads"))
    }

    /// Base URL of the local suggestion server as seen by the client.
    pub fn server_url(&self) -> String {
        format!("http://{}", self.server_addr)
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_owned(),
        }),
    }
}
