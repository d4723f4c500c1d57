// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence adapters.
//!
//! Everything that touches disk lives here: the key/value backends standing in for browser
//! storage, the autosave slot, the named-diagram catalog and the picker-driven file store.

mod atomic;
pub mod autosave;
pub mod catalog;
pub mod file_store;
pub mod kv;
pub mod pickers;

use std::fmt;
use std::io;
use std::path::PathBuf;

pub(crate) use atomic::write_atomic as write_file_atomic;
pub use autosave::{AutosaveSlot, AUTOSAVE_KEY};
pub use catalog::{DiagramCatalog, OperationFailed, CATALOG_KEY};
pub use file_store::{
    sanitize_file_stem, FileFilter, FileOutcome, FilePicker, FileStoreError, LocalFileStore,
};
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use pickers::{FixedPathPicker, PromptPicker, UnsupportedPicker};

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        key: String,
        source: serde_json::Error,
    },
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    InvalidKey {
        key: String,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { key, source } => write!(f, "json error for key {key:?}: {source}"),
            Self::QuotaExceeded { key, needed, quota } => write!(
                f,
                "storage quota exceeded writing {key:?}: needs {needed} bytes, quota is {quota}"
            ),
            Self::InvalidKey { key } => write!(f, "invalid storage key {key:?}"),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::QuotaExceeded { .. } | Self::InvalidKey { .. } | Self::SymlinkRefused { .. } => {
                None
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Temp file renamed into place, no fsync.
    #[default]
    BestEffort,

    /// Also syncs the file contents and (on unix) the parent directory.
    ///
    /// Exact guarantees are platform/filesystem-dependent.
    Durable,
}
