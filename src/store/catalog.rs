// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::kv::KeyValueStore;
use super::StoreError;
use crate::format::{decode_catalog, encode_catalog};
use crate::model::{now_timestamp, sort_newest_first, DiagramId, DiagramMetadata, SavedDiagram};

pub const CATALOG_KEY: &str = "toc-saved-diagrams";

/// A catalog write that could not be completed; the stored blob is unchanged.
#[derive(Debug)]
pub struct OperationFailed {
    pub operation: &'static str,
    pub source: StoreError,
}

impl fmt::Display for OperationFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to {}: {}", self.operation, self.source)
    }
}

impl std::error::Error for OperationFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Named diagrams stored as one JSON array under [`CATALOG_KEY`].
///
/// Every write rewrites the whole array. Corrupted contents read as an empty catalog; a store
/// that cannot be read at all fails writes and reads as empty for listing.
#[derive(Debug, Clone)]
pub struct DiagramCatalog<K> {
    store: K,
}

impl<K: KeyValueStore> DiagramCatalog<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn all(&self) -> Vec<SavedDiagram> {
        match self.store.get(CATALOG_KEY) {
            Ok(Some(raw)) => decode_or_empty(&raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "saved diagrams unreadable; treating as empty");
                Vec::new()
            }
        }
    }

    /// Like [`Self::all`] but a failed read is an error, so a write never replaces a blob it
    /// could not see.
    fn load_for_write(
        &self,
        operation: &'static str,
    ) -> Result<Vec<SavedDiagram>, OperationFailed> {
        match self.store.get(CATALOG_KEY) {
            Ok(Some(raw)) => Ok(decode_or_empty(&raw)),
            Ok(None) => Ok(Vec::new()),
            Err(source) => Err(OperationFailed { operation, source }),
        }
    }

    /// Inserts or replaces by id and returns the stored record.
    ///
    /// Replacing keeps the original `created_at`; `updated_at` is always refreshed.
    pub fn save_diagram(&mut self, diagram: SavedDiagram) -> Result<SavedDiagram, OperationFailed> {
        let mut diagrams = self.load_for_write("save diagram")?;
        let now = now_timestamp();
        let mut stored = diagram;
        stored.updated_at = now.clone();

        match diagrams.iter_mut().find(|existing| existing.id == stored.id) {
            Some(existing) => {
                stored.created_at = existing.created_at.clone();
                *existing = stored.clone();
            }
            None => {
                stored.created_at = now;
                diagrams.push(stored.clone());
            }
        }

        self.write_all("save diagram", &diagrams)?;
        tracing::debug!(id = %stored.id, name = %stored.name, "saved diagram to catalog");
        Ok(stored)
    }

    pub fn list_metadata(&self) -> Vec<DiagramMetadata> {
        self.all().iter().map(SavedDiagram::metadata).collect()
    }

    pub fn list_metadata_newest_first(&self) -> Vec<DiagramMetadata> {
        let mut items = self.list_metadata();
        sort_newest_first(&mut items);
        items
    }

    pub fn get_by_id(&self, id: &DiagramId) -> Option<SavedDiagram> {
        self.all().into_iter().find(|diagram| &diagram.id == id)
    }

    /// Returns `false` without writing when `id` is not stored.
    pub fn delete_by_id(&mut self, id: &DiagramId) -> Result<bool, OperationFailed> {
        let mut diagrams = self.load_for_write("delete diagram")?;
        let before = diagrams.len();
        diagrams.retain(|diagram| &diagram.id != id);
        if diagrams.len() == before {
            return Ok(false);
        }
        self.write_all("delete diagram", &diagrams)?;
        tracing::debug!(%id, "deleted diagram from catalog");
        Ok(true)
    }

    fn write_all(
        &mut self,
        operation: &'static str,
        diagrams: &[SavedDiagram],
    ) -> Result<(), OperationFailed> {
        let encoded = encode_catalog(diagrams).map_err(|source| OperationFailed {
            operation,
            source: StoreError::Json {
                key: CATALOG_KEY.to_owned(),
                source,
            },
        })?;
        self.store
            .set(CATALOG_KEY, &encoded)
            .map_err(|source| OperationFailed { operation, source })
    }
}

fn decode_or_empty(raw: &str) -> Vec<SavedDiagram> {
    match decode_catalog(raw) {
        Ok(diagrams) => diagrams,
        Err(err) => {
            tracing::warn!(error = %err, "saved diagrams corrupted; treating as empty");
            Vec::new()
        }
    }
}
