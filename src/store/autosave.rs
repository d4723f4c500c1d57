// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::kv::KeyValueStore;
use super::StoreError;
use crate::editor::StateMirror;
use crate::format::{decode_autosave, encode_autosave};
use crate::model::Diagram;

pub const AUTOSAVE_KEY: &str = "theory-of-change-storage";

/// Working-copy slot mirrored after every edit, separate from the named catalog.
#[derive(Debug, Clone)]
pub struct AutosaveSlot<K> {
    store: K,
}

impl<K: KeyValueStore> AutosaveSlot<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn save(&mut self, diagram: &Diagram) -> Result<(), StoreError> {
        let encoded = encode_autosave(diagram).map_err(|source| StoreError::Json {
            key: AUTOSAVE_KEY.to_owned(),
            source,
        })?;
        self.store.set(AUTOSAVE_KEY, &encoded)
    }

    /// Last mirrored diagram, or the default one when the slot is empty or unreadable.
    pub fn restore(&self) -> Diagram {
        let raw = match self.store.get(AUTOSAVE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Diagram::default(),
            Err(err) => {
                tracing::warn!(error = %err, "autosave slot unreadable; starting from defaults");
                return Diagram::default();
            }
        };
        match decode_autosave(&raw) {
            Ok(diagram) => diagram,
            Err(err) => {
                tracing::warn!(error = %err, "autosave slot corrupted; starting from defaults");
                Diagram::default()
            }
        }
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove(AUTOSAVE_KEY)
    }
}

impl<K: KeyValueStore> StateMirror for AutosaveSlot<K> {
    fn mirror(&mut self, diagram: &Diagram) -> Result<(), StoreError> {
        self.save(diagram)
    }
}
