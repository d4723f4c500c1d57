// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, SecondsFormat, Utc};

use super::diagram::Diagram;
use super::ids::DiagramId;

/// Current time in the interchange format (`2024-05-01T12:00:00.000Z`).
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an interchange timestamp; `None` for anything that is not RFC 3339.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// A diagram with identity and timestamps, as stored in the catalog and in files.
///
/// Timestamps are kept as the exact strings that were read so a load/save cycle reproduces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDiagram {
    pub id: DiagramId,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub diagram: Diagram,
}

impl SavedDiagram {
    /// Wraps `diagram` with a fresh id and both timestamps set to now.
    pub fn new(name: impl Into<String>, diagram: Diagram) -> Self {
        Self::with_id(DiagramId::generate(), name, diagram)
    }

    pub fn with_id(id: DiagramId, name: impl Into<String>, diagram: Diagram) -> Self {
        let now = now_timestamp();
        Self {
            id,
            name: name.into(),
            created_at: now.clone(),
            updated_at: now,
            diagram,
        }
    }

    pub fn metadata(&self) -> DiagramMetadata {
        DiagramMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramMetadata {
    pub id: DiagramId,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Orders metadata newest `updated_at` first; unparsable timestamps sort last.
pub fn sort_newest_first(items: &mut [DiagramMetadata]) {
    items.sort_by(|a, b| {
        let a_ts = parse_timestamp(&a.updated_at);
        let b_ts = parse_timestamp(&b.updated_at);
        b_ts.cmp(&a_ts).then_with(|| a.name.cmp(&b.name))
    });
}
