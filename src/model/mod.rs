// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A [`Diagram`] is the editable document; a [`SavedDiagram`] adds identity and timestamps for
//! persistence and interchange.

pub mod diagram;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod saved;

pub use diagram::{
    CellOutOfRange, Columns, Diagram, FlowColumn, FlowData, Group, HeaderData, Realignment,
    ThemeColors, DEFAULT_GROUP_NAME, FLOW_COLUMN_COUNT,
};
pub use ids::{DiagramId, GroupId, IdError};
pub use saved::{now_timestamp, parse_timestamp, sort_newest_first, DiagramMetadata, SavedDiagram};
