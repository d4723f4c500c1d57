// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram serialization and export formats.
//!
//! JSON is the interchange format (import and export); CSV and plain text are export-only.

pub mod csv;
pub mod json;
pub mod text;

use std::fmt;
use std::str::FromStr;

pub use csv::export_csv;
pub use json::{
    decode_autosave, decode_catalog, decode_saved_file, encode_autosave, encode_catalog,
    encode_saved_pretty, saved_diagram_schema, validate_structure, FormatError,
};
pub use text::export_text;

use crate::model::SavedDiagram;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Json,
    Csv,
    Txt,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => ".json",
            Self::Csv => ".csv",
            Self::Txt => ".txt",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Txt => "text/plain",
        }
    }

    /// Renders `saved` in this format.
    pub fn render(self, saved: &SavedDiagram) -> Result<String, serde_json::Error> {
        match self {
            Self::Json => encode_saved_pretty(saved),
            Self::Csv => Ok(export_csv(saved)),
            Self::Txt => Ok(export_text(saved)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Txt => "txt",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownExportFormat(pub String);

impl fmt::Display for UnknownExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported export format {:?} (expected json, csv or txt)", self.0)
    }
}

impl std::error::Error for UnknownExportFormat {}

impl FromStr for ExportFormat {
    type Err = UnknownExportFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "txt" | "text" => Ok(Self::Txt),
            other => Err(UnknownExportFormat(other.to_owned())),
        }
    }
}
