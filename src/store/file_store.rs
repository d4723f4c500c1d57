// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::atomic::{ensure_dir, write_atomic};
use super::{StoreError, WriteDurability};
use crate::editor::ValidationError;
use crate::format::{decode_saved_file, encode_saved_pretty, ExportFormat, FormatError};
use crate::model::SavedDiagram;

pub const DIAGRAM_FILE_EXTENSION: &str = ".toc.json";

/// What a picker should offer; extensions include the leading dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter {
    pub description: &'static str,
    pub mime_type: &'static str,
    pub extensions: &'static [&'static str],
}

impl FileFilter {
    pub const DIAGRAM_SAVE: Self = Self {
        description: "Theory of Change Diagram",
        mime_type: "application/json",
        extensions: &[DIAGRAM_FILE_EXTENSION],
    };

    pub const DIAGRAM_OPEN: Self = Self {
        description: "Theory of Change Diagram",
        mime_type: "application/json",
        extensions: &[DIAGRAM_FILE_EXTENSION, ".json"],
    };

    pub fn for_export(format: ExportFormat) -> Self {
        let (description, extensions): (&'static str, &'static [&'static str]) = match format {
            ExportFormat::Json => ("JSON File", &[".json"]),
            ExportFormat::Csv => ("CSV File", &[".csv"]),
            ExportFormat::Txt => ("Text File", &[".txt"]),
        };
        Self {
            description,
            mime_type: format.mime_type(),
            extensions,
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        self.extensions.iter().any(|ext| name.ends_with(ext))
    }
}

/// Interactive (or scripted) choice of file system locations. `Ok(None)` means the user
/// dismissed the dialog.
pub trait FilePicker {
    /// When `false`, saves and exports fall back to the downloads directory.
    fn is_supported(&self) -> bool {
        true
    }

    fn pick_save_path(
        &mut self,
        suggested_name: &str,
        filter: &FileFilter,
    ) -> io::Result<Option<PathBuf>>;

    fn pick_open_path(&mut self, filter: &FileFilter) -> io::Result<Option<PathBuf>>;

    fn pick_directory(&mut self) -> io::Result<Option<PathBuf>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> FileOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[derive(Debug)]
pub enum FileStoreError {
    Validation(ValidationError),
    InvalidFormat {
        path: PathBuf,
        source: FormatError,
    },
    Failed {
        operation: &'static str,
        source: StoreError,
    },
    Picker {
        operation: &'static str,
        source: io::Error,
    },
    Unsupported {
        operation: &'static str,
    },
}

impl fmt::Display for FileStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => err.fmt(f),
            Self::InvalidFormat { path, source } => write!(f, "{path:?}: {source}"),
            Self::Failed { operation, source } => write!(f, "failed to {operation}: {source}"),
            Self::Picker { operation, source } => {
                write!(f, "file picker failed during {operation}: {source}")
            }
            Self::Unsupported { operation } => write!(
                f,
                "{operation} needs an interactive file system picker, which is not available"
            ),
        }
    }
}

impl std::error::Error for FileStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidFormat { source, .. } => Some(source),
            Self::Failed { source, .. } => Some(source),
            Self::Picker { source, .. } => Some(source),
            Self::Unsupported { .. } => None,
        }
    }
}

impl From<ValidationError> for FileStoreError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_file_stem(name: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new(r"[^A-Za-z0-9]").expect("static regex"));
    re.replace_all(name, "_").into_owned()
}

/// Picker-driven diagram files, with a downloads-directory fallback when the picker is not
/// supported.
#[derive(Debug)]
pub struct LocalFileStore<P> {
    picker: P,
    downloads_dir: PathBuf,
    durability: WriteDurability,
}

impl<P: FilePicker> LocalFileStore<P> {
    pub fn new(picker: P, downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            picker,
            downloads_dir: downloads_dir.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn picker(&self) -> &P {
        &self.picker
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    /// Saves pretty JSON as `<file_name>.toc.json`.
    pub fn save_to_file(
        &mut self,
        diagram: &SavedDiagram,
        file_name: &str,
    ) -> Result<FileOutcome<PathBuf>, FileStoreError> {
        const OP: &str = "save diagram file";
        let suggested = suggested_name(file_name, DIAGRAM_FILE_EXTENSION)?;
        let contents = encode_saved_pretty(diagram).map_err(|source| FileStoreError::Failed {
            operation: OP,
            source: StoreError::Json {
                key: suggested.clone(),
                source,
            },
        })?;
        self.write_picked(OP, &suggested, &FileFilter::DIAGRAM_SAVE, &contents)
    }

    pub fn load_from_file(&mut self) -> Result<FileOutcome<SavedDiagram>, FileStoreError> {
        const OP: &str = "load diagram file";
        let picked = self
            .picker
            .pick_open_path(&FileFilter::DIAGRAM_OPEN)
            .map_err(|source| FileStoreError::Picker { operation: OP, source })?;
        let Some(path) = picked else {
            return Ok(FileOutcome::Cancelled);
        };

        let text = fs::read_to_string(&path).map_err(|source| FileStoreError::Failed {
            operation: OP,
            source: StoreError::Io {
                path: path.clone(),
                source,
            },
        })?;
        let saved = decode_saved_file(&text)
            .map_err(|source| FileStoreError::InvalidFormat { path: path.clone(), source })?;
        tracing::debug!(path = %path.display(), id = %saved.id, "loaded diagram file");
        Ok(FileOutcome::Completed(saved))
    }

    /// Writes `<file_name>.<ext>` in the chosen format.
    pub fn export_as(
        &mut self,
        diagram: &SavedDiagram,
        format: ExportFormat,
        file_name: &str,
    ) -> Result<FileOutcome<PathBuf>, FileStoreError> {
        const OP: &str = "export diagram";
        let suggested = suggested_name(file_name, format.extension())?;
        let contents = format.render(diagram).map_err(|source| FileStoreError::Failed {
            operation: OP,
            source: StoreError::Json {
                key: suggested.clone(),
                source,
            },
        })?;
        self.write_picked(OP, &suggested, &FileFilter::for_export(format), &contents)
    }

    /// Writes every diagram into one picked directory as `<sanitized name>.toc.json`.
    pub fn save_diagrams_to_directory(
        &mut self,
        diagrams: &[SavedDiagram],
    ) -> Result<FileOutcome<Vec<PathBuf>>, FileStoreError> {
        const OP: &str = "save diagrams to directory";
        if !self.picker.is_supported() {
            return Err(FileStoreError::Unsupported { operation: OP });
        }
        let picked = self
            .picker
            .pick_directory()
            .map_err(|source| FileStoreError::Picker { operation: OP, source })?;
        let Some(dir) = picked else {
            return Ok(FileOutcome::Cancelled);
        };

        let mut written = Vec::with_capacity(diagrams.len());
        for diagram in diagrams {
            let path = dir.join(format!(
                "{}{DIAGRAM_FILE_EXTENSION}",
                sanitize_file_stem(&diagram.name)
            ));
            let contents = encode_saved_pretty(diagram).map_err(|source| FileStoreError::Failed {
                operation: OP,
                source: StoreError::Json {
                    key: diagram.id.to_string(),
                    source,
                },
            })?;
            write_atomic(&path, contents.as_bytes(), self.durability)
                .map_err(|source| FileStoreError::Failed { operation: OP, source })?;
            written.push(path);
        }
        Ok(FileOutcome::Completed(written))
    }

    fn write_picked(
        &mut self,
        operation: &'static str,
        suggested: &str,
        filter: &FileFilter,
        contents: &str,
    ) -> Result<FileOutcome<PathBuf>, FileStoreError> {
        let path = if self.picker.is_supported() {
            let picked = self
                .picker
                .pick_save_path(suggested, filter)
                .map_err(|source| FileStoreError::Picker { operation, source })?;
            match picked {
                Some(path) => path,
                None => return Ok(FileOutcome::Cancelled),
            }
        } else {
            ensure_dir(&self.downloads_dir)
                .map_err(|source| FileStoreError::Failed { operation, source })?;
            self.downloads_dir.join(suggested)
        };

        write_atomic(&path, contents.as_bytes(), self.durability)
            .map_err(|source| FileStoreError::Failed { operation, source })?;
        tracing::debug!(path = %path.display(), operation, "wrote file");
        Ok(FileOutcome::Completed(path))
    }
}

fn suggested_name(file_name: &str, extension: &str) -> Result<String, ValidationError> {
    let stem = file_name.trim();
    if stem.is_empty() {
        return Err(ValidationError::EmptyFileName);
    }
    // Downloads fallback joins this onto a directory; it must stay a bare file name.
    if stem.contains(['/', '\\']) || stem.contains("..") || Path::new(stem).is_absolute() {
        return Err(ValidationError::InvalidFileName);
    }
    if stem.to_ascii_lowercase().ends_with(extension) {
        Ok(stem.to_owned())
    } else {
        Ok(format!("{stem}{extension}"))
    }
}
