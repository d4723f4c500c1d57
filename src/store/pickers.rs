// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! [`FilePicker`] implementations for non-browser front ends.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use super::file_store::{FileFilter, FilePicker};

/// Answers every dialog with a path chosen up front; `None` behaves like a dismissed dialog.
///
/// A save into an existing directory lands at `<dir>/<suggested name>`.
#[derive(Debug, Clone, Default)]
pub struct FixedPathPicker {
    path: Option<PathBuf>,
}

impl FixedPathPicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn cancelling() -> Self {
        Self { path: None }
    }
}

impl FilePicker for FixedPathPicker {
    fn pick_save_path(
        &mut self,
        suggested_name: &str,
        _filter: &FileFilter,
    ) -> io::Result<Option<PathBuf>> {
        Ok(self.path.as_ref().map(|path| {
            if path.is_dir() {
                path.join(suggested_name)
            } else {
                path.clone()
            }
        }))
    }

    fn pick_open_path(&mut self, _filter: &FileFilter) -> io::Result<Option<PathBuf>> {
        Ok(self.path.clone())
    }

    fn pick_directory(&mut self) -> io::Result<Option<PathBuf>> {
        Ok(self.path.clone())
    }
}

/// Asks on a line-oriented terminal. An empty answer or end of input cancels.
#[derive(Debug)]
pub struct PromptPicker<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptPicker<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<PathBuf>> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let answer = line.trim();
        if answer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PathBuf::from(answer)))
        }
    }
}

impl PromptPicker<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> FilePicker for PromptPicker<R, W> {
    fn pick_save_path(
        &mut self,
        suggested_name: &str,
        filter: &FileFilter,
    ) -> io::Result<Option<PathBuf>> {
        let prompt = format!(
            "Save {} as (suggested {suggested_name}, empty to cancel)",
            filter.description
        );
        let picked = self.ask(&prompt)?;
        Ok(picked.map(|path| if path.is_dir() { path.join(suggested_name) } else { path }))
    }

    fn pick_open_path(&mut self, filter: &FileFilter) -> io::Result<Option<PathBuf>> {
        let prompt = format!(
            "Open {} ({}, empty to cancel)",
            filter.description,
            filter.extensions.join(", ")
        );
        self.ask(&prompt)
    }

    fn pick_directory(&mut self) -> io::Result<Option<PathBuf>> {
        self.ask("Directory to save into (empty to cancel)")
    }
}

/// Stands in for an environment without file system dialogs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPicker;

impl FilePicker for UnsupportedPicker {
    fn is_supported(&self) -> bool {
        false
    }

    fn pick_save_path(
        &mut self,
        _suggested_name: &str,
        _filter: &FileFilter,
    ) -> io::Result<Option<PathBuf>> {
        Ok(None)
    }

    fn pick_open_path(&mut self, _filter: &FileFilter) -> io::Result<Option<PathBuf>> {
        Ok(None)
    }

    fn pick_directory(&mut self) -> io::Result<Option<PathBuf>> {
        Ok(None)
    }
}
