// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for a diagram.
//!
//! Ops are applied to a scratch copy and committed only when the whole batch succeeds, so no
//! caller ever observes a half-applied batch (or groups and columns of different lengths).

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::model::{
    CellOutOfRange, Diagram, FlowColumn, Group, GroupId, ThemeColors, FLOW_COLUMN_COUNT,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Header(HeaderPatch),
    Flow(FlowPatch),
    Group(GroupOp),
    SetCell {
        column: FlowColumn,
        index: usize,
        content: String,
    },
    Theme(ThemeOp),
    SetLogoUrl {
        logo_url: Option<String>,
    },
    ToggleGroupingColumn,
    ResetToDefault,
}

/// Shallow merge into [`crate::model::HeaderData`]; `None` leaves a field untouched.
///
/// The `*_content` fields are optional on the diagram itself, so `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderPatch {
    pub title: Option<String>,
    pub need: Option<String>,
    pub need_content: Option<Option<String>>,
    pub vision: Option<String>,
    pub vision_content: Option<Option<String>>,
    pub purpose: Option<String>,
    pub purpose_content: Option<Option<String>>,
}

impl HeaderPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Shallow merge into [`crate::model::FlowData`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowPatch {
    labels: [Option<String>; FLOW_COLUMN_COUNT],
}

impl FlowPatch {
    pub fn single(column: FlowColumn, label: impl Into<String>) -> Self {
        Self::default().with(column, label)
    }

    pub fn with(mut self, column: FlowColumn, label: impl Into<String>) -> Self {
        self.labels[column.index()] = Some(label.into());
        self
    }

    pub fn label(&self, column: FlowColumn) -> Option<&str> {
        self.labels[column.index()].as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOp {
    Add { group_id: GroupId, name: String },
    /// Absent ids are a no-op.
    Remove { group_id: GroupId },
    /// Absent ids are a no-op.
    Rename { group_id: GroupId, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeColorKey {
    Header,
    Need,
    Flow,
    Grouping,
    Column(usize),
}

impl ThemeColorKey {
    /// Parses `header`, `need`, `flow`, `grouping`, or `column` together with an index.
    pub fn parse(key: &str, index: Option<usize>) -> Result<Self, ParseThemeColorKeyError> {
        match (key.trim().to_ascii_lowercase().as_str(), index) {
            ("header", _) => Ok(Self::Header),
            ("need", _) => Ok(Self::Need),
            ("flow", _) => Ok(Self::Flow),
            ("grouping", _) => Ok(Self::Grouping),
            ("column" | "columns", Some(index)) => Ok(Self::Column(index)),
            ("column" | "columns", None) => Err(ParseThemeColorKeyError::MissingColumnIndex),
            (other, _) => Err(ParseThemeColorKeyError::UnknownKey(other.to_owned())),
        }
    }
}

impl FromStr for ThemeColorKey {
    type Err = ParseThemeColorKeyError;

    /// Accepts `column:<index>` for column colours.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((key, raw_index)) => {
                let index = raw_index
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ParseThemeColorKeyError::InvalidColumnIndex(raw_index.to_owned()))?;
                Self::parse(key, Some(index))
            }
            None => Self::parse(s, None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseThemeColorKeyError {
    UnknownKey(String),
    MissingColumnIndex,
    InvalidColumnIndex(String),
}

impl fmt::Display for ParseThemeColorKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey(key) => write!(
                f,
                "unknown theme color key {key:?} (expected header, need, flow, grouping or column)"
            ),
            Self::MissingColumnIndex => f.write_str("column theme color requires an index (0-5)"),
            Self::InvalidColumnIndex(raw) => write!(f, "invalid column index {raw:?}"),
        }
    }
}

impl std::error::Error for ParseThemeColorKeyError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeOp {
    SetColor { key: ThemeColorKey, value: String },
    SetAllColumns { value: String },
    Reset,
}

/// Coarse areas of the diagram touched by a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Header,
    Flow,
    Groups,
    Cells,
    Theme,
    Logo,
    GroupingColumn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

/// Minimal delta describing what changed as the result of applying ops.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added_groups: Vec<GroupId>,
    pub removed_groups: Vec<GroupId>,
    pub updated_groups: Vec<GroupId>,
    pub sections: BTreeSet<Section>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added_groups.is_empty()
            && self.removed_groups.is_empty()
            && self.updated_groups.is_empty()
            && self.sections.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: HashSet<GroupId>,
    removed: HashSet<GroupId>,
    updated: HashSet<GroupId>,
    sections: BTreeSet<Section>,
}

impl DeltaBuilder {
    fn record_added(&mut self, group_id: GroupId) {
        self.removed.remove(&group_id);
        self.updated.remove(&group_id);
        self.added.insert(group_id);
        self.sections.insert(Section::Groups);
    }

    fn record_removed(&mut self, group_id: GroupId) {
        let was_added = self.added.remove(&group_id);
        self.updated.remove(&group_id);
        if !was_added {
            self.removed.insert(group_id);
        }
        self.sections.insert(Section::Groups);
    }

    fn record_updated(&mut self, group_id: GroupId) {
        self.sections.insert(Section::Groups);
        if self.added.contains(&group_id) || self.removed.contains(&group_id) {
            return;
        }
        self.updated.insert(group_id);
    }

    fn record_section(&mut self, section: Section) {
        self.sections.insert(section);
    }

    fn finish(self) -> Delta {
        let mut added_groups = self.added.into_iter().collect::<Vec<_>>();
        let mut removed_groups = self.removed.into_iter().collect::<Vec<_>>();
        let mut updated_groups = self.updated.into_iter().collect::<Vec<_>>();

        added_groups.sort();
        removed_groups.sort();
        updated_groups.sort();

        Delta {
            added_groups,
            removed_groups,
            updated_groups,
            sections: self.sections,
        }
    }
}

/// Applies `ops` in order; on error `diagram` is left exactly as it was.
pub fn apply_ops(diagram: &mut Diagram, ops: &[Op]) -> Result<Delta, ApplyError> {
    if ops.is_empty() {
        return Ok(Delta::default());
    }

    let mut scratch = diagram.clone();
    let mut delta = DeltaBuilder::default();
    for op in ops {
        apply_op(&mut scratch, op, &mut delta)?;
    }

    *diagram = scratch;
    Ok(delta.finish())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    GroupAlreadyExists { group_id: GroupId },
    CellOutOfRange(CellOutOfRange),
    ThemeColumnOutOfRange { index: usize },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GroupAlreadyExists { group_id } => {
                write!(f, "group already exists (id={group_id})")
            }
            Self::CellOutOfRange(source) => source.fmt(f),
            Self::ThemeColumnOutOfRange { index } => write!(
                f,
                "theme column index {index} is out of range (expected 0..{FLOW_COLUMN_COUNT})"
            ),
        }
    }
}

impl std::error::Error for ApplyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CellOutOfRange(source) => Some(source),
            Self::GroupAlreadyExists { .. } | Self::ThemeColumnOutOfRange { .. } => None,
        }
    }
}

// Per-op mutation logic used by `apply_ops`.
include!("ops_impl.rs");

#[cfg(test)]
mod tests;
