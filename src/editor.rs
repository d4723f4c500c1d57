// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The in-memory diagram store.
//!
//! [`DiagramEditor`] owns the checked-out [`Diagram`] and funnels every mutation through
//! [`apply_ops`], so a mutation is either fully visible or not at all. After each committed
//! mutation the current state is handed to a [`StateMirror`] (normally the autosave slot).

use std::fmt;

use crate::model::{
    Diagram, DiagramId, FlowColumn, GroupId, SavedDiagram, DEFAULT_GROUP_NAME,
};
use crate::ops::{
    apply_ops, ApplyError, ApplyResult, FlowPatch, GroupOp, HeaderPatch, Op, ThemeColorKey,
    ThemeOp,
};
use crate::store::StoreError;

/// Input rejected before any I/O happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    EmptyFileName,
    /// The file name carries a directory component.
    InvalidFileName,
    EmptyContent,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EmptyName => "please enter a name for your diagram",
            Self::EmptyFileName => "please enter a file name",
            Self::InvalidFileName => "file name must not contain path separators or '..'",
            Self::EmptyContent => "please enter some text or upload a document to analyze",
        })
    }
}

impl std::error::Error for ValidationError {}

/// Receives the full diagram after every committed mutation.
pub trait StateMirror {
    fn mirror(&mut self, diagram: &Diagram) -> Result<(), StoreError>;
}

/// Mirror that keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMirror;

impl StateMirror for NoMirror {
    fn mirror(&mut self, _diagram: &Diagram) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<M: StateMirror> StateMirror for Option<M> {
    fn mirror(&mut self, diagram: &Diagram) -> Result<(), StoreError> {
        match self {
            Some(mirror) => mirror.mirror(diagram),
            None => Ok(()),
        }
    }
}

#[derive(Debug)]
pub struct DiagramEditor<M = NoMirror> {
    diagram: Diagram,
    rev: u64,
    // Highest group id ever issued or loaded; ids above it are never reused.
    group_id_high_water: u32,
    checked_out: Option<(DiagramId, String)>,
    mirror: M,
}

impl Default for DiagramEditor<NoMirror> {
    fn default() -> Self {
        Self::new(NoMirror)
    }
}

impl<M: StateMirror> DiagramEditor<M> {
    pub fn new(mirror: M) -> Self {
        Self::with_diagram(Diagram::default(), mirror)
    }

    /// Starts from `diagram` (for example a restored autosave) without mirroring it back.
    pub fn with_diagram(diagram: Diagram, mirror: M) -> Self {
        let group_id_high_water = diagram.max_group_id().map_or(0, GroupId::get);
        Self {
            diagram,
            rev: 0,
            group_id_high_water,
            checked_out: None,
            mirror,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    pub fn mirror_mut(&mut self) -> &mut M {
        &mut self.mirror
    }

    pub fn checked_out_id(&self) -> Option<&DiagramId> {
        self.checked_out.as_ref().map(|(id, _)| id)
    }

    pub fn checked_out_name(&self) -> Option<&str> {
        self.checked_out.as_ref().map(|(_, name)| name.as_str())
    }

    /// Applies `ops` as one atomic transition and bumps the revision.
    pub fn apply(&mut self, ops: &[Op]) -> Result<ApplyResult, ApplyError> {
        let delta = apply_ops(&mut self.diagram, ops)?;
        if let Some(max) = self.diagram.max_group_id() {
            self.group_id_high_water = self.group_id_high_water.max(max.get());
        }
        if !ops.is_empty() {
            self.rev = self.rev.saturating_add(1);
            self.sync_mirror();
        }
        Ok(ApplyResult {
            new_rev: self.rev,
            applied: ops.len(),
            delta,
        })
    }

    pub fn update_header_data(&mut self, patch: HeaderPatch) -> Result<(), ApplyError> {
        self.apply(&[Op::Header(patch)]).map(drop)
    }

    pub fn update_flow_data(&mut self, patch: FlowPatch) -> Result<(), ApplyError> {
        self.apply(&[Op::Flow(patch)]).map(drop)
    }

    /// Appends a group named [`DEFAULT_GROUP_NAME`] with one empty cell per column.
    pub fn add_group(&mut self) -> Result<GroupId, ApplyError> {
        let current_max = self.diagram.max_group_id().map_or(0, GroupId::get);
        let group_id = GroupId::new(current_max.max(self.group_id_high_water)).next();
        self.apply(&[Op::Group(GroupOp::Add {
            group_id,
            name: DEFAULT_GROUP_NAME.to_owned(),
        })])?;
        Ok(group_id)
    }

    /// Returns `false` (and changes nothing) when `group_id` is unknown.
    pub fn remove_group(&mut self, group_id: GroupId) -> Result<bool, ApplyError> {
        if self.diagram.group(group_id).is_none() {
            return Ok(false);
        }
        let result = self.apply(&[Op::Group(GroupOp::Remove { group_id })])?;
        Ok(result.delta.removed_groups.contains(&group_id))
    }

    pub fn update_group_name(
        &mut self,
        group_id: GroupId,
        name: impl Into<String>,
    ) -> Result<bool, ApplyError> {
        if self.diagram.group(group_id).is_none() {
            return Ok(false);
        }
        self.apply(&[Op::Group(GroupOp::Rename {
            group_id,
            name: name.into(),
        })])?;
        Ok(true)
    }

    pub fn update_column_content(
        &mut self,
        column: FlowColumn,
        index: usize,
        content: impl Into<String>,
    ) -> Result<(), ApplyError> {
        self.apply(&[Op::SetCell {
            column,
            index,
            content: content.into(),
        }])
        .map(drop)
    }

    pub fn update_theme_color(
        &mut self,
        key: ThemeColorKey,
        value: impl Into<String>,
    ) -> Result<(), ApplyError> {
        self.apply(&[Op::Theme(ThemeOp::SetColor {
            key,
            value: value.into(),
        })])
        .map(drop)
    }

    pub fn update_all_column_colors(&mut self, value: impl Into<String>) -> Result<(), ApplyError> {
        self.apply(&[Op::Theme(ThemeOp::SetAllColumns {
            value: value.into(),
        })])
        .map(drop)
    }

    pub fn reset_theme_colors(&mut self) -> Result<(), ApplyError> {
        self.apply(&[Op::Theme(ThemeOp::Reset)]).map(drop)
    }

    pub fn set_logo_url(&mut self, logo_url: Option<String>) -> Result<(), ApplyError> {
        self.apply(&[Op::SetLogoUrl { logo_url }]).map(drop)
    }

    /// Flips grouping-column visibility and returns the new value.
    pub fn toggle_grouping_column(&mut self) -> Result<bool, ApplyError> {
        self.apply(&[Op::ToggleGroupingColumn])?;
        Ok(self.diagram.show_grouping_column())
    }

    /// Replaces the working diagram with the default one and forgets the checked-out id.
    ///
    /// Catalog entries are not touched; the group id high-water mark is kept.
    pub fn reset_to_default(&mut self) -> Result<(), ApplyError> {
        self.apply(&[Op::ResetToDefault])?;
        self.checked_out = None;
        Ok(())
    }

    /// Replaces the working diagram wholesale with a saved one and checks it out.
    pub fn load(&mut self, saved: SavedDiagram) {
        let SavedDiagram {
            id, name, diagram, ..
        } = saved;
        if let Some(max) = diagram.max_group_id() {
            self.group_id_high_water = self.group_id_high_water.max(max.get());
        }
        self.diagram = diagram;
        self.checked_out = Some((id, name));
        self.rev = self.rev.saturating_add(1);
        self.sync_mirror();
    }

    /// Forgets which saved diagram is checked out, so the next save creates a new entry.
    pub fn detach(&mut self) {
        self.checked_out = None;
    }

    /// Records `saved` as the checked-out diagram after a successful save.
    pub fn mark_saved(&mut self, saved: &SavedDiagram) {
        self.checked_out = Some((saved.id.clone(), saved.name.clone()));
    }

    /// Packages the working diagram for persistence under `name`.
    ///
    /// Reuses the checked-out id so saving again updates the same catalog entry; otherwise a
    /// fresh id is generated. Timestamps are filled in by the catalog.
    pub fn snapshot(&self, name: &str) -> Result<SavedDiagram, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let id = self
            .checked_out_id()
            .cloned()
            .unwrap_or_else(DiagramId::generate);
        Ok(SavedDiagram::with_id(id, name, self.diagram.clone()))
    }

    fn sync_mirror(&mut self) {
        if let Err(err) = self.mirror.mirror(&self.diagram) {
            tracing::warn!(error = %err, rev = self.rev, "failed to mirror diagram state");
        }
    }
}
