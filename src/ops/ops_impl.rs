// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Single-op mutation helpers used by `apply_ops`.
fn apply_op(diagram: &mut Diagram, op: &Op, delta: &mut DeltaBuilder) -> Result<(), ApplyError> {
    match op {
        Op::Header(patch) => {
            apply_header_patch(diagram, patch);
            delta.record_section(Section::Header);
            Ok(())
        }
        Op::Flow(patch) => {
            for column in FlowColumn::ALL {
                if let Some(label) = patch.label(column) {
                    *diagram.flow_data_mut().label_mut(column) = label.to_owned();
                }
            }
            delta.record_section(Section::Flow);
            Ok(())
        }
        Op::Group(group_op) => apply_group_op(diagram, group_op, delta),
        Op::SetCell {
            column,
            index,
            content,
        } => {
            diagram
                .set_cell(*column, *index, content.clone())
                .map_err(ApplyError::CellOutOfRange)?;
            if let Some(group) = diagram.groups().get(*index) {
                delta.record_updated(group.id);
            }
            delta.record_section(Section::Cells);
            Ok(())
        }
        Op::Theme(theme_op) => {
            apply_theme_op(diagram.theme_colors_mut(), theme_op)?;
            delta.record_section(Section::Theme);
            Ok(())
        }
        Op::SetLogoUrl { logo_url } => {
            diagram.set_logo_url(logo_url.clone());
            delta.record_section(Section::Logo);
            Ok(())
        }
        Op::ToggleGroupingColumn => {
            let show = !diagram.show_grouping_column();
            diagram.set_show_grouping_column(show);
            delta.record_section(Section::GroupingColumn);
            Ok(())
        }
        Op::ResetToDefault => {
            for group in diagram.groups() {
                delta.record_removed(group.id);
            }
            *diagram = Diagram::default();
            for group in diagram.groups() {
                delta.record_added(group.id);
            }
            for section in [
                Section::Header,
                Section::Flow,
                Section::Cells,
                Section::Theme,
                Section::Logo,
                Section::GroupingColumn,
            ] {
                delta.record_section(section);
            }
            Ok(())
        }
    }
}

fn apply_header_patch(diagram: &mut Diagram, patch: &HeaderPatch) {
    let header = diagram.header_data_mut();
    if let Some(title) = &patch.title {
        header.title = title.clone();
    }
    if let Some(need) = &patch.need {
        header.need = need.clone();
    }
    if let Some(need_content) = &patch.need_content {
        header.need_content = need_content.clone();
    }
    if let Some(vision) = &patch.vision {
        header.vision = vision.clone();
    }
    if let Some(vision_content) = &patch.vision_content {
        header.vision_content = vision_content.clone();
    }
    if let Some(purpose) = &patch.purpose {
        header.purpose = purpose.clone();
    }
    if let Some(purpose_content) = &patch.purpose_content {
        header.purpose_content = purpose_content.clone();
    }
}

fn apply_group_op(
    diagram: &mut Diagram,
    op: &GroupOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        GroupOp::Add { group_id, name } => {
            if diagram.group(*group_id).is_some() {
                return Err(ApplyError::GroupAlreadyExists {
                    group_id: *group_id,
                });
            }
            diagram.push_group(Group::new(*group_id, name.clone()));
            delta.record_added(*group_id);
            Ok(())
        }
        GroupOp::Remove { group_id } => {
            let Some(index) = diagram.group_index(*group_id) else {
                return Ok(());
            };
            diagram.remove_group_at(index);
            delta.record_removed(*group_id);
            Ok(())
        }
        GroupOp::Rename { group_id, name } => {
            if diagram.rename_group(*group_id, name.clone()) {
                delta.record_updated(*group_id);
            }
            Ok(())
        }
    }
}

fn apply_theme_op(colors: &mut ThemeColors, op: &ThemeOp) -> Result<(), ApplyError> {
    match op {
        ThemeOp::SetColor { key, value } => {
            let slot = match key {
                ThemeColorKey::Header => &mut colors.header,
                ThemeColorKey::Need => &mut colors.need,
                ThemeColorKey::Flow => &mut colors.flow,
                ThemeColorKey::Grouping => &mut colors.grouping,
                ThemeColorKey::Column(index) => colors
                    .columns
                    .get_mut(*index)
                    .ok_or(ApplyError::ThemeColumnOutOfRange { index: *index })?,
            };
            *slot = value.clone();
            Ok(())
        }
        ThemeOp::SetAllColumns { value } => {
            for slot in &mut colors.columns {
                *slot = value.clone();
            }
            Ok(())
        }
        ThemeOp::Reset => {
            *colors = ThemeColors::default();
            Ok(())
        }
    }
}
