// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Diagram, FlowColumn, GroupId, ThemeColors};

use super::{
    apply_ops, ApplyError, FlowPatch, GroupOp, HeaderPatch, Op, Section, ThemeColorKey, ThemeOp,
};

fn add(id: u32) -> Op {
    Op::Group(GroupOp::Add {
        group_id: GroupId::new(id),
        name: "Grouping".to_owned(),
    })
}

fn remove(id: u32) -> Op {
    Op::Group(GroupOp::Remove {
        group_id: GroupId::new(id),
    })
}

fn assert_aligned(diagram: &Diagram) {
    for column in FlowColumn::ALL {
        assert_eq!(
            diagram.columns().column(column).len(),
            diagram.groups().len(),
            "column {column} out of sync"
        );
    }
}

#[test]
fn group_ops_keep_columns_aligned_at_every_step() {
    let mut diagram = Diagram::default();
    let script = [add(2), add(3), remove(1), add(4), remove(3), remove(99), add(5), remove(5)];

    for op in script {
        apply_ops(&mut diagram, std::slice::from_ref(&op)).expect("apply");
        assert_aligned(&diagram);
    }

    let ids: Vec<u32> = diagram.groups().iter().map(|g| g.id.get()).collect();
    assert_eq!(ids, [2, 4]);
}

#[test]
fn add_then_remove_restores_previous_state() {
    let mut diagram = Diagram::default();
    apply_ops(
        &mut diagram,
        &[Op::SetCell {
            column: FlowColumn::Outputs,
            index: 0,
            content: "books".to_owned(),
        }],
    )
    .expect("setup");
    let before = diagram.clone();

    apply_ops(&mut diagram, &[add(2)]).expect("add");
    apply_ops(&mut diagram, &[remove(2)]).expect("remove");

    assert_eq!(diagram, before);
}

#[test]
fn remove_middle_group_shifts_following_cells() {
    let mut diagram = Diagram::default();
    apply_ops(&mut diagram, &[add(2), add(3)]).expect("add");
    apply_ops(
        &mut diagram,
        &[Op::SetCell {
            column: FlowColumn::Impact,
            index: 2,
            content: "third".to_owned(),
        }],
    )
    .expect("set");

    let delta = apply_ops(&mut diagram, &[remove(2)]).expect("remove");
    assert_eq!(delta.removed_groups, vec![GroupId::new(2)]);

    let ids: Vec<u32> = diagram.groups().iter().map(|g| g.id.get()).collect();
    assert_eq!(ids, [1, 3]);
    assert_eq!(diagram.columns().cell(FlowColumn::Impact, 1), Some("third"));
    assert_aligned(&diagram);
}

#[test]
fn failing_batch_leaves_diagram_untouched() {
    let mut diagram = Diagram::default();
    let before = diagram.clone();

    let err = apply_ops(
        &mut diagram,
        &[
            add(2),
            Op::SetCell {
                column: FlowColumn::Inputs,
                index: 7,
                content: "x".to_owned(),
            },
        ],
    )
    .expect_err("out of range");

    assert!(matches!(err, ApplyError::CellOutOfRange(_)));
    assert_eq!(diagram, before);
}

#[test]
fn adding_existing_group_id_is_rejected() {
    let mut diagram = Diagram::default();
    let err = apply_ops(&mut diagram, &[add(1)]).expect_err("duplicate");
    assert_eq!(
        err,
        ApplyError::GroupAlreadyExists {
            group_id: GroupId::new(1)
        }
    );
}

#[test]
fn removing_or_renaming_missing_group_is_a_noop() {
    let mut diagram = Diagram::default();
    let before = diagram.clone();

    let delta = apply_ops(
        &mut diagram,
        &[
            remove(42),
            Op::Group(GroupOp::Rename {
                group_id: GroupId::new(42),
                name: "ghost".to_owned(),
            }),
        ],
    )
    .expect("apply");

    assert!(delta.is_empty());
    assert_eq!(diagram, before);
}

#[test]
fn header_content_can_be_cleared_while_absent_fields_stay() {
    let mut diagram = Diagram::default();
    diagram.header_data_mut().need_content = Some("Too few teachers".to_owned());
    diagram.header_data_mut().purpose_content = Some("Train locally".to_owned());

    apply_ops(
        &mut diagram,
        &[Op::Header(HeaderPatch {
            need_content: Some(None),
            ..HeaderPatch::default()
        })],
    )
    .expect("apply");

    assert_eq!(diagram.header_data().need_content, None);
    assert_eq!(diagram.header_data().purpose_content.as_deref(), Some("Train locally"));
}

#[test]
fn header_and_flow_patches_merge_shallowly() {
    let mut diagram = Diagram::default();
    let delta = apply_ops(
        &mut diagram,
        &[
            Op::Header(HeaderPatch {
                title: Some(String::new()),
                vision_content: Some(Some("Everyone reads".to_owned())),
                ..HeaderPatch::default()
            }),
            Op::Flow(FlowPatch::single(FlowColumn::Impact, "Change")),
        ],
    )
    .expect("apply");

    assert_eq!(diagram.header_data().title, "");
    assert_eq!(diagram.header_data().need, "Need:");
    assert_eq!(diagram.header_data().vision_content.as_deref(), Some("Everyone reads"));
    assert_eq!(diagram.flow_data().impact, "Change");
    assert_eq!(diagram.flow_data().inputs, "Resources");
    assert!(delta.sections.contains(&Section::Header));
    assert!(delta.sections.contains(&Section::Flow));
}

#[test]
fn theme_ops_address_fixed_columns() {
    let mut diagram = Diagram::default();
    apply_ops(
        &mut diagram,
        &[
            Op::Theme(ThemeOp::SetColor {
                key: ThemeColorKey::Column(5),
                value: "#000000".to_owned(),
            }),
            Op::Theme(ThemeOp::SetColor {
                key: ThemeColorKey::Grouping,
                value: "#123456".to_owned(),
            }),
        ],
    )
    .expect("apply");
    assert_eq!(diagram.theme_colors().columns[5], "#000000");
    assert_eq!(diagram.theme_colors().grouping, "#123456");

    let err = apply_ops(
        &mut diagram,
        &[Op::Theme(ThemeOp::SetColor {
            key: ThemeColorKey::Column(6),
            value: "#ffffff".to_owned(),
        })],
    )
    .expect_err("index 6");
    assert_eq!(err, ApplyError::ThemeColumnOutOfRange { index: 6 });

    apply_ops(
        &mut diagram,
        &[Op::Theme(ThemeOp::SetAllColumns {
            value: "#abcdef".to_owned(),
        })],
    )
    .expect("all columns");
    assert!(diagram.theme_colors().columns.iter().all(|c| c == "#abcdef"));

    apply_ops(&mut diagram, &[Op::Theme(ThemeOp::Reset)]).expect("reset");
    assert_eq!(diagram.theme_colors(), &ThemeColors::default());
}

#[test]
fn theme_color_key_parses_column_syntax() {
    assert_eq!("column:3".parse(), Ok(ThemeColorKey::Column(3)));
    assert_eq!("Header".parse(), Ok(ThemeColorKey::Header));
    assert!("column".parse::<ThemeColorKey>().is_err());
    assert!("border".parse::<ThemeColorKey>().is_err());
}

#[test]
fn reset_restores_default_diagram() {
    let mut diagram = Diagram::default();
    apply_ops(
        &mut diagram,
        &[
            add(2),
            Op::ToggleGroupingColumn,
            Op::SetLogoUrl {
                logo_url: Some("data:image/png;base64,AAAA".to_owned()),
            },
        ],
    )
    .expect("setup");

    let delta = apply_ops(&mut diagram, &[Op::ResetToDefault]).expect("reset");
    assert_eq!(diagram, Diagram::default());
    assert!(delta.removed_groups.contains(&GroupId::new(2)));
}
