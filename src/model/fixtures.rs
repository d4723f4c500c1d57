// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::diagram::{Diagram, FlowColumn, Group, HeaderData};
use super::ids::{DiagramId, GroupId};
use super::saved::SavedDiagram;

/// Two groups with every cell filled, plus header detail text.
pub(crate) fn literacy_program() -> Diagram {
    let mut diagram = Diagram::default();
    *diagram.header_data_mut() = HeaderData {
        title: "Rural Literacy".to_owned(),
        need: "Need: limited access to schooling".to_owned(),
        need_content: Some("Rural districts lack trained teachers.".to_owned()),
        vision: "Vision: every child reads".to_owned(),
        vision_content: None,
        purpose: "Purpose: close the urban/rural gap".to_owned(),
        purpose_content: Some("Focus on ages 6-12.".to_owned()),
    };
    diagram.rename_group(GroupId::FIRST, "Teachers");
    diagram.push_group(Group::new(GroupId::new(2), "Infrastructure"));

    for column in FlowColumn::ALL {
        diagram
            .set_cell(column, 0, format!("teachers {}", column.export_label()))
            .expect("row 0");
        diagram
            .set_cell(column, 1, format!("infra {}", column.export_label()))
            .expect("row 1");
    }
    diagram
}

pub(crate) fn saved_literacy_program() -> SavedDiagram {
    SavedDiagram {
        id: DiagramId::new("4f1c2a9e-0000-4000-8000-000000000001").expect("id"),
        name: "Literacy \"pilot\"".to_owned(),
        created_at: "2024-03-05T09:30:00.000Z".to_owned(),
        updated_at: "2024-03-06T17:45:12.345Z".to_owned(),
        diagram: literacy_program(),
    }
}
