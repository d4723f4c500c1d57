// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flat `Section,Content` table export.

use crate::model::{FlowColumn, SavedDiagram};

/// Renders the diagram as CSV: every field quoted, quotes doubled, rows joined by `\n`.
pub fn export_csv(saved: &SavedDiagram) -> String {
    let header = saved.diagram.header_data();
    let flow = saved.diagram.flow_data();
    let columns = saved.diagram.columns();

    let mut rows: Vec<(String, String)> = vec![
        ("Section".to_owned(), "Content".to_owned()),
        ("Title".to_owned(), header.title.clone()),
        ("Need".to_owned(), header.need.clone()),
        ("Need Content".to_owned(), header.need_content.clone().unwrap_or_default()),
        ("Vision".to_owned(), header.vision.clone()),
        ("Vision Content".to_owned(), header.vision_content.clone().unwrap_or_default()),
        ("Purpose".to_owned(), header.purpose.clone()),
        ("Purpose Content".to_owned(), header.purpose_content.clone().unwrap_or_default()),
        (String::new(), String::new()),
        ("Flow Elements".to_owned(), String::new()),
    ];

    // The flow block labels "inputs" as Inputs; group blocks call the same column Resources.
    rows.push(("Inputs".to_owned(), flow.label(FlowColumn::Inputs).to_owned()));
    for column in &FlowColumn::ALL[1..] {
        rows.push((column.export_label().to_owned(), flow.label(*column).to_owned()));
    }
    rows.push((String::new(), String::new()));

    for (index, group) in saved.diagram.groups().iter().enumerate() {
        rows.push((format!("Group {}", index + 1), group.name.clone()));
        for column in FlowColumn::ALL {
            let cell = columns.cell(column, index).unwrap_or_default();
            rows.push((column.export_label().to_owned(), cell.to_owned()));
        }
        rows.push((String::new(), String::new()));
    }

    rows.iter()
        .map(|(section, content)| format!("{},{}", quote(section), quote(content)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
