// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Human-readable plain text export.

use std::fmt::Write as _;

use crate::model::{parse_timestamp, FlowColumn, SavedDiagram};

const EMPTY_CELL: &str = "N/A";

/// Renders the fixed text layout: title, dates, need/vision/purpose, flow line, group blocks.
pub fn export_text(saved: &SavedDiagram) -> String {
    let header = saved.diagram.header_data();
    let flow = saved.diagram.flow_data();
    let columns = saved.diagram.columns();

    let mut out = String::new();
    let _ = writeln!(out, "THEORY OF CHANGE: {}", header.title);
    let _ = writeln!(out, "Created: {}", display_date(&saved.created_at));
    let _ = writeln!(out, "Updated: {}", display_date(&saved.updated_at));
    out.push('\n');

    for (label, value, detail) in [
        ("NEED", &header.need, &header.need_content),
        ("VISION", &header.vision, &header.vision_content),
        ("PURPOSE", &header.purpose, &header.purpose_content),
    ] {
        let _ = writeln!(out, "{label}: {value}");
        if let Some(detail) = detail.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "{detail}");
        }
        out.push('\n');
    }

    out.push_str("FLOW:\n");
    let stages = FlowColumn::ALL
        .iter()
        .map(|column| flow.label(*column))
        .collect::<Vec<_>>();
    let _ = writeln!(out, "{}", stages.join(" → "));
    out.push('\n');

    out.push_str("DETAILED CONTENT:\n");
    for (index, group) in saved.diagram.groups().iter().enumerate() {
        let _ = writeln!(out, "\nGroup {}: {}", index + 1, group.name);
        for column in FlowColumn::ALL {
            let cell = columns
                .cell(column, index)
                .filter(|cell| !cell.is_empty())
                .unwrap_or(EMPTY_CELL);
            let _ = writeln!(out, "{}: {cell}", column.export_label());
        }
    }

    out
}

/// `M/D/YYYY` for RFC 3339 input; anything else is shown verbatim.
fn display_date(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(ts) => ts.format("%-m/%-d/%Y").to_string(),
        None => raw.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{display_date, export_text};
    use crate::model::fixtures::saved_literacy_program;
    use crate::model::FlowColumn;

    #[test]
    fn text_export_renders_fixed_layout() {
        let mut saved = saved_literacy_program();
        saved
            .diagram
            .set_cell(FlowColumn::Outputs, 1, "")
            .expect("clear cell");
        let text = export_text(&saved);

        let expected_head = "THEORY OF CHANGE: Rural Literacy\n\
Created: 3/5/2024\n\
Updated: 3/6/2024\n\
\n\
NEED: Need: limited access to schooling\n\
Rural districts lack trained teachers.\n\
\n\
VISION: Vision: every child reads\n\
\n\
PURPOSE: Purpose: close the urban/rural gap\n\
Focus on ages 6-12.\n\
\n\
FLOW:\n\
Resources → Activities → Outputs → Interim Outcomes → Longer term Outcomes → Impact\n\
\n\
DETAILED CONTENT:\n";
        assert!(text.starts_with(expected_head), "{text}");

        assert_eq!(text.matches("\nGroup ").count(), 2);
        let first = text.find("Group 1: Teachers").expect("group 1");
        let second = text.find("Group 2: Infrastructure").expect("group 2");
        assert!(first < second);
        assert!(text[second..].contains("Outputs: N/A\n"));
        assert!(text.ends_with("Impact: infra Impact\n"));
    }

    #[test]
    fn display_date_falls_back_to_raw_value() {
        assert_eq!(display_date("2024-12-31T23:59:59.000Z"), "12/31/2024");
        assert_eq!(display_date("sometime"), "sometime");
    }
}
