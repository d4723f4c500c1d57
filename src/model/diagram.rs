// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ids::GroupId;

pub const DEFAULT_GROUP_NAME: &str = "Grouping";
pub const FLOW_COLUMN_COUNT: usize = 6;

/// One of the six fixed pipeline stages, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlowColumn {
    Inputs,
    Activities,
    Outputs,
    InterimOutcomes,
    LongerTermOutcomes,
    Impact,
}

impl FlowColumn {
    pub const ALL: [FlowColumn; FLOW_COLUMN_COUNT] = [
        Self::Inputs,
        Self::Activities,
        Self::Outputs,
        Self::InterimOutcomes,
        Self::LongerTermOutcomes,
        Self::Impact,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Inputs => 0,
            Self::Activities => 1,
            Self::Outputs => 2,
            Self::InterimOutcomes => 3,
            Self::LongerTermOutcomes => 4,
            Self::Impact => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Key used in the persisted JSON shape.
    pub fn key(self) -> &'static str {
        match self {
            Self::Inputs => "inputs",
            Self::Activities => "activities",
            Self::Outputs => "outputs",
            Self::InterimOutcomes => "interimOutcomes",
            Self::LongerTermOutcomes => "longerTermOutcomes",
            Self::Impact => "impact",
        }
    }

    /// Row label used by the CSV and text exports.
    pub fn export_label(self) -> &'static str {
        match self {
            Self::Inputs => "Resources",
            Self::Activities => "Activities",
            Self::Outputs => "Outputs",
            Self::InterimOutcomes => "Interim Outcomes",
            Self::LongerTermOutcomes => "Longer Term Outcomes",
            Self::Impact => "Impact",
        }
    }

    /// Accepts the JSON key, a snake/kebab-case spelling, or the 1-based column number.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', '-', ' '], "");
        match normalized.as_str() {
            "inputs" | "resources" | "1" => Some(Self::Inputs),
            "activities" | "2" => Some(Self::Activities),
            "outputs" | "3" => Some(Self::Outputs),
            "interimoutcomes" | "4" => Some(Self::InterimOutcomes),
            "longertermoutcomes" | "5" => Some(Self::LongerTermOutcomes),
            "impact" | "6" => Some(Self::Impact),
            _ => None,
        }
    }
}

impl fmt::Display for FlowColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeaderData {
    pub title: String,
    pub need: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_content: Option<String>,
    pub vision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_content: Option<String>,
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose_content: Option<String>,
}

impl Default for HeaderData {
    fn default() -> Self {
        Self {
            title: "Theory of Change Template".to_owned(),
            need: "Need:".to_owned(),
            need_content: None,
            vision: "Vision:".to_owned(),
            vision_content: None,
            purpose: "Purpose:".to_owned(),
            purpose_content: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowData {
    pub inputs: String,
    pub activities: String,
    pub outputs: String,
    pub interim_outcomes: String,
    pub longer_term_outcomes: String,
    pub impact: String,
}

impl FlowData {
    pub fn label(&self, column: FlowColumn) -> &str {
        match column {
            FlowColumn::Inputs => &self.inputs,
            FlowColumn::Activities => &self.activities,
            FlowColumn::Outputs => &self.outputs,
            FlowColumn::InterimOutcomes => &self.interim_outcomes,
            FlowColumn::LongerTermOutcomes => &self.longer_term_outcomes,
            FlowColumn::Impact => &self.impact,
        }
    }

    pub fn label_mut(&mut self, column: FlowColumn) -> &mut String {
        match column {
            FlowColumn::Inputs => &mut self.inputs,
            FlowColumn::Activities => &mut self.activities,
            FlowColumn::Outputs => &mut self.outputs,
            FlowColumn::InterimOutcomes => &mut self.interim_outcomes,
            FlowColumn::LongerTermOutcomes => &mut self.longer_term_outcomes,
            FlowColumn::Impact => &mut self.impact,
        }
    }
}

impl Default for FlowData {
    fn default() -> Self {
        Self {
            inputs: "Resources".to_owned(),
            activities: "Activities".to_owned(),
            outputs: "Outputs".to_owned(),
            interim_outcomes: "Interim Outcomes".to_owned(),
            longer_term_outcomes: "Longer term Outcomes".to_owned(),
            impact: "Impact".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ThemeColors {
    pub header: String,
    pub need: String,
    pub flow: String,
    pub grouping: String,
    pub columns: [String; FLOW_COLUMN_COUNT],
}

impl ThemeColors {
    pub fn column(&self, column: FlowColumn) -> &str {
        &self.columns[column.index()]
    }

    /// Foreground colour with enough contrast against `background` (`#rrggbb`).
    ///
    /// Luminance above one half picks black, anything else (including unparsable input) white.
    pub fn text_color_for(background: &str) -> &'static str {
        let hex = background.trim().trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
        };
        let (Some(r), Some(g), Some(b)) = (channel(0..2), channel(2..4), channel(4..6)) else {
            return "#ffffff";
        };
        let luminance = (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0;
        if luminance > 0.5 {
            "#000000"
        } else {
            "#ffffff"
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            header: "#475569".to_owned(),
            need: "#475569".to_owned(),
            flow: "#f1f5f9".to_owned(),
            grouping: "#f5f5dc".to_owned(),
            columns: std::array::from_fn(|_| "#e2e8f0".to_owned()),
        }
    }
}

/// Cell contents per flow column, positionally aligned with [`Diagram::groups`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    cells: [Vec<String>; FLOW_COLUMN_COUNT],
}

impl Columns {
    fn empty_rows(rows: usize) -> Self {
        Self {
            cells: std::array::from_fn(|_| vec![String::new(); rows]),
        }
    }

    pub fn column(&self, column: FlowColumn) -> &[String] {
        &self.cells[column.index()]
    }

    pub fn cell(&self, column: FlowColumn, index: usize) -> Option<&str> {
        self.cells[column.index()].get(index).map(String::as_str)
    }

    /// Number of rows; every column has the same length.
    pub fn rows(&self) -> usize {
        self.cells[0].len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellOutOfRange {
    pub column: FlowColumn,
    pub index: usize,
    pub len: usize,
}

impl fmt::Display for CellOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cell index {} is out of range for column {} (len={})",
            self.index, self.column, self.len
        )
    }
}

impl std::error::Error for CellOutOfRange {}

/// How many cells were padded or dropped to realign imported columns with the groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Realignment {
    pub padded: usize,
    pub dropped: usize,
}

impl Realignment {
    pub fn is_noop(&self) -> bool {
        self.padded == 0 && self.dropped == 0
    }
}

/// The editable Theory of Change document.
///
/// Groups and column cells only change together, so `columns().rows() == groups().len()` holds
/// for every value of this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    header_data: HeaderData,
    flow_data: FlowData,
    groups: Vec<Group>,
    columns: Columns,
    theme_colors: ThemeColors,
    logo_url: Option<String>,
    show_grouping_column: bool,
}

impl Default for Diagram {
    fn default() -> Self {
        Self {
            header_data: HeaderData::default(),
            flow_data: FlowData::default(),
            groups: vec![Group::new(GroupId::FIRST, DEFAULT_GROUP_NAME)],
            columns: Columns::empty_rows(1),
            theme_colors: ThemeColors::default(),
            logo_url: None,
            show_grouping_column: false,
        }
    }
}

impl Diagram {
    /// Builds a diagram from raw parts, realigning `cells` to `groups`.
    ///
    /// Short columns are padded with empty strings; cells beyond the last group are dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        header_data: HeaderData,
        flow_data: FlowData,
        groups: Vec<Group>,
        mut cells: [Vec<String>; FLOW_COLUMN_COUNT],
        theme_colors: ThemeColors,
        logo_url: Option<String>,
        show_grouping_column: bool,
    ) -> (Self, Realignment) {
        let rows = groups.len();
        let mut realignment = Realignment::default();
        for column in &mut cells {
            if column.len() < rows {
                realignment.padded += rows - column.len();
                column.resize(rows, String::new());
            } else if column.len() > rows {
                realignment.dropped += column.len() - rows;
                column.truncate(rows);
            }
        }

        let diagram = Self {
            header_data,
            flow_data,
            groups,
            columns: Columns { cells },
            theme_colors,
            logo_url,
            show_grouping_column,
        };
        (diagram, realignment)
    }

    pub fn header_data(&self) -> &HeaderData {
        &self.header_data
    }

    pub fn header_data_mut(&mut self) -> &mut HeaderData {
        &mut self.header_data
    }

    pub fn flow_data(&self) -> &FlowData {
        &self.flow_data
    }

    pub fn flow_data_mut(&mut self) -> &mut FlowData {
        &mut self.flow_data
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, group_id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == group_id)
    }

    pub fn group_index(&self, group_id: GroupId) -> Option<usize> {
        self.groups.iter().position(|group| group.id == group_id)
    }

    pub fn max_group_id(&self) -> Option<GroupId> {
        self.groups.iter().map(|group| group.id).max()
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn theme_colors(&self) -> &ThemeColors {
        &self.theme_colors
    }

    pub fn theme_colors_mut(&mut self) -> &mut ThemeColors {
        &mut self.theme_colors
    }

    pub fn logo_url(&self) -> Option<&str> {
        self.logo_url.as_deref()
    }

    pub fn set_logo_url(&mut self, logo_url: Option<String>) {
        self.logo_url = logo_url;
    }

    pub fn show_grouping_column(&self) -> bool {
        self.show_grouping_column
    }

    pub fn set_show_grouping_column(&mut self, show: bool) {
        self.show_grouping_column = show;
    }

    /// Appends a group and one empty cell to every column.
    pub fn push_group(&mut self, group: Group) {
        self.groups.push(group);
        for column in &mut self.columns.cells {
            column.push(String::new());
        }
    }

    /// Removes the group at `index` together with the cell at the same index in every column.
    pub fn remove_group_at(&mut self, index: usize) -> Option<Group> {
        if index >= self.groups.len() {
            return None;
        }
        for column in &mut self.columns.cells {
            column.remove(index);
        }
        Some(self.groups.remove(index))
    }

    pub fn rename_group(&mut self, group_id: GroupId, name: impl Into<String>) -> bool {
        match self.groups.iter_mut().find(|group| group.id == group_id) {
            Some(group) => {
                group.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn set_cell(
        &mut self,
        column: FlowColumn,
        index: usize,
        content: impl Into<String>,
    ) -> Result<(), CellOutOfRange> {
        let cells = &mut self.columns.cells[column.index()];
        let len = cells.len();
        let Some(cell) = cells.get_mut(index) else {
            return Err(CellOutOfRange { column, index, len });
        };
        *cell = content.into();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagram, FlowColumn, Group, ThemeColors, DEFAULT_GROUP_NAME};
    use crate::model::GroupId;

    #[test]
    fn default_diagram_has_one_group_and_aligned_columns() {
        let diagram = Diagram::default();
        assert_eq!(diagram.groups(), &[Group::new(GroupId::FIRST, DEFAULT_GROUP_NAME)]);
        for column in FlowColumn::ALL {
            assert_eq!(diagram.columns().column(column), &[String::new()]);
        }
        assert!(!diagram.show_grouping_column());
        assert_eq!(diagram.logo_url(), None);
    }

    #[test]
    fn remove_group_at_shifts_cells_in_every_column() {
        let mut diagram = Diagram::default();
        diagram.push_group(Group::new(GroupId::new(2), "B"));
        diagram.push_group(Group::new(GroupId::new(3), "C"));
        for column in FlowColumn::ALL {
            diagram.set_cell(column, 2, format!("{column}-c")).expect("set cell");
        }

        let removed = diagram.remove_group_at(1).expect("removed");
        assert_eq!(removed.id, GroupId::new(2));
        for column in FlowColumn::ALL {
            assert_eq!(diagram.columns().column(column).len(), 2);
            assert_eq!(diagram.columns().cell(column, 1), Some(format!("{column}-c").as_str()));
        }
        assert!(diagram.remove_group_at(5).is_none());
    }

    #[test]
    fn set_cell_rejects_out_of_range_without_changing_lengths() {
        let mut diagram = Diagram::default();
        let err = diagram
            .set_cell(FlowColumn::Impact, 1, "nope")
            .expect_err("out of range");
        assert_eq!(err.len, 1);
        assert_eq!(diagram.columns().rows(), 1);
    }

    #[test]
    fn from_parts_pads_and_truncates_columns() {
        let groups = vec![Group::new(GroupId::new(1), "A"), Group::new(GroupId::new(2), "B")];
        let cells = [
            vec!["a".to_owned()],
            vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
            Vec::new(),
            vec![String::new(), String::new()],
            vec![String::new(), String::new()],
            vec![String::new(), String::new()],
        ];
        let (diagram, realignment) = Diagram::from_parts(
            Default::default(),
            Default::default(),
            groups,
            cells,
            ThemeColors::default(),
            None,
            true,
        );
        assert_eq!(realignment.padded, 3);
        assert_eq!(realignment.dropped, 1);
        for column in FlowColumn::ALL {
            assert_eq!(diagram.columns().column(column).len(), 2);
        }
        assert_eq!(diagram.columns().cell(FlowColumn::Activities, 1), Some("b"));
    }

    #[test]
    fn flow_column_parse_accepts_json_keys_and_numbers() {
        for column in FlowColumn::ALL {
            assert_eq!(FlowColumn::parse(column.key()), Some(column));
            assert_eq!(FlowColumn::parse(&(column.index() + 1).to_string()), Some(column));
        }
        assert_eq!(FlowColumn::parse("longer_term_outcomes"), Some(FlowColumn::LongerTermOutcomes));
        assert_eq!(FlowColumn::parse("resources"), Some(FlowColumn::Inputs));
        assert_eq!(FlowColumn::parse("nope"), None);
    }

    #[test]
    fn text_color_follows_luminance() {
        assert_eq!(ThemeColors::text_color_for("#475569"), "#ffffff");
        assert_eq!(ThemeColors::text_color_for("#f1f5f9"), "#000000");
        assert_eq!(ThemeColors::text_color_for("f5f5dc"), "#000000");
        assert_eq!(ThemeColors::text_color_for("red"), "#ffffff");
    }
}
