// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! JSON interchange format shared by the catalog, the autosave slot, and `.toc.json` files.
//!
//! The model types stay serde-free where they carry invariants; these `*Json` mirrors define the
//! wire shape and conversion realigns anything a foreign writer got wrong.

use std::collections::BTreeSet;
use std::fmt;

use schemars::{JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{
    Diagram, DiagramId, FlowColumn, FlowData, Group, HeaderData, IdError, SavedDiagram,
    ThemeColors, FLOW_COLUMN_COUNT,
};

const AUTOSAVE_VERSION: u32 = 0;

#[derive(Debug)]
pub enum FormatError {
    Json(serde_json::Error),
    InvalidStructure { reason: String },
    InvalidId(IdError),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(source) => write!(f, "invalid JSON: {source}"),
            Self::InvalidStructure { reason } => {
                write!(f, "invalid diagram file format: {reason}")
            }
            Self::InvalidId(source) => write!(f, "invalid diagram id: {source}"),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(source) => Some(source),
            Self::InvalidId(source) => Some(source),
            Self::InvalidStructure { .. } => None,
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json(source)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ColumnsJson {
    #[serde(default)]
    inputs: Vec<String>,
    #[serde(default)]
    activities: Vec<String>,
    #[serde(default)]
    outputs: Vec<String>,
    #[serde(default)]
    interim_outcomes: Vec<String>,
    #[serde(default)]
    longer_term_outcomes: Vec<String>,
    #[serde(default)]
    impact: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct DiagramJson {
    header_data: HeaderData,
    flow_data: FlowData,
    groups: Vec<Group>,
    columns: ColumnsJson,
    #[serde(default)]
    logo_url: Option<String>,
    #[serde(default)]
    show_grouping_column: bool,
    theme_colors: ThemeColors,
}

/// Persisted/exchanged form of a diagram (`.toc.json`, catalog entries).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SavedDiagramJson {
    id: DiagramId,
    name: String,
    created_at: String,
    updated_at: String,
    #[serde(flatten)]
    diagram: DiagramJson,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AutosaveJson {
    state: DiagramJson,
    #[serde(default)]
    version: u32,
}

fn diagram_to_json(diagram: &Diagram) -> DiagramJson {
    let cells = |column: FlowColumn| diagram.columns().column(column).to_vec();
    DiagramJson {
        header_data: diagram.header_data().clone(),
        flow_data: diagram.flow_data().clone(),
        groups: diagram.groups().to_vec(),
        columns: ColumnsJson {
            inputs: cells(FlowColumn::Inputs),
            activities: cells(FlowColumn::Activities),
            outputs: cells(FlowColumn::Outputs),
            interim_outcomes: cells(FlowColumn::InterimOutcomes),
            longer_term_outcomes: cells(FlowColumn::LongerTermOutcomes),
            impact: cells(FlowColumn::Impact),
        },
        logo_url: diagram.logo_url().map(ToOwned::to_owned),
        show_grouping_column: diagram.show_grouping_column(),
        theme_colors: diagram.theme_colors().clone(),
    }
}

fn diagram_from_json(json: DiagramJson) -> Result<Diagram, FormatError> {
    let mut seen = BTreeSet::new();
    if let Some(group) = json.groups.iter().find(|group| !seen.insert(group.id)) {
        return Err(FormatError::InvalidStructure {
            reason: format!("duplicate group id {}", group.id),
        });
    }

    let ColumnsJson {
        inputs,
        activities,
        outputs,
        interim_outcomes,
        longer_term_outcomes,
        impact,
    } = json.columns;
    let cells: [Vec<String>; FLOW_COLUMN_COUNT] = [
        inputs,
        activities,
        outputs,
        interim_outcomes,
        longer_term_outcomes,
        impact,
    ];

    let (diagram, realignment) = Diagram::from_parts(
        json.header_data,
        json.flow_data,
        json.groups,
        cells,
        json.theme_colors,
        json.logo_url,
        json.show_grouping_column,
    );
    if !realignment.is_noop() {
        tracing::warn!(
            padded = realignment.padded,
            dropped = realignment.dropped,
            groups = diagram.groups().len(),
            "realigned imported columns with groups"
        );
    }
    Ok(diagram)
}

fn saved_to_json(saved: &SavedDiagram) -> SavedDiagramJson {
    SavedDiagramJson {
        id: saved.id.clone(),
        name: saved.name.clone(),
        created_at: saved.created_at.clone(),
        updated_at: saved.updated_at.clone(),
        diagram: diagram_to_json(&saved.diagram),
    }
}

fn saved_from_json(json: SavedDiagramJson) -> Result<SavedDiagram, FormatError> {
    Ok(SavedDiagram {
        id: json.id,
        name: json.name,
        created_at: json.created_at,
        updated_at: json.updated_at,
        diagram: diagram_from_json(json.diagram)?,
    })
}

/// Pretty-printed single diagram, as written to `.toc.json` files.
pub fn encode_saved_pretty(saved: &SavedDiagram) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&saved_to_json(saved))
}

/// Parses a diagram file, checking its structure before decoding the typed shape.
pub fn decode_saved_file(text: &str) -> Result<SavedDiagram, FormatError> {
    let value: Value = serde_json::from_str(text)?;
    validate_structure(&value)?;
    if let Some(Value::String(raw_id)) = value.get("id") {
        DiagramId::new(raw_id.clone()).map_err(FormatError::InvalidId)?;
    }
    let json: SavedDiagramJson =
        serde_json::from_value(value).map_err(|source| FormatError::InvalidStructure {
            reason: source.to_string(),
        })?;
    saved_from_json(json)
}

/// Minimum structure a diagram file must have before it is trusted.
pub fn validate_structure(value: &Value) -> Result<(), FormatError> {
    let invalid = |reason: String| Err(FormatError::InvalidStructure { reason });

    let Some(object) = value.as_object() else {
        return invalid("expected a JSON object".to_owned());
    };

    for field in ["id", "name", "createdAt", "updatedAt"] {
        if !matches!(object.get(field), Some(Value::String(_))) {
            return invalid(format!("`{field}` must be a string"));
        }
    }
    for field in ["headerData", "flowData", "themeColors", "columns"] {
        match object.get(field) {
            None | Some(Value::Null) => return invalid(format!("missing `{field}`")),
            Some(_) => {}
        }
    }
    if !matches!(object.get("groups"), Some(Value::Array(_))) {
        return invalid("`groups` must be an array".to_owned());
    }

    Ok(())
}

/// Serialises the whole catalog blob.
pub fn encode_catalog(diagrams: &[SavedDiagram]) -> Result<String, serde_json::Error> {
    let json = diagrams.iter().map(saved_to_json).collect::<Vec<_>>();
    serde_json::to_string(&json)
}

pub fn decode_catalog(text: &str) -> Result<Vec<SavedDiagram>, FormatError> {
    let json: Vec<SavedDiagramJson> = serde_json::from_str(text)?;
    json.into_iter().map(saved_from_json).collect()
}

/// Serialises the editor mirror as `{"state": ..., "version": 0}`.
pub fn encode_autosave(diagram: &Diagram) -> Result<String, serde_json::Error> {
    serde_json::to_string(&AutosaveJson {
        state: diagram_to_json(diagram),
        version: AUTOSAVE_VERSION,
    })
}

pub fn decode_autosave(text: &str) -> Result<Diagram, FormatError> {
    let json: AutosaveJson = serde_json::from_str(text)?;
    if json.version != AUTOSAVE_VERSION {
        return Err(FormatError::InvalidStructure {
            reason: format!("unsupported autosave version {}", json.version),
        });
    }
    diagram_from_json(json.state)
}

/// JSON Schema describing the `.toc.json` file format.
pub fn saved_diagram_schema() -> Schema {
    schemars::schema_for!(SavedDiagramJson)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{
        decode_autosave, decode_catalog, decode_saved_file, encode_autosave, encode_catalog,
        encode_saved_pretty, saved_diagram_schema, FormatError,
    };
    use crate::model::fixtures::saved_literacy_program;
    use crate::model::{Diagram, FlowColumn};

    #[test]
    fn saved_file_round_trip_reproduces_every_field() {
        let saved = saved_literacy_program();
        let text = encode_saved_pretty(&saved).expect("encode");
        let loaded = decode_saved_file(&text).expect("decode");
        assert_eq!(loaded, saved);
        assert_eq!(encode_saved_pretty(&loaded).expect("re-encode"), text);
    }

    #[test]
    fn saved_file_uses_camel_case_interchange_keys() {
        let text = encode_saved_pretty(&saved_literacy_program()).expect("encode");
        let value: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["createdAt"], "2024-03-05T09:30:00.000Z");
        assert_eq!(value["headerData"]["needContent"], "Rural districts lack trained teachers.");
        assert!(value["headerData"].get("visionContent").is_none());
        assert_eq!(value["flowData"]["longerTermOutcomes"], "Longer term Outcomes");
        assert_eq!(value["columns"]["interimOutcomes"][1], "infra Interim Outcomes");
        assert_eq!(value["groups"][1], json!({"id": 2, "name": "Infrastructure"}));
        assert_eq!(value["themeColors"]["columns"].as_array().map(Vec::len), Some(6));
        assert_eq!(value["logoUrl"], Value::Null);
        assert_eq!(value["showGroupingColumn"], false);
    }

    #[test]
    fn missing_columns_is_a_structural_error() {
        let mut value: Value =
            serde_json::from_str(&encode_saved_pretty(&saved_literacy_program()).expect("encode"))
                .expect("json");
        value.as_object_mut().expect("object").remove("columns");

        let err = decode_saved_file(&value.to_string()).expect_err("invalid");
        match err {
            FormatError::InvalidStructure { reason } => assert!(reason.contains("columns")),
            other => panic!("expected InvalidStructure, got {other:?}"),
        }
    }

    #[test]
    fn non_string_timestamps_and_non_array_groups_are_rejected() {
        let base: Value =
            serde_json::from_str(&encode_saved_pretty(&saved_literacy_program()).expect("encode"))
                .expect("json");

        let mut bad_ts = base.clone();
        bad_ts["updatedAt"] = json!(1700000000);
        assert!(matches!(
            decode_saved_file(&bad_ts.to_string()),
            Err(FormatError::InvalidStructure { .. })
        ));

        let mut bad_groups = base;
        bad_groups["groups"] = json!({"id": 1});
        assert!(matches!(
            decode_saved_file(&bad_groups.to_string()),
            Err(FormatError::InvalidStructure { .. })
        ));

        assert!(matches!(decode_saved_file("not json"), Err(FormatError::Json(_))));
        assert!(matches!(decode_saved_file("[]"), Err(FormatError::InvalidStructure { .. })));
    }

    #[test]
    fn misaligned_file_columns_are_realigned_on_load() {
        let mut value: Value =
            serde_json::from_str(&encode_saved_pretty(&saved_literacy_program()).expect("encode"))
                .expect("json");
        value["columns"]["impact"] = json!(["only one"]);
        value["columns"]["outputs"] = json!(["a", "b", "c", "d"]);

        let loaded = decode_saved_file(&value.to_string()).expect("decode");
        for column in FlowColumn::ALL {
            assert_eq!(loaded.diagram.columns().column(column).len(), 2);
        }
        assert_eq!(loaded.diagram.columns().cell(FlowColumn::Impact, 1), Some(""));
    }

    #[test]
    fn repeated_group_ids_are_an_invalid_format() {
        let mut value: Value =
            serde_json::from_str(&encode_saved_pretty(&saved_literacy_program()).expect("encode"))
                .expect("json");
        value["groups"][1]["id"] = value["groups"][0]["id"].clone();

        match decode_saved_file(&value.to_string()) {
            Err(FormatError::InvalidStructure { reason }) => {
                assert_eq!(reason, "duplicate group id 1");
            }
            other => panic!("expected InvalidStructure, got {other:?}"),
        }

        let blob = Value::Array(vec![value]).to_string();
        assert!(matches!(decode_catalog(&blob), Err(FormatError::InvalidStructure { .. })));
    }

    #[test]
    fn catalog_and_autosave_round_trip() {
        let saved = saved_literacy_program();
        let blob = encode_catalog(std::slice::from_ref(&saved)).expect("encode catalog");
        assert_eq!(decode_catalog(&blob).expect("decode catalog"), vec![saved.clone()]);

        let mirror = encode_autosave(&saved.diagram).expect("encode autosave");
        let value: Value = serde_json::from_str(&mirror).expect("json");
        assert_eq!(value["version"], 0);
        assert_eq!(decode_autosave(&mirror).expect("decode autosave"), saved.diagram);

        let default_mirror = encode_autosave(&Diagram::default()).expect("encode");
        assert_eq!(decode_autosave(&default_mirror).expect("decode"), Diagram::default());
    }

    #[test]
    fn schema_lists_required_interchange_fields() {
        let schema = serde_json::to_value(saved_diagram_schema()).expect("schema json");
        let required = schema["required"].as_array().expect("required");
        for field in ["id", "name", "createdAt", "updatedAt", "columns", "groups"] {
            assert!(required.iter().any(|v| v == field), "missing {field}");
        }
    }
}
