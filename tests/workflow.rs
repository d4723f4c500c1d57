// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};

use tocb::editor::{DiagramEditor, ValidationError};
use tocb::format::ExportFormat;
use tocb::model::{Diagram, FlowColumn, GroupId, SavedDiagram};
use tocb::ops::{FlowPatch, HeaderPatch, ThemeColorKey};
use tocb::render::{render_svg, render_to_pdf, PageOrientation, SvgOptions};
use tocb::store::{
    AutosaveSlot, DiagramCatalog, FileKvStore, FileOutcome, FileStoreError, FixedPathPicker,
    LocalFileStore, UnsupportedPicker,
};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = std::env::temp_dir();
        path.push(format!("tocb-it-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[fixture]
fn tmp() -> TempDir {
    TempDir::new("workflow")
}

type AutosavedEditor = DiagramEditor<Option<AutosaveSlot<FileKvStore>>>;

fn open_editor(data_dir: &Path) -> AutosavedEditor {
    let slot = AutosaveSlot::new(FileKvStore::new(data_dir));
    let diagram = slot.restore();
    DiagramEditor::with_diagram(diagram, Some(slot))
}

fn build_program(editor: &mut AutosavedEditor) {
    editor
        .update_header_data(HeaderPatch {
            title: Some("Community Health".to_owned()),
            need_content: Some(Some("Clinics are far apart.".to_owned())),
            ..HeaderPatch::default()
        })
        .unwrap();
    editor
        .update_flow_data(FlowPatch::single(FlowColumn::Inputs, "Funding, staff"))
        .unwrap();
    let second = editor.add_group().unwrap();
    assert_eq!(second, GroupId::new(2));
    editor.update_group_name(second, "Outreach").unwrap();
    editor
        .update_column_content(FlowColumn::Activities, 1, "Door-to-door \"visits\"")
        .unwrap();
    editor
        .update_theme_color(ThemeColorKey::Column(5), "#1e3a8a")
        .unwrap();
}

#[rstest]
fn autosave_carries_edits_across_editor_instances(tmp: TempDir) {
    let data = tmp.path().join("data");
    let mut editor = open_editor(&data);
    build_program(&mut editor);
    let edited = editor.diagram().clone();

    let reopened = open_editor(&data);
    assert_eq!(reopened.diagram(), &edited);
    assert_eq!(reopened.diagram().columns().rows(), 2);

    let mut reopened = reopened;
    let third = reopened.add_group().unwrap();
    assert_eq!(third, GroupId::new(3));
}

#[rstest]
fn catalog_save_reopen_and_update_keeps_identity(tmp: TempDir) {
    let data = tmp.path().join("data");
    let mut editor = open_editor(&data);
    build_program(&mut editor);

    let mut catalog = DiagramCatalog::new(FileKvStore::new(&data));
    assert_eq!(
        editor.snapshot("   ").unwrap_err(),
        ValidationError::EmptyName
    );
    let first = catalog.save_diagram(editor.snapshot("Health plan").unwrap()).unwrap();
    editor.mark_saved(&first);

    editor.toggle_grouping_column().unwrap();
    let second = catalog.save_diagram(editor.snapshot("Health plan v2").unwrap()).unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);

    let reopened = DiagramCatalog::new(FileKvStore::new(&data));
    let listed = reopened.list_metadata();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Health plan v2");

    let loaded = reopened.get_by_id(&first.id).unwrap();
    assert!(loaded.diagram.show_grouping_column());

    let mut fresh = open_editor(&tmp.path().join("other"));
    fresh.load(loaded.clone());
    assert_eq!(fresh.diagram(), &loaded.diagram);
    assert_eq!(fresh.checked_out_id(), Some(&first.id));

    fresh.reset_to_default().unwrap();
    assert_eq!(fresh.diagram(), &Diagram::default());
    assert!(reopened.get_by_id(&first.id).is_some());
}

#[rstest]
fn file_round_trip_reproduces_every_field(tmp: TempDir) {
    let mut editor = open_editor(&tmp.path().join("data"));
    build_program(&mut editor);
    editor.set_logo_url(Some("data:image/png;base64,AAAA".to_owned())).unwrap();
    let saved = SavedDiagram::new("Health plan", editor.diagram().clone());

    let out_dir = tmp.path().join("out");
    std::fs::create_dir_all(&out_dir).unwrap();
    let mut store = LocalFileStore::new(FixedPathPicker::new(&out_dir), tmp.path().join("dl"));
    let path = store
        .save_to_file(&saved, "Health plan")
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(path, out_dir.join("Health plan.toc.json"));

    let mut loader = LocalFileStore::new(FixedPathPicker::new(&path), tmp.path().join("dl"));
    let loaded = loader.load_from_file().unwrap().completed().unwrap();
    assert_eq!(loaded, saved);
}

#[rstest]
fn malformed_file_is_reported_as_invalid_format(tmp: TempDir) {
    let path = tmp.path().join("broken.toc.json");
    std::fs::write(&path, r#"{"id":"x","name":"n","headerData":{}}"#).unwrap();

    let mut loader = LocalFileStore::new(FixedPathPicker::new(&path), tmp.path().join("dl"));
    let err = loader.load_from_file().unwrap_err();
    assert!(matches!(err, FileStoreError::InvalidFormat { .. }), "{err}");
}

#[rstest]
fn exports_fall_back_to_downloads_without_a_picker(tmp: TempDir) {
    let mut editor = open_editor(&tmp.path().join("data"));
    build_program(&mut editor);
    let saved = SavedDiagram::new("Health plan", editor.diagram().clone());

    let downloads = tmp.path().join("downloads");
    let mut store = LocalFileStore::new(UnsupportedPicker, &downloads);
    let outcome = store.export_as(&saved, ExportFormat::Csv, "health").unwrap();
    let FileOutcome::Completed(path) = outcome else {
        panic!("expected the export to complete");
    };
    assert_eq!(path, downloads.join("health.csv"));

    let csv = std::fs::read_to_string(&path).unwrap();
    assert!(csv.starts_with("\"Section\",\"Content\"\n"));
    assert!(csv.contains("\"Group 2\",\"Outreach\""));
    assert!(csv.contains("\"Door-to-door \"\"visits\"\"\""));

    let text_path = store
        .export_as(&saved, ExportFormat::Txt, "health")
        .unwrap()
        .completed()
        .unwrap();
    let text = std::fs::read_to_string(text_path).unwrap();
    assert!(text.contains("Group 2: Outreach"));
}

#[rstest]
fn pdf_export_writes_a_document(tmp: TempDir) {
    let mut editor = open_editor(&tmp.path().join("data"));
    build_program(&mut editor);

    let view = render_svg(editor.diagram(), &SvgOptions::default());
    assert_eq!(view.orientation(), PageOrientation::Landscape);

    let path = tmp.path().join("health.pdf");
    assert!(render_to_pdf(&view, &path));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    assert!(!render_to_pdf(&view, &tmp.path().join("missing/dir/health.pdf")));
}
