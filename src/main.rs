// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! `tocb` command-line entrypoint.
//!
//! Every invocation restores the working diagram from the autosave slot in the data directory,
//! runs one command against it, and lets the editor mirror the result back. `tocb serve` runs the
//! suggestion server; `tocb suggest` talks to it.

use std::error::Error;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tocb::config::AppConfig;
use tocb::editor::DiagramEditor;
use tocb::format::{export_text, saved_diagram_schema, ExportFormat};
use tocb::model::{DiagramId, FlowColumn, GroupId, SavedDiagram};
use tocb::ops::{FlowPatch, HeaderPatch, ThemeColorKey};
use tocb::render::{render_svg, render_to_pdf, SvgOptions};
use tocb::store::{
    AutosaveSlot, DiagramCatalog, FileFilter, FileKvStore, FileOutcome, FilePicker,
    FixedPathPicker, KeyValueStore, LocalFileStore, PromptPicker, UnsupportedPicker,
    WriteDurability,
};
use tocb::suggest::client::DEFAULT_TIMEOUT;
use tocb::suggest::{apply_suggestions, AppState, OpenAiBackend, Recovery, SuggestionClient};

/// Catalog id of the diagram the working copy was opened from.
const CHECKOUT_KEY: &str = "tocb-checkout";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--data-dir <dir>] [--durable-writes] <command> [args]\n\nEditing:\n  show\n  set-header <title|need|need-content|vision|vision-content|purpose|purpose-content> <text>\n    (empty text clears a *-content field)\n  set-flow <column> <label>\n  add-group\n  remove-group <group-id>\n  rename-group <group-id> <name>\n  set-cell <column> <index> <content>\n  set-color <header|need|flow|grouping|column:<0-5>|all-columns> <color>\n  reset-colors\n  set-logo <image-file>\n  clear-logo\n  toggle-grouping\n  reset\n  new\n\nCatalog:\n  save <name>\n  list\n  open <id>\n  delete <id>\n\nFiles (default destination is the downloads directory):\n  save-file <file-name> [--to <path> | --prompt]\n  load-file (--to <path> | --prompt)\n  export <json|csv|txt> <file-name> [--to <path> | --prompt]\n  save-all (--to <dir> | --prompt)\n  pdf <path>\n  schema\n\nSuggestions:\n  suggest [<content>] [--simulate | --document <file-name>] [--apply] [--server <url>]\n  diagnose [--server <url>]\n  serve [--addr <host:port>]\n\nColumns are inputs, activities, outputs, interim-outcomes, longer-term-outcomes, impact\n(or 1-6). Use `--` before values that start with '-'.\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\nEnvironment: OPENAI_API_KEY, TOCB_DATA_DIR, TOCB_DOWNLOADS_DIR, TOCB_SERVER_ADDR, TOCB_LOG."
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderField {
    Title,
    Need,
    NeedContent,
    Vision,
    VisionContent,
    Purpose,
    PurposeContent,
}

impl HeaderField {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "title" => Some(Self::Title),
            "need" => Some(Self::Need),
            "need-content" => Some(Self::NeedContent),
            "vision" => Some(Self::Vision),
            "vision-content" => Some(Self::VisionContent),
            "purpose" => Some(Self::Purpose),
            "purpose-content" => Some(Self::PurposeContent),
            _ => None,
        }
    }

    /// An empty value clears the optional `*-content` fields.
    fn patch(self, value: String) -> HeaderPatch {
        let content = Some(Some(value.clone()).filter(|text| !text.is_empty()));
        let mut patch = HeaderPatch::default();
        match self {
            Self::Title => patch.title = Some(value),
            Self::Need => patch.need = Some(value),
            Self::NeedContent => patch.need_content = content,
            Self::Vision => patch.vision = Some(value),
            Self::VisionContent => patch.vision_content = content,
            Self::Purpose => patch.purpose = Some(value),
            Self::PurposeContent => patch.purpose_content = content,
        }
        patch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorTarget {
    Key(ThemeColorKey),
    AllColumns,
}

/// Where file commands read or write.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
enum Destination {
    #[default]
    Downloads,
    Path(PathBuf),
    Prompt,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
enum Command {
    #[default]
    Show,
    SetHeader {
        field: HeaderField,
        value: String,
    },
    SetFlow {
        column: FlowColumn,
        label: String,
    },
    AddGroup,
    RemoveGroup {
        group_id: GroupId,
    },
    RenameGroup {
        group_id: GroupId,
        name: String,
    },
    SetCell {
        column: FlowColumn,
        index: usize,
        content: String,
    },
    SetColor {
        target: ColorTarget,
        value: String,
    },
    ResetColors,
    SetLogo {
        path: Option<PathBuf>,
    },
    ToggleGrouping,
    Reset,
    New,
    Save {
        name: String,
    },
    List,
    Open {
        id: DiagramId,
    },
    Delete {
        id: DiagramId,
    },
    SaveFile {
        file_name: String,
    },
    LoadFile,
    Export {
        format: ExportFormat,
        file_name: String,
    },
    SaveAll,
    Pdf {
        path: PathBuf,
    },
    Suggest {
        content: Option<String>,
    },
    Diagnose,
    Serve,
    Schema,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    data_dir: Option<String>,
    durable_writes: bool,
    destination: Destination,
    addr: Option<SocketAddr>,
    server: Option<String>,
    simulate: bool,
    document: Option<String>,
    apply: bool,
    command: Command,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                if options.data_dir.is_some() {
                    return Err(());
                }
                options.data_dir = Some(args.next().ok_or(())?);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--to" => {
                if options.destination != Destination::Downloads {
                    return Err(());
                }
                let path = args.next().ok_or(())?;
                options.destination = Destination::Path(PathBuf::from(path));
            }
            "--prompt" => {
                if options.destination != Destination::Downloads {
                    return Err(());
                }
                options.destination = Destination::Prompt;
            }
            "--addr" => {
                if options.addr.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.addr = Some(raw.parse().map_err(|_| ())?);
            }
            "--server" => {
                if options.server.is_some() {
                    return Err(());
                }
                options.server = Some(args.next().ok_or(())?);
            }
            "--simulate" => {
                if options.simulate {
                    return Err(());
                }
                options.simulate = true;
            }
            "--document" => {
                if options.document.is_some() {
                    return Err(());
                }
                options.document = Some(args.next().ok_or(())?);
            }
            "--apply" => {
                if options.apply {
                    return Err(());
                }
                options.apply = true;
            }
            "--" => positional.extend(args.by_ref()),
            _ if arg.starts_with('-') && arg.len() > 1 => return Err(()),
            _ => positional.push(arg),
        }
    }

    options.command = parse_command(positional)?;

    let file_command = matches!(
        options.command,
        Command::SaveFile { .. } | Command::LoadFile | Command::Export { .. } | Command::SaveAll
    );
    if options.destination != Destination::Downloads && !file_command {
        return Err(());
    }
    if matches!(options.command, Command::LoadFile | Command::SaveAll)
        && options.destination == Destination::Downloads
    {
        return Err(());
    }
    if options.addr.is_some() && options.command != Command::Serve {
        return Err(());
    }
    let suggest = matches!(options.command, Command::Suggest { .. });
    if options.server.is_some() && !(suggest || options.command == Command::Diagnose) {
        return Err(());
    }
    if (options.simulate || options.document.is_some() || options.apply) && !suggest {
        return Err(());
    }
    if options.simulate && options.document.is_some() {
        return Err(());
    }
    if options.document.is_some() && options.command != (Command::Suggest { content: None }) {
        return Err(());
    }

    Ok(options)
}

fn parse_command(positional: Vec<String>) -> Result<Command, ()> {
    let mut positional = positional.into_iter();
    let Some(name) = positional.next() else {
        return Ok(Command::Show);
    };
    let rest: Vec<String> = positional.collect();

    let command = match (name.as_str(), rest.as_slice()) {
        ("show", []) => Command::Show,
        ("set-header", [field, value]) => Command::SetHeader {
            field: HeaderField::parse(field).ok_or(())?,
            value: value.clone(),
        },
        ("set-flow", [column, label]) => Command::SetFlow {
            column: FlowColumn::parse(column).ok_or(())?,
            label: label.clone(),
        },
        ("add-group", []) => Command::AddGroup,
        ("remove-group", [group_id]) => Command::RemoveGroup {
            group_id: group_id.parse().map_err(|_| ())?,
        },
        ("rename-group", [group_id, name]) => Command::RenameGroup {
            group_id: group_id.parse().map_err(|_| ())?,
            name: name.clone(),
        },
        ("set-cell", [column, index, content]) => Command::SetCell {
            column: FlowColumn::parse(column).ok_or(())?,
            index: index.parse().map_err(|_| ())?,
            content: content.clone(),
        },
        ("set-color", [key, value]) => Command::SetColor {
            target: if key == "all-columns" {
                ColorTarget::AllColumns
            } else {
                ColorTarget::Key(key.parse().map_err(|_| ())?)
            },
            value: value.clone(),
        },
        ("reset-colors", []) => Command::ResetColors,
        ("set-logo", [path]) => Command::SetLogo {
            path: Some(PathBuf::from(path)),
        },
        ("clear-logo", []) => Command::SetLogo { path: None },
        ("toggle-grouping", []) => Command::ToggleGrouping,
        ("reset", []) => Command::Reset,
        ("new", []) => Command::New,
        ("save", [name]) => Command::Save { name: name.clone() },
        ("list", []) => Command::List,
        ("open", [id]) => Command::Open {
            id: DiagramId::new(id.clone()).map_err(|_| ())?,
        },
        ("delete", [id]) => Command::Delete {
            id: DiagramId::new(id.clone()).map_err(|_| ())?,
        },
        ("save-file", [file_name]) => Command::SaveFile {
            file_name: file_name.clone(),
        },
        ("load-file", []) => Command::LoadFile,
        ("export", [format, file_name]) => Command::Export {
            format: format.parse().map_err(|_| ())?,
            file_name: file_name.clone(),
        },
        ("save-all", []) => Command::SaveAll,
        ("pdf", [path]) => Command::Pdf {
            path: PathBuf::from(path),
        },
        ("suggest", []) => Command::Suggest { content: None },
        ("suggest", [content]) => Command::Suggest {
            content: Some(content.clone()),
        },
        ("diagnose", []) => Command::Diagnose,
        ("serve", []) => Command::Serve,
        ("schema", []) => Command::Schema,
        _ => return Err(()),
    };
    Ok(command)
}

/// File dialogs selected on the command line.
enum CliPicker {
    Fixed(FixedPathPicker),
    Prompt(PromptPicker<io::StdinLock<'static>, io::Stderr>),
    Unsupported(UnsupportedPicker),
}

impl CliPicker {
    fn for_destination(destination: &Destination) -> Self {
        match destination {
            Destination::Downloads => Self::Unsupported(UnsupportedPicker),
            Destination::Path(path) => Self::Fixed(FixedPathPicker::new(path.clone())),
            Destination::Prompt => Self::Prompt(PromptPicker::stdio()),
        }
    }
}

impl FilePicker for CliPicker {
    fn is_supported(&self) -> bool {
        match self {
            Self::Fixed(picker) => picker.is_supported(),
            Self::Prompt(picker) => picker.is_supported(),
            Self::Unsupported(picker) => picker.is_supported(),
        }
    }

    fn pick_save_path(
        &mut self,
        suggested_name: &str,
        filter: &FileFilter,
    ) -> io::Result<Option<PathBuf>> {
        match self {
            Self::Fixed(picker) => picker.pick_save_path(suggested_name, filter),
            Self::Prompt(picker) => picker.pick_save_path(suggested_name, filter),
            Self::Unsupported(picker) => picker.pick_save_path(suggested_name, filter),
        }
    }

    fn pick_open_path(&mut self, filter: &FileFilter) -> io::Result<Option<PathBuf>> {
        match self {
            Self::Fixed(picker) => picker.pick_open_path(filter),
            Self::Prompt(picker) => picker.pick_open_path(filter),
            Self::Unsupported(picker) => picker.pick_open_path(filter),
        }
    }

    fn pick_directory(&mut self) -> io::Result<Option<PathBuf>> {
        match self {
            Self::Fixed(picker) => picker.pick_directory(),
            Self::Prompt(picker) => picker.pick_directory(),
            Self::Unsupported(picker) => picker.pick_directory(),
        }
    }
}

/// The working diagram plus the catalog, both backed by the data directory.
struct Workspace {
    editor: DiagramEditor<Option<AutosaveSlot<FileKvStore>>>,
    catalog: DiagramCatalog<FileKvStore>,
    state: FileKvStore,
}

impl Workspace {
    fn open(config: &AppConfig) -> Self {
        let kv = || FileKvStore::new(&config.data_dir).with_durability(config.durability);
        let autosave = config.enable_auto_save.then(|| AutosaveSlot::new(kv()));
        let diagram = autosave
            .as_ref()
            .map(AutosaveSlot::restore)
            .unwrap_or_default();

        let mut workspace = Self {
            editor: DiagramEditor::with_diagram(diagram, autosave),
            catalog: DiagramCatalog::new(kv()),
            state: kv(),
        };
        if let Some(saved) = workspace
            .read_checkout()
            .and_then(|id| workspace.catalog.get_by_id(&id))
        {
            workspace.editor.mark_saved(&saved);
        }
        workspace
    }

    fn read_checkout(&self) -> Option<DiagramId> {
        let raw = match self.state.get(CHECKOUT_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(error = %err, "checkout marker unreadable");
                return None;
            }
        };
        serde_json::from_str::<DiagramId>(&raw).ok()
    }

    fn write_checkout(&mut self) -> Result<(), Box<dyn Error>> {
        match self.editor.checked_out_id() {
            Some(id) => self.state.set(CHECKOUT_KEY, &serde_json::to_string(id)?)?,
            None => self.state.remove(CHECKOUT_KEY)?,
        }
        Ok(())
    }

    /// The working diagram packaged for export, named after the checkout or the title.
    fn current_snapshot(&self) -> SavedDiagram {
        let diagram = self.editor.diagram();
        let name = self
            .editor
            .checked_out_name()
            .map(str::to_owned)
            .unwrap_or_else(|| diagram.header_data().title.clone());
        self.editor
            .snapshot(&name)
            .unwrap_or_else(|_| SavedDiagram::new("My Theory of Change", diagram.clone()))
    }
}

fn describe_outcome<T>(outcome: FileOutcome<T>, describe: impl FnOnce(T)) {
    match outcome {
        FileOutcome::Completed(value) => describe(value),
        FileOutcome::Cancelled => println!("cancelled"),
    }
}

fn run_editing(
    config: &AppConfig,
    options: &CliOptions,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    let mut workspace = Workspace::open(config);
    let file_store = || {
        LocalFileStore::new(
            CliPicker::for_destination(&options.destination),
            config.downloads_dir(),
        )
        .with_durability(config.durability)
    };

    match command {
        Command::Show => {
            if let (Some(id), Some(name)) = (
                workspace.editor.checked_out_id(),
                workspace.editor.checked_out_name(),
            ) {
                println!("Checked out: {name} ({id})\n");
            }
            print!("{}", export_text(&workspace.current_snapshot()));
            let groups = workspace.editor.diagram().groups();
            if !groups.is_empty() {
                println!("\nGroup ids:");
                for group in groups {
                    println!("  {} {}", group.id, group.name);
                }
            }
        }
        Command::SetHeader { field, value } => {
            workspace.editor.update_header_data(field.patch(value))?;
        }
        Command::SetFlow { column, label } => {
            workspace
                .editor
                .update_flow_data(FlowPatch::single(column, label))?;
        }
        Command::AddGroup => {
            let group_id = workspace.editor.add_group()?;
            println!("{group_id}");
        }
        Command::RemoveGroup { group_id } => {
            if !workspace.editor.remove_group(group_id)? {
                println!("no group {group_id}");
            }
        }
        Command::RenameGroup { group_id, name } => {
            if !workspace.editor.update_group_name(group_id, name)? {
                println!("no group {group_id}");
            }
        }
        Command::SetCell {
            column,
            index,
            content,
        } => {
            workspace
                .editor
                .update_column_content(column, index, content)?;
        }
        Command::SetColor { target, value } => match target {
            ColorTarget::Key(key) => workspace.editor.update_theme_color(key, value)?,
            ColorTarget::AllColumns => workspace.editor.update_all_column_colors(value)?,
        },
        Command::ResetColors => workspace.editor.reset_theme_colors()?,
        Command::SetLogo { path } => {
            let logo_url = path
                .as_deref()
                .map(tocb::logo::load_logo)
                .transpose()?;
            workspace.editor.set_logo_url(logo_url)?;
        }
        Command::ToggleGrouping => {
            let shown = workspace.editor.toggle_grouping_column()?;
            println!("grouping column {}", if shown { "shown" } else { "hidden" });
        }
        Command::Reset => {
            workspace.editor.reset_to_default()?;
            workspace.write_checkout()?;
        }
        Command::New => {
            workspace.editor.detach();
            workspace.write_checkout()?;
        }
        Command::Save { name } => {
            let snapshot = workspace.editor.snapshot(&name)?;
            let saved = workspace.catalog.save_diagram(snapshot)?;
            workspace.editor.mark_saved(&saved);
            workspace.write_checkout()?;
            println!("saved \"{}\" ({})", saved.name, saved.id);
        }
        Command::List => {
            let items = workspace.catalog.list_metadata_newest_first();
            if items.is_empty() {
                println!("no saved diagrams");
            }
            for item in items {
                println!("{}\t{}\t{}", item.id, item.updated_at, item.name);
            }
        }
        Command::Open { id } => {
            let saved = workspace
                .catalog
                .get_by_id(&id)
                .ok_or_else(|| format!("no saved diagram with id {id}"))?;
            println!("opened \"{}\"", saved.name);
            workspace.editor.load(saved);
            workspace.write_checkout()?;
        }
        Command::Delete { id } => {
            if workspace.catalog.delete_by_id(&id)? {
                if workspace.editor.checked_out_id() == Some(&id) {
                    workspace.editor.detach();
                    workspace.write_checkout()?;
                }
                println!("deleted {id}");
            } else {
                println!("no saved diagram with id {id}");
            }
        }
        Command::SaveFile { file_name } => {
            let saved = SavedDiagram::new(file_name.trim(), workspace.editor.diagram().clone());
            let outcome = file_store().save_to_file(&saved, &file_name)?;
            describe_outcome(outcome, |path| println!("wrote {}", path.display()));
        }
        Command::LoadFile => {
            match file_store().load_from_file()? {
                FileOutcome::Completed(saved) => {
                    println!("loaded \"{}\"", saved.name);
                    workspace.editor.load(saved);
                    workspace.editor.detach();
                    workspace.write_checkout()?;
                }
                FileOutcome::Cancelled => println!("cancelled"),
            }
        }
        Command::Export { format, file_name } => {
            let saved = SavedDiagram::new(file_name.trim(), workspace.editor.diagram().clone());
            let outcome = file_store().export_as(&saved, format, &file_name)?;
            describe_outcome(outcome, |path| println!("wrote {}", path.display()));
        }
        Command::SaveAll => {
            let diagrams = workspace.catalog.all();
            let outcome = file_store().save_diagrams_to_directory(&diagrams)?;
            describe_outcome(outcome, |paths| {
                for path in paths {
                    println!("wrote {}", path.display());
                }
            });
        }
        Command::Pdf { path } => write_pdf(&workspace, &path)?,
        other @ (Command::Suggest { .. } | Command::Diagnose | Command::Serve | Command::Schema) => {
            return Err(format!("{other:?} does not operate on the working diagram").into());
        }
    }
    Ok(())
}

fn write_pdf(workspace: &Workspace, path: &Path) -> Result<(), Box<dyn Error>> {
    let view = render_svg(workspace.editor.diagram(), &SvgOptions::default());
    if !render_to_pdf(&view, path) {
        return Err(format!("failed to write PDF to {}", path.display()).into());
    }
    println!("wrote {} ({:?})", path.display(), view.orientation());
    Ok(())
}

fn run_suggest(
    config: &AppConfig,
    options: &CliOptions,
    content: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let content = match content {
        Some(content) => content,
        None if options.document.is_some() => String::new(),
        None => export_text(&Workspace::open(config).current_snapshot()),
    };
    let server = options.server.clone().unwrap_or_else(|| config.server_url());
    let client =
        SuggestionClient::new(server)?.with_alternate_model(config.fallback_model.clone());

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let result = runtime.block_on(async {
        match &options.document {
            Some(file_name) => client.analyze_document(file_name).await,
            None if options.simulate => client.simulate(&content).await,
            None => client.suggest_or_simulate(&content).await,
        }
    });

    let suggestion = match result {
        Ok(suggestion) => suggestion,
        Err(err) => {
            if err.recovery() == Recovery::ShowDiagnostic {
                eprintln!("tocb: run `tocb diagnose` to check the suggestion service");
            }
            return Err(err.into());
        }
    };

    println!("{}", suggestion.text);
    match (&suggestion.model_used, suggestion.simulated) {
        (_, true) => println!("\n(simulated suggestions)"),
        (Some(model), false) => println!("\n(model: {model})"),
        (None, false) => {}
    }
    if options.apply {
        println!("{}", apply_suggestions(&suggestion.text));
    }
    Ok(())
}

fn run_diagnose(config: &AppConfig, options: &CliOptions) -> Result<(), Box<dyn Error>> {
    let server = options.server.clone().unwrap_or_else(|| config.server_url());
    let client = SuggestionClient::new(server)?;
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let report = runtime.block_on(client.diagnose())?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_serve(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let api_key = config.openai_api_key.clone();
    let backend = OpenAiBackend::new(
        config.openai_base_url.clone(),
        api_key.clone().unwrap_or_default(),
        DEFAULT_TIMEOUT,
    )?;
    let mut state = AppState::new(backend, api_key);
    state.primary_model = config.primary_model.clone();
    state.fallback_model = config.fallback_model.clone();

    eprintln!("{}: serving suggestions on http://{}", config.app_name, config.server_addr);
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(tocb::suggest::serve(config.server_addr, state))?;
    Ok(())
}

fn resolve_config(options: &CliOptions) -> Result<AppConfig, Box<dyn Error>> {
    let mut config = AppConfig::from_env()?;
    if let Some(dir) = &options.data_dir {
        config.data_dir = PathBuf::from(dir);
    }
    if options.durable_writes {
        config.durability = WriteDurability::Durable;
    }
    if let Some(addr) = options.addr {
        config.server_addr = addr;
    }
    Ok(config)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "tocb".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        tocb::logging::init(if options.command == Command::Serve {
            "info"
        } else {
            "warn"
        });
        let config = resolve_config(&options)?;

        match options.command.clone() {
            Command::Schema => {
                println!("{}", serde_json::to_string_pretty(&saved_diagram_schema())?);
                Ok(())
            }
            Command::Serve => run_serve(&config),
            Command::Diagnose => run_diagnose(&config, &options),
            Command::Suggest { content } => run_suggest(&config, &options, content),
            command => run_editing(&config, &options, command),
        }
    })();

    if let Err(err) = result {
        eprintln!("tocb: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{parse_options, CliOptions, ColorTarget, Command, Destination, HeaderField};
    use tocb::format::ExportFormat;
    use tocb::model::{FlowColumn, GroupId};
    use tocb::ops::ThemeColorKey;

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter()
            .map(|arg| (*arg).to_owned())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn empty_content_value_clears_but_empty_title_is_kept() {
        let cleared = HeaderField::NeedContent.patch(String::new());
        assert_eq!(cleared.need_content, Some(None));

        let set = HeaderField::PurposeContent.patch("Train locally".to_owned());
        assert_eq!(set.purpose_content, Some(Some("Train locally".to_owned())));

        let title = HeaderField::Title.patch(String::new());
        assert_eq!(title.title, Some(String::new()));
        assert_eq!(title.need_content, None);
    }

    #[test]
    fn parses_empty_args_as_show() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
        assert_eq!(options.command, Command::Show);
    }

    #[test]
    fn parses_global_flags_anywhere() {
        let options = parse_options(args(&["list", "--data-dir", "some/dir", "--durable-writes"]))
            .expect("parse options");
        assert_eq!(options.data_dir.as_deref(), Some("some/dir"));
        assert!(options.durable_writes);
        assert_eq!(options.command, Command::List);
    }

    #[test]
    fn parses_editing_commands() {
        let options =
            parse_options(args(&["set-cell", "interim-outcomes", "2", "Better reading"]))
                .expect("parse options");
        assert_eq!(
            options.command,
            Command::SetCell {
                column: FlowColumn::InterimOutcomes,
                index: 2,
                content: "Better reading".to_owned(),
            }
        );

        let options = parse_options(args(&["set-header", "need-content", "Details"]))
            .expect("parse options");
        assert_eq!(
            options.command,
            Command::SetHeader {
                field: HeaderField::NeedContent,
                value: "Details".to_owned(),
            }
        );

        let options =
            parse_options(args(&["rename-group", "3", "Teachers"])).expect("parse options");
        assert_eq!(
            options.command,
            Command::RenameGroup {
                group_id: GroupId::new(3),
                name: "Teachers".to_owned(),
            }
        );
    }

    #[test]
    fn parses_color_targets() {
        let options =
            parse_options(args(&["set-color", "column:4", "#ff0000"])).expect("parse options");
        assert_eq!(
            options.command,
            Command::SetColor {
                target: ColorTarget::Key(ThemeColorKey::Column(4)),
                value: "#ff0000".to_owned(),
            }
        );

        let options =
            parse_options(args(&["set-color", "all-columns", "#eeeeee"])).expect("parse options");
        assert!(matches!(
            options.command,
            Command::SetColor {
                target: ColorTarget::AllColumns,
                ..
            }
        ));
    }

    #[test]
    fn parses_file_destinations() {
        let options = parse_options(args(&["export", "csv", "plan", "--to", "out/plan.csv"]))
            .expect("parse options");
        assert_eq!(
            options.command,
            Command::Export {
                format: ExportFormat::Csv,
                file_name: "plan".to_owned(),
            }
        );
        assert_eq!(
            options.destination,
            Destination::Path(PathBuf::from("out/plan.csv"))
        );

        let options = parse_options(args(&["save-file", "plan"])).expect("parse options");
        assert_eq!(options.destination, Destination::Downloads);

        let options = parse_options(args(&["load-file", "--prompt"])).expect("parse options");
        assert_eq!(options.destination, Destination::Prompt);
    }

    #[test]
    fn double_dash_allows_leading_dash_values() {
        parse_options(args(&["set-flow", "impact", "-10% dropout"])).unwrap_err();

        let options = parse_options(args(&["set-flow", "--", "impact", "-10% dropout"]))
            .expect("parse options");
        assert_eq!(
            options.command,
            Command::SetFlow {
                column: FlowColumn::Impact,
                label: "-10% dropout".to_owned(),
            }
        );
    }

    #[test]
    fn parses_suggest_options() {
        let options = parse_options(args(&[
            "suggest",
            "Our programme trains teachers",
            "--server",
            "http://127.0.0.1:4000",
            "--apply",
        ]))
        .expect("parse options");
        assert_eq!(
            options.command,
            Command::Suggest {
                content: Some("Our programme trains teachers".to_owned()),
            }
        );
        assert_eq!(options.server.as_deref(), Some("http://127.0.0.1:4000"));
        assert!(options.apply);

        let options = parse_options(args(&["suggest", "--document", "report.pdf"]))
            .expect("parse options");
        assert_eq!(options.document.as_deref(), Some("report.pdf"));
    }

    #[test]
    fn parses_serve_addr() {
        let options =
            parse_options(args(&["serve", "--addr", "127.0.0.1:0"])).expect("parse options");
        assert_eq!(options.command, Command::Serve);
        assert_eq!(options.addr.map(|addr| addr.port()), Some(0));
    }

    #[test]
    fn rejects_flags_for_the_wrong_command() {
        parse_options(args(&["list", "--to", "x"])).unwrap_err();
        parse_options(args(&["show", "--addr", "127.0.0.1:1"])).unwrap_err();
        parse_options(args(&["list", "--server", "http://x"])).unwrap_err();
        parse_options(args(&["save", "x", "--simulate"])).unwrap_err();
        parse_options(args(&["suggest", "text", "--document", "a.pdf"])).unwrap_err();
        parse_options(args(&["suggest", "--simulate", "--document", "a.pdf"])).unwrap_err();
    }

    #[test]
    fn directory_and_load_commands_need_a_destination() {
        parse_options(args(&["load-file"])).unwrap_err();
        parse_options(args(&["save-all"])).unwrap_err();
        parse_options(args(&["save-all", "--to", "backups"])).expect("parse options");
    }

    #[test]
    fn rejects_unknown_and_malformed_args() {
        parse_options(args(&["--nope"])).unwrap_err();
        parse_options(args(&["frobnicate"])).unwrap_err();
        parse_options(args(&["set-flow", "nowhere", "x"])).unwrap_err();
        parse_options(args(&["remove-group", "0"])).unwrap_err();
        parse_options(args(&["set-cell", "impact", "-1", "x"])).unwrap_err();
        parse_options(args(&["export", "pdf", "plan"])).unwrap_err();
        parse_options(args(&["serve", "--addr", "nowhere"])).unwrap_err();
        parse_options(args(&["show", "extra"])).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags() {
        parse_options(args(&["list", "--durable-writes", "--durable-writes"])).unwrap_err();
        parse_options(args(&["list", "--data-dir", "a", "--data-dir", "b"])).unwrap_err();
        parse_options(args(&["save-file", "x", "--to", "a", "--prompt"])).unwrap_err();
    }

    #[test]
    fn rejects_missing_flag_values() {
        parse_options(args(&["list", "--data-dir"])).unwrap_err();
        parse_options(args(&["serve", "--addr"])).unwrap_err();
    }
}
