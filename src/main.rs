mod app;
mod input;
mod ui;

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, WrapErr};
use tracing_subscriber::{fmt, EnvFilter};

use bases_kanban::board::{resolve_property, Board, GroupKey, PropertySelection};
use bases_kanban::host::{Entry, EntrySource, MetadataEdit, MetadataStore, OrderStore, PropertyKey, ViewConfig};
use bases_kanban::vault::storage::StorageError;
use bases_kanban::vault::{format_age, Settings, Vault};
use bases_kanban::view::{KanbanView, GROUP_BY_OPTION};
use bases_kanban::KanbanError;

#[derive(Parser)]
#[command(name = "bases-kanban", about = "A kanban board over a folder of Markdown notes")]
struct Cli {
    /// Vault directory (defaults to the current directory)
    #[arg(short, long, global = true)]
    vault: Option<PathBuf>,

    /// Group by this property for this session only (e.g. note.status)
    #[arg(short, long, global = true)]
    property: Option<String>,

    /// Write logs here instead of the user cache directory
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the board: columns and their notes
    List,
    /// Set a note's group-by property ("Uncategorized" removes it)
    Move {
        /// Note path, path without .md, or file name
        note: String,
        /// Target column value
        value: String,
    },
    /// List properties the board can be grouped by
    Properties,
}

fn main() {
    // Install color_eyre for unexpected panics/errors (developer bugs).
    let _ = color_eyre::install();
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref());

    let root = match cli.vault.clone().map_or_else(env::current_dir, Ok) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: cannot determine current directory: {e}");
            std::process::exit(1);
        }
    };
    let property = cli.property.as_deref().map(PropertyKey::from);

    let result = match cli.command {
        Some(Command::List) => cmd_list(&root, property),
        Some(Command::Move { note, value }) => cmd_move(&root, property, &note, &value),
        Some(Command::Properties) => cmd_properties(&root),
        None => cmd_tui(&root, property),
    };

    if let Err(e) = result {
        tracing::error!("{e:#}");
        print_user_error(&e);
        std::process::exit(1);
    }
}

/// Log to a file so the terminal UI stays intact. `RUST_LOG` overrides the
/// default filter.
fn init_logging(path: Option<&Path>) {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match dirs::cache_dir() {
            Some(dir) => dir.join("bases-kanban").join("bases-kanban.log"),
            None => return,
        },
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let file = match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(_) => return,
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("bases_kanban=info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

/// Print a user-friendly error message, with actionable hints for known error types.
fn print_user_error(error: &color_eyre::Report) {
    if let Some(storage_err) = error.downcast_ref::<StorageError>() {
        match storage_err {
            StorageError::NotFound(path) => {
                eprintln!("error: vault directory not found: {}", path.display());
                eprintln!("  Pass --vault <dir> or run from inside your notes folder.");
            }
            StorageError::InvalidNote { path, reason } => {
                eprintln!(
                    "error: invalid note: {}",
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or(&path.to_string_lossy())
                );
                eprintln!("  {reason}");
            }
            StorageError::OutsideVault(path) => {
                eprintln!("error: {path:?} is not inside the vault.");
            }
            StorageError::TomlDe(e) => {
                eprintln!("error: settings file has invalid TOML syntax.");
                eprintln!("  {e}");
                eprintln!("  Fix or delete {}.", bases_kanban::vault::settings::SETTINGS_FILE);
            }
            StorageError::TomlSer(e) => {
                eprintln!("error: failed to write TOML.");
                eprintln!("  {e}");
            }
            StorageError::Io(e) => {
                eprintln!("error: could not read or write vault files.");
                eprintln!("  {e}");
            }
        }
        return;
    }

    if let Some(err) = error.downcast_ref::<KanbanError>() {
        eprintln!("error: {}", bases_kanban::error::format_error_message(err, "bases-kanban"));
        return;
    }

    eprintln!("error: {error:#}");
}

fn open(root: &Path, property: Option<PropertyKey>) -> color_eyre::Result<(Vault, Settings)> {
    let vault = Vault::open(root)?;
    let settings = Settings::load(root)?.with_property_override(property);
    Ok((vault, settings))
}

/// The property the board groups by, same rule as the view uses.
fn group_by(vault: &Vault, settings: &Settings) -> Option<PropertyKey> {
    match resolve_property(settings.property(GROUP_BY_OPTION).as_ref(), &vault.property_keys()) {
        PropertySelection::Selected(p) => Some(p),
        PropertySelection::NoProperties => None,
    }
}

fn cmd_list(root: &Path, property: Option<PropertyKey>) -> color_eyre::Result<()> {
    let (vault, settings) = open(root, property)?;
    let entries = vault.entries()?;
    if entries.is_empty() {
        println!("No entries found.");
        return Ok(());
    }
    let Some(property) = group_by(&vault, &settings) else {
        println!("No properties found in entries.");
        return Ok(());
    };
    let order = settings.order(&property);
    let board = Board::build(&entries, &property, order.as_deref());
    let now = chrono::Utc::now();

    println!("Grouped by {property}");
    for group in &board.groups {
        println!("\n{} ({})", group.key, group.entries.len());
        println!("{}", "─".repeat(40));
        for entry in &group.entries {
            let age = vault
                .find(entry.path())
                .and_then(|n| n.modified())
                .map(|m| format_age(m, now))
                .unwrap_or_default();
            println!("  {:>5}  {}  {}", age, entry.display_name(), entry.path());
        }
    }
    println!();
    Ok(())
}

fn cmd_move(root: &Path, property: Option<PropertyKey>, query: &str, value: &str) -> color_eyre::Result<()> {
    let (vault, settings) = open(root, property)?;
    let note = vault
        .find(query)
        .ok_or_else(|| eyre!("Note '{}' not found", query))?;
    let property = group_by(&vault, &settings).ok_or_else(|| eyre!("No properties found in entries"))?;
    let writable = KanbanView::describe_configuration_options()
        .iter()
        .all(|option| option.accepts(&property));
    if !writable {
        bail!("Cannot move notes by read-only property {property}");
    }

    let target = GroupKey::from_text(value);
    let field = property.name().to_string();
    let edit = if target.is_uncategorized() {
        MetadataEdit::Remove { field }
    } else {
        MetadataEdit::Set {
            field,
            value: target.as_str().to_string(),
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime
        .block_on(vault.mutate(note.path(), edit))
        .wrap_err_with(|| format!("moving {query}"))?;
    println!("Moved {} to {}", note.display_name(), target);
    Ok(())
}

fn cmd_properties(root: &Path) -> color_eyre::Result<()> {
    let vault = Vault::open(root)?;
    let options = KanbanView::describe_configuration_options();
    let keys: Vec<PropertyKey> = vault
        .property_keys()
        .into_iter()
        .filter(|k| options.iter().all(|o| o.accepts(k)))
        .collect();
    if keys.is_empty() {
        println!("No properties found in entries.");
        return Ok(());
    }
    for key in keys {
        println!("{key}");
    }
    Ok(())
}

fn cmd_tui(root: &Path, property: Option<PropertyKey>) -> color_eyre::Result<()> {
    let (vault, settings) = open(root, property)?;
    let mut app = app::App::new(vault, settings)?;
    let mut terminal = ratatui::init();
    let result = app::run(&mut terminal, &mut app);
    ratatui::restore();
    result
}
