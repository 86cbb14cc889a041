use clap::{Parser, Subcommand};
use env_logger::Env;
use polyglot::{FormatRegistry, ResourceFileService, SqliteStore, TranslationStore};
use polyglot_cli::{CliConfig, view::print_view};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// SQLite database file (default: from the config file, else polyglot.sqlite)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// TOML config file (default: ./polyglot.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the formats files can be downloaded as.
    Formats,

    /// Create a solution, project and component and print their ids.
    Init {
        #[arg(long)]
        solution: String,
        #[arg(long)]
        project: String,
        #[arg(long)]
        component: String,
    },

    /// Import a translation file into a component.
    Upload {
        #[arg(long)]
        component: Uuid,
        /// The file to import; its extension selects the parser
        #[arg(short, long)]
        file: PathBuf,
        /// Language of entries the file does not tag itself
        #[arg(short, long)]
        lang: Option<String>,
    },

    /// Export a stored resource file.
    Download {
        #[arg(long)]
        file_id: Uuid,
        /// Target format, e.g. .json (default from config)
        #[arg(short, long)]
        format: Option<String>,
        #[arg(short, long)]
        lang: Option<String>,
        /// Output path (a directory keeps the exported file name); stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the resources and translations of a stored file.
    View {
        #[arg(long)]
        file_id: Uuid,
        /// Only show this language
        #[arg(short, long)]
        lang: Option<String>,
        /// Display full values without truncation
        #[arg(long)]
        full: bool,
    },

    /// Set the validated value of a resource in one language.
    Validate {
        #[arg(long)]
        resource: Uuid,
        #[arg(short, long)]
        lang: String,
        #[arg(long)]
        value: String,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    let config = CliConfig::load(args.config.as_deref())?;
    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_filter())).init();
    log::debug!("loaded config: {:?}", config);

    if let Commands::Formats = args.commands {
        let registry = FormatRegistry::default();
        for extension in registry.supported_formats() {
            let content_type = registry
                .exporter_for(extension)
                .map(|e| e.content_type())
                .unwrap_or_default();
            println!("{extension}\t{content_type}");
        }
        return Ok(());
    }

    let database = config.database_path(args.db.as_deref());
    let store = SqliteStore::open(&database)
        .map_err(|e| format!("Cannot open database {}: {}", database.display(), e))?;
    log::debug!("opened database {}", database.display());
    let mut service = ResourceFileService::new(store).with_config(config.service.clone());

    match args.commands {
        Commands::Formats => Ok(()),
        Commands::Init {
            solution,
            project,
            component,
        } => init(service.store(), &solution, &project, &component),
        Commands::Upload {
            component,
            file,
            lang,
        } => {
            let bytes = fs::read(&file)
                .map_err(|e| format!("Cannot read {}: {}", file.display(), e))?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            let uploaded = service
                .upload(component, lang.as_deref(), &name, &bytes)
                .map_err(|e| e.to_string())?;
            print_json(&uploaded)
        }
        Commands::Download {
            file_id,
            format,
            lang,
            output,
        } => {
            let download = service
                .download(file_id, format.as_deref(), lang.as_deref())
                .map_err(|e| e.to_string())?;
            match output {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(&download.file_name)
                    } else {
                        path
                    };
                    write_file(&path, &download.bytes)?;
                    eprintln!(
                        "Wrote {} ({}, {} bytes)",
                        path.display(),
                        download.content_type,
                        download.bytes.len()
                    );
                    Ok(())
                }
                None => io::stdout()
                    .write_all(&download.bytes)
                    .map_err(|e| format!("Cannot write to stdout: {}", e)),
            }
        }
        Commands::View {
            file_id,
            lang,
            full,
        } => {
            let snapshot = service
                .store()
                .load_resource_file(file_id)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("resource file `{file_id}` not found"))?;
            print_view(&snapshot, lang.as_deref(), full);
            Ok(())
        }
        Commands::Validate {
            resource,
            lang,
            value,
        } => {
            let translation = service
                .store_mut()
                .set_validated_value(resource, &lang, &value)
                .map_err(|e| e.to_string())?;
            print_json(&translation)
        }
    }
}

fn init(store: &SqliteStore, solution: &str, project: &str, component: &str) -> Result<(), String> {
    let solution = store
        .create_solution(solution, solution)
        .map_err(|e| e.to_string())?;
    let project = store
        .create_project(solution.id, project, project)
        .map_err(|e| e.to_string())?;
    let component = store
        .create_component(project.id, component, component)
        .map_err(|e| e.to_string())?;
    print_json(&serde_json::json!({
        "solution_id": solution.id,
        "project_id": project.id,
        "component_id": component.id,
    }))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Cannot create directory {}: {}", parent.display(), e))?;
    }
    fs::write(path, bytes).map_err(|e| format!("Cannot write {}: {}", path.display(), e))
}
