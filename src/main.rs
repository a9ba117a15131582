//! scenman — CLI front-end over the scenario/template import pipeline.
//!
//! Thin glue: resolves the working folder, dispatches to the import/clear
//! actions, and reports outcomes. All real work happens in the library.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use scenman_lib::error::ImportError;
use scenman_lib::{import, store};

#[derive(Parser)]
#[command(name = "scenman")]
#[command(about = "Normalize and merge scenario/template records into canonical JSON stores", long_about = None)]
#[command(version)]
struct Cli {
    /// Working folder holding scenarios.json / templates.json
    /// (defaults to the nearest ancestor of the current directory that has them)
    #[arg(long, global = true)]
    folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show record counts for the working folder
    Status,

    /// Import scenarios from a JSON or CSV source and merge them by id
    ImportScenarios {
        /// Source file (.json or .csv)
        file: PathBuf,
    },

    /// Import templates from a JSON or CSV source (full replacement)
    ImportTemplates {
        /// Source file (.json or .csv)
        file: PathBuf,
    },

    /// Reset scenarios.json to an empty document
    ClearScenarios,

    /// Reset templates.json to an empty document
    ClearTemplates,
}

fn run(command: &Commands, folder: &Path) -> Result<(), ImportError> {
    match command {
        Commands::Status => {
            let scenarios = store::read_document(&store::scenarios_path(folder))?;
            let templates = store::read_document(&store::templates_path(folder))?;
            println!("Folder: {}", folder.display());
            println!("Scenarios: {}", store::scenario_count(&scenarios));
            println!("Templates: {}", store::template_count(&templates));
        }
        Commands::ImportScenarios { file } => {
            let stats = import::import_scenarios(folder, file)?;
            println!(
                "scenarios.json updated from {}. Added: {}, Updated: {}.",
                file.display(),
                stats.added,
                stats.updated
            );
        }
        Commands::ImportTemplates { file } => {
            let count = import::import_templates(folder, file)?;
            println!(
                "templates.json updated from {} ({} template(s)).",
                file.display(),
                count
            );
        }
        Commands::ClearScenarios => {
            import::clear_scenarios(folder)?;
            println!("scenarios.json cleared.");
        }
        Commands::ClearTemplates => {
            import::clear_templates(folder)?;
            println!("templates.json cleared.");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let folder = cli.folder.unwrap_or_else(|| {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        store::resolve_working_folder(&cwd)
    });

    if let Err(err) = run(&cli.command, &folder) {
        eprintln!("Error: {}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
