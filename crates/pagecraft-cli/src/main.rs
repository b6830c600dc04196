//! Command-line access to stored Pagecraft documents.

use clap::{Parser, Subcommand};
use pagecraft_core::{Document, FileStorage, Storage, StorageError, TemplateError, TemplateManifest};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Parser, Debug)]
#[command(name = "pagecraft", about = "Inspect, create and check stored Pagecraft documents")]
struct Cli {
    /// Document directory (defaults to the platform data dir).
    #[arg(long, global = true, env = "PAGECRAFT_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// List stored document ids.
    List,
    /// Print a summary of one document.
    Show { id: String },
    /// Create a document and print its id.
    New {
        name: String,
        /// Template manifest JSON to take the page background from.
        #[arg(long)]
        template: Option<PathBuf>,
        /// Index into the manifest's backgrounds.
        #[arg(long, default_value_t = 0, requires = "template")]
        background: usize,
    },
    /// Report invariant problems; exits non-zero if any remain.
    Check {
        id: String,
        /// Save the repaired document back.
        #[arg(long)]
        fix: bool,
    },
}

fn open_store(path: Option<PathBuf>) -> Result<FileStorage, CliError> {
    Ok(match path {
        Some(path) => FileStorage::new(path)?,
        None => FileStorage::default_location()?,
    })
}

fn describe(document: &Document) {
    println!("{} ({})", document.name, document.id);
    for (index, page) in document.pages().iter().enumerate() {
        let background = page
            .background
            .as_ref()
            .map(|b| b.to_string())
            .unwrap_or_else(|| "none".to_string());
        println!(
            "  page {}: {}x{}, {} elements, background {}",
            index + 1,
            page.size.width,
            page.size.height,
            page.len(),
            background
        );
    }
    let variables = document.variable_names();
    if !variables.is_empty() {
        println!("  variables: {}", variables.join(", "));
    }
}

/// Returns whether the command succeeded.
fn run(cli: Cli) -> Result<bool, CliError> {
    let storage = open_store(cli.store)?;
    match cli.command {
        Command::List => {
            for id in pollster::block_on(storage.list())? {
                println!("{}", id);
            }
        }
        Command::Show { id } => {
            let document = pollster::block_on(storage.load(&id))?;
            describe(&document);
        }
        Command::New {
            name,
            template,
            background,
        } => {
            let document = match template {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)
                        .map_err(|source| CliError::Read { path, source })?;
                    let manifest = TemplateManifest::from_json(&json)?;
                    Document::from_template(name, &manifest, background)?
                }
                None => Document::new(name),
            };
            pollster::block_on(storage.save(&document.id, &document))?;
            println!("{}", document.id);
        }
        Command::Check { id, fix } => {
            let document = pollster::block_on(storage.load(&id))?;
            let problems = document.validate();
            for problem in &problems {
                println!("{}", problem);
            }
            for asset in document.asset_refs() {
                println!("asset: {}", asset);
            }
            if fix {
                // Loading already repaired what it could
                pollster::block_on(storage.save(&id, &document))?;
                log::info!("Rewrote {}", id);
            }
            return Ok(problems.is_empty());
        }
    }
    Ok(true)
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
