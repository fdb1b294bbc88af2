use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use drawdock::config::ClientConfig;
use drawdock::dispatch::{self, ImportRequest};
use drawdock::document::SourceFile;
use drawdock::identity::{FileIdentityStore, IdentityProvider};
use drawdock::preview::SvgPreviewRenderer;
use drawdock::services::{
    DrawingImportService, LibraryImportService, SnapshotProtocol, SnapshotState,
};
use drawdock::store::HttpRemoteStore;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// Path to a TOML config file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    /// Base URL of the remote store API (overrides config)
    #[clap(long, global = true)]
    api_url: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import drawings, a library file, or a database snapshot
    Import {
        /// Files to import; database snapshots must be selected on their own
        files: Vec<PathBuf>,
        /// Target collection for imported drawings (unfiled when omitted)
        #[clap(long)]
        collection: Option<String>,
        /// Confirm destructive snapshot replacement without prompting
        #[clap(short, long)]
        yes: bool,
    },
    /// Show this client's identity, generating one on first use
    Identity,
    /// Print the store's export download URLs
    ExportUrls,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }

    match args.command {
        Commands::Import {
            files,
            collection,
            yes,
        } => run_import(&config, files, collection, yes).await?,
        Commands::Identity => {
            let provider = IdentityProvider::new(FileIdentityStore::new(identity_path()?));
            let identity = provider.get_or_create()?;
            println!("{} ({})", identity.name, identity.initials);
            println!("id:    {}", identity.id);
            println!("color: {}", identity.color);
        }
        Commands::ExportUrls => {
            let store = HttpRemoteStore::from_config(&config);
            println!("{}", store.export_url());
            println!("{}", store.export_json_url());
        }
    }

    Ok(())
}

async fn run_import(
    config: &ClientConfig,
    paths: Vec<PathBuf>,
    collection: Option<String>,
    yes: bool,
) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("import")
            .to_string();
        let contents =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(SourceFile::new(name, contents));
    }

    let store = Arc::new(HttpRemoteStore::from_config(config));
    match dispatch::route(files)? {
        ImportRequest::Drawings(files) => {
            let service = DrawingImportService::new(store, Arc::new(SvgPreviewRenderer))
                .with_max_concurrent(config.max_concurrent_imports);
            let outcome = service
                .import_drawings(&files, collection.as_deref(), None)
                .await;
            println!(
                "Imported {} drawing(s), {} failed.",
                outcome.success, outcome.failed
            );
            for error in &outcome.errors {
                println!("  {}", error);
            }
            if !outcome.is_clean() {
                std::process::exit(1);
            }
        }
        ImportRequest::Library(file) => {
            let service = LibraryImportService::new(store);
            match service.import_library(&file).await {
                Ok(count) => println!("Added {} library item(s).", count),
                Err(err) => {
                    eprintln!("Library import failed: {}", err);
                    std::process::exit(1);
                }
            }
        }
        ImportRequest::Snapshot(file) => {
            let mut protocol = SnapshotProtocol::new(store);
            protocol.begin(file.contents).await?;
            if let SnapshotState::Rejected { message } = protocol.state() {
                eprintln!("{}", message);
                std::process::exit(1);
            }

            if !(yes || prompt_confirmation()?) {
                protocol.decline()?;
                println!("Import cancelled.");
                return Ok(());
            }
            protocol.confirm().await?;
            match protocol.state() {
                SnapshotState::Applied => println!("Database imported successfully."),
                SnapshotState::Rejected { message } => {
                    eprintln!("{}", message);
                    std::process::exit(1);
                }
                other => anyhow::bail!("unexpected snapshot state '{}'", other.name()),
            }
        }
    }

    Ok(())
}

fn prompt_confirmation() -> Result<bool> {
    println!(
        "WARNING: This will overwrite the current database with the imported file. \
         This action cannot be undone."
    );
    print!("Type 'yes' to continue: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("yes"))
}

fn identity_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "drawdock")
        .context("Could not determine a config directory")?;
    Ok(dirs.config_dir().join("identity.json"))
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.to_string()))
        .without_time()
        .init();
}
