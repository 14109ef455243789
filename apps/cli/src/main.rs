//! Store administration CLI
//!
//! Thin wrapper over the version manager against the configured
//! PostgreSQL backend: schema migration plus the versioned CRUD
//! operations, with documents read from a file or stdin and printed as
//! pretty JSON.

use std::io::Read as _;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stratum_meta::VersionBump;
use stratum_store::{logging, Config, PostgresDocumentStore, VersionManager};

#[derive(Parser)]
#[command(name = "stratum", version, about = "Versioned clinical resource store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending schema migrations
    Migrate,

    /// Create a resource from a JSON document (file or stdin)
    Create {
        resource_type: String,
        /// Read the document from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        /// Use this id instead of generating one
        #[arg(long)]
        id: Option<String>,
    },

    /// Replace a resource's payload, bumping its version
    Update {
        resource_type: String,
        id: String,
        /// Read the replacement document from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        /// Breaking update: bump the major component
        #[arg(long)]
        major: bool,
    },

    /// Read the current document or an exact archived version
    Read {
        resource_type: String,
        id: String,
        /// "current" or a concrete version such as 1.1.0
        #[arg(long, default_value = "current")]
        version: String,
    },

    /// List version history, newest first
    History { resource_type: String, id: String },

    /// Remove the current document
    Delete {
        resource_type: String,
        id: String,
        /// Also remove the entire version history
        #[arg(long)]
        purge: bool,
    },

    /// Allocate the next display identifier for a resource type
    NextId { resource_type: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    logging::init_logging(&config.logging)?;

    let store = PostgresDocumentStore::connect(&config.database)
        .await
        .context("Failed to connect to the document store")?;

    let manager = VersionManager::with_history_order(store.clone(), config.history.version_order);

    match cli.command {
        Command::Migrate => {
            store.migrate().await?;
            println!("migrations applied");
        }

        Command::Create {
            resource_type,
            file,
            id,
        } => {
            let data = read_document(file)?;
            let created = manager.create(&resource_type, data, id).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }

        Command::Update {
            resource_type,
            id,
            file,
            major,
        } => {
            let data = read_document(file)?;
            let bump = if major {
                VersionBump::Major
            } else {
                VersionBump::Minor
            };
            let updated = manager.update(&resource_type, &id, data, bump).await?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }

        Command::Read {
            resource_type,
            id,
            version,
        } => match manager
            .get_version(&resource_type, &id, version.as_str())
            .await?
        {
            Some(resource) => println!("{}", serde_json::to_string_pretty(&resource)?),
            None => anyhow::bail!("{resource_type}/{id} has no version {version}"),
        },

        Command::History { resource_type, id } => {
            let history = manager.get_history(&resource_type, &id).await?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }

        Command::Delete {
            resource_type,
            id,
            purge,
        } => {
            let removed = if purge {
                manager.purge(&resource_type, &id).await?
            } else {
                manager.delete(&resource_type, &id).await?
            };
            if !removed {
                anyhow::bail!("{resource_type}/{id} not found");
            }
            println!("deleted {resource_type}/{id}");
        }

        Command::NextId { resource_type } => {
            println!("{}", manager.allocate_display_id(&resource_type).await?);
        }
    }

    Ok(())
}

fn read_document(file: Option<PathBuf>) -> anyhow::Result<serde_json::Value> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read document from stdin")?;
            buf
        }
    };

    serde_json::from_str(&raw).context("Document is not valid JSON")
}
