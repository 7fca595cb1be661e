//! CLI Tooling
//!
//! Command-line interface over the composition engine. Every command returns
//! its printable output; the binary only prints it.

use crate::account::RecordAccountResolver;
use crate::assembly::{Assembly, AssemblyService};
use crate::carton::{Carton, CartonComposer};
use crate::config::{CartonConfig, ConfigLoader, StoreBackend};
use crate::error::ApiError;
use crate::flavor::RecordFlavorResolver;
use crate::lifecycle::{State, Status};
use crate::payload::{Payload, RecordRequestLookup};
use crate::store::{HttpRecordStore, RecordStore, SledRecordStore};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Carton CLI - assembly composition and lifecycle
#[derive(Parser)]
#[command(name = "carton")]
#[command(about = "Compose assemblies into provisionable cartons and drive their lifecycle")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Use a local record store at this path instead of the API
    #[arg(long)]
    pub local: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and transition assemblies
    Assembly {
        #[command(subcommand)]
        command: AssemblyCommands,
    },
    /// Compose the carton of an assembly and list its boxes
    Compose {
        /// Assemblies (group) id
        #[arg(long)]
        assemblies: String,
        /// Assembly id
        #[arg(long)]
        assembly: String,
        /// Requester email
        #[arg(long)]
        email: String,
    },
    /// Decode a queue message and print the request it resolves to
    Payload {
        /// File holding the raw JSON message
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum AssemblyCommands {
    /// Show an assembly with its components resolved
    Show {
        id: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        org: String,
    },
    /// List every assembly (master credentials)
    List,
    /// Print the billable resource map
    Resources {
        id: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        org: String,
    },
    /// Persist a status and notify the owner
    SetStatus {
        id: String,
        status: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        org: String,
    },
    /// Persist a state
    SetState {
        id: String,
        state: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        org: String,
    },
}

/// CLI context holding the services commands run against
pub struct CliContext {
    config: CartonConfig,
    assemblies: Arc<AssemblyService>,
    composer: CartonComposer,
    requests: RecordRequestLookup,
}

impl CliContext {
    /// Load configuration and open the selected record store.
    pub fn new(config_path: Option<PathBuf>, local: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(),
        }
        .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let store: Arc<dyn RecordStore> = match (local, config.store.backend) {
            (Some(path), _) => Arc::new(SledRecordStore::open(&path)?),
            (None, StoreBackend::Local) => {
                Arc::new(SledRecordStore::open(&config.store.resolve_path()?)?)
            }
            (None, StoreBackend::Http) => Arc::new(HttpRecordStore::new()),
        };
        Ok(Self::with_store(config, store))
    }

    /// Build a context over an already opened store.
    pub fn with_store(config: CartonConfig, store: Arc<dyn RecordStore>) -> Self {
        let api = config.api.clone();
        let assemblies = Arc::new(AssemblyService::from_store(store.clone(), api.clone()));
        let composer = CartonComposer::new(
            assemblies.clone(),
            Arc::new(RecordAccountResolver::new(store.clone(), api.clone())),
            Arc::new(RecordFlavorResolver::new(store.clone(), api.clone())),
        );
        let requests = RecordRequestLookup::new(store, api);
        Self {
            config,
            assemblies,
            composer,
            requests,
        }
    }

    pub fn config(&self) -> &CartonConfig {
        &self.config
    }

    /// Execute a CLI command
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Assembly { command } => self.execute_assembly(command).await,
            Commands::Compose {
                assemblies,
                assembly,
                email,
            } => {
                let carton = self.composer.mk_carton(assemblies, assembly, email).await?;
                Ok(format_carton(&carton))
            }
            Commands::Payload { file } => {
                let raw = std::fs::read(file)
                    .map_err(|e| ApiError::malformed(format!("payload file {}", file.display()), e))?;
                let payload = Payload::decode(&raw)?;
                let requests = payload.convert(&self.requests).await?;
                serde_json::to_string_pretty(&requests).map_err(|e| ApiError::malformed("requests", e))
            }
        }
    }

    async fn execute_assembly(&self, command: &AssemblyCommands) -> Result<String, ApiError> {
        match command {
            AssemblyCommands::Show { id, email, org } => {
                let asm = self.assemblies.get(id, email, org).await?;
                Ok(asm.to_string())
            }
            AssemblyCommands::List => {
                let all = self.assemblies.list_all().await?;
                Ok(format_assemblies(&all))
            }
            AssemblyCommands::Resources { id, email, org } => {
                let asm = self.assemblies.fetch(id, email, org).await?;
                let resources = asm.resources()?;
                serde_json::to_string_pretty(&resources).map_err(|e| ApiError::malformed("resources", e))
            }
            AssemblyCommands::SetStatus {
                id,
                status,
                email,
                org,
            } => {
                let mut asm = self.assemblies.fetch(id, email, org).await?;
                let status = Status::from(status.as_str());
                self.assemblies.set_status(&mut asm, status.clone()).await?;
                info!(assembly = %id, status = %status, "status set from cli");
                Ok(format!("Assembly {} status set to {}", id, status))
            }
            AssemblyCommands::SetState {
                id,
                state,
                email,
                org,
            } => {
                let mut asm = self.assemblies.fetch(id, email, org).await?;
                let state = State::from(state.as_str());
                self.assemblies.set_state(&mut asm, state.clone()).await?;
                Ok(format!("Assembly {} state set to {}", id, state))
            }
        }
    }
}

fn format_assemblies(all: &[Assembly]) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Id", "Name", "Tosca", "Status", "State", "Components"]);
    for asm in all {
        table.add_row(vec![
            asm.id.clone(),
            asm.name.clone(),
            asm.tosca.to_string(),
            asm.status.to_string(),
            asm.state.to_string(),
            asm.component_ids.len().to_string(),
        ]);
    }
    table.to_string()
}

fn format_carton(carton: &Carton) -> String {
    let mut output = format!(
        "Carton {} ({}) of {} [{} / {}]\n",
        carton.name, carton.id, carton.cartons_id, carton.status, carton.state
    );
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec![
        "Box", "Name", "Provider", "Public IP", "Region", "CPU", "RAM", "HDD",
    ]);
    for b in &carton.boxes {
        table.add_row(vec![
            b.id.clone(),
            b.full_name(),
            b.provider.clone(),
            b.public_ip.clone(),
            b.region.clone(),
            b.compute.cpushare.clone(),
            b.compute.memory.clone(),
            b.compute.hdd.clone(),
        ]);
    }
    output.push_str(&table.to_string());
    output
}
