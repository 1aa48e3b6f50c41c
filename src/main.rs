//! # SMENCTL CLI
//!
//! Drives the `ibm_sm_en_registration` resource from the command line.
//!
//! ## Usage
//!
//! ```bash
//! # Check a manifest without calling Secrets Manager
//! smenctl validate --config registration.yaml
//!
//! # Create or update the registration and record it in a state file
//! smenctl apply --config registration.yaml --state registration.json
//!
//! # Re-read the registration recorded in a state file
//! smenctl refresh --state registration.json
//!
//! # Adopt an existing registration
//! smenctl import us-south/0b5571f7-21e6-42b7-91c5-3f5ac9793a46 --state registration.json
//!
//! # Remove the registration
//! smenctl destroy --state registration.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use sm_en_registration::config::ProviderConfig;
use sm_en_registration::constants::RESOURCE_EN_REGISTRATION;
use sm_en_registration::observability::{init_tracing, metrics};
use sm_en_registration::schema::Schema;
use sm_en_registration::state::StateFile;
use sm_en_registration::{DefaultClientSession, Provider, Resource, ResourceData};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BUILD_GIT_HASH"),
    ", built ",
    env!("BUILD_DATETIME"),
    ")"
);

/// Secrets Manager Event Notifications registration CLI
#[derive(Parser)]
#[command(name = "smenctl", version, long_version = LONG_VERSION)]
#[command(
    about = "Manage the Event Notifications registration of a Secrets Manager instance",
    long_about = None,
    after_help = "\
Environment:
  IC_IAM_TOKEN                              IAM bearer token (required)
  IC_REGION                                 Default region (us-south)
  IBMCLOUD_SECRETS_MANAGER_ENDPOINT_TYPE    Default endpoint type (public)
  IBMCLOUD_SECRETS_MANAGER_API_ENDPOINT     Service URL override
  LOG_LEVEL / LOG_FORMAT / RUST_LOG         Logging
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Abort the operation after this many seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Print Prometheus metrics to stdout when done
    #[arg(long, global = true)]
    print_metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a registration manifest
    Validate {
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },
    /// Create the registration, or update it to match the manifest
    Apply {
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,
    },
    /// Re-read the registration and update the state file
    Refresh {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,
    },
    /// Delete the registration and remove the state file
    Destroy {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,
    },
    /// Adopt an existing registration by id (<region>/<instance_id>)
    Import {
        #[arg(value_name = "ID")]
        id: String,
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,
    },
    /// Print the JSON schema of the registration manifest
    Schema,
}

/// Desired state of one `ibm_sm_en_registration`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct RegistrationManifest {
    /// The ID of the Secrets Manager instance.
    instance_id: String,
    /// The region of the Secrets Manager instance. Defaults to the provider region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    region: Option<String>,
    /// public or private.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    endpoint_type: Option<String>,
    /// A CRN that uniquely identifies an IBM Cloud resource.
    event_notifications_instance_crn: String,
    /// The name that is displayed as a source that is in your Event Notifications instance.
    event_notifications_source_name: String,
    /// An optional description for the source that is in your Event Notifications instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event_notifications_source_description: Option<String>,
}

impl RegistrationManifest {
    fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse registration manifest")
    }

    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid manifest {}", path.display()))
    }

    fn into_config(self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self).context("Failed to encode manifest")? {
            Value::Object(map) => Ok(map),
            _ => Err(anyhow::anyhow!("Manifest did not encode to an object")),
        }
    }
}

/// Force-new attributes whose desired value differs from the recorded one
fn replacement_attributes(
    schema: &Schema,
    prior: &Map<String, Value>,
    config: &Map<String, Value>,
) -> Vec<&'static str> {
    schema
        .attributes()
        .filter(|a| a.force_new)
        .filter(|a| match config.get(a.name).filter(|v| !v.is_null()) {
            Some(desired) => prior.get(a.name) != Some(desired),
            None => !a.computed && prior.get(a.name).is_some_and(|v| !v.is_null()),
        })
        .map(|a| a.name)
        .collect()
}

fn load_state(path: &Path) -> Result<Option<StateFile>> {
    let state = StateFile::load(path)?;
    if let Some(state) = &state {
        if state.resource_type != RESOURCE_EN_REGISTRATION {
            return Err(anyhow::anyhow!(
                "State file {} holds a {}, not a {}",
                path.display(),
                state.resource_type,
                RESOURCE_EN_REGISTRATION
            ));
        }
    }
    Ok(state)
}

fn existing(resource: &dyn Resource, state: &StateFile) -> ResourceData {
    ResourceData::from_prior(
        resource.schema(),
        state.id.clone(),
        state.attributes.clone(),
        state.attributes.clone(),
    )
}

/// Write `d` back to the state file, or remove the file if it no longer exists
fn persist(state: &mut StateFile, d: ResourceData, path: &Path) -> Result<()> {
    if !d.exists() {
        warn!("Registration no longer exists, removing {}", path.display());
        return StateFile::remove(path);
    }
    let id = d.id().to_string();
    state.record(&id, d.into_attributes());
    state.save(path)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&state.attributes).context("Failed to encode state")?
    );
    Ok(())
}

async fn run(command: Commands, provider: &Provider, session: &DefaultClientSession) -> Result<()> {
    let resource = provider.resource(RESOURCE_EN_REGISTRATION)?;

    match command {
        Commands::Validate { config } => {
            let config = RegistrationManifest::load(&config)?.into_config()?;
            provider.validate_resource_config(RESOURCE_EN_REGISTRATION, &config)?;
            println!("Configuration is valid");
        }
        Commands::Apply { config, state } => {
            let desired = RegistrationManifest::load(&config)?.into_config()?;
            provider.validate_resource_config(RESOURCE_EN_REGISTRATION, &desired)?;

            let mut recorded =
                load_state(&state)?.unwrap_or_else(|| StateFile::new(RESOURCE_EN_REGISTRATION));

            if recorded.exists() {
                let replace =
                    replacement_attributes(&resource.schema(), &recorded.attributes, &desired);
                if !replace.is_empty() {
                    info!(
                        "{} changed, replacing registration {}",
                        replace.join(", "),
                        recorded.id
                    );
                    let mut old = existing(resource.as_ref(), &recorded);
                    resource.delete(session, &mut old).await?;
                    recorded.record("", Map::new());
                    recorded.save(&state)?;
                }
            }

            let d = if recorded.exists() {
                let mut d = ResourceData::from_prior(
                    resource.schema(),
                    recorded.id.clone(),
                    recorded.attributes.clone(),
                    desired,
                );
                resource.update(session, &mut d).await?;
                d
            } else {
                let mut d = ResourceData::from_config(resource.schema(), desired);
                resource.create(session, &mut d).await?;
                d
            };
            persist(&mut recorded, d, &state)?;
        }
        Commands::Refresh { state } => {
            let mut recorded = load_state(&state)?
                .filter(StateFile::exists)
                .ok_or_else(|| anyhow::anyhow!("No registration recorded in {}", state.display()))?;
            let mut d = existing(resource.as_ref(), &recorded);
            resource.read(session, &mut d).await?;
            persist(&mut recorded, d, &state)?;
        }
        Commands::Destroy { state } => {
            let Some(recorded) = load_state(&state)?.filter(StateFile::exists) else {
                info!("Nothing to destroy in {}", state.display());
                return StateFile::remove(&state);
            };
            let mut d = existing(resource.as_ref(), &recorded);
            resource.delete(session, &mut d).await?;
            StateFile::remove(&state)?;
            info!("Destroyed registration {}", recorded.id);
        }
        Commands::Import { id, state } => {
            let mut recorded =
                load_state(&state)?.unwrap_or_else(|| StateFile::new(RESOURCE_EN_REGISTRATION));
            if recorded.exists() {
                return Err(anyhow::anyhow!(
                    "{} already manages registration {}",
                    state.display(),
                    recorded.id
                ));
            }
            let d = resource.import(session, &id).await?;
            persist(&mut recorded, d, &state)?;
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(RegistrationManifest);
            println!(
                "{}",
                serde_json::to_string_pretty(&schema).context("Failed to encode schema")?
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    let cli = Cli::parse();
    let config = ProviderConfig::from_env();
    init_tracing(&config)?;
    metrics::register_metrics()?;

    let provider = Provider::new();
    let session = DefaultClientSession::new(config);

    let operation = run(cli.command, &provider, &session);
    let result = match cli.timeout {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), operation)
            .await
            .map_err(|_| anyhow::anyhow!("Operation timed out after {secs}s"))
            .and_then(|r| r),
        None => operation.await,
    };

    if cli.print_metrics {
        print!("{}", metrics::render()?);
    }
    result
}
