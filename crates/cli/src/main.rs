use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use burwood_api::{GROUP_HIERARCHY_ENDPOINT, PortalClient, project_budgets_endpoint, project_endpoint};
use burwood_provider::config::{default_config_path, load_config, save_config_to_path};
use burwood_provider::plan::{PlannedCall, plan_hierarchy, plan_manifest};
use burwood_provider::schema::{ALL_SCHEMAS, BlockSchema, schema_by_name};
use burwood_provider::{Manifest, Provider, ProviderConfig, ProviderError, load_manifest};
use burwood_util::redact_sensitive;
use clap::{Args, Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod output;

use output::OutputFormat;

/// Token shown in dry-run output in place of a real one.
const PLACEHOLDER_TOKEN: &str = "<access-token>";

/// Manage Burwood Portal projects, budgets and groups.
#[derive(Parser, Debug)]
#[command(name = "burwood", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Portal base URL. Falls back to PORTAL_HOST, then the production portal
    #[arg(long, global = true)]
    host: Option<String>,

    /// Portal username. Falls back to PORTAL_USERNAME
    #[arg(long, global = true)]
    username: Option<String>,

    /// Portal password. Prefer PORTAL_PASSWORD over this flag
    #[arg(long, global = true)]
    password: Option<String>,

    /// Config file (default: $BURWOOD_CONFIG_PATH or ~/.config/burwood/portal.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Print the requests that would be sent, without sending them
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Portal(PortalCommand),
    /// Show attribute schemas of resources and data sources
    Schema {
        /// Type name, e.g. burwoodportal_projects
        name: Option<String>,
    },
    /// Inspect or persist provider configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Commands that talk to the portal.
#[derive(Subcommand, Debug)]
enum PortalCommand {
    /// Group → department → project hierarchy
    Hierarchy {
        #[command(subcommand)]
        command: HierarchyCommand,
    },
    /// Projects and their budgets
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    /// Apply a whole manifest: hierarchy first, then projects
    Apply(ManifestArgs),
}

#[derive(Subcommand, Debug)]
enum HierarchyCommand {
    /// Read the hierarchy
    Show,
    /// Post the manifest's hierarchy block
    Apply(ManifestArgs),
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// Read a project and its latest budget
    Show { project_id: String },
    /// List every budget of a project
    Budgets { project_id: String },
    /// Delete a project
    Delete { project_id: String },
    /// Create or update the manifest's project blocks
    Apply(ManifestArgs),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the resolved configuration with the password redacted
    Show,
    /// Write host and username to the config file. The password is never saved
    Save,
}

#[derive(Args, Debug)]
struct ManifestArgs {
    /// Manifest file (YAML or JSON)
    #[arg(long, short = 'f')]
    file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let Cli { global, command } = Cli::parse();

    match command {
        Command::Schema { name } => print_schema(name.as_deref(), global.output),
        Command::Config { command } => run_config_cmd(&global, command),
        Command::Portal(command) if global.dry_run => run_dry(&global, command),
        Command::Portal(command) => run_command(&global, command).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn resolve_config(global: &GlobalArgs) -> Result<ProviderConfig> {
    let overrides = ProviderConfig {
        host: global.host.clone(),
        username: global.username.clone(),
        password: global.password.clone(),
    };
    load_config(global.config.as_deref(), overrides).context("failed to load provider configuration")
}

/// Attach the status hint (if any) to a provider failure.
fn report(error: ProviderError) -> anyhow::Error {
    let hint = error.portal_error().and_then(|source| source.hint());
    match hint {
        Some(hint) => anyhow::Error::new(error).context(hint),
        None => anyhow::Error::new(error),
    }
}

async fn run_command(global: &GlobalArgs, command: PortalCommand) -> Result<()> {
    let config = resolve_config(global)?;
    let provider = Provider::configure(&config).await.map_err(report)?;
    let format = global.output;

    match command {
        PortalCommand::Hierarchy {
            command: HierarchyCommand::Show,
        } => {
            let state = provider.hierarchy_data_source().read().await.map_err(report)?;
            output::emit(format, &state, output::hierarchy_text)
        }
        PortalCommand::Hierarchy {
            command: HierarchyCommand::Apply(args),
        } => {
            let manifest = load_manifest(&args.file)?;
            let hierarchy = manifest
                .hierarchy
                .with_context(|| format!("{} has no 'hierarchy' block", args.file.display()))?;
            let state = provider.group_hierarchy().apply(&hierarchy).await.map_err(report)?;
            output::emit(format, &state, output::hierarchy_text)
        }
        PortalCommand::Project { command } => run_project_cmd(&provider, format, command).await,
        PortalCommand::Apply(args) => {
            let manifest = load_manifest(&args.file)?;
            if manifest.is_empty() {
                bail!("{} contains no resource blocks", args.file.display());
            }
            let applied = provider.apply_manifest(&manifest).await.map_err(report)?;
            output::emit(format, &applied, output::applied_text)
        }
    }
}

async fn run_project_cmd(provider: &Provider, format: OutputFormat, command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::Show { project_id } => {
            let state = provider.projects().read(&project_id).await.map_err(report)?;
            output::emit(format, &state, output::project_text)
        }
        ProjectCommand::Budgets { project_id } => {
            let budgets = provider.projects().budgets(&project_id).await.map_err(report)?;
            output::emit(format, &budgets, |budgets| output::budgets_text(budgets))
        }
        ProjectCommand::Delete { project_id } => {
            let deleted = provider.projects().delete(&project_id).await.map_err(report)?;
            output::emit(format, &deleted, |project| format!("deleted project {}\n", project.project_id))
        }
        ProjectCommand::Apply(args) => {
            let manifest = project_manifest(&args)?;
            let applied = provider.apply_manifest(&manifest).await.map_err(report)?;
            output::emit(format, &applied, output::applied_text)
        }
    }
}

/// Projects of a manifest, with any hierarchy block dropped.
fn project_manifest(args: &ManifestArgs) -> Result<Manifest> {
    let manifest = load_manifest(&args.file)?;
    if manifest.projects.is_empty() {
        bail!("{} has no 'projects' blocks", args.file.display());
    }
    Ok(Manifest {
        hierarchy: None,
        ..manifest
    })
}

fn run_dry(global: &GlobalArgs, command: PortalCommand) -> Result<()> {
    let config = resolve_config(global)?;
    let client = PortalClient::with_token(config.host(), PLACEHOLDER_TOKEN)?;

    let calls = match command {
        PortalCommand::Hierarchy {
            command: HierarchyCommand::Show,
        } => vec![get(GROUP_HIERARCHY_ENDPOINT.to_string())],
        PortalCommand::Hierarchy {
            command: HierarchyCommand::Apply(args),
        } => {
            let manifest = load_manifest(&args.file)?;
            let hierarchy = manifest
                .hierarchy
                .with_context(|| format!("{} has no 'hierarchy' block", args.file.display()))?;
            plan_hierarchy(&hierarchy)?
        }
        PortalCommand::Project {
            command: ProjectCommand::Show { project_id },
        } => vec![
            get(project_endpoint(&project_id)),
            get(project_budgets_endpoint(&project_id)),
        ],
        PortalCommand::Project {
            command: ProjectCommand::Budgets { project_id },
        } => vec![get(project_budgets_endpoint(&project_id))],
        PortalCommand::Project {
            command: ProjectCommand::Delete { project_id },
        } => vec![PlannedCall {
            method: Method::DELETE,
            endpoint: project_endpoint(&project_id),
            body: None,
        }],
        PortalCommand::Project {
            command: ProjectCommand::Apply(args),
        } => plan_manifest(&project_manifest(&args)?)?,
        PortalCommand::Apply(args) => plan_manifest(&load_manifest(&args.file)?)?,
    };

    debug!(host = client.base_url(), call_count = calls.len(), "dry run; nothing will be sent");
    let rendered = calls
        .into_iter()
        .map(|call| describe_request(&client, call))
        .collect::<Result<Vec<_>>>()?;
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}

fn get(endpoint: String) -> PlannedCall {
    PlannedCall {
        method: Method::GET,
        endpoint,
        body: None,
    }
}

/// Build the real request for a planned call and describe it as JSON.
fn describe_request(client: &PortalClient, call: PlannedCall) -> Result<Value> {
    let mut builder = client.request(call.method, &call.endpoint);
    if let Some(body) = &call.body {
        builder = builder.body(serde_json::to_vec(body)?);
    }
    let request = builder.build()?;

    let mut headers_out = serde_json::Map::new();
    for (name, value) in request.headers() {
        let line = format!("{}: {}", name.as_str(), value.to_str().unwrap_or(""));
        let redacted = redact_sensitive(&line);
        let out_val = redacted
            .split_once(':')
            .map(|(_, value)| value.trim())
            .unwrap_or("")
            .to_string();
        headers_out.insert(name.as_str().to_string(), Value::String(out_val));
    }

    Ok(serde_json::json!({
        "method": request.method().as_str(),
        "url": request.url().as_str(),
        "headers": headers_out,
        "body": call.body,
    }))
}

fn print_schema(name: Option<&str>, format: OutputFormat) -> Result<()> {
    let schemas: Vec<&BlockSchema> = match name {
        Some(name) => {
            let schema = schema_by_name(name).with_context(|| {
                let known: Vec<_> = ALL_SCHEMAS.iter().map(|schema| schema.name).collect();
                format!("unknown type '{name}'; expected one of: {}", known.join(", "))
            })?;
            vec![schema]
        }
        None => ALL_SCHEMAS.to_vec(),
    };

    output::emit(format, &schemas, |schemas| {
        schemas
            .iter()
            .map(|schema| schema.render())
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn run_config_cmd(global: &GlobalArgs, command: ConfigCommand) -> Result<()> {
    let path = global.config.clone().unwrap_or_else(default_config_path);
    match command {
        ConfigCommand::Show => {
            let config = resolve_config(global)?;
            let shown = serde_json::json!({
                "path": path.display().to_string(),
                "host": config.host(),
                "username": &config.username,
                "password": config.password.as_ref().map(|_| burwood_util::text_processing::REDACTED),
            });
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        ConfigCommand::Save => {
            let config = resolve_config(global)?;
            let persisted = ProviderConfig {
                password: None,
                ..config
            };
            save_config_to_path(&persisted, &path)?;
            println!("saved {}", path.display());
        }
    }
    Ok(())
}
