use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::Value;

use crate::config::{self, AppConfig};
use crate::error::RenderError;
use crate::model::okr::OkrDocument;
use crate::normalize::normalize;
use crate::output;
use crate::providers::{self, azure_devops::AzureDevOpsClient};
use crate::render::pdf::CommandPdfEngine;
use crate::render::{DocumentRenderer, OutputFormat, TemplateRegistry};
use crate::schema::SchemaValidator;

#[derive(Parser, Debug)]
#[command(name = "okr-docgen", version)]
#[command(about = "Generate OKR documents from Azure DevOps work items or OKR JSON")]
pub struct Cli {
    /// Config file (default: ~/.okr-docgen/config.toml)
    #[arg(long, global = true, env = "OKR_DOCGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch objectives and hypotheses from Azure DevOps and render them
    Live(LiveArgs),
    /// Render a pre-fetched OKR JSON file
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
pub struct LiveArgs {
    /// Azure DevOps organization name
    #[arg(long, env = "AZURE_DEVOPS_ORG")]
    pub org: Option<String>,

    /// Azure DevOps project name
    #[arg(long, env = "AZURE_DEVOPS_PROJECT")]
    pub project: Option<String>,

    /// Personal access token
    #[arg(long, env = "AZURE_DEVOPS_PAT", hide_env_values = true)]
    pub token: Option<String>,

    /// Service root, for Azure DevOps Server installs
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input JSON file (must match the okr_summary schema)
    #[arg(long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output directory (default: outputs/)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,

    /// JSON schema to validate against (default: embedded okr_summary.json)
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Skip validation against the JSON schema
    #[arg(long)]
    pub no_validate: bool,

    /// HTML-to-PDF program reading stdin and writing stdout
    #[arg(long)]
    pub pdf_engine: Option<String>,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Live(args) => handle_live(args, &config).await,
        Command::Convert(args) => handle_convert(args, &config).await,
    }
}

/// Fetch from Azure DevOps, normalize, validate and render.
pub async fn handle_live(args: LiveArgs, config: &AppConfig) -> Result<()> {
    let org = args
        .org
        .or_else(|| config.organization())
        .context("Missing Azure DevOps organization: pass --org or set AZURE_DEVOPS_ORG")?;
    let project = args
        .project
        .or_else(|| config.project())
        .context("Missing Azure DevOps project: pass --project or set AZURE_DEVOPS_PROJECT")?;
    let token = args
        .token
        .or_else(|| config.token())
        .context("Missing Azure DevOps token: pass --token or set AZURE_DEVOPS_PAT")?;
    let base_url = args.base_url.unwrap_or_else(|| config.base_url());
    let timeout = args
        .timeout
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.timeout());

    let client = AzureDevOpsClient::new(&base_url, &org, &project, &token, timeout)?;
    tracing::info!(%org, %project, "fetching objectives");

    let raw = providers::fetch_objectives(&client)
        .await
        .context("Failed to fetch objectives")?;
    let link = |id: u64| client.edit_link(id);
    let document = normalize(raw, &client, &link)
        .await
        .context("Failed to resolve hypotheses")?;
    println!(
        "Fetched {} objectives with {} hypotheses from {org}/{project}",
        document.objectives.len(),
        document.hypothesis_count()
    );

    if !args.output.no_validate {
        let instance = serde_json::to_value(&document)?;
        validate(&instance, &args.output, config)?;
    }
    publish(&document, &args.output, config).await
}

/// Load a canonical OKR JSON file, validate and render.
pub async fn handle_convert(args: ConvertArgs, config: &AppConfig) -> Result<()> {
    let contents = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not valid JSON", args.input.display()))?;

    if !args.output.no_validate {
        validate(&value, &args.output, config)?;
    }
    let document = OkrDocument::from_value(value)
        .with_context(|| format!("{} is not an OKR document", args.input.display()))?;
    publish(&document, &args.output, config).await
}

fn validate(instance: &Value, out: &OutputArgs, config: &AppConfig) -> Result<()> {
    let schema = out.schema.clone().or_else(|| config.schema());
    let validator = SchemaValidator::new(schema.as_deref())?;
    validator.validate(instance)?;
    println!("OKR data validated successfully against schema.");
    Ok(())
}

async fn publish(document: &OkrDocument, out: &OutputArgs, config: &AppConfig) -> Result<()> {
    let (mut engine, mut engine_args) = config.pdf_engine();
    if let Some(program) = &out.pdf_engine {
        engine = program.clone();
        engine_args = Vec::new();
    }
    let renderer = DocumentRenderer::new(
        TemplateRegistry::builtin(),
        Box::new(CommandPdfEngine::new(
            engine,
            engine_args,
            config.pdf_timeout(),
        )),
    );

    let bytes = renderer.render(out.format, document).await;
    if bytes.is_empty() {
        return Err(RenderError::EmptyOutput {
            format: out.format.to_string(),
        }
        .into());
    }

    let dir = out.output_dir.clone().unwrap_or_else(|| config.output_dir());
    let path = output::output_path(&dir, out.format)?;
    output::write_output(&path, &bytes)?;
    println!("OKR {} report written to {}", out.format.label(), path.display());
    Ok(())
}
