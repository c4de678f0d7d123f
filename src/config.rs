use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OUTPUT_DIR: &str = "outputs/";
pub const DEFAULT_PDF_ENGINE: &str = "wkhtmltopdf";
const DEFAULT_PDF_ARGS: &[&str] = &["--quiet", "-", "-"];
pub const DEFAULT_PDF_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub azure_devops: Option<AzureDevOpsConfig>,
    pub output: Option<OutputConfig>,
    pub pdf: Option<PdfConfig>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AzureDevOpsConfig {
    pub organization: Option<String>,
    pub project: Option<String>,
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    pub dir: Option<PathBuf>,
    pub schema: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PdfConfig {
    pub engine: Option<String>,
    pub args: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

impl AppConfig {
    fn azure_devops(&self) -> Option<&AzureDevOpsConfig> {
        self.azure_devops.as_ref()
    }

    pub fn organization(&self) -> Option<String> {
        self.azure_devops().and_then(|c| c.organization.clone())
    }

    pub fn project(&self) -> Option<String> {
        self.azure_devops().and_then(|c| c.project.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.azure_devops().and_then(|c| c.token.clone())
    }

    pub fn base_url(&self) -> String {
        self.azure_devops()
            .and_then(|c| c.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn timeout(&self) -> Duration {
        let secs = self
            .azure_devops()
            .and_then(|c| c.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output
            .as_ref()
            .and_then(|o| o.dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn schema(&self) -> Option<PathBuf> {
        self.output.as_ref().and_then(|o| o.schema.clone())
    }

    /// Engine program and its arguments.
    pub fn pdf_engine(&self) -> (String, Vec<String>) {
        let pdf = self.pdf.as_ref();
        let engine = pdf
            .and_then(|p| p.engine.clone())
            .unwrap_or_else(|| DEFAULT_PDF_ENGINE.to_string());
        let args = pdf
            .and_then(|p| p.args.clone())
            .unwrap_or_else(|| DEFAULT_PDF_ARGS.iter().map(|a| a.to_string()).collect());
        (engine, args)
    }

    /// How long the PDF engine may run before it is killed.
    pub fn pdf_timeout(&self) -> Duration {
        let secs = self
            .pdf
            .as_ref()
            .and_then(|p| p.timeout_secs)
            .unwrap_or(DEFAULT_PDF_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".okr-docgen")
        .join("config.toml")
}

/// Load the config file. An explicit path must exist; the default one may not.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let path = config_path();
            if !path.exists() {
                return Ok(AppConfig::default());
            }
            path
        }
    };
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}
