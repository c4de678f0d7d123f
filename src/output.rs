use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::render::OutputFormat;

const OUTPUT_STEM: &str = "okr_summary";

/// `<dir>/okr_summary.<ext>`, creating `dir` if needed.
pub fn output_path(dir: &Path, format: OutputFormat) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    Ok(dir.join(format!("{OUTPUT_STEM}.{}", format.extension())))
}

pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
