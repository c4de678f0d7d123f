use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::RenderError;

/// HTML in, paginated PDF bytes out.
#[async_trait]
pub trait PdfEngine: Send + Sync {
    fn name(&self) -> &str;
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, RenderError>;
}

/// Runs an external converter that reads HTML on stdin and writes PDF to stdout.
///
/// The converter is killed if it runs past `timeout`.
pub struct CommandPdfEngine {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandPdfEngine {
    pub fn new(program: String, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program,
            args,
            timeout,
        }
    }
}

#[async_trait]
impl PdfEngine for CommandPdfEngine {
    fn name(&self) -> &str {
        &self.program
    }

    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RenderError::Pdf(format!("failed to run {}: {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RenderError::Pdf("engine stdin unavailable".into()))?;

        // Feed stdin while draining stdout so a large document cannot stall the pipe.
        let feed = async move {
            let result = stdin.write_all(html.as_bytes()).await;
            drop(stdin);
            result
        };
        // Dropping the child on expiry kills it (kill_on_drop).
        let (fed, output) = tokio::time::timeout(self.timeout, async {
            tokio::join!(feed, child.wait_with_output())
        })
        .await
        .map_err(|_| {
            RenderError::Pdf(format!("{} timed out after {:?}", self.program, self.timeout))
        })?;

        let output =
            output.map_err(|e| RenderError::Pdf(format!("{} did not finish: {e}", self.program)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::Pdf(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(RenderError::Pdf(format!("{} produced no output", self.program)));
        }
        fed.map_err(|e| RenderError::Pdf(format!("failed to send HTML to {}: {e}", self.program)))?;
        Ok(output.stdout)
    }
}
